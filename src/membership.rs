//! Membership function shapes and their evaluation.
//!
//! A single tagged enum dispatched through one pure `evaluate` keeps the
//! engine allocation-free at inference time. Breakpoint order is checked at
//! construction so evaluation can never divide by zero or produce NaN.

use crate::error::FuzzyError;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MembershipFunction {
    /// Linear ramp up over [a,b], down over [b,c]; 1 at b.
    Triangular { a: f64, b: f64, c: f64 },
    /// Like triangular with a flat top over [b,c].
    Trapezoidal { a: f64, b: f64, c: f64, d: f64 },
    /// Descending sigmoid: 1 at and below a, 0 at and beyond b.
    ZShaped { a: f64, b: f64 },
    /// Ascending sigmoid: 0 at and below a, 1 at and beyond b.
    SShaped { a: f64, b: f64 },
}

impl MembershipFunction {
    pub fn triangular(a: f64, b: f64, c: f64) -> Result<Self, FuzzyError> {
        check_breakpoints("triangular", &[a, b, c])?;
        Ok(Self::Triangular { a, b, c })
    }

    pub fn trapezoidal(a: f64, b: f64, c: f64, d: f64) -> Result<Self, FuzzyError> {
        check_breakpoints("trapezoidal", &[a, b, c, d])?;
        Ok(Self::Trapezoidal { a, b, c, d })
    }

    pub fn z_shaped(a: f64, b: f64) -> Result<Self, FuzzyError> {
        check_breakpoints("z-shaped", &[a, b])?;
        Ok(Self::ZShaped { a, b })
    }

    pub fn s_shaped(a: f64, b: f64) -> Result<Self, FuzzyError> {
        check_breakpoints("s-shaped", &[a, b])?;
        Ok(Self::SShaped { a, b })
    }

    /// Degree of membership of `x`, always in [0,1].
    ///
    /// Zero-width segments act as steps; a fully degenerate triangle
    /// (a = b = c) is an impulse that is 1 only at that point.
    pub fn evaluate(&self, x: f64) -> f64 {
        let degree = match *self {
            Self::Triangular { a, b, c } => {
                if x < a || x > c {
                    0.0
                } else if x < b {
                    // x >= a and x < b, so b > a here
                    (x - a) / (b - a)
                } else if x > b {
                    (c - x) / (c - b)
                } else {
                    1.0
                }
            }
            Self::Trapezoidal { a, b, c, d } => {
                if x < a || x > d {
                    0.0
                } else if x < b {
                    (x - a) / (b - a)
                } else if x > c {
                    (d - x) / (d - c)
                } else {
                    1.0
                }
            }
            Self::ZShaped { a, b } => 1.0 - s_curve(x, a, b),
            Self::SShaped { a, b } => s_curve(x, a, b),
        };
        degree.clamp(0.0, 1.0)
    }
}

/// Quadratic s-spline from 0 at `a` to 1 at `b`.
fn s_curve(x: f64, a: f64, b: f64) -> f64 {
    if x <= a {
        0.0
    } else if x >= b {
        1.0
    } else {
        // a < x < b implies b > a
        let span = b - a;
        let mid = (a + b) / 2.0;
        if x <= mid {
            2.0 * ((x - a) / span).powi(2)
        } else {
            1.0 - 2.0 * ((x - b) / span).powi(2)
        }
    }
}

fn check_breakpoints(shape: &'static str, points: &[f64]) -> Result<(), FuzzyError> {
    let ordered = points.windows(2).all(|w| w[0] <= w[1]);
    if !ordered || points.iter().any(|p| !p.is_finite()) {
        return Err(FuzzyError::InvalidBreakpoints {
            shape,
            points: points.to_vec(),
        });
    }
    Ok(())
}
