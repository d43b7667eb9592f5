use std::fmt;

/// Errors raised by the fuzzy engine and the controllers built on it.
///
/// Configuration mistakes (breakpoints, universes, duplicate names, rule
/// references) surface at construction time; only `MissingInput` and
/// `NoActivation` can occur during a live inference cycle.
#[derive(Clone, Debug, PartialEq)]
pub enum FuzzyError {
    UnknownVariable { name: String },
    MissingInput { variable: String },
    DuplicateVariable { name: String },
    DuplicateLabel { variable: String, label: String },
    InvalidUniverse { min: f64, max: f64, step: f64 },
    InvalidBreakpoints { shape: &'static str, points: Vec<f64> },
    InvalidRule { rule: usize, reason: String },
    NoActivation { variable: String },
}

impl fmt::Display for FuzzyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownVariable { name } => write!(f, "unknown variable '{name}'"),
            Self::MissingInput { variable } => {
                write!(f, "no crisp input supplied for variable '{variable}'")
            }
            Self::DuplicateVariable { name } => {
                write!(f, "variable '{name}' is already registered")
            }
            Self::DuplicateLabel { variable, label } => {
                write!(f, "variable '{variable}' already has a term '{label}'")
            }
            Self::InvalidUniverse { min, max, step } => write!(
                f,
                "invalid universe: min={min}, max={max}, step={step} (need min < max, step > 0)"
            ),
            Self::InvalidBreakpoints { shape, points } => {
                write!(f, "invalid {shape} breakpoints {points:?}: must be finite and non-decreasing")
            }
            Self::InvalidRule { rule, reason } => write!(f, "invalid rule #{rule}: {reason}"),
            Self::NoActivation { variable } => {
                write!(f, "no rule activated output variable '{variable}'")
            }
        }
    }
}

impl std::error::Error for FuzzyError {}
