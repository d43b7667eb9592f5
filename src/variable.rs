//! Linguistic variables: discretized universes, labeled membership terms,
//! and the registry that turns crisp sensor values into degree maps.

use crate::error::FuzzyError;
use crate::membership::MembershipFunction;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Evenly spaced samples over the half-open interval [min, max).
///
/// Immutable once built; every membership term of a variable is discretized
/// over these samples during aggregation.
#[derive(Clone, Debug, PartialEq)]
pub struct Universe {
    min: f64,
    max: f64,
    step: f64,
    samples: Vec<f64>,
}

impl Universe {
    pub fn new(min: f64, max: f64, step: f64) -> Result<Self, FuzzyError> {
        let finite = min.is_finite() && max.is_finite() && step.is_finite();
        if !finite || step <= 0.0 || max <= min {
            return Err(FuzzyError::InvalidUniverse { min, max, step });
        }
        let capacity = ((max - min) / step).ceil() as usize;
        let mut samples = Vec::with_capacity(capacity);
        let mut i = 0usize;
        loop {
            let x = min + i as f64 * step;
            if x >= max {
                break;
            }
            samples.push(x);
            i += 1;
        }
        Ok(Self {
            min,
            max,
            step,
            samples,
        })
    }

    pub fn samples(&self) -> &[f64] {
        &self.samples
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    /// Clamp a crisp value onto the sampled range. Values past either end
    /// evaluate at the boundary sample instead of extrapolating.
    pub fn clamp(&self, x: f64) -> f64 {
        let last = self.samples[self.samples.len() - 1];
        x.clamp(self.min, last)
    }
}

/// Whether a variable is read from sensor state or written as a control output.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VariableRole {
    Antecedent,
    Consequent,
}

/// A named variable with a universe and labeled membership terms.
#[derive(Clone, Debug)]
pub struct LinguisticVariable {
    name: String,
    role: VariableRole,
    universe: Universe,
    terms: Vec<(String, MembershipFunction)>,
}

impl LinguisticVariable {
    pub fn antecedent(name: impl Into<String>, universe: Universe) -> Self {
        Self {
            name: name.into(),
            role: VariableRole::Antecedent,
            universe,
            terms: Vec::new(),
        }
    }

    pub fn consequent(name: impl Into<String>, universe: Universe) -> Self {
        Self {
            name: name.into(),
            role: VariableRole::Consequent,
            universe,
            terms: Vec::new(),
        }
    }

    /// Attach a labeled membership term. Labels are unique per variable.
    pub fn term(
        mut self,
        label: impl Into<String>,
        function: MembershipFunction,
    ) -> Result<Self, FuzzyError> {
        let label = label.into();
        if self.terms.iter().any(|(existing, _)| *existing == label) {
            return Err(FuzzyError::DuplicateLabel {
                variable: self.name,
                label,
            });
        }
        self.terms.push((label, function));
        Ok(self)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn role(&self) -> VariableRole {
        self.role
    }

    pub fn universe(&self) -> &Universe {
        &self.universe
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.terms.iter().map(|(label, _)| label.as_str())
    }

    pub fn membership(&self, label: &str) -> Option<&MembershipFunction> {
        self.terms
            .iter()
            .find(|(existing, _)| existing == label)
            .map(|(_, function)| function)
    }

    /// Degree of every term at the (clamped) crisp value.
    pub fn fuzzify(&self, crisp: f64) -> BTreeMap<String, f64> {
        let x = self.universe.clamp(crisp);
        self.terms
            .iter()
            .map(|(label, function)| (label.clone(), function.evaluate(x)))
            .collect()
    }
}

/// Named lookup over the fixed set of input and output variables.
#[derive(Clone, Debug, Default)]
pub struct VariableRegistry {
    variables: Vec<LinguisticVariable>,
}

impl VariableRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, variable: LinguisticVariable) -> Result<(), FuzzyError> {
        if self.get(variable.name()).is_some() {
            return Err(FuzzyError::DuplicateVariable {
                name: variable.name().to_string(),
            });
        }
        self.variables.push(variable);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&LinguisticVariable> {
        self.variables.iter().find(|v| v.name() == name)
    }

    pub fn variables(&self) -> &[LinguisticVariable] {
        &self.variables
    }

    pub fn fuzzify(&self, name: &str, crisp: f64) -> Result<BTreeMap<String, f64>, FuzzyError> {
        let variable = self.get(name).ok_or_else(|| FuzzyError::UnknownVariable {
            name: name.to_string(),
        })?;
        Ok(variable.fuzzify(crisp))
    }
}
