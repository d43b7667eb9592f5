//! Rule data model: antecedent clause trees and consequent assignments.
//!
//! Rules are plain data; all reference checking happens once when the
//! `InferenceEngine` is built, never per tick.

/// A boolean-style condition tree over (variable, label) membership lookups.
#[derive(Clone, Debug)]
pub enum Clause {
    Is { variable: String, label: String },
    And(Vec<Clause>),
    Or(Vec<Clause>),
    Not(Box<Clause>),
}

impl Clause {
    pub fn is(variable: impl Into<String>, label: impl Into<String>) -> Self {
        Self::Is {
            variable: variable.into(),
            label: label.into(),
        }
    }

    pub fn not(clause: Clause) -> Self {
        Self::Not(Box::new(clause))
    }

    pub fn and(self, other: Clause) -> Self {
        match self {
            Self::And(mut children) => {
                children.push(other);
                Self::And(children)
            }
            first => Self::And(vec![first, other]),
        }
    }

    pub fn or(self, other: Clause) -> Self {
        match self {
            Self::Or(mut children) => {
                children.push(other);
                Self::Or(children)
            }
            first => Self::Or(vec![first, other]),
        }
    }
}

/// One (output variable, label) assignment made when a rule fires.
#[derive(Clone, Debug)]
pub struct Consequent {
    pub variable: String,
    pub label: String,
}

/// Antecedent clause, one or more consequents, and a weight in [0,1]
/// that scales the firing strength.
#[derive(Clone, Debug)]
pub struct Rule {
    pub antecedent: Clause,
    pub consequents: Vec<Consequent>,
    pub weight: f64,
}

impl Rule {
    pub fn when(antecedent: Clause) -> Self {
        Self {
            antecedent,
            consequents: Vec::new(),
            weight: 1.0,
        }
    }

    pub fn then(mut self, variable: impl Into<String>, label: impl Into<String>) -> Self {
        self.consequents.push(Consequent {
            variable: variable.into(),
            label: label.into(),
        });
        self
    }

    pub fn weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }
}
