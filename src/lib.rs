//! Mamdani fuzzy inference engine and the spaceship controller built on it.
//!
//! The engine half (membership functions, linguistic variables, rules,
//! aggregation, centroid defuzzification) is generic; the pilot half wires
//! it into the fixed Kessler-style variable set and rule base. The host
//! simulation feeds crisp observations per tick and applies the resulting
//! thrust/rotation/fire command; nothing here touches the game loop.

pub mod engine;
pub mod error;
pub mod membership;
pub mod pilot;
pub mod rule;
pub mod sweep;
pub mod variable;

pub use engine::{CrispInputs, FuzzyOutputSet, FuzzyOutputs, InferenceEngine};
pub use error::FuzzyError;
pub use membership::MembershipFunction;
pub use pilot::{FallbackPolicy, FuzzyPilot, ShipCommand, ShipObservation};
pub use rule::{Clause, Consequent, Rule};
pub use variable::{LinguisticVariable, Universe, VariableRegistry, VariableRole};
