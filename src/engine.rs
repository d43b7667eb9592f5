//! Mamdani inference: firing strengths (min/max/complement), clipped-max
//! aggregation over each output universe, and centroid defuzzification.
//!
//! The engine validates its whole configuration once at construction and is
//! immutable afterwards; `infer` takes `&self` and carries no state between
//! cycles, so one engine can serve any number of ticks or threads.

use crate::error::FuzzyError;
use crate::rule::{Clause, Rule};
use crate::variable::{VariableRegistry, VariableRole};
use std::collections::BTreeMap;

/// Crisp sensor readings for one inference cycle, keyed by variable name.
pub type CrispInputs = BTreeMap<String, f64>;

/// Aggregated fuzzy set for one output variable, rebuilt every cycle.
#[derive(Clone, Debug)]
pub struct FuzzyOutputSet {
    variable: String,
    samples: Vec<f64>,
    degrees: Vec<f64>,
}

impl FuzzyOutputSet {
    pub fn variable(&self) -> &str {
        &self.variable
    }

    pub fn samples(&self) -> &[f64] {
        &self.samples
    }

    pub fn degrees(&self) -> &[f64] {
        &self.degrees
    }

    /// Centroid-of-area defuzzification: sum(x*mu) / sum(mu).
    pub fn centroid(&self) -> Result<f64, FuzzyError> {
        let total: f64 = self.degrees.iter().sum();
        if total <= 0.0 {
            return Err(FuzzyError::NoActivation {
                variable: self.variable.clone(),
            });
        }
        let moment: f64 = self
            .samples
            .iter()
            .zip(&self.degrees)
            .map(|(x, mu)| x * mu)
            .sum();
        Ok(moment / total)
    }
}

/// One cycle's aggregated output sets, one per consequent variable.
#[derive(Clone, Debug)]
pub struct FuzzyOutputs {
    sets: Vec<FuzzyOutputSet>,
}

impl FuzzyOutputs {
    pub fn sets(&self) -> &[FuzzyOutputSet] {
        &self.sets
    }

    pub fn set(&self, variable: &str) -> Option<&FuzzyOutputSet> {
        self.sets.iter().find(|set| set.variable == variable)
    }

    /// Defuzzified value for one output variable. `NoActivation` when no
    /// rule fired for it; the fallback policy is the caller's decision.
    pub fn crisp(&self, variable: &str) -> Result<f64, FuzzyError> {
        let set = self.set(variable).ok_or_else(|| FuzzyError::UnknownVariable {
            name: variable.to_string(),
        })?;
        set.centroid()
    }
}

/// Immutable variable registry + rule base, validated once at construction.
#[derive(Clone, Debug)]
pub struct InferenceEngine {
    registry: VariableRegistry,
    rules: Vec<Rule>,
}

impl InferenceEngine {
    pub fn new(registry: VariableRegistry, rules: Vec<Rule>) -> Result<Self, FuzzyError> {
        for (index, rule) in rules.iter().enumerate() {
            validate_clause(&registry, index, &rule.antecedent)?;
            if rule.consequents.is_empty() {
                return Err(FuzzyError::InvalidRule {
                    rule: index,
                    reason: "rule has no consequents".to_string(),
                });
            }
            if !rule.weight.is_finite() || !(0.0..=1.0).contains(&rule.weight) {
                return Err(FuzzyError::InvalidRule {
                    rule: index,
                    reason: format!("weight {} outside [0,1]", rule.weight),
                });
            }
            for consequent in &rule.consequents {
                let variable = registry.get(&consequent.variable).ok_or_else(|| {
                    FuzzyError::InvalidRule {
                        rule: index,
                        reason: format!("unknown output variable '{}'", consequent.variable),
                    }
                })?;
                if variable.role() != VariableRole::Consequent {
                    return Err(FuzzyError::InvalidRule {
                        rule: index,
                        reason: format!("'{}' is not a consequent variable", consequent.variable),
                    });
                }
                if variable.membership(&consequent.label).is_none() {
                    return Err(FuzzyError::InvalidRule {
                        rule: index,
                        reason: format!(
                            "variable '{}' has no term '{}'",
                            consequent.variable, consequent.label
                        ),
                    });
                }
            }
        }
        Ok(Self { registry, rules })
    }

    pub fn registry(&self) -> &VariableRegistry {
        &self.registry
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// One full inference cycle: fuzzify every supplied input, fire every
    /// rule, aggregate per output variable.
    pub fn infer(&self, inputs: &CrispInputs) -> Result<FuzzyOutputs, FuzzyError> {
        let mut fuzzified: BTreeMap<&str, BTreeMap<String, f64>> = BTreeMap::new();
        for (name, &crisp) in inputs {
            let variable = self
                .registry
                .get(name)
                .filter(|v| v.role() == VariableRole::Antecedent)
                .ok_or_else(|| FuzzyError::UnknownVariable { name: name.clone() })?;
            fuzzified.insert(variable.name(), variable.fuzzify(crisp));
        }

        let mut sets: Vec<FuzzyOutputSet> = self
            .registry
            .variables()
            .iter()
            .filter(|v| v.role() == VariableRole::Consequent)
            .map(|v| FuzzyOutputSet {
                variable: v.name().to_string(),
                samples: v.universe().samples().to_vec(),
                degrees: vec![0.0; v.universe().samples().len()],
            })
            .collect();

        for rule in &self.rules {
            let strength =
                (self.clause_strength(&rule.antecedent, &fuzzified)? * rule.weight).clamp(0.0, 1.0);
            if strength <= 0.0 {
                continue;
            }
            for consequent in &rule.consequents {
                let Some(function) = self
                    .registry
                    .get(&consequent.variable)
                    .and_then(|v| v.membership(&consequent.label))
                else {
                    continue; // unreachable after construction-time validation
                };
                let Some(set) = sets.iter_mut().find(|s| s.variable == consequent.variable)
                else {
                    continue;
                };
                for (sample, degree) in set.samples.iter().zip(set.degrees.iter_mut()) {
                    let clipped = function.evaluate(*sample).min(strength);
                    if clipped > *degree {
                        *degree = clipped;
                    }
                }
            }
        }

        Ok(FuzzyOutputs { sets })
    }

    fn clause_strength(
        &self,
        clause: &Clause,
        fuzzified: &BTreeMap<&str, BTreeMap<String, f64>>,
    ) -> Result<f64, FuzzyError> {
        match clause {
            Clause::Is { variable, label } => {
                let degrees =
                    fuzzified
                        .get(variable.as_str())
                        .ok_or_else(|| FuzzyError::MissingInput {
                            variable: variable.clone(),
                        })?;
                Ok(degrees.get(label.as_str()).copied().unwrap_or(0.0))
            }
            Clause::And(children) => {
                let mut strength = 1.0f64;
                for child in children {
                    strength = strength.min(self.clause_strength(child, fuzzified)?);
                }
                Ok(strength)
            }
            Clause::Or(children) => {
                let mut strength = 0.0f64;
                for child in children {
                    strength = strength.max(self.clause_strength(child, fuzzified)?);
                }
                Ok(strength)
            }
            Clause::Not(inner) => Ok(1.0 - self.clause_strength(inner, fuzzified)?),
        }
    }
}

fn validate_clause(
    registry: &VariableRegistry,
    index: usize,
    clause: &Clause,
) -> Result<(), FuzzyError> {
    match clause {
        Clause::Is { variable, label } => {
            let found = registry.get(variable).ok_or_else(|| FuzzyError::InvalidRule {
                rule: index,
                reason: format!("unknown input variable '{variable}'"),
            })?;
            if found.role() != VariableRole::Antecedent {
                return Err(FuzzyError::InvalidRule {
                    rule: index,
                    reason: format!("'{variable}' is not an antecedent variable"),
                });
            }
            if found.membership(label).is_none() {
                return Err(FuzzyError::InvalidRule {
                    rule: index,
                    reason: format!("variable '{variable}' has no term '{label}'"),
                });
            }
            Ok(())
        }
        Clause::And(children) | Clause::Or(children) => {
            if children.is_empty() {
                return Err(FuzzyError::InvalidRule {
                    rule: index,
                    reason: "empty clause group".to_string(),
                });
            }
            for child in children {
                validate_clause(registry, index, child)?;
            }
            Ok(())
        }
        Clause::Not(inner) => validate_clause(registry, index, inner),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::membership::MembershipFunction;
    use crate::variable::{LinguisticVariable, Universe};

    fn test_registry() -> VariableRegistry {
        let mut registry = VariableRegistry::new();
        registry
            .register(
                LinguisticVariable::antecedent("distance", Universe::new(0.0, 1000.0, 1.0).unwrap())
                    .term("close", MembershipFunction::triangular(0.0, 0.0, 400.0).unwrap())
                    .unwrap()
                    .term("far", MembershipFunction::triangular(200.0, 600.0, 1000.0).unwrap())
                    .unwrap(),
            )
            .unwrap();
        registry
            .register(
                LinguisticVariable::antecedent("speed", Universe::new(-240.0, 240.0, 1.0).unwrap())
                    .term("slow", MembershipFunction::triangular(-60.0, 0.0, 60.0).unwrap())
                    .unwrap()
                    .term("fast", MembershipFunction::triangular(0.0, 240.0, 240.0).unwrap())
                    .unwrap(),
            )
            .unwrap();
        registry
            .register(
                LinguisticVariable::consequent("thrust", Universe::new(-480.0, 480.0, 1.0).unwrap())
                    .term("brake", MembershipFunction::triangular(-480.0, -240.0, 0.0).unwrap())
                    .unwrap()
                    .term("coast", MembershipFunction::triangular(-120.0, 0.0, 120.0).unwrap())
                    .unwrap()
                    .term("burn", MembershipFunction::triangular(0.0, 240.0, 480.0).unwrap())
                    .unwrap(),
            )
            .unwrap();
        registry
    }

    fn inputs(distance: f64, speed: f64) -> CrispInputs {
        let mut map = CrispInputs::new();
        map.insert("distance".to_string(), distance);
        map.insert("speed".to_string(), speed);
        map
    }

    #[test]
    fn conjunction_is_min_disjunction_is_max_negation_is_complement() {
        let engine = InferenceEngine::new(
            test_registry(),
            vec![
                Rule::when(Clause::is("distance", "far").and(Clause::is("speed", "fast")))
                    .then("thrust", "coast"),
                Rule::when(Clause::is("distance", "far").or(Clause::is("speed", "fast")))
                    .then("thrust", "burn"),
                Rule::when(Clause::not(Clause::is("speed", "fast"))).then("thrust", "brake"),
            ],
        )
        .unwrap();

        // distance 400 -> far = 0.5; speed 60 -> fast = 0.25
        let crisp = inputs(400.0, 60.0);
        let fuzzified: BTreeMap<&str, BTreeMap<String, f64>> = crisp
            .iter()
            .map(|(name, &value)| {
                let variable = engine.registry().get(name).unwrap();
                (variable.name(), variable.fuzzify(value))
            })
            .collect();

        let and = engine
            .clause_strength(&engine.rules()[0].antecedent, &fuzzified)
            .unwrap();
        let or = engine
            .clause_strength(&engine.rules()[1].antecedent, &fuzzified)
            .unwrap();
        let not = engine
            .clause_strength(&engine.rules()[2].antecedent, &fuzzified)
            .unwrap();
        assert!((and - 0.25).abs() < 1e-9, "and={and}");
        assert!((or - 0.5).abs() < 1e-9, "or={or}");
        assert!((not - 0.75).abs() < 1e-9, "not={not}");
    }

    #[test]
    fn centroid_of_symmetric_fully_activated_triangle_is_its_peak() {
        let engine = InferenceEngine::new(
            test_registry(),
            vec![Rule::when(Clause::is("speed", "slow")).then("thrust", "coast")],
        )
        .unwrap();
        // speed 0 -> slow = 1.0, coast = triangular(-120, 0, 120) fully activated
        let outputs = engine.infer(&inputs(0.0, 0.0)).unwrap();
        let thrust = outputs.crisp("thrust").unwrap();
        assert!(thrust.abs() < 1.0, "thrust={thrust}");
    }

    #[test]
    fn rule_weight_scales_firing_strength() {
        let full = InferenceEngine::new(
            test_registry(),
            vec![Rule::when(Clause::is("distance", "far")).then("thrust", "burn")],
        )
        .unwrap();
        let halved = InferenceEngine::new(
            test_registry(),
            vec![Rule::when(Clause::is("distance", "far"))
                .then("thrust", "burn")
                .weight(0.5)],
        )
        .unwrap();
        // distance 600 -> far = 1.0
        let crisp = inputs(600.0, 0.0);
        let strong = full.infer(&crisp).unwrap();
        let weak = halved.infer(&crisp).unwrap();
        let peak_strong: f64 = strong.set("thrust").unwrap().degrees().iter().fold(0.0, |a, &b| a.max(b));
        let peak_weak: f64 = weak.set("thrust").unwrap().degrees().iter().fold(0.0, |a, &b| a.max(b));
        assert!((peak_strong - 1.0).abs() < 1e-9);
        assert!((peak_weak - 0.5).abs() < 1e-9);
    }

    #[test]
    fn aggregation_is_order_independent() {
        let rules = vec![
            Rule::when(Clause::is("distance", "far")).then("thrust", "burn"),
            Rule::when(Clause::is("distance", "close")).then("thrust", "brake"),
            Rule::when(Clause::is("speed", "slow")).then("thrust", "coast"),
            Rule::when(Clause::is("speed", "fast")).then("thrust", "brake").weight(0.6),
        ];
        let orderings: [[usize; 4]; 4] = [[0, 1, 2, 3], [3, 2, 1, 0], [2, 0, 3, 1], [1, 3, 0, 2]];
        let crisp = inputs(300.0, 40.0);
        let mut results = Vec::new();
        for order in orderings {
            let shuffled: Vec<Rule> = order.iter().map(|&i| rules[i].clone()).collect();
            let engine = InferenceEngine::new(test_registry(), shuffled).unwrap();
            let outputs = engine.infer(&crisp).unwrap();
            results.push((
                outputs.set("thrust").unwrap().degrees().to_vec(),
                outputs.crisp("thrust").unwrap(),
            ));
        }
        for (degrees, crisp_value) in &results[1..] {
            assert_eq!(degrees, &results[0].0);
            assert!((crisp_value - results[0].1).abs() < 1e-12);
        }
    }

    #[test]
    fn no_activation_is_reported_per_output() {
        let engine = InferenceEngine::new(
            test_registry(),
            vec![Rule::when(Clause::is("distance", "close")).then("thrust", "brake")],
        )
        .unwrap();
        // distance 800 -> close = 0, the only rule stays silent
        let outputs = engine.infer(&inputs(800.0, 0.0)).unwrap();
        assert!(matches!(
            outputs.crisp("thrust"),
            Err(FuzzyError::NoActivation { .. })
        ));
    }

    #[test]
    fn invalid_rules_fail_at_construction() {
        let unknown_var = InferenceEngine::new(
            test_registry(),
            vec![Rule::when(Clause::is("altitude", "high")).then("thrust", "burn")],
        );
        assert!(matches!(unknown_var, Err(FuzzyError::InvalidRule { rule: 0, .. })));

        let unknown_label = InferenceEngine::new(
            test_registry(),
            vec![Rule::when(Clause::is("distance", "enormous")).then("thrust", "burn")],
        );
        assert!(matches!(unknown_label, Err(FuzzyError::InvalidRule { .. })));

        let wrong_role = InferenceEngine::new(
            test_registry(),
            vec![Rule::when(Clause::is("thrust", "burn")).then("thrust", "burn")],
        );
        assert!(matches!(wrong_role, Err(FuzzyError::InvalidRule { .. })));

        let no_consequent = InferenceEngine::new(
            test_registry(),
            vec![Rule::when(Clause::is("distance", "far"))],
        );
        assert!(matches!(no_consequent, Err(FuzzyError::InvalidRule { .. })));

        let bad_weight = InferenceEngine::new(
            test_registry(),
            vec![Rule::when(Clause::is("distance", "far"))
                .then("thrust", "burn")
                .weight(1.5)],
        );
        assert!(matches!(bad_weight, Err(FuzzyError::InvalidRule { .. })));

        let output_in_antecedent = InferenceEngine::new(
            test_registry(),
            vec![Rule::when(Clause::is("distance", "far")).then("speed", "fast")],
        );
        assert!(matches!(output_in_antecedent, Err(FuzzyError::InvalidRule { .. })));
    }

    #[test]
    fn unknown_and_missing_inputs_fail_at_inference() {
        let engine = InferenceEngine::new(
            test_registry(),
            vec![Rule::when(Clause::is("distance", "far")).then("thrust", "burn")],
        )
        .unwrap();

        let mut bogus = CrispInputs::new();
        bogus.insert("altitude".to_string(), 10.0);
        assert!(matches!(
            engine.infer(&bogus),
            Err(FuzzyError::UnknownVariable { .. })
        ));

        let empty = CrispInputs::new();
        assert!(matches!(
            engine.infer(&empty),
            Err(FuzzyError::MissingInput { .. })
        ));
    }
}
