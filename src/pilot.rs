//! Kessler-style ship controller built on the inference engine.
//!
//! Nine antecedents (own/enemy speed, asteroid distance and bearings,
//! asteroid size, both healths) drive three consequents (thrust, rotation,
//! fire). Variables and rules are fixed at construction; each tick is one
//! stateless inference cycle over the current observation.

use crate::engine::{CrispInputs, FuzzyOutputs, InferenceEngine};
use crate::error::FuzzyError;
use crate::membership::MembershipFunction;
use crate::rule::{Clause, Rule};
use crate::variable::{LinguisticVariable, Universe, VariableRegistry};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

pub const SHIP_CURRENT_SPEED: &str = "ship_current_speed";
pub const ENEMY_CURRENT_SPEED: &str = "enemy_current_speed";
pub const CURRENT_DISTANCE: &str = "current_distance";
pub const SHIP_ASTEROID_ANGLE: &str = "ship_asteroid_angle";
pub const ASTEROID_MOVING_ANGLE: &str = "asteroid_moving_angle";
pub const SHIP_ENEMY_ANGLE: &str = "ship_enemy_angle";
pub const ASTEROID_SIZE: &str = "asteroid_size";
pub const SHIP_HEALTH: &str = "ship_health";
pub const ENEMY_HEALTH: &str = "enemy_health";

pub const THRUST: &str = "thrust";
pub const SHIP_ROTATION: &str = "ship_rotation";
pub const FIRE: &str = "fire";

/// Defuzzified fire level at or above this fires the cannon.
pub const FIRE_THRESHOLD: f64 = 0.5;

/// One tick's crisp sensor readings from the host simulation.
///
/// Units: speeds in m/s over [-240, 240], distance in m over [0, 1000],
/// angles in rad over [-pi, pi], asteroid size over [0, 100], healths in
/// hits remaining {1, 2, 3}.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct ShipObservation {
    pub ship_current_speed: f64,
    pub enemy_current_speed: f64,
    pub current_distance: f64,
    pub ship_asteroid_angle: f64,
    pub asteroid_moving_angle: f64,
    pub ship_enemy_angle: f64,
    pub asteroid_size: f64,
    pub ship_health: f64,
    pub enemy_health: f64,
}

impl ShipObservation {
    pub fn as_inputs(&self) -> CrispInputs {
        let mut inputs = CrispInputs::new();
        inputs.insert(SHIP_CURRENT_SPEED.to_string(), self.ship_current_speed);
        inputs.insert(ENEMY_CURRENT_SPEED.to_string(), self.enemy_current_speed);
        inputs.insert(CURRENT_DISTANCE.to_string(), self.current_distance);
        inputs.insert(SHIP_ASTEROID_ANGLE.to_string(), self.ship_asteroid_angle);
        inputs.insert(ASTEROID_MOVING_ANGLE.to_string(), self.asteroid_moving_angle);
        inputs.insert(SHIP_ENEMY_ANGLE.to_string(), self.ship_enemy_angle);
        inputs.insert(ASTEROID_SIZE.to_string(), self.asteroid_size);
        inputs.insert(SHIP_HEALTH.to_string(), self.ship_health);
        inputs.insert(ENEMY_HEALTH.to_string(), self.enemy_health);
        inputs
    }
}

impl Default for ShipObservation {
    fn default() -> Self {
        Self {
            ship_current_speed: 0.0,
            enemy_current_speed: 0.0,
            current_distance: 400.0,
            ship_asteroid_angle: 0.0,
            asteroid_moving_angle: 0.0,
            ship_enemy_angle: 0.0,
            asteroid_size: 25.0,
            ship_health: 3.0,
            enemy_health: 3.0,
        }
    }
}

/// Crisp control outputs for one tick.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct ShipCommand {
    /// Thrust in [-480, 480].
    pub thrust: f64,
    /// Rotation in [-180, 180] degrees.
    pub rotation: f64,
    /// Raw defuzzified fire output in [0, 1].
    pub fire_level: f64,
    /// `fire_level >= FIRE_THRESHOLD`.
    pub fire: bool,
}

impl ShipCommand {
    pub fn neutral() -> Self {
        Self {
            thrust: 0.0,
            rotation: 0.0,
            fire_level: 0.0,
            fire: false,
        }
    }
}

/// What to do when no rule activates an output variable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FallbackPolicy {
    /// Repeat the previous tick's value for that output.
    HoldLast,
    /// Zero thrust and rotation, hold fire.
    Neutral,
}

/// The fuzzy ship controller: engine handle plus the fallback state.
pub struct FuzzyPilot {
    engine: InferenceEngine,
    fallback: FallbackPolicy,
    last: ShipCommand,
}

impl FuzzyPilot {
    pub fn new(fallback: FallbackPolicy) -> Result<Self, FuzzyError> {
        let engine = InferenceEngine::new(build_registry()?, build_rules())?;
        Ok(Self {
            engine,
            fallback,
            last: ShipCommand::neutral(),
        })
    }

    pub fn engine(&self) -> &InferenceEngine {
        &self.engine
    }

    /// One inference cycle over the tick's observation.
    pub fn next_command(&mut self, observation: &ShipObservation) -> Result<ShipCommand, FuzzyError> {
        let outputs = self.engine.infer(&observation.as_inputs())?;
        let thrust = self.resolve(&outputs, THRUST, self.last.thrust)?;
        let rotation = self.resolve(&outputs, SHIP_ROTATION, self.last.rotation)?;
        let fire_level = self.resolve(&outputs, FIRE, self.last.fire_level)?;
        let command = ShipCommand {
            thrust,
            rotation,
            fire_level,
            fire: fire_level >= FIRE_THRESHOLD,
        };
        self.last = command;
        Ok(command)
    }

    fn resolve(
        &self,
        outputs: &FuzzyOutputs,
        variable: &str,
        previous: f64,
    ) -> Result<f64, FuzzyError> {
        match outputs.crisp(variable) {
            Ok(value) => Ok(value),
            Err(FuzzyError::NoActivation { .. }) => Ok(match self.fallback {
                FallbackPolicy::HoldLast => previous,
                FallbackPolicy::Neutral => 0.0,
            }),
            Err(err) => Err(err),
        }
    }
}

/// Speed variable over [-240, 240) m/s, five terms.
fn speed_variable(name: &str) -> Result<LinguisticVariable, FuzzyError> {
    LinguisticVariable::antecedent(name, Universe::new(-240.0, 240.0, 1.0)?)
        .term("negative_fast", MembershipFunction::triangular(-240.0, -240.0, -120.0)?)?
        .term("negative_slow", MembershipFunction::triangular(-240.0, -120.0, 0.0)?)?
        .term("zero", MembershipFunction::triangular(-60.0, 0.0, 60.0)?)?
        .term("positive_slow", MembershipFunction::triangular(0.0, 120.0, 240.0)?)?
        .term("positive_fast", MembershipFunction::triangular(120.0, 240.0, 240.0)?)
}

/// Bearing variable over [-pi, pi) rad, five terms with sigmoid shoulders.
fn bearing_variable(name: &str) -> Result<LinguisticVariable, FuzzyError> {
    LinguisticVariable::antecedent(name, Universe::new(-PI, PI, 0.01)?)
        .term("negative_large", MembershipFunction::z_shaped(-PI / 3.0, -PI / 6.0)?)?
        .term("negative_small", MembershipFunction::triangular(-PI / 3.0, -PI / 6.0, 0.0)?)?
        .term("zero", MembershipFunction::triangular(-PI / 6.0, 0.0, PI / 6.0)?)?
        .term("positive_small", MembershipFunction::triangular(0.0, PI / 6.0, PI / 3.0)?)?
        .term("positive_large", MembershipFunction::s_shaped(PI / 6.0, PI / 3.0)?)
}

/// Hits-remaining variable over {1, 2, 3}, impulse terms.
fn health_variable(name: &str) -> Result<LinguisticVariable, FuzzyError> {
    LinguisticVariable::antecedent(name, Universe::new(1.0, 4.0, 1.0)?)
        .term("three_hits_left", MembershipFunction::triangular(3.0, 3.0, 3.0)?)?
        .term("two_hits_left", MembershipFunction::triangular(2.0, 2.0, 2.0)?)?
        .term("one_hit_left", MembershipFunction::triangular(1.0, 1.0, 1.0)?)
}

fn build_registry() -> Result<VariableRegistry, FuzzyError> {
    let mut registry = VariableRegistry::new();

    registry.register(speed_variable(SHIP_CURRENT_SPEED)?)?;
    registry.register(speed_variable(ENEMY_CURRENT_SPEED)?)?;

    registry.register(
        LinguisticVariable::antecedent(CURRENT_DISTANCE, Universe::new(0.0, 1000.0, 1.0)?)
            .term("super_close", MembershipFunction::triangular(0.0, 0.0, 100.0)?)?
            .term("close", MembershipFunction::triangular(0.0, 100.0, 200.0)?)?
            .term("medium", MembershipFunction::triangular(100.0, 200.0, 300.0)?)?
            .term("far", MembershipFunction::triangular(200.0, 300.0, 400.0)?)?
            .term("super_far", MembershipFunction::triangular(300.0, 400.0, 1000.0)?)?,
    )?;

    registry.register(bearing_variable(SHIP_ASTEROID_ANGLE)?)?;
    registry.register(bearing_variable(ASTEROID_MOVING_ANGLE)?)?;
    registry.register(bearing_variable(SHIP_ENEMY_ANGLE)?)?;

    registry.register(
        LinguisticVariable::antecedent(ASTEROID_SIZE, Universe::new(0.0, 100.0, 1.0)?)
            .term("small", MembershipFunction::triangular(0.0, 0.0, 25.0)?)?
            .term("medium", MembershipFunction::triangular(0.0, 25.0, 50.0)?)?
            .term("large", MembershipFunction::triangular(25.0, 50.0, 75.0)?)?
            .term("huge", MembershipFunction::triangular(50.0, 75.0, 100.0)?)?,
    )?;

    registry.register(health_variable(SHIP_HEALTH)?)?;
    registry.register(health_variable(ENEMY_HEALTH)?)?;

    registry.register(
        LinguisticVariable::consequent(THRUST, Universe::new(-480.0, 480.0, 1.0)?)
            .term("negative_fast", MembershipFunction::triangular(-480.0, -480.0, -240.0)?)?
            .term("negative_slow", MembershipFunction::triangular(-480.0, -240.0, 0.0)?)?
            .term("zero", MembershipFunction::triangular(-120.0, 0.0, 120.0)?)?
            .term("positive_slow", MembershipFunction::triangular(0.0, 240.0, 480.0)?)?
            .term("positive_fast", MembershipFunction::triangular(240.0, 480.0, 480.0)?)?,
    )?;

    registry.register(
        LinguisticVariable::consequent(SHIP_ROTATION, Universe::new(-180.0, 180.0, 1.0)?)
            .term("negative_large", MembershipFunction::z_shaped(-180.0, -30.0)?)?
            .term("negative_small", MembershipFunction::triangular(-180.0, -30.0, 0.0)?)?
            .term("zero", MembershipFunction::triangular(-30.0, 0.0, 30.0)?)?
            .term("positive_small", MembershipFunction::triangular(0.0, 30.0, 180.0)?)?
            .term("positive_large", MembershipFunction::s_shaped(30.0, 180.0)?)?,
    )?;

    registry.register(
        LinguisticVariable::consequent(FIRE, Universe::new(0.0, 1.01, 0.01)?)
            .term("no", MembershipFunction::triangular(0.0, 0.0, 1.0)?)?
            .term("yes", MembershipFunction::triangular(0.0, 1.0, 1.0)?)?,
    )?;

    Ok(registry)
}

/// The Mamdani rule base.
///
/// Intent: close on distant asteroids, hold or back off when near, retreat
/// hard on the last hit, steer to null the asteroid bearing (enemy bearing
/// takes over when no asteroid is near), and fire only when roughly aligned
/// and in range.
fn build_rules() -> Vec<Rule> {
    let d = |label| Clause::is(CURRENT_DISTANCE, label);
    let ss = |label| Clause::is(SHIP_CURRENT_SPEED, label);
    let saa = |label| Clause::is(SHIP_ASTEROID_ANGLE, label);
    let ama = |label| Clause::is(ASTEROID_MOVING_ANGLE, label);
    let sea = |label| Clause::is(SHIP_ENEMY_ANGLE, label);
    let sz = |label| Clause::is(ASTEROID_SIZE, label);
    let sh = |label| Clause::is(SHIP_HEALTH, label);
    let eh = |label| Clause::is(ENEMY_HEALTH, label);

    vec![
        // Thrust: approach by distance band, brake excess speed, flee when crippled.
        Rule::when(d("super_far")).then(THRUST, "positive_fast"),
        Rule::when(d("far")).then(THRUST, "positive_slow"),
        Rule::when(d("medium").and(ss("zero"))).then(THRUST, "positive_slow"),
        Rule::when(d("medium").and(ss("positive_fast"))).then(THRUST, "zero"),
        Rule::when(d("close")).then(THRUST, "zero"),
        Rule::when(d("super_close")).then(THRUST, "negative_fast"),
        Rule::when(sh("one_hit_left").and(d("close").or(d("super_close"))))
            .then(THRUST, "negative_fast"),
        Rule::when(ss("positive_fast").and(Clause::not(d("super_far"))))
            .then(THRUST, "negative_slow")
            .weight(0.6),
        Rule::when(sea("zero").and(eh("one_hit_left")))
            .then(THRUST, "positive_slow")
            .weight(0.7),
        // Rotation: null the asteroid bearing; track the enemy once asteroids are distant.
        Rule::when(saa("negative_large")).then(SHIP_ROTATION, "negative_large"),
        Rule::when(saa("negative_small")).then(SHIP_ROTATION, "negative_small"),
        Rule::when(saa("zero")).then(SHIP_ROTATION, "zero"),
        Rule::when(saa("positive_small")).then(SHIP_ROTATION, "positive_small"),
        Rule::when(saa("positive_large")).then(SHIP_ROTATION, "positive_large"),
        Rule::when(d("super_far").and(sea("negative_large")))
            .then(SHIP_ROTATION, "negative_large")
            .weight(0.5),
        Rule::when(d("super_far").and(sea("positive_large")))
            .then(SHIP_ROTATION, "positive_large")
            .weight(0.5),
        // Fire: aligned and in range, or finishing shots; hold fire otherwise.
        Rule::when(saa("zero").and(d("super_close").or(d("close")).or(d("medium"))))
            .then(FIRE, "yes"),
        Rule::when(saa("zero").and(d("far")).and(sz("small")))
            .then(FIRE, "yes")
            .weight(0.8),
        Rule::when(saa("zero").and(d("far")).and(ama("zero")))
            .then(FIRE, "yes")
            .weight(0.5),
        Rule::when(Clause::not(saa("zero"))).then(FIRE, "no"),
        Rule::when(d("super_far")).then(FIRE, "no"),
        Rule::when(sea("zero").and(eh("one_hit_left")))
            .then(FIRE, "yes")
            .weight(0.9),
        Rule::when(sh("one_hit_left").and(d("super_close")))
            .then(FIRE, "yes")
            .weight(0.9),
    ]
}
