//! Ready-made control systems for the car and the spaceship
//!
//! Inputs are ray distances (or differences of them) and the current speed.
//! Outputs are gas and brake on [-0.25, 1.25] and steer on [-1.5, 1.5]; the
//! margins let the sigmoid shoulders settle before the domain ends.

use super::error::Result;
use super::membership::MembershipFunction as Mf;
use super::rule::{Rule, TermRef};
use super::system::{ControlSystem, InferenceOptions};
use super::variable::LinguisticVariable;

pub const VELOCITY: &str = "velocity";
pub const BALANCE: &str = "balance";
pub const SIDE: &str = "side";
pub const HEAD: &str = "head";
pub const WALL_BALANCE: &str = "w_balance";
pub const WALL_SIDE: &str = "w_side";
pub const WALL_HEAD: &str = "w_head";
pub const ENEMY_BALANCE: &str = "e_balance";
pub const ENEMY_SIDE: &str = "e_side";
pub const ENEMY_HEAD: &str = "e_head";
pub const GAS: &str = "gas";
pub const BRAKE: &str = "brake";
pub const STEER: &str = "steer";

/// Weight that lets "keep straight" only nudge the steering
const STEER_NONE_WEIGHT: f64 = 0.1;

fn t(variable: &str, label: &str) -> TermRef {
    TermRef::new(variable, label)
}

fn velocity() -> Result<LinguisticVariable> {
    LinguisticVariable::antecedent(VELOCITY, 0.0, 200.0)?
        .with_term("SLOW", Mf::trapezoid(0.0, 0.0, 0.0, 75.0)?)?
        .with_term("MEDIUM", Mf::trapezoid(50.0, 100.0, 100.0, 150.0)?)?
        .with_term("FAST", Mf::trapezoid(75.0, 200.0, 200.0, 200.0)?)
}

/// LEFT / CENTER / RIGHT over [-range, range] with a core of +-`center`
fn lateral(name: &str, range: f64, center: f64) -> Result<LinguisticVariable> {
    LinguisticVariable::antecedent(name, -range, range)?
        .with_term("LEFT", Mf::trapezoid(-range, -range, -range, 0.0)?)?
        .with_term("CENTER", Mf::trapezoid(-center, 0.0, 0.0, center)?)?
        .with_term("RIGHT", Mf::trapezoid(0.0, range, range, range)?)
}

/// CLOSE / AWAY over [0, range]
fn forward(name: &str, range: f64) -> Result<LinguisticVariable> {
    LinguisticVariable::antecedent(name, 0.0, range)?
        .with_term("CLOSE", Mf::trapezoid(0.0, 0.0, range * 0.125, range * 0.625)?)?
        .with_term("AWAY", Mf::trapezoid(range * 0.375, range, range, range)?)
}

fn pedal(name: &str) -> Result<LinguisticVariable> {
    LinguisticVariable::consequent(name, -0.25, 1.25)?
        .with_term("NONE", Mf::sigmoid(0.05, -40.0)?)?
        .with_term("SOFT", Mf::sigmoid(0.33, -10.0)?)?
        .with_term("HARD", Mf::sigmoid(0.75, 20.0)?)
}

fn steer() -> Result<LinguisticVariable> {
    LinguisticVariable::consequent(STEER, -1.5, 1.5)?
        .with_term("RIGHT", Mf::sigmoid(-0.5, -10.0)?)?
        .with_term("NONE", Mf::gaussian(0.0, 0.10)?)?
        .with_term("LEFT", Mf::sigmoid(0.5, 10.0)?)
}

/// Steering rules that turn away from the nearer wall
fn avoid_walls(balance: &str, side: &str) -> Vec<Rule> {
    vec![
        Rule::new(t(balance, "LEFT"), [t(STEER, "RIGHT")]),
        Rule::new(t(balance, "RIGHT"), [t(STEER, "LEFT")]),
        Rule::new(
            t(balance, "CENTER") & t(side, "CENTER"),
            [t(STEER, "NONE").weighted(STEER_NONE_WEIGHT)],
        ),
        Rule::new(t(side, "LEFT"), [t(STEER, "RIGHT")]),
        Rule::new(t(side, "RIGHT"), [t(STEER, "LEFT")]),
    ]
}

/// Variables and rules of the track-following car
pub fn car_definition() -> Result<(Vec<LinguisticVariable>, Vec<Rule>)> {
    let variables = vec![
        velocity()?,
        lateral(BALANCE, 200.0, 50.0)?,
        lateral(SIDE, 100.0, 25.0)?,
        forward(HEAD, 200.0)?,
        pedal(GAS)?,
        pedal(BRAKE)?,
        steer()?,
    ];

    let mut rules = avoid_walls(BALANCE, SIDE);
    rules.extend([
        Rule::new(t(HEAD, "CLOSE"), [t(BRAKE, "HARD"), t(GAS, "NONE")]),
        Rule::new(
            t(HEAD, "AWAY") & t(BALANCE, "CENTER"),
            [t(BRAKE, "NONE"), t(GAS, "HARD")],
        ),
        Rule::new(
            t(HEAD, "AWAY") & !t(BALANCE, "CENTER"),
            [t(BRAKE, "NONE"), t(GAS, "SOFT")],
        ),
        Rule::new(t(VELOCITY, "SLOW"), [t(GAS, "SOFT")]),
    ]);
    Ok((variables, rules))
}

/// Variables and rules of the spaceship, which also chases an enemy
pub fn ship_definition() -> Result<(Vec<LinguisticVariable>, Vec<Rule>)> {
    let variables = vec![
        velocity()?,
        lateral(WALL_BALANCE, 200.0, 50.0)?,
        lateral(WALL_SIDE, 100.0, 25.0)?,
        forward(WALL_HEAD, 200.0)?,
        lateral(ENEMY_BALANCE, 500.0, 125.0)?,
        lateral(ENEMY_SIDE, 250.0, 25.0)?,
        forward(ENEMY_HEAD, 500.0)?,
        pedal(GAS)?,
        pedal(BRAKE)?,
        steer()?,
    ];

    let mut rules = avoid_walls(WALL_BALANCE, WALL_SIDE);
    rules.extend([
        Rule::new(t(WALL_HEAD, "CLOSE"), [t(BRAKE, "HARD"), t(GAS, "SOFT")]),
        Rule::new(
            t(WALL_HEAD, "AWAY") & t(WALL_BALANCE, "CENTER"),
            [t(BRAKE, "NONE"), t(GAS, "SOFT")],
        ),
        Rule::new(
            t(WALL_HEAD, "AWAY") & !t(WALL_BALANCE, "CENTER"),
            [t(BRAKE, "NONE"), t(GAS, "SOFT")],
        ),
        // steer toward the enemy: mirror of the wall rules
        Rule::new(t(ENEMY_BALANCE, "LEFT"), [t(STEER, "LEFT")]),
        Rule::new(t(ENEMY_BALANCE, "RIGHT"), [t(STEER, "RIGHT")]),
        Rule::new(
            t(ENEMY_BALANCE, "CENTER") & t(ENEMY_SIDE, "CENTER"),
            [t(STEER, "NONE").weighted(STEER_NONE_WEIGHT)],
        ),
        Rule::new(t(ENEMY_SIDE, "LEFT"), [t(STEER, "LEFT")]),
        Rule::new(t(ENEMY_SIDE, "RIGHT"), [t(STEER, "RIGHT")]),
        Rule::new(t(ENEMY_HEAD, "AWAY"), [t(GAS, "SOFT")]),
        Rule::new(t(VELOCITY, "SLOW"), [t(GAS, "SOFT")]),
    ]);
    Ok((variables, rules))
}

pub fn car_control_system(options: InferenceOptions) -> Result<ControlSystem> {
    let (variables, rules) = car_definition()?;
    ControlSystem::configure_with(variables, rules, options)
}

pub fn ship_control_system(options: InferenceOptions) -> Result<ControlSystem> {
    let (variables, rules) = ship_definition()?;
    ControlSystem::configure_with(variables, rules, options)
}
