//! Vehicle controllers
//!
//! A controller turns what the vehicle senses into `Controls`. The fuzzy
//! controllers keep the previous value of any control axis whose output
//! came back degenerate this tick.

use serde::{Deserialize, Serialize};

use super::vehicle::Controls;
use crate::fuzzy::presets::{
    BALANCE, BRAKE, ENEMY_BALANCE, ENEMY_HEAD, ENEMY_SIDE, GAS, HEAD, SIDE, STEER, VELOCITY,
    WALL_BALANCE, WALL_HEAD, WALL_SIDE, car_control_system, ship_control_system,
};
use crate::fuzzy::{ControlSystem, EngineError, InferenceOptions, Session, TickReport};
use crate::sensor::SensorReadings;

/// What a controller gets to look at each tick
#[derive(Debug, Clone, Copy)]
pub struct Perception<'a> {
    pub velocity: f64,
    pub walls: &'a SensorReadings,
    /// Opponent rays, when there is an opponent
    pub enemy: Option<&'a SensorReadings>,
}

pub trait VehicleController {
    fn name(&self) -> &'static str;
    fn update(&mut self, perception: &Perception<'_>) -> Result<Controls, EngineError>;
}

/// Arrow keys and space bar, as the game would poll them
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyState {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    pub space: bool,
}

/// Direct keyboard driving
#[derive(Debug, Clone, Default)]
pub struct ManualController {
    pub keys: KeyState,
}

impl ManualController {
    pub fn controls_for(keys: KeyState) -> Controls {
        let gas = match (keys.up, keys.down) {
            (true, true) => 0.5,
            (true, false) => 1.0,
            (false, true) => -1.0,
            (false, false) => 0.0,
        };
        let mut steer = 0.0;
        if keys.left {
            steer += 1.0;
        }
        if keys.right {
            steer -= 1.0;
        }
        Controls {
            gas,
            brake: if keys.space { 1.0 } else { 0.0 },
            steer,
        }
    }
}

impl VehicleController for ManualController {
    fn name(&self) -> &'static str {
        "manual"
    }

    fn update(&mut self, _perception: &Perception<'_>) -> Result<Controls, EngineError> {
        Ok(Self::controls_for(self.keys))
    }
}

/// A sensor-derived input; an absent ray is a missing input, never zero
fn reading(value: Option<f64>, input: &str) -> Result<f64, EngineError> {
    value.ok_or_else(|| EngineError::MissingInput(input.to_string()))
}

/// Fold a tick's outputs into the held controls, keeping stale axes
fn apply_report(controls: &mut Controls, report: &TickReport) {
    if let Some(gas) = report.get(GAS) {
        controls.gas = gas.max(0.0);
    }
    if let Some(brake) = report.get(BRAKE) {
        controls.brake = brake;
    }
    if let Some(steer) = report.get(STEER) {
        controls.steer = steer;
    }
    for name in report.degenerate.keys() {
        log::debug!("Holding previous '{}' control", name);
    }
}

/// Track-following car driven by wall rays
#[derive(Debug, Clone)]
pub struct FuzzyCarController {
    system: ControlSystem,
    session: Session,
    controls: Controls,
    last_report: Option<TickReport>,
}

impl FuzzyCarController {
    pub fn new(options: InferenceOptions) -> Result<Self, EngineError> {
        Ok(Self::with_system(car_control_system(options)?))
    }

    /// Use a custom system; it must read the car's four inputs and write
    /// gas, brake and steer
    pub fn with_system(system: ControlSystem) -> Self {
        let session = system.session();
        Self {
            system,
            session,
            controls: Controls::default(),
            last_report: None,
        }
    }

    pub fn system(&self) -> &ControlSystem {
        &self.system
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn controls(&self) -> Controls {
        self.controls
    }

    pub fn last_report(&self) -> Option<&TickReport> {
        self.last_report.as_ref()
    }

    /// Feed one tick of readings through the control system
    pub fn update_simulation(
        &mut self,
        velocity: f64,
        walls: &SensorReadings,
    ) -> Result<Controls, EngineError> {
        let report = self.system.run_tick(
            &mut self.session,
            [
                (VELOCITY, velocity),
                (BALANCE, reading(walls.balance(), BALANCE)?),
                (SIDE, reading(walls.side(), SIDE)?),
                (HEAD, reading(walls.head(), HEAD)?),
            ],
        )?;
        apply_report(&mut self.controls, &report);
        self.last_report = Some(report);
        Ok(self.controls)
    }

    /// State dump for the last tick
    pub fn describe(&self) -> String {
        self.system.describe(&self.session)
    }
}

impl VehicleController for FuzzyCarController {
    fn name(&self) -> &'static str {
        "fuzzy-car"
    }

    fn update(&mut self, perception: &Perception<'_>) -> Result<Controls, EngineError> {
        self.update_simulation(perception.velocity, perception.walls)
    }
}

/// Spaceship that avoids the screen edge and chases an opponent
#[derive(Debug, Clone)]
pub struct FuzzyShipController {
    system: ControlSystem,
    session: Session,
    controls: Controls,
    fire_distance: i32,
    fire: bool,
    last_report: Option<TickReport>,
}

impl FuzzyShipController {
    pub fn new(options: InferenceOptions, fire_distance: i32) -> Result<Self, EngineError> {
        let system = ship_control_system(options)?;
        let session = system.session();
        Ok(Self {
            system,
            session,
            controls: Controls::default(),
            fire_distance,
            fire: false,
            last_report: None,
        })
    }

    pub fn controls(&self) -> Controls {
        self.controls
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// True when the opponent was in front and close enough to shoot on the
    /// last tick
    pub fn fire(&self) -> bool {
        self.fire
    }

    pub fn last_report(&self) -> Option<&TickReport> {
        self.last_report.as_ref()
    }

    pub fn update_simulation(
        &mut self,
        velocity: f64,
        walls: &SensorReadings,
        enemy: &SensorReadings,
    ) -> Result<Controls, EngineError> {
        let enemy_head = reading(enemy.head(), ENEMY_HEAD)?;
        let report = self.system.run_tick(
            &mut self.session,
            [
                (VELOCITY, velocity),
                (WALL_BALANCE, reading(walls.balance(), WALL_BALANCE)?),
                (WALL_SIDE, reading(walls.side(), WALL_SIDE)?),
                (WALL_HEAD, reading(walls.head(), WALL_HEAD)?),
                (ENEMY_BALANCE, reading(enemy.balance(), ENEMY_BALANCE)?),
                (ENEMY_SIDE, reading(enemy.side(), ENEMY_SIDE)?),
                (ENEMY_HEAD, enemy_head),
            ],
        )?;
        apply_report(&mut self.controls, &report);
        self.fire = enemy_head < self.fire_distance as f64;
        self.last_report = Some(report);
        Ok(self.controls)
    }

    pub fn describe(&self) -> String {
        self.system.describe(&self.session)
    }
}

impl VehicleController for FuzzyShipController {
    fn name(&self) -> &'static str {
        "fuzzy-ship"
    }

    fn update(&mut self, perception: &Perception<'_>) -> Result<Controls, EngineError> {
        let enemy = perception
            .enemy
            .ok_or_else(|| EngineError::MissingInput(ENEMY_HEAD.to_string()))?;
        self.update_simulation(perception.velocity, perception.walls, enemy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fuzzy::{LinguisticVariable, MembershipFunction as Mf, Rule, TermRef};
    use crate::sensor::array::{HARD_LEFT, HARD_RIGHT, HEAD as SENSOR_HEAD, LEFT, RIGHT};
    use crate::sensor::{FieldBounds, ProximityTest, SensorArray};
    use glam::DVec2;

    #[test]
    fn test_manual_key_mapping() {
        let both = KeyState { up: true, down: true, ..Default::default() };
        assert_eq!(ManualController::controls_for(both).gas, 0.5);

        let reverse_left = KeyState { down: true, left: true, space: true, ..Default::default() };
        assert_eq!(
            ManualController::controls_for(reverse_left),
            Controls { gas: -1.0, brake: 1.0, steer: 1.0 }
        );

        let both_sides = KeyState { left: true, right: true, ..Default::default() };
        assert_eq!(ManualController::controls_for(both_sides).steer, 0.0);
    }

    #[test]
    fn test_car_controller_reacts_to_corridor() {
        let mut controller = FuzzyCarController::new(InferenceOptions::default()).unwrap();
        // wall close on the right (negative x side at heading 0 is hard right)
        let walls = |p: DVec2| p.x <= 50.0 || p.x >= 150.0;
        let readings = SensorArray::default().cast_within(
            DVec2::new(60.0, 100.0),
            0.0,
            200,
            &FieldBounds::new(400.0, 2000.0),
            &walls,
        );
        let controls = controller.update_simulation(40.0, &readings).unwrap();
        assert!(controls.steer > 0.0, "should steer left, got {controls:?}");
        assert!(controls.gas >= 0.0);
        assert!(controller.last_report().unwrap().is_complete());
        assert!(controller.describe().contains("velocity = 40.000"));
    }

    #[test]
    fn test_degenerate_output_holds_previous_value() {
        // brake is only concluded while head is CLOSE
        let head = LinguisticVariable::antecedent(HEAD, 0.0, 200.0)
            .and_then(|v| v.with_term("CLOSE", Mf::trapezoid(0.0, 0.0, 25.0, 125.0)?))
            .and_then(|v| v.with_term("AWAY", Mf::trapezoid(75.0, 200.0, 200.0, 200.0)?))
            .unwrap();
        let pedal = |name: &str| {
            LinguisticVariable::consequent(name, -0.25, 1.25)
                .and_then(|v| v.with_term("NONE", Mf::sigmoid(0.05, -40.0)?))
                .and_then(|v| v.with_term("HARD", Mf::sigmoid(0.75, 20.0)?))
                .unwrap()
        };
        let system = ControlSystem::configure(
            vec![head, pedal(GAS), pedal(BRAKE)],
            vec![
                Rule::new(TermRef::new(HEAD, "CLOSE"), [TermRef::new(BRAKE, "HARD")]),
                Rule::new(TermRef::new(HEAD, "AWAY"), [TermRef::new(GAS, "HARD")]),
                Rule::new(TermRef::new(HEAD, "CLOSE"), [TermRef::new(GAS, "NONE")]),
            ],
        )
        .unwrap();
        let mut controller = FuzzyCarController::with_system(system);

        let ray = |d| crate::sensor::RayCastResult::miss(DVec2::ZERO, 0.0, d);
        let with_head = |d| {
            let mut readings = SensorReadings::default();
            for name in [LEFT, RIGHT, HARD_LEFT, HARD_RIGHT] {
                readings.rays.insert(name.into(), ray(100));
            }
            readings.rays.insert(SENSOR_HEAD.into(), ray(d));
            readings
        };
        let braking = controller.update_simulation(0.0, &with_head(10)).unwrap();
        assert!(braking.brake > 0.5);

        let open = controller.update_simulation(0.0, &with_head(200)).unwrap();
        assert_eq!(open.brake, braking.brake, "brake must be held");
        assert!(open.gas > braking.gas);
        let report = controller.last_report().unwrap();
        assert!(matches!(report.degenerate.get(BRAKE), Some(EngineError::EmptyAggregate(_))));
        assert_eq!(controller.session().output(BRAKE), None);
    }

    #[test]
    fn test_ship_fires_at_enemy_ahead() {
        let mut ship = FuzzyShipController::new(InferenceOptions::default(), 500).unwrap();
        let screen = FieldBounds::new(800.0, 600.0);
        let origin = DVec2::new(400.0, 100.0);
        let array = SensorArray::default();
        let off_screen = |p: DVec2| !crate::sensor::Boundary::contains(&screen, p);
        let walls = array.cast(origin, 0.0, 200, &off_screen);

        let enemy_ahead = ProximityTest::new(DVec2::new(400.0, 400.0), 50.0);
        let enemy = array.cast(origin, 0.0, 500, &enemy_ahead);
        ship.update_simulation(30.0, &walls, &enemy).unwrap();
        assert!(ship.fire());
        assert!(ship.last_report().is_some());

        let enemy_behind = ProximityTest::new(DVec2::new(400.0, -400.0), 50.0);
        let enemy = array.cast(origin, 0.0, 500, &enemy_behind);
        ship.update_simulation(30.0, &walls, &enemy).unwrap();
        assert!(!ship.fire());
    }

    #[test]
    fn test_ship_without_enemy_rays_does_not_fire() {
        let mut ship = FuzzyShipController::new(InferenceOptions::default(), 500).unwrap();
        let open = SensorArray::default().cast(DVec2::new(400.0, 300.0), 0.0, 200, &|_: DVec2| false);

        let err = ship
            .update(&Perception { velocity: 30.0, walls: &open, enemy: None })
            .unwrap_err();
        assert_eq!(err, EngineError::MissingInput(ENEMY_HEAD.into()));
        assert!(!ship.fire());
        assert!(ship.last_report().is_none());

        // an enemy array with the head ray missing is just as absent
        let mut partial = open.clone();
        partial.rays.remove(SENSOR_HEAD);
        let err = ship.update_simulation(30.0, &open, &partial).unwrap_err();
        assert_eq!(err, EngineError::MissingInput(ENEMY_HEAD.into()));
        assert!(!ship.fire());
    }

    #[test]
    fn test_car_missing_wall_ray_is_an_error() {
        let mut car = FuzzyCarController::new(InferenceOptions::default()).unwrap();
        let mut readings = SensorArray::default().cast(DVec2::ZERO, 0.0, 50, &|_: DVec2| false);
        readings.rays.remove(HARD_RIGHT);
        let err = car.update_simulation(10.0, &readings).unwrap_err();
        assert_eq!(err, EngineError::MissingInput(SIDE.into()));
        assert_eq!(car.controls(), Controls::default());
    }
}
