//! Fixed timestep simulation tick
//!
//! Sense, decide, act, integrate. Given the same settings and seed, a run
//! is fully reproducible.

use glam::DVec2;

use super::controller::{FuzzyShipController, Perception, VehicleController};
use super::track::OccupancyGrid;
use super::vehicle::{Controls, Vehicle};
use crate::fuzzy::EngineError;
use crate::sensor::{Boundary, FieldBounds, ProximityTest, SensorArray, SensorReadings};
use crate::settings::Settings;

/// Half the ship sprite; the ship is out once its center is this close to
/// the screen edge
pub const SHIP_MARGIN: f64 = 28.0;

/// Seconds between volleys
pub const SHOOT_COOLDOWN: f64 = 1.0;

/// Speed a ship restarts with after leaving the screen
const RESPAWN_VELOCITY: f64 = 1.0;

/// A single car on a track
#[derive(Debug, Clone, PartialEq)]
pub struct RaceState {
    pub vehicle: Vehicle,
    pub tick_count: u64,
    /// Wall rays from the start of the last tick
    pub walls: SensorReadings,
    pub controls: Controls,
    /// Ticks that ended with the car on a wall cell
    pub off_track_ticks: u64,
    /// Path length driven so far
    pub distance: f64,
}

impl RaceState {
    pub fn new(vehicle: Vehicle) -> Self {
        Self {
            vehicle,
            tick_count: 0,
            walls: SensorReadings::default(),
            controls: Controls::default(),
            off_track_ticks: 0,
            distance: 0.0,
        }
    }

    /// A car placed at the track's start
    pub fn on_track(grid: &OccupancyGrid) -> Self {
        let (position, angle) = grid.start;
        Self::new(Vehicle::new(position, angle, Default::default()))
    }
}

/// Advance a race by one fixed timestep
pub fn tick(
    state: &mut RaceState,
    controller: &mut dyn VehicleController,
    grid: &OccupancyGrid,
    sensors: &SensorArray,
    settings: &Settings,
) -> Result<(), EngineError> {
    let vehicle = &mut state.vehicle;
    state.walls = sensors.cast_within(
        vehicle.position,
        vehicle.angle,
        settings.wall_ray_max_distance,
        grid,
        grid,
    );

    let perception = Perception {
        velocity: vehicle.velocity,
        walls: &state.walls,
        enemy: None,
    };
    state.controls = controller.update(&perception)?;
    vehicle.apply_controls(state.controls, settings.dt);

    let before = vehicle.position;
    vehicle.update(settings.dt);
    state.distance += before.distance(vehicle.position);

    if grid.is_wall(vehicle.position) {
        state.off_track_ticks += 1;
        log::debug!("Tick {}: off track at {:?}", state.tick_count, vehicle.position);
    }
    state.tick_count += 1;
    Ok(())
}

/// Fuzzy ship against a circling opponent on an open screen
#[derive(Debug, Clone, PartialEq)]
pub struct DuelState {
    pub ship: Vehicle,
    pub enemy: Vehicle,
    /// Fixed controls the opponent flies with
    pub enemy_controls: Controls,
    pub screen: FieldBounds,
    pub tick_count: u64,
    pub walls: SensorReadings,
    pub enemy_rays: SensorReadings,
    pub controls: Controls,
    /// Times the ship left the screen and was put back in the middle
    pub boundary_hits: u32,
    pub volleys_fired: u32,
    shoot_timer: f64,
}

impl DuelState {
    pub fn new(screen: FieldBounds) -> Self {
        let center = DVec2::new(screen.width / 2.0, screen.height / 2.0);
        Self {
            ship: Vehicle::spaceship(center - DVec2::new(0.0, screen.height / 4.0), 0.0),
            enemy: Vehicle::spaceship(center + DVec2::new(screen.width / 4.0, 0.0), 0.0),
            enemy_controls: Controls {
                gas: 0.5,
                brake: 0.0,
                steer: 0.3,
            },
            screen,
            tick_count: 0,
            walls: SensorReadings::default(),
            enemy_rays: SensorReadings::default(),
            controls: Controls::default(),
            boundary_hits: 0,
            volleys_fired: 0,
            shoot_timer: 0.0,
        }
    }

    fn inside_screen(&self, p: DVec2) -> bool {
        p.x >= SHIP_MARGIN
            && p.y >= SHIP_MARGIN
            && p.x <= self.screen.width - SHIP_MARGIN
            && p.y <= self.screen.height - SHIP_MARGIN
    }
}

/// Advance a duel by one fixed timestep
pub fn tick_duel(
    state: &mut DuelState,
    controller: &mut FuzzyShipController,
    sensors: &SensorArray,
    settings: &Settings,
) -> Result<(), EngineError> {
    let screen = state.screen;
    let off_screen = |p: DVec2| !screen.contains(p);
    state.walls = sensors.cast(
        state.ship.position,
        state.ship.angle,
        settings.wall_ray_max_distance,
        &off_screen,
    );
    let near_enemy = ProximityTest::new(state.enemy.position, settings.proximity_threshold);
    state.enemy_rays = sensors.cast(
        state.ship.position,
        state.ship.angle,
        settings.enemy_ray_max_distance,
        &near_enemy,
    );

    state.controls =
        controller.update_simulation(state.ship.velocity, &state.walls, &state.enemy_rays)?;
    state.ship.apply_controls(state.controls, settings.dt);

    state.shoot_timer = (state.shoot_timer - settings.dt).max(0.0);
    if controller.fire() && state.shoot_timer <= 0.0 {
        state.volleys_fired += 1;
        state.shoot_timer = SHOOT_COOLDOWN;
        log::debug!("Tick {}: fire", state.tick_count);
    }

    state.ship.update(settings.dt);
    state.enemy.apply_controls(state.enemy_controls, settings.dt);
    state.enemy.update(settings.dt);

    if !state.inside_screen(state.ship.position) {
        state.boundary_hits += 1;
        state.ship.position = DVec2::new(screen.width / 2.0, screen.height / 2.0);
        state.ship.velocity = RESPAWN_VELOCITY;
        log::info!("Ship left the screen, respawned (hits: {})", state.boundary_hits);
    }
    state.tick_count += 1;
    Ok(())
}
