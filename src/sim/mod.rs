//! Deterministic simulation module
//!
//! Vehicles, tracks, controllers and the fixed-step loop. This module must
//! stay deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - No rendering or platform dependencies

pub mod controller;
pub mod tick;
pub mod track;
pub mod vehicle;

pub use controller::{
    FuzzyCarController, FuzzyShipController, KeyState, ManualController, Perception,
    VehicleController,
};
pub use tick::{DuelState, RaceState, tick, tick_duel};
pub use track::OccupancyGrid;
pub use vehicle::{Controls, Vehicle, VehicleParams};
