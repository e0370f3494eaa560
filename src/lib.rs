//! Fuzzy Racer - fuzzy-logic autopilot for ray-sensing vehicles
//!
//! Core modules:
//! - `fuzzy`: Membership functions, linguistic variables, rules, inference
//! - `sensor`: Discrete ray casting against caller-owned hit tests
//! - `sim`: Vehicle kinematics, controllers and a headless race loop
//! - `settings`: Data-driven tuning

pub mod fuzzy;
pub mod sensor;
pub mod settings;
pub mod sim;

pub use fuzzy::{ControlSystem, EngineError, Session};
pub use sensor::{RayCastResult, cast_ray};
pub use settings::Settings;

use glam::DVec2;

/// Simulation constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz)
    pub const SIM_DT: f64 = 1.0 / 60.0;

    /// Wall rays give up after this many steps
    pub const WALL_RAY_MAX_DISTANCE: i32 = 200;
    /// Opponent rays reach further since open space has no walls to stop them
    pub const ENEMY_RAY_MAX_DISTANCE: i32 = 500;
    /// An opponent ray hits within this radius of the opponent
    pub const PROXIMITY_THRESHOLD: f64 = 50.0;
    /// Ship fires when the opponent is closer than this along the head ray
    pub const FIRE_DISTANCE: i32 = 500;
}

/// Unit direction for a heading; angle 0 points along +y
#[inline]
pub fn heading_vector(angle: f64) -> DVec2 {
    DVec2::new(angle.sin(), angle.cos())
}

/// Normalized angle to [-π, π)
#[inline]
pub fn normalize_angle(angle: f64) -> f64 {
    use std::f64::consts::{PI, TAU};
    (angle + PI).rem_euclid(TAU) - PI
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_heading_vector_convention() {
        assert_eq!(heading_vector(0.0), DVec2::new(0.0, 1.0));
        let right = heading_vector(PI / 2.0);
        assert!((right.x - 1.0).abs() < 1e-12 && right.y.abs() < 1e-12);
    }

    #[test]
    fn test_normalize_angle() {
        assert!((normalize_angle(1.5 * PI) + PI / 2.0).abs() < 1e-12);
        assert!((normalize_angle(-PI / 2.0) + PI / 2.0).abs() < 1e-12);
        assert!((normalize_angle(2.5 * PI) - PI / 2.0).abs() < 1e-12);
    }
}
