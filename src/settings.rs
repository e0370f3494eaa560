//! Simulation settings
//!
//! Read from a JSON file; every field has a default so partial files work.

use std::path::Path;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::fuzzy::{DEFAULT_RESOLUTION, InferenceOptions};
use crate::sensor::SensorAngles;

/// Which vehicle the headless driver runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum VehicleKind {
    #[default]
    Car,
    #[value(alias = "ship")]
    Spaceship,
}

impl VehicleKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            VehicleKind::Car => "car",
            VehicleKind::Spaceship => "spaceship",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub vehicle: VehicleKind,

    // === Inference ===
    /// Sample points per output universe
    pub resolution: usize,

    // === Sensors ===
    /// Ray offsets from heading, degrees
    pub sensor_angles: SensorAngles,
    pub wall_ray_max_distance: i32,
    pub enemy_ray_max_distance: i32,
    /// Opponent hit radius for proximity rays
    pub proximity_threshold: f64,
    /// Ship fires when the opponent head ray is shorter than this
    pub fire_distance: i32,

    // === Field ===
    /// Track grid (car) or screen (spaceship) size
    pub field_width: usize,
    pub field_height: usize,
    /// Ring track lane width
    pub lane_width: f64,

    // === Run ===
    /// Fixed timestep, seconds
    pub dt: f64,
    pub ticks: u64,
    /// Track generation seed
    pub seed: u64,
    /// Log a progress line every N ticks (0 = never)
    pub log_every: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            vehicle: VehicleKind::Car,

            resolution: DEFAULT_RESOLUTION,

            sensor_angles: SensorAngles::default(),
            wall_ray_max_distance: WALL_RAY_MAX_DISTANCE,
            enemy_ray_max_distance: ENEMY_RAY_MAX_DISTANCE,
            proximity_threshold: PROXIMITY_THRESHOLD,
            fire_distance: FIRE_DISTANCE,

            field_width: 800,
            field_height: 600,
            lane_width: 120.0,

            dt: SIM_DT,
            ticks: 3600,
            seed: 1,
            log_every: 300,
        }
    }
}

impl Settings {
    pub fn inference_options(&self) -> InferenceOptions {
        InferenceOptions {
            resolution: self.resolution,
        }
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Load from `path`; a missing file means defaults
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            log::info!("No settings at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let json = std::fs::read_to_string(path)?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), json)?;
        log::info!("Settings saved to {}", path.as_ref().display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let settings = Settings::from_json(r#"{ "vehicle": "spaceship", "resolution": 51 }"#).unwrap();
        assert_eq!(settings.vehicle, VehicleKind::Spaceship);
        assert_eq!(settings.resolution, 51);
        assert_eq!(settings.wall_ray_max_distance, 200);
        assert_eq!(settings.sensor_angles.hard_right, -90.0);
    }

    #[test]
    fn test_vehicle_kind_names() {
        assert_eq!(VehicleKind::from_str("ship", true), Ok(VehicleKind::Spaceship));
        assert_eq!(VehicleKind::from_str("Car", true), Ok(VehicleKind::Car));
        assert!(VehicleKind::from_str("boat", true).is_err());
        for kind in VehicleKind::value_variants() {
            let name = kind.to_possible_value().unwrap();
            assert_eq!(name.get_name(), kind.as_str());
        }
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let settings = Settings::load("/nonexistent/fuzzy-racer/settings.json").unwrap();
        assert_eq!(settings, Settings::default());
    }
}
