//! Fixed fan of rays around a vehicle's heading

use std::collections::BTreeMap;

use glam::DVec2;
use serde::{Deserialize, Serialize};

use super::ray::{Boundary, HitTest, RayCastResult, cast_ray, cast_ray_within};

pub const HEAD: &str = "head";
pub const LEFT: &str = "left";
pub const RIGHT: &str = "right";
pub const HARD_LEFT: &str = "hard_left";
pub const HARD_RIGHT: &str = "hard_right";

/// A named ray with its offset from the vehicle heading (radians)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorSpec {
    pub name: String,
    pub offset: f64,
}

/// Offsets in degrees for head, left, right, hard left and hard right rays
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensorAngles {
    pub head: f64,
    pub left: f64,
    pub right: f64,
    pub hard_left: f64,
    pub hard_right: f64,
}

impl Default for SensorAngles {
    fn default() -> Self {
        Self {
            head: 0.0,
            left: 30.0,
            right: -30.0,
            hard_left: 90.0,
            hard_right: -90.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SensorArray {
    sensors: Vec<SensorSpec>,
}

impl SensorArray {
    pub fn new(angles: SensorAngles) -> Self {
        let sensors = [
            (HEAD, angles.head),
            (LEFT, angles.left),
            (RIGHT, angles.right),
            (HARD_LEFT, angles.hard_left),
            (HARD_RIGHT, angles.hard_right),
        ]
        .into_iter()
        .map(|(name, degrees)| SensorSpec {
            name: name.to_string(),
            offset: degrees.to_radians(),
        })
        .collect();
        Self { sensors }
    }

    pub fn sensors(&self) -> &[SensorSpec] {
        &self.sensors
    }

    /// Cast every ray from `origin`, stopping at the edge of `bounds`
    pub fn cast_within<B, H>(
        &self,
        origin: DVec2,
        heading: f64,
        max_distance: i32,
        bounds: &B,
        hit_test: &H,
    ) -> SensorReadings
    where
        B: Boundary + ?Sized,
        H: HitTest + ?Sized,
    {
        self.collect(|s| cast_ray_within(origin, heading + s.offset, max_distance, bounds, hit_test))
    }

    /// Cast every ray with no field edge (open space, opponent sensing)
    pub fn cast<H>(&self, origin: DVec2, heading: f64, max_distance: i32, hit_test: &H) -> SensorReadings
    where
        H: HitTest + ?Sized,
    {
        self.collect(|s| cast_ray(origin, heading + s.offset, max_distance, hit_test))
    }

    fn collect(&self, mut cast: impl FnMut(&SensorSpec) -> RayCastResult) -> SensorReadings {
        SensorReadings {
            rays: self.sensors.iter().map(|s| (s.name.clone(), cast(s))).collect(),
        }
    }
}

impl Default for SensorArray {
    fn default() -> Self {
        Self::new(SensorAngles::default())
    }
}

/// One tick's casts, by sensor name
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SensorReadings {
    pub rays: BTreeMap<String, RayCastResult>,
}

impl SensorReadings {
    pub fn get(&self, name: &str) -> Option<&RayCastResult> {
        self.rays.get(name)
    }

    /// Step count of a ray, `None` if that sensor was not cast
    pub fn distance(&self, name: &str) -> Option<f64> {
        self.rays.get(name).map(|r| r.distance as f64)
    }

    /// Left ray minus right ray: positive when the right side is closer
    pub fn balance(&self) -> Option<f64> {
        Some(self.distance(LEFT)? - self.distance(RIGHT)?)
    }

    /// Hard-left ray minus hard-right ray
    pub fn side(&self) -> Option<f64> {
        Some(self.distance(HARD_LEFT)? - self.distance(HARD_RIGHT)?)
    }

    pub fn head(&self) -> Option<f64> {
        self.distance(HEAD)
    }
}
