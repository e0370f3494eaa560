//! Discrete ray casting
//!
//! A ray advances one unit per step along `(sin(angle), cos(angle))`, so
//! angle 0 points along +y. The reported distance is the step count, not a
//! continuous length.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::heading_vector;

/// Occupancy or proximity predicate owned by the caller
pub trait HitTest {
    fn is_hit(&self, point: DVec2) -> bool;
}

impl<F> HitTest for F
where
    F: Fn(DVec2) -> bool,
{
    #[inline]
    fn is_hit(&self, point: DVec2) -> bool {
        self(point)
    }
}

/// Edge of a bounded field; leaving it ends a cast as a miss
pub trait Boundary {
    fn contains(&self, point: DVec2) -> bool;
}

/// Result of a single cast
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RayCastResult {
    pub origin: DVec2,
    /// Radians
    pub angle: f64,
    /// Steps taken; `max_distance` on a full-length miss
    pub distance: i32,
    /// Point where the hit test fired, `None` on a miss
    pub hit_position: Option<DVec2>,
}

impl RayCastResult {
    pub fn miss(origin: DVec2, angle: f64, distance: i32) -> Self {
        Self {
            origin,
            angle,
            distance,
            hit_position: None,
        }
    }

    #[inline]
    pub fn hit(&self) -> bool {
        self.hit_position.is_some()
    }

    /// Segment from origin to hit point, for drawing the ray
    pub fn segment(&self) -> Option<(DVec2, DVec2)> {
        self.hit_position.map(|p| (self.origin, p))
    }
}

/// Cast through an unbounded field
pub fn cast_ray<H>(origin: DVec2, angle: f64, max_distance: i32, hit_test: &H) -> RayCastResult
where
    H: HitTest + ?Sized,
{
    march(origin, angle, max_distance, None::<&Unbounded>, hit_test)
}

/// Cast that ends as a miss at the first step outside `bounds`
pub fn cast_ray_within<B, H>(
    origin: DVec2,
    angle: f64,
    max_distance: i32,
    bounds: &B,
    hit_test: &H,
) -> RayCastResult
where
    B: Boundary + ?Sized,
    H: HitTest + ?Sized,
{
    march(origin, angle, max_distance, Some(bounds), hit_test)
}

struct Unbounded;

impl Boundary for Unbounded {
    fn contains(&self, _point: DVec2) -> bool {
        true
    }
}

fn march<B, H>(
    origin: DVec2,
    angle: f64,
    max_distance: i32,
    bounds: Option<&B>,
    hit_test: &H,
) -> RayCastResult
where
    B: Boundary + ?Sized,
    H: HitTest + ?Sized,
{
    let max_distance = max_distance.max(0);
    let dir = heading_vector(angle);

    for step in 1..=max_distance {
        // scale instead of accumulating so axis-aligned rays stay exact
        let p = origin + dir * step as f64;

        if let Some(bounds) = bounds {
            if !bounds.contains(p) {
                return RayCastResult::miss(origin, angle, step);
            }
        }

        if hit_test.is_hit(p) {
            return RayCastResult {
                origin,
                angle,
                distance: step,
                hit_position: Some(p),
            };
        }
    }

    RayCastResult::miss(origin, angle, max_distance)
}

/// Axis-aligned field `[0, width) x [0, height)`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FieldBounds {
    pub width: f64,
    pub height: f64,
}

impl FieldBounds {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

impl Boundary for FieldBounds {
    #[inline]
    fn contains(&self, p: DVec2) -> bool {
        p.x >= 0.0 && p.x < self.width && p.y >= 0.0 && p.y < self.height
    }
}

/// Fires when a point comes within `threshold` of `target` (opponent sensing)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProximityTest {
    pub target: DVec2,
    pub threshold: f64,
}

impl ProximityTest {
    pub fn new(target: DVec2, threshold: f64) -> Self {
        Self { target, threshold }
    }
}

impl HitTest for ProximityTest {
    #[inline]
    fn is_hit(&self, point: DVec2) -> bool {
        point.distance(self.target) < self.threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn test_hit_along_positive_y() {
        let origin = DVec2::new(100.0, 100.0);
        let result = cast_ray(origin, 0.0, 200, &|p: DVec2| p.y >= 150.0);
        assert!(result.hit());
        assert_eq!(result.distance, 50);
        assert_eq!(result.hit_position, Some(DVec2::new(100.0, 150.0)));
        assert_eq!(result.segment(), Some((origin, DVec2::new(100.0, 150.0))));
    }

    #[test]
    fn test_miss_reports_max_distance() {
        let result = cast_ray(DVec2::new(100.0, 100.0), 0.0, 200, &|_: DVec2| false);
        assert!(!result.hit());
        assert_eq!(result.distance, 200);
        assert_eq!(result.hit_position, None);
    }

    #[test]
    fn test_boundary_exit_ends_cast_early() {
        let bounds = FieldBounds::new(1000.0, 110.0);
        let result = cast_ray_within(
            DVec2::new(100.0, 100.0),
            0.0,
            200,
            &bounds,
            &|p: DVec2| p.y >= 150.0,
        );
        assert!(!result.hit());
        assert_eq!(result.distance, 10);
    }

    #[test]
    fn test_unbounded_cast_ignores_field_edge() {
        // the same cast without bounds checking reaches the target
        let result = cast_ray(DVec2::new(100.0, 100.0), 0.0, 200, &|p: DVec2| p.y >= 150.0);
        assert_eq!(result.distance, 50);
    }

    #[test]
    fn test_boundary_checked_before_hit_test() {
        let bounds = FieldBounds::new(1000.0, 110.0);
        // hit test that would fire exactly at the exit step
        let result = cast_ray_within(
            DVec2::new(100.0, 100.0),
            0.0,
            200,
            &bounds,
            &|p: DVec2| p.y >= 110.0,
        );
        assert!(!result.hit());
        assert_eq!(result.distance, 10);
    }

    #[test]
    fn test_quarter_turn_points_along_positive_x() {
        let result = cast_ray(DVec2::new(0.0, 0.0), FRAC_PI_2, 100, &|p: DVec2| p.x >= 30.0);
        assert_eq!(result.distance, 30);
        let hit = result.hit_position.unwrap();
        assert!((hit.x - 30.0).abs() < 1e-9);
        assert!(hit.y.abs() < 1e-9);
    }

    #[test]
    fn test_proximity_hit() {
        let enemy = ProximityTest::new(DVec2::new(0.0, 300.0), 50.0);
        let result = cast_ray(DVec2::ZERO, 0.0, 500, &enemy);
        assert!(result.hit());
        assert_eq!(result.distance, 251);

        let behind = cast_ray(DVec2::ZERO, std::f64::consts::PI, 500, &enemy);
        assert!(!behind.hit());
        assert_eq!(behind.distance, 500);
    }

    #[test]
    fn test_zero_max_distance() {
        let result = cast_ray(DVec2::ZERO, 0.0, 0, &|_: DVec2| true);
        assert!(!result.hit());
        assert_eq!(result.distance, 0);
    }
}
