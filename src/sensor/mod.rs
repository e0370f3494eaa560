//! Ray-cast perception
//!
//! Pure and reentrant: casts share no mutable state, and the predicate that
//! decides what counts as a hit always belongs to the caller.

pub mod array;
pub mod ray;

pub use array::{SensorAngles, SensorArray, SensorReadings, SensorSpec};
pub use ray::{
    Boundary, FieldBounds, HitTest, ProximityTest, RayCastResult, cast_ray, cast_ray_within,
};
