//! Vehicle kinematics
//!
//! Speed is a signed scalar along the heading. Each tick: idle decay, then
//! move along `(sin(angle), cos(angle))`.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::{heading_vector, normalize_angle};

/// Tuning for one kind of vehicle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VehicleParams {
    pub max_velocity_forward: f64,
    pub max_velocity_backward: f64,
    pub acceleration_forward: f64,
    pub acceleration_backward: f64,
    pub braking: f64,
    /// Speed lost per second with no input
    pub idle_decay: f64,
    /// Speed lost per second while steering
    pub steer_decay: f64,
    /// Turn rate at full steer, degrees per second
    pub turn_rate: f64,
}

impl VehicleParams {
    pub fn car() -> Self {
        Self {
            max_velocity_forward: 200.0,
            max_velocity_backward: 20.0,
            acceleration_forward: 100.0,
            acceleration_backward: 100.0,
            braking: 100.0,
            idle_decay: 5.0,
            steer_decay: 5.0,
            turn_rate: 100.0,
        }
    }

    pub fn spaceship() -> Self {
        Self {
            braking: 50.0,
            steer_decay: 20.0,
            ..Self::car()
        }
    }
}

impl Default for VehicleParams {
    fn default() -> Self {
        Self::car()
    }
}

/// Crisp control inputs for one tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Controls {
    /// -1 (reverse) to 1 (full throttle)
    pub gas: f64,
    /// 0 to 1
    pub brake: f64,
    /// -1 (right) to 1 (left)
    pub steer: f64,
}

impl Controls {
    pub fn clamped(self) -> Self {
        Self {
            gas: self.gas.clamp(-1.0, 1.0),
            brake: self.brake.clamp(0.0, 1.0),
            steer: self.steer.clamp(-1.0, 1.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    pub position: DVec2,
    /// Signed speed along the heading
    pub velocity: f64,
    /// Heading, radians; 0 points along +y
    pub angle: f64,
    pub params: VehicleParams,
}

impl Vehicle {
    pub fn new(position: DVec2, angle: f64, params: VehicleParams) -> Self {
        Self {
            position,
            velocity: 0.0,
            angle,
            params,
        }
    }

    /// Spaceships start already drifting forward
    pub fn spaceship(position: DVec2, angle: f64) -> Self {
        Self {
            velocity: 30.0,
            ..Self::new(position, angle, VehicleParams::spaceship())
        }
    }

    pub fn accelerate(&mut self, amount: f64) {
        self.velocity += amount;
    }

    /// Reduce speed toward zero without reversing direction
    pub fn brake(&mut self, amount: f64) {
        let sign = 1.0f64.copysign(self.velocity);
        self.velocity = sign * (self.velocity.abs() - amount).max(0.0);
    }

    pub fn rotate(&mut self, delta: f64) {
        self.angle = normalize_angle(self.angle + delta);
    }

    pub fn heading(&self) -> DVec2 {
        heading_vector(self.angle)
    }

    /// Idle decay, then integrate position
    pub fn update(&mut self, dt: f64) {
        self.brake(dt * self.params.idle_decay);
        self.position += self.heading() * self.velocity * dt;
    }

    /// Turn `controls` into speed and heading changes for this tick
    pub fn apply_controls(&mut self, controls: Controls, dt: f64) {
        let c = controls.clamped();
        let p = self.params;

        if c.gas > 0.0 {
            if self.velocity < 0.0 {
                self.brake(dt * p.braking);
            } else {
                self.accelerate(
                    dt * p.acceleration_forward * (1.1 - self.velocity / p.max_velocity_forward),
                );
                self.velocity = self.velocity.min(p.max_velocity_forward);
            }
        } else if c.gas < 0.0 {
            if self.velocity > 0.0 {
                self.brake(dt * p.braking);
            } else {
                self.accelerate(
                    -dt * p.acceleration_backward * (1.1 - self.velocity / p.max_velocity_backward),
                );
                self.velocity = self.velocity.max(-p.max_velocity_backward);
            }
        }

        if c.brake > 0.0 {
            self.brake(dt * p.braking * c.brake);
        }

        if c.steer != 0.0 {
            self.rotate((dt * p.turn_rate).to_radians() * c.steer);
            self.brake(dt * p.steer_decay);
        }
    }
}
