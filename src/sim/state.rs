//! Core body and shared anchor ring
//!
//! Small state types read by every tentacle during a tick.

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::settings::{CoreTuning, RingTuning};
use crate::{friction_damped, wrap_angle};

/// The central body tentacles attach to
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Core {
    /// Center (z is always 0, the core moves on a plane)
    pub pos: Vec3,
    pub vel: Vec2,
    pub radius: f32,
    stiffness: f32,
    drag: f32,
}

impl Core {
    pub fn new(pos: Vec2, tuning: &CoreTuning) -> Self {
        Self {
            pos: pos.extend(0.0),
            vel: Vec2::ZERO,
            radius: tuning.radius,
            stiffness: tuning.stiffness,
            drag: tuning.drag,
        }
    }

    /// Follow the target with a per-frame spring, then apply drag and integrate
    pub fn advance(&mut self, target: Option<Vec2>, active: bool) {
        if active {
            if let Some(target) = target {
                self.vel += (target - self.pos.truncate()) * self.stiffness;
            }
        }
        self.vel *= self.drag;
        self.pos += self.vel.extend(0.0);
        debug_assert!(self.pos.is_finite() && self.vel.is_finite(), "core diverged");
    }
}

/// Collective rotation shared by all tentacles
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnchorRing {
    /// Rotational offset, always in (-π, π]
    pub offset: f32,
    pub angular_vel: f32,
    pub friction: f32,
    pub max_angular_vel: f32,
}

impl AnchorRing {
    pub fn new(tuning: &RingTuning) -> Self {
        Self {
            offset: 0.0,
            angular_vel: 0.0,
            friction: tuning.friction,
            max_angular_vel: tuning.max_angular_velocity,
        }
    }

    /// Fold this tick's tentacle contributions into the ring
    pub fn apply(&mut self, contributions: &AngularAccumulator, dt: f32) {
        let damped = friction_damped(self.friction, dt);
        self.angular_vel = ((self.angular_vel + contributions.mean()) * damped)
            .clamp(-self.max_angular_vel, self.max_angular_vel);
        self.offset = wrap_angle(self.offset + self.angular_vel * dt);
    }
}

/// Running (sum, count) of per-tentacle anchor angular velocities for one tick
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AngularAccumulator {
    sum: f32,
    count: u32,
}

impl AngularAccumulator {
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn add(&mut self, angular_vel: f32) {
        self.sum += angular_vel;
        self.count += 1;
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    /// Mean contribution, 0 when nothing was added
    pub fn mean(&self) -> f32 {
        if self.count == 0 {
            0.0
        } else {
            self.sum / self.count as f32
        }
    }
}
