//! Abyssal Tentacles - rope-like tentacles animated around a movable core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (core body, anchor ring, tentacles, effects)
//! - `renderer`: Render-facing export of segment geometry
//! - `settings`: Data-driven tuning loaded from JSON

pub mod renderer;
pub mod settings;
pub mod sim;

pub use settings::{Settings, SettingsError};

use glam::Vec3;

/// Simulation configuration constants
pub mod consts {
    /// Reference frame rate that damping factors are tuned against
    pub const REFERENCE_HZ: f32 = 60.0;
    /// Largest frame step the simulation is fed (larger gaps are clamped)
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Below this length a vector is treated as degenerate
    pub const NORMALIZE_EPSILON: f32 = 1e-4;
    /// Squared segment length below which segment-vs-core resolution is skipped
    pub const SEGMENT_EPSILON_SQ: f32 = 1e-5;
}

/// Wrap an angle to (-π, π]
#[inline]
pub fn wrap_angle(angle: f32) -> f32 {
    use std::f32::consts::{PI, TAU};
    debug_assert!(angle.is_finite(), "non-finite angle {angle}");
    if !angle.is_finite() {
        return 0.0;
    }
    if angle > -PI && angle <= PI {
        return angle;
    }
    // Closed form so huge magnitudes cost the same as small ones
    let wrapped = (angle + PI).rem_euclid(TAU) - PI;
    if wrapped <= -PI { PI } else { wrapped.min(PI) }
}

/// Shortest signed angular difference that takes `from` to `to`
#[inline]
pub fn angle_delta(from: f32, to: f32) -> f32 {
    wrap_angle(to - from)
}

/// Point on a circle of radius `r` around `center` at angle `theta`, in the z = 0 plane
#[inline]
pub fn polar_to_cartesian(center: Vec3, r: f32, theta: f32) -> Vec3 {
    Vec3::new(center.x + r * theta.cos(), center.y + r * theta.sin(), center.z)
}

/// Per-frame damping factor made roughly frame-rate independent.
///
/// Steps shorter than one reference frame still apply the full factor.
#[inline]
pub fn friction_damped(friction: f32, dt: f32) -> f32 {
    friction.powf((dt * consts::REFERENCE_HZ).max(1.0))
}
