//! Keeping tentacle segments outside the core
//!
//! The core is a sphere at `center` with an exclusion radius. Points are
//! projected onto its surface; links (pairs of points) are tested at their
//! closest approach so a link can't cut through the body even when both of
//! its ends are outside.

use glam::Vec3;

use crate::consts::{NORMALIZE_EPSILON, SEGMENT_EPSILON_SQ};

/// Result of a core contact check
#[derive(Debug, Clone)]
pub struct CollisionResult {
    /// Whether the geometry penetrates the exclusion radius
    pub hit: bool,
    /// Outward direction from the core center
    pub normal: Vec3,
    /// Penetration depth (for position correction)
    pub penetration: f32,
}

impl CollisionResult {
    pub fn miss() -> Self {
        Self {
            hit: false,
            normal: Vec3::ZERO,
            penetration: 0.0,
        }
    }
}

/// Check whether `point` is closer than `min_radius` to `center`.
///
/// `fallback` is the push direction used when the point sits on the center.
pub fn point_core_collision(point: Vec3, center: Vec3, min_radius: f32, fallback: Vec3) -> CollisionResult {
    contact_at(point - center, min_radius, fallback)
}

/// Project a point onto the exclusion sphere if it is inside, otherwise leave it
pub fn push_point_out(point: Vec3, center: Vec3, min_radius: f32, fallback: Vec3) -> Vec3 {
    let result = point_core_collision(point, center, min_radius, fallback);
    if result.hit {
        center + result.normal * min_radius
    } else {
        point
    }
}

/// Check the link `a`-`b` against the exclusion sphere at its closest point.
///
/// Near-zero-length links are skipped.
pub fn segment_core_collision(a: Vec3, b: Vec3, center: Vec3, min_radius: f32, fallback: Vec3) -> CollisionResult {
    let v = b - a;
    let denom = v.length_squared();
    if denom < SEGMENT_EPSILON_SQ {
        return CollisionResult::miss();
    }
    let t = (v.dot(center - a) / denom).clamp(0.0, 1.0);
    let closest = a + v * t;
    contact_at(closest - center, min_radius, fallback)
}

fn contact_at(offset: Vec3, min_radius: f32, fallback: Vec3) -> CollisionResult {
    let dist = offset.length();
    if dist >= min_radius {
        return CollisionResult::miss();
    }
    let (normal, dist) = if dist < NORMALIZE_EPSILON {
        (fallback, 1.0)
    } else {
        (offset / dist, dist)
    };
    CollisionResult {
        hit: true,
        normal,
        penetration: min_radius - dist,
    }
}
