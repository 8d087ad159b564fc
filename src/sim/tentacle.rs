//! A single tentacle: a Verlet chain pinned to the core's circumference
//!
//! Each tick the anchor slides around the core under the pull of the core's
//! motion and of the chain itself, the chain coasts on its implicit velocity,
//! and a few relaxation passes restore segment lengths, pull interior
//! segments toward an animated wave shape and keep everything outside the
//! core. Finally the anchor is steered toward its ring slot and away from
//! crowded neighbors; those velocity changes take effect next tick.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::collision::{push_point_out, segment_core_collision};
use super::state::{AnchorRing, AngularAccumulator, Core};
use crate::consts::NORMALIZE_EPSILON;
use crate::settings::TentacleTuning;
use crate::{angle_delta, friction_damped, polar_to_cartesian, wrap_angle};

/// One point mass of the chain
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub pos: Vec3,
    /// Position last tick; `pos - prev` is the implicit velocity
    pub prev: Vec3,
}

impl Segment {
    fn at(pos: Vec3) -> Self {
        Self { pos, prev: pos }
    }
}

/// Shared per-tick inputs for every tentacle update
#[derive(Debug, Clone, Copy)]
pub struct TickContext<'a> {
    pub dt: f32,
    /// Monotonic simulation clock
    pub time_ms: f64,
    /// Target is being driven (pointer held)
    pub active: bool,
    pub core: &'a Core,
    /// Ring as of the previous tick
    pub ring: &'a AnchorRing,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tentacle {
    /// Rest orientation around the core
    base_angle: f32,
    attach_radius: f32,
    anchor_angle: f32,
    anchor_angular_vel: f32,
    /// Wave phase offset, fixed at creation
    animation_seed: f32,
    /// Core velocity along the anchor tangent, per unit radius (last tick)
    core_tangential_vel: f32,
    /// Attach point at the end of the previous tick
    last_attach: Vec3,
    segments: Vec<Segment>,
    tuning: TentacleTuning,
}

impl Tentacle {
    /// Lay the chain out straight and radially from the core at `base_angle`
    pub fn new(core: &Core, base_angle: f32, attach_radius: f32, animation_seed: f32, tuning: TentacleTuning) -> Self {
        let base_angle = wrap_angle(base_angle);
        let segments: Vec<Segment> = (0..tuning.segment_count)
            .map(|i| {
                let dist = attach_radius + i as f32 * tuning.segment_length;
                Segment::at(polar_to_cartesian(core.pos, dist, base_angle))
            })
            .collect();
        let last_attach = segments
            .first()
            .map(|s| s.pos)
            .unwrap_or_else(|| polar_to_cartesian(core.pos, attach_radius, base_angle));

        Self {
            base_angle,
            attach_radius,
            anchor_angle: base_angle,
            anchor_angular_vel: 0.0,
            animation_seed,
            core_tangential_vel: 0.0,
            last_attach,
            segments,
            tuning,
        }
    }

    pub fn base_angle(&self) -> f32 {
        self.base_angle
    }

    pub fn attach_radius(&self) -> f32 {
        self.attach_radius
    }

    pub fn anchor_angle(&self) -> f32 {
        self.anchor_angle
    }

    pub fn anchor_angular_vel(&self) -> f32 {
        self.anchor_angular_vel
    }

    pub fn animation_seed(&self) -> f32 {
        self.animation_seed
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Segment positions from root to tip
    pub fn positions(&self) -> impl ExactSizeIterator<Item = Vec3> + '_ {
        self.segments.iter().map(|s| s.pos)
    }

    pub fn tip(&self) -> Option<Vec3> {
        self.segments.last().map(|s| s.pos)
    }

    /// Closest distance segments other than the root may get to the core center
    pub fn min_core_distance(&self) -> f32 {
        self.attach_radius + self.tuning.collision_pad
    }

    /// Where the root sits for the current anchor angle
    pub fn attach_point(&self, core: &Core) -> Vec3 {
        polar_to_cartesian(core.pos, self.attach_radius, self.anchor_angle)
    }

    fn anchor_dir(&self) -> Vec3 {
        Vec3::new(self.anchor_angle.cos(), self.anchor_angle.sin(), 0.0)
    }

    /// Advance one tick.
    ///
    /// `neighbor_angles` holds the current anchor angle of every tentacle in
    /// the field, this one included at `index`. The anchor's angular velocity
    /// is added to `contributions` for the ring.
    pub fn update(
        &mut self,
        ctx: &TickContext<'_>,
        neighbor_angles: &[f32],
        index: usize,
        contributions: &mut AngularAccumulator,
    ) {
        if self.segments.is_empty() {
            return;
        }

        self.update_anchor(ctx, contributions);

        let attach = self.attach_point(ctx.core);
        self.pin_root(attach);
        self.carry(ctx.dt);
        self.inject_anchor_motion(attach);

        for _ in 0..self.tuning.iterations {
            self.solve_distances();
            self.pin_root(attach);
            self.solve_bend(ctx);
            self.resolve_core_collisions(ctx.core);
            self.pin_root(attach);
        }

        self.last_attach = attach;

        self.track_ring(ctx.ring);
        self.repel_neighbors(neighbor_angles, index);

        debug_assert!(
            self.segments.iter().all(|s| s.pos.is_finite() && s.prev.is_finite()),
            "tentacle segment state diverged"
        );
    }

    /// Slide the anchor under core motion and chain tension
    fn update_anchor(&mut self, ctx: &TickContext<'_>, contributions: &mut AngularAccumulator) {
        let anchor = self.tuning.anchor;
        let (sin, cos) = self.anchor_angle.sin_cos();
        let tangent = Vec3::new(-sin, cos, 0.0);

        self.core_tangential_vel = ctx.core.vel.extend(0.0).dot(tangent) / self.attach_radius.max(1.0);

        // Pull of the first free segment, measured from last tick's attach point
        let tension = match self.segments.get(1) {
            Some(s1) => {
                let d = s1.pos - self.last_attach;
                (d.x * tangent.x + d.y * tangent.y) / self.tuning.segment_length.max(1.0)
            }
            None => 0.0,
        };

        let damped = friction_damped(anchor.friction, ctx.dt);
        self.anchor_angular_vel = ((self.anchor_angular_vel
            + anchor.core_influence * self.core_tangential_vel
            + anchor.tension_influence * tension)
            * damped)
            .clamp(-anchor.max_angular_velocity, anchor.max_angular_velocity);

        contributions.add(self.anchor_angular_vel);

        self.anchor_angle = wrap_angle(self.anchor_angle + self.anchor_angular_vel * ctx.dt);
    }

    /// Root has no inertia: position and history both snap to the attach point
    fn pin_root(&mut self, attach: Vec3) {
        if let Some(root) = self.segments.first_mut() {
            *root = Segment::at(attach);
        }
    }

    /// Damped Verlet step for the free segments
    fn carry(&mut self, dt: f32) {
        let damp = friction_damped(self.tuning.air_damping, dt);
        let keep = 1.0 - self.tuning.friction_strength;
        for seg in self.segments.iter_mut().skip(1) {
            let vel = (seg.pos - seg.prev) * damp;
            seg.prev = seg.pos;
            seg.pos += vel * keep;
        }
    }

    /// Drag the near segments along with fast anchor motion
    fn inject_anchor_motion(&mut self, attach: Vec3) {
        if self.segments.len() <= 2 {
            return;
        }
        let moved = attach - self.last_attach;
        let [w1, w2] = self.tuning.injection;
        for (seg, weight) in self.segments[1..3].iter_mut().zip([w1, w2]) {
            seg.pos.x += moved.x * weight;
            seg.pos.y += moved.y * weight;
        }
    }

    /// Restore rest lengths; the link at the root only moves its free end
    fn solve_distances(&mut self) {
        let rest = self.tuning.segment_length;
        for i in 1..self.segments.len() {
            let delta = self.segments[i].pos - self.segments[i - 1].pos;
            let mut dist = delta.length();
            if dist < NORMALIZE_EPSILON {
                dist = 1.0;
            }
            let diff = (dist - rest) / dist;
            if i == 1 {
                self.segments[i].pos -= delta * diff * 0.6;
            } else {
                let corr = delta * diff * 0.5;
                self.segments[i - 1].pos += corr;
                self.segments[i].pos -= corr;
            }
        }
    }

    /// Soft spring of interior segments toward the animated wave shape
    fn solve_bend(&mut self, ctx: &TickContext<'_>) {
        let n = self.segments.len();
        if n < 3 {
            return;
        }
        let wave = &self.tuning.wave;
        let amp = wave.amplitude(ctx.active);
        let speed = wave.speed(ctx.active);
        let time = (ctx.time_ms * 0.001) as f32;
        let seg_len = self.tuning.segment_length;
        let stiffness = self.tuning.bend_stiffness;
        let core_gain = (0.8 + 0.6 * self.core_tangential_vel.abs()).clamp(0.8, 1.6);
        let last = (n - 1) as f32;

        for i in 1..n - 1 {
            let p0 = self.segments[i - 1].pos;
            let p2 = self.segments[i + 1].pos;
            let p1 = self.segments[i].pos;

            let mid = (p0 + p2) * 0.5;
            let span = p2 - p0;
            let span_len = span.length();
            let tangent = if span_len < NORMALIZE_EPSILON { Vec3::Y } else { span / span_len };

            // Radial direction with the tangential part removed, tilted out of plane
            let radial = p1 - ctx.core.pos;
            let mut normal = radial - tangent * radial.dot(tangent);
            normal.z += self.tuning.z_bias * seg_len;
            let normal_len = normal.length();
            let normal = if normal_len < NORMALIZE_EPSILON { Vec3::Z } else { normal / normal_len };

            let along = i as f32 / last;
            let envelope = wave.envelope_root + (wave.envelope_tip - wave.envelope_root) * along;
            let phase = time * speed - i as f32 * wave.phase_offset + self.animation_seed;
            let curvature = amp * envelope * core_gain * phase.sin();

            let target = mid + normal * (curvature * seg_len);
            self.segments[i].pos = p1 + (target - p1) * stiffness;
        }
    }

    fn resolve_core_collisions(&mut self, core: &Core) {
        let min_radius = self.min_core_distance();
        let fallback = self.anchor_dir();

        for seg in self.segments.iter_mut().skip(1) {
            seg.pos = push_point_out(seg.pos, core.pos, min_radius, fallback);
        }

        for j in 1..self.segments.len() {
            let a = self.segments[j - 1].pos;
            let b = self.segments[j].pos;
            let contact = segment_core_collision(a, b, core.pos, min_radius, fallback);
            if !contact.hit {
                continue;
            }
            let push = contact.normal * contact.penetration;
            self.segments[j].pos += push;
            if j > 1 {
                self.segments[j - 1].pos += push * 0.2;
            }
        }
    }

    /// Steer toward this tentacle's slot on the rotating ring
    fn track_ring(&mut self, ring: &AnchorRing) {
        let gap = angle_delta(self.anchor_angle, self.base_angle + ring.offset);
        self.anchor_angular_vel += gap * self.tuning.ring_tracking;
    }

    /// Push away from neighbors closer than a fraction of the even spacing
    fn repel_neighbors(&mut self, neighbor_angles: &[f32], index: usize) {
        if neighbor_angles.len() < 2 {
            return;
        }
        let spacing = std::f32::consts::TAU / neighbor_angles.len() as f32;
        let threshold = spacing * self.tuning.spacing_fraction;
        if threshold <= 0.0 {
            return;
        }
        let strength = self.tuning.repulsion_strength;

        for (j, &other) in neighbor_angles.iter().enumerate() {
            if j == index {
                continue;
            }
            let diff = angle_delta(self.anchor_angle, other);
            if diff.abs() < threshold {
                let sign = if diff > 0.0 { 1.0 } else { -1.0 };
                self.anchor_angular_vel -= sign * strength * (threshold - diff.abs()) / threshold;
            }
        }
    }
}
