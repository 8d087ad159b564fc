//! The tentacle field: core, ring and every tentacle, advanced together
//!
//! Tick order is fixed: the core settles first, then tentacles update in
//! construction order, then the ring absorbs their averaged angular
//! velocity. Tentacles therefore see the previous tick's ring, and a
//! tentacle later in the order sees the anchor angles its predecessors
//! already moved this tick.

use glam::{Vec2, Vec3};
use rand::Rng;

use super::state::{AnchorRing, AngularAccumulator, Core};
use super::tentacle::{Tentacle, TickContext};
use crate::settings::Settings;

/// Upper bound of the per-tentacle wave phase offset
const ANIMATION_SEED_RANGE: f32 = 100.0;

#[derive(Debug, Clone)]
pub struct TentacleField {
    core: Core,
    ring: AnchorRing,
    tentacles: Vec<Tentacle>,
    contributions: AngularAccumulator,
    /// Anchor angle of every tentacle, refreshed as each one updates
    anchor_angles: Vec<f32>,
}

impl TentacleField {
    /// Evenly spaced tentacles around a core at `origin`
    pub fn new<R: Rng>(settings: &Settings, origin: Vec2, rng: &mut R) -> Self {
        let count = settings.tentacle_count;
        let base_angles: Vec<f32> = (0..count)
            .map(|i| std::f32::consts::TAU / count as f32 * i as f32)
            .collect();
        Self::with_base_angles(settings, origin, &base_angles, rng)
    }

    /// One tentacle per entry of `base_angles`, in that order
    pub fn with_base_angles<R: Rng>(settings: &Settings, origin: Vec2, base_angles: &[f32], rng: &mut R) -> Self {
        let core = Core::new(origin, &settings.core);
        let attach_radius = core.radius;
        let tentacles: Vec<Tentacle> = base_angles
            .iter()
            .map(|&angle| {
                let seed = rng.random_range(0.0..ANIMATION_SEED_RANGE);
                Tentacle::new(&core, angle, attach_radius, seed, settings.tentacle)
            })
            .collect();
        let anchor_angles = tentacles.iter().map(Tentacle::anchor_angle).collect();

        log::info!(
            "Tentacle field: {} tentacles x {} segments, core radius {}",
            tentacles.len(),
            settings.tentacle.segment_count,
            attach_radius
        );

        Self {
            core,
            ring: AnchorRing::new(&settings.ring),
            tentacles,
            contributions: AngularAccumulator::default(),
            anchor_angles,
        }
    }

    /// Advance the whole system by one frame.
    ///
    /// A non-positive `dt` is a no-op: nothing time-dependent may change.
    pub fn advance(&mut self, dt: f32, target: Option<Vec2>, active: bool, clock_ms: f64) {
        if !(dt > 0.0) {
            return;
        }

        self.core.advance(target, active);

        self.contributions.reset();
        let ctx = TickContext {
            dt,
            time_ms: clock_ms,
            active,
            core: &self.core,
            ring: &self.ring,
        };
        for (i, tentacle) in self.tentacles.iter_mut().enumerate() {
            tentacle.update(&ctx, &self.anchor_angles, i, &mut self.contributions);
            self.anchor_angles[i] = tentacle.anchor_angle();
        }

        self.ring.apply(&self.contributions, dt);

        log::trace!(
            "tick {:.1}ms core=({:.1}, {:.1}) ring={:.3}",
            clock_ms,
            self.core.pos.x,
            self.core.pos.y,
            self.ring.offset
        );
    }

    pub fn core(&self) -> &Core {
        &self.core
    }

    pub fn ring(&self) -> &AnchorRing {
        &self.ring
    }

    pub fn ring_offset(&self) -> f32 {
        self.ring.offset
    }

    pub fn tentacles(&self) -> &[Tentacle] {
        &self.tentacles
    }

    pub fn tentacle_count(&self) -> usize {
        self.tentacles.len()
    }

    /// Tip of every tentacle, in construction order
    pub fn tips(&self) -> impl Iterator<Item = Vec3> + '_ {
        self.tentacles.iter().filter_map(Tentacle::tip)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;
    use std::f32::consts::PI;

    const DT: f32 = 1.0 / 60.0;

    fn field(count: usize, seed: u64) -> TentacleField {
        let settings = Settings {
            tentacle_count: count,
            ..Settings::default()
        };
        TentacleField::new(&settings, Vec2::ZERO, &mut Pcg32::seed_from_u64(seed))
    }

    fn run(field: &mut TentacleField, ticks: usize, target: Option<Vec2>, active: bool) {
        for k in 0..ticks {
            field.advance(DT, target, active, k as f64 * 1000.0 / 60.0);
        }
    }

    #[test]
    fn test_even_spacing() {
        let f = field(4, 1);
        let angles: Vec<f32> = f.tentacles().iter().map(Tentacle::base_angle).collect();
        assert!((angles[1] - PI / 2.0).abs() < 1e-5);
        assert!((angles[2] - PI).abs() < 1e-5);
        // 3π/2 wraps to -π/2
        assert!((angles[3] + PI / 2.0).abs() < 1e-5);
        assert_eq!(f.tips().count(), 4);
    }

    #[test]
    fn test_seeds_come_from_rng() {
        let a = field(6, 7);
        let b = field(6, 7);
        let c = field(6, 8);
        let seeds = |f: &TentacleField| f.tentacles().iter().map(Tentacle::animation_seed).collect::<Vec<_>>();
        assert_eq!(seeds(&a), seeds(&b));
        assert_ne!(seeds(&a), seeds(&c));
        assert!(seeds(&a).iter().all(|s| (0.0..ANIMATION_SEED_RANGE).contains(s)));
    }

    #[test]
    fn test_zero_dt_is_noop() {
        let mut f = field(5, 3);
        run(&mut f, 30, Some(Vec2::new(200.0, 50.0)), true);
        let before = f.clone();
        for _ in 0..10 {
            f.advance(0.0, Some(Vec2::new(-300.0, 0.0)), true, 12345.0);
        }
        assert_eq!(f.ring().offset, before.ring().offset);
        assert_eq!(f.ring().angular_vel, before.ring().angular_vel);
        assert_eq!(f.core().pos, before.core().pos);
        for (t, b) in f.tentacles().iter().zip(before.tentacles()) {
            assert_eq!(t.anchor_angle(), b.anchor_angle());
            assert_eq!(t.segments(), b.segments());
        }
    }

    #[test]
    fn test_single_tentacle_at_rest_stays_bounded() {
        let settings = Settings::default();
        let mut f = TentacleField::with_base_angles(&settings, Vec2::ZERO, &[0.0], &mut Pcg32::seed_from_u64(42));
        run(&mut f, 120, None, false);

        let t = &f.tentacles()[0];
        assert_eq!(t.attach_radius(), 60.0);
        let anchor = t.attach_point(f.core());
        let reach = settings.tentacle.segment_length * settings.tentacle.segment_count as f32;
        for p in t.positions() {
            assert!(p.is_finite());
            assert!(p.distance(anchor) <= reach, "segment {} from anchor", p.distance(anchor));
        }
    }

    #[test]
    fn test_neighbor_repulsion_separates() {
        let settings = Settings::default();
        let mut f = TentacleField::with_base_angles(&settings, Vec2::ZERO, &[0.0, 0.01], &mut Pcg32::seed_from_u64(5));
        let gap = |f: &TentacleField| {
            let t = f.tentacles();
            crate::angle_delta(t[0].anchor_angle(), t[1].anchor_angle()).abs()
        };

        // The push lands in angular velocity, so angles start moving on the second tick
        f.advance(DT, None, false, 0.0);
        let mut last = gap(&f);
        for k in 1..12 {
            f.advance(DT, None, false, k as f64 * 1000.0 / 60.0);
            let now = gap(&f);
            assert!(now > last, "gap shrank at tick {k}: {last} -> {now}");
            last = now;
        }
        assert!(last > 0.05);
    }

    #[test]
    fn test_core_approaches_target() {
        let mut f = field(8, 11);
        let target = Vec2::new(400.0, -250.0);
        let start = target.distance(f.core().pos.truncate());

        // The spring is slightly underdamped; compare once per oscillation
        let mut last = start;
        for _ in 0..3 {
            run(&mut f, 60, Some(target), true);
            let d = target.distance(f.core().pos.truncate());
            assert!(d < last, "distance grew: {last} -> {d}");
            last = d;
        }
        assert!(last < start * 0.01);
        assert_eq!(f.core().pos.z, 0.0);
    }

    #[test]
    fn test_ring_absorbs_mean_contribution() {
        let settings = Settings {
            tentacle_count: 10,
            ..Settings::default()
        };
        let mut f = TentacleField::new(&settings, Vec2::ZERO, &mut Pcg32::seed_from_u64(2));
        let damped = crate::friction_damped(settings.ring.friction, DT);
        let max = settings.ring.max_angular_velocity;

        let mut saw_spin = false;
        // Circle the core so anchors are pushed around unevenly
        for k in 0..240 {
            let a = k as f32 * 0.05;
            let target = Vec2::new(a.cos(), a.sin()) * 300.0;
            let prev_vel = f.ring().angular_vel;
            let prev_offset = f.ring_offset();

            f.advance(DT, Some(target), true, k as f64 * 1000.0 / 60.0);

            assert_eq!(f.contributions.count(), 10);
            let expected = ((prev_vel + f.contributions.mean()) * damped).clamp(-max, max);
            assert!((f.ring().angular_vel - expected).abs() < 1e-6, "tick {k}");
            let expected_offset = crate::wrap_angle(prev_offset + expected * DT);
            assert!(crate::angle_delta(expected_offset, f.ring_offset()).abs() < 1e-5);
            saw_spin |= f.ring().angular_vel != 0.0;
        }
        assert!(saw_spin);
        assert!(f.ring_offset() > -PI && f.ring_offset() <= PI);
    }

    #[test]
    fn test_ring_turns_with_dragged_anchor() {
        let settings = Settings::default();
        let mut f = TentacleField::with_base_angles(&settings, Vec2::ZERO, &[0.0], &mut Pcg32::seed_from_u64(4));
        // Core pulled along +y, tangential to the anchor at angle 0
        f.advance(DT, Some(Vec2::new(0.0, 500.0)), true, 0.0);
        assert!(f.tentacles()[0].anchor_angle() > 0.0);
        assert!(f.ring().angular_vel > 0.0);
        assert!(f.ring_offset() > 0.0);
    }

    #[test]
    fn test_extreme_tuning_keeps_angles_wrapped() {
        let settings = Settings::from_json(
            r#"{ "tentacle_count": 4, "tentacle": { "anchor": { "max_angular_velocity": 1e12, "core_influence": 1e12 } } }"#,
        )
        .expect("valid json");
        let mut f = TentacleField::new(&settings, Vec2::ZERO, &mut Pcg32::seed_from_u64(6));
        run(&mut f, 5, Some(Vec2::new(800.0, -600.0)), true);
        for t in f.tentacles() {
            assert!(t.anchor_angle() > -PI && t.anchor_angle() <= PI);
            assert!(t.positions().all(|p| p.is_finite()));
        }
        assert!(f.ring_offset() > -PI && f.ring_offset() <= PI);
    }

    #[test]
    fn test_huge_base_angles_are_wrapped() {
        let settings = Settings::default();
        let mut f =
            TentacleField::with_base_angles(&settings, Vec2::ZERO, &[1.0e12, -4.0e20], &mut Pcg32::seed_from_u64(1));
        for t in f.tentacles() {
            assert!(t.base_angle() > -PI && t.base_angle() <= PI);
        }
        run(&mut f, 3, None, false);
        assert!(f.tentacles().iter().all(|t| t.anchor_angle().is_finite()));
    }
}
