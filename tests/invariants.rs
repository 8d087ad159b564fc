//! Property-based tests for the tentacle simulation using proptest
//!
//! These tests verify invariants hold across random seeds, tentacle counts
//! and input sequences:
//! - Anchor and ring angles stay wrapped to (-π, π]
//! - Segment counts never change
//! - Roots sit exactly on their attach points
//! - Free segments never end a tick inside the core
//! - No NaN or infinity in segment state
//! - Zero-length frames change nothing
//! - Identical seeds and inputs give identical trajectories

use std::f32::consts::PI;

use abyssal_tentacles::Settings;
use abyssal_tentacles::sim::{SimState, TickInput, tick};
use glam::Vec2;
use proptest::prelude::*;

const SEGMENT_COUNT: usize = 30;
/// Slack for float error on distances of a few hundred units
const DIST_EPSILON: f32 = 1e-2;

fn settings(seed: u64, count: usize) -> Settings {
    Settings {
        seed,
        tentacle_count: count,
        ..Settings::default()
    }
}

fn input_strategy() -> impl Strategy<Value = (TickInput, f32)> {
    (
        prop::option::of((-1000.0f32..1000.0, -1000.0f32..1000.0)),
        any::<bool>(),
        any::<bool>(),
        prop_oneof![Just(0.0f32), 1.0f32 / 240.0..1.0 / 20.0],
    )
        .prop_map(|(target, active, trigger_bridge, dt)| {
            let input = TickInput {
                target: target.map(|(x, y)| Vec2::new(x, y)),
                active,
                trigger_bridge,
            };
            (input, dt)
        })
}

fn check_invariants(state: &SimState) -> Result<(), TestCaseError> {
    let field = &state.field;
    let core = field.core();
    prop_assert_eq!(core.pos.z, 0.0);

    let offset = field.ring_offset();
    prop_assert!(offset > -PI && offset <= PI, "ring offset {}", offset);

    for (i, t) in field.tentacles().iter().enumerate() {
        let angle = t.anchor_angle();
        prop_assert!(angle > -PI && angle <= PI, "tentacle {} angle {}", i, angle);
        prop_assert_eq!(t.segments().len(), SEGMENT_COUNT);

        let root = t.segments()[0].pos;
        prop_assert_eq!(root, t.attach_point(core), "tentacle {} root off its attach point", i);

        let min = t.min_core_distance();
        for (j, s) in t.segments().iter().enumerate() {
            prop_assert!(s.pos.is_finite() && s.prev.is_finite(), "tentacle {} segment {} not finite", i, j);
            if j > 0 {
                let d = s.pos.distance(core.pos);
                prop_assert!(d >= min - DIST_EPSILON, "tentacle {} segment {} at {} < {}", i, j, d, min);
            }
        }
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    /// Property: every invariant holds after every tick
    #[test]
    fn test_invariants_hold_every_tick(
        seed in any::<u64>(),
        count in 1usize..6,
        inputs in prop::collection::vec(input_strategy(), 1..60),
    ) {
        let mut state = SimState::new(&settings(seed, count), Vec2::ZERO);
        check_invariants(&state)?;
        for (input, dt) in &inputs {
            tick(&mut state, input, *dt);
            check_invariants(&state)?;
        }
    }

    /// Property: zero-length frames leave segments, anchors and ring untouched
    #[test]
    fn test_zero_dt_idempotent(
        seed in any::<u64>(),
        count in 1usize..5,
        warmup in prop::collection::vec(input_strategy(), 0..30),
        repeats in 1usize..10,
    ) {
        let mut state = SimState::new(&settings(seed, count), Vec2::new(50.0, -20.0));
        for (input, dt) in &warmup {
            tick(&mut state, input, *dt);
        }
        let before = state.clone();

        let still = TickInput { target: Some(Vec2::new(900.0, 900.0)), active: true, trigger_bridge: false };
        for _ in 0..repeats {
            tick(&mut state, &still, 0.0);
        }

        prop_assert_eq!(state.field.ring().offset, before.field.ring().offset);
        prop_assert_eq!(state.field.ring().angular_vel, before.field.ring().angular_vel);
        for (a, b) in state.field.tentacles().iter().zip(before.field.tentacles()) {
            prop_assert_eq!(a.anchor_angle(), b.anchor_angle());
            prop_assert_eq!(a.segments(), b.segments());
        }
    }

    /// Property: same seed and inputs, same trajectory
    #[test]
    fn test_runs_are_deterministic(
        seed in any::<u64>(),
        count in 1usize..5,
        inputs in prop::collection::vec(input_strategy(), 1..40),
    ) {
        let mut a = SimState::new(&settings(seed, count), Vec2::ZERO);
        let mut b = SimState::new(&settings(seed, count), Vec2::ZERO);
        for (input, dt) in &inputs {
            tick(&mut a, input, *dt);
            tick(&mut b, input, *dt);
            for (ta, tb) in a.field.tentacles().iter().zip(b.field.tentacles()) {
                prop_assert_eq!(ta.segments(), tb.segments());
            }
        }
        prop_assert_eq!(a.snapshot(), b.snapshot());
    }
}
