//! Frame driver
//!
//! Bundles the tentacle field with the effects that feed off it and advances
//! everything from one input snapshot per frame.

use glam::{Vec2, Vec3};
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::bridge::EnergyBridge;
use super::field::TentacleField;
use crate::consts::MAX_FRAME_DT;
use crate::settings::Settings;

/// Input for a single frame
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Pointer position the core is pulled toward
    pub target: Option<Vec2>,
    /// Pointer held down
    pub active: bool,
    /// Fire the energy bridge (one-shot)
    pub trigger_bridge: bool,
}

/// Everything advanced per frame
#[derive(Debug, Clone)]
pub struct SimState {
    pub seed: u64,
    pub field: TentacleField,
    pub bridge: EnergyBridge,
    /// Simulation clock
    pub time_ms: f64,
    pub ticks: u64,
    rng: Pcg32,
}

impl SimState {
    /// Build the field around `origin`, drawing all randomness from `settings.seed`
    pub fn new(settings: &Settings, origin: Vec2) -> Self {
        let mut rng = Pcg32::seed_from_u64(settings.seed);
        let field = TentacleField::new(settings, origin, &mut rng);
        Self {
            seed: settings.seed,
            field,
            bridge: EnergyBridge::new(settings.bridge),
            time_ms: 0.0,
            ticks: 0,
            rng,
        }
    }

    /// Serializable view of the current frame
    pub fn snapshot(&self) -> FrameSnapshot {
        let core = self.field.core();
        FrameSnapshot {
            tick: self.ticks,
            time_ms: self.time_ms,
            core: core.pos,
            core_radius: core.radius,
            ring_offset: self.field.ring_offset(),
            tips: self.field.tips().collect(),
            bridge_progress: self.bridge.active.then_some(self.bridge.progress),
        }
    }
}

/// One frame of output for external consumers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameSnapshot {
    pub tick: u64,
    pub time_ms: f64,
    pub core: Vec3,
    pub core_radius: f32,
    pub ring_offset: f32,
    pub tips: Vec<Vec3>,
    /// Present while the bridge is up
    pub bridge_progress: Option<f32>,
}

/// Clamp a measured frame time to something the solver stays stable with
pub fn clamp_frame_dt(dt: f32) -> f32 {
    if dt.is_finite() { dt.clamp(0.0, MAX_FRAME_DT) } else { 0.0 }
}

/// Advance the simulation by one frame of `dt` seconds
pub fn tick(state: &mut SimState, input: &TickInput, dt: f32) {
    if input.trigger_bridge {
        state.bridge.request();
    }

    if dt > 0.0 {
        state.time_ms += dt as f64 * 1000.0;
        state.ticks += 1;
    }

    state.bridge.maybe_activate(state.time_ms);
    state
        .field
        .advance(dt, input.target, input.active, state.time_ms);
    state
        .bridge
        .update(dt, state.time_ms, state.field.tentacle_count(), &mut state.rng);
}
