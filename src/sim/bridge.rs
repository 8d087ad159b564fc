//! Energy bridge effect
//!
//! A timed burst of particles streaming from the core out to the tentacle
//! tips. Triggers are queued and honored only once the cooldown has passed.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::settings::BridgeTuning;

/// Particles are dropped once they run this far past the tip
const PARTICLE_END_T: f32 = 1.1;
/// Upward lift of the curve's control point at full ease
const ARCH_HEIGHT: f32 = 80.0;
/// Remaining cooldown below this is reported as ready
const READY_SLACK_MS: f64 = 50.0;
/// Trigger time that puts a fresh bridge well past its cooldown
const NEVER_TRIGGERED_MS: f64 = -1.0e9;

/// A particle travelling along the curve to one tip
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BridgeParticle {
    pub tip_index: usize,
    /// Progress along the curve (0 = core, 1 = tip)
    pub t: f32,
    pub speed: f32,
}

impl BridgeParticle {
    /// Position on the quadratic arc from `source` to `tip`
    pub fn position(&self, source: Vec2, tip: Vec2, progress: f32) -> Vec2 {
        bridge_curve(source, tip, progress, self.t)
    }
}

/// Point `t` along the arched curve linking the core to a tip
pub fn bridge_curve(source: Vec2, tip: Vec2, progress: f32, t: f32) -> Vec2 {
    let ease = (std::f32::consts::PI * progress).sin();
    let control = (source + tip) * 0.5 - Vec2::new(0.0, ARCH_HEIGHT * ease);
    let u = 1.0 - t;
    source * (u * u) + control * (2.0 * u * t) + tip * (t * t)
}

/// What a HUD would show for the bridge
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BridgeStatus {
    Ready,
    Active,
    Recharging { remaining_secs: f32 },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnergyBridge {
    pub active: bool,
    /// A trigger is queued for the next activation check
    pub pending: bool,
    /// 0..1 over the bridge duration
    pub progress: f32,
    start_ms: f64,
    last_trigger_ms: f64,
    spawn_accumulator: f32,
    particles: Vec<BridgeParticle>,
    tuning: BridgeTuning,
}

impl EnergyBridge {
    pub fn new(tuning: BridgeTuning) -> Self {
        Self {
            active: false,
            pending: false,
            progress: 0.0,
            start_ms: 0.0,
            last_trigger_ms: NEVER_TRIGGERED_MS,
            spawn_accumulator: 0.0,
            particles: Vec::new(),
            tuning,
        }
    }

    pub fn particles(&self) -> &[BridgeParticle] {
        &self.particles
    }

    /// Queue a trigger
    pub fn request(&mut self) {
        self.pending = true;
    }

    /// Consume a queued trigger, starting the bridge if it is off cooldown.
    ///
    /// Returns true if the bridge started.
    pub fn maybe_activate(&mut self, now_ms: f64) -> bool {
        if !self.pending {
            return false;
        }
        self.pending = false;
        if self.active || now_ms - self.last_trigger_ms < self.cooldown_ms() {
            return false;
        }

        self.active = true;
        self.start_ms = now_ms;
        self.last_trigger_ms = now_ms;
        self.progress = 0.0;
        self.particles.clear();
        self.spawn_accumulator = 0.0;
        log::debug!("Energy bridge activated at {now_ms:.0}ms");
        true
    }

    /// Advance progress, spawn particles toward random tips and move them along
    pub fn update<R: Rng>(&mut self, dt: f32, now_ms: f64, tip_count: usize, rng: &mut R) {
        if !self.active {
            return;
        }
        let duration_ms = (self.tuning.duration as f64 * 1000.0).max(1.0);
        let elapsed = now_ms - self.start_ms;
        self.progress = (elapsed / duration_ms).clamp(0.0, 1.0) as f32;
        if elapsed >= duration_ms {
            self.active = false;
            self.particles.clear();
            log::debug!("Energy bridge finished");
            return;
        }

        let cap = self.tuning.max_particles.min((tip_count * 4).max(1));
        self.spawn_accumulator += dt * tip_count as f32 * self.tuning.spawn_rate;
        while tip_count > 0 && self.spawn_accumulator > 1.0 && self.particles.len() < cap {
            self.spawn_accumulator -= 1.0;
            self.particles.push(BridgeParticle {
                tip_index: rng.random_range(0..tip_count),
                t: rng.random_range(0.0..0.4),
                speed: rng.random_range(0.35..1.0),
            });
        }

        for p in &mut self.particles {
            p.t += dt * p.speed;
        }
        self.particles.retain(|p| p.t <= PARTICLE_END_T);
    }

    pub fn status(&self, now_ms: f64) -> BridgeStatus {
        if self.active {
            return BridgeStatus::Active;
        }
        let remaining = self.cooldown_ms() - (now_ms - self.last_trigger_ms);
        if remaining > READY_SLACK_MS {
            BridgeStatus::Recharging {
                remaining_secs: (remaining / 1000.0) as f32,
            }
        } else {
            BridgeStatus::Ready
        }
    }

    fn cooldown_ms(&self) -> f64 {
        self.tuning.cooldown as f64 * 1000.0
    }
}
