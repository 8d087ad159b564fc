//! Simulation tuning
//!
//! Every field has a default, so a settings file only needs the values it
//! overrides.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Failure to read or parse a settings file
#[derive(Debug)]
pub enum SettingsError {
    Io(std::io::Error),
    Parse(serde_json::Error),
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettingsError::Io(e) => write!(f, "failed to read settings: {e}"),
            SettingsError::Parse(e) => write!(f, "invalid settings JSON: {e}"),
        }
    }
}

impl std::error::Error for SettingsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SettingsError::Io(e) => Some(e),
            SettingsError::Parse(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for SettingsError {
    fn from(e: std::io::Error) -> Self {
        SettingsError::Io(e)
    }
}

impl From<serde_json::Error> for SettingsError {
    fn from(e: serde_json::Error) -> Self {
        SettingsError::Parse(e)
    }
}

/// Spring that drags the core toward the pointer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreTuning {
    /// Spring constant applied per frame while the target is active
    pub stiffness: f32,
    /// Velocity retained per frame
    pub drag: f32,
    /// Body radius, also the radius tentacles attach at
    pub radius: f32,
}

impl Default for CoreTuning {
    fn default() -> Self {
        Self {
            stiffness: 0.02,
            drag: 0.85,
            radius: 60.0,
        }
    }
}

/// Shared rotation of the whole tentacle arrangement
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RingTuning {
    pub friction: f32,
    pub max_angular_velocity: f32,
}

impl Default for RingTuning {
    fn default() -> Self {
        Self {
            friction: 0.9,
            max_angular_velocity: 6.0,
        }
    }
}

/// Procedural traveling wave along a tentacle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaveTuning {
    pub amp_idle: f32,
    pub amp_active: f32,
    /// Angular speed (rad/s) of the wave phase when idle
    pub speed_idle: f32,
    pub speed_active: f32,
    /// Phase lag per segment index
    pub phase_offset: f32,
    /// Amplitude multiplier at the root
    pub envelope_root: f32,
    /// Amplitude multiplier at the tip
    pub envelope_tip: f32,
}

impl Default for WaveTuning {
    fn default() -> Self {
        Self {
            amp_idle: 0.18,
            amp_active: 0.33,
            speed_idle: 2.0,
            speed_active: 4.8,
            phase_offset: 0.45,
            envelope_root: 0.6,
            envelope_tip: 1.25,
        }
    }
}

impl WaveTuning {
    #[inline]
    pub fn amplitude(&self, active: bool) -> f32 {
        if active { self.amp_active } else { self.amp_idle }
    }

    #[inline]
    pub fn speed(&self, active: bool) -> f32 {
        if active { self.speed_active } else { self.speed_idle }
    }
}

/// Anchor sliding around the core circumference
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnchorTuning {
    pub friction: f32,
    /// How strongly the core's tangential velocity drags the anchor
    pub core_influence: f32,
    /// How strongly the chain's pull drags the anchor
    pub tension_influence: f32,
    pub max_angular_velocity: f32,
}

impl Default for AnchorTuning {
    fn default() -> Self {
        Self {
            friction: 0.9,
            core_influence: 0.6,
            tension_influence: 0.15,
            max_angular_velocity: 6.0,
        }
    }
}

/// Per-tentacle chain and solver parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TentacleTuning {
    pub segment_count: usize,
    /// Rest distance between adjacent segments
    pub segment_length: f32,
    /// Relaxation passes per tick
    pub iterations: u32,
    pub air_damping: f32,
    /// Fraction of carried velocity lost per tick
    pub friction_strength: f32,
    pub bend_stiffness: f32,
    /// Extra clearance kept between segments and the core
    pub collision_pad: f32,
    /// Out-of-plane bias of the bend normal, in segment lengths
    pub z_bias: f32,
    /// Share of attach motion pushed into segments 1 and 2
    pub injection: [f32; 2],
    /// Gain pulling the anchor toward its ring slot
    pub ring_tracking: f32,
    pub repulsion_strength: f32,
    /// Fraction of the even spacing below which neighbors repel
    pub spacing_fraction: f32,
    pub wave: WaveTuning,
    pub anchor: AnchorTuning,
}

impl Default for TentacleTuning {
    fn default() -> Self {
        Self {
            segment_count: 30,
            segment_length: 10.0,
            iterations: 4,
            air_damping: 0.995,
            friction_strength: 0.15,
            bend_stiffness: 0.08,
            collision_pad: 2.5,
            z_bias: 0.4,
            injection: [0.35, 0.22],
            ring_tracking: 0.1,
            repulsion_strength: 0.5,
            spacing_fraction: 0.8,
            wave: WaveTuning::default(),
            anchor: AnchorTuning::default(),
        }
    }
}

/// Energy bridge effect timing
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeTuning {
    /// Seconds the bridge stays up
    pub duration: f32,
    /// Seconds between triggers
    pub cooldown: f32,
    /// Particles spawned per tip per second
    pub spawn_rate: f32,
    pub max_particles: usize,
}

impl Default for BridgeTuning {
    fn default() -> Self {
        Self {
            duration: 3.0,
            cooldown: 3.5,
            spawn_rate: 1.2,
            max_particles: 120,
        }
    }
}

/// Complete simulation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Seed for tentacle animation phases and effect randomness
    pub seed: u64,
    pub tentacle_count: usize,
    pub core: CoreTuning,
    pub ring: RingTuning,
    pub tentacle: TentacleTuning,
    pub bridge: BridgeTuning,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            seed: 0x7E47_AC1E,
            tentacle_count: 30,
            core: CoreTuning::default(),
            ring: RingTuning::default(),
            tentacle: TentacleTuning::default(),
            bridge: BridgeTuning::default(),
        }
    }
}

impl Settings {
    /// Parse settings from JSON text and fix up out-of-range values
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Settings = serde_json::from_str(json)?;
        Ok(settings.validated())
    }

    /// Load settings from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Clamp values the solver cannot run with, warning about each fix
    pub fn validated(mut self) -> Self {
        let t = &mut self.tentacle;
        if t.segment_count < 2 {
            log::warn!("segment_count {} too small, using 2", t.segment_count);
            t.segment_count = 2;
        }
        if !(t.segment_length > 0.0) {
            log::warn!("segment_length {} must be positive, using 1", t.segment_length);
            t.segment_length = 1.0;
        }
        if t.iterations == 0 {
            log::warn!("iterations must be at least 1");
            t.iterations = 1;
        }
        t.air_damping = unit_interval("tentacle.air_damping", t.air_damping);
        t.anchor.friction = unit_interval("tentacle.anchor.friction", t.anchor.friction);
        self.ring.friction = unit_interval("ring.friction", self.ring.friction);
        if !(self.core.radius > 0.0) {
            log::warn!("core.radius {} must be positive, using 1", self.core.radius);
            self.core.radius = 1.0;
        }
        self.tentacle.anchor.max_angular_velocity =
            angular_limit("tentacle.anchor.max_angular_velocity", self.tentacle.anchor.max_angular_velocity);
        self.ring.max_angular_velocity = angular_limit("ring.max_angular_velocity", self.ring.max_angular_velocity);
        self.bridge.duration = positive_secs("bridge.duration", self.bridge.duration);
        self.bridge.cooldown = positive_secs("bridge.cooldown", self.bridge.cooldown);
        self
    }
}

/// Largest angular velocity cap (rad/s) accepted from settings
const MAX_ANGULAR_VELOCITY: f32 = 60.0;
/// Shortest bridge duration or cooldown accepted from settings
const MIN_BRIDGE_SECS: f32 = 0.05;

/// Clamp an angular velocity cap into (0, MAX_ANGULAR_VELOCITY]
fn angular_limit(name: &str, value: f32) -> f32 {
    if value > 0.0 && value <= MAX_ANGULAR_VELOCITY {
        return value;
    }
    let fixed = if value > MAX_ANGULAR_VELOCITY { MAX_ANGULAR_VELOCITY } else { 1.0 };
    log::warn!("{name} {value} outside (0, {MAX_ANGULAR_VELOCITY}], using {fixed}");
    fixed
}

fn positive_secs(name: &str, value: f32) -> f32 {
    if value >= MIN_BRIDGE_SECS && value.is_finite() {
        return value;
    }
    log::warn!("{name} {value} too short, using {MIN_BRIDGE_SECS}");
    MIN_BRIDGE_SECS
}

/// Clamp a damping factor into (0, 1]
fn unit_interval(name: &str, value: f32) -> f32 {
    if value > 0.0 && value <= 1.0 {
        return value;
    }
    let fixed = if value > 1.0 { 1.0 } else { 0.01 };
    log::warn!("{name} {value} outside (0, 1], using {fixed}");
    fixed
}
