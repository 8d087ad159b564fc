//! Deterministic simulation module
//!
//! Everything that moves lives here. This module must be pure and deterministic:
//! - Seeded RNG only (injected at construction)
//! - Stable iteration order (tentacles update in construction order)
//! - No rendering or platform dependencies

pub mod bridge;
pub mod collision;
pub mod field;
pub mod state;
pub mod tentacle;
pub mod tick;

pub use bridge::{BridgeParticle, BridgeStatus, EnergyBridge, bridge_curve};
pub use collision::{CollisionResult, point_core_collision, push_point_out, segment_core_collision};
pub use field::TentacleField;
pub use state::{AnchorRing, AngularAccumulator, Core};
pub use tentacle::{Segment, Tentacle, TickContext};
pub use tick::{FrameSnapshot, SimState, TickInput, clamp_frame_dt, tick};
