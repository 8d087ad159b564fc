//! Render-facing export
//!
//! Turns simulation state into flat, GPU-uploadable instance data. Drawing
//! itself is left to the host application.

pub mod segments;

pub use segments::{SegmentDraw, SegmentLists, as_bytes, collect_segments};
