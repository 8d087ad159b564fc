//! Tentacle links as drawable line instances
//!
//! The core is drawn between the two lists: links behind it (negative z)
//! first, then the core, then links in front.

use bytemuck::{Pod, Zeroable};

use crate::sim::Tentacle;

/// Line width at the root
pub const ROOT_WIDTH: f32 = 6.4;
/// Line width at the tip
pub const TIP_WIDTH: f32 = 3.2;

/// One link of a tentacle, ready for upload as an instance
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct SegmentDraw {
    pub a: [f32; 3],
    pub b: [f32; 3],
    /// Mean depth of the two endpoints
    pub avg_z: f32,
    pub width: f32,
}

/// Links split by which side of the core they are drawn on
#[derive(Debug, Clone, Default)]
pub struct SegmentLists {
    pub back: Vec<SegmentDraw>,
    pub front: Vec<SegmentDraw>,
}

impl SegmentLists {
    pub fn clear(&mut self) {
        self.back.clear();
        self.front.clear();
    }

    /// Back list far-to-near, front list near-to-far
    pub fn sort_for_drawing(&mut self) {
        self.back.sort_by(|a, b| a.avg_z.total_cmp(&b.avg_z));
        self.front.sort_by(|a, b| b.avg_z.total_cmp(&a.avg_z));
    }

    pub fn len(&self) -> usize {
        self.back.len() + self.front.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Append every link of `tentacle` to `lists`, width tapering root to tip
pub fn collect_segments(tentacle: &Tentacle, lists: &mut SegmentLists) {
    let segments = tentacle.segments();
    if segments.len() < 2 {
        return;
    }
    let last = (segments.len() - 1) as f32;

    for (i, pair) in segments.windows(2).enumerate() {
        let (a, b) = (pair[0].pos, pair[1].pos);
        let t = (i + 1) as f32 / last;
        let draw = SegmentDraw {
            a: a.to_array(),
            b: b.to_array(),
            avg_z: (a.z + b.z) * 0.5,
            width: ROOT_WIDTH + (TIP_WIDTH - ROOT_WIDTH) * t,
        };
        if draw.avg_z < 0.0 {
            lists.back.push(draw);
        } else {
            lists.front.push(draw);
        }
    }
}

/// Raw bytes of a draw list for buffer upload
pub fn as_bytes(draws: &[SegmentDraw]) -> &[u8] {
    bytemuck::cast_slice(draws)
}
