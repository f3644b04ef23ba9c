//! Search nodes and the open set ordering

use std::cmp::Ordering;

use crate::foundation::math::Vec3;

/// Quantized node coordinates
///
/// Samples closer together than the quantization grid collapse into the
/// same key, and therefore the same node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeKey(pub i32, pub i32, pub i32);

impl NodeKey {
    /// Key of `position` on a grid of `quantization` units
    #[allow(clippy::cast_possible_truncation)]
    pub fn from_position(position: Vec3, quantization: f32) -> Self {
        let quantization = if quantization > 0.0 { quantization } else { 1.0 };
        Self(
            (position.x / quantization).round() as i32,
            (position.y / quantization).round() as i32,
            (position.z / quantization).round() as i32,
        )
    }
}

/// One sample of the search graph
#[derive(Debug, Clone, PartialEq)]
pub struct PathFindingNode {
    /// Quantized identity
    pub key: NodeKey,
    /// Sample position; y is the surface height
    pub position: Vec3,
    /// Cost from the start
    pub g: f32,
    /// Estimated cost to the goal
    pub h: f32,
    /// Priority, `g + h`
    pub f: f32,
    /// Predecessor in the node arena
    pub previous: Option<usize>,
    /// Expanded already
    pub closed: bool,
    /// Order stamp of the live open set entry
    pub(crate) open_order: u64,
}

impl PathFindingNode {
    pub(crate) fn new(key: NodeKey, position: Vec3, g: f32, h: f32, previous: Option<usize>) -> Self {
        Self {
            key,
            position,
            g,
            h,
            f: g + h,
            previous,
            closed: false,
            open_order: 0,
        }
    }
}

/// Open set entry; stale entries are skipped when popped
#[derive(Debug, Clone, Copy)]
pub(crate) struct OpenEntry {
    pub f: f32,
    pub order: u64,
    pub index: usize,
}

impl PartialEq for OpenEntry {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for OpenEntry {}

impl PartialOrd for OpenEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OpenEntry {
    // Reversed so the max-heap pops the lowest f, earliest insertion first
    fn cmp(&self, other: &Self) -> Ordering {
        other.f.total_cmp(&self.f).then_with(|| other.order.cmp(&self.order))
    }
}
