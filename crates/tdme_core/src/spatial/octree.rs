//! Oct-tree spatial partition
//!
//! Space is cut into a fixed hierarchy of cubic cells. The unbounded root
//! holds top-level cells of size `cell_size * 2^max_depth`, every level
//! halves the cell size, and leaves at `max_depth + 1` have size
//! `cell_size`. Cells are addressed by integer grid coordinates and created
//! lazily on first insertion; empty cells are never pruned.
//!
//! A body is registered in every leaf its world box overlaps. Bodies that
//! would span more than [`OVERSIZED_LEAF_COUNT`] leaves, and bodies with a
//! non-finite box, are kept in a flat list beside the hierarchy instead.
//! Queries visit only the cells overlapping the query box, de-duplicate with
//! a visited set and keep the bodies whose own box overlaps the query, which
//! makes results identical to [`PartitionNone`](super::PartitionNone).

use std::collections::{BTreeMap, HashMap, HashSet};

use crate::foundation::logging::{trace, warn, PARTITION_TARGET};
use crate::foundation::math::Vec3;
use crate::physics::collision::{Aabb, BoundingVolume};
use crate::physics::RigidBodyHandle;

use super::Partition;

/// Bodies spanning more leaves than this skip the hierarchy
pub const OVERSIZED_LEAF_COUNT: u64 = 4096;

/// Integer grid coordinates of a cell at its level
pub type CellKey = (i32, i32, i32);

/// Inclusive block of cell coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CellRange {
    min: CellKey,
    max: CellKey,
}

impl CellRange {
    /// Cells of `size` covering `aabb`, using the floor rule on both corners
    fn covering(aabb: &Aabb, size: f32) -> Self {
        Self {
            min: cell_of(aabb.min, size),
            max: cell_of(aabb.max, size),
        }
    }

    /// Restrict to the eight children of the cell `parent`
    fn within_children_of(self, parent: CellKey) -> Option<Self> {
        let clamp = |low: i32, high: i32, parent: i32| {
            let first = parent.saturating_mul(2);
            let last = first.saturating_add(1);
            (low.max(first), high.min(last))
        };
        let (min_x, max_x) = clamp(self.min.0, self.max.0, parent.0);
        let (min_y, max_y) = clamp(self.min.1, self.max.1, parent.1);
        let (min_z, max_z) = clamp(self.min.2, self.max.2, parent.2);
        if min_x > max_x || min_y > max_y || min_z > max_z {
            return None;
        }
        Some(Self {
            min: (min_x, min_y, min_z),
            max: (max_x, max_y, max_z),
        })
    }

    /// Number of cells in the block, saturating
    #[allow(clippy::cast_sign_loss)]
    fn cell_count(&self) -> u64 {
        let span = |low: i32, high: i32| (i64::from(high) - i64::from(low) + 1).max(0) as u64;
        span(self.min.0, self.max.0)
            .saturating_mul(span(self.min.1, self.max.1))
            .saturating_mul(span(self.min.2, self.max.2))
    }

    fn contains(&self, key: CellKey) -> bool {
        (self.min.0..=self.max.0).contains(&key.0) &&
        (self.min.1..=self.max.1).contains(&key.1) &&
        (self.min.2..=self.max.2).contains(&key.2)
    }

    fn keys(self) -> impl Iterator<Item = CellKey> {
        (self.min.0..=self.max.0).flat_map(move |x| {
            (self.min.1..=self.max.1)
                .flat_map(move |y| (self.min.2..=self.max.2).map(move |z| (x, y, z)))
        })
    }
}

#[allow(clippy::cast_possible_truncation)]
fn cell_of(point: Vec3, size: f32) -> CellKey {
    (
        (point.x / size).floor() as i32,
        (point.y / size).floor() as i32,
        (point.z / size).floor() as i32,
    )
}

/// Single cell in the oct-tree hierarchy
#[derive(Debug, Clone)]
pub struct PartitionTreeNode {
    /// Grid coordinates at this level
    pub key: CellKey,

    /// Depth in the tree (0 = root)
    pub level: u32,

    /// Edge length of this cell
    pub size: f32,

    /// Bodies registered here (leaves only)
    pub bodies: Vec<RigidBodyHandle>,

    /// Lazily created children, ordered by coordinates
    pub children: BTreeMap<CellKey, PartitionTreeNode>,
}

impl PartitionTreeNode {
    fn root(top_size: f32) -> Self {
        Self::new((0, 0, 0), 0, top_size * 2.0)
    }

    fn new(key: CellKey, level: u32, size: f32) -> Self {
        Self {
            key,
            level,
            size,
            bodies: Vec::new(),
            children: BTreeMap::new(),
        }
    }

    /// World-space box of this cell; the root is unbounded
    #[allow(clippy::cast_precision_loss)]
    pub fn bounds(&self) -> Aabb {
        if self.level == 0 {
            return Aabb {
                min: Vec3::repeat(f32::NEG_INFINITY),
                max: Vec3::repeat(f32::INFINITY),
            };
        }
        let min = Vec3::new(self.key.0 as f32, self.key.1 as f32, self.key.2 as f32) * self.size;
        Aabb {
            min,
            max: min + Vec3::repeat(self.size),
        }
    }

    /// Child cells touched by `aabb`
    fn child_range(&self, aabb: &Aabb) -> Option<CellRange> {
        let range = CellRange::covering(aabb, self.size * 0.5);
        if self.level == 0 {
            Some(range)
        } else {
            range.within_children_of(self.key)
        }
    }

    /// Register `handle` in every leaf overlapping `aabb`, returns the leaf count
    fn insert(&mut self, handle: RigidBodyHandle, aabb: &Aabb, leaf_level: u32, nodes_created: &mut usize) -> usize {
        if self.level == leaf_level {
            self.bodies.push(handle);
            return 1;
        }
        let Some(range) = self.child_range(aabb) else {
            return 0;
        };

        let child_level = self.level + 1;
        let child_size = self.size * 0.5;
        let mut leaves = 0;
        for key in range.keys() {
            let child = self.children.entry(key).or_insert_with(|| {
                *nodes_created += 1;
                PartitionTreeNode::new(key, child_level, child_size)
            });
            leaves += child.insert(handle, aabb, leaf_level, nodes_created);
        }
        leaves
    }

    /// Remove `handle` from every leaf overlapping `aabb`
    fn remove(&mut self, handle: RigidBodyHandle, aabb: &Aabb, leaf_level: u32) {
        if self.level == leaf_level {
            if let Some(index) = self.bodies.iter().position(|&registered| registered == handle) {
                self.bodies.swap_remove(index);
            }
            return;
        }
        let Some(range) = self.child_range(aabb) else {
            return;
        };
        for key in range.keys() {
            if let Some(child) = self.children.get_mut(&key) {
                child.remove(handle, aabb, leaf_level);
            }
        }
    }

    /// Collect bodies of overlapped leaves, each handle once
    fn query(
        &self,
        aabb: &Aabb,
        leaf_level: u32,
        visited: &mut HashSet<RigidBodyHandle>,
        results: &mut Vec<RigidBodyHandle>,
    ) {
        if self.level == leaf_level {
            for &handle in &self.bodies {
                if visited.insert(handle) {
                    results.push(handle);
                }
            }
            return;
        }
        let Some(range) = self.child_range(aabb) else {
            return;
        };
        for (key, child) in &self.children {
            if range.contains(*key) {
                child.query(aabb, leaf_level, visited, results);
            }
        }
    }

    /// Count this node and all descendants
    pub fn count_nodes(&self) -> usize {
        1 + self.children.values().map(PartitionTreeNode::count_nodes).sum::<usize>()
    }

    /// Count leaves below (or at) this node
    pub fn count_leaves(&self, leaf_level: u32) -> usize {
        if self.level == leaf_level {
            1
        } else {
            self.children.values().map(|child| child.count_leaves(leaf_level)).sum()
        }
    }
}

/// Oct-tree partition over rigid body handles
#[derive(Debug, Clone)]
pub struct PartitionOctTree {
    root: PartitionTreeNode,
    cell_size: f32,
    max_depth: u32,
    membership: HashMap<RigidBodyHandle, Aabb>,
    oversized: Vec<RigidBodyHandle>,
}

impl PartitionOctTree {
    /// Create an empty tree with leaves of `cell_size` below `max_depth` levels
    ///
    /// Non-positive cell sizes fall back to `1.0`.
    pub fn new(cell_size: f32, max_depth: u32) -> Self {
        let cell_size = if cell_size > 0.0 { cell_size } else { 1.0 };
        Self {
            root: PartitionTreeNode::root(Self::top_size(cell_size, max_depth)),
            cell_size,
            max_depth,
            membership: HashMap::new(),
            oversized: Vec::new(),
        }
    }

    #[allow(clippy::cast_possible_wrap)]
    fn top_size(cell_size: f32, max_depth: u32) -> f32 {
        cell_size * 2.0_f32.powi(max_depth as i32)
    }

    fn leaf_level(&self) -> u32 {
        self.max_depth + 1
    }

    /// Leaf cell size
    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Number of levels between the top-level cells and the leaves
    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    /// Root of the hierarchy (for inspection and debug drawing)
    pub fn root(&self) -> &PartitionTreeNode {
        &self.root
    }

    /// Nodes currently allocated, root included
    pub fn node_count(&self) -> usize {
        self.root.count_nodes()
    }

    /// Leaf cells currently allocated
    pub fn leaf_count(&self) -> usize {
        self.root.count_leaves(self.leaf_level())
    }

    /// Bodies kept outside the hierarchy
    pub fn oversized_count(&self) -> usize {
        self.oversized.len()
    }

    fn is_oversized(&self, aabb: &Aabb) -> bool {
        CellRange::covering(aabb, self.cell_size).cell_count() > OVERSIZED_LEAF_COUNT
    }
}

fn is_finite(aabb: &Aabb) -> bool {
    aabb.min.iter().chain(aabb.max.iter()).all(|c| c.is_finite())
}

impl Default for PartitionOctTree {
    fn default() -> Self {
        Self::new(16.0, 2)
    }
}

impl Partition for PartitionOctTree {
    fn add_rigid_body(&mut self, handle: RigidBodyHandle, volume: &BoundingVolume) {
        debug_assert!(!self.contains(handle), "rigid body {handle:?} added twice");
        if self.contains(handle) {
            warn!(target: PARTITION_TARGET, "Rigid body {:?} added twice, replacing", handle);
            self.remove_rigid_body(handle);
        }

        let aabb = volume.world_aabb();
        self.membership.insert(handle, aabb);
        if !is_finite(&aabb) {
            warn!(target: PARTITION_TARGET, "Rigid body {:?} has a non-finite box {:?}", handle, aabb);
            self.oversized.push(handle);
            return;
        }
        if self.is_oversized(&aabb) {
            trace!(target: PARTITION_TARGET, "Rigid body {:?} kept outside the tree", handle);
            self.oversized.push(handle);
            return;
        }

        let leaf_level = self.leaf_level();
        let mut nodes_created = 0;
        let leaves = self.root.insert(handle, &aabb, leaf_level, &mut nodes_created);
        trace!(
            target: PARTITION_TARGET,
            "Rigid body {:?} registered in {} leaves ({} new nodes)",
            handle, leaves, nodes_created
        );
    }

    fn remove_rigid_body(&mut self, handle: RigidBodyHandle) {
        let Some(aabb) = self.membership.remove(&handle) else {
            return;
        };
        if let Some(index) = self.oversized.iter().position(|&registered| registered == handle) {
            self.oversized.swap_remove(index);
            return;
        }
        let leaf_level = self.leaf_level();
        self.root.remove(handle, &aabb, leaf_level);
    }

    fn get_objects_near_to_aabb(&self, aabb: &Aabb) -> Vec<RigidBodyHandle> {
        let mut visited = HashSet::new();
        let mut candidates = self.oversized.clone();
        visited.extend(candidates.iter().copied());
        self.root.query(aabb, self.leaf_level(), &mut visited, &mut candidates);
        candidates.retain(|handle| {
            self.membership
                .get(handle)
                .is_some_and(|body_aabb| body_aabb.intersects(aabb))
        });
        candidates
    }

    fn reset(&mut self) {
        self.root = PartitionTreeNode::root(Self::top_size(self.cell_size, self.max_depth));
        self.membership.clear();
        self.oversized.clear();
    }

    fn body_count(&self) -> usize {
        self.membership.len()
    }

    fn contains(&self, handle: RigidBodyHandle) -> bool {
        self.membership.contains_key(&handle)
    }
}
