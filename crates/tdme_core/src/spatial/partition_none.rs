//! Flat partition for scenes too small to benefit from a tree

use crate::foundation::logging::{warn, PARTITION_TARGET};
use crate::physics::collision::{Aabb, BoundingVolume};
use crate::physics::RigidBodyHandle;

use super::Partition;

/// Linear scan over every registered body
#[derive(Debug, Clone, Default)]
pub struct PartitionNone {
    bodies: Vec<(RigidBodyHandle, Aabb)>,
}

impl PartitionNone {
    /// Create an empty partition
    pub fn new() -> Self {
        Self::default()
    }
}

impl Partition for PartitionNone {
    fn add_rigid_body(&mut self, handle: RigidBodyHandle, volume: &BoundingVolume) {
        debug_assert!(!self.contains(handle), "rigid body {handle:?} added twice");
        if self.contains(handle) {
            warn!(target: PARTITION_TARGET, "Rigid body {:?} added twice, replacing", handle);
            self.remove_rigid_body(handle);
        }
        self.bodies.push((handle, volume.world_aabb()));
    }

    fn remove_rigid_body(&mut self, handle: RigidBodyHandle) {
        self.bodies.retain(|(registered, _)| *registered != handle);
    }

    fn get_objects_near_to_aabb(&self, aabb: &Aabb) -> Vec<RigidBodyHandle> {
        self.bodies
            .iter()
            .filter(|(_, body_aabb)| body_aabb.intersects(aabb))
            .map(|(handle, _)| *handle)
            .collect()
    }

    fn reset(&mut self) {
        self.bodies.clear();
    }

    fn body_count(&self) -> usize {
        self.bodies.len()
    }

    fn contains(&self, handle: RigidBodyHandle) -> bool {
        self.bodies.iter().any(|(registered, _)| *registered == handle)
    }
}
