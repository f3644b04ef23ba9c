//! Broad-phase partition contract shared by every implementation

use std::fmt::Debug;

use crate::config::{PartitionConfig, PartitionKind};
use crate::foundation::math::Vec3;
use crate::physics::collision::{Aabb, BoundingVolume};
use crate::physics::RigidBodyHandle;

use super::{PartitionNone, PartitionOctTree};

/// Spatial index over rigid body handles
///
/// Partitions never own bodies; they index handles by world box. Every query
/// returns the handles whose box overlaps the query box (touching included),
/// each handle exactly once. All implementations must agree on that set.
///
/// Adding a handle twice without removing it first is a caller error; it is
/// asserted in debug builds.
pub trait Partition: Debug {
    /// Register a body covering `volume`
    fn add_rigid_body(&mut self, handle: RigidBodyHandle, volume: &BoundingVolume);

    /// Refresh membership after a body moved or changed shape
    fn update_rigid_body(&mut self, handle: RigidBodyHandle, volume: &BoundingVolume) {
        if self.contains(handle) {
            self.remove_rigid_body(handle);
        }
        self.add_rigid_body(handle, volume);
    }

    /// Unregister a body; unknown handles are ignored
    fn remove_rigid_body(&mut self, handle: RigidBodyHandle);

    /// Bodies whose box overlaps `aabb`
    fn get_objects_near_to_aabb(&self, aabb: &Aabb) -> Vec<RigidBodyHandle>;

    /// Bodies whose box overlaps the box enclosing `volume`
    fn get_objects_near_to(&self, volume: &BoundingVolume) -> Vec<RigidBodyHandle> {
        self.get_objects_near_to_aabb(&volume.world_aabb())
    }

    /// Bodies whose box contains `point`
    fn get_objects_near_to_point(&self, point: Vec3) -> Vec<RigidBodyHandle> {
        self.get_objects_near_to_aabb(&Aabb::from_point(point))
    }

    /// Bodies whose box overlaps the box enclosing the segment `p`..`q`
    fn get_objects_near_to_segment(&self, p: Vec3, q: Vec3) -> Vec<RigidBodyHandle> {
        self.get_objects_near_to_aabb(&Aabb::new(p, q))
    }

    /// Drop every registration
    fn reset(&mut self);

    /// Number of registered bodies
    fn body_count(&self) -> usize;

    /// Check if a body is registered
    fn contains(&self, handle: RigidBodyHandle) -> bool;
}

/// Build the partition selected in `config`
pub fn create_partition(config: &PartitionConfig) -> Box<dyn Partition> {
    match config.kind {
        PartitionKind::OctTree => Box::new(PartitionOctTree::new(config.cell_size, config.max_depth)),
        PartitionKind::None => Box::new(PartitionNone::new()),
    }
}
