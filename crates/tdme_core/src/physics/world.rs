//! World registry of rigid bodies
//!
//! The world owns every body and keeps a broad-phase partition in sync with
//! them. Static bodies are re-indexed as soon as they move, dynamic bodies
//! on the next [`World::update`] tick.

use std::collections::HashMap;

use slotmap::SlotMap;

use super::collision::BoundingVolume;
use super::collision_types::CollisionTypes;
use super::rigid_body::{RigidBody, RigidBodyHandle};
use crate::config::PartitionConfig;
use crate::foundation::logging::{debug, info, WORLD_TARGET};
use crate::foundation::math::{Vec3, EPSILON};
use crate::spatial::{create_partition, Partition};

/// World registry errors
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum WorldError {
    /// A body with this id already exists
    #[error("Duplicate rigid body id: {0}")]
    DuplicateRigidBodyId(String),

    /// No body with this id
    #[error("Rigid body not found: {0}")]
    RigidBodyNotFound(String),
}

/// Collection of rigid bodies with a spatial index
#[derive(Debug)]
pub struct World {
    bodies: SlotMap<RigidBodyHandle, RigidBody>,
    ids: HashMap<String, RigidBodyHandle>,
    partition: Box<dyn Partition>,
}

impl World {
    /// Create an empty world over the given partition
    pub fn new(partition: Box<dyn Partition>) -> Self {
        Self {
            bodies: SlotMap::with_key(),
            ids: HashMap::new(),
            partition,
        }
    }

    /// Create an empty world using the configured partition
    pub fn from_config(config: &PartitionConfig) -> Self {
        info!(target: WORLD_TARGET, "Creating world with {:?} partition", config.kind);
        Self::new(create_partition(config))
    }

    /// Register a body; ids are unique within a world
    pub fn add_rigid_body(&mut self, body: RigidBody) -> Result<RigidBodyHandle, WorldError> {
        if self.ids.contains_key(body.id()) {
            return Err(WorldError::DuplicateRigidBodyId(body.id().to_string()));
        }
        let id = body.id().to_string();
        let handle = self.bodies.insert(body);
        if let Some(body) = self.bodies.get(handle) {
            self.partition.add_rigid_body(handle, body.volume());
        }
        debug!(target: WORLD_TARGET, "Added rigid body '{}' ({:?})", id, handle);
        self.ids.insert(id, handle);
        Ok(handle)
    }

    /// Unregister a body and hand it back
    pub fn remove_rigid_body(&mut self, id: &str) -> Result<RigidBody, WorldError> {
        let handle = self
            .ids
            .remove(id)
            .ok_or_else(|| WorldError::RigidBodyNotFound(id.to_string()))?;
        self.partition.remove_rigid_body(handle);
        debug!(target: WORLD_TARGET, "Removed rigid body '{}'", id);
        self.bodies
            .remove(handle)
            .ok_or_else(|| WorldError::RigidBodyNotFound(id.to_string()))
    }

    /// Look up a body by id
    pub fn get_rigid_body(&self, id: &str) -> Option<&RigidBody> {
        self.handle_of(id).and_then(|handle| self.bodies.get(handle))
    }

    /// Look up a body by handle
    pub fn rigid_body(&self, handle: RigidBodyHandle) -> Option<&RigidBody> {
        self.bodies.get(handle)
    }

    /// Handle of the body with this id
    pub fn handle_of(&self, id: &str) -> Option<RigidBodyHandle> {
        self.ids.get(id).copied()
    }

    /// Iterate over every body
    pub fn rigid_bodies(&self) -> impl Iterator<Item = (RigidBodyHandle, &RigidBody)> {
        self.bodies.iter()
    }

    /// Number of bodies
    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    /// Check if the world has no bodies
    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    /// The broad phase index
    pub fn partition(&self) -> &dyn Partition {
        self.partition.as_ref()
    }

    /// Move a body so its volume is centered at `position`
    pub fn set_rigid_body_position(&mut self, id: &str, position: Vec3) -> Result<(), WorldError> {
        let handle = self
            .handle_of(id)
            .ok_or_else(|| WorldError::RigidBodyNotFound(id.to_string()))?;
        let body = self
            .bodies
            .get_mut(handle)
            .ok_or_else(|| WorldError::RigidBodyNotFound(id.to_string()))?;
        body.set_position(position);
        if body.is_static() {
            self.partition.update_rigid_body(handle, body.volume());
        }
        Ok(())
    }

    /// Replace the volume of a body
    pub fn set_rigid_body_volume(&mut self, id: &str, volume: BoundingVolume) -> Result<(), WorldError> {
        let handle = self
            .handle_of(id)
            .ok_or_else(|| WorldError::RigidBodyNotFound(id.to_string()))?;
        let body = self
            .bodies
            .get_mut(handle)
            .ok_or_else(|| WorldError::RigidBodyNotFound(id.to_string()))?;
        body.set_volume(volume);
        if body.is_static() {
            self.partition.update_rigid_body(handle, body.volume());
        }
        Ok(())
    }

    /// Enable or disable a body; disabled bodies are skipped by queries
    pub fn set_rigid_body_enabled(&mut self, id: &str, enabled: bool) -> Result<(), WorldError> {
        let handle = self
            .handle_of(id)
            .ok_or_else(|| WorldError::RigidBodyNotFound(id.to_string()))?;
        if let Some(body) = self.bodies.get_mut(handle) {
            body.set_enabled(enabled);
        }
        Ok(())
    }

    /// World tick: refresh partition membership of dynamic bodies
    pub fn update(&mut self) {
        for (handle, body) in &self.bodies {
            if !body.is_static() {
                self.partition.update_rigid_body(handle, body.volume());
            }
        }
    }

    /// Enabled bodies whose world box overlaps the box around `volume`
    pub fn get_objects_near_to<'a>(
        &'a self,
        volume: &BoundingVolume,
    ) -> impl Iterator<Item = (RigidBodyHandle, &'a RigidBody)> + 'a {
        self.enabled_bodies(self.partition.get_objects_near_to(volume))
    }

    fn enabled_bodies(
        &self,
        handles: Vec<RigidBodyHandle>,
    ) -> impl Iterator<Item = (RigidBodyHandle, &RigidBody)> + '_ {
        handles.into_iter().filter_map(move |handle| {
            self.bodies
                .get(handle)
                .filter(|body| body.is_enabled())
                .map(|body| (handle, body))
        })
    }

    /// Bodies of `collision_types` accepted by `filter` that intersect `volume`
    pub fn does_collide_with(
        &self,
        collision_types: CollisionTypes,
        volume: &BoundingVolume,
        filter: impl Fn(&RigidBody) -> bool,
    ) -> Vec<RigidBodyHandle> {
        self.get_objects_near_to(volume)
            .filter(|(_, body)| body.matches(collision_types) && filter(*body))
            .filter(|(_, body)| body.volume().intersects(volume))
            .map(|(handle, _)| handle)
            .collect()
    }

    /// Surface height below `point` within the step window
    ///
    /// Probes the vertical segment from `point.y + step_up_max` down to
    /// `point.y - step_down_max` and returns the highest surface hit. A probe
    /// starting inside a body has no headroom and yields `None`, as does a
    /// probe that hits nothing. A probe starting exactly on a top face stands
    /// on it.
    pub fn determine_height(
        &self,
        collision_types: CollisionTypes,
        step_up_max: f32,
        step_down_max: f32,
        point: Vec3,
        filter: impl Fn(&RigidBody) -> bool,
    ) -> Option<f32> {
        let top = Vec3::new(point.x, point.y + step_up_max, point.z);
        let bottom = Vec3::new(point.x, point.y - step_down_max, point.z);
        let headroom = top + Vec3::y() * (EPSILON * top.y.abs().max(1.0));

        let mut height: Option<f32> = None;
        for (_, body) in self.enabled_bodies(self.partition.get_objects_near_to_segment(top, bottom)) {
            if !body.matches(collision_types) || !filter(body) {
                continue;
            }
            if body.volume().contains_point(headroom) {
                return None;
            }
            if let Some((entry, _)) = body.volume().intersect_segment(top, bottom) {
                height = Some(height.map_or(entry.y, |current| current.max(entry.y)));
            }
        }
        height
    }

    /// Nearest body hit by the segment `start`..`end` and the hit point
    pub fn ray_cast(
        &self,
        collision_types: CollisionTypes,
        start: Vec3,
        end: Vec3,
        filter: impl Fn(&RigidBody) -> bool,
    ) -> Option<(RigidBodyHandle, Vec3)> {
        let mut nearest: Option<(RigidBodyHandle, Vec3, f32)> = None;
        for (handle, body) in self.enabled_bodies(self.partition.get_objects_near_to_segment(start, end)) {
            if !body.matches(collision_types) || !filter(body) {
                continue;
            }
            if let Some((entry, _)) = body.volume().intersect_segment(start, end) {
                let distance_squared = (entry - start).magnitude_squared();
                if nearest.map_or(true, |(_, _, best)| distance_squared < best) {
                    nearest = Some((handle, entry, distance_squared));
                }
            }
        }
        nearest.map(|(handle, point, _)| (handle, point))
    }

    /// Drop every body and partition registration
    pub fn reset(&mut self) {
        self.bodies.clear();
        self.ids.clear();
        self.partition.reset();
    }
}

impl Default for World {
    fn default() -> Self {
        Self::from_config(&PartitionConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PartitionKind;
    use approx::assert_relative_eq;

    fn ground() -> RigidBody {
        RigidBody::new_static(
            "ground",
            BoundingVolume::aabb_from_center(Vec3::new(0.0, -0.5, 0.0), Vec3::new(50.0, 0.5, 50.0)),
        )
    }

    fn crate_at(id: &str, center: Vec3) -> RigidBody {
        RigidBody::new(id, BoundingVolume::aabb_from_center(center, Vec3::repeat(0.5)), CollisionTypes::DYNAMIC)
    }

    #[test]
    fn test_ids_are_unique() {
        let mut world = World::default();
        world.add_rigid_body(ground()).unwrap();
        assert_eq!(
            world.add_rigid_body(ground()),
            Err(WorldError::DuplicateRigidBodyId("ground".to_string()))
        );
        assert_eq!(world.len(), 1);
    }

    #[test]
    fn test_remove_unknown_body() {
        let mut world = World::default();
        assert_eq!(
            world.remove_rigid_body("ghost").unwrap_err(),
            WorldError::RigidBodyNotFound("ghost".to_string())
        );
        assert!(world.set_rigid_body_position("ghost", Vec3::zeros()).is_err());
    }

    #[test]
    fn test_remove_drops_partition_membership() {
        let mut world = World::default();
        let handle = world.add_rigid_body(crate_at("box", Vec3::new(3.0, 0.5, 3.0))).unwrap();
        assert!(world.partition().contains(handle));

        let removed = world.remove_rigid_body("box").unwrap();
        assert_eq!(removed.id(), "box");
        assert!(!world.partition().contains(handle));
        assert!(world.get_rigid_body("box").is_none());
    }

    #[test]
    fn test_dynamic_bodies_refresh_on_tick() {
        let mut world = World::default();
        let handle = world.add_rigid_body(crate_at("box", Vec3::new(3.0, 0.5, 3.0))).unwrap();
        world.set_rigid_body_position("box", Vec3::new(40.0, 0.5, 40.0)).unwrap();

        let probe = BoundingVolume::sphere(Vec3::new(40.0, 0.5, 40.0), 0.1);
        assert_eq!(world.get_objects_near_to(&probe).count(), 0);
        world.update();
        let found: Vec<_> = world.get_objects_near_to(&probe).map(|(h, _)| h).collect();
        assert_eq!(found, vec![handle]);
    }

    #[test]
    fn test_static_bodies_refresh_immediately() {
        let mut world = World::default();
        let handle = world.add_rigid_body(ground()).unwrap();
        world.set_rigid_body_position("ground", Vec3::new(200.0, -0.5, 0.0)).unwrap();

        let probe = BoundingVolume::sphere(Vec3::new(200.0, 0.0, 0.0), 0.1);
        let found: Vec<_> = world.get_objects_near_to(&probe).map(|(h, _)| h).collect();
        assert_eq!(found, vec![handle]);
    }

    #[test]
    fn test_determine_height() {
        let mut world = World::default();
        world.add_rigid_body(ground()).unwrap();
        world
            .add_rigid_body(RigidBody::new_static(
                "step",
                BoundingVolume::aabb(Vec3::new(2.0, 0.0, -1.0), Vec3::new(3.0, 0.3, 1.0)),
            ))
            .unwrap();

        let blocking = CollisionTypes::STATIC;
        let height = world.determine_height(blocking, 0.5, 1.0, Vec3::new(0.0, 0.0, 0.0), |_| true);
        assert_relative_eq!(height.unwrap(), 0.0, epsilon = 1e-5);
        let height = world.determine_height(blocking, 0.5, 1.0, Vec3::new(2.5, 0.0, 0.0), |_| true);
        assert_relative_eq!(height.unwrap(), 0.3, epsilon = 1e-5);
        // Window top lies on the step face
        let height = world.determine_height(blocking, 0.3, 1.0, Vec3::new(2.5, 0.0, 0.0), |_| true);
        assert_relative_eq!(height.unwrap(), 0.3, epsilon = 1e-5);
        // Probe starts inside the step
        assert!(world.determine_height(blocking, 0.1, 1.0, Vec3::new(2.5, 0.0, 0.0), |_| true).is_none());
        // Off the ground
        assert!(world.determine_height(blocking, 0.5, 1.0, Vec3::new(80.0, 0.0, 0.0), |_| true).is_none());
        // Filtered out bodies are ignored
        let height = world.determine_height(blocking, 0.5, 1.0, Vec3::new(2.5, 0.0, 0.0), |body| body.id() != "step");
        assert_relative_eq!(height.unwrap(), 0.0, epsilon = 1e-5);
    }

    #[test]
    fn test_ray_cast_returns_nearest_hit() {
        let mut world = World::default();
        let near = world.add_rigid_body(crate_at("near", Vec3::new(3.0, 0.0, 0.0))).unwrap();
        world.add_rigid_body(crate_at("far", Vec3::new(6.0, 0.0, 0.0))).unwrap();

        let (handle, point) = world
            .ray_cast(CollisionTypes::ALL, Vec3::zeros(), Vec3::new(10.0, 0.0, 0.0), |_| true)
            .unwrap();
        assert_eq!(handle, near);
        assert_relative_eq!(point, Vec3::new(2.5, 0.0, 0.0), epsilon = 1e-5);

        assert!(world
            .ray_cast(CollisionTypes::STATIC, Vec3::zeros(), Vec3::new(10.0, 0.0, 0.0), |_| true)
            .is_none());
        world.set_rigid_body_enabled("near", false).unwrap();
        let (_, point) = world
            .ray_cast(CollisionTypes::ALL, Vec3::zeros(), Vec3::new(10.0, 0.0, 0.0), |_| true)
            .unwrap();
        assert_relative_eq!(point, Vec3::new(5.5, 0.0, 0.0), epsilon = 1e-5);
    }

    #[test]
    fn test_does_collide_with_uses_exact_shapes() {
        let mut world = World::from_config(&PartitionConfig {
            kind: PartitionKind::None,
            ..PartitionConfig::default()
        });
        let handle = world.add_rigid_body(crate_at("box", Vec3::zeros())).unwrap();

        // Box of the sphere overlaps the crate corner, the sphere does not
        let near_corner = BoundingVolume::sphere(Vec3::new(1.1, 1.1, 1.1), 0.9);
        assert_eq!(world.get_objects_near_to(&near_corner).count(), 1);
        assert!(world.does_collide_with(CollisionTypes::ALL, &near_corner, |_| true).is_empty());

        let touching = BoundingVolume::sphere(Vec3::new(1.0, 0.0, 0.0), 0.6);
        assert_eq!(world.does_collide_with(CollisionTypes::ALL, &touching, |_| true), vec![handle]);
        assert!(world.does_collide_with(CollisionTypes::ALL, &touching, |_| false).is_empty());
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut world = World::default();
        world.add_rigid_body(ground()).unwrap();
        world.reset();
        assert!(world.is_empty());
        assert_eq!(world.partition().body_count(), 0);
        world.add_rigid_body(ground()).unwrap();
    }
}
