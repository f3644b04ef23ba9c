//! Rigid bodies registered in a [`World`](super::World)

use slotmap::new_key_type;

use super::collision::{Aabb, BoundingVolume};
use super::collision_types::CollisionTypes;
use crate::foundation::math::Vec3;

new_key_type! {
    /// Stable handle of a rigid body inside its world
    pub struct RigidBodyHandle;
}

/// A collidable body with an id, a shape and a collision type
///
/// The body position is the center of its bounding volume.
#[derive(Debug, Clone, PartialEq)]
pub struct RigidBody {
    id: String,
    volume: BoundingVolume,
    collision_type: CollisionTypes,
    is_static: bool,
    enabled: bool,
}

impl RigidBody {
    /// Create an enabled dynamic body
    pub fn new(id: impl Into<String>, volume: BoundingVolume, collision_type: CollisionTypes) -> Self {
        Self {
            id: id.into(),
            volume,
            collision_type,
            is_static: false,
            enabled: true,
        }
    }

    /// Create an enabled static body of type [`CollisionTypes::STATIC`]
    pub fn new_static(id: impl Into<String>, volume: BoundingVolume) -> Self {
        Self {
            is_static: true,
            ..Self::new(id, volume, CollisionTypes::STATIC)
        }
    }

    /// Builder-style override of the collision type
    #[must_use]
    pub fn with_collision_type(mut self, collision_type: CollisionTypes) -> Self {
        self.collision_type = collision_type;
        self
    }

    /// Unique id within the world
    pub fn id(&self) -> &str {
        &self.id
    }

    /// World-space bounding volume
    pub fn volume(&self) -> &BoundingVolume {
        &self.volume
    }

    /// Collision type bits of this body
    pub fn collision_type(&self) -> CollisionTypes {
        self.collision_type
    }

    /// Static bodies never move during simulation
    pub fn is_static(&self) -> bool {
        self.is_static
    }

    /// Disabled bodies are skipped by every world query
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Center of the bounding volume
    pub fn position(&self) -> Vec3 {
        self.volume.center()
    }

    /// Enclosing world aligned box
    pub fn world_aabb(&self) -> Aabb {
        self.volume.world_aabb()
    }

    /// Check the body against a query mask
    pub fn matches(&self, mask: CollisionTypes) -> bool {
        mask.selects(self.collision_type)
    }

    pub(crate) fn set_position(&mut self, position: Vec3) {
        self.volume = self.volume.with_center(position);
    }

    pub(crate) fn set_volume(&mut self, volume: BoundingVolume) {
        self.volume = volume;
    }

    pub(crate) fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_static_constructor() {
        let body = RigidBody::new_static("ground", BoundingVolume::aabb_from_center(Vec3::zeros(), Vec3::repeat(1.0)));
        assert!(body.is_static());
        assert!(body.is_enabled());
        assert!(body.matches(CollisionTypes::STATIC));
        assert!(!body.matches(CollisionTypes::DYNAMIC));
    }

    #[test]
    fn test_move_keeps_shape() {
        let mut body = RigidBody::new(
            "crate",
            BoundingVolume::aabb_from_center(Vec3::new(1.0, 1.0, 1.0), Vec3::new(1.0, 0.5, 2.0)),
            CollisionTypes::DYNAMIC,
        );
        body.set_position(Vec3::new(5.0, 0.0, 0.0));
        assert_relative_eq!(body.position(), Vec3::new(5.0, 0.0, 0.0));
        assert_relative_eq!(body.world_aabb().half_extents(), Vec3::new(1.0, 0.5, 2.0));
    }
}
