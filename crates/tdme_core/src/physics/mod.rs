//! Physics module: collision geometry, rigid bodies and the world registry
//!
//! The world owns bodies and keeps a broad-phase partition in sync; the
//! narrow phase in [`collision`] provides the exact shape tests.

pub mod collision;
pub mod collision_types;
pub mod rigid_body;
pub mod world;

pub use collision::{Aabb, BoundingVolume, Capsule, OrientedBoundingBox, Sphere, Triangle};
pub use collision_types::CollisionTypes;
pub use rigid_body::{RigidBody, RigidBodyHandle};
pub use world::{World, WorldError};
