//! # TDME Core
//!
//! Spatial partitioning, collision geometry and path finding for a 3D game
//! world.
//!
//! ## Features
//!
//! - **Narrow Phase**: segment, box, oriented box, sphere, capsule and triangle tests
//! - **Broad Phase**: oct-tree partition with a linear-scan fallback
//! - **World Registry**: rigid bodies with collision types, height probes and ray casts
//! - **Path Finding**: incremental A* with step limits and caller hooks
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use tdme_core::prelude::*;
//!
//! fn main() -> Result<(), WorldError> {
//!     let mut world = World::from_config(&PartitionConfig::default());
//!     world.add_rigid_body(RigidBody::new_static(
//!         "ground",
//!         BoundingVolume::aabb(Vec3::new(-50.0, -1.0, -50.0), Vec3::new(50.0, 0.0, 50.0)),
//!     ))?;
//!
//!     let actor = BoundingVolume::aabb(Vec3::new(-0.25, 0.0, -0.25), Vec3::new(0.25, 1.8, 0.25));
//!     let transform = Transform::from_position(Vec3::zeros());
//!     let mut path_finding = PathFinding::new(&world, PathFindingConfig::default());
//!     let mut path = Vec::new();
//!     if path_finding.find_path(&actor, &transform, Vec3::new(10.0, 0.0, 0.0), CollisionTypes::STATIC, None, &mut path) {
//!         println!("{} waypoints", path.len());
//!     }
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod config;
pub mod foundation;
pub mod pathfinding;
pub mod physics;
pub mod spatial;

/// Common imports for library users
pub mod prelude {
    pub use crate::{
        config::{Config, ConfigError, PartitionConfig, PartitionKind, PathFindingConfig, WorldConfig},
        foundation::math::{Quat, Transform, Vec3},
        pathfinding::{PathFinding, PathFindingCustomTest, PathFindingState, PathRequest},
        physics::{
            BoundingVolume, CollisionTypes, RigidBody, RigidBodyHandle, World, WorldError,
        },
        spatial::{Partition, PartitionNone, PartitionOctTree},
    };
}
