//! Narrow-phase collision geometry
//!
//! # Module Organization
//!
//! - [`primitives`] - Segment, box and triangle tests shared by everything else
//! - [`bounding_volume`] - Closed set of convex shapes attached to rigid bodies
//!
//! All tests are pure functions on world-space data. Degenerate input
//! (zero length segments, zero area triangles) reports "no hit" instead of
//! failing.

pub mod primitives;
pub mod bounding_volume;

// Re-export commonly used types
pub use primitives::{
    closest_point_on_segment, closest_points_on_segments, segment_intersects_box,
    segment_intersects_oriented_box, segment_intersects_sphere, segment_intersects_triangle,
    segments_intersect, Triangle,
};
pub use bounding_volume::{Aabb, BoundingVolume, Capsule, OrientedBoundingBox, Sphere};
