//! Math utilities and types
//!
//! Provides the fundamental math types used by collision, partitioning and
//! path finding. All geometry is single precision.

pub use nalgebra::{Matrix3, UnitQuaternion, Vector3};

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 3x3 matrix type (box axes, rotations)
pub type Mat3 = Matrix3<f32>;

/// Quaternion type for rotations
pub type Quat = UnitQuaternion<f32>;

/// Shared epsilon for every geometric test
///
/// Denominators and lengths are compared against it directly, "touching"
/// distances compare the squared distance against it.
pub const EPSILON: f32 = 1e-6;

/// Rigid placement of an actor or body: position and rotation
///
/// The local frame is right handed with +Y up and +Z forward.
#[derive(Debug, Clone, PartialEq)]
pub struct Transform {
    /// Position in world space
    pub position: Vec3,

    /// Rotation quaternion
    pub rotation: Quat,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::zeros(),
            rotation: Quat::identity(),
        }
    }
}

impl Transform {
    /// Create a new identity transform
    pub fn identity() -> Self {
        Self::default()
    }

    /// Create a transform with only position
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Create a transform with position and rotation
    pub fn from_position_rotation(position: Vec3, rotation: Quat) -> Self {
        Self { position, rotation }
    }

    /// Create a transform rotated around world +Y by `yaw` radians
    pub fn from_position_yaw(position: Vec3, yaw: f32) -> Self {
        Self {
            position,
            rotation: Quat::from_axis_angle(&Vec3::y_axis(), yaw),
        }
    }

    /// Local +Z in world space
    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::z()
    }

    /// Local +X in world space
    pub fn side(&self) -> Vec3 {
        self.rotation * Vec3::x()
    }

    /// Local +Y in world space
    pub fn up(&self) -> Vec3 {
        self.rotation * Vec3::y()
    }

    /// Map a local point to world space
    pub fn transform_point(&self, point: Vec3) -> Vec3 {
        self.position + self.rotation * point
    }

    /// Map a world point into the local frame
    pub fn inverse_transform_point(&self, point: Vec3) -> Vec3 {
        self.rotation.inverse() * (point - self.position)
    }
}

/// Math utility functions
pub mod utils {
    use super::{Vec3, EPSILON};

    /// Clamp a value between min and max
    pub fn clamp(value: f32, min: f32, max: f32) -> f32 {
        if value < min { min } else if value > max { max } else { value }
    }

    /// Linear interpolation
    pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
        a + (b - a) * t
    }

    /// Normalize `v`, or `None` if it is (numerically) zero length
    pub fn try_normalize(v: Vec3) -> Option<Vec3> {
        let length = v.magnitude();
        if length <= EPSILON {
            None
        } else {
            Some(v / length)
        }
    }

    /// Component-wise minimum
    pub fn min_components(a: Vec3, b: Vec3) -> Vec3 {
        Vec3::new(a.x.min(b.x), a.y.min(b.y), a.z.min(b.z))
    }

    /// Component-wise maximum
    pub fn max_components(a: Vec3, b: Vec3) -> Vec3 {
        Vec3::new(a.x.max(b.x), a.y.max(b.y), a.z.max(b.z))
    }
}
