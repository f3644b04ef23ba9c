//! Bounding volumes used by the partition, the world queries and path finding
//!
//! [`BoundingVolume`] is a closed set of convex shapes in world space. Pair
//! tests are dispatched exhaustively in [`BoundingVolume::intersects`], so
//! adding a variant forces every intersection site to be revisited.
//!
//! Touching counts as intersecting for every pair.

use super::primitives::{
    clamp_interval, closest_point_on_segment, closest_points_on_segments, segment_intersects_box,
    segment_intersects_oriented_box, segment_intersects_sphere, segment_sphere_interval,
};
use crate::foundation::math::{
    utils::{max_components, min_components},
    Quat, Vec3, EPSILON,
};

/// Number of refinement steps for the capsule to box distance search
const CAPSULE_BOX_ITERATIONS: usize = 40;

/// Axis-Aligned Bounding Box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    /// Minimum corner of the bounding box
    pub min: Vec3,
    /// Maximum corner of the bounding box
    pub max: Vec3,
}

impl Aabb {
    /// Create a new AABB from two opposite corners, in any order
    pub fn new(a: Vec3, b: Vec3) -> Self {
        Self {
            min: min_components(a, b),
            max: max_components(a, b),
        }
    }

    /// Create an AABB centered at a point with given half extents
    pub fn from_center_half_extents(center: Vec3, half_extents: Vec3) -> Self {
        Self {
            min: center - half_extents,
            max: center + half_extents,
        }
    }

    /// Degenerate box around a single point
    pub fn from_point(point: Vec3) -> Self {
        Self { min: point, max: point }
    }

    /// Get the center of the AABB
    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Get the half extents of the AABB
    pub fn half_extents(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }

    /// Check if this AABB contains a point (boundary included)
    pub fn contains_point(&self, point: Vec3) -> bool {
        point.x >= self.min.x && point.x <= self.max.x &&
        point.y >= self.min.y && point.y <= self.max.y &&
        point.z >= self.min.z && point.z <= self.max.z
    }

    /// Check if this AABB intersects another AABB
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.x <= other.max.x && self.max.x >= other.min.x &&
        self.min.y <= other.max.y && self.max.y >= other.min.y &&
        self.min.z <= other.max.z && self.max.z >= other.min.z
    }

    /// Check if `other` lies completely inside this box
    pub fn contains(&self, other: &Aabb) -> bool {
        self.contains_point(other.min) && self.contains_point(other.max)
    }

    /// Point of the box nearest to `point`
    pub fn closest_point(&self, point: Vec3) -> Vec3 {
        Vec3::new(
            point.x.clamp(self.min.x, self.max.x),
            point.y.clamp(self.min.y, self.max.y),
            point.z.clamp(self.min.z, self.max.z),
        )
    }

    /// Smallest box containing both boxes
    pub fn merged(&self, other: &Aabb) -> Aabb {
        Aabb {
            min: min_components(self.min, other.min),
            max: max_components(self.max, other.max),
        }
    }

    /// Box moved by `offset`
    pub fn translated(&self, offset: Vec3) -> Aabb {
        Aabb {
            min: self.min + offset,
            max: self.max + offset,
        }
    }
}

/// Box with arbitrary orthonormal axes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrientedBoundingBox {
    /// World-space center
    pub center: Vec3,
    /// Orthonormal local axes in world space
    pub axes: [Vec3; 3],
    /// Half size along each local axis
    pub half_extents: Vec3,
}

impl OrientedBoundingBox {
    /// Create from explicit axes; the axes must be orthonormal
    pub fn new(center: Vec3, axes: [Vec3; 3], half_extents: Vec3) -> Self {
        Self { center, axes, half_extents }
    }

    /// Create from a rotation applied to the world axes
    pub fn from_rotation(center: Vec3, rotation: Quat, half_extents: Vec3) -> Self {
        Self {
            center,
            axes: [rotation * Vec3::x(), rotation * Vec3::y(), rotation * Vec3::z()],
            half_extents,
        }
    }

    /// Same box expressed with world axes
    pub fn from_aabb(aabb: &Aabb) -> Self {
        Self {
            center: aabb.center(),
            axes: [Vec3::x(), Vec3::y(), Vec3::z()],
            half_extents: aabb.half_extents(),
        }
    }

    /// World point in box coordinates
    pub fn to_local(&self, point: Vec3) -> Vec3 {
        let offset = point - self.center;
        Vec3::new(offset.dot(&self.axes[0]), offset.dot(&self.axes[1]), offset.dot(&self.axes[2]))
    }

    /// Box coordinates in world space
    pub fn from_local(&self, local: Vec3) -> Vec3 {
        self.center + self.axes[0] * local.x + self.axes[1] * local.y + self.axes[2] * local.z
    }

    /// The box in its own frame
    pub fn local_aabb(&self) -> Aabb {
        Aabb::from_center_half_extents(Vec3::zeros(), self.half_extents)
    }

    /// Check if the box contains a point (boundary included)
    pub fn contains_point(&self, point: Vec3) -> bool {
        let local = self.to_local(point);
        (0..3).all(|axis| local[axis].abs() <= self.half_extents[axis])
    }

    /// Point of the box nearest to `point`
    pub fn closest_point(&self, point: Vec3) -> Vec3 {
        let local = self.local_aabb().closest_point(self.to_local(point));
        self.from_local(local)
    }

    /// World-axis box enclosing this box
    pub fn world_aabb(&self) -> Aabb {
        let mut extent = Vec3::zeros();
        for (axis, half) in self.axes.iter().zip(self.half_extents.iter()) {
            extent += axis.abs() * *half;
        }
        Aabb::from_center_half_extents(self.center, extent)
    }

    /// Separating axis test against another oriented box (15 axes)
    pub fn intersects(&self, other: &OrientedBoundingBox) -> bool {
        let a = &self.half_extents;
        let b = &other.half_extents;

        // Rotation expressing other in this frame, padded against
        // near-parallel edge pairs producing a null cross product
        let mut rotation = [[0.0_f32; 3]; 3];
        let mut abs_rotation = [[0.0_f32; 3]; 3];
        for i in 0..3 {
            for j in 0..3 {
                rotation[i][j] = self.axes[i].dot(&other.axes[j]);
                abs_rotation[i][j] = rotation[i][j].abs() + EPSILON;
            }
        }

        let offset = other.center - self.center;
        let t = [
            offset.dot(&self.axes[0]),
            offset.dot(&self.axes[1]),
            offset.dot(&self.axes[2]),
        ];

        // Axes of this box
        for i in 0..3 {
            let ra = a[i];
            let rb = b[0] * abs_rotation[i][0] + b[1] * abs_rotation[i][1] + b[2] * abs_rotation[i][2];
            if t[i].abs() > ra + rb {
                return false;
            }
        }

        // Axes of the other box
        for j in 0..3 {
            let ra = a[0] * abs_rotation[0][j] + a[1] * abs_rotation[1][j] + a[2] * abs_rotation[2][j];
            let rb = b[j];
            let distance = t[0] * rotation[0][j] + t[1] * rotation[1][j] + t[2] * rotation[2][j];
            if distance.abs() > ra + rb {
                return false;
            }
        }

        // Edge cross products
        for i in 0..3 {
            let i1 = (i + 1) % 3;
            let i2 = (i + 2) % 3;
            for j in 0..3 {
                let j1 = (j + 1) % 3;
                let j2 = (j + 2) % 3;
                let ra = a[i1] * abs_rotation[i2][j] + a[i2] * abs_rotation[i1][j];
                let rb = b[j1] * abs_rotation[i][j2] + b[j2] * abs_rotation[i][j1];
                let distance = t[i2] * rotation[i1][j] - t[i1] * rotation[i2][j];
                if distance.abs() > ra + rb {
                    return false;
                }
            }
        }

        true
    }
}

/// A bounding sphere
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sphere {
    /// The center position of the sphere in world space
    pub center: Vec3,
    /// The radius of the sphere
    pub radius: f32,
}

impl Sphere {
    /// Creates a new bounding sphere with the given center and radius
    pub fn new(center: Vec3, radius: f32) -> Self {
        Self { center, radius }
    }

    /// Check if this sphere intersects with another
    pub fn intersects(&self, other: &Sphere) -> bool {
        let distance_squared = (self.center - other.center).magnitude_squared();
        let radius_sum = self.radius + other.radius;
        distance_squared <= radius_sum * radius_sum
    }

    /// Point of the sphere nearest to `point`
    pub fn closest_point(&self, point: Vec3) -> Vec3 {
        let offset = point - self.center;
        let distance = offset.magnitude();
        if distance <= self.radius || distance <= EPSILON {
            point
        } else {
            self.center + offset * (self.radius / distance)
        }
    }
}

/// Swept sphere around the segment `a`..`b`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Capsule {
    /// First axis end point
    pub a: Vec3,
    /// Second axis end point
    pub b: Vec3,
    /// Radius around the axis
    pub radius: f32,
}

impl Capsule {
    /// Create a capsule from its axis and radius
    pub fn new(a: Vec3, b: Vec3, radius: f32) -> Self {
        Self { a, b, radius }
    }

    /// Upright capsule standing on `base` with total `height`
    ///
    /// Heights below the diameter collapse into a sphere resting on `base`.
    pub fn upright(base: Vec3, height: f32, radius: f32) -> Self {
        let axis_length = (height - 2.0 * radius).max(0.0);
        let a = base + Vec3::new(0.0, radius, 0.0);
        Self {
            a,
            b: a + Vec3::new(0.0, axis_length, 0.0),
            radius,
        }
    }

    /// Midpoint of the axis
    pub fn center(&self) -> Vec3 {
        (self.a + self.b) * 0.5
    }

    /// Point of the capsule nearest to `point`
    pub fn closest_point(&self, point: Vec3) -> Vec3 {
        let on_axis = closest_point_on_segment(self.a, self.b, point);
        Sphere::new(on_axis, self.radius).closest_point(point)
    }

    /// Check if the capsule contains a point
    pub fn contains_point(&self, point: Vec3) -> bool {
        let on_axis = closest_point_on_segment(self.a, self.b, point);
        (point - on_axis).magnitude_squared() <= self.radius * self.radius
    }

    /// Check if two capsules intersect
    pub fn intersects(&self, other: &Capsule) -> bool {
        let (c1, c2) = closest_points_on_segments(self.a, self.b, other.a, other.b);
        let radius_sum = self.radius + other.radius;
        (c1 - c2).magnitude_squared() <= radius_sum * radius_sum
    }

    /// Check if the capsule intersects an oriented box
    ///
    /// The distance from the box to a point moving along the axis is convex,
    /// so its minimum is located by ternary search once the axis itself is
    /// known to miss the box.
    pub fn intersects_oriented_box(&self, obb: &OrientedBoundingBox) -> bool {
        let local_box = obb.local_aabb();
        let a = obb.to_local(self.a);
        let b = obb.to_local(self.b);
        if segment_intersects_box(&local_box, a, b).is_some() {
            return true;
        }

        let distance_squared = |t: f32| {
            let point = a + (b - a) * t;
            (local_box.closest_point(point) - point).magnitude_squared()
        };

        let mut low = 0.0_f32;
        let mut high = 1.0_f32;
        for _ in 0..CAPSULE_BOX_ITERATIONS {
            let third = (high - low) / 3.0;
            let m1 = low + third;
            let m2 = high - third;
            if distance_squared(m1) < distance_squared(m2) {
                high = m2;
            } else {
                low = m1;
            }
        }

        let nearest = distance_squared((low + high) * 0.5)
            .min(distance_squared(0.0))
            .min(distance_squared(1.0));
        nearest <= self.radius * self.radius
    }

    /// Segment entry and exit points
    ///
    /// The capsule is convex, so the hit interval is the union of the
    /// intervals against both end spheres and the finite axis cylinder.
    pub fn intersect_segment(&self, p: Vec3, q: Vec3) -> Option<(Vec3, Vec3)> {
        let d = q - p;
        let mut hit: Option<(f32, f32)> = None;
        let mut merge = |interval: Option<(f32, f32)>| {
            if let Some((t0, t1)) = interval.and_then(clamp_interval) {
                hit = Some(match hit {
                    Some((h0, h1)) => (h0.min(t0), h1.max(t1)),
                    None => (t0, t1),
                });
            }
        };

        merge(segment_sphere_interval(self.a, self.radius, p, d));
        merge(segment_sphere_interval(self.b, self.radius, p, d));
        merge(self.cylinder_interval(p, d));

        hit.map(|(t0, t1)| (p + d * t0, p + d * t1))
    }

    /// Parameter interval of `p + t * d` inside the finite axis cylinder
    fn cylinder_interval(&self, p: Vec3, d: Vec3) -> Option<(f32, f32)> {
        let axis = self.b - self.a;
        let length = axis.magnitude();
        if length <= EPSILON {
            return None;
        }
        let n = axis / length;
        let m = p - self.a;
        let m_axial = m.dot(&n);
        let d_axial = d.dot(&n);
        let m_perp = m - n * m_axial;
        let d_perp = d - n * d_axial;

        // Radial range
        let a = d_perp.dot(&d_perp);
        let c = m_perp.dot(&m_perp) - self.radius * self.radius;
        let (mut t0, mut t1) = if a <= EPSILON {
            if c > 0.0 {
                return None;
            }
            (f32::NEG_INFINITY, f32::INFINITY)
        } else {
            let b = m_perp.dot(&d_perp);
            let discriminant = b * b - a * c;
            if discriminant < 0.0 {
                return None;
            }
            let sqrt_discriminant = discriminant.sqrt();
            ((-b - sqrt_discriminant) / a, (-b + sqrt_discriminant) / a)
        };

        // Axial slab between the end caps
        if d_axial.abs() <= EPSILON {
            if m_axial < 0.0 || m_axial > length {
                return None;
            }
        } else {
            let mut s0 = -m_axial / d_axial;
            let mut s1 = (length - m_axial) / d_axial;
            if s0 > s1 {
                std::mem::swap(&mut s0, &mut s1);
            }
            t0 = t0.max(s0);
            t1 = t1.min(s1);
        }

        if t0 <= t1 {
            Some((t0, t1))
        } else {
            None
        }
    }
}

/// Convex shapes attached to rigid bodies and actors
#[derive(Debug, Clone, PartialEq)]
pub enum BoundingVolume {
    /// World aligned box
    AxisAlignedBox(Aabb),
    /// Rotated box
    OrientedBox(OrientedBoundingBox),
    /// Sphere
    Sphere(Sphere),
    /// Capsule
    Capsule(Capsule),
}

impl BoundingVolume {
    /// Axis aligned box from min and max corners
    pub fn aabb(min: Vec3, max: Vec3) -> Self {
        Self::AxisAlignedBox(Aabb::new(min, max))
    }

    /// Axis aligned box from center and half extents
    pub fn aabb_from_center(center: Vec3, half_extents: Vec3) -> Self {
        Self::AxisAlignedBox(Aabb::from_center_half_extents(center, half_extents))
    }

    /// Oriented box
    pub fn oriented_box(center: Vec3, rotation: Quat, half_extents: Vec3) -> Self {
        Self::OrientedBox(OrientedBoundingBox::from_rotation(center, rotation, half_extents))
    }

    /// Sphere
    pub fn sphere(center: Vec3, radius: f32) -> Self {
        Self::Sphere(Sphere::new(center, radius))
    }

    /// Capsule
    pub fn capsule(a: Vec3, b: Vec3, radius: f32) -> Self {
        Self::Capsule(Capsule::new(a, b, radius))
    }

    /// Center of the shape
    pub fn center(&self) -> Vec3 {
        match self {
            Self::AxisAlignedBox(aabb) => aabb.center(),
            Self::OrientedBox(obb) => obb.center,
            Self::Sphere(sphere) => sphere.center,
            Self::Capsule(capsule) => capsule.center(),
        }
    }

    /// Half extents of the enclosing world aligned box
    pub fn half_extents(&self) -> Vec3 {
        self.world_aabb().half_extents()
    }

    /// Radius of a sphere around [`Self::center`] enclosing the shape
    pub fn bounding_radius(&self) -> f32 {
        match self {
            Self::AxisAlignedBox(aabb) => aabb.half_extents().magnitude(),
            Self::OrientedBox(obb) => obb.half_extents.magnitude(),
            Self::Sphere(sphere) => sphere.radius,
            Self::Capsule(capsule) => (capsule.b - capsule.a).magnitude() * 0.5 + capsule.radius,
        }
    }

    /// Enclosing world aligned box, used for partitioning
    pub fn world_aabb(&self) -> Aabb {
        match self {
            Self::AxisAlignedBox(aabb) => *aabb,
            Self::OrientedBox(obb) => obb.world_aabb(),
            Self::Sphere(sphere) => {
                Aabb::from_center_half_extents(sphere.center, Vec3::repeat(sphere.radius))
            }
            Self::Capsule(capsule) => {
                let radius = Vec3::repeat(capsule.radius);
                Aabb {
                    min: min_components(capsule.a, capsule.b) - radius,
                    max: max_components(capsule.a, capsule.b) + radius,
                }
            }
        }
    }

    /// Check if the shape contains a point (boundary included)
    pub fn contains_point(&self, point: Vec3) -> bool {
        match self {
            Self::AxisAlignedBox(aabb) => aabb.contains_point(point),
            Self::OrientedBox(obb) => obb.contains_point(point),
            Self::Sphere(sphere) => {
                (point - sphere.center).magnitude_squared() <= sphere.radius * sphere.radius
            }
            Self::Capsule(capsule) => capsule.contains_point(point),
        }
    }

    /// Point of the shape nearest to `point`; `point` itself when inside
    pub fn compute_closest_point(&self, point: Vec3) -> Vec3 {
        match self {
            Self::AxisAlignedBox(aabb) => aabb.closest_point(point),
            Self::OrientedBox(obb) => obb.closest_point(point),
            Self::Sphere(sphere) => sphere.closest_point(point),
            Self::Capsule(capsule) => capsule.closest_point(point),
        }
    }

    /// Pairwise intersection test
    pub fn intersects(&self, other: &BoundingVolume) -> bool {
        use BoundingVolume::{AxisAlignedBox, Capsule, OrientedBox, Sphere};

        match (self, other) {
            (AxisAlignedBox(a), AxisAlignedBox(b)) => a.intersects(b),
            (Sphere(a), Sphere(b)) => a.intersects(b),
            (Sphere(sphere), volume) | (volume, Sphere(sphere)) => {
                let closest = volume.compute_closest_point(sphere.center);
                (closest - sphere.center).magnitude_squared() <= sphere.radius * sphere.radius
            }
            (Capsule(a), Capsule(b)) => a.intersects(b),
            (Capsule(capsule), AxisAlignedBox(aabb)) | (AxisAlignedBox(aabb), Capsule(capsule)) => {
                capsule.intersects_oriented_box(&OrientedBoundingBox::from_aabb(aabb))
            }
            (Capsule(capsule), OrientedBox(obb)) | (OrientedBox(obb), Capsule(capsule)) => {
                capsule.intersects_oriented_box(obb)
            }
            (AxisAlignedBox(aabb), OrientedBox(obb)) | (OrientedBox(obb), AxisAlignedBox(aabb)) => {
                OrientedBoundingBox::from_aabb(aabb).intersects(obb)
            }
            (OrientedBox(a), OrientedBox(b)) => a.intersects(b),
        }
    }

    /// Entry and exit points of the segment `p`..`q`, entry nearer to `p`
    pub fn intersect_segment(&self, p: Vec3, q: Vec3) -> Option<(Vec3, Vec3)> {
        match self {
            Self::AxisAlignedBox(aabb) => segment_intersects_box(aabb, p, q),
            Self::OrientedBox(obb) => segment_intersects_oriented_box(obb, p, q),
            Self::Sphere(sphere) => segment_intersects_sphere(sphere.center, sphere.radius, p, q),
            Self::Capsule(capsule) => capsule.intersect_segment(p, q),
        }
    }

    /// Copy of the shape moved by `offset`
    pub fn translated(&self, offset: Vec3) -> BoundingVolume {
        match self {
            Self::AxisAlignedBox(aabb) => Self::AxisAlignedBox(aabb.translated(offset)),
            Self::OrientedBox(obb) => Self::OrientedBox(OrientedBoundingBox {
                center: obb.center + offset,
                ..*obb
            }),
            Self::Sphere(sphere) => Self::Sphere(Sphere::new(sphere.center + offset, sphere.radius)),
            Self::Capsule(capsule) => {
                Self::Capsule(Capsule::new(capsule.a + offset, capsule.b + offset, capsule.radius))
            }
        }
    }

    /// Copy of the shape with its center moved to `center`
    pub fn with_center(&self, center: Vec3) -> BoundingVolume {
        self.translated(center - self.center())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f32::consts::FRAC_PI_4;

    fn unit_cube_at(center: Vec3) -> BoundingVolume {
        BoundingVolume::aabb_from_center(center, Vec3::repeat(1.0))
    }

    fn rotated_cube_at(center: Vec3) -> BoundingVolume {
        BoundingVolume::oriented_box(center, Quat::from_axis_angle(&Vec3::y_axis(), FRAC_PI_4), Vec3::repeat(1.0))
    }

    #[test]
    fn test_aabb_pairs() {
        let a = unit_cube_at(Vec3::zeros());
        assert!(a.intersects(&unit_cube_at(Vec3::new(1.5, 0.0, 0.0))));
        // Touching faces
        assert!(a.intersects(&unit_cube_at(Vec3::new(2.0, 0.0, 0.0))));
        assert!(!a.intersects(&unit_cube_at(Vec3::new(2.1, 0.0, 0.0))));
    }

    #[test]
    fn test_oriented_box_pairs() {
        let rotated = rotated_cube_at(Vec3::zeros());
        // The rotated corner reaches sqrt(2) along X
        assert!(rotated.intersects(&unit_cube_at(Vec3::new(2.3, 0.0, 0.0))));
        assert!(!rotated.intersects(&unit_cube_at(Vec3::new(2.5, 0.0, 0.0))));
        // Along the diagonal the rotated face is only 1.0 away
        assert!(!rotated.intersects(&unit_cube_at(Vec3::new(2.2, 0.0, 2.2))));
        assert!(rotated.intersects(&rotated_cube_at(Vec3::new(1.9, 0.0, 0.0))));
        assert!(!rotated.intersects(&rotated_cube_at(Vec3::new(3.0, 0.0, 0.0))));
    }

    #[test]
    fn test_sphere_pairs() {
        let sphere = BoundingVolume::sphere(Vec3::zeros(), 1.0);
        assert!(sphere.intersects(&BoundingVolume::sphere(Vec3::new(1.9, 0.0, 0.0), 1.0)));
        assert!(!sphere.intersects(&BoundingVolume::sphere(Vec3::new(2.1, 0.0, 0.0), 1.0)));
        assert!(sphere.intersects(&unit_cube_at(Vec3::new(1.9, 0.0, 0.0))));
        // Nearest box corner is sqrt(3) * 0.7 away
        assert!(!sphere.intersects(&unit_cube_at(Vec3::new(1.7, 1.7, 1.7))));
        assert!(unit_cube_at(Vec3::new(1.9, 0.0, 0.0)).intersects(&sphere));
        assert!(sphere.intersects(&rotated_cube_at(Vec3::new(2.3, 0.0, 0.0))));
    }

    #[test]
    fn test_capsule_pairs() {
        let capsule = BoundingVolume::capsule(Vec3::new(0.0, 0.0, 0.0), Vec3::new(0.0, 4.0, 0.0), 0.5);
        assert!(capsule.intersects(&BoundingVolume::capsule(
            Vec3::new(0.9, 2.0, -3.0),
            Vec3::new(0.9, 2.0, 3.0),
            0.5
        )));
        assert!(!capsule.intersects(&BoundingVolume::capsule(
            Vec3::new(1.1, 2.0, -3.0),
            Vec3::new(1.1, 2.0, 3.0),
            0.5
        )));
        assert!(capsule.intersects(&BoundingVolume::sphere(Vec3::new(0.0, 5.0, 0.0), 0.6)));
        assert!(capsule.intersects(&unit_cube_at(Vec3::new(1.4, 2.0, 0.0))));
        assert!(!capsule.intersects(&unit_cube_at(Vec3::new(1.6, 2.0, 0.0))));
        assert!(unit_cube_at(Vec3::new(1.4, 2.0, 0.0)).intersects(&capsule));
        // Axis runs straight through the box
        assert!(capsule.intersects(&unit_cube_at(Vec3::new(0.0, 2.0, 0.0))));
        assert!(capsule.intersects(&rotated_cube_at(Vec3::new(1.8, 2.0, 0.0))));
        assert!(!capsule.intersects(&rotated_cube_at(Vec3::new(2.0, 2.0, 0.0))));
    }

    #[test]
    fn test_contains_and_closest_point() {
        let volumes = [
            unit_cube_at(Vec3::zeros()),
            rotated_cube_at(Vec3::zeros()),
            BoundingVolume::sphere(Vec3::zeros(), 1.0),
            BoundingVolume::capsule(Vec3::new(0.0, -1.0, 0.0), Vec3::new(0.0, 1.0, 0.0), 1.0),
        ];
        for volume in &volumes {
            let inside = Vec3::new(0.1, 0.2, -0.1);
            assert!(volume.contains_point(inside));
            assert_relative_eq!(volume.compute_closest_point(inside), inside);

            let outside = Vec3::new(0.0, 10.0, 0.0);
            assert!(!volume.contains_point(outside));
            let closest = volume.compute_closest_point(outside);
            assert!(volume.contains_point(closest * (1.0 - 1e-4)));
        }

        let sphere = BoundingVolume::sphere(Vec3::zeros(), 1.0);
        assert_relative_eq!(sphere.compute_closest_point(Vec3::new(3.0, 0.0, 0.0)), Vec3::new(1.0, 0.0, 0.0));
        let capsule = BoundingVolume::capsule(Vec3::new(0.0, -1.0, 0.0), Vec3::new(0.0, 1.0, 0.0), 1.0);
        assert_relative_eq!(capsule.compute_closest_point(Vec3::new(0.0, 5.0, 0.0)), Vec3::new(0.0, 2.0, 0.0));
    }

    #[test]
    fn test_box_variants_share_the_boundary_rule() {
        let aabb = unit_cube_at(Vec3::new(2.0, 0.5, 0.0));
        let oriented = BoundingVolume::oriented_box(Vec3::new(2.0, 0.5, 0.0), Quat::identity(), Vec3::repeat(1.0));
        let points = [
            Vec3::new(3.0, 0.5, 0.0),
            Vec3::new(2.0, 1.5, 1.0),
            Vec3::new(2.0, 1.5 + 5e-7, 0.0),
            Vec3::new(3.0 + 1e-5, 0.5, 0.0),
            Vec3::new(1.0 - 1e-5, -0.5, -1.0),
        ];
        for point in points {
            assert_eq!(aabb.contains_point(point), oriented.contains_point(point), "{point:?}");
        }
        assert!(oriented.contains_point(Vec3::new(3.0, 0.5, 0.0)));
        assert!(!oriented.contains_point(Vec3::new(2.0, 1.5 + 5e-7, 0.0)));
    }

    #[test]
    fn test_world_aabb() {
        let rotated = rotated_cube_at(Vec3::new(1.0, 0.0, 0.0));
        let aabb = rotated.world_aabb();
        let diagonal = 2.0_f32.sqrt();
        assert_relative_eq!(aabb.min, Vec3::new(1.0 - diagonal, -1.0, -diagonal), epsilon = 1e-5);
        assert_relative_eq!(aabb.max, Vec3::new(1.0 + diagonal, 1.0, diagonal), epsilon = 1e-5);

        let capsule = BoundingVolume::capsule(Vec3::new(0.0, 0.0, 0.0), Vec3::new(0.0, 4.0, 0.0), 0.5);
        assert_relative_eq!(capsule.world_aabb().min, Vec3::new(-0.5, -0.5, -0.5));
        assert_relative_eq!(capsule.world_aabb().max, Vec3::new(0.5, 4.5, 0.5));
    }

    #[test]
    fn test_vertical_segment_hits_top_surface_first() {
        let top = Vec3::new(0.2, 10.0, 0.1);
        let bottom = Vec3::new(0.2, -10.0, 0.1);
        let expectations = [
            (unit_cube_at(Vec3::zeros()), 1.0),
            (BoundingVolume::sphere(Vec3::zeros(), 1.0), (1.0_f32 - 0.05).sqrt()),
            (
                BoundingVolume::capsule(Vec3::new(0.0, -1.0, 0.0), Vec3::new(0.0, 1.0, 0.0), 1.0),
                1.0 + (1.0_f32 - 0.05).sqrt(),
            ),
        ];
        for (volume, height) in expectations {
            let (entry, exit) = volume.intersect_segment(top, bottom).unwrap();
            assert_relative_eq!(entry.y, height, epsilon = 1e-4);
            assert!(exit.y < entry.y);
        }
    }

    #[test]
    fn test_horizontal_segment_through_capsule_side() {
        let capsule = BoundingVolume::capsule(Vec3::new(0.0, 0.0, 0.0), Vec3::new(0.0, 4.0, 0.0), 0.5);
        let (entry, exit) = capsule
            .intersect_segment(Vec3::new(-5.0, 2.0, 0.0), Vec3::new(5.0, 2.0, 0.0))
            .unwrap();
        assert_relative_eq!(entry, Vec3::new(-0.5, 2.0, 0.0), epsilon = 1e-4);
        assert_relative_eq!(exit, Vec3::new(0.5, 2.0, 0.0), epsilon = 1e-4);
        assert!(capsule
            .intersect_segment(Vec3::new(-5.0, 5.0, 0.0), Vec3::new(5.0, 5.0, 0.0))
            .is_none());
    }

    #[test]
    fn test_translated_keeps_shape() {
        let capsule = BoundingVolume::capsule(Vec3::zeros(), Vec3::new(0.0, 2.0, 0.0), 0.5);
        let moved = capsule.with_center(Vec3::new(5.0, 1.0, 5.0));
        assert_relative_eq!(moved.center(), Vec3::new(5.0, 1.0, 5.0));
        assert_relative_eq!(moved.bounding_radius(), capsule.bounding_radius());
    }
}
