//! Primitive line segment tests and closest point algorithms
//!
//! All routines are pure functions over [`Vec3`]. Degenerate input (zero
//! length segments, parallel segments, zero area triangles) is reported as
//! "no intersection" and never panics. Every tolerance comes from the shared
//! [`EPSILON`].

use super::bounding_volume::{Aabb, OrientedBoundingBox};
use crate::foundation::math::{utils::clamp, Vec3, EPSILON};

/// Closest point on segment `p`..`q` to `point`
pub fn closest_point_on_segment(p: Vec3, q: Vec3, point: Vec3) -> Vec3 {
    let d = q - p;
    let length_squared = d.magnitude_squared();
    if length_squared <= EPSILON {
        return p;
    }
    let t = clamp((point - p).dot(&d) / length_squared, 0.0, 1.0);
    p + d * t
}

/// Closest points between segments `p1`..`q1` and `p2`..`q2`
///
/// Returns `(c1, c2)` with `c1` on the first and `c2` on the second segment.
/// Parallel segments have infinitely many solutions; the pair is chosen by
/// placing `c1` at the parametric midpoint of the first segment and then
/// clamping both parameters into range.
pub fn closest_points_on_segments(p1: Vec3, q1: Vec3, p2: Vec3, q2: Vec3) -> (Vec3, Vec3) {
    let d1 = q1 - p1;
    let d2 = q2 - p2;
    let r = p1 - p2;
    let a = d1.dot(&d1);
    let e = d2.dot(&d2);
    let f = d2.dot(&r);

    // Both segments degenerate into points
    if a <= EPSILON && e <= EPSILON {
        return (p1, p2);
    }

    let (s, t) = if a <= EPSILON {
        (0.0, clamp(f / e, 0.0, 1.0))
    } else {
        let c = d1.dot(&r);
        if e <= EPSILON {
            (clamp(-c / a, 0.0, 1.0), 0.0)
        } else {
            let b = d1.dot(&d2);
            let denom = a * e - b * b;

            // denom = |d1|^2 |d2|^2 sin^2(angle), compared relative to the lengths
            let mut s = if denom <= EPSILON * a * e {
                0.5
            } else {
                clamp((b * f - c * e) / denom, 0.0, 1.0)
            };
            let mut t = (b * s + f) / e;

            if t < 0.0 {
                t = 0.0;
                s = clamp(-c / a, 0.0, 1.0);
            } else if t > 1.0 {
                t = 1.0;
                s = clamp((b - c) / a, 0.0, 1.0);
            }
            (s, t)
        }
    };

    (p1 + d1 * s, p2 + d2 * t)
}

/// Test whether two segments cross each other
///
/// Parallel, collinear and zero length segments never intersect. On a hit
/// the contact point is the midpoint of the (coincident) closest points.
pub fn segments_intersect(p1: Vec3, q1: Vec3, p2: Vec3, q2: Vec3) -> Option<Vec3> {
    let d1 = q1 - p1;
    let d2 = q2 - p2;
    let a = d1.magnitude_squared();
    let e = d2.magnitude_squared();
    if a <= EPSILON || e <= EPSILON {
        return None;
    }
    if d1.cross(&d2).magnitude_squared() <= EPSILON * a * e {
        return None;
    }

    let (c1, c2) = closest_points_on_segments(p1, q1, p2, q2);
    if (c1 - c2).magnitude_squared() <= EPSILON {
        Some((c1 + c2) * 0.5)
    } else {
        None
    }
}

/// Slab test of segment `p`..`q` against an axis aligned box
///
/// On a hit returns `(contact_min, contact_max)`: the part of the segment
/// inside the box, `contact_min` being the entry point nearer to `p`. A
/// segment fully inside the box yields `(p, q)`.
pub fn segment_intersects_box(aabb: &Aabb, p: Vec3, q: Vec3) -> Option<(Vec3, Vec3)> {
    let d = q - p;
    let mut t_min = 0.0_f32;
    let mut t_max = 1.0_f32;

    for axis in 0..3 {
        if d[axis].abs() <= EPSILON {
            // Parallel to this slab, must already be between its planes
            if p[axis] < aabb.min[axis] || p[axis] > aabb.max[axis] {
                return None;
            }
        } else {
            let inverse = 1.0 / d[axis];
            let mut t1 = (aabb.min[axis] - p[axis]) * inverse;
            let mut t2 = (aabb.max[axis] - p[axis]) * inverse;
            if t1 > t2 {
                std::mem::swap(&mut t1, &mut t2);
            }
            t_min = t_min.max(t1);
            t_max = t_max.min(t2);
            if t_min > t_max {
                return None;
            }
        }
    }

    Some((p + d * t_min, p + d * t_max))
}

/// Slab test of segment `p`..`q` against an oriented box
///
/// The segment is moved into the box frame, tested against the local axis
/// aligned box and the contacts are mapped back to world space.
pub fn segment_intersects_oriented_box(
    obb: &OrientedBoundingBox,
    p: Vec3,
    q: Vec3,
) -> Option<(Vec3, Vec3)> {
    let local_box = obb.local_aabb();
    segment_intersects_box(&local_box, obb.to_local(p), obb.to_local(q))
        .map(|(contact_min, contact_max)| (obb.from_local(contact_min), obb.from_local(contact_max)))
}

/// Segment `r1`..`r2` against triangle `p1`, `p2`, `p3` (Möller-Trumbore)
///
/// Returns the contact point. Zero area triangles and segments parallel to
/// the triangle plane never intersect.
pub fn segment_intersects_triangle(p1: Vec3, p2: Vec3, p3: Vec3, r1: Vec3, r2: Vec3) -> Option<Vec3> {
    Triangle::new(p1, p2, p3).intersect_segment(r1, r2)
}

/// Segment `p`..`q` against a sphere, returning entry and exit points
pub fn segment_intersects_sphere(center: Vec3, radius: f32, p: Vec3, q: Vec3) -> Option<(Vec3, Vec3)> {
    let d = q - p;
    let (t0, t1) = clamp_interval(segment_sphere_interval(center, radius, p, d)?)?;
    Some((p + d * t0, p + d * t1))
}

/// Parameter interval of the line `p + t * d` inside a sphere (unclamped)
pub(crate) fn segment_sphere_interval(center: Vec3, radius: f32, p: Vec3, d: Vec3) -> Option<(f32, f32)> {
    let m = p - center;
    let c = m.dot(&m) - radius * radius;
    let a = d.dot(&d);
    if a <= EPSILON {
        // Point segment
        return if c <= 0.0 { Some((0.0, 1.0)) } else { None };
    }
    let b = m.dot(&d);
    let discriminant = b * b - a * c;
    if discriminant < 0.0 {
        return None;
    }
    let sqrt_discriminant = discriminant.sqrt();
    Some(((-b - sqrt_discriminant) / a, (-b + sqrt_discriminant) / a))
}

/// Intersect a parameter interval with the segment range `[0, 1]`
pub(crate) fn clamp_interval((t0, t1): (f32, f32)) -> Option<(f32, f32)> {
    let t0 = t0.max(0.0);
    let t1 = t1.min(1.0);
    if t0 <= t1 {
        Some((t0, t1))
    } else {
        None
    }
}

/// A triangle for collision detection
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    /// Triangle vertices in world space
    pub v0: Vec3,
    /// Second vertex
    pub v1: Vec3,
    /// Third vertex
    pub v2: Vec3,
}

impl Triangle {
    /// Creates a new triangle
    pub fn new(v0: Vec3, v1: Vec3, v2: Vec3) -> Self {
        Self { v0, v1, v2 }
    }

    /// True if the triangle has (numerically) zero area
    pub fn is_degenerate(&self) -> bool {
        let edge1 = self.v1 - self.v0;
        let edge2 = self.v2 - self.v0;
        edge1.cross(&edge2).magnitude_squared()
            <= EPSILON * edge1.magnitude_squared() * edge2.magnitude_squared()
    }

    /// Unit normal (right-hand rule), `None` for degenerate triangles
    pub fn normal(&self) -> Option<Vec3> {
        if self.is_degenerate() {
            return None;
        }
        let edge1 = self.v1 - self.v0;
        let edge2 = self.v2 - self.v0;
        Some(edge1.cross(&edge2).normalize())
    }

    /// Calculates the centroid (center point) of the triangle
    pub fn centroid(&self) -> Vec3 {
        (self.v0 + self.v1 + self.v2) / 3.0
    }

    /// Möller-Trumbore test restricted to the segment `r1`..`r2`
    ///
    /// See: "Fast, Minimum Storage Ray/Triangle Intersection" by Möller & Trumbore
    pub fn intersect_segment(&self, r1: Vec3, r2: Vec3) -> Option<Vec3> {
        if self.is_degenerate() {
            return None;
        }

        let edge1 = self.v1 - self.v0;
        let edge2 = self.v2 - self.v0;
        let direction = r2 - r1;

        let h = direction.cross(&edge2);
        let a = edge1.dot(&h);

        // Segment parallel to triangle plane
        if a.abs() < EPSILON {
            return None;
        }

        let f = 1.0 / a;
        let s = r1 - self.v0;
        let u = f * s.dot(&h);
        if !(0.0..=1.0).contains(&u) {
            return None;
        }

        let q = s.cross(&edge1);
        let v = f * direction.dot(&q);
        if v < 0.0 || u + v > 1.0 {
            return None;
        }

        let t = f * edge2.dot(&q);
        if (0.0..=1.0).contains(&t) {
            Some(r1 + direction * t)
        } else {
            None
        }
    }

    /// Get the closest point on the triangle to a given point
    pub fn closest_point(&self, point: Vec3) -> Vec3 {
        let ab = self.v1 - self.v0;
        let ac = self.v2 - self.v0;

        // Vertex region outside v0
        let ap = point - self.v0;
        let d1 = ab.dot(&ap);
        let d2 = ac.dot(&ap);
        if d1 <= 0.0 && d2 <= 0.0 {
            return self.v0;
        }

        // Vertex region outside v1
        let bp = point - self.v1;
        let d3 = ab.dot(&bp);
        let d4 = ac.dot(&bp);
        if d3 >= 0.0 && d4 <= d3 {
            return self.v1;
        }

        // Edge region v0-v1
        let vc = d1 * d4 - d3 * d2;
        if vc <= 0.0 && d1 >= 0.0 && d3 <= 0.0 {
            let v = d1 / (d1 - d3);
            return self.v0 + ab * v;
        }

        // Vertex region outside v2
        let cp = point - self.v2;
        let d5 = ab.dot(&cp);
        let d6 = ac.dot(&cp);
        if d6 >= 0.0 && d5 <= d6 {
            return self.v2;
        }

        // Edge region v0-v2
        let vb = d5 * d2 - d1 * d6;
        if vb <= 0.0 && d2 >= 0.0 && d6 <= 0.0 {
            let w = d2 / (d2 - d6);
            return self.v0 + ac * w;
        }

        // Edge region v1-v2
        let va = d3 * d6 - d5 * d4;
        if va <= 0.0 && (d4 - d3) >= 0.0 && (d5 - d6) >= 0.0 {
            let w = (d4 - d3) / ((d4 - d3) + (d5 - d6));
            return self.v1 + (self.v2 - self.v1) * w;
        }

        // Inside the face
        let denom = 1.0 / (va + vb + vc);
        let v = vb * denom;
        let w = vc * denom;
        self.v0 + ab * v + ac * w
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn unit_box() -> Aabb {
        Aabb::new(Vec3::new(-1.0, -1.0, -1.0), Vec3::new(1.0, 1.0, 1.0))
    }

    #[test]
    fn test_crossing_segments_intersect() {
        let contact = segments_intersect(
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(2.0, 0.0, 0.0),
            Vec3::new(1.0, -1.0, 0.0),
            Vec3::new(1.0, 1.0, 0.0),
        );
        assert_relative_eq!(contact.unwrap(), Vec3::new(1.0, 0.0, 0.0), epsilon = 1e-5);
    }

    #[test]
    fn test_skew_segments_do_not_intersect() {
        let contact = segments_intersect(
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(2.0, 0.0, 0.0),
            Vec3::new(1.0, -1.0, 1.0),
            Vec3::new(1.0, 1.0, 1.0),
        );
        assert!(contact.is_none());
    }

    #[test]
    fn test_parallel_and_collinear_segments_do_not_intersect() {
        let p1 = Vec3::new(0.0, 0.0, 0.0);
        let q1 = Vec3::new(2.0, 0.0, 0.0);
        assert!(segments_intersect(p1, q1, Vec3::new(0.0, 1.0, 0.0), Vec3::new(2.0, 1.0, 0.0)).is_none());
        assert!(segments_intersect(p1, q1, Vec3::new(1.0, 0.0, 0.0), Vec3::new(3.0, 0.0, 0.0)).is_none());
        // Zero length segment
        assert!(segments_intersect(p1, q1, Vec3::new(1.0, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0)).is_none());
    }

    #[test]
    fn test_closest_points_skew() {
        let (c1, c2) = closest_points_on_segments(
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(2.0, 0.0, 0.0),
            Vec3::new(1.0, -1.0, 3.0),
            Vec3::new(1.0, 1.0, 3.0),
        );
        assert_relative_eq!(c1, Vec3::new(1.0, 0.0, 0.0), epsilon = 1e-5);
        assert_relative_eq!(c2, Vec3::new(1.0, 0.0, 3.0), epsilon = 1e-5);
    }

    #[test]
    fn test_closest_points_parallel_overlap_uses_first_midpoint() {
        let (c1, c2) = closest_points_on_segments(
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(4.0, 0.0, 0.0),
            Vec3::new(1.0, 2.0, 0.0),
            Vec3::new(5.0, 2.0, 0.0),
        );
        assert_relative_eq!(c1, Vec3::new(2.0, 0.0, 0.0), epsilon = 1e-5);
        assert_relative_eq!(c2, Vec3::new(2.0, 2.0, 0.0), epsilon = 1e-5);
    }

    #[test]
    fn test_closest_points_parallel_disjoint_clamps() {
        let (c1, c2) = closest_points_on_segments(
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(3.0, 1.0, 0.0),
            Vec3::new(5.0, 1.0, 0.0),
        );
        assert_relative_eq!(c1, Vec3::new(1.0, 0.0, 0.0), epsilon = 1e-5);
        assert_relative_eq!(c2, Vec3::new(3.0, 1.0, 0.0), epsilon = 1e-5);
    }

    #[test]
    fn test_closest_points_distance_is_symmetric() {
        let segments = [
            (Vec3::new(0.0, 0.0, 0.0), Vec3::new(3.0, 1.0, -2.0)),
            (Vec3::new(-1.0, 4.0, 2.0), Vec3::new(2.0, -3.0, 1.0)),
            (Vec3::new(5.0, 5.0, 5.0), Vec3::new(5.0, 5.0, 5.0)),
            (Vec3::new(1.0, 0.0, 0.0), Vec3::new(4.0, 1.0, -2.0)),
            (Vec3::new(0.0, 2.0, 0.0), Vec3::new(0.0, 2.0, 6.0)),
        ];
        for (p1, q1) in segments {
            for (p2, q2) in segments {
                let (a1, a2) = closest_points_on_segments(p1, q1, p2, q2);
                let (b1, b2) = closest_points_on_segments(p2, q2, p1, q1);
                assert_relative_eq!((a1 - a2).magnitude(), (b1 - b2).magnitude(), epsilon = 1e-4);
            }
        }
    }

    #[test]
    fn test_segment_inside_box_returns_endpoints() {
        let p = Vec3::new(-0.5, 0.2, 0.1);
        let q = Vec3::new(0.5, -0.3, 0.7);
        let (contact_min, contact_max) = segment_intersects_box(&unit_box(), p, q).unwrap();
        assert_relative_eq!(contact_min, p, epsilon = EPSILON);
        assert_relative_eq!(contact_max, q, epsilon = EPSILON);
    }

    #[test]
    fn test_segment_through_box_clips_to_faces() {
        let (contact_min, contact_max) =
            segment_intersects_box(&unit_box(), Vec3::new(-3.0, 0.0, 0.0), Vec3::new(3.0, 0.0, 0.0)).unwrap();
        assert_relative_eq!(contact_min, Vec3::new(-1.0, 0.0, 0.0), epsilon = 1e-5);
        assert_relative_eq!(contact_max, Vec3::new(1.0, 0.0, 0.0), epsilon = 1e-5);

        // Reversed direction enters from the other side
        let (contact_min, _) =
            segment_intersects_box(&unit_box(), Vec3::new(3.0, 0.0, 0.0), Vec3::new(-3.0, 0.0, 0.0)).unwrap();
        assert_relative_eq!(contact_min, Vec3::new(1.0, 0.0, 0.0), epsilon = 1e-5);
    }

    #[test]
    fn test_segment_missing_box() {
        assert!(segment_intersects_box(&unit_box(), Vec3::new(-3.0, 2.0, 0.0), Vec3::new(3.0, 2.0, 0.0)).is_none());
        // Ends before reaching the box
        assert!(segment_intersects_box(&unit_box(), Vec3::new(-3.0, 0.0, 0.0), Vec3::new(-2.0, 0.0, 0.0)).is_none());
    }

    #[test]
    fn test_segment_oriented_box() {
        let obb = OrientedBoundingBox::from_rotation(
            Vec3::new(10.0, 0.0, 0.0),
            crate::foundation::math::Quat::from_axis_angle(&Vec3::y_axis(), std::f32::consts::FRAC_PI_4),
            Vec3::new(1.0, 1.0, 1.0),
        );
        let (contact_min, contact_max) =
            segment_intersects_oriented_box(&obb, Vec3::new(5.0, 0.0, 0.0), Vec3::new(15.0, 0.0, 0.0)).unwrap();
        // The diagonal of a unit box rotated by 45 degrees
        let half_diagonal = 2.0_f32.sqrt();
        assert_relative_eq!(contact_min, Vec3::new(10.0 - half_diagonal, 0.0, 0.0), epsilon = 1e-4);
        assert_relative_eq!(contact_max, Vec3::new(10.0 + half_diagonal, 0.0, 0.0), epsilon = 1e-4);

        assert!(segment_intersects_oriented_box(&obb, Vec3::new(5.0, 3.0, 0.0), Vec3::new(15.0, 3.0, 0.0)).is_none());
    }

    #[test]
    fn test_segment_triangle() {
        let contact = segment_intersects_triangle(
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(2.0, 0.0, 0.0),
            Vec3::new(0.0, 0.0, 2.0),
            Vec3::new(0.5, 1.0, 0.5),
            Vec3::new(0.5, -1.0, 0.5),
        );
        assert_relative_eq!(contact.unwrap(), Vec3::new(0.5, 0.0, 0.5), epsilon = 1e-5);

        // Too short to reach the plane
        assert!(segment_intersects_triangle(
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(2.0, 0.0, 0.0),
            Vec3::new(0.0, 0.0, 2.0),
            Vec3::new(0.5, 1.0, 0.5),
            Vec3::new(0.5, 0.5, 0.5),
        )
        .is_none());
    }

    #[test]
    fn test_degenerate_triangle_never_hits() {
        let contact = segment_intersects_triangle(
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(2.0, 0.0, 0.0),
            Vec3::new(1.0, 1.0, 0.0),
            Vec3::new(1.0, -1.0, 0.0),
        );
        assert!(contact.is_none());
        assert!(Triangle::new(Vec3::zeros(), Vec3::x(), Vec3::x() * 2.0).normal().is_none());
    }

    #[test]
    fn test_triangle_closest_point_regions() {
        let triangle = Triangle::new(Vec3::new(0.0, 0.0, 0.0), Vec3::new(2.0, 0.0, 0.0), Vec3::new(0.0, 2.0, 0.0));
        assert_relative_eq!(triangle.closest_point(Vec3::new(-1.0, -1.0, 0.0)), triangle.v0);
        assert_relative_eq!(triangle.closest_point(Vec3::new(0.5, 0.5, 3.0)), Vec3::new(0.5, 0.5, 0.0));
        assert_relative_eq!(triangle.closest_point(Vec3::new(1.0, -2.0, 0.0)), Vec3::new(1.0, 0.0, 0.0));
        assert_relative_eq!(triangle.closest_point(Vec3::new(2.0, 2.0, 0.0)), Vec3::new(1.0, 1.0, 0.0), epsilon = 1e-5);
    }

    #[test]
    fn test_segment_sphere() {
        let (entry, exit) =
            segment_intersects_sphere(Vec3::zeros(), 1.0, Vec3::new(0.0, 5.0, 0.0), Vec3::new(0.0, -5.0, 0.0)).unwrap();
        assert_relative_eq!(entry, Vec3::new(0.0, 1.0, 0.0), epsilon = 1e-5);
        assert_relative_eq!(exit, Vec3::new(0.0, -1.0, 0.0), epsilon = 1e-5);
        assert!(segment_intersects_sphere(Vec3::zeros(), 1.0, Vec3::new(2.0, 5.0, 0.0), Vec3::new(2.0, -5.0, 0.0)).is_none());
    }

    #[test]
    fn test_closest_point_on_segment_clamps() {
        let p = Vec3::new(0.0, 0.0, 0.0);
        let q = Vec3::new(4.0, 0.0, 0.0);
        assert_relative_eq!(closest_point_on_segment(p, q, Vec3::new(2.0, 3.0, 0.0)), Vec3::new(2.0, 0.0, 0.0));
        assert_relative_eq!(closest_point_on_segment(p, q, Vec3::new(-2.0, 3.0, 0.0)), p);
        assert_relative_eq!(closest_point_on_segment(p, p, Vec3::new(-2.0, 3.0, 0.0)), p);
    }
}
