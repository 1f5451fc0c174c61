//! Ray-triangle intersection.
//!
//! Intersects the ray with the triangle's plane, then solves for the
//! barycentric coordinates of the plane hit in the `(p2 - p1, p3 - p1)`
//! edge basis. Degenerate inputs are misses, never errors.

use glint_math::{Ray, Vec3};

/// Tolerance for parallel rays, near-origin hits, degenerate triangles and
/// barycentric bounds.
pub const TRIANGLE_EPSILON: f32 = 1e-8;

/// Where a ray meets a triangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Intersection {
    /// Ray parameter of the hit, in units of the ray direction
    pub t: f32,
    /// Barycentric weight of the second vertex
    pub u: f32,
    /// Barycentric weight of the third vertex
    pub v: f32,
}

impl Intersection {
    /// Barycentric weights of `(p1, p2, p3)`; they sum to one.
    #[inline]
    pub fn weights(&self) -> Vec3 {
        Vec3::new(1.0 - self.u - self.v, self.u, self.v)
    }

    /// Interpolate a per-vertex attribute at the hit.
    #[inline]
    pub fn interpolate<T>(&self, a1: T, a2: T, a3: T) -> T
    where
        T: std::ops::Mul<f32, Output = T> + std::ops::Add<Output = T>,
    {
        a1 * (1.0 - self.u - self.v) + a2 * self.u + a3 * self.v
    }
}

/// Intersect `ray` with triangle `(p1, p2, p3)`.
///
/// Returns `None` when the ray is parallel to the plane, the plane hit is
/// behind or within `TRIANGLE_EPSILON` of the origin, the triangle is
/// degenerate, or the hit falls outside the triangle. Points on an edge or
/// vertex (within `TRIANGLE_EPSILON`) count as inside so that triangles
/// sharing an edge leave no gap.
///
/// Both faces are hit; winding does not matter.
pub fn intersect_triangle(ray: &Ray, p1: Vec3, p2: Vec3, p3: Vec3) -> Option<Intersection> {
    let n = (p1 - p2).cross(p1 - p3);

    let dir_dot_n = ray.direction.dot(n);
    if dir_dot_n.abs() < TRIANGLE_EPSILON {
        return None;
    }

    // Also rejects the surface a secondary ray starts on
    let t = (p1 - ray.origin).dot(n) / dir_dot_n;
    if t < TRIANGLE_EPSILON {
        return None;
    }

    let to_hit = ray.at(t) - p1;
    let edge_u = p2 - p1;
    let edge_v = p3 - p1;

    let dot_vv = edge_v.dot(edge_v);
    let dot_vu = edge_v.dot(edge_u);
    let dot_vh = edge_v.dot(to_hit);
    let dot_uu = edge_u.dot(edge_u);
    let dot_uh = edge_u.dot(to_hit);

    let denominator = dot_vv * dot_uu - dot_vu * dot_vu;
    if denominator.abs() < TRIANGLE_EPSILON {
        return None;
    }

    let u = (dot_vv * dot_uh - dot_vu * dot_vh) / denominator;
    let v = (dot_uu * dot_vh - dot_vu * dot_uh) / denominator;

    if u >= -TRIANGLE_EPSILON && v >= -TRIANGLE_EPSILON && u + v <= 1.0 + TRIANGLE_EPSILON {
        Some(Intersection { t, u, v })
    } else {
        None
    }
}
