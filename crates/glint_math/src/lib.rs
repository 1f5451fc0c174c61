// Re-export glam for convenience
pub use glam::*;

// Glint math types
mod aabb;
mod interval;
mod ray;

pub use aabb::Aabb;
pub use interval::Interval;
pub use ray::Ray;

/// RGB color in linear space. Channels are usually in [0, 1] but light
/// intensities and accumulated radiance may exceed that.
pub type Color = Vec3;

/// Mirror `v` about the plane with unit normal `n`.
///
/// Returns `v - 2 * dot(n, v) * n`.
#[inline]
pub fn reflect(v: Vec3, n: Vec3) -> Vec3 {
    v - 2.0 * n.dot(v) * n
}
