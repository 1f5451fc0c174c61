//! The scene-query capability the tracer is written against.

use glint_core::Light;
use glint_math::{Color, Ray, Vec3, Vec4};

/// Shininess exponent represented by a meta-spec alpha of 1.0.
pub const SHININESS_SCALE: f32 = 256.0;

/// Shading data at the nearest surface along a ray.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceHit {
    /// World-space hit point
    pub position: Vec3,
    /// Unit shading normal. Not flipped toward the ray.
    pub normal: Vec3,
    /// Linear diffuse color (RGB) and opacity (A)
    pub albedo: Vec4,
    /// Specular color (RGB) and shininess / `SHININESS_SCALE` (A)
    pub meta_spec: Vec4,
}

impl SurfaceHit {
    /// Diffuse reflectance.
    #[inline]
    pub fn diffuse(&self) -> Color {
        self.albedo.truncate()
    }

    /// Opacity; low values let the path continue through the surface.
    #[inline]
    pub fn alpha(&self) -> f32 {
        self.albedo.w
    }

    /// Specular color.
    #[inline]
    pub fn specular(&self) -> Color {
        self.meta_spec.truncate()
    }

    /// Phong exponent.
    #[inline]
    pub fn shininess(&self) -> f32 {
        self.meta_spec.w * SHININESS_SCALE
    }
}

/// Read-only access to a scene for the tracer.
///
/// Implementations must be deterministic for a fixed scene and ray, and
/// safe to query from many threads at once.
pub trait Intersector: Send + Sync {
    /// Nearest surface hit along `ray`, or `None` if the ray escapes.
    fn intersect_ray(&self, ray: &Ray) -> Option<SurfaceHit>;

    /// Ambient intensity, scaled by albedo at every shaded point.
    fn ambient_intensity(&self) -> Color;

    /// Lights, in shading order.
    fn lights(&self) -> &[Light];
}
