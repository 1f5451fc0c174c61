//! Whitted-style tracing loop.
//!
//! Each bounce shades the nearest hit with ambient plus per-light Phong
//! diffuse/specular (optionally shadow-tested), banks part of that local
//! result, and continues with a single ray:
//!
//! - surfaces with opacity below [`TRANSMISSION_THRESHOLD`] bank `alpha`
//!   of the local result and pass the rest straight through, undeflected;
//! - everything else banks `1 - ks/2` and mirrors the ray, keeping `ks/2`.
//!
//! The split is a fixed heuristic, not a Fresnel term. Background
//! contributes nothing.

use glint_core::Light;
use glint_math::{reflect, Color, Ray, Vec3};

use crate::intersector::{Intersector, SurfaceHit};

/// Offset along the normal for shadow-ray origins.
pub const SHADOW_BIAS: f32 = 1e-4;

/// Opacity below which a surface is treated as see-through.
pub const TRANSMISSION_THRESHOLD: f32 = 0.9;

/// Mirror reflectance per unit of specular color.
pub const REFLECTANCE_SCALE: f32 = 0.5;

/// Record of one completed bounce.
#[derive(Debug, Clone, Copy)]
pub struct Bounce {
    /// Zero-based bounce index
    pub depth: u32,
    /// Surface shaded at this bounce
    pub hit: SurfaceHit,
    /// Local illumination at the hit (ambient + direct)
    pub local: Color,
    /// Accumulated color after this bounce
    pub color: Color,
    /// Throughput left for later bounces
    pub weight: Color,
    /// Whether the path continued through the surface rather than mirroring
    pub transmitted: bool,
}

/// The bounce loop as an iterator.
///
/// Yields one [`Bounce`] per surface hit and stops after `max_depth`
/// bounces or at the first miss. State is `(color, weight, ray)`; nothing
/// is shared between traces.
pub struct PathTrace<'a, I: Intersector + ?Sized> {
    intersector: &'a I,
    ray: Ray,
    depth: u32,
    max_depth: u32,
    enable_shadow: bool,
    color: Color,
    weight: Color,
    finished: bool,
}

impl<'a, I: Intersector + ?Sized> PathTrace<'a, I> {
    /// Start a path at `ray`.
    pub fn new(intersector: &'a I, ray: Ray, max_depth: u32, enable_shadow: bool) -> Self {
        Self {
            intersector,
            ray,
            depth: 0,
            max_depth,
            enable_shadow,
            color: Color::ZERO,
            weight: Color::ONE,
            finished: false,
        }
    }

    /// Color accumulated so far.
    pub fn color(&self) -> Color {
        self.color
    }

    /// Throughput still available to later bounces.
    pub fn weight(&self) -> Color {
        self.weight
    }
}

impl<I: Intersector + ?Sized> Iterator for PathTrace<'_, I> {
    type Item = Bounce;

    fn next(&mut self) -> Option<Bounce> {
        if self.finished || self.depth >= self.max_depth {
            return None;
        }

        let Some(hit) = self.intersector.intersect_ray(&self.ray) else {
            self.finished = true;
            return None;
        };

        let local = shade(self.intersector, &self.ray, &hit, self.enable_shadow);
        let alpha = hit.alpha();
        let transmitted = alpha < TRANSMISSION_THRESHOLD;

        let next_direction = if transmitted {
            let r = Color::splat(alpha);
            self.color += self.weight * r * local;
            self.weight *= Color::ONE - r;
            self.ray.direction
        } else {
            let r = hit.specular() * REFLECTANCE_SCALE;
            self.color += self.weight * (Color::ONE - r) * local;
            self.weight *= r;
            reflect(self.ray.direction, hit.normal)
        };
        self.ray = Ray::new(hit.position, next_direction);

        let bounce = Bounce {
            depth: self.depth,
            hit,
            local,
            color: self.color,
            weight: self.weight,
            transmitted,
        };
        self.depth += 1;
        Some(bounce)
    }
}

/// Trace `ray` for at most `max_depth` bounces and return the accumulated
/// color.
///
/// `ray.direction` must be finite and non-zero. It need not be unit
/// length, though energy only makes physical sense if it is.
pub fn ray_trace<I: Intersector + ?Sized>(
    intersector: &I,
    ray: Ray,
    max_depth: u32,
    enable_shadow: bool,
) -> Color {
    PathTrace::new(intersector, ray, max_depth, enable_shadow)
        .last()
        .map_or(Color::ZERO, |bounce| bounce.color)
}

/// Ambient plus direct illumination at `hit`, seen along `ray`.
fn shade<I: Intersector + ?Sized>(
    intersector: &I,
    ray: &Ray,
    hit: &SurfaceHit,
    enable_shadow: bool,
) -> Color {
    let kd = hit.diffuse();
    let ks = hit.specular();
    let shininess = hit.shininess();
    let view = (-ray.direction).normalize();

    let mut result = intersector.ambient_intensity() * kd;

    for light in intersector.lights() {
        let (l, attenuation) = light.incident(hit.position);
        let to_light = l.normalize();

        if enable_shadow && is_occluded(intersector, light, hit, to_light) {
            continue;
        }

        let diffuse = hit.normal.dot(to_light).max(0.0) * kd;
        let mirrored = reflect(-to_light, hit.normal);
        let specular = ks * mirrored.dot(view).max(0.0).powf(shininess);

        result += attenuation * (diffuse + specular) * light.intensity();
    }

    result
}

/// Whether something blocks the path from `hit` to `light`.
///
/// For a point light only occluders strictly closer than the light count;
/// for a directional light anything along the ray does.
fn is_occluded<I: Intersector + ?Sized>(
    intersector: &I,
    light: &Light,
    hit: &SurfaceHit,
    to_light: Vec3,
) -> bool {
    let shadow_ray = Ray::new(hit.position + SHADOW_BIAS * hit.normal, to_light);
    match intersector.intersect_ray(&shadow_ray) {
        Some(occluder) => {
            (occluder.position - hit.position).length() < light.distance_from(hit.position)
        }
        None => false,
    }
}
