//! Pinhole camera for primary ray generation.

use glint_core::CameraSettings;
use glint_math::{Ray, Vec3};
use rand::{Rng, RngCore};

/// Camera for generating rays into the scene.
///
/// Pixel `(0, 0)` is the top-left corner of the image. Call
/// [`Camera::initialize`] after changing any setting.
#[derive(Debug, Clone)]
pub struct Camera {
    // Image settings
    pub image_width: u32,
    pub image_height: u32,

    // Camera positioning
    look_from: Vec3,
    look_at: Vec3,
    vup: Vec3,

    // Vertical field of view in degrees
    vfov: f32,

    // Cached computed values (set by initialize())
    pixel00_loc: Vec3,
    pixel_delta_u: Vec3,
    pixel_delta_v: Vec3,
}

impl Camera {
    /// Create a camera at the origin looking down -Z with a 90 degree FOV.
    pub fn new() -> Self {
        let mut camera = Self {
            image_width: 800,
            image_height: 450,
            look_from: Vec3::ZERO,
            look_at: Vec3::new(0.0, 0.0, -1.0),
            vup: Vec3::Y,
            vfov: 90.0,
            pixel00_loc: Vec3::ZERO,
            pixel_delta_u: Vec3::ZERO,
            pixel_delta_v: Vec3::ZERO,
        };
        camera.initialize();
        camera
    }

    /// Build an initialized camera from scene-file settings.
    pub fn from_settings(settings: &CameraSettings, width: u32, height: u32) -> Self {
        let mut camera = Self::new()
            .with_resolution(width, height)
            .with_position(settings.look_from, settings.look_at, settings.up)
            .with_vfov(settings.vfov);
        camera.initialize();
        camera
    }

    /// Set image resolution.
    pub fn with_resolution(mut self, width: u32, height: u32) -> Self {
        self.image_width = width;
        self.image_height = height;
        self
    }

    /// Set camera position.
    pub fn with_position(mut self, look_from: Vec3, look_at: Vec3, vup: Vec3) -> Self {
        self.look_from = look_from;
        self.look_at = look_at;
        self.vup = vup;
        self
    }

    /// Set vertical field of view in degrees.
    pub fn with_vfov(mut self, vfov: f32) -> Self {
        self.vfov = vfov;
        self
    }

    /// Eye position.
    pub fn look_from(&self) -> Vec3 {
        self.look_from
    }

    /// Recompute the cached viewport (must be called before generating rays).
    pub fn initialize(&mut self) {
        let width = self.image_width.max(1) as f32;
        let height = self.image_height.max(1) as f32;

        // Viewport sits one unit in front of the eye
        let h = (self.vfov.to_radians() / 2.0).tan();
        let viewport_height = 2.0 * h;
        let viewport_width = viewport_height * (width / height);

        // Camera basis vectors
        let w = (self.look_from - self.look_at).normalize();
        let u = self.vup.cross(w).normalize();
        let v = w.cross(u);

        // Image rows run down the viewport
        let viewport_u = viewport_width * u;
        let viewport_v = -viewport_height * v;

        self.pixel_delta_u = viewport_u / width;
        self.pixel_delta_v = viewport_v / height;

        let viewport_upper_left = self.look_from - w - viewport_u / 2.0 - viewport_v / 2.0;
        self.pixel00_loc = viewport_upper_left + 0.5 * (self.pixel_delta_u + self.pixel_delta_v);
    }

    /// Ray through the center of pixel `(i, j)`.
    pub fn center_ray(&self, i: u32, j: u32) -> Ray {
        self.ray_through(i as f32, j as f32)
    }

    /// Ray through a uniformly jittered point inside pixel `(i, j)`.
    pub fn jittered_ray(&self, i: u32, j: u32, rng: &mut dyn RngCore) -> Ray {
        let dx = rng.gen::<f32>() - 0.5;
        let dy = rng.gen::<f32>() - 0.5;
        self.ray_through(i as f32 + dx, j as f32 + dy)
    }

    /// Ray through image-plane coordinates relative to pixel (0, 0)'s center.
    fn ray_through(&self, x: f32, y: f32) -> Ray {
        let pixel_sample = self.pixel00_loc + x * self.pixel_delta_u + y * self.pixel_delta_v;
        Ray::new(self.look_from, (pixel_sample - self.look_from).normalize())
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}
