//! Image rendering on top of the tracer.
//!
//! Implements:
//! - Per-pixel supersampling with jittered camera rays
//! - Parallel bucket rendering with rayon
//! - Display conversion (clamp, gamma 2.2) and PNG output

use std::path::{Path, PathBuf};
use std::time::Instant;

use glint_math::{Color, Interval};
use rand::RngCore;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::bucket::{generate_buckets, render_bucket, BucketResult, DEFAULT_BUCKET_SIZE};
use crate::intersector::Intersector;
use crate::tracer::ray_trace;
use crate::Camera;

/// Display gamma applied when converting to 8-bit.
const DISPLAY_GAMMA: f32 = 2.2;

/// Errors from writing render output.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("failed to write image {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("image is {width}x{height} but holds {pixels} pixels")]
    SizeMismatch { width: u32, height: u32, pixels: usize },
}

pub type RenderResult<T> = Result<T, RenderError>;

/// Render configuration.
///
/// Every field has a default, so a JSON config may name any subset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderConfig {
    /// Image width in pixels
    pub width: u32,
    /// Image height in pixels
    pub height: u32,
    /// Samples per pixel; one sample uses the pixel-center ray
    pub samples_per_pixel: u32,
    /// Maximum bounces per path
    pub max_depth: u32,
    /// Whether lights are shadow-tested
    pub enable_shadow: bool,
    /// Base seed for per-bucket sample jitter
    pub seed: u64,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
            samples_per_pixel: 16,
            max_depth: 5,
            enable_shadow: true,
            seed: 0,
        }
    }
}

/// Render a single pixel.
///
/// Averages `samples_per_pixel` traces; a single sample goes through the
/// pixel center so that one-sample renders are noise free.
pub fn render_pixel<I: Intersector + ?Sized>(
    camera: &Camera,
    intersector: &I,
    x: u32,
    y: u32,
    config: &RenderConfig,
    rng: &mut dyn RngCore,
) -> Color {
    let trace = |ray| ray_trace(intersector, ray, config.max_depth, config.enable_shadow);

    match config.samples_per_pixel {
        0 => Color::ZERO,
        1 => trace(camera.center_ray(x, y)),
        samples => {
            let sum: Color = (0..samples)
                .map(|_| trace(camera.jittered_ray(x, y, rng)))
                .sum();
            sum / samples as f32
        }
    }
}

/// Clamp to [0, 1], gamma encode and quantize a linear color.
pub fn color_to_rgba(color: Color) -> [u8; 4] {
    let encode = |c: f32| {
        let c = Interval::UNIT.clamp(c).powf(1.0 / DISPLAY_GAMMA);
        (255.0 * c).round() as u8
    };
    [encode(color.x), encode(color.y), encode(color.z), 255]
}

/// Linear-color image in row-major order, row 0 at the top.
#[derive(Debug, Clone)]
pub struct ImageBuffer {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<Color>,
}

impl ImageBuffer {
    /// Create a new image buffer filled with black.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Color::ZERO; width as usize * height as usize],
        }
    }

    /// Get the pixel at (x, y).
    pub fn get(&self, x: u32, y: u32) -> Color {
        self.pixels[self.offset(x, y)]
    }

    /// Set the pixel at (x, y).
    pub fn set(&mut self, x: u32, y: u32, color: Color) {
        let offset = self.offset(x, y);
        self.pixels[offset] = color;
    }

    /// Copy a rendered bucket into place.
    pub fn write_bucket(&mut self, result: &BucketResult) {
        let bucket = &result.bucket;
        for (i, color) in result.pixels.iter().enumerate() {
            let local_x = i as u32 % bucket.width;
            let local_y = i as u32 / bucket.width;
            self.set(bucket.x + local_x, bucket.y + local_y, *color);
        }
    }

    /// Convert to RGBA bytes (for display or saving).
    pub fn to_rgba(&self) -> Vec<u8> {
        self.pixels
            .iter()
            .flat_map(|color| color_to_rgba(*color))
            .collect()
    }

    /// Write the display-converted image as a PNG.
    pub fn save_png(&self, path: impl AsRef<Path>) -> RenderResult<()> {
        let path = path.as_ref();
        if self.pixels.len() != self.width as usize * self.height as usize {
            return Err(RenderError::SizeMismatch {
                width: self.width,
                height: self.height,
                pixels: self.pixels.len(),
            });
        }

        image::save_buffer_with_format(
            path,
            &self.to_rgba(),
            self.width,
            self.height,
            image::ColorType::Rgba8,
            image::ImageFormat::Png,
        )
        .map_err(|source| RenderError::Write {
            path: path.to_path_buf(),
            source,
        })?;

        log::info!("Wrote {}x{} image to {}", self.width, self.height, path.display());
        Ok(())
    }

    #[inline]
    fn offset(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }
}

/// Render the whole image.
///
/// The image takes the camera's resolution. Buckets are traced in
/// parallel; the result does not depend on the thread count.
pub fn render<I: Intersector + ?Sized>(
    camera: &Camera,
    intersector: &I,
    config: &RenderConfig,
) -> ImageBuffer {
    let start = Instant::now();
    let (width, height) = (camera.image_width, camera.image_height);
    let buckets = generate_buckets(width, height, DEFAULT_BUCKET_SIZE);

    log::info!(
        "Rendering {}x{} in {} buckets ({} spp, depth {}, shadows {})",
        width,
        height,
        buckets.len(),
        config.samples_per_pixel,
        config.max_depth,
        if config.enable_shadow { "on" } else { "off" }
    );

    let results: Vec<BucketResult> = buckets
        .par_iter()
        .map(|bucket| render_bucket(bucket, camera, intersector, config))
        .collect();

    let mut image = ImageBuffer::new(width, height);
    for result in &results {
        image.write_bucket(result);
    }

    log::info!("Render finished in {:.2?}", start.elapsed());
    image
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SceneIntersector;
    use glint_core::{Light, Material, Mesh, Scene};
    use glint_math::{Vec3, Vec4};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::sync::Arc;

    /// Large matte wall at z = -2 filling the default camera's view.
    fn wall_scene(ambient: Color) -> SceneIntersector {
        let mut scene = Scene::new(ambient);
        scene
            .add_model(
                "wall",
                Mesh::quad([
                    Vec3::new(-10.0, -10.0, -2.0),
                    Vec3::new(10.0, -10.0, -2.0),
                    Vec3::new(10.0, 10.0, -2.0),
                    Vec3::new(-10.0, 10.0, -2.0),
                ]),
                Arc::new(Material::solid("wall", Vec4::ONE, Vec4::ZERO)),
            )
            .unwrap();
        SceneIntersector::new(Arc::new(scene))
    }

    fn camera(width: u32, height: u32) -> Camera {
        let mut camera = Camera::new().with_resolution(width, height);
        camera.initialize();
        camera
    }

    #[test]
    fn test_render_config_defaults_from_partial_json() {
        let config: RenderConfig =
            serde_json::from_str(r#"{ "width": 32, "enable_shadow": false }"#).unwrap();
        assert_eq!(config.width, 32);
        assert!(!config.enable_shadow);
        assert_eq!(config.height, RenderConfig::default().height);
        assert_eq!(config.max_depth, RenderConfig::default().max_depth);

        assert!(serde_json::from_str::<RenderConfig>(r#"{ "widht": 32 }"#).is_err());
    }

    #[test]
    fn test_color_to_rgba() {
        assert_eq!(color_to_rgba(Color::ZERO), [0, 0, 0, 255]);
        assert_eq!(color_to_rgba(Color::ONE), [255, 255, 255, 255]);
        // Out of range values clamp
        assert_eq!(color_to_rgba(Color::new(-1.0, 4.0, 0.5)), [0, 255, 186, 255]);
    }

    #[test]
    fn test_render_pixel_ambient_wall() {
        let intersector = wall_scene(Color::new(0.25, 0.5, 1.0));
        let camera = camera(8, 8);
        let mut rng = StdRng::seed_from_u64(1);

        for samples in [1, 4] {
            let config = RenderConfig {
                samples_per_pixel: samples,
                ..RenderConfig::default()
            };
            let color = render_pixel(&camera, &intersector, 3, 5, &config, &mut rng);
            assert!((color - Color::new(0.25, 0.5, 1.0)).abs().max_element() < 1e-5);
        }
    }

    #[test]
    fn test_render_pixel_zero_samples_is_black() {
        let intersector = wall_scene(Color::ONE);
        let config = RenderConfig {
            samples_per_pixel: 0,
            ..RenderConfig::default()
        };
        let mut rng = StdRng::seed_from_u64(1);
        let color = render_pixel(&camera(4, 4), &intersector, 0, 0, &config, &mut rng);
        assert_eq!(color, Color::ZERO);
    }

    #[test]
    fn test_render_is_deterministic() {
        let mut scene = Scene::new(Color::splat(0.1));
        scene.add_light(Light::point(Vec3::new(0.5, 0.5, 0.0), Color::splat(2.0)));
        scene
            .add_model(
                "tri",
                Mesh::new(
                    vec![
                        Vec3::new(-1.0, -1.0, -2.0),
                        Vec3::new(1.0, -1.0, -2.0),
                        Vec3::new(0.0, 1.0, -2.0),
                    ],
                    vec![0, 1, 2],
                    None,
                ),
                Arc::new(Material::solid(
                    "tri",
                    Vec4::new(0.8, 0.3, 0.2, 1.0),
                    Vec4::new(0.5, 0.5, 0.5, 0.1),
                )),
            )
            .unwrap();
        let intersector = SceneIntersector::new(Arc::new(scene));

        let camera = camera(70, 40);
        let config = RenderConfig {
            samples_per_pixel: 3,
            seed: 11,
            ..RenderConfig::default()
        };

        let first = render(&camera, &intersector, &config);
        let second = render(&camera, &intersector, &config);
        assert_eq!((first.width, first.height), (70, 40));
        assert_eq!(first.pixels, second.pixels);

        // Something was hit, and the corners see only background
        assert!(first.pixels.iter().any(|c| c.max_element() > 0.0));
        assert_eq!(first.get(0, 0), Color::ZERO);
    }

    #[test]
    fn test_render_fills_every_pixel() {
        let intersector = wall_scene(Color::splat(0.5));
        let config = RenderConfig {
            samples_per_pixel: 1,
            ..RenderConfig::default()
        };
        let image = render(&camera(67, 13), &intersector, &config);

        assert_eq!(image.pixels.len(), 67 * 13);
        for color in &image.pixels {
            assert!((*color - Color::splat(0.5)).abs().max_element() < 1e-5);
        }
        assert_eq!(image.to_rgba().len(), 67 * 13 * 4);
    }

    #[test]
    fn test_image_buffer_write_bucket() {
        let mut image = ImageBuffer::new(4, 3);
        let bucket = generate_buckets(4, 3, 2)
            .into_iter()
            .find(|b| b.column == 1 && b.row == 1)
            .unwrap();
        let result = BucketResult {
            bucket,
            pixels: vec![Color::X, Color::Y],
        };
        image.write_bucket(&result);

        assert_eq!(image.get(2, 2), Color::X);
        assert_eq!(image.get(3, 2), Color::Y);
        assert_eq!(image.get(3, 1), Color::ZERO);
    }
}
