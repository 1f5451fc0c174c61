//! Bucket-based tile rendering.
//!
//! Divides the image into tiles (buckets) that can be rendered
//! independently and in parallel using rayon.

use glint_math::Color;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::intersector::Intersector;
use crate::renderer::{render_pixel, RenderConfig};
use crate::Camera;

/// A rectangular region of the image to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bucket {
    /// X coordinate of bucket's top-left corner
    pub x: u32,
    /// Y coordinate of bucket's top-left corner
    pub y: u32,
    /// Width of the bucket in pixels
    pub width: u32,
    /// Height of the bucket in pixels
    pub height: u32,
    /// Column of this bucket in the tile grid
    pub column: u32,
    /// Row of this bucket in the tile grid
    pub row: u32,
    /// Index of this bucket in the render order
    pub index: usize,
}

impl Bucket {
    /// Get the total number of pixels in this bucket.
    pub fn pixel_count(&self) -> u32 {
        self.width * self.height
    }

    /// RNG seed for this bucket.
    ///
    /// Depends only on `seed` and the grid position, never on render order
    /// or thread, so a render is reproducible.
    pub fn seed(&self, seed: u64) -> u64 {
        let cell = (u64::from(self.row) << 32) | u64::from(self.column);
        seed.wrapping_mul(0x9E37_79B9_7F4A_7C15) ^ cell
    }
}

/// Default bucket size in pixels.
pub const DEFAULT_BUCKET_SIZE: u32 = 64;

/// Generate buckets for an image, sorted in spiral order from center.
///
/// Edge buckets are clipped to the image. `bucket_size` of zero is
/// treated as one.
pub fn generate_buckets(width: u32, height: u32, bucket_size: u32) -> Vec<Bucket> {
    let bucket_size = bucket_size.max(1);
    let mut buckets = Vec::new();

    for (row, y) in (0..height).step_by(bucket_size as usize).enumerate() {
        for (column, x) in (0..width).step_by(bucket_size as usize).enumerate() {
            buckets.push(Bucket {
                x,
                y,
                width: bucket_size.min(width - x),
                height: bucket_size.min(height - y),
                column: column as u32,
                row: row as u32,
                index: 0,
            });
        }
    }

    sort_spiral(&mut buckets, width, height);

    for (i, bucket) in buckets.iter_mut().enumerate() {
        bucket.index = i;
    }

    buckets
}

/// Sort buckets by distance from image center (spiral order).
///
/// Ties keep grid order.
fn sort_spiral(buckets: &mut [Bucket], width: u32, height: u32) {
    let center_x = width as f32 / 2.0;
    let center_y = height as f32 / 2.0;

    let distance = |b: &Bucket| {
        let dx = b.x as f32 + b.width as f32 / 2.0 - center_x;
        let dy = b.y as f32 + b.height as f32 / 2.0 - center_y;
        dx * dx + dy * dy
    };

    buckets.sort_by(|a, b| {
        distance(a)
            .partial_cmp(&distance(b))
            .unwrap_or(std::cmp::Ordering::Equal)
    });
}

/// Result of rendering a bucket.
#[derive(Debug, Clone)]
pub struct BucketResult {
    /// The bucket that was rendered
    pub bucket: Bucket,
    /// Pixel colors in row-major order
    pub pixels: Vec<Color>,
}

/// Render a single bucket.
///
/// Returns pixels in row-major order within the bucket.
pub fn render_bucket<I: Intersector + ?Sized>(
    bucket: &Bucket,
    camera: &Camera,
    intersector: &I,
    config: &RenderConfig,
) -> BucketResult {
    let mut rng = StdRng::seed_from_u64(bucket.seed(config.seed));
    let mut pixels = Vec::with_capacity(bucket.pixel_count() as usize);

    for local_y in 0..bucket.height {
        for local_x in 0..bucket.width {
            pixels.push(render_pixel(
                camera,
                intersector,
                bucket.x + local_x,
                bucket.y + local_y,
                config,
                &mut rng,
            ));
        }
    }

    log::debug!(
        "Bucket {} ({}, {}) done: {} pixels",
        bucket.index,
        bucket.column,
        bucket.row,
        pixels.len()
    );

    BucketResult {
        bucket: *bucket,
        pixels,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_generate_buckets_exact_fit() {
        let buckets = generate_buckets(128, 128, 64);
        assert_eq!(buckets.len(), 4); // 2x2 grid

        let total_pixels: u32 = buckets.iter().map(|b| b.pixel_count()).sum();
        assert_eq!(total_pixels, 128 * 128);
    }

    #[test]
    fn test_generate_buckets_partial_fit() {
        let buckets = generate_buckets(100, 70, 64);
        assert_eq!(buckets.len(), 4); // 2x2 grid with clipped edges

        let total_pixels: u32 = buckets.iter().map(|b| b.pixel_count()).sum();
        assert_eq!(total_pixels, 100 * 70);

        let corner = buckets.iter().find(|b| b.column == 1 && b.row == 1).unwrap();
        assert_eq!((corner.x, corner.y, corner.width, corner.height), (64, 64, 36, 6));
    }

    #[test]
    fn test_buckets_cover_every_pixel_once() {
        let (width, height) = (37, 23);
        let buckets = generate_buckets(width, height, 8);

        let mut seen = HashSet::new();
        for b in &buckets {
            for y in b.y..b.y + b.height {
                for x in b.x..b.x + b.width {
                    assert!(seen.insert((x, y)), "pixel ({x}, {y}) covered twice");
                }
            }
        }
        assert_eq!(seen.len(), (width * height) as usize);
    }

    #[test]
    fn test_spiral_order() {
        let buckets = generate_buckets(192, 192, 64);
        assert_eq!(buckets.len(), 9); // 3x3 grid

        // First bucket should be the center one, corners come last
        assert_eq!((buckets[0].x, buckets[0].y), (64, 64));
        for b in &buckets[5..] {
            assert!(b.column != 1 && b.row != 1, "{b:?} is not a corner");
        }

        let indices: Vec<usize> = buckets.iter().map(|b| b.index).collect();
        assert_eq!(indices, (0..9).collect::<Vec<_>>());
    }

    #[test]
    fn test_empty_image_has_no_buckets() {
        assert!(generate_buckets(0, 10, 64).is_empty());
        assert!(generate_buckets(10, 0, 64).is_empty());
    }

    #[test]
    fn test_bucket_seeds_differ_by_position() {
        let buckets = generate_buckets(256, 256, 64);
        let seeds: HashSet<u64> = buckets.iter().map(|b| b.seed(1)).collect();
        assert_eq!(seeds.len(), buckets.len());

        // Same position, same seed
        assert_eq!(buckets[3].seed(9), buckets[3].seed(9));
        assert_ne!(buckets[3].seed(9), buckets[3].seed(10));
    }
}
