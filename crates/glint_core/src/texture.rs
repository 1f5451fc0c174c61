//! Texture loading, caching and filtered lookup.
//!
//! Texels are stored as RGBA floats in [0, 1] exactly as decoded from the
//! file. No color-space conversion happens here: albedo gamma decoding is
//! done by `Material::albedo`, and specular textures are used raw.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use glint_math::{Vec2, Vec4};
use thiserror::Error;

/// Errors that can occur during texture loading.
#[derive(Error, Debug)]
pub enum TextureError {
    #[error("Failed to load texture {path}: {source}")]
    Load {
        path: String,
        #[source]
        source: image::ImageError,
    },

    #[error("Invalid texture data: {0}")]
    InvalidData(String),
}

pub type TextureResult<T> = Result<T, TextureError>;

/// A loaded texture with pixel data.
///
/// Row 0 is the bottom row of the image so that `v = 0` samples the bottom
/// edge, matching OBJ texture coordinates.
#[derive(Clone, Debug)]
pub struct Texture {
    /// Texture width in pixels
    pub width: u32,

    /// Texture height in pixels
    pub height: u32,

    /// Pixel data, row-major, bottom row first
    pub pixels: Vec<Vec4>,

    /// Original file path (for debugging)
    pub path: String,
}

impl Texture {
    /// Create a new texture from pixel data.
    pub fn new(
        width: u32,
        height: u32,
        pixels: Vec<Vec4>,
        path: impl Into<String>,
    ) -> TextureResult<Self> {
        if width == 0 || height == 0 || pixels.len() != (width * height) as usize {
            return Err(TextureError::InvalidData(format!(
                "{} pixels for a {}x{} texture",
                pixels.len(),
                width,
                height
            )));
        }
        Ok(Self {
            width,
            height,
            pixels,
            path: path.into(),
        })
    }

    /// Create a solid color texture (1x1).
    pub fn solid_color(color: Vec4) -> Self {
        Self {
            width: 1,
            height: 1,
            pixels: vec![color],
            path: "<solid>".to_string(),
        }
    }

    /// Load a texture from an image file.
    pub fn load(path: impl AsRef<Path>) -> TextureResult<Self> {
        let path = path.as_ref();
        let img = image::open(path).map_err(|source| TextureError::Load {
            path: path.display().to_string(),
            source,
        })?;

        let rgba = image::imageops::flip_vertical(&img.to_rgba8());
        let (width, height) = rgba.dimensions();

        let pixels = rgba
            .pixels()
            .map(|p| {
                Vec4::new(
                    p[0] as f32 / 255.0,
                    p[1] as f32 / 255.0,
                    p[2] as f32 / 255.0,
                    p[3] as f32 / 255.0,
                )
            })
            .collect();

        Self::new(width, height, pixels, path.display().to_string())
    }

    /// Get texel at integer coordinates.
    #[inline]
    pub fn texel(&self, x: u32, y: u32) -> Vec4 {
        self.pixels[(y * self.width + x) as usize]
    }

    /// Sample the texture at `uv` with bilinear filtering.
    ///
    /// Coordinates wrap (repeat) in both directions, including across the
    /// border for the filter footprint. Texel centers sit at half-integer
    /// positions. Textures that are one texel wide or tall always return
    /// texel (0, 0).
    pub fn sample(&self, uv: Vec2) -> Vec4 {
        if self.width == 1 || self.height == 1 {
            return self.texel(0, 0);
        }

        // Floor-based fract so negative coordinates wrap instead of mirror
        let uv = uv - uv.floor();
        let x = uv.x * self.width as f32 - 0.5;
        let y = uv.y * self.height as f32 - 0.5;

        let xmin = wrap(x.floor(), self.width);
        let ymin = wrap(y.floor(), self.height);
        let xmax = (xmin + 1) % self.width;
        let ymax = (ymin + 1) % self.height;

        let xfrac = x - x.floor();
        let yfrac = y - y.floor();

        let left = self.texel(xmin, ymin).lerp(self.texel(xmin, ymax), yfrac);
        let right = self.texel(xmax, ymin).lerp(self.texel(xmax, ymax), yfrac);
        left.lerp(right, xfrac)
    }

    /// Get total size in bytes (approximate).
    pub fn size_bytes(&self) -> usize {
        self.pixels.len() * std::mem::size_of::<Vec4>()
    }
}

/// Map a floored texel coordinate (never below -1) into `[0, size)`.
#[inline]
fn wrap(coord: f32, size: u32) -> u32 {
    ((coord + size as f32) as u32) % size
}

/// Cache for loaded textures.
///
/// Textures are loaded on-demand and shared between materials.
pub struct TextureCache {
    /// Cached textures by file path
    textures: HashMap<String, Arc<Texture>>,

    /// Base directory for resolving relative paths
    base_dir: Option<PathBuf>,
}

impl TextureCache {
    /// Create a new empty texture cache.
    pub fn new() -> Self {
        Self {
            textures: HashMap::new(),
            base_dir: None,
        }
    }

    /// Create a texture cache with a base directory for relative paths.
    pub fn with_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            textures: HashMap::new(),
            base_dir: Some(base_dir.into()),
        }
    }

    /// Load a texture from file, using cache if available.
    pub fn load(&mut self, path: &str) -> TextureResult<Arc<Texture>> {
        if let Some(texture) = self.textures.get(path) {
            return Ok(texture.clone());
        }

        let full_path = self.resolve_path(path);
        let texture = Arc::new(Texture::load(&full_path)?);
        self.textures.insert(path.to_string(), texture.clone());

        log::debug!(
            "Loaded texture: {} ({}x{}, {:.1} KB)",
            path,
            texture.width,
            texture.height,
            texture.size_bytes() as f32 / 1024.0
        );

        Ok(texture)
    }

    /// Check if a texture is cached.
    pub fn is_cached(&self, path: &str) -> bool {
        self.textures.contains_key(path)
    }

    /// Get the number of cached textures.
    pub fn len(&self) -> usize {
        self.textures.len()
    }

    /// Check if cache is empty.
    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }

    /// Resolve a path relative to the base directory.
    fn resolve_path(&self, path: &str) -> PathBuf {
        let path = Path::new(path);

        match &self.base_dir {
            Some(base) if !path.is_absolute() => base.join(path),
            _ => path.to_path_buf(),
        }
    }
}

impl Default for TextureCache {
    fn default() -> Self {
        Self::new()
    }
}
