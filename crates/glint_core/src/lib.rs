//! Glint Core - scene model for the Glint ray tracer.
//!
//! This crate provides:
//!
//! - **Geometry**: `Mesh` triangle meshes, loaded from OBJ or built inline
//! - **Appearance**: `Texture` with wrap-around bilinear lookup, `Material`
//! - **Lighting**: point and directional `Light`s plus an ambient term
//! - **Scene files**: JSON scene descriptions via `load_scene`
//!
//! # Example
//!
//! ```ignore
//! use glint_core::load_scene;
//!
//! let loaded = load_scene("cornell.json")?;
//! println!("Loaded {} models, {} lights",
//!     loaded.scene.model_count(),
//!     loaded.scene.lights.len());
//! ```

pub mod light;
pub mod mesh;
pub mod scene;
pub mod scene_file;
pub mod texture;

// Re-export commonly used types
pub use glint_math::Color;
pub use light::Light;
pub use mesh::{Mesh, MeshError};
pub use scene::{Material, Model, Scene};
pub use scene_file::{
    load_scene, load_scene_from_str, CameraSettings, LoadedScene, SceneError, SceneResult,
};
pub use texture::{Texture, TextureCache, TextureError, TextureResult};
