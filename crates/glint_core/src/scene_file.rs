//! JSON scene descriptions.
//!
//! ```json
//! {
//!   "ambient": [0.05, 0.05, 0.05],
//!   "camera": { "look_from": [0, 1, 4], "look_at": [0, 1, 0], "vfov": 40 },
//!   "lights": [
//!     { "type": "point", "position": [0, 1.9, 0], "intensity": [2, 2, 2] }
//!   ],
//!   "models": [
//!     {
//!       "name": "bunny",
//!       "mesh": { "obj": "meshes/bunny.obj" },
//!       "albedo": { "texture": "textures/fur.png" },
//!       "specular": { "color": [0.2, 0.2, 0.2, 0.1] }
//!     },
//!     {
//!       "mesh": { "positions": [[0,0,0], [1,0,0], [0,1,0]], "indices": [0, 1, 2] },
//!       "albedo": { "color": [1, 1, 1, 0.5] }
//!     }
//!   ]
//! }
//! ```
//!
//! Relative mesh and texture paths resolve against the directory holding
//! the scene file.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use glint_math::{Color, Vec2, Vec3, Vec4};
use serde::Deserialize;
use thiserror::Error;

use crate::light::Light;
use crate::mesh::{Mesh, MeshError};
use crate::scene::{Material, Scene};
use crate::texture::{Texture, TextureCache, TextureError};

/// Errors that can occur while loading a scene file.
#[derive(Error, Debug)]
pub enum SceneError {
    #[error("IO error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Scene parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Mesh error in model '{model}': {source}")]
    Mesh {
        model: String,
        #[source]
        source: MeshError,
    },

    #[error("Texture error: {0}")]
    Texture(#[from] TextureError),

    #[error("Invalid camera: {0}")]
    InvalidCamera(String),
}

pub type SceneResult<T> = Result<T, SceneError>;

/// Viewpoint stored alongside a scene.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct CameraSettings {
    /// Eye position
    pub look_from: Vec3,

    /// Point the camera looks at
    pub look_at: Vec3,

    /// Up vector
    #[serde(default = "default_up")]
    pub up: Vec3,

    /// Vertical field of view in degrees
    #[serde(default = "default_vfov")]
    pub vfov: f32,
}

fn default_up() -> Vec3 {
    Vec3::Y
}

fn default_vfov() -> f32 {
    40.0
}

impl CameraSettings {
    /// Check that the settings define a usable view.
    ///
    /// Rejects non-finite values, an eye sitting on its target, an up
    /// vector parallel to the view direction, and a field of view outside
    /// (0, 180) degrees. Any of these would give non-finite ray directions.
    pub fn validate(&self) -> SceneResult<()> {
        let finite = self.look_from.is_finite()
            && self.look_at.is_finite()
            && self.up.is_finite()
            && self.vfov.is_finite();
        if !finite {
            return Err(SceneError::InvalidCamera(format!(
                "non-finite value in {self:?}"
            )));
        }

        let Some(forward) = (self.look_at - self.look_from).try_normalize() else {
            return Err(SceneError::InvalidCamera(format!(
                "look_from and look_at are both {}",
                self.look_from
            )));
        };
        if forward.cross(self.up).try_normalize().is_none() {
            return Err(SceneError::InvalidCamera(format!(
                "up {} is parallel to the view direction",
                self.up
            )));
        }
        if !(self.vfov > 0.0 && self.vfov < 180.0) {
            return Err(SceneError::InvalidCamera(format!(
                "vfov {} is outside (0, 180)",
                self.vfov
            )));
        }
        Ok(())
    }
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            look_from: Vec3::new(0.0, 0.0, 1.0),
            look_at: Vec3::ZERO,
            up: default_up(),
            vfov: default_vfov(),
        }
    }
}

/// Result of loading a scene file.
#[derive(Debug)]
pub struct LoadedScene {
    pub scene: Scene,

    /// Camera from the file, if it specified one
    pub camera: Option<CameraSettings>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SceneDesc {
    #[serde(default)]
    ambient: Color,
    #[serde(default)]
    camera: Option<CameraSettings>,
    #[serde(default)]
    lights: Vec<Light>,
    #[serde(default)]
    models: Vec<ModelDesc>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ModelDesc {
    #[serde(default)]
    name: Option<String>,
    mesh: MeshDesc,
    #[serde(default = "default_albedo")]
    albedo: ChannelDesc,
    #[serde(default = "default_specular")]
    specular: ChannelDesc,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum MeshDesc {
    Obj {
        obj: PathBuf,
    },
    Inline {
        positions: Vec<Vec3>,
        indices: Vec<u32>,
        #[serde(default)]
        normals: Option<Vec<Vec3>>,
        #[serde(default)]
        uvs: Option<Vec<Vec2>>,
    },
}

/// A material channel: constant RGBA or a texture file.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
enum ChannelDesc {
    Color(Vec4),
    Texture(String),
}

fn default_albedo() -> ChannelDesc {
    ChannelDesc::Color(Vec4::ONE)
}

fn default_specular() -> ChannelDesc {
    ChannelDesc::Color(Vec4::ZERO)
}

/// Load a scene from a JSON file.
pub fn load_scene(path: impl AsRef<Path>) -> SceneResult<LoadedScene> {
    let path = path.as_ref();
    let json = std::fs::read_to_string(path).map_err(|source| SceneError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    load_scene_from_str(&json, base_dir)
}

/// Load a scene from a JSON string, resolving relative paths against
/// `base_dir`.
pub fn load_scene_from_str(json: &str, base_dir: impl AsRef<Path>) -> SceneResult<LoadedScene> {
    let base_dir = base_dir.as_ref();
    let desc: SceneDesc = serde_json::from_str(json)?;
    if let Some(camera) = &desc.camera {
        camera.validate()?;
    }
    let mut textures = TextureCache::with_base_dir(base_dir);

    let mut scene = Scene::new(desc.ambient);
    scene.lights = desc.lights;

    for (index, model) in desc.models.into_iter().enumerate() {
        let name = model.name.unwrap_or_else(|| format!("model_{index}"));

        let mesh = match model.mesh {
            MeshDesc::Obj { obj } => Mesh::load_obj(base_dir.join(obj)),
            MeshDesc::Inline {
                positions,
                indices,
                normals,
                uvs,
            } => Ok(Mesh::new_with_uvs(positions, indices, normals, uvs)),
        };
        let mesh = mesh.map_err(|source| SceneError::Mesh {
            model: name.clone(),
            source,
        })?;

        let material = Material::new(
            name.clone(),
            load_channel(&model.albedo, &mut textures)?,
            load_channel(&model.specular, &mut textures)?,
        );

        scene
            .add_model(name.clone(), mesh, Arc::new(material))
            .map_err(|source| SceneError::Mesh {
                model: name,
                source,
            })?;
    }

    log::info!(
        "Loaded scene: {} models, {} triangles, {} lights, {} textures",
        scene.model_count(),
        scene.triangle_count(),
        scene.lights.len(),
        textures.len()
    );

    Ok(LoadedScene {
        scene,
        camera: desc.camera,
    })
}

fn load_channel(channel: &ChannelDesc, textures: &mut TextureCache) -> SceneResult<Arc<Texture>> {
    match channel {
        ChannelDesc::Color(color) => Ok(Arc::new(Texture::solid_color(*color))),
        ChannelDesc::Texture(path) => Ok(textures.load(path)?),
    }
}
