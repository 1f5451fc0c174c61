//! Scene graph types for Glint.
//!
//! A scene is a flat list of models (mesh + material), an ordered list of
//! lights and an ambient term. It is immutable once handed to a renderer
//! and shared between worker threads behind an `Arc`.

use std::sync::Arc;

use glint_math::{Aabb, Color, Vec2, Vec4};

use crate::light::Light;
use crate::mesh::{Mesh, MeshError};
use crate::texture::Texture;

/// Exponent used to decode albedo texels into linear reflectance.
pub const ALBEDO_GAMMA: f32 = 2.2;

/// Surface appearance: an albedo texture and a "meta-spec" texture.
///
/// The albedo alpha channel encodes opacity; values below the
/// transmission threshold make the surface see-through. The meta-spec
/// texture holds the specular color in RGB and the shininess in A,
/// normalized so that 1.0 is the largest exponent.
#[derive(Clone, Debug)]
pub struct Material {
    /// Material name (for logging)
    pub name: String,

    /// Diffuse color (RGB) and opacity (A)
    pub albedo: Arc<Texture>,

    /// Specular color (RGB) and normalized shininess (A)
    pub meta_spec: Arc<Texture>,
}

impl Material {
    /// Create a material from two textures.
    pub fn new(name: impl Into<String>, albedo: Arc<Texture>, meta_spec: Arc<Texture>) -> Self {
        Self {
            name: name.into(),
            albedo,
            meta_spec,
        }
    }

    /// Create an untextured material from constant values.
    pub fn solid(name: impl Into<String>, albedo: Vec4, meta_spec: Vec4) -> Self {
        Self::new(
            name,
            Arc::new(Texture::solid_color(albedo)),
            Arc::new(Texture::solid_color(meta_spec)),
        )
    }

    /// Linear albedo at `uv`: RGB raised to `ALBEDO_GAMMA`, alpha kept as is.
    pub fn albedo(&self, uv: Vec2) -> Vec4 {
        let texel = self.albedo.sample(uv);
        texel.truncate().powf(ALBEDO_GAMMA).extend(texel.w)
    }

    /// Specular color and normalized shininess at `uv`.
    pub fn meta_spec(&self, uv: Vec2) -> Vec4 {
        self.meta_spec.sample(uv)
    }
}

impl Default for Material {
    fn default() -> Self {
        // Opaque grey, no highlight
        Self::solid("default", Vec4::new(0.5, 0.5, 0.5, 1.0), Vec4::ZERO)
    }
}

/// A mesh paired with the material it is shaded with.
#[derive(Clone, Debug)]
pub struct Model {
    /// Model name (from the scene file or builder)
    pub name: String,

    /// Geometry, with one normal per vertex
    pub mesh: Arc<Mesh>,

    /// Appearance
    pub material: Arc<Material>,
}

/// A renderable scene.
#[derive(Clone, Debug, Default)]
pub struct Scene {
    /// All models in the scene
    pub models: Vec<Model>,

    /// Lights, shaded in order
    pub lights: Vec<Light>,

    /// Ambient intensity added at every shaded point, scaled by albedo
    pub ambient_intensity: Color,
}

impl Scene {
    /// Create an empty scene with the given ambient intensity.
    pub fn new(ambient_intensity: Color) -> Self {
        Self {
            models: Vec::new(),
            lights: Vec::new(),
            ambient_intensity,
        }
    }

    /// Add a model. Missing or mismatched vertex normals are computed.
    ///
    /// Returns the model index.
    pub fn add_model(
        &mut self,
        name: impl Into<String>,
        mut mesh: Mesh,
        material: Arc<Material>,
    ) -> Result<usize, MeshError> {
        mesh.validate()?;
        mesh.ensure_normals();

        let id = self.models.len();
        self.models.push(Model {
            name: name.into(),
            mesh: Arc::new(mesh),
            material,
        });
        Ok(id)
    }

    /// Add a light after the existing ones.
    pub fn add_light(&mut self, light: Light) {
        self.lights.push(light);
    }

    /// Builder-style variant of `add_light`.
    pub fn with_light(mut self, light: Light) -> Self {
        self.add_light(light);
        self
    }

    /// Get the number of models.
    pub fn model_count(&self) -> usize {
        self.models.len()
    }

    /// Total triangle count across all models.
    pub fn triangle_count(&self) -> usize {
        self.models.iter().map(|m| m.mesh.triangle_count()).sum()
    }

    /// World-space bounds of all geometry.
    pub fn bounds(&self) -> Aabb {
        self.models
            .iter()
            .fold(Aabb::EMPTY, |acc, m| Aabb::surrounding(&acc, &m.mesh.bounds))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glint_math::Vec3;

    fn floor_quad() -> Mesh {
        Mesh::quad([
            Vec3::new(-1.0, 0.0, 1.0),
            Vec3::new(1.0, 0.0, 1.0),
            Vec3::new(1.0, 0.0, -1.0),
            Vec3::new(-1.0, 0.0, -1.0),
        ])
    }

    #[test]
    fn test_albedo_is_gamma_decoded() {
        let material = Material::solid("m", Vec4::new(0.5, 1.0, 0.0, 0.3), Vec4::ZERO);
        let albedo = material.albedo(Vec2::ZERO);

        assert!((albedo.x - 0.5f32.powf(2.2)).abs() < 1e-6);
        assert!((albedo.y - 1.0).abs() < 1e-6);
        assert_eq!(albedo.z, 0.0);
        // Opacity is not gamma decoded
        assert!((albedo.w - 0.3).abs() < 1e-6);
    }

    #[test]
    fn test_meta_spec_is_raw() {
        let material = Material::solid("m", Vec4::ONE, Vec4::new(0.5, 0.5, 0.5, 0.125));
        assert_eq!(material.meta_spec(Vec2::new(0.3, 0.7)), Vec4::new(0.5, 0.5, 0.5, 0.125));
    }

    #[test]
    fn test_scene_add_model_and_lights() {
        let mut scene = Scene::new(Color::splat(0.1))
            .with_light(Light::point(Vec3::new(0.0, 4.0, 0.0), Color::ONE));
        scene.add_light(Light::directional(Vec3::Y, Color::ONE));

        let mut mesh = floor_quad();
        mesh.normals = None;
        let id = scene
            .add_model("floor", mesh, Arc::new(Material::default()))
            .unwrap();

        assert_eq!(id, 0);
        assert_eq!(scene.model_count(), 1);
        assert_eq!(scene.triangle_count(), 2);
        assert_eq!(scene.lights.len(), 2);
        // Normals were filled in
        assert!(scene.models[0].mesh.has_normals());
        assert!((scene.bounds().x.max - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_scene_rejects_invalid_mesh() {
        let mut scene = Scene::default();
        let mesh = Mesh::new(vec![Vec3::ZERO, Vec3::X, Vec3::Y], vec![0, 1], None);
        assert!(scene
            .add_model("broken", mesh, Arc::new(Material::default()))
            .is_err());
        assert_eq!(scene.model_count(), 0);
    }
}
