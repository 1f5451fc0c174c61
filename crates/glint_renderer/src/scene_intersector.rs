//! BVH-backed [`Intersector`] over a `glint_core::Scene`.

use std::sync::Arc;

use glint_core::{Light, Scene};
use glint_math::{Aabb, Color, Ray, Vec2, Vec3};

use crate::bvh::BvhNode;
use crate::intersector::{Intersector, SurfaceHit};
use crate::triangle::{intersect_triangle, Intersection};

/// One scene triangle: owning model and vertex indices into its mesh.
#[derive(Debug, Clone, Copy)]
struct TriangleRef {
    model: usize,
    vertices: [usize; 3],
}

/// Scene geometry flattened into triangles under a BVH.
pub struct SceneIntersector {
    scene: Arc<Scene>,
    triangles: Vec<TriangleRef>,
    bvh: BvhNode,
}

impl SceneIntersector {
    /// Flatten every model of `scene` and build the BVH.
    pub fn new(scene: Arc<Scene>) -> Self {
        let start = std::time::Instant::now();

        let triangles: Vec<TriangleRef> = scene
            .models
            .iter()
            .enumerate()
            .flat_map(|(model, m)| {
                m.mesh
                    .triangle_indices()
                    .map(move |vertices| TriangleRef { model, vertices })
            })
            .collect();

        let bounds: Vec<Aabb> = triangles
            .iter()
            .map(|tri| {
                let [p1, p2, p3] = positions(&scene, tri);
                Aabb::from_triangle(p1, p2, p3)
            })
            .collect();

        let bvh = BvhNode::new(&bounds);

        log::info!(
            "Built BVH over {} triangles from {} models in {:.2?}",
            triangles.len(),
            scene.model_count(),
            start.elapsed()
        );

        Self {
            scene,
            triangles,
            bvh,
        }
    }

    /// The scene being queried.
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Number of triangles in the BVH.
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// Shading data for triangle `index` hit at `hit`.
    fn surface_at(&self, index: usize, ray: &Ray, hit: Intersection) -> SurfaceHit {
        let tri = &self.triangles[index];
        let model = &self.scene.models[tri.model];
        let mesh = &model.mesh;
        let [i1, i2, i3] = tri.vertices;

        // Models pushed past Scene::add_model may carry short attribute
        // arrays; those fall back to the face normal and zero UV
        let vertex_count = mesh.positions.len();
        let normal = match &mesh.normals {
            Some(normals) if normals.len() == vertex_count => {
                hit.interpolate(normals[i1], normals[i2], normals[i3])
            }
            _ => {
                let [p1, p2, p3] = positions(&self.scene, tri);
                (p2 - p1).cross(p3 - p1)
            }
        }
        .normalize();

        let uv = match &mesh.uvs {
            Some(uvs) if uvs.len() == vertex_count => hit.interpolate(uvs[i1], uvs[i2], uvs[i3]),
            _ => Vec2::ZERO,
        };

        SurfaceHit {
            position: ray.at(hit.t),
            normal,
            albedo: model.material.albedo(uv),
            meta_spec: model.material.meta_spec(uv),
        }
    }
}

/// World-space vertex positions of a triangle.
#[inline]
fn positions(scene: &Scene, tri: &TriangleRef) -> [Vec3; 3] {
    let p = &scene.models[tri.model].mesh.positions;
    let [i1, i2, i3] = tri.vertices;
    [p[i1], p[i2], p[i3]]
}

impl Intersector for SceneIntersector {
    fn intersect_ray(&self, ray: &Ray) -> Option<SurfaceHit> {
        let (index, hit) = self.bvh.nearest_hit(ray, |i| {
            let [p1, p2, p3] = positions(&self.scene, &self.triangles[i]);
            intersect_triangle(ray, p1, p2, p3)
        })?;
        Some(self.surface_at(index, ray, hit))
    }

    fn ambient_intensity(&self) -> Color {
        self.scene.ambient_intensity
    }

    fn lights(&self) -> &[Light] {
        &self.scene.lights
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glint_core::{Material, Mesh, Model};
    use glint_math::Vec4;

    fn quad_at_z(z: f32, albedo: Vec4) -> (Mesh, Arc<Material>) {
        let mesh = Mesh::quad([
            Vec3::new(-1.0, -1.0, z),
            Vec3::new(1.0, -1.0, z),
            Vec3::new(1.0, 1.0, z),
            Vec3::new(-1.0, 1.0, z),
        ]);
        (mesh, Arc::new(Material::solid("quad", albedo, Vec4::new(0.5, 0.5, 0.5, 0.25))))
    }

    fn two_quads() -> SceneIntersector {
        let mut scene = Scene::new(Color::splat(0.25));
        scene.add_light(Light::point(Vec3::new(0.0, 0.0, 3.0), Color::ONE));

        let (near, near_mat) = quad_at_z(-1.0, Vec4::new(1.0, 0.0, 0.0, 1.0));
        let (far, far_mat) = quad_at_z(-3.0, Vec4::new(0.0, 1.0, 0.0, 1.0));
        scene.add_model("far", far, far_mat).unwrap();
        scene.add_model("near", near, near_mat).unwrap();

        SceneIntersector::new(Arc::new(scene))
    }

    #[test]
    fn test_nearest_surface_wins() {
        let intersector = two_quads();
        assert_eq!(intersector.triangle_count(), 4);

        let ray = Ray::new(Vec3::new(0.25, 0.5, 2.0), Vec3::new(0.0, 0.0, -1.0));
        let hit = intersector.intersect_ray(&ray).unwrap();

        assert!((hit.position - Vec3::new(0.25, 0.5, -1.0)).length() < 1e-5);
        assert!((hit.normal - Vec3::Z).length() < 1e-5);
        assert_eq!(hit.albedo, Vec4::new(1.0, 0.0, 0.0, 1.0));
        assert_eq!(hit.meta_spec, Vec4::new(0.5, 0.5, 0.5, 0.25));
    }

    #[test]
    fn test_miss_outside_geometry() {
        let intersector = two_quads();
        let ray = Ray::new(Vec3::new(5.0, 0.0, 2.0), Vec3::new(0.0, 0.0, -1.0));
        assert!(intersector.intersect_ray(&ray).is_none());

        let ray = Ray::new(Vec3::new(0.0, 0.0, 2.0), Vec3::new(0.0, 0.0, 1.0));
        assert!(intersector.intersect_ray(&ray).is_none());
    }

    #[test]
    fn test_ray_starting_on_surface_skips_it() {
        let intersector = two_quads();
        let ray = Ray::new(Vec3::new(0.5, 0.5, -1.0), Vec3::new(0.0, 0.0, -1.0));
        let hit = intersector.intersect_ray(&ray).unwrap();
        assert!((hit.position.z + 3.0).abs() < 1e-5);
        assert_eq!(hit.albedo, Vec4::new(0.0, 1.0, 0.0, 1.0));
    }

    #[test]
    fn test_scene_accessors() {
        let intersector = two_quads();
        assert_eq!(intersector.ambient_intensity(), Color::splat(0.25));
        assert_eq!(intersector.lights().len(), 1);
        assert_eq!(intersector.scene().model_count(), 2);
    }

    #[test]
    fn test_interpolated_normal_is_unit() {
        let mut scene = Scene::default();
        let mesh = Mesh::new(
            vec![
                Vec3::new(-1.0, -1.0, 0.0),
                Vec3::new(1.0, -1.0, 0.0),
                Vec3::new(0.0, 1.0, 0.0),
            ],
            vec![0, 1, 2],
            Some(vec![Vec3::Z, Vec3::new(1.0, 0.0, 1.0).normalize(), Vec3::Z]),
        );
        scene
            .add_model("tri", mesh, Arc::new(Material::default()))
            .unwrap();
        let intersector = SceneIntersector::new(Arc::new(scene));

        let ray = Ray::new(Vec3::new(0.2, -0.5, 1.0), Vec3::new(0.0, 0.0, -1.0));
        let hit = intersector.intersect_ray(&ray).unwrap();
        assert!((hit.normal.length() - 1.0).abs() < 1e-5);
        // Leans toward the second vertex normal
        assert!(hit.normal.x > 0.0);
    }

    #[test]
    fn test_short_normals_fall_back_to_face_normal() {
        let mut scene = Scene::default();
        let (mut mesh, material) = quad_at_z(-1.0, Vec4::ONE);
        mesh.normals = Some(vec![Vec3::X]);
        mesh.uvs = Some(vec![Vec2::ONE]);
        scene.models.push(Model {
            name: "raw".to_string(),
            mesh: Arc::new(mesh),
            material,
        });
        let intersector = SceneIntersector::new(Arc::new(scene));

        let ray = Ray::new(Vec3::new(0.25, 0.5, 2.0), Vec3::new(0.0, 0.0, -1.0));
        let hit = intersector.intersect_ray(&ray).unwrap();
        assert!((hit.normal - Vec3::Z).length() < 1e-5);
    }

    #[test]
    fn test_empty_scene_never_hits() {
        let intersector = SceneIntersector::new(Arc::new(Scene::default()));
        assert!(intersector.intersect_ray(&Ray::default()).is_none());
    }
}
