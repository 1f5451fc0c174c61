//! Triangle mesh geometry.
//!
//! Meshes are populated from Wavefront OBJ files or inline arrays (scene
//! files, procedural quads) and flattened into triangles by the renderer.

use std::path::Path;

use glint_math::{Aabb, Vec2, Vec3};
use thiserror::Error;

/// Errors that can occur while building or loading a mesh.
#[derive(Error, Debug)]
pub enum MeshError {
    #[error("OBJ load error: {0}")]
    Obj(#[from] tobj::LoadError),

    #[error("No geometry found in {0}")]
    Empty(String),

    #[error("Invalid mesh data: {0}")]
    InvalidData(String),
}

/// A mesh consisting of vertex positions, optional normals and UVs, and
/// triangle indices. Counter-clockwise winding is front-facing.
#[derive(Clone, Debug)]
pub struct Mesh {
    /// Vertex positions (one Vec3 per vertex)
    pub positions: Vec<Vec3>,

    /// Vertex normals (optional, one per vertex when present)
    pub normals: Option<Vec<Vec3>>,

    /// UV coordinates (optional, one per vertex when present)
    pub uvs: Option<Vec<Vec2>>,

    /// Triangle indices (every 3 indices form a triangle)
    pub indices: Vec<u32>,

    /// Axis-aligned bounding box
    pub bounds: Aabb,
}

impl Mesh {
    /// Create a new mesh from positions and indices, optionally with normals.
    ///
    /// Normals are not computed here. Call `ensure_normals()` if needed.
    pub fn new(positions: Vec<Vec3>, indices: Vec<u32>, normals: Option<Vec<Vec3>>) -> Self {
        Self::new_with_uvs(positions, indices, normals, None)
    }

    /// Create a new mesh with UV coordinates.
    pub fn new_with_uvs(
        positions: Vec<Vec3>,
        indices: Vec<u32>,
        normals: Option<Vec<Vec3>>,
        uvs: Option<Vec<Vec2>>,
    ) -> Self {
        let bounds = Self::compute_bounds(&positions);
        Self {
            positions,
            normals,
            uvs,
            indices,
            bounds,
        }
    }

    /// Two-triangle quad from four corners given counter-clockwise as seen
    /// from the front. UVs run (0,0), (1,0), (1,1), (0,1) over the corners.
    pub fn quad(corners: [Vec3; 4]) -> Self {
        let uvs = vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(0.0, 1.0),
        ];
        let mut mesh = Self::new_with_uvs(corners.to_vec(), vec![0, 1, 2, 0, 2, 3], None, Some(uvs));
        mesh.compute_normals();
        mesh
    }

    /// Load every object of an OBJ file into a single mesh.
    ///
    /// Faces are triangulated. Normals and texture coordinates are kept
    /// only when every object in the file provides them.
    pub fn load_obj(path: impl AsRef<Path>) -> Result<Self, MeshError> {
        let path = path.as_ref();
        let (models, _materials) = tobj::load_obj(
            path,
            &tobj::LoadOptions {
                single_index: true,
                triangulate: true,
                ..Default::default()
            },
        )?;

        if models.is_empty() {
            return Err(MeshError::Empty(path.display().to_string()));
        }

        let has_normals = models.iter().all(|m| !m.mesh.normals.is_empty());
        let has_uvs = models.iter().all(|m| !m.mesh.texcoords.is_empty());

        let mut positions = Vec::new();
        let mut normals = Vec::new();
        let mut uvs = Vec::new();
        let mut indices = Vec::new();

        for model in &models {
            let mesh = &model.mesh;
            let base = positions.len() as u32;

            positions.extend(mesh.positions.chunks_exact(3).map(|p| Vec3::new(p[0], p[1], p[2])));
            if has_normals {
                normals.extend(mesh.normals.chunks_exact(3).map(|n| Vec3::new(n[0], n[1], n[2])));
            }
            if has_uvs {
                uvs.extend(mesh.texcoords.chunks_exact(2).map(|t| Vec2::new(t[0], t[1])));
            }
            indices.extend(mesh.indices.iter().map(|i| base + i));
        }

        if indices.is_empty() {
            return Err(MeshError::Empty(path.display().to_string()));
        }

        log::info!(
            "Loaded {} ({} objects, {} triangles, normals: {}, uvs: {})",
            path.display(),
            models.len(),
            indices.len() / 3,
            has_normals,
            has_uvs
        );

        let mut mesh = Self::new_with_uvs(
            positions,
            indices,
            has_normals.then_some(normals),
            has_uvs.then_some(uvs),
        );
        mesh.ensure_normals();
        Ok(mesh)
    }

    /// Check index and attribute array consistency.
    pub fn validate(&self) -> Result<(), MeshError> {
        if self.indices.len() % 3 != 0 {
            return Err(MeshError::InvalidData(format!(
                "index count {} is not a multiple of 3",
                self.indices.len()
            )));
        }
        if let Some(uvs) = &self.uvs {
            if uvs.len() != self.positions.len() {
                return Err(MeshError::InvalidData(format!(
                    "{} uvs for {} vertices",
                    uvs.len(),
                    self.positions.len()
                )));
            }
        }
        Ok(())
    }

    /// Compute axis-aligned bounding box from positions.
    fn compute_bounds(positions: &[Vec3]) -> Aabb {
        if positions.is_empty() {
            return Aabb::EMPTY;
        }

        let mut min = Vec3::splat(f32::INFINITY);
        let mut max = Vec3::splat(f32::NEG_INFINITY);

        for pos in positions {
            min = min.min(*pos);
            max = max.max(*pos);
        }

        Aabb::from_points(min, max)
    }

    /// Compute smooth vertex normals by averaging face normals.
    ///
    /// Face normals are not normalized before accumulation, so larger faces
    /// weigh more.
    pub fn compute_normals(&mut self) {
        let vertex_count = self.positions.len();
        let mut normals = vec![Vec3::ZERO; vertex_count];

        for [i0, i1, i2] in self.triangle_indices() {
            let p0 = self.positions[i0];
            let p1 = self.positions[i1];
            let p2 = self.positions[i2];

            let face_normal = (p1 - p0).cross(p2 - p0);

            normals[i0] += face_normal;
            normals[i1] += face_normal;
            normals[i2] += face_normal;
        }

        for normal in &mut normals {
            *normal = normal.try_normalize().unwrap_or(Vec3::Y);
        }

        self.normals = Some(normals);
    }

    /// Check if the mesh has normals.
    pub fn has_normals(&self) -> bool {
        self.normals.is_some()
    }

    /// Check if the mesh has UV coordinates.
    pub fn has_uvs(&self) -> bool {
        self.uvs.is_some()
    }

    /// Ensure the mesh has one normal per vertex, computing smooth normals
    /// if they are missing or their count doesn't match.
    pub fn ensure_normals(&mut self) {
        let normal_count = self.normals.as_ref().map(Vec::len);
        match normal_count {
            Some(count) if count == self.positions.len() => {}
            Some(count) => {
                log::debug!(
                    "Normals array length ({}) doesn't match vertex count ({}), computing smooth normals",
                    count,
                    self.positions.len()
                );
                self.compute_normals();
            }
            None => self.compute_normals(),
        }
    }

    /// Get the number of triangles in the mesh.
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Get the number of vertices in the mesh.
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Iterate over valid triangles as vertex index triples.
    ///
    /// Triangles referencing a vertex out of range are skipped with a
    /// warning.
    pub fn triangle_indices(&self) -> impl Iterator<Item = [usize; 3]> + '_ {
        let vertex_count = self.positions.len();
        self.indices.chunks_exact(3).filter_map(move |chunk| {
            let tri = [chunk[0] as usize, chunk[1] as usize, chunk[2] as usize];
            if tri.iter().any(|&i| i >= vertex_count) {
                log::warn!(
                    "Invalid triangle indices: {:?}, vertex count: {}",
                    tri,
                    vertex_count
                );
                return None;
            }
            Some(tri)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_triangle() -> Mesh {
        let positions = vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        ];
        Mesh::new(positions, vec![0, 1, 2], None)
    }

    #[test]
    fn test_mesh_creation() {
        let mesh = unit_triangle();

        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.triangle_count(), 1);
        assert!(!mesh.has_normals());
        assert!(!mesh.has_uvs());
    }

    #[test]
    fn test_compute_normals_ccw() {
        // CCW when viewed from +Z, so the normal points toward +Z
        let mut mesh = unit_triangle();
        mesh.compute_normals();

        let normals = mesh.normals.as_ref().unwrap();
        for normal in normals {
            assert!((normal.z - 1.0).abs() < 0.001);
        }
    }

    #[test]
    fn test_ensure_normals_replaces_mismatched() {
        let mut mesh = unit_triangle();
        mesh.normals = Some(vec![Vec3::X]);
        mesh.ensure_normals();
        assert_eq!(mesh.normals.as_ref().unwrap().len(), 3);

        // Matching normals are left alone
        mesh.normals = Some(vec![Vec3::X; 3]);
        mesh.ensure_normals();
        assert_eq!(mesh.normals.unwrap()[0], Vec3::X);
    }

    #[test]
    fn test_bounds_computation() {
        let positions = vec![
            Vec3::new(-1.0, -2.0, -3.0),
            Vec3::new(4.0, 5.0, 6.0),
            Vec3::new(0.0, 0.0, 0.0),
        ];
        let mesh = Mesh::new(positions, vec![0, 1, 2], None);

        assert!((mesh.bounds.x.min - (-1.0)).abs() < 0.001);
        assert!((mesh.bounds.x.max - 4.0).abs() < 0.001);
        assert!((mesh.bounds.y.min - (-2.0)).abs() < 0.001);
        assert!((mesh.bounds.y.max - 5.0).abs() < 0.001);
        assert!((mesh.bounds.z.min - (-3.0)).abs() < 0.001);
        assert!((mesh.bounds.z.max - 6.0).abs() < 0.001);
    }

    #[test]
    fn test_triangle_indices_skips_invalid() {
        let positions = vec![Vec3::ZERO, Vec3::X, Vec3::Y, Vec3::ONE];
        // Second triangle references vertex 7
        let mesh = Mesh::new(positions, vec![0, 1, 2, 1, 7, 2, 1, 3, 2], None);

        let tris: Vec<_> = mesh.triangle_indices().collect();
        assert_eq!(tris, vec![[0, 1, 2], [1, 3, 2]]);
    }

    #[test]
    fn test_quad_faces_front() {
        // Floor quad facing +Y
        let quad = Mesh::quad([
            Vec3::new(-1.0, 0.0, 1.0),
            Vec3::new(1.0, 0.0, 1.0),
            Vec3::new(1.0, 0.0, -1.0),
            Vec3::new(-1.0, 0.0, -1.0),
        ]);

        assert_eq!(quad.triangle_count(), 2);
        assert!(quad.validate().is_ok());
        for n in quad.normals.as_ref().unwrap() {
            assert!((*n - Vec3::Y).length() < 1e-6);
        }
    }

    #[test]
    fn test_validate_rejects_bad_index_count() {
        let mesh = Mesh::new(vec![Vec3::ZERO, Vec3::X], vec![0, 1], None);
        assert!(matches!(mesh.validate(), Err(MeshError::InvalidData(_))));
    }
}
