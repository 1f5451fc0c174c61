//! Built-in Cornell box, rendered when no scene file is given.

use std::sync::Arc;

use anyhow::Result;
use glint_core::{CameraSettings, Color, Light, LoadedScene, Material, Mesh, Scene};
use glint_math::{Vec3, Vec4};

/// Box spanning [-1, 1]^3, open toward +Z, with a mirror-finish floor, a
/// matte block and a tinted see-through panel.
pub fn cornell_box() -> Result<LoadedScene> {
    let mut scene = Scene::new(Color::splat(0.08))
        .with_light(Light::point(Vec3::new(0.0, 0.9, 0.2), Color::splat(1.4)))
        .with_light(Light::directional(Vec3::new(0.2, 0.4, 1.0), Color::splat(0.25)));

    let white = matte("white", Vec4::new(0.73, 0.73, 0.73, 1.0));
    let red = matte("red", Vec4::new(0.65, 0.05, 0.05, 1.0));
    let green = matte("green", Vec4::new(0.12, 0.45, 0.15, 1.0));
    let mirror_floor = Arc::new(Material::solid(
        "floor",
        Vec4::new(0.4, 0.4, 0.4, 1.0),
        Vec4::new(0.9, 0.9, 0.9, 0.25),
    ));
    let glass = Arc::new(Material::solid(
        "glass",
        Vec4::new(0.6, 0.8, 1.0, 0.35),
        Vec4::new(0.5, 0.5, 0.5, 0.5),
    ));

    let [x0, y0, z0] = [-1.0, -1.0, -1.0];
    let [x1, y1, z1] = [1.0, 1.0, 1.0];

    scene.add_model(
        "floor",
        Mesh::quad([
            Vec3::new(x0, y0, z1),
            Vec3::new(x1, y0, z1),
            Vec3::new(x1, y0, z0),
            Vec3::new(x0, y0, z0),
        ]),
        mirror_floor,
    )?;
    scene.add_model(
        "ceiling",
        Mesh::quad([
            Vec3::new(x0, y1, z0),
            Vec3::new(x1, y1, z0),
            Vec3::new(x1, y1, z1),
            Vec3::new(x0, y1, z1),
        ]),
        white.clone(),
    )?;
    scene.add_model(
        "back",
        Mesh::quad([
            Vec3::new(x0, y0, z0),
            Vec3::new(x1, y0, z0),
            Vec3::new(x1, y1, z0),
            Vec3::new(x0, y1, z0),
        ]),
        white.clone(),
    )?;
    scene.add_model(
        "left",
        Mesh::quad([
            Vec3::new(x0, y0, z0),
            Vec3::new(x0, y1, z0),
            Vec3::new(x0, y1, z1),
            Vec3::new(x0, y0, z1),
        ]),
        red,
    )?;
    scene.add_model(
        "right",
        Mesh::quad([
            Vec3::new(x1, y0, z1),
            Vec3::new(x1, y1, z1),
            Vec3::new(x1, y1, z0),
            Vec3::new(x1, y0, z0),
        ]),
        green,
    )?;

    scene.add_model(
        "block",
        cuboid(Vec3::new(0.15, -1.0, -0.7), Vec3::new(0.65, -0.1, -0.2)),
        white,
    )?;
    scene.add_model(
        "panel",
        Mesh::quad([
            Vec3::new(-0.75, -1.0, 0.2),
            Vec3::new(-0.1, -1.0, 0.2),
            Vec3::new(-0.1, -0.15, 0.2),
            Vec3::new(-0.75, -0.15, 0.2),
        ]),
        glass,
    )?;

    log::info!(
        "Built demo scene: {} models, {} triangles, {} lights",
        scene.model_count(),
        scene.triangle_count(),
        scene.lights.len()
    );

    Ok(LoadedScene {
        scene,
        camera: Some(CameraSettings {
            look_from: Vec3::new(0.0, 0.0, 3.8),
            look_at: Vec3::ZERO,
            up: Vec3::Y,
            vfov: 40.0,
        }),
    })
}

fn matte(name: &str, albedo: Vec4) -> Arc<Material> {
    Arc::new(Material::solid(name, albedo, Vec4::ZERO))
}

/// Axis-aligned box with outward-facing, counter-clockwise faces and
/// unshared corners, so computed normals stay flat.
fn cuboid(min: Vec3, max: Vec3) -> Mesh {
    let (x0, y0, z0) = (min.x, min.y, min.z);
    let (x1, y1, z1) = (max.x, max.y, max.z);

    let faces = [
        // +X
        [[x1, y0, z1], [x1, y0, z0], [x1, y1, z0], [x1, y1, z1]],
        // -X
        [[x0, y0, z0], [x0, y0, z1], [x0, y1, z1], [x0, y1, z0]],
        // +Y
        [[x0, y1, z1], [x1, y1, z1], [x1, y1, z0], [x0, y1, z0]],
        // -Y
        [[x0, y0, z0], [x1, y0, z0], [x1, y0, z1], [x0, y0, z1]],
        // +Z
        [[x0, y0, z1], [x1, y0, z1], [x1, y1, z1], [x0, y1, z1]],
        // -Z
        [[x1, y0, z0], [x0, y0, z0], [x0, y1, z0], [x1, y1, z0]],
    ];

    let mut positions = Vec::with_capacity(24);
    let mut indices = Vec::with_capacity(36);
    for face in faces {
        let base = positions.len() as u32;
        positions.extend(face.map(Vec3::from_array));
        indices.extend([0, 1, 2, 0, 2, 3].map(|i| base + i));
    }

    Mesh::new(positions, indices, None)
}
