//! Glint Renderer - Whitted-style CPU ray tracing.
//!
//! The kernel is two functions: [`intersect_triangle`] and [`ray_trace`].
//! The tracer only sees the scene through the [`Intersector`] trait;
//! [`SceneIntersector`] is the BVH-backed implementation over a
//! `glint_core::Scene`. Everything else (camera, buckets, image buffer)
//! drives the kernel to produce pictures.

mod bucket;
mod bvh;
mod camera;
mod intersector;
mod renderer;
mod scene_intersector;
mod tracer;
mod triangle;

pub use bucket::{generate_buckets, render_bucket, Bucket, BucketResult, DEFAULT_BUCKET_SIZE};
pub use bvh::BvhNode;
pub use camera::Camera;
pub use intersector::{Intersector, SurfaceHit, SHININESS_SCALE};
pub use renderer::{
    color_to_rgba, render, render_pixel, ImageBuffer, RenderConfig, RenderError, RenderResult,
};
pub use scene_intersector::SceneIntersector;
pub use tracer::{
    ray_trace, Bounce, PathTrace, REFLECTANCE_SCALE, SHADOW_BIAS, TRANSMISSION_THRESHOLD,
};
pub use triangle::{intersect_triangle, Intersection, TRIANGLE_EPSILON};

/// Re-export common math types from glint_math
pub use glint_math::{Color, Ray, Vec3, Vec4};
