use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use glint_core::{load_scene, CameraSettings, LoadedScene};
use glint_renderer::{render, Camera, RenderConfig, SceneIntersector};

mod cli;
mod demo;

use cli::Args;

fn main() -> Result<()> {
    let args = Args::parse();

    let mut logger = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info"),
    );
    if let Some(level) = args.log_level {
        logger.filter_level(level.into());
    }
    logger.init();

    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => RenderConfig::default(),
    };
    args.apply(&mut config);
    if config.width == 0 || config.height == 0 {
        bail!("image size must be non-zero, got {}x{}", config.width, config.height);
    }
    log::debug!("Render config: {:?}", config);

    let loaded = match &args.scene {
        Some(path) => load_scene(path)
            .with_context(|| format!("failed to load scene {}", path.display()))?,
        None => {
            log::info!("No scene given, rendering the built-in Cornell box");
            demo::cornell_box()?
        }
    };
    let LoadedScene { scene, camera } = loaded;

    let settings = camera.unwrap_or_else(|| {
        log::warn!("Scene has no camera, using the default view");
        CameraSettings::default()
    });
    let camera = Camera::from_settings(&settings, config.width, config.height);
    let intersector = SceneIntersector::new(Arc::new(scene));

    let image = render(&camera, &intersector, &config);
    image
        .save_png(&args.output)
        .with_context(|| format!("failed to save {}", args.output.display()))?;

    Ok(())
}

fn load_config(path: &Path) -> Result<RenderConfig> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    serde_json::from_str(&json).with_context(|| format!("invalid config {}", path.display()))
}
