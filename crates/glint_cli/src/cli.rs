use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use glint_renderer::RenderConfig;
use log::LevelFilter;

/// Log levels selectable on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "glint")]
#[command(about = "Whitted-style ray tracer for triangle-mesh scenes")]
pub struct Args {
    /// Scene file (JSON). Renders the built-in Cornell box when omitted.
    pub scene: Option<PathBuf>,

    /// Render config file (JSON); flags below override it
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Output PNG path
    #[arg(short, long, default_value = "glint.png")]
    pub output: PathBuf,

    /// Image width in pixels
    #[arg(long)]
    pub width: Option<u32>,

    /// Image height in pixels
    #[arg(long)]
    pub height: Option<u32>,

    /// Samples per pixel
    #[arg(short, long)]
    pub samples: Option<u32>,

    /// Maximum bounces per path
    #[arg(short = 'd', long = "depth")]
    pub max_depth: Option<u32>,

    /// Disable shadow rays
    #[arg(long)]
    pub no_shadows: bool,

    /// Seed for sample jitter
    #[arg(long)]
    pub seed: Option<u64>,

    /// Logging level (RUST_LOG is used when omitted)
    #[arg(long, value_enum)]
    pub log_level: Option<LogLevel>,
}

impl Args {
    /// Overlay the command-line settings onto `config`.
    pub fn apply(&self, config: &mut RenderConfig) {
        if let Some(width) = self.width {
            config.width = width;
        }
        if let Some(height) = self.height {
            config.height = height;
        }
        if let Some(samples) = self.samples {
            config.samples_per_pixel = samples;
        }
        if let Some(depth) = self.max_depth {
            config.max_depth = depth;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if self.no_shadows {
            config.enable_shadow = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_config() {
        let args = Args::try_parse_from([
            "glint",
            "scene.json",
            "--width",
            "320",
            "-s",
            "4",
            "-d",
            "2",
            "--no-shadows",
            "--log-level",
            "debug",
        ])
        .unwrap();

        let mut config = RenderConfig {
            height: 99,
            seed: 5,
            ..RenderConfig::default()
        };
        args.apply(&mut config);

        assert_eq!(args.scene, Some(PathBuf::from("scene.json")));
        assert_eq!(config.width, 320);
        assert_eq!(config.height, 99);
        assert_eq!(config.samples_per_pixel, 4);
        assert_eq!(config.max_depth, 2);
        assert_eq!(config.seed, 5);
        assert!(!config.enable_shadow);
        assert_eq!(args.log_level, Some(LogLevel::Debug));
    }

    #[test]
    fn test_defaults_leave_config_alone() {
        let args = Args::try_parse_from(["glint"]).unwrap();
        assert!(args.scene.is_none());
        assert_eq!(args.output, PathBuf::from("glint.png"));

        let mut config = RenderConfig::default();
        args.apply(&mut config);
        assert_eq!(config, RenderConfig::default());
    }
}
