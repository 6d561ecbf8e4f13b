//! Viewer configuration and command line

use std::path::PathBuf;

use clap::Parser;
use modelview_gpu::RendererConfig;

/// An entry of the panel's default model selector
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefaultModel {
    pub name: String,
    pub path: PathBuf,
}

impl DefaultModel {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }
}

/// Everything the application needs before the window opens
#[derive(Debug, Clone)]
pub struct ViewerConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub shader_dir: PathBuf,
    pub default_models: Vec<DefaultModel>,
    /// Loaded right after startup when set
    pub initial_model: Option<PathBuf>,
    /// Scale applied to mouse movement while looking around
    pub orbit_speed: f32,
    pub clear_color: [f64; 4],
    pub sample_count: u32,
    /// `env_logger` filter; `RUST_LOG` applies when unset
    pub log_filter: Option<String>,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        let renderer = RendererConfig::default();
        Self {
            title: "modelview".to_string(),
            width: 1600,
            height: 900,
            shader_dir: renderer.shader_dir,
            default_models: vec![
                DefaultModel::new("cube", "model/cube.obj"),
                DefaultModel::new("spot", "model/spot.obj"),
                DefaultModel::new("bob", "model/bob.obj"),
                DefaultModel::new("nilou", "model/nilou.obj"),
            ],
            initial_model: None,
            orbit_speed: 1.0,
            clear_color: renderer.clear_color,
            sample_count: renderer.sample_count,
            log_filter: None,
        }
    }
}

impl ViewerConfig {
    /// Apply command line overrides
    pub fn with_args(mut self, args: Args) -> Self {
        if let Some(width) = args.width {
            self.width = width;
        }
        if let Some(height) = args.height {
            self.height = height;
        }
        if let Some(shader_dir) = args.shader_dir {
            self.shader_dir = shader_dir;
        }
        if args.model.is_some() {
            self.initial_model = args.model;
        }
        if args.log.is_some() {
            self.log_filter = args.log;
        }
        self
    }

    pub fn renderer_config(&self) -> RendererConfig {
        RendererConfig {
            shader_dir: self.shader_dir.clone(),
            clear_color: self.clear_color,
            sample_count: self.sample_count,
        }
    }
}

/// Command line arguments
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "modelview")]
#[command(about = "Interactive 3D model viewer (OBJ, glTF)")]
pub struct Args {
    /// Model file to load on startup
    #[arg(long)]
    pub model: Option<PathBuf>,

    /// Window width in pixels
    #[arg(long)]
    pub width: Option<u32>,

    /// Window height in pixels
    #[arg(long)]
    pub height: Option<u32>,

    /// Directory containing the WGSL shaders
    #[arg(long)]
    pub shader_dir: Option<PathBuf>,

    /// Log filter, e.g. "info" or "modelview_gpu=debug,wgpu=warn"
    #[arg(long)]
    pub log: Option<String>,
}
