//! # modelview GPU
//!
//! wgpu resources for drawing imported models.
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use modelview_gpu::{GpuContext, Renderer, RendererConfig};
//!
//! async fn example() -> modelview_core::Result<()> {
//!     let ctx = GpuContext::headless().await?;
//!     let mut renderer = Renderer::new(&ctx, 800, 600, RendererConfig::default())?;
//!
//!     let report = renderer.load_model(&ctx, "model/cube.obj".as_ref())?;
//!     println!("{}", report.stats);
//!     Ok(())
//! }
//! ```

pub mod device;
pub mod texture;
pub mod shader;
pub mod targets;
pub mod mesh;
pub mod model;
pub mod renderer;

// Re-export commonly used items
pub use device::{GpuContext, SurfaceErrorAction};
pub use texture::Texture;
pub use shader::{Shader, ShaderLayouts, UniformBlock, UniformValue, MAX_TEXTURES_PER_KIND};
pub use targets::{RenderTargets, TargetFormats};
pub use mesh::{assign_texture_slots, MaterialBindings, Mesh, TextureSlots};
pub use model::{LoadReport, Model};
pub use renderer::{RenderMode, Renderer, RendererConfig};
