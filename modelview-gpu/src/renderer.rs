//! Model renderer: camera state, shader programs and the draw pass

use std::path::{Path, PathBuf};

use modelview_core::{CameraBlock, CameraMovement, Error, ModelStats, Result, ViewState};

use crate::device::GpuContext;
use crate::mesh::MaterialBindings;
use crate::model::{LoadReport, Model};
use crate::shader::{camera_bind_group_layout, Shader, ShaderLayouts, CAMERA_GROUP};
use crate::targets::{RenderTargets, TargetFormats, DEPTH_FORMAT};

/// Which fragment program the model is drawn with
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub enum RenderMode {
    Position,
    #[default]
    Normal,
    TexCoords,
    Diffuse,
    Specular,
}

impl RenderMode {
    pub const ALL: [RenderMode; 5] = [
        RenderMode::Position,
        RenderMode::Normal,
        RenderMode::TexCoords,
        RenderMode::Diffuse,
        RenderMode::Specular,
    ];

    pub fn label(self) -> &'static str {
        match self {
            RenderMode::Position => "position",
            RenderMode::Normal => "normal",
            RenderMode::TexCoords => "texcoords",
            RenderMode::Diffuse => "diffuse",
            RenderMode::Specular => "specular",
        }
    }

    /// File name of the fragment stage under the shader directory
    pub fn fragment_file(self) -> String {
        format!("{}.frag.wgsl", self.label())
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// File name of the vertex stage shared by every program
pub const VERTEX_SHADER_FILE: &str = "shader.vert.wgsl";

/// Renderer configuration
#[derive(Debug, Clone)]
pub struct RendererConfig {
    /// Directory holding the WGSL sources
    pub shader_dir: PathBuf,
    pub clear_color: [f64; 4],
    /// MSAA sample count; 1 disables multisampling
    pub sample_count: u32,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            shader_dir: PathBuf::from("shaders"),
            clear_color: [0.4, 0.4, 0.4, 1.0],
            sample_count: 4,
        }
    }
}

/// Draws one model with a free-flying camera
pub struct Renderer {
    config: RendererConfig,
    view: ViewState,
    model: Model,
    render_mode: RenderMode,
    /// One program per [`RenderMode`], in `RenderMode::ALL` order
    shaders: Vec<Shader>,
    camera_buffer: wgpu::Buffer,
    camera_bind_group: wgpu::BindGroup,
    materials: MaterialBindings,
    targets: RenderTargets,
}

impl Renderer {
    /// Compile all programs and allocate the camera block and attachments.
    ///
    /// Fails when any shader cannot be read, compiled or linked.
    pub fn new(ctx: &GpuContext, width: u32, height: u32, config: RendererConfig) -> Result<Self> {
        let formats = TargetFormats {
            color: ctx.surface_format(),
            depth: DEPTH_FORMAT,
            sample_count: config.sample_count.max(1),
        };

        let camera_layout = camera_bind_group_layout(ctx);
        let materials = MaterialBindings::new(ctx);
        let layouts = ShaderLayouts {
            camera: &camera_layout,
            material: &materials.layout,
        };

        let vertex_path = config.shader_dir.join(VERTEX_SHADER_FILE);
        let shaders = RenderMode::ALL
            .iter()
            .map(|mode| {
                let fragment_path = config.shader_dir.join(mode.fragment_file());
                Shader::from_files(ctx, &vertex_path, &fragment_path, layouts, &formats)
            })
            .collect::<Result<Vec<_>>>()?;
        log::debug!("compiled {} shader programs from {}", shaders.len(), config.shader_dir.display());

        let view = ViewState::new(width, height);
        let camera_buffer = ctx.create_buffer_init(
            "camera buffer",
            std::slice::from_ref(view.block()),
            wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::COPY_SRC,
        );
        let camera_bind_group = ctx.create_bind_group(
            "camera bind group",
            &camera_layout,
            &[wgpu::BindGroupEntry {
                binding: 0,
                resource: camera_buffer.as_entire_binding(),
            }],
        );

        let targets = RenderTargets::new(ctx, formats, width, height);

        Ok(Self {
            config,
            view,
            model: Model::default(),
            render_mode: RenderMode::default(),
            shaders,
            camera_buffer,
            camera_bind_group,
            materials,
            targets,
        })
    }

    /// Record the model pass into `encoder`, targeting `surface_view`
    pub fn render(&self, encoder: &mut wgpu::CommandEncoder, surface_view: &wgpu::TextureView) {
        let [r, g, b, a] = self.config.clear_color;
        let (view, resolve_target) = self.targets.color_attachment(surface_view);

        let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("model render pass"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view,
                resolve_target,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(wgpu::Color { r, g, b, a }),
                    store: wgpu::StoreOp::Store,
                },
            })],
            depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                view: self.targets.depth_view(),
                depth_ops: Some(wgpu::Operations {
                    load: wgpu::LoadOp::Clear(1.0),
                    store: wgpu::StoreOp::Store,
                }),
                stencil_ops: None,
            }),
            timestamp_writes: None,
            occlusion_query_set: None,
        });

        if !self.model.is_loaded() {
            return;
        }
        pass.set_bind_group(CAMERA_GROUP, &self.camera_bind_group, &[]);
        self.model.draw(&mut pass, self.shader());
    }

    /// Replace the current model with the one at `path`.
    ///
    /// The previous model is released first, so a failed load leaves nothing loaded.
    pub fn load_model(&mut self, ctx: &GpuContext, path: &Path) -> Result<LoadReport> {
        self.model.destroy();
        let (model, report) = Model::load(ctx, path, &self.materials)?;
        self.model = model;
        Ok(report)
    }

    pub fn set_resolution(&mut self, ctx: &GpuContext, width: u32, height: u32) {
        self.targets.resize(ctx, width, height);
        if self.view.set_resolution(width, height) {
            self.upload_camera(ctx);
        }
    }

    pub fn set_camera_fov(&mut self, ctx: &GpuContext, fov: f32) {
        if self.view.set_fov(fov) {
            self.upload_camera(ctx);
        }
    }

    pub fn move_camera(&mut self, ctx: &GpuContext, direction: CameraMovement, dt: f32) {
        if self.view.move_camera(direction, dt) {
            self.upload_camera(ctx);
        }
    }

    pub fn look_around_camera(&mut self, ctx: &GpuContext, d_phi: f32, d_theta: f32) {
        if self.view.look_around(d_phi, d_theta) {
            self.upload_camera(ctx);
        }
    }

    pub fn reset_camera(&mut self, ctx: &GpuContext) {
        if self.view.reset_camera() {
            self.upload_camera(ctx);
        }
    }

    pub fn camera_fov(&self) -> f32 {
        self.view.camera().fov
    }

    pub fn camera_movement_speed(&self) -> f32 {
        self.view.camera().movement_speed
    }

    pub fn set_camera_movement_speed(&mut self, speed: f32) {
        self.view.set_movement_speed(speed);
    }

    pub fn camera_look_around_speed(&self) -> f32 {
        self.view.camera().look_around_speed
    }

    pub fn set_camera_look_around_speed(&mut self, speed: f32) {
        self.view.set_look_around_speed(speed);
    }

    pub fn render_mode(&self) -> RenderMode {
        self.render_mode
    }

    pub fn set_render_mode(&mut self, mode: RenderMode) {
        self.render_mode = mode;
    }

    /// Program used by the active render mode
    pub fn shader(&self) -> &Shader {
        &self.shaders[self.render_mode.index()]
    }

    pub fn camera_block(&self) -> &CameraBlock {
        self.view.block()
    }

    pub fn is_model_loaded(&self) -> bool {
        self.model.is_loaded()
    }

    pub fn model_stats(&self) -> ModelStats {
        self.model.stats()
    }

    /// Release the model's GPU resources. The renderer stays usable and
    /// can load another model.
    pub fn destroy(&mut self) {
        self.model.destroy();
    }

    /// Copy the camera block back from the GPU
    #[doc(hidden)]
    pub fn read_camera_buffer(&self, ctx: &GpuContext) -> Result<CameraBlock> {
        let staging = ctx.device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("camera readback buffer"),
            size: CameraBlock::SIZE,
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let mut encoder = ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("camera readback encoder"),
            });
        encoder.copy_buffer_to_buffer(&self.camera_buffer, 0, &staging, 0, CameraBlock::SIZE);
        ctx.queue.submit(std::iter::once(encoder.finish()));

        let slice = staging.slice(..);
        let (sender, receiver) = flume::bounded(1);
        slice.map_async(wgpu::MapMode::Read, move |result| {
            let _ = sender.send(result);
        });
        let _ = ctx.device.poll(wgpu::Maintain::Wait);
        receiver
            .recv()
            .map_err(|_| Error::Gpu("camera readback was never mapped".to_string()))?
            .map_err(|e| Error::Gpu(format!("camera readback failed: {e}")))?;

        let block = bytemuck::pod_read_unaligned(&slice.get_mapped_range());
        staging.unmap();
        Ok(block)
    }

    /// Both matrices are written in one call
    fn upload_camera(&self, ctx: &GpuContext) {
        ctx.queue
            .write_buffer(&self.camera_buffer, 0, bytemuck::bytes_of(self.view.block()));
    }
}
