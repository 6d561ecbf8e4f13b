//! Window, event loop and per-frame work

use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use instant::Instant;
use modelview_gpu::{GpuContext, Renderer, SurfaceErrorAction};
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, Event, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop, EventLoopWindowTarget};
use winit::keyboard::PhysicalKey;
use winit::window::{Window, WindowBuilder};

use crate::config::ViewerConfig;
use crate::input::InputState;
use crate::ui::{UiAction, UiState};

/// Everything the running viewer owns
pub struct AppContext {
    window: Arc<Window>,
    gpu: GpuContext,
    renderer: Renderer,
    egui_ctx: egui::Context,
    egui_state: egui_winit::State,
    egui_renderer: egui_wgpu::Renderer,
    ui: UiState,
    input: InputState,
    config: ViewerConfig,
    last_frame: Instant,
}

impl AppContext {
    pub async fn new(window: Arc<Window>, config: ViewerConfig) -> Result<Self> {
        let gpu = GpuContext::new(window.clone())
            .await
            .context("failed to initialize the GPU")?;
        let (width, height) = gpu.size();
        let renderer = Renderer::new(&gpu, width, height, config.renderer_config())
            .context("failed to create the renderer")?;

        let egui_ctx = egui::Context::default();
        let egui_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &*window,
            Some(window.scale_factor() as f32),
            Some(gpu.device.limits().max_texture_dimension_2d as usize),
        );
        let egui_renderer = egui_wgpu::Renderer::new(&gpu.device, gpu.surface_format(), None, 1);

        let ui = UiState::new(&renderer, &config.default_models);

        let mut app = Self {
            window,
            gpu,
            renderer,
            egui_ctx,
            egui_state,
            egui_renderer,
            ui,
            input: InputState::new(),
            config,
            last_frame: Instant::now(),
        };

        if let Some(path) = app.config.initial_model.clone() {
            app.ui.model_path = path.display().to_string();
            app.load_model(&path);
        }
        Ok(app)
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    fn handle_window_event(&mut self, event: &WindowEvent, elwt: &EventLoopWindowTarget<()>) {
        let response = self.egui_state.on_window_event(&self.window, event);

        match event {
            WindowEvent::CloseRequested => elwt.exit(),
            WindowEvent::Resized(size) => self.resize(*size),
            WindowEvent::Focused(false) => self.input.release_all(),
            WindowEvent::KeyboardInput { event, .. } => {
                let pressed = event.state == ElementState::Pressed;
                // Releases always go through so no key stays held
                if let PhysicalKey::Code(code) = event.physical_key {
                    if !(pressed && response.consumed) {
                        self.input.handle_key(code, pressed);
                    }
                }
                if self.input.exit_requested() {
                    elwt.exit();
                }
            }
            WindowEvent::MouseInput { state, button, .. } => {
                let pressed = *state == ElementState::Pressed;
                if !(pressed && response.consumed) {
                    self.input.handle_mouse_button(*button, pressed);
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.input.handle_cursor_moved(position.x, position.y);
            }
            WindowEvent::RedrawRequested => {
                if let Err(e) = self.frame() {
                    log::error!("{e:#}");
                    elwt.exit();
                }
            }
            _ => {}
        }
    }

    fn resize(&mut self, size: PhysicalSize<u32>) {
        self.gpu.resize(size.width, size.height);
        self.renderer.set_resolution(&self.gpu, size.width, size.height);
    }

    /// Apply held keys and mouse drags scaled by the frame time
    fn apply_input(&mut self, dt: f32) {
        if !self.egui_ctx.wants_keyboard_input() {
            for movement in self.input.held_movements() {
                self.renderer.move_camera(&self.gpu, movement, dt);
            }
        }

        let (dx, dy) = self.input.take_look_delta();
        if (dx, dy) != (0.0, 0.0) && !self.egui_ctx.is_pointer_over_area() {
            let orbit = self.config.orbit_speed;
            self.renderer.look_around_camera(&self.gpu, orbit * dx, orbit * dy);
        }
    }

    fn apply(&mut self, action: UiAction) {
        match action {
            UiAction::LoadModel(path) => self.load_model(&path),
            UiAction::SetRenderMode(mode) => self.renderer.set_render_mode(mode),
            UiAction::SetFov(fov) => self.renderer.set_camera_fov(&self.gpu, fov),
            UiAction::SetMovementSpeed(speed) => self.renderer.set_camera_movement_speed(speed),
            UiAction::SetLookAroundSpeed(speed) => self.renderer.set_camera_look_around_speed(speed),
            UiAction::ResetCamera => self.renderer.reset_camera(&self.gpu),
        }
    }

    fn load_model(&mut self, path: &Path) {
        match self.renderer.load_model(&self.gpu, path) {
            Ok(report) => self.ui.report_loaded(path, &report),
            Err(e) => {
                log::error!("failed to load {}: {e}", path.display());
                self.ui.report_error(path, &e);
            }
        }
    }

    /// One frame: input, panel, model pass, panel pass, present
    fn frame(&mut self) -> Result<()> {
        let now = Instant::now();
        let dt = now.duration_since(self.last_frame).as_secs_f32();
        self.last_frame = now;
        self.apply_input(dt);

        let raw_input = self.egui_state.take_egui_input(&self.window);
        let stats = self.renderer.model_stats();
        let mut actions = Vec::new();
        let full_output = self.egui_ctx.run(raw_input, |ctx| {
            actions = self.ui.show(ctx, &self.config.default_models, stats);
        });
        self.egui_state
            .handle_platform_output(&self.window, full_output.platform_output);
        for action in actions {
            self.apply(action);
        }

        let frame = match self.gpu.acquire_frame()? {
            Ok(frame) => frame,
            Err(err) => match self.gpu.handle_surface_error(err) {
                SurfaceErrorAction::Fatal => bail!("surface out of memory"),
                SurfaceErrorAction::Reconfigured | SurfaceErrorAction::SkipFrame => return Ok(()),
            },
        };
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .gpu
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("frame encoder"),
            });
        self.renderer.render(&mut encoder, &view);

        let (width, height) = self.gpu.size();
        let screen = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [width, height],
            pixels_per_point: full_output.pixels_per_point,
        };
        let jobs = self
            .egui_ctx
            .tessellate(full_output.shapes, full_output.pixels_per_point);
        for (id, delta) in &full_output.textures_delta.set {
            self.egui_renderer
                .update_texture(&self.gpu.device, &self.gpu.queue, *id, delta);
        }
        let panel_commands = self.egui_renderer.update_buffers(
            &self.gpu.device,
            &self.gpu.queue,
            &mut encoder,
            &jobs,
            &screen,
        );

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("panel render pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            self.egui_renderer.render(&mut pass, &jobs, &screen);
        }

        self.gpu
            .queue
            .submit(panel_commands.into_iter().chain(std::iter::once(encoder.finish())));
        frame.present();

        for id in &full_output.textures_delta.free {
            self.egui_renderer.free_texture(id);
        }
        Ok(())
    }

    fn shutdown(&mut self) {
        self.renderer.destroy();
        log::info!("viewer closed");
    }
}

/// Open the window and run until it is closed
pub fn run(config: ViewerConfig) -> Result<()> {
    let event_loop = EventLoop::new().context("failed to create event loop")?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title(&config.title)
            .with_inner_size(PhysicalSize::new(config.width, config.height))
            .build(&event_loop)
            .context("failed to create window")?,
    );

    let mut app = pollster::block_on(AppContext::new(window, config))?;
    log::info!("window ready: {:?}", app.window().inner_size());

    event_loop
        .run(move |event, elwt| {
            elwt.set_control_flow(ControlFlow::Poll);
            match event {
                Event::WindowEvent { event, window_id } if window_id == app.window().id() => {
                    app.handle_window_event(&event, elwt);
                }
                Event::AboutToWait => app.window().request_redraw(),
                Event::LoopExiting => app.shutdown(),
                _ => {}
            }
        })
        .context("event loop failed")?;
    Ok(())
}
