//! Depth and multisampled color attachments sized to the viewport

use crate::GpuContext;

/// Depth buffer format
pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Formats every render pipeline must agree with
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct TargetFormats {
    pub color: wgpu::TextureFormat,
    pub depth: wgpu::TextureFormat,
    pub sample_count: u32,
}

/// Offscreen attachments for the model pass
pub struct RenderTargets {
    formats: TargetFormats,
    size: (u32, u32),
    depth_view: wgpu::TextureView,
    /// Multisampled color target, resolved into the frame when present
    msaa_view: Option<wgpu::TextureView>,
}

impl RenderTargets {
    pub fn new(ctx: &GpuContext, formats: TargetFormats, width: u32, height: u32) -> Self {
        let size = (width.max(1), height.max(1));
        let (depth_view, msaa_view) = Self::create_views(ctx, &formats, size);
        Self {
            formats,
            size,
            depth_view,
            msaa_view,
        }
    }

    pub fn depth_view(&self) -> &wgpu::TextureView {
        &self.depth_view
    }

    /// Recreate the attachments when the size changed. Zero sizes are ignored.
    pub fn resize(&mut self, ctx: &GpuContext, width: u32, height: u32) {
        if width == 0 || height == 0 || (width, height) == self.size {
            return;
        }
        self.size = (width, height);
        let (depth_view, msaa_view) = Self::create_views(ctx, &self.formats, self.size);
        self.depth_view = depth_view;
        self.msaa_view = msaa_view;
    }

    /// Color attachment view and resolve target for drawing into `frame`
    pub fn color_attachment<'a>(
        &'a self,
        frame: &'a wgpu::TextureView,
    ) -> (&'a wgpu::TextureView, Option<&'a wgpu::TextureView>) {
        match &self.msaa_view {
            Some(msaa_view) => (msaa_view, Some(frame)),
            None => (frame, None),
        }
    }

    fn create_views(
        ctx: &GpuContext,
        formats: &TargetFormats,
        (width, height): (u32, u32),
    ) -> (wgpu::TextureView, Option<wgpu::TextureView>) {
        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };

        let depth = ctx.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("depth texture"),
            size,
            mip_level_count: 1,
            sample_count: formats.sample_count,
            dimension: wgpu::TextureDimension::D2,
            format: formats.depth,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });

        let msaa = (formats.sample_count > 1).then(|| {
            ctx.device.create_texture(&wgpu::TextureDescriptor {
                label: Some("msaa color texture"),
                size,
                mip_level_count: 1,
                sample_count: formats.sample_count,
                dimension: wgpu::TextureDimension::D2,
                format: formats.color,
                usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
                view_formats: &[],
            })
        });

        (
            depth.create_view(&wgpu::TextureViewDescriptor::default()),
            msaa.map(|texture| texture.create_view(&wgpu::TextureViewDescriptor::default())),
        )
    }
}
