//! Shader programs, bind group layouts and uniform block packing
//!
//! Every shader program pairs the shared vertex stage with one fragment
//! stage. All programs use the same two bind groups:
//! - group 0: the camera block (view and projection), shared by all programs
//! - group 1: the per-mesh material block, sampler and texture slots

use std::num::NonZeroU64;
use std::path::Path;

use modelview_core::{CameraBlock, Error, Result, TextureKind, Vertex};

use crate::targets::TargetFormats;
use crate::GpuContext;

/// Texture slots available per texture kind in the material bind group
pub const MAX_TEXTURES_PER_KIND: usize = 4;

/// Bind group index of the camera block
pub const CAMERA_GROUP: u32 = 0;
/// Bind group index of the material resources
pub const MATERIAL_GROUP: u32 = 1;

const MATERIAL_UNIFORM_BINDING: u32 = 0;
const SAMPLER_BINDING: u32 = 1;
const FIRST_TEXTURE_BINDING: u32 = 2;

/// Binding of texture slot `slot` of the given kind within the material group
pub fn texture_binding(kind: TextureKind, slot: usize) -> u32 {
    let base = match kind {
        TextureKind::Diffuse => FIRST_TEXTURE_BINDING,
        TextureKind::Specular => FIRST_TEXTURE_BINDING + MAX_TEXTURES_PER_KIND as u32,
    };
    base + slot as u32
}

/// Type of a uniform field
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum UniformKind {
    Bool,
    Int,
    UInt,
    Float,
    Vec2,
    Vec3,
    Mat4,
}

impl UniformKind {
    /// Size in bytes inside a uniform buffer
    pub fn size(self) -> usize {
        match self {
            UniformKind::Bool | UniformKind::Int | UniformKind::UInt | UniformKind::Float => 4,
            UniformKind::Vec2 => 8,
            UniformKind::Vec3 => 12,
            UniformKind::Mat4 => 64,
        }
    }

    /// Required alignment inside a uniform buffer
    pub fn alignment(self) -> usize {
        match self {
            UniformKind::Bool | UniformKind::Int | UniformKind::UInt | UniformKind::Float => 4,
            UniformKind::Vec2 => 8,
            UniformKind::Vec3 | UniformKind::Mat4 => 16,
        }
    }
}

/// A value destined for a uniform field
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum UniformValue {
    Bool(bool),
    Int(i32),
    UInt(u32),
    Float(f32),
    Vec2([f32; 2]),
    Vec3([f32; 3]),
    /// Column-major
    Mat4([[f32; 4]; 4]),
}

impl UniformValue {
    pub fn kind(&self) -> UniformKind {
        match self {
            UniformValue::Bool(_) => UniformKind::Bool,
            UniformValue::Int(_) => UniformKind::Int,
            UniformValue::UInt(_) => UniformKind::UInt,
            UniformValue::Float(_) => UniformKind::Float,
            UniformValue::Vec2(_) => UniformKind::Vec2,
            UniformValue::Vec3(_) => UniformKind::Vec3,
            UniformValue::Mat4(_) => UniformKind::Mat4,
        }
    }

    /// Write the value's bytes to the start of `dst`
    pub fn write_into(&self, dst: &mut [u8]) {
        match self {
            UniformValue::Bool(v) => put(dst, &u32::from(*v)),
            UniformValue::Int(v) => put(dst, v),
            UniformValue::UInt(v) => put(dst, v),
            UniformValue::Float(v) => put(dst, v),
            UniformValue::Vec2(v) => put(dst, v),
            UniformValue::Vec3(v) => put(dst, v),
            UniformValue::Mat4(v) => put(dst, v),
        }
    }
}

fn put<T: bytemuck::Pod>(dst: &mut [u8], value: &T) {
    let bytes = bytemuck::bytes_of(value);
    dst[..bytes.len()].copy_from_slice(bytes);
}

impl From<bool> for UniformValue {
    fn from(v: bool) -> Self {
        UniformValue::Bool(v)
    }
}

impl From<u32> for UniformValue {
    fn from(v: u32) -> Self {
        UniformValue::UInt(v)
    }
}

impl From<f32> for UniformValue {
    fn from(v: f32) -> Self {
        UniformValue::Float(v)
    }
}

impl From<[f32; 3]> for UniformValue {
    fn from(v: [f32; 3]) -> Self {
        UniformValue::Vec3(v)
    }
}

/// A named field at a fixed byte offset
#[derive(Debug, Copy, Clone)]
pub struct UniformField {
    pub name: &'static str,
    pub kind: UniformKind,
    pub offset: usize,
}

/// Byte layout of a uniform block, matching the WGSL struct declaration
#[derive(Debug)]
pub struct UniformLayout {
    pub name: &'static str,
    pub fields: &'static [UniformField],
    pub size: usize,
}

impl UniformLayout {
    pub fn field(&self, name: &str) -> Option<&UniformField> {
        self.fields.iter().find(|f| f.name == name)
    }
}

const fn field(name: &'static str, kind: UniformKind, offset: usize) -> UniformField {
    UniformField { name, kind, offset }
}

/// Material block read by every fragment stage
pub static MATERIAL_LAYOUT: UniformLayout = UniformLayout {
    name: "Material",
    fields: &[
        field("kd", UniformKind::Vec3, 0),
        field("shininess", UniformKind::Float, 12),
        field("ks", UniformKind::Vec3, 16),
        field("hasDiffuseTextures", UniformKind::Bool, 28),
        field("ka", UniformKind::Vec3, 32),
        field("hasSpecularTextures", UniformKind::Bool, 44),
        field("diffuseCount", UniformKind::UInt, 48),
        field("specularCount", UniformKind::UInt, 52),
    ],
    size: 64,
};

/// CPU copy of a uniform block's bytes
#[derive(Debug, Clone)]
pub struct UniformBlock {
    layout: &'static UniformLayout,
    data: Vec<u8>,
}

impl UniformBlock {
    /// Zero-initialized block
    pub fn new(layout: &'static UniformLayout) -> Self {
        Self {
            layout,
            data: vec![0; layout.size],
        }
    }

    /// Set a field by name. Fails on unknown names and mismatched types.
    pub fn set(&mut self, name: &str, value: impl Into<UniformValue>) -> Result<()> {
        let value = value.into();
        let field = self.layout.field(name).ok_or_else(|| {
            Error::Shader(format!("uniform block {} has no field '{name}'", self.layout.name))
        })?;
        if field.kind != value.kind() {
            return Err(Error::Shader(format!(
                "uniform {}.{name} is {:?}, got {:?}",
                self.layout.name,
                field.kind,
                value.kind()
            )));
        }
        value.write_into(&mut self.data[field.offset..field.offset + field.kind.size()]);
        Ok(())
    }

    pub fn bytes(&self) -> &[u8] {
        &self.data
    }
}

/// Bind group layouts every shader program is linked against
#[derive(Copy, Clone)]
pub struct ShaderLayouts<'a> {
    pub camera: &'a wgpu::BindGroupLayout,
    pub material: &'a wgpu::BindGroupLayout,
}

/// Layout of group 0: the camera block, visible to both stages
pub fn camera_bind_group_layout(ctx: &GpuContext) -> wgpu::BindGroupLayout {
    ctx.create_bind_group_layout(
        "camera bind group layout",
        &[wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: NonZeroU64::new(CameraBlock::SIZE),
            },
            count: None,
        }],
    )
}

/// Layout of group 1: material block, sampler, then diffuse and specular slots
pub fn material_bind_group_layout(ctx: &GpuContext) -> wgpu::BindGroupLayout {
    let mut entries = vec![
        wgpu::BindGroupLayoutEntry {
            binding: MATERIAL_UNIFORM_BINDING,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: NonZeroU64::new(MATERIAL_LAYOUT.size as u64),
            },
            count: None,
        },
        wgpu::BindGroupLayoutEntry {
            binding: SAMPLER_BINDING,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
            count: None,
        },
    ];
    for kind in [TextureKind::Diffuse, TextureKind::Specular] {
        for slot in 0..MAX_TEXTURES_PER_KIND {
            entries.push(wgpu::BindGroupLayoutEntry {
                binding: texture_binding(kind, slot),
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    view_dimension: wgpu::TextureViewDimension::D2,
                    multisampled: false,
                },
                count: None,
            });
        }
    }
    ctx.create_bind_group_layout("material bind group layout", &entries)
}

/// Entries for the material bind group: uniform buffer, sampler and
/// one view per texture binding
pub fn material_bind_group_entries<'a>(
    uniform: &'a wgpu::Buffer,
    sampler: &'a wgpu::Sampler,
    diffuse: &[&'a wgpu::TextureView; MAX_TEXTURES_PER_KIND],
    specular: &[&'a wgpu::TextureView; MAX_TEXTURES_PER_KIND],
) -> Vec<wgpu::BindGroupEntry<'a>> {
    let mut entries = vec![
        wgpu::BindGroupEntry {
            binding: MATERIAL_UNIFORM_BINDING,
            resource: uniform.as_entire_binding(),
        },
        wgpu::BindGroupEntry {
            binding: SAMPLER_BINDING,
            resource: wgpu::BindingResource::Sampler(sampler),
        },
    ];
    for (kind, views) in [(TextureKind::Diffuse, diffuse), (TextureKind::Specular, specular)] {
        for (slot, &view) in views.iter().enumerate() {
            entries.push(wgpu::BindGroupEntry {
                binding: texture_binding(kind, slot),
                resource: wgpu::BindingResource::TextureView(view),
            });
        }
    }
    entries
}

/// A linked vertex + fragment program as a render pipeline
pub struct Shader {
    label: String,
    pipeline: wgpu::RenderPipeline,
}

impl Shader {
    /// Read both WGSL stages from disk and link them.
    ///
    /// Entry points are `vs_main` and `fs_main`.
    pub fn from_files(
        ctx: &GpuContext,
        vertex_path: &Path,
        fragment_path: &Path,
        layouts: ShaderLayouts<'_>,
        formats: &TargetFormats,
    ) -> Result<Self> {
        let read = |path: &Path| {
            std::fs::read_to_string(path)
                .map_err(|e| Error::Shader(format!("failed to read {}: {e}", path.display())))
        };
        let vertex_source = read(vertex_path)?;
        let fragment_source = read(fragment_path)?;

        let label = fragment_path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| fragment_path.display().to_string());
        Self::from_sources(ctx, &label, &vertex_source, &fragment_source, layouts, formats)
    }

    /// Compile and link WGSL sources
    pub fn from_sources(
        ctx: &GpuContext,
        label: &str,
        vertex_source: &str,
        fragment_source: &str,
        layouts: ShaderLayouts<'_>,
        formats: &TargetFormats,
    ) -> Result<Self> {
        let vertex = ctx.create_shader_module(&format!("{label} vertex"), vertex_source)?;
        let fragment = ctx.create_shader_module(&format!("{label} fragment"), fragment_source)?;

        ctx.device.push_error_scope(wgpu::ErrorFilter::Validation);
        let pipeline_layout = ctx.device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some(&format!("{label} pipeline layout")),
            bind_group_layouts: &[layouts.camera, layouts.material],
            push_constant_ranges: &[],
        });

        let pipeline = ctx.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(&format!("{label} pipeline")),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &vertex,
                entry_point: "vs_main",
                buffers: &[vertex_layout()],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &fragment,
                entry_point: "fs_main",
                targets: &[Some(wgpu::ColorTargetState {
                    format: formats.color,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                unclipped_depth: false,
                polygon_mode: wgpu::PolygonMode::Fill,
                conservative: false,
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: formats.depth,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState {
                count: formats.sample_count,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            multiview: None,
        });

        if let Some(err) = pollster::block_on(ctx.device.pop_error_scope()) {
            return Err(Error::Shader(format!("failed to link {label}: {err}")));
        }

        Ok(Self {
            label: label.to_string(),
            pipeline,
        })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn pipeline(&self) -> &wgpu::RenderPipeline {
        &self.pipeline
    }
}

/// Vertex buffer layout matching [`Vertex`]
pub fn vertex_layout() -> wgpu::VertexBufferLayout<'static> {
    const ATTRIBUTES: [wgpu::VertexAttribute; 3] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3, 2 => Float32x2];
    wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &ATTRIBUTES,
    }
}
