//! GPU mesh: vertex and index buffers plus the material bind group

use modelview_core::{MeshData, Result, TextureKind};
use wgpu::util::DeviceExt;

use crate::shader::{
    material_bind_group_entries, material_bind_group_layout, Shader, UniformBlock, MATERIAL_GROUP,
    MATERIAL_LAYOUT, MAX_TEXTURES_PER_KIND,
};
use crate::texture::{create_sampler, upload_rgba, Texture};
use crate::GpuContext;

/// Shared resources every material bind group is built from
pub struct MaterialBindings {
    pub layout: wgpu::BindGroupLayout,
    pub sampler: wgpu::Sampler,
    /// Owns the 1x1 white image behind `fallback`, released on drop
    _fallback_texture: wgpu::Texture,
    /// Bound to unused texture slots
    fallback: wgpu::TextureView,
}

impl MaterialBindings {
    pub fn new(ctx: &GpuContext) -> Self {
        let white = image::RgbaImage::from_pixel(1, 1, image::Rgba([255, 255, 255, 255]));
        let (fallback_texture, fallback) = upload_rgba(ctx, "fallback texture", &white);
        Self {
            layout: material_bind_group_layout(ctx),
            sampler: create_sampler(&ctx.device),
            _fallback_texture: fallback_texture,
            fallback,
        }
    }
}

/// Model texture indices per slot, split by kind
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TextureSlots {
    /// `diffuse[n]` is bound to diffuse slot `n`
    pub diffuse: Vec<usize>,
    pub specular: Vec<usize>,
    /// References that did not fit in the available slots
    pub skipped: usize,
}

/// Assign referenced textures to slots in reference order, keeping a
/// running count per kind. `kinds[i]` is the kind of model texture `i`.
pub fn assign_texture_slots(texture_indices: &[usize], kinds: &[TextureKind]) -> TextureSlots {
    let mut slots = TextureSlots::default();
    for &index in texture_indices {
        let bucket = match kinds[index] {
            TextureKind::Diffuse => &mut slots.diffuse,
            TextureKind::Specular => &mut slots.specular,
        };
        if bucket.len() < MAX_TEXTURES_PER_KIND {
            bucket.push(index);
        } else {
            slots.skipped += 1;
        }
    }
    slots
}

/// Material block bytes for a mesh
pub fn material_block(data: &MeshData, slots: &TextureSlots) -> Result<UniformBlock> {
    let material = &data.material;
    let mut block = UniformBlock::new(&MATERIAL_LAYOUT);
    block.set("kd", material.diffuse)?;
    block.set("ks", material.specular)?;
    block.set("ka", material.ambient)?;
    block.set("shininess", material.shininess)?;
    block.set("hasDiffuseTextures", !slots.diffuse.is_empty())?;
    block.set("hasSpecularTextures", !slots.specular.is_empty())?;
    block.set("diffuseCount", slots.diffuse.len() as u32)?;
    block.set("specularCount", slots.specular.len() as u32)?;
    Ok(block)
}

/// Drawable mesh. GPU buffers are released on drop or by [`Mesh::destroy`].
pub struct Mesh {
    pub data: MeshData,
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    material_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    index_count: u32,
    destroyed: bool,
}

impl Mesh {
    /// Upload `data`; `textures` is the owning model's texture list
    pub fn new(
        ctx: &GpuContext,
        data: MeshData,
        textures: &[Texture],
        bindings: &MaterialBindings,
    ) -> Result<Self> {
        let vertex_buffer = ctx.create_buffer_init("mesh vertex buffer", &data.vertices, wgpu::BufferUsages::VERTEX);
        let index_buffer = ctx.create_buffer_init("mesh index buffer", &data.indices, wgpu::BufferUsages::INDEX);

        let kinds: Vec<TextureKind> = textures.iter().map(|t| t.kind).collect();
        let slots = assign_texture_slots(&data.texture_indices, &kinds);
        if slots.skipped > 0 {
            log::warn!(
                "mesh references more than {MAX_TEXTURES_PER_KIND} textures of one kind; {} skipped",
                slots.skipped
            );
        }

        let block = material_block(&data, &slots)?;
        let material_buffer = ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("material buffer"),
            contents: block.bytes(),
            usage: wgpu::BufferUsages::UNIFORM,
        });

        let views = |indices: &[usize]| {
            let mut views = [&bindings.fallback; MAX_TEXTURES_PER_KIND];
            for (slot, &index) in indices.iter().enumerate() {
                views[slot] = &textures[index].view;
            }
            views
        };
        let entries = material_bind_group_entries(
            &material_buffer,
            &bindings.sampler,
            &views(&slots.diffuse),
            &views(&slots.specular),
        );
        let bind_group = ctx.create_bind_group("material bind group", &bindings.layout, &entries);

        let index_count = data.indices.len() as u32;
        Ok(Self {
            data,
            vertex_buffer,
            index_buffer,
            material_buffer,
            bind_group,
            index_count,
            destroyed: false,
        })
    }

    /// One indexed triangle draw over the whole index buffer.
    ///
    /// The camera group is expected to be bound already.
    pub fn draw<'a>(&'a self, pass: &mut wgpu::RenderPass<'a>, shader: &'a Shader) {
        if self.destroyed || self.index_count == 0 {
            return;
        }
        pass.set_pipeline(shader.pipeline());
        pass.set_bind_group(MATERIAL_GROUP, &self.bind_group, &[]);
        pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        pass.draw_indexed(0..self.index_count, 0, 0..1);
    }

    /// Release the GPU buffers and clear the CPU copies. Safe to call twice.
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.vertex_buffer.destroy();
        self.index_buffer.destroy();
        self.material_buffer.destroy();
        self.data.vertices.clear();
        self.data.indices.clear();
        self.data.texture_indices.clear();
        self.index_count = 0;
        self.destroyed = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use modelview_core::Material;

    const D: TextureKind = TextureKind::Diffuse;
    const S: TextureKind = TextureKind::Specular;

    #[test]
    fn test_slots_follow_reference_order_per_kind() {
        let kinds = [D, S, D, S, D];
        let slots = assign_texture_slots(&[4, 1, 0, 3, 2], &kinds);
        assert_eq!(slots.diffuse, vec![4, 0, 2]);
        assert_eq!(slots.specular, vec![1, 3]);
        assert_eq!(slots.skipped, 0);
    }

    #[test]
    fn test_extra_textures_are_skipped() {
        let kinds = [D; 6];
        let slots = assign_texture_slots(&[0, 1, 2, 3, 4, 5], &kinds);
        assert_eq!(slots.diffuse, vec![0, 1, 2, 3]);
        assert_eq!(slots.skipped, 2);
        assert!(slots.specular.is_empty());
    }

    #[test]
    fn test_material_block_flags() {
        let data = MeshData {
            material: Material {
                diffuse: [0.5, 0.25, 1.0],
                shininess: 8.0,
                ..Default::default()
            },
            ..Default::default()
        };
        let slots = assign_texture_slots(&[0, 1], &[S, S]);
        let block = material_block(&data, &slots).unwrap();
        let bytes = block.bytes();

        let word = |offset: usize| u32::from_ne_bytes(bytes[offset..offset + 4].try_into().unwrap());
        assert_eq!(f32::from_bits(word(0)), 0.5);
        assert_eq!(f32::from_bits(word(12)), 8.0);
        assert_eq!(word(28), 0);
        assert_eq!(word(44), 1);
        assert_eq!(word(52), 2);
    }
}
