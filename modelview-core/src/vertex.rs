//! Vertex, material and texture kind types

use bytemuck::{Pod, Zeroable};

/// A mesh vertex as it is laid out in the GPU vertex buffer.
///
/// Attribute order is position (location 0), normal (location 1),
/// texture coordinates (location 2).
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub tex_coords: [f32; 2],
}

impl Vertex {
    /// Create a new vertex
    pub fn new(position: [f32; 3], normal: [f32; 3], tex_coords: [f32; 2]) -> Self {
        Self {
            position,
            normal,
            tex_coords,
        }
    }
}

/// Surface colors and shininess of a mesh
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Material {
    pub ambient: [f32; 3],
    pub diffuse: [f32; 3],
    pub specular: [f32; 3],
    pub shininess: f32,
}

/// Role of a texture within a material
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TextureKind {
    Diffuse,
    Specular,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertex_layout_is_tightly_packed() {
        assert_eq!(std::mem::size_of::<Vertex>(), 8 * std::mem::size_of::<f32>());
        assert_eq!(std::mem::offset_of!(Vertex, normal), 12);
        assert_eq!(std::mem::offset_of!(Vertex, tex_coords), 24);
    }

    #[test]
    fn test_material_default_is_black() {
        let material = Material::default();
        assert_eq!(material.diffuse, [0.0; 3]);
        assert_eq!(material.shininess, 0.0);
    }
}
