//! glTF 2.0 support (`.gltf` and `.glb`)
//!
//! Geometry and buffers are read with the `gltf` crate. Images are left
//! on disk; base colour textures that point at external files are passed
//! through as diffuse texture paths. Node transforms are not applied.

use std::path::Path;

use gltf::image::Source;
use gltf::mesh::Mode;
use gltf::{buffer, Document};

use modelview_core::{Result, Scene, SceneMaterial, SceneMesh, SceneNode};

use crate::error::ImportError;
use crate::registry::SceneReader;

pub struct GltfReader;

impl SceneReader for GltfReader {
    fn read_scene(&self, path: &Path) -> Result<Scene> {
        if !path.exists() {
            return Err(ImportError::FileNotFound {
                path: path.display().to_string(),
            }
            .into());
        }

        let parse_error = |e: gltf::Error| ImportError::Parse {
            format: "glTF",
            path: path.display().to_string(),
            message: e.to_string(),
        };

        let gltf::Gltf { document, blob } = gltf::Gltf::open(path).map_err(parse_error)?;
        let buffers = gltf::import_buffers(&document, path.parent(), blob).map_err(parse_error)?;

        Ok(build_scene(&document, &buffers))
    }

    fn format_name(&self) -> &'static str {
        "glTF"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["gltf", "glb"]
    }
}

fn build_scene(document: &Document, buffers: &[buffer::Data]) -> Scene {
    let mut scene = Scene {
        materials: document.materials().map(convert_material).collect(),
        ..Default::default()
    };

    // Scene mesh indices for each glTF mesh, one entry per primitive
    let mut primitives_of: Vec<Vec<usize>> = Vec::with_capacity(document.meshes().len());
    for mesh in document.meshes() {
        let mut indices = Vec::new();
        for primitive in mesh.primitives() {
            if primitive.mode() != Mode::Triangles {
                log::warn!(
                    "mesh '{}': skipping primitive with mode {:?}",
                    mesh.name().unwrap_or_default(),
                    primitive.mode()
                );
                continue;
            }
            let Some(converted) = convert_primitive(&mesh, &primitive, buffers) else {
                continue;
            };
            indices.push(scene.meshes.len());
            scene.meshes.push(converted);
        }
        primitives_of.push(indices);
    }

    let mut root = SceneNode::new("root");
    if let Some(gltf_scene) = document.default_scene().or_else(|| document.scenes().next()) {
        root.name = gltf_scene.name().unwrap_or("root").to_string();
        for node in gltf_scene.nodes() {
            root.children.push(convert_node(&node, &primitives_of));
        }
    } else {
        // No scene declared: expose every mesh directly
        for indices in &primitives_of {
            root.meshes.extend_from_slice(indices);
        }
    }

    scene.root = Some(root);
    scene
}

fn convert_node(node: &gltf::Node, primitives_of: &[Vec<usize>]) -> SceneNode {
    let mut converted = SceneNode::new(node.name().unwrap_or_default());
    if let Some(mesh) = node.mesh() {
        converted.meshes.extend_from_slice(&primitives_of[mesh.index()]);
    }
    for child in node.children() {
        converted.children.push(convert_node(&child, primitives_of));
    }
    converted
}

fn convert_primitive(
    mesh: &gltf::Mesh,
    primitive: &gltf::Primitive,
    buffers: &[buffer::Data],
) -> Option<SceneMesh> {
    let reader = primitive.reader(|b| buffers.get(b.index()).map(|data| data.0.as_slice()));
    let positions: Vec<[f32; 3]> = reader.read_positions()?.collect();
    let normals = reader.read_normals().map(|it| it.collect());
    let tex_coords = reader.read_tex_coords(0).map(|it| it.into_f32().collect());

    let indices: Vec<u32> = match reader.read_indices() {
        Some(indices) => indices.into_u32().collect(),
        None => (0..positions.len() as u32).collect(),
    };

    Some(SceneMesh {
        name: mesh.name().unwrap_or_default().to_string(),
        positions,
        normals,
        tex_coords,
        faces: indices.chunks_exact(3).map(<[u32]>::to_vec).collect(),
        material: primitive.material().index(),
    })
}

fn convert_material(material: gltf::Material) -> SceneMaterial {
    let pbr = material.pbr_metallic_roughness();
    let [r, g, b, _] = pbr.base_color_factor();

    let mut diffuse_textures = Vec::new();
    if let Some(info) = pbr.base_color_texture() {
        match info.texture().source().source() {
            Source::Uri { uri, .. } if !uri.starts_with("data:") => {
                diffuse_textures.push(decode_uri(uri))
            }
            _ => log::warn!(
                "material '{}': embedded base colour textures are not supported",
                material.name().unwrap_or_default()
            ),
        }
    }

    SceneMaterial {
        name: material.name().unwrap_or_default().to_string(),
        diffuse: Some([r, g, b]),
        diffuse_textures,
        ..Default::default()
    }
}

/// Undo `%XX` escapes in a relative image URI so it can be used as a path.
/// Malformed escapes are kept as written.
fn decode_uri(uri: &str) -> String {
    let bytes = uri.as_bytes();
    let mut decoded = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        let escaped = (bytes[i] == b'%')
            .then(|| bytes.get(i + 1..i + 3))
            .flatten()
            .and_then(|hex| std::str::from_utf8(hex).ok())
            .and_then(|hex| u8::from_str_radix(hex, 16).ok());
        match escaped {
            Some(byte) => {
                decoded.push(byte);
                i += 3;
            }
            None => {
                decoded.push(bytes[i]);
                i += 1;
            }
        }
    }
    String::from_utf8_lossy(&decoded).into_owned()
}
