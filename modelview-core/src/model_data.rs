//! Flattening of an imported scene graph into drawable mesh data
//!
//! The scene tree is walked depth-first. Every mesh attached to every node
//! becomes its own [`MeshData`]; textures are merged across the whole model
//! by their resolved file path.

use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::scene::{Scene, SceneMaterial, SceneMesh};
use crate::vertex::{Material, TextureKind, Vertex};

/// A texture file referenced by the model
#[derive(Debug, Clone, PartialEq)]
pub struct TextureSource {
    /// Resolved path, also the deduplication key
    pub path: PathBuf,
    pub kind: TextureKind,
}

/// One contiguous triangle batch
#[derive(Debug, Clone, Default)]
pub struct MeshData {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
    pub material: Material,
    /// Indices into [`ModelData::textures`], diffuse textures first
    pub texture_indices: Vec<usize>,
}

impl MeshData {
    /// Number of triangles
    pub fn face_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// Summary numbers for a loaded model
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ModelStats {
    pub meshes: usize,
    pub vertices: usize,
    pub faces: usize,
    pub textures: usize,
}

impl std::fmt::Display for ModelStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} meshes, {} vertices, {} faces, {} textures",
            self.meshes, self.vertices, self.faces, self.textures
        )
    }
}

/// CPU-side model: a flat mesh list plus a deduplicated texture list
#[derive(Debug, Clone, Default)]
pub struct ModelData {
    pub meshes: Vec<MeshData>,
    pub textures: Vec<TextureSource>,
}

impl ModelData {
    /// Flatten `scene` into meshes. Texture paths are resolved against `base_dir`.
    pub fn from_scene(scene: &Scene, base_dir: &Path) -> Result<Self> {
        scene.validate()?;

        let mut model = ModelData::default();
        let mut skipped_faces = 0usize;

        scene.root()?.walk(&mut |node| {
            for &mesh_index in &node.meshes {
                let mesh = &scene.meshes[mesh_index];
                let material = mesh.material.map(|m| &scene.materials[m]);
                let (data, skipped) = model.convert_mesh(mesh, material, base_dir);
                skipped_faces += skipped;
                model.meshes.push(data);
            }
        });

        if skipped_faces > 0 {
            log::debug!("skipped {skipped_faces} non-triangle faces while flattening");
        }

        Ok(model)
    }

    /// True when the model has no meshes
    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }

    /// Position of `path` in the texture list
    pub fn texture_index(&self, path: &Path) -> Option<usize> {
        self.textures.iter().position(|t| t.path == path)
    }

    /// Summary counts
    pub fn stats(&self) -> ModelStats {
        ModelStats {
            meshes: self.meshes.len(),
            vertices: self.meshes.iter().map(|m| m.vertices.len()).sum(),
            faces: self.meshes.iter().map(MeshData::face_count).sum(),
            textures: self.textures.len(),
        }
    }

    fn convert_mesh(
        &mut self,
        mesh: &SceneMesh,
        material: Option<&SceneMaterial>,
        base_dir: &Path,
    ) -> (MeshData, usize) {
        let vertices = (0..mesh.positions.len())
            .map(|i| {
                let normal = mesh
                    .normals
                    .as_ref()
                    .map_or([0.0; 3], |normals| normals[i]);
                let tex_coords = mesh
                    .tex_coords
                    .as_ref()
                    .map_or([0.0; 2], |coords| coords[i]);
                Vertex::new(mesh.positions[i], normal, tex_coords)
            })
            .collect();

        let mut indices = Vec::with_capacity(mesh.faces.len() * 3);
        let mut skipped = 0;
        for face in &mesh.faces {
            if face.len() == 3 {
                indices.extend_from_slice(face);
            } else {
                skipped += 1;
            }
        }

        let mut data = MeshData {
            vertices,
            indices,
            ..Default::default()
        };

        if let Some(material) = material {
            data.material = Material {
                ambient: material.ambient.unwrap_or_default(),
                diffuse: material.diffuse.unwrap_or_default(),
                specular: material.specular.unwrap_or_default(),
                shininess: material.shininess.unwrap_or_default(),
            };

            for texture in &material.diffuse_textures {
                let index = self.add_texture(base_dir.join(texture), TextureKind::Diffuse);
                data.texture_indices.push(index);
            }
            for texture in &material.specular_textures {
                let index = self.add_texture(base_dir.join(texture), TextureKind::Specular);
                data.texture_indices.push(index);
            }
        }

        (data, skipped)
    }

    /// Return the index of `path`, appending it when it has not been seen yet
    fn add_texture(&mut self, path: PathBuf, kind: TextureKind) -> usize {
        if let Some(index) = self.texture_index(&path) {
            return index;
        }
        self.textures.push(TextureSource { path, kind });
        self.textures.len() - 1
    }
}
