//! A loaded model: meshes plus the textures they reference

use std::path::{Path, PathBuf};

use modelview_core::{ModelData, ModelStats, Result};
use modelview_io::{import_scene, ImportOptions};

use crate::mesh::{MaterialBindings, Mesh};
use crate::shader::Shader;
use crate::texture::Texture;
use crate::GpuContext;

/// Outcome of a successful model load
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadReport {
    pub stats: ModelStats,
    /// Textures replaced by a placeholder because they could not be decoded
    pub failed_textures: Vec<PathBuf>,
}

/// Meshes and the model-wide texture list indexed by `MeshData::texture_indices`
#[derive(Default)]
pub struct Model {
    meshes: Vec<Mesh>,
    textures: Vec<Texture>,
}

impl Model {
    /// Import `path` and upload everything it references.
    ///
    /// Texture paths resolve against the directory containing `path`.
    pub fn load(ctx: &GpuContext, path: &Path, bindings: &MaterialBindings) -> Result<(Self, LoadReport)> {
        let scene = import_scene(path, &ImportOptions::default())?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new(""));
        let data = ModelData::from_scene(&scene, base_dir)?;

        let (model, failed_textures) = Self::from_data(ctx, data, bindings)?;
        let report = LoadReport {
            stats: model.stats(),
            failed_textures,
        };
        log::info!("loaded {}: {}", path.display(), report.stats);
        if !report.failed_textures.is_empty() {
            log::warn!("{} texture(s) replaced by placeholders", report.failed_textures.len());
        }
        Ok((model, report))
    }

    /// Upload already-flattened data. Returns the textures that failed to decode.
    pub fn from_data(
        ctx: &GpuContext,
        data: ModelData,
        bindings: &MaterialBindings,
    ) -> Result<(Self, Vec<PathBuf>)> {
        let textures: Vec<Texture> = data
            .textures
            .iter()
            .map(|source| Texture::load_or_placeholder(ctx, &source.path, source.kind))
            .collect();
        let failed = textures
            .iter()
            .filter(|texture| texture.placeholder)
            .map(|texture| texture.path.clone())
            .collect();

        let meshes = data
            .meshes
            .into_iter()
            .map(|mesh| Mesh::new(ctx, mesh, &textures, bindings))
            .collect::<Result<Vec<_>>>()?;

        Ok((Self { meshes, textures }, failed))
    }

    /// Draw every mesh with `shader`
    pub fn draw<'a>(&'a self, pass: &mut wgpu::RenderPass<'a>, shader: &'a Shader) {
        for mesh in &self.meshes {
            mesh.draw(pass, shader);
        }
    }

    /// A model is loaded when it has at least one mesh
    pub fn is_loaded(&self) -> bool {
        !self.meshes.is_empty()
    }

    pub fn meshes(&self) -> &[Mesh] {
        &self.meshes
    }

    pub fn textures(&self) -> &[Texture] {
        &self.textures
    }

    pub fn stats(&self) -> ModelStats {
        ModelStats {
            meshes: self.meshes.len(),
            vertices: self.meshes.iter().map(|mesh| mesh.data.vertices.len()).sum(),
            faces: self.meshes.iter().map(|mesh| mesh.data.face_count()).sum(),
            textures: self.textures.len(),
        }
    }

    /// Release all meshes and textures and empty both lists
    pub fn destroy(&mut self) {
        for mesh in &mut self.meshes {
            mesh.destroy();
        }
        for texture in &self.textures {
            texture.destroy();
        }
        self.meshes.clear();
        self.textures.clear();
    }
}
