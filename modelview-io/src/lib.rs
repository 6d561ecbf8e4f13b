//! Scene import for modelview
//!
//! This crate reads 3D scene files into the generic [`Scene`] graph from
//! `modelview-core`, then runs the post-processing the renderer relies on
//! (triangulation, flipped texture coordinates, generated normals).
//! Supported formats are Wavefront OBJ with MTL material libraries and
//! glTF 2.0.

pub mod error;
pub mod registry;
pub mod obj_reader;
pub mod gltf_reader;
pub mod postprocess;

pub use error::*;
pub use registry::{ImporterRegistry, SceneReader};
pub use obj_reader::ObjReader;
pub use gltf_reader::GltfReader;
pub use postprocess::ImportOptions;

use std::path::Path;

use modelview_core::{Result, Scene};

/// Auto-detect format, read and post-process a scene
pub fn import_scene<P: AsRef<Path>>(path: P, options: &ImportOptions) -> Result<Scene> {
    ImporterRegistry::default().import(path.as_ref(), options)
}

impl ImporterRegistry {
    /// Read `path` with the matching reader and post-process the result
    pub fn import(&self, path: &Path, options: &ImportOptions) -> Result<Scene> {
        let reader = self.reader_for(path)?;
        let mut scene = reader.read_scene(path)?;
        // Post-processing indexes attributes by face corner
        scene.validate()?;
        postprocess::apply(&mut scene, options);

        log::debug!(
            "imported {} scene {}: {} meshes, {} materials",
            reader.format_name(),
            path.display(),
            scene.meshes.len(),
            scene.materials.len()
        );
        Ok(scene)
    }
}
