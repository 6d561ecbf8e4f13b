//! Generic scene graph produced by importers
//!
//! Importers translate whatever their file format describes into this
//! shape: a tree of nodes that reference meshes by index, with materials
//! stored alongside. Nothing here is GPU specific.

use crate::error::{Error, Result};

/// A node in the scene tree
#[derive(Debug, Clone, Default)]
pub struct SceneNode {
    pub name: String,
    /// Indices into [`Scene::meshes`]
    pub meshes: Vec<usize>,
    pub children: Vec<SceneNode>,
}

impl SceneNode {
    /// Create an empty node
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            meshes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Attach a mesh reference to this node
    pub fn with_mesh(mut self, mesh: usize) -> Self {
        self.meshes.push(mesh);
        self
    }

    /// Attach a child node
    pub fn with_child(mut self, child: SceneNode) -> Self {
        self.children.push(child);
        self
    }

    /// Visit this node and all of its descendants in depth-first pre-order
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a SceneNode)) {
        visit(self);
        for child in &self.children {
            child.walk(visit);
        }
    }

    /// Number of nodes in this subtree, including this one
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(SceneNode::node_count).sum::<usize>()
    }
}

/// Raw mesh data as delivered by an importer
#[derive(Debug, Clone, Default)]
pub struct SceneMesh {
    pub name: String,
    pub positions: Vec<[f32; 3]>,
    pub normals: Option<Vec<[f32; 3]>>,
    pub tex_coords: Option<Vec<[f32; 2]>>,
    /// Polygon faces as vertex indices; triangles after triangulation
    pub faces: Vec<Vec<u32>>,
    /// Index into [`Scene::materials`]
    pub material: Option<usize>,
}

impl SceneMesh {
    /// Number of vertices
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Check that every attribute and face index agrees with the vertex count
    fn validate(&self, index: usize, material_count: usize) -> Result<()> {
        let count = self.positions.len();
        if let Some(normals) = &self.normals {
            if normals.len() != count {
                return Err(Error::InvalidData(format!(
                    "mesh {index} has {} normals for {count} vertices",
                    normals.len()
                )));
            }
        }
        if let Some(tex_coords) = &self.tex_coords {
            if tex_coords.len() != count {
                return Err(Error::InvalidData(format!(
                    "mesh {index} has {} texture coordinates for {count} vertices",
                    tex_coords.len()
                )));
            }
        }
        if let Some(bad) = self
            .faces
            .iter()
            .flatten()
            .find(|&&i| i as usize >= count)
        {
            return Err(Error::InvalidData(format!(
                "mesh {index} references vertex {bad} but has {count} vertices"
            )));
        }
        if let Some(material) = self.material {
            if material >= material_count {
                return Err(Error::InvalidData(format!(
                    "mesh {index} references material {material} but scene has {material_count}"
                )));
            }
        }
        Ok(())
    }
}

/// Material description as delivered by an importer
#[derive(Debug, Clone, Default)]
pub struct SceneMaterial {
    pub name: String,
    pub diffuse: Option<[f32; 3]>,
    pub specular: Option<[f32; 3]>,
    pub ambient: Option<[f32; 3]>,
    pub shininess: Option<f32>,
    /// Diffuse texture paths as written in the source file
    pub diffuse_textures: Vec<String>,
    /// Specular texture paths as written in the source file
    pub specular_textures: Vec<String>,
}

/// An imported scene graph
#[derive(Debug, Clone, Default)]
pub struct Scene {
    pub root: Option<SceneNode>,
    pub meshes: Vec<SceneMesh>,
    pub materials: Vec<SceneMaterial>,
    /// Set by importers that could only read part of the file
    pub incomplete: bool,
}

impl Scene {
    /// Create a scene with the given root node
    pub fn with_root(root: SceneNode) -> Self {
        Self {
            root: Some(root),
            ..Default::default()
        }
    }

    /// Root node, failing when the scene has none
    pub fn root(&self) -> Result<&SceneNode> {
        self.root
            .as_ref()
            .ok_or_else(|| Error::IncompleteScene("scene has no root node".to_string()))
    }

    /// Reject scenes that cannot be turned into a model
    pub fn validate(&self) -> Result<()> {
        if self.incomplete {
            return Err(Error::IncompleteScene(
                "importer flagged the scene as incomplete".to_string(),
            ));
        }

        let root = self.root()?;
        let mut dangling = None;
        root.walk(&mut |node| {
            if dangling.is_none() {
                dangling = node.meshes.iter().copied().find(|&m| m >= self.meshes.len());
            }
        });
        if let Some(mesh) = dangling {
            return Err(Error::InvalidData(format!(
                "node references mesh {mesh} but scene has {}",
                self.meshes.len()
            )));
        }

        for (index, mesh) in self.meshes.iter().enumerate() {
            mesh.validate(index, self.materials.len())?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> SceneMesh {
        SceneMesh {
            name: "tri".to_string(),
            positions: vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            faces: vec![vec![0, 1, 2]],
            ..Default::default()
        }
    }

    #[test]
    fn test_walk_is_depth_first_pre_order() {
        let root = SceneNode::new("root")
            .with_child(SceneNode::new("a").with_child(SceneNode::new("a1")))
            .with_child(SceneNode::new("b"));

        let mut names = Vec::new();
        root.walk(&mut |node| names.push(node.name.as_str()));

        assert_eq!(names, ["root", "a", "a1", "b"]);
        assert_eq!(root.node_count(), 4);
    }

    #[test]
    fn test_missing_root_is_rejected() {
        let scene = Scene {
            meshes: vec![triangle()],
            ..Default::default()
        };
        assert!(matches!(scene.validate(), Err(Error::IncompleteScene(_))));
    }

    #[test]
    fn test_incomplete_flag_is_rejected() {
        let mut scene = Scene::with_root(SceneNode::new("root").with_mesh(0));
        scene.meshes.push(triangle());
        scene.incomplete = true;
        assert!(matches!(scene.validate(), Err(Error::IncompleteScene(_))));
    }

    #[test]
    fn test_dangling_references_are_rejected() {
        let mut scene = Scene::with_root(SceneNode::new("root").with_mesh(3));
        scene.meshes.push(triangle());
        assert!(matches!(scene.validate(), Err(Error::InvalidData(_))));

        let mut scene = Scene::with_root(SceneNode::new("root").with_mesh(0));
        let mut mesh = triangle();
        mesh.faces.push(vec![0, 1, 7]);
        scene.meshes.push(mesh);
        assert!(matches!(scene.validate(), Err(Error::InvalidData(_))));

        let mut scene = Scene::with_root(SceneNode::new("root").with_mesh(0));
        let mut mesh = triangle();
        mesh.material = Some(0);
        scene.meshes.push(mesh);
        assert!(matches!(scene.validate(), Err(Error::InvalidData(_))));
    }

    #[test]
    fn test_valid_scene_passes() {
        let mut scene = Scene::with_root(SceneNode::new("root").with_mesh(0));
        scene.meshes.push(triangle());
        assert!(scene.validate().is_ok());
    }
}
