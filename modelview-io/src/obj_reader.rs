//! Wavefront OBJ support
//!
//! Parsing is done by the `obj` crate. Each OBJ object becomes a child node
//! of the scene root and each group within it becomes one mesh, since
//! materials are assigned per group.

use std::collections::HashMap;
use std::path::Path;

use obj::{Group, IndexTuple, Material, Obj, ObjData, ObjMaterial};

use modelview_core::{Result, Scene, SceneMaterial, SceneMesh, SceneNode};

use crate::error::ImportError;
use crate::registry::SceneReader;

pub struct ObjReader;

impl SceneReader for ObjReader {
    fn read_scene(&self, path: &Path) -> Result<Scene> {
        if !path.exists() {
            return Err(ImportError::FileNotFound {
                path: path.display().to_string(),
            }
            .into());
        }

        let mut obj = Obj::load(path).map_err(|e| ImportError::Parse {
            format: "OBJ",
            path: path.display().to_string(),
            message: e.to_string(),
        })?;

        // Missing material libraries degrade to uncoloured meshes
        if let Err(e) = obj.load_mtls() {
            log::warn!("{}: failed to load material libraries: {:?}", path.display(), e);
        }

        let root_name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        let scene = build_scene(&obj.data, root_name).map_err(|message| ImportError::Parse {
            format: "OBJ",
            path: path.display().to_string(),
            message,
        })?;
        Ok(scene)
    }

    fn format_name(&self) -> &'static str {
        "OBJ"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["obj"]
    }
}

/// Convert parsed OBJ data into a scene graph.
///
/// Fails with a description of the first face corner that refers to a
/// vertex attribute the file does not define.
pub(crate) fn build_scene(data: &ObjData, root_name: String) -> std::result::Result<Scene, String> {
    let mut scene = Scene::default();
    let mut material_ids: HashMap<String, usize> = HashMap::new();
    let mut root = SceneNode::new(root_name);

    for object in &data.objects {
        let mut node = SceneNode::new(object.name.clone());
        for group in &object.groups {
            if group.polys.is_empty() {
                continue;
            }
            let material = group
                .material
                .as_ref()
                .and_then(|m| resolve_material(m, &mut scene, &mut material_ids));

            node.meshes.push(scene.meshes.len());
            scene.meshes.push(convert_group(data, object.name.as_str(), group, material)?);
        }
        root.children.push(node);
    }

    scene.root = Some(root);
    Ok(scene)
}

fn resolve_material(
    material: &ObjMaterial,
    scene: &mut Scene,
    ids: &mut HashMap<String, usize>,
) -> Option<usize> {
    let material = match material {
        ObjMaterial::Mtl(material) => material,
        ObjMaterial::Ref(name) => {
            log::warn!("material '{name}' is not defined in any loaded library");
            return None;
        }
    };

    if let Some(&index) = ids.get(&material.name) {
        return Some(index);
    }
    let index = scene.materials.len();
    scene.materials.push(convert_material(material));
    ids.insert(material.name.clone(), index);
    Some(index)
}

fn convert_material(material: &Material) -> SceneMaterial {
    SceneMaterial {
        name: material.name.clone(),
        diffuse: material.kd,
        specular: material.ks,
        ambient: material.ka,
        shininess: material.ns,
        diffuse_textures: material.map_kd.iter().cloned().collect(),
        specular_textures: material.map_ks.iter().cloned().collect(),
    }
}

/// Build an indexed mesh, merging corners that share the same
/// position/texcoord/normal triple.
fn convert_group(
    data: &ObjData,
    object: &str,
    group: &Group,
    material: Option<usize>,
) -> std::result::Result<SceneMesh, String> {
    let corners = || group.polys.iter().flat_map(|poly| poly.0.iter());
    let has_tex_coords = corners().all(|IndexTuple(_, t, _)| t.is_some());
    let has_normals = corners().all(|IndexTuple(_, _, n)| n.is_some());

    let mut mesh = SceneMesh {
        name: if group.name.is_empty() {
            object.to_string()
        } else {
            group.name.clone()
        },
        normals: has_normals.then(Vec::new),
        tex_coords: has_tex_coords.then(Vec::new),
        material,
        ..Default::default()
    };

    let mut lookup: HashMap<(usize, Option<usize>, Option<usize>), u32> = HashMap::new();
    for poly in &group.polys {
        let mut face = Vec::with_capacity(poly.0.len());
        for &IndexTuple(p, t, n) in &poly.0 {
            if let Some(&index) = lookup.get(&(p, t, n)) {
                face.push(index);
                continue;
            }

            let position = attribute(&data.position, p, "position", &mesh.name)?;
            let index = mesh.positions.len() as u32;
            mesh.positions.push(position);
            if let (Some(tex_coords), Some(t)) = (mesh.tex_coords.as_mut(), t) {
                tex_coords.push(attribute(&data.texture, t, "texture coordinate", &mesh.name)?);
            }
            if let (Some(normals), Some(n)) = (mesh.normals.as_mut(), n) {
                normals.push(attribute(&data.normal, n, "normal", &mesh.name)?);
            }
            lookup.insert((p, t, n), index);
            face.push(index);
        }
        mesh.faces.push(face);
    }

    Ok(mesh)
}

/// Look up a 0-based attribute index, reporting it 1-based as written in the file
fn attribute<T: Copy>(values: &[T], index: usize, what: &str, mesh: &str) -> std::result::Result<T, String> {
    values.get(index).copied().ok_or_else(|| {
        format!(
            "group '{mesh}' references {what} {} but the file defines {}",
            index + 1,
            values.len()
        )
    })
}
