//! glTF import through to flattened model data

use std::fs;
use std::path::Path;

use approx::assert_relative_eq;
use modelview_core::{Error, ModelData, TextureKind};
use modelview_io::{import_scene, ImportOptions};
use tempfile::TempDir;

/// Little-endian buffer contents: vertex positions followed by u16 indices
fn buffer_bytes(positions: &[[f32; 3]], indices: &[u16]) -> Vec<u8> {
    let mut bytes = Vec::new();
    for component in positions.iter().flatten() {
        bytes.extend_from_slice(&component.to_le_bytes());
    }
    for index in indices {
        bytes.extend_from_slice(&index.to_le_bytes());
    }
    bytes
}

fn write_fixture(dir: &Path, name: &str, json: &str, buffer: &[u8]) {
    fs::write(dir.join(format!("{name}.gltf")), json).unwrap();
    fs::write(dir.join(format!("{name}.bin")), buffer).unwrap();
}

const QUAD: [[f32; 3]; 4] = [
    [0.0, 0.0, 0.0],
    [1.0, 0.0, 0.0],
    [1.0, 1.0, 0.0],
    [0.0, 1.0, 0.0],
];

/// Two meshes sharing one buffer. Node "parent" holds the unindexed
/// triangle and has a child node holding the textured, indexed quad.
const SCENE_GLTF: &str = r#"{
  "asset": { "version": "2.0" },
  "buffers": [{ "uri": "scene.bin", "byteLength": 60 }],
  "bufferViews": [
    { "buffer": 0, "byteOffset": 0, "byteLength": 48 },
    { "buffer": 0, "byteOffset": 48, "byteLength": 12 }
  ],
  "accessors": [
    { "bufferView": 0, "componentType": 5126, "count": 4, "type": "VEC3",
      "min": [0.0, 0.0, 0.0], "max": [1.0, 1.0, 0.0] },
    { "bufferView": 1, "componentType": 5123, "count": 6, "type": "SCALAR" },
    { "bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3",
      "min": [0.0, 0.0, 0.0], "max": [1.0, 1.0, 0.0] }
  ],
  "images": [{ "uri": "my%20tex.png" }],
  "textures": [{ "source": 0 }],
  "materials": [{
    "name": "skin",
    "pbrMetallicRoughness": {
      "baseColorFactor": [1.0, 0.5, 0.25, 1.0],
      "baseColorTexture": { "index": 0 }
    }
  }],
  "meshes": [
    { "name": "quad", "primitives": [{ "attributes": { "POSITION": 0 }, "indices": 1, "material": 0 }] },
    { "name": "tri", "primitives": [{ "attributes": { "POSITION": 2 } }] }
  ],
  "nodes": [
    { "name": "parent", "mesh": 1, "children": [1] },
    { "name": "child", "mesh": 0 }
  ],
  "scenes": [{ "name": "main", "nodes": [0] }],
  "scene": 0
}"#;

/// Three vertices with an index pointing past the end
const BROKEN_GLTF: &str = r#"{
  "asset": { "version": "2.0" },
  "buffers": [{ "uri": "broken.bin", "byteLength": 42 }],
  "bufferViews": [
    { "buffer": 0, "byteOffset": 0, "byteLength": 36 },
    { "buffer": 0, "byteOffset": 36, "byteLength": 6 }
  ],
  "accessors": [
    { "bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3",
      "min": [0.0, 0.0, 0.0], "max": [1.0, 1.0, 0.0] },
    { "bufferView": 1, "componentType": 5123, "count": 3, "type": "SCALAR" }
  ],
  "meshes": [{ "name": "tri", "primitives": [{ "attributes": { "POSITION": 0 }, "indices": 1 }] }],
  "nodes": [{ "name": "tri", "mesh": 0 }],
  "scenes": [{ "nodes": [0] }],
  "scene": 0
}"#;

#[test]
fn test_gltf_node_tree_and_meshes() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path();
    write_fixture(dir, "scene", SCENE_GLTF, &buffer_bytes(&QUAD, &[0, 1, 2, 0, 2, 3]));

    let scene = import_scene(dir.join("scene.gltf"), &ImportOptions::default()).unwrap();

    // Meshes keep document order
    let names: Vec<&str> = scene.meshes.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, ["quad", "tri"]);
    assert_eq!(scene.meshes[0].faces, vec![vec![0, 1, 2], vec![0, 2, 3]]);
    assert_eq!(scene.meshes[1].faces, vec![vec![0, 1, 2]]);
    assert_eq!(scene.meshes[0].material, Some(0));
    assert!(scene.meshes[1].material.is_none());

    let root = scene.root().unwrap();
    assert_eq!(root.name, "main");
    assert_eq!(root.node_count(), 3);
    let parent = &root.children[0];
    assert_eq!(parent.name, "parent");
    assert_eq!(parent.meshes, vec![1]);
    assert_eq!(parent.children[0].name, "child");
    assert_eq!(parent.children[0].meshes, vec![0]);

    let material = &scene.materials[0];
    assert_eq!(material.name, "skin");
    assert_eq!(material.diffuse, Some([1.0, 0.5, 0.25]));
    assert_eq!(material.diffuse_textures, vec!["my tex.png".to_string()]);

    // Flattening walks the tree, so the parent's triangle comes first
    let model = ModelData::from_scene(&scene, dir).unwrap();
    assert_eq!(model.meshes.len(), 2);
    assert_eq!(model.meshes[0].indices, vec![0, 1, 2]);
    assert_eq!(model.meshes[1].indices, vec![0, 1, 2, 0, 2, 3]);
    assert!(model.meshes[0].texture_indices.is_empty());
    assert_eq!(model.meshes[1].texture_indices, vec![0]);
    assert_relative_eq!(model.meshes[1].vertices[2].normal[2], 1.0, epsilon = 1e-6);

    assert_eq!(model.textures.len(), 1);
    assert_eq!(model.textures[0].path, dir.join("my tex.png"));
    assert_eq!(model.textures[0].kind, TextureKind::Diffuse);

    let stats = model.stats();
    assert_eq!((stats.meshes, stats.vertices, stats.faces), (2, 7, 3));
}

#[test]
fn test_gltf_out_of_range_index_is_rejected() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path();
    write_fixture(dir, "broken", BROKEN_GLTF, &buffer_bytes(&QUAD[..3], &[0, 1, 9]));

    let result = import_scene(dir.join("broken.gltf"), &ImportOptions::default());
    match result {
        Err(Error::InvalidData(message)) => assert!(message.contains("vertex 9"), "{message}"),
        other => panic!("expected invalid data, got {other:?}"),
    }
}
