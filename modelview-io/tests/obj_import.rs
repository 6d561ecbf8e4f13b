//! OBJ import through to flattened model data

use std::fs;

use modelview_core::{Error, ModelData, TextureKind};
use modelview_io::{import_scene, ImportOptions};
use tempfile::TempDir;

/// Write `files` into a fresh temporary directory
fn fixture(files: &[(&str, &str)]) -> TempDir {
    let dir = TempDir::new().unwrap();
    for (file, contents) in files {
        fs::write(dir.path().join(file), contents).unwrap();
    }
    dir
}

const CRATE_MTL: &str = "\
newmtl wood
Ka 0.1 0.1 0.1
Kd 0.6 0.4 0.2
Ks 0.3 0.3 0.3
Ns 16.0
map_Kd wood.png
map_Ks shine.png

newmtl metal
Kd 0.5 0.5 0.5
Ks 1.0 1.0 1.0
Ns 96.0
map_Kd wood.png
map_Ks shine.png
";

const CRATE_OBJ: &str = "\
mtllib crate.mtl
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
vt 0 0
vt 1 0
vt 1 1
vt 0 1
o lid
usemtl wood
f 1/1 2/2 3/3 4/4
o band
usemtl metal
f 1/1 2/2 3/3
";

#[test]
fn test_obj_with_materials_flattens_and_deduplicates() {
    let tmp = fixture(&[("crate.obj", CRATE_OBJ), ("crate.mtl", CRATE_MTL)]);
    let dir = tmp.path();
    let path = dir.join("crate.obj");

    let scene = import_scene(&path, &ImportOptions::default()).unwrap();
    assert_eq!(scene.materials.len(), 2);

    let model = ModelData::from_scene(&scene, dir).unwrap();
    assert_eq!(model.meshes.len(), 2);

    // The quad was triangulated during import
    let lid = &model.meshes[0];
    assert_eq!(lid.indices, vec![0, 1, 2, 0, 2, 3]);
    assert_eq!(lid.material.diffuse, [0.6, 0.4, 0.2]);
    assert_eq!(lid.material.shininess, 16.0);

    // UVs are flipped and normals generated
    assert_eq!(lid.vertices[3].tex_coords, [0.0, 0.0]);
    assert_eq!(lid.vertices[0].tex_coords, [0.0, 1.0]);
    assert!((lid.vertices[0].normal[2] - 1.0).abs() < 1e-6);

    // Two distinct texture files referenced from four material slots
    assert_eq!(model.textures.len(), 2);
    assert_eq!(model.textures[0].path, dir.join("wood.png"));
    assert_eq!(model.textures[0].kind, TextureKind::Diffuse);
    assert_eq!(model.textures[1].kind, TextureKind::Specular);
    assert_eq!(model.meshes[0].texture_indices, vec![0, 1]);
    assert_eq!(model.meshes[1].texture_indices, vec![0, 1]);

    let stats = model.stats();
    assert_eq!(stats.faces, 3);
    assert_eq!(stats.textures, 2);
}

#[test]
fn test_single_triangle_with_diffuse_texture() {
    let tmp = fixture(&[
        ("tri.obj", "mtllib tri.mtl\nv 0 0 0\nv 1 0 0\nv 0 1 0\nusemtl skin\nf 1 2 3\n"),
        ("tri.mtl", "newmtl skin\nKd 1 1 1\nmap_Kd skin.jpg\n"),
    ]);
    let dir = tmp.path();

    let scene = import_scene(dir.join("tri.obj"), &ImportOptions::default()).unwrap();
    let model = ModelData::from_scene(&scene, dir).unwrap();

    assert!(!model.is_empty());
    assert_eq!(model.meshes.len(), 1);
    assert_eq!(model.meshes[0].vertices.len(), 3);
    assert_eq!(model.meshes[0].indices, vec![0, 1, 2]);
    assert_eq!(model.textures.len(), 1);
}

#[test]
fn test_missing_material_library_still_imports_geometry() {
    let tmp = fixture(&[(
        "bare.obj",
        "mtllib gone.mtl\nv 0 0 0\nv 1 0 0\nv 0 1 0\nusemtl gone\nf 1 2 3\n",
    )]);
    let dir = tmp.path();

    let scene = import_scene(dir.join("bare.obj"), &ImportOptions::default()).unwrap();
    let model = ModelData::from_scene(&scene, dir).unwrap();
    assert_eq!(model.meshes.len(), 1);
    assert!(model.textures.is_empty());
}

#[test]
fn test_out_of_range_face_index_is_an_import_error() {
    let tmp = fixture(&[("broken.obj", "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 9\n")]);

    let result = import_scene(tmp.path().join("broken.obj"), &ImportOptions::default());
    match result {
        Err(Error::Import(message)) => assert!(message.contains("position 9"), "{message}"),
        other => panic!("expected an import error, got {other:?}"),
    }
}
