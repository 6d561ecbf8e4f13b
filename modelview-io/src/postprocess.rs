//! Post-processing steps applied to every imported scene

use modelview_core::{Scene, SceneMesh, Vector3f};

/// Which post-processing steps [`crate::import_scene`] runs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportOptions {
    /// Split polygons into triangle fans and drop points and lines
    pub triangulate: bool,
    /// Replace every texture coordinate `v` with `1 - v`
    pub flip_uvs: bool,
    /// Compute smooth normals for meshes that have none
    pub generate_normals: bool,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            triangulate: true,
            flip_uvs: true,
            generate_normals: true,
        }
    }
}

impl ImportOptions {
    /// Options that leave the importer output untouched
    pub fn raw() -> Self {
        Self {
            triangulate: false,
            flip_uvs: false,
            generate_normals: false,
        }
    }
}

/// Run the enabled steps on every mesh of `scene`
pub fn apply(scene: &mut Scene, options: &ImportOptions) {
    for mesh in &mut scene.meshes {
        if options.triangulate {
            triangulate(mesh);
        }
        if options.flip_uvs {
            flip_uvs(mesh);
        }
        if options.generate_normals && mesh.normals.is_none() {
            generate_normals(mesh);
        }
    }
}

/// Fan-triangulate polygons. Faces with fewer than three corners are removed.
pub fn triangulate(mesh: &mut SceneMesh) {
    if mesh.faces.iter().all(|face| face.len() == 3) {
        return;
    }

    let mut triangles = Vec::with_capacity(mesh.faces.len());
    let mut dropped = 0;
    for face in mesh.faces.drain(..) {
        match face.len() {
            0..=2 => dropped += 1,
            3 => triangles.push(face),
            _ => {
                for i in 1..face.len() - 1 {
                    triangles.push(vec![face[0], face[i], face[i + 1]]);
                }
            }
        }
    }
    if dropped > 0 {
        log::debug!("mesh '{}': dropped {dropped} degenerate faces", mesh.name);
    }
    mesh.faces = triangles;
}

pub fn flip_uvs(mesh: &mut SceneMesh) {
    if let Some(tex_coords) = &mut mesh.tex_coords {
        for uv in tex_coords.iter_mut() {
            uv[1] = 1.0 - uv[1];
        }
    }
}

/// Area-weighted smooth vertex normals.
///
/// Vertices not touched by any face get a zero normal.
pub fn generate_normals(mesh: &mut SceneMesh) {
    let mut sums = vec![Vector3f::zeros(); mesh.positions.len()];
    let position = |i: u32| Vector3f::from(mesh.positions[i as usize]);

    for face in mesh.faces.iter().filter(|face| face.len() >= 3) {
        for i in 1..face.len() - 1 {
            let (a, b, c) = (face[0], face[i], face[i + 1]);
            let normal = (position(b) - position(a)).cross(&(position(c) - position(a)));
            for index in [a, b, c] {
                sums[index as usize] += normal;
            }
        }
    }

    let normals = sums
        .into_iter()
        .map(|sum| sum.try_normalize(f32::EPSILON).unwrap_or_else(Vector3f::zeros).into())
        .collect();
    mesh.normals = Some(normals);
}
