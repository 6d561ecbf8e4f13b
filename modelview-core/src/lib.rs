//! Core data structures for modelview
//!
//! This crate holds everything that does not touch the GPU:
//! - vertex and material types shared by the importer and renderer
//! - the generic scene graph produced by importers
//! - flattening of a scene graph into meshes with a deduplicated texture list
//! - the spherical-coordinate camera and the camera matrix block

pub mod vertex;
pub mod scene;
pub mod model_data;
pub mod camera;
pub mod view;
pub mod error;

pub use vertex::*;
pub use scene::*;
pub use model_data::*;
pub use camera::*;
pub use view::*;
pub use error::*;

/// Re-export commonly used types from nalgebra
pub use nalgebra::{Matrix4, Point3, Vector3};

/// A 3D vector with floating point components
pub type Vector3f = Vector3<f32>;
