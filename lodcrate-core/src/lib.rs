//! Core data structures and traits for lodcrate
//!
//! This crate provides the mesh types shared by the decimation and LOD
//! assembly crates: triangle meshes with UVs and face groups, material
//! identifiers, transforms, and the common error type.

pub mod point;
pub mod mesh;
pub mod traits;
pub mod transform;
pub mod error;

pub use point::*;
pub use mesh::*;
pub use traits::*;
pub use transform::*;
pub use error::*;

/// Re-export commonly used types from nalgebra
pub use nalgebra::{Point3, Vector3, UnitQuaternion};
