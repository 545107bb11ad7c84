//! Vertex attribute types

use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};
use bytemuck::{Pod, Zeroable};

/// A 3D point with floating point coordinates
pub type Point3f = Point3<f32>;

/// A 3D vector with floating point components
pub type Vector3f = Vector3<f32>;

/// Texture coordinates (UV mapping)
pub type Uv = [f32; 2];

/// Tangent vector with handedness information
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[repr(C)]
pub struct Tangent {
    /// Tangent vector
    pub vector: Vector3f,
    /// Handedness (-1.0 or 1.0)
    pub handedness: f32,
}

unsafe impl Pod for Tangent {}
unsafe impl Zeroable for Tangent {}

impl Tangent {
    /// Create a new tangent with vector and handedness
    pub fn new(vector: Vector3f, handedness: f32) -> Self {
        Self { vector, handedness }
    }
}

impl Default for Tangent {
    fn default() -> Self {
        Self {
            vector: Vector3f::new(1.0, 0.0, 0.0),
            handedness: 1.0,
        }
    }
}

/// Opaque material identifier.
///
/// Materials are compared by name only; the engine never looks inside them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MaterialId(pub String);

impl MaterialId {
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for MaterialId {
    fn from(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl From<String> for MaterialId {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl std::fmt::Display for MaterialId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
