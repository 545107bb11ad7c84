//! Mesh data structures and functionality

use crate::error::{Error, Result};
use crate::point::*;
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// A contiguous range of faces rendered with one material slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubMesh {
    /// Index of the first face in the group
    pub start: usize,
    /// Number of faces in the group
    pub count: usize,
}

impl SubMesh {
    pub fn new(start: usize, count: usize) -> Self {
        Self { start, count }
    }

    /// Face index range covered by this group
    pub fn range(&self) -> Range<usize> {
        self.start..self.start + self.count
    }
}

/// A triangle mesh with positions, texture coordinates and faces.
///
/// `uvs` is always index-aligned with `vertices`. `normals` and `tangents` are
/// derived attributes and may be absent. When `submeshes` is empty the whole
/// face list is a single implicit group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriangleMesh {
    pub vertices: Vec<Point3f>,
    pub uvs: Vec<Uv>,
    pub faces: Vec<[usize; 3]>,
    pub normals: Option<Vec<Vector3f>>,
    pub tangents: Option<Vec<Tangent>>,
    pub submeshes: Vec<SubMesh>,
}

impl TriangleMesh {
    /// Create a new empty mesh
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            uvs: Vec::new(),
            faces: Vec::new(),
            normals: None,
            tangents: None,
            submeshes: Vec::new(),
        }
    }

    /// Create a mesh from vertices and faces, with zeroed UVs
    pub fn from_vertices_and_faces(vertices: Vec<Point3f>, faces: Vec<[usize; 3]>) -> Self {
        let uvs = vec![[0.0, 0.0]; vertices.len()];
        Self {
            vertices,
            uvs,
            faces,
            normals: None,
            tangents: None,
            submeshes: Vec::new(),
        }
    }

    /// Create a mesh from vertices, per-vertex UVs and faces
    pub fn from_parts(vertices: Vec<Point3f>, uvs: Vec<Uv>, faces: Vec<[usize; 3]>) -> Self {
        Self {
            vertices,
            uvs,
            faces,
            normals: None,
            tangents: None,
            submeshes: Vec::new(),
        }
    }

    /// Get the number of vertices
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Get the number of faces
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Check if the mesh is empty
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() || self.faces.is_empty()
    }

    /// Add a vertex with its texture coordinate to the mesh
    pub fn add_vertex(&mut self, vertex: Point3f, uv: Uv) -> usize {
        let index = self.vertices.len();
        self.vertices.push(vertex);
        self.uvs.push(uv);
        index
    }

    /// Add a face to the mesh
    pub fn add_face(&mut self, face: [usize; 3]) {
        self.faces.push(face);
    }

    /// Concatenate `other` onto this mesh, offsetting its face indices.
    ///
    /// Normals and tangents survive only if both sides carry them (or this
    /// mesh was empty). Sub-mesh groups are left to the caller. Returns the
    /// face range the appended faces occupy.
    pub fn append(&mut self, other: &TriangleMesh) -> Range<usize> {
        let was_empty = self.vertices.is_empty();
        let base = self.vertices.len();
        let first_face = self.faces.len();

        self.normals = match (self.normals.take(), &other.normals) {
            (Some(mut mine), Some(theirs)) => {
                mine.extend_from_slice(theirs);
                Some(mine)
            }
            (None, Some(theirs)) if was_empty => Some(theirs.clone()),
            _ => None,
        };
        self.tangents = match (self.tangents.take(), &other.tangents) {
            (Some(mut mine), Some(theirs)) => {
                mine.extend_from_slice(theirs);
                Some(mine)
            }
            (None, Some(theirs)) if was_empty => Some(theirs.clone()),
            _ => None,
        };

        self.vertices.extend_from_slice(&other.vertices);
        self.uvs.extend_from_slice(&other.uvs);
        self.faces
            .extend(other.faces.iter().map(|face| face.map(|vi| vi + base)));

        first_face..self.faces.len()
    }

    /// Number of face groups, counting the implicit group of an ungrouped mesh
    pub fn submesh_count(&self) -> usize {
        if self.submeshes.is_empty() {
            1
        } else {
            self.submeshes.len()
        }
    }

    /// Faces belonging to group `index`, or `None` if there is no such group
    pub fn submesh_faces(&self, index: usize) -> Option<&[[usize; 3]]> {
        if self.submeshes.is_empty() {
            return (index == 0).then_some(self.faces.as_slice());
        }
        let submesh = self.submeshes.get(index)?;
        self.faces.get(submesh.range())
    }

    /// Check the structural invariants of the mesh.
    ///
    /// Returns [`Error::MalformedMesh`] on the first violation found.
    pub fn validate(&self) -> Result<()> {
        let vertex_count = self.vertices.len();

        if self.uvs.len() != vertex_count {
            return Err(Error::MalformedMesh(format!(
                "UV count mismatch: {} UVs for {} vertices",
                self.uvs.len(),
                vertex_count
            )));
        }

        if let Some(ref normals) = self.normals {
            if normals.len() != vertex_count {
                return Err(Error::MalformedMesh(format!(
                    "Normal count mismatch: {} normals for {} vertices",
                    normals.len(),
                    vertex_count
                )));
            }
        }

        if let Some(ref tangents) = self.tangents {
            if tangents.len() != vertex_count {
                return Err(Error::MalformedMesh(format!(
                    "Tangent count mismatch: {} tangents for {} vertices",
                    tangents.len(),
                    vertex_count
                )));
            }
        }

        for (fi, face) in self.faces.iter().enumerate() {
            if let Some(&bad) = face.iter().find(|&&v| v >= vertex_count) {
                return Err(Error::MalformedMesh(format!(
                    "Face {} references vertex {} but mesh has {} vertices",
                    fi, bad, vertex_count
                )));
            }
        }

        for (si, submesh) in self.submeshes.iter().enumerate() {
            if submesh.start + submesh.count > self.faces.len() {
                return Err(Error::MalformedMesh(format!(
                    "Submesh {} covers faces {:?} but mesh has {} faces",
                    si,
                    submesh.range(),
                    self.faces.len()
                )));
            }
        }

        Ok(())
    }

    /// Compute smooth, area-weighted vertex normals.
    ///
    /// Vertices with no adjacent non-degenerate face get `+Z`.
    pub fn compute_normals(&mut self) {
        let mut normals = vec![Vector3f::zeros(); self.vertices.len()];

        for face in &self.faces {
            let v0 = self.vertices[face[0]];
            let v1 = self.vertices[face[1]];
            let v2 = self.vertices[face[2]];
            let face_normal = (v1 - v0).cross(&(v2 - v0));

            for &vi in face {
                normals[vi] += face_normal;
            }
        }

        for normal in &mut normals {
            let length = normal.norm();
            if length > 1e-12 && length.is_finite() {
                *normal /= length;
            } else {
                *normal = Vector3f::new(0.0, 0.0, 1.0);
            }
        }

        self.normals = Some(normals);
    }

    /// Compute tangent vectors using Lengyel's method.
    ///
    /// Normals are computed first if the mesh has none.
    pub fn compute_tangents(&mut self) {
        if self.normals.is_none() {
            self.compute_normals();
        }

        let vertex_count = self.vertices.len();
        let mut tan1 = vec![Vector3f::zeros(); vertex_count];
        let mut tan2 = vec![Vector3f::zeros(); vertex_count];

        for face in &self.faces {
            let [i1, i2, i3] = *face;

            let e1 = self.vertices[i2] - self.vertices[i1];
            let e2 = self.vertices[i3] - self.vertices[i1];

            let w1 = self.uvs[i1];
            let w2 = self.uvs[i2];
            let w3 = self.uvs[i3];

            let s1 = w2[0] - w1[0];
            let s2 = w3[0] - w1[0];
            let t1 = w2[1] - w1[1];
            let t2 = w3[1] - w1[1];

            let det = s1 * t2 - s2 * t1;
            let r = if det.abs() < 1e-12 { 1.0 } else { 1.0 / det };

            let sdir = (e1 * t2 - e2 * t1) * r;
            let tdir = (e2 * s1 - e1 * s2) * r;

            for &vi in face {
                tan1[vi] += sdir;
                tan2[vi] += tdir;
            }
        }

        let Some(ref normals) = self.normals else {
            return;
        };

        let tangents = (0..vertex_count)
            .map(|i| {
                let n = normals[i];
                let t = tan1[i];

                // Gram-Schmidt orthogonalize
                let ortho = t - n * n.dot(&t);
                let length = ortho.norm();
                let vector = if length > 1e-12 && length.is_finite() {
                    ortho / length
                } else {
                    Vector3f::new(1.0, 0.0, 0.0)
                };

                let handedness = if n.cross(&vector).dot(&tan2[i]) < 0.0 {
                    -1.0
                } else {
                    1.0
                };

                Tangent::new(vector, handedness)
            })
            .collect();

        self.tangents = Some(tangents);
    }

    /// Recompute every derived attribute (normals and tangents)
    pub fn recalculate_derived(&mut self) {
        self.normals = None;
        self.tangents = None;
        self.compute_tangents();
    }

    /// Set vertex normals
    pub fn set_normals(&mut self, normals: Vec<Vector3f>) {
        if normals.len() == self.vertices.len() {
            self.normals = Some(normals);
        }
    }

    /// Set vertex tangents
    pub fn set_tangents(&mut self, tangents: Vec<Tangent>) {
        if tangents.len() == self.vertices.len() {
            self.tangents = Some(tangents);
        }
    }

    /// Clear the mesh
    pub fn clear(&mut self) {
        self.vertices.clear();
        self.uvs.clear();
        self.faces.clear();
        self.normals = None;
        self.tangents = None;
        self.submeshes.clear();
    }
}

impl Default for TriangleMesh {
    fn default() -> Self {
        Self::new()
    }
}
