//! Turning the decimator's working state into a standalone mesh

use itertools::izip;
use lodcrate_core::{Point3f, TriangleMesh, Uv};

/// Build a compact mesh from the live faces of a working state.
///
/// Unreferenced vertices are dropped along with their UVs. Every kept index
/// shifts down by the number of dropped vertex indices below it, so relative
/// vertex order is preserved. Normals and tangents are recomputed.
pub fn materialize(
    positions: &[Point3f],
    uvs: &[Uv],
    faces: &[[usize; 3]],
    removed: &[bool],
) -> TriangleMesh {
    let mut referenced = vec![false; positions.len()];
    for (face, _) in faces.iter().zip(removed).filter(|&(_, &gone)| !gone) {
        for &vi in face {
            referenced[vi] = true;
        }
    }

    // dropped_below[i] = number of unreferenced indices < i
    let mut dropped_below = Vec::with_capacity(positions.len());
    let mut dropped = 0usize;
    let mut vertices = Vec::new();
    let mut kept_uvs = Vec::new();
    for (position, uv, &keep) in izip!(positions, uvs, &referenced) {
        dropped_below.push(dropped);
        if keep {
            vertices.push(*position);
            kept_uvs.push(*uv);
        } else {
            dropped += 1;
        }
    }

    let new_faces = faces
        .iter()
        .zip(removed)
        .filter(|&(_, &gone)| !gone)
        .map(|(&face, _)| face.map(|vi| vi - dropped_below[vi]))
        .collect();

    let mut mesh = TriangleMesh::from_parts(vertices, kept_uvs, new_faces);
    mesh.recalculate_derived();
    mesh
}
