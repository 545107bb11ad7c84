//! Merging the per-material meshes of one level

use lodcrate_core::{SubMesh, TriangleMesh};

/// Concatenate `meshes` into one mesh with one sub-mesh per input.
///
/// Sub-mesh `i` holds exactly the faces of `meshes[i]`, even when that input
/// is empty, so material slots stay aligned with their sources. Geometry is
/// not welded or otherwise merged.
pub fn combine_meshes(meshes: &[TriangleMesh]) -> TriangleMesh {
    let mut combined = TriangleMesh::new();
    let mut submeshes = Vec::with_capacity(meshes.len());

    for mesh in meshes {
        let range = combined.append(mesh);
        submeshes.push(SubMesh::new(range.start, range.len()));
    }

    // append() drops normals/tangents unless every input carried them
    if combined.normals.is_none() || combined.tangents.is_none() {
        combined.recalculate_derived();
    }
    combined.submeshes = submeshes;
    combined
}

#[cfg(test)]
mod tests {
    use super::*;
    use lodcrate_core::{Point3f, Tangent, Vector3f};

    fn make_triangle(offset: f32) -> TriangleMesh {
        TriangleMesh::from_parts(
            vec![
                Point3f::new(offset, 0.0, 0.0),
                Point3f::new(offset + 1.0, 0.0, 0.0),
                Point3f::new(offset, 1.0, 0.0),
            ],
            vec![[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]],
            vec![[0, 1, 2]],
        )
    }

    #[test]
    fn test_submeshes_track_sources() {
        let mut quad = make_triangle(0.0);
        quad.add_vertex(Point3f::new(1.0, 1.0, 0.0), [1.0, 1.0]);
        quad.add_face([1, 3, 2]);

        let combined = combine_meshes(&[quad, make_triangle(5.0)]);
        assert_eq!(combined.vertex_count(), 7);
        assert_eq!(combined.submeshes, vec![SubMesh::new(0, 2), SubMesh::new(2, 1)]);
        assert_eq!(combined.submesh_faces(1), Some(&[[4, 5, 6]][..]));
        assert!(combined.validate().is_ok());
    }

    #[test]
    fn test_empty_input_keeps_its_slot() {
        let combined = combine_meshes(&[make_triangle(0.0), TriangleMesh::new(), make_triangle(2.0)]);
        assert_eq!(combined.submesh_count(), 3);
        assert_eq!(combined.submesh_faces(1).map(<[_]>::len), Some(0));
        assert_eq!(combined.submeshes[2], SubMesh::new(1, 1));
    }

    #[test]
    fn test_overlapping_geometry_is_not_merged() {
        let combined = combine_meshes(&[make_triangle(0.0), make_triangle(0.0)]);
        assert_eq!(combined.vertex_count(), 6);
        assert_eq!(combined.face_count(), 2);
    }

    #[test]
    fn test_derived_attributes_filled_in() {
        let combined = combine_meshes(&[make_triangle(0.0), make_triangle(3.0)]);
        assert_eq!(combined.normals.as_ref().map(Vec::len), Some(6));
        assert_eq!(combined.tangents.as_ref().map(Vec::len), Some(6));
    }

    #[test]
    fn test_existing_derived_attributes_carried_over() {
        let marked = Vector3f::new(0.0, 1.0, 0.0);
        let mut first = make_triangle(0.0);
        first.set_normals(vec![marked; 3]);
        first.set_tangents(vec![Tangent::default(); 3]);
        let mut second = make_triangle(3.0);
        second.recalculate_derived();

        let combined = combine_meshes(&[first, second]);
        let normals = combined.normals.unwrap();
        assert_eq!(normals[0], marked);
        assert_eq!(normals[3], Vector3f::new(0.0, 0.0, 1.0));
    }

    #[test]
    fn test_no_inputs() {
        let combined = combine_meshes(&[]);
        assert!(combined.is_empty());
        assert_eq!(combined.submesh_count(), 1);
    }
}
