//! Splitting a composite model into one flattened mesh per material

use itertools::Itertools;
use lodcrate_core::{Error, MaterialId, Result, Transform3D, Transformable, TriangleMesh};
use serde::{Deserialize, Serialize};

/// One piece of a composite model as handed over by the scene layer.
///
/// Sub-mesh `s` of `mesh` is rendered with `materials[submesh_materials[s]]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeshFragment {
    pub mesh: TriangleMesh,
    pub materials: Vec<MaterialId>,
    pub submesh_materials: Vec<usize>,
    pub local_to_world: Transform3D,
}

impl MeshFragment {
    /// Fragment whose sub-mesh `s` uses `materials[s]`
    pub fn new(mesh: TriangleMesh, materials: Vec<MaterialId>) -> Self {
        let submesh_materials = (0..mesh.submesh_count()).collect();
        Self {
            mesh,
            materials,
            submesh_materials,
            local_to_world: Transform3D::identity(),
        }
    }

    /// Fragment rendered entirely with one material
    pub fn single(mesh: TriangleMesh, material: MaterialId) -> Self {
        let submesh_materials = vec![0; mesh.submesh_count()];
        Self {
            mesh,
            materials: vec![material],
            submesh_materials,
            local_to_world: Transform3D::identity(),
        }
    }

    pub fn with_transform(mut self, local_to_world: Transform3D) -> Self {
        self.local_to_world = local_to_world;
        self
    }

    /// Material used by sub-mesh `submesh`
    fn material_of(&self, submesh: usize) -> Option<&MaterialId> {
        self.submesh_materials
            .get(submesh)
            .and_then(|&slot| self.materials.get(slot))
    }

    fn validate(&self, index: usize) -> Result<()> {
        self.mesh.validate()?;
        let groups = self.mesh.submesh_count();
        if self.submesh_materials.len() != groups {
            return Err(Error::InvalidConfiguration(format!(
                "Fragment {} maps {} sub-meshes to materials but has {}",
                index,
                self.submesh_materials.len(),
                groups
            )));
        }
        if let Some(&slot) = self
            .submesh_materials
            .iter()
            .find(|&&slot| slot >= self.materials.len())
        {
            return Err(Error::InvalidConfiguration(format!(
                "Fragment {} refers to material slot {} but lists {} materials",
                index,
                slot,
                self.materials.len()
            )));
        }
        Ok(())
    }
}

/// All geometry of a model rendered with one material, in one shared frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialGroup {
    pub material: MaterialId,
    pub mesh: TriangleMesh,
}

/// Copy the faces of one sub-mesh and the vertices they use.
///
/// Vertices keep their relative order.
fn extract_submesh(mesh: &TriangleMesh, submesh: usize) -> TriangleMesh {
    let faces = mesh.submesh_faces(submesh).unwrap_or(&[]);

    let mut remap = vec![usize::MAX; mesh.vertex_count()];
    for face in faces {
        for &vi in face {
            remap[vi] = 0;
        }
    }

    let mut out = TriangleMesh::new();
    for (vi, slot) in remap.iter_mut().enumerate() {
        if *slot != usize::MAX {
            *slot = out.add_vertex(mesh.vertices[vi], mesh.uvs[vi]);
        }
    }
    out.faces = faces.iter().map(|face| face.map(|vi| remap[vi])).collect();
    out
}

/// Flatten `fragments` into one mesh per distinct material.
///
/// Groups come out in the order their material is first used. Each
/// fragment's transform is baked into a copy of its geometry; the fragments
/// themselves are left untouched. Normals and tangents are recomputed in the
/// shared frame.
pub fn partition_by_material(fragments: &[MeshFragment]) -> Result<Vec<MaterialGroup>> {
    for (index, fragment) in fragments.iter().enumerate() {
        fragment.validate(index)?;
    }

    let order: Vec<&MaterialId> = fragments
        .iter()
        .flat_map(|fragment| {
            (0..fragment.mesh.submesh_count()).filter_map(move |s| fragment.material_of(s))
        })
        .unique()
        .collect();

    let groups = order
        .into_iter()
        .map(|material| {
            let mut mesh = TriangleMesh::new();
            for fragment in fragments {
                for s in 0..fragment.mesh.submesh_count() {
                    if fragment.material_of(s) != Some(material) {
                        continue;
                    }
                    let mut piece = extract_submesh(&fragment.mesh, s);
                    piece.transform(&fragment.local_to_world);
                    mesh.append(&piece);
                }
            }
            mesh.recalculate_derived();
            MaterialGroup {
                material: material.clone(),
                mesh,
            }
        })
        .collect();

    Ok(groups)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lodcrate_core::{Point3f, SubMesh, Vector3};

    /// Two quads side by side; quad 0 is sub-mesh 0, quad 1 is sub-mesh 1.
    fn make_two_group_mesh() -> TriangleMesh {
        let mut mesh = TriangleMesh::from_parts(
            vec![
                Point3f::new(0.0, 0.0, 0.0),
                Point3f::new(1.0, 0.0, 0.0),
                Point3f::new(1.0, 1.0, 0.0),
                Point3f::new(0.0, 1.0, 0.0),
                Point3f::new(2.0, 0.0, 0.0),
                Point3f::new(2.0, 1.0, 0.0),
            ],
            vec![[0.0, 0.0], [0.5, 0.0], [0.5, 1.0], [0.0, 1.0], [1.0, 0.0], [1.0, 1.0]],
            vec![[0, 1, 2], [0, 2, 3], [1, 4, 5], [1, 5, 2]],
        );
        mesh.submeshes = vec![SubMesh::new(0, 2), SubMesh::new(2, 2)];
        mesh
    }

    fn make_triangle() -> TriangleMesh {
        TriangleMesh::from_vertices_and_faces(
            vec![Point3f::origin(), Point3f::new(1.0, 0.0, 0.0), Point3f::new(0.0, 1.0, 0.0)],
            vec![[0, 1, 2]],
        )
    }

    #[test]
    fn test_extract_submesh_compacts_vertices() {
        let mesh = make_two_group_mesh();
        let piece = extract_submesh(&mesh, 1);
        assert_eq!(piece.vertex_count(), 4);
        assert_eq!(piece.faces, vec![[0, 2, 3], [0, 3, 1]]);
        assert_eq!(piece.uvs[2], [1.0, 0.0]);
        assert!(piece.validate().is_ok());
    }

    #[test]
    fn test_groups_follow_first_use_and_deduplicate() {
        let bark = MaterialId::from("bark");
        let leaf = MaterialId::from("leaf");
        let fragments = vec![
            MeshFragment::new(make_two_group_mesh(), vec![leaf.clone(), bark.clone()]),
            MeshFragment::single(make_triangle(), bark.clone())
                .with_transform(Transform3D::translation(Vector3::new(0.0, 0.0, 5.0))),
        ];

        let groups = partition_by_material(&fragments).unwrap();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].material, leaf);
        assert_eq!(groups[1].material, bark);

        assert_eq!(groups[0].mesh.face_count(), 2);
        assert_eq!(groups[1].mesh.face_count(), 3);
        assert_eq!(groups[1].mesh.vertex_count(), 7);
        assert!(groups.iter().all(|g| g.mesh.validate().is_ok()));
        assert!(groups.iter().all(|g| g.mesh.normals.is_some()));
    }

    #[test]
    fn test_transform_is_baked_without_touching_input() {
        let shift = Transform3D::translation(Vector3::new(10.0, 0.0, 0.0));
        let fragments = vec![MeshFragment::single(make_triangle(), "bark".into()).with_transform(shift)];

        let groups = partition_by_material(&fragments).unwrap();
        assert_eq!(groups[0].mesh.vertices[1], Point3f::new(11.0, 0.0, 0.0));
        assert_eq!(fragments[0].mesh.vertices[1], Point3f::new(1.0, 0.0, 0.0));
        assert_eq!(fragments[0].local_to_world, shift);
    }

    #[test]
    fn test_shared_material_slots_merge() {
        let mut fragment = MeshFragment::new(make_two_group_mesh(), vec!["bark".into()]);
        fragment.submesh_materials = vec![0, 0];
        let groups = partition_by_material(&[fragment]).unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].mesh.face_count(), 4);
        assert_eq!(groups[0].mesh.vertex_count(), 8);
    }

    #[test]
    fn test_bad_material_mapping_rejected() {
        let mut fragment = MeshFragment::new(make_two_group_mesh(), vec!["bark".into()]);
        assert!(matches!(
            partition_by_material(&[fragment.clone()]),
            Err(Error::InvalidConfiguration(_))
        ));
        fragment.submesh_materials = vec![0];
        assert!(matches!(
            partition_by_material(&[fragment]),
            Err(Error::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_malformed_fragment_rejected() {
        let mut mesh = make_triangle();
        mesh.faces.push([0, 1, 3]);
        let fragments = vec![MeshFragment::single(mesh, "bark".into())];
        assert!(matches!(
            partition_by_material(&fragments),
            Err(Error::MalformedMesh(_))
        ));
    }

    #[test]
    fn test_no_fragments_no_groups() {
        assert!(partition_by_material(&[]).unwrap().is_empty());
    }
}
