//! Per-material decimation regrouped by level

use crate::partition::MaterialGroup;
use lodcrate_core::{Error, Result, TriangleMesh};
use lodcrate_simplification::{DecimationMode, MeshDecimator};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::DecimatorSettings;

/// One mesh per material, all reduced by the same relative amount
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecimationLevel {
    pub meshes: Vec<TriangleMesh>,
}

impl DecimationLevel {
    pub fn face_count(&self) -> usize {
        self.meshes.iter().map(TriangleMesh::face_count).sum()
    }
}

/// Decimate every material group and transpose the results into levels.
///
/// `ratios` is sliced contiguously per material and `modes` holds one entry
/// per material. The result has `ratios.len() / groups.len() + 1` levels;
/// level 0 carries the undecimated meshes.
pub fn assemble_levels(
    groups: &[MaterialGroup],
    ratios: &[f32],
    modes: &[DecimationMode],
    settings: &DecimatorSettings,
) -> Result<Vec<DecimationLevel>> {
    if groups.is_empty() {
        return Err(Error::InvalidConfiguration(
            "At least one material group is required".to_string(),
        ));
    }
    if ratios.len() % groups.len() != 0 {
        return Err(Error::InvalidConfiguration(format!(
            "{} decimation ratios cannot be split evenly across {} materials",
            ratios.len(),
            groups.len()
        )));
    }
    if modes.len() != groups.len() {
        return Err(Error::InvalidConfiguration(format!(
            "Expected {} decimation modes (one per material), got {}",
            groups.len(),
            modes.len()
        )));
    }
    let levels = ratios.len() / groups.len();

    if let Some(bad) = ratios.iter().find(|r| !(0.0..=1.0).contains(*r)) {
        return Err(Error::InvalidConfiguration(format!(
            "Decimation ratio must be between 0.0 and 1.0, got {}",
            bad
        )));
    }
    let decimators = modes
        .iter()
        .map(|&mode| {
            let decimator = settings.decimator(mode);
            decimator.validate().map(|_| decimator)
        })
        .collect::<Result<Vec<_>>>()?;
    for group in groups {
        group.mesh.validate()?;
    }

    // chunks() panics on zero; with no levels the zip below is empty anyway
    let mut per_material = Vec::with_capacity(groups.len());
    for ((group, decimator), slice) in groups
        .iter()
        .zip(&decimators)
        .zip(ratios.chunks(levels.max(1)))
    {
        let outputs = decimator.decimate(&group.mesh, slice)?;
        debug!(
            material = %group.material,
            mode = ?decimator.mode,
            faces = group.mesh.face_count(),
            "Decimated material group into {} levels",
            outputs.len()
        );
        per_material.push(outputs);
    }

    let mut result = Vec::with_capacity(levels + 1);
    result.push(DecimationLevel {
        meshes: groups.iter().map(|g| g.mesh.clone()).collect(),
    });
    for level in 0..levels {
        result.push(DecimationLevel {
            meshes: per_material
                .iter()
                .map(|outputs| outputs[level].clone())
                .collect(),
        });
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lodcrate_core::{MaterialId, Point3f};

    fn make_plane_grid(n: usize) -> TriangleMesh {
        let mut mesh = TriangleMesh::new();
        for y in 0..=n {
            for x in 0..=n {
                mesh.add_vertex(
                    Point3f::new(x as f32, y as f32, 0.0),
                    [x as f32 / n as f32, y as f32 / n as f32],
                );
            }
        }
        for y in 0..n {
            for x in 0..n {
                let a = y * (n + 1) + x;
                let b = a + 1;
                let c = a + n + 1;
                let d = c + 1;
                mesh.add_face([a, b, d]);
                mesh.add_face([a, d, c]);
            }
        }
        mesh
    }

    fn make_groups() -> Vec<MaterialGroup> {
        vec![
            MaterialGroup {
                material: MaterialId::from("bark"),
                mesh: make_plane_grid(4),
            },
            MaterialGroup {
                material: MaterialId::from("leaf"),
                mesh: make_plane_grid(2),
            },
        ]
    }

    #[test]
    fn test_levels_are_transposed() {
        let groups = make_groups();
        let ratios = [0.25, 0.5, 0.0, 0.5];
        let modes = [DecimationMode::SmallestFirst, DecimationMode::Distributed];
        let levels = assemble_levels(&groups, &ratios, &modes, &DecimatorSettings::default()).unwrap();

        assert_eq!(levels.len(), 3);
        assert!(levels.iter().all(|level| level.meshes.len() == 2));
        assert_eq!(levels[0].meshes[0], groups[0].mesh);
        assert_eq!(levels[0].meshes[1], groups[1].mesh);

        // A ratio of zero leaves the leaf mesh at full face count
        assert_eq!(levels[1].meshes[1].face_count(), 8);
        assert!(levels[2].meshes[0].face_count() <= levels[1].meshes[0].face_count());
        assert!(levels[1].meshes[0].face_count() < 32);
    }

    #[test]
    fn test_uneven_ratio_split_rejected() {
        let groups = make_groups();
        let modes = [DecimationMode::SmallestFirst; 2];
        let result = assemble_levels(&groups, &[0.5, 0.8, 0.3], &modes, &DecimatorSettings::default());
        assert!(matches!(result, Err(Error::InvalidConfiguration(_))));
    }

    #[test]
    fn test_mode_count_mismatch_rejected() {
        let groups = make_groups();
        let result = assemble_levels(
            &groups,
            &[0.5, 0.5],
            &[DecimationMode::SmallestFirst],
            &DecimatorSettings::default(),
        );
        assert!(matches!(result, Err(Error::InvalidConfiguration(_))));
    }

    #[test]
    fn test_no_ratios_gives_only_originals() {
        let groups = make_groups();
        let modes = [DecimationMode::SmallestFirst; 2];
        let levels = assemble_levels(&groups, &[], &modes, &DecimatorSettings::default()).unwrap();
        assert_eq!(levels.len(), 1);
        assert_eq!(levels[0].face_count(), 40);
    }

    #[test]
    fn test_empty_groups_rejected() {
        let result = assemble_levels(&[], &[], &[], &DecimatorSettings::default());
        assert!(matches!(result, Err(Error::InvalidConfiguration(_))));
    }
}
