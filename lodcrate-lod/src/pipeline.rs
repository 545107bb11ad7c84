//! End-to-end LOD generation
//!
//! [`LodPipeline::run`] wires the stages together:
//!
//! ```text
//! fragments -> partition_by_material -> assemble_levels -> combine_meshes
//!           -> plan_thresholds -> LodSpec
//! ```

use crate::combine::combine_meshes;
use crate::config::LodConfig;
use crate::levels::assemble_levels;
use crate::partition::{partition_by_material, MeshFragment};
use crate::thresholds::plan_thresholds;
use lodcrate_core::{MaterialId, Result, TriangleMesh};
use serde::Serialize;
use tracing::info;

/// One level of detail: the combined mesh and the threshold at which it
/// becomes active
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LodEntry {
    pub mesh: TriangleMesh,
    /// Material of each sub-mesh of `mesh`, in sub-mesh order
    pub materials: Vec<MaterialId>,
    pub threshold: f32,
}

/// Ordered LOD entries, most detailed first
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LodSpec {
    pub entries: Vec<LodEntry>,
}

/// Per-level statistics for reporting
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LevelSummary {
    pub level: usize,
    pub threshold: f32,
    pub faces: usize,
    pub vertices: usize,
}

impl LodSpec {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, LodEntry> {
        self.entries.iter()
    }

    pub fn summary(&self) -> Vec<LevelSummary> {
        self.entries
            .iter()
            .enumerate()
            .map(|(level, entry)| LevelSummary {
                level,
                threshold: entry.threshold,
                faces: entry.mesh.face_count(),
                vertices: entry.mesh.vertex_count(),
            })
            .collect()
    }
}

impl<'a> IntoIterator for &'a LodSpec {
    type Item = &'a LodEntry;
    type IntoIter = std::slice::Iter<'a, LodEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Builds an [`LodSpec`] from a composite model
#[derive(Debug, Clone)]
pub struct LodPipeline {
    config: LodConfig,
}

impl LodPipeline {
    /// Create a pipeline, rejecting configurations that can never be valid
    pub fn new(config: LodConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &LodConfig {
        &self.config
    }

    /// Run every stage over `fragments`.
    ///
    /// The configuration is checked against the material count before any
    /// decimation starts. The result always has one more entry than there
    /// are decimated levels.
    pub fn run(&self, fragments: &[MeshFragment]) -> Result<LodSpec> {
        let groups = partition_by_material(fragments)?;
        self.config.validate_for(groups.len())?;

        let levels = assemble_levels(
            &groups,
            &self.config.decimation_ratios,
            &self.config.decimation_modes,
            &self.config.decimator,
        )?;
        let thresholds = plan_thresholds(
            self.config.transition_start,
            self.config.culled,
            levels.len(),
        )?;

        let materials: Vec<MaterialId> = groups.iter().map(|g| g.material.clone()).collect();
        let entries: Vec<LodEntry> = levels
            .iter()
            .zip(thresholds)
            .map(|(level, threshold)| LodEntry {
                mesh: combine_meshes(&level.meshes),
                materials: materials.clone(),
                threshold,
            })
            .collect();

        info!(
            materials = materials.len(),
            levels = entries.len(),
            source_faces = entries.first().map_or(0, |e| e.mesh.face_count()),
            coarsest_faces = entries.last().map_or(0, |e| e.mesh.face_count()),
            "Generated LOD spec"
        );

        Ok(LodSpec { entries })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lodcrate_core::{Error, Point3f};
    use lodcrate_simplification::DecimationMode;

    fn make_quad_strip(quads: usize) -> TriangleMesh {
        let mut mesh = TriangleMesh::new();
        for i in 0..=quads {
            let u = i as f32 / quads as f32;
            mesh.add_vertex(Point3f::new(i as f32, 0.0, 0.0), [u, 0.0]);
            mesh.add_vertex(Point3f::new(i as f32, 1.0, 0.0), [u, 1.0]);
        }
        for i in 0..quads {
            let a = 2 * i;
            mesh.add_face([a, a + 2, a + 1]);
            mesh.add_face([a + 1, a + 2, a + 3]);
        }
        mesh
    }

    #[test]
    fn test_single_material_run() {
        let config = LodConfig::uniform(1, &[0.5], DecimationMode::SmallestFirst, 0.6, 0.02);
        let pipeline = LodPipeline::new(config).unwrap();
        let fragments = vec![MeshFragment::single(make_quad_strip(4), "bark".into())];

        let spec = pipeline.run(&fragments).unwrap();
        assert_eq!(spec.len(), 2);
        assert_eq!(spec.entries[0].mesh.face_count(), 8);
        assert!(spec.entries[1].mesh.face_count() < 8);
        assert_eq!(spec.entries[0].threshold, 0.6);
        assert_eq!(spec.entries[1].threshold, 0.02);
        assert!(spec.iter().all(|e| e.materials == vec![MaterialId::from("bark")]));
    }

    #[test]
    fn test_summary_matches_entries() {
        let pipeline = LodPipeline::new(LodConfig::default()).unwrap();
        let fragments = vec![MeshFragment::single(make_quad_strip(6), "bark".into())];
        let spec = pipeline.run(&fragments).unwrap();

        let summary = spec.summary();
        assert_eq!(summary.len(), 3);
        for (row, entry) in summary.iter().zip(&spec) {
            assert_eq!(row.faces, entry.mesh.face_count());
            assert_eq!(row.vertices, entry.mesh.vertex_count());
        }
        assert_eq!(summary[0].faces, 12);
    }

    #[test]
    fn test_invalid_config_rejected_up_front() {
        let mut config = LodConfig::default();
        config.culled = 0.9;
        assert!(matches!(
            LodPipeline::new(config),
            Err(Error::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_material_count_checked_before_decimation() {
        let config = LodConfig::uniform(1, &[0.5, 0.7, 0.9], DecimationMode::SmallestFirst, 0.6, 0.02);
        let pipeline = LodPipeline::new(config).unwrap();
        let fragments = vec![
            MeshFragment::single(make_quad_strip(2), "bark".into()),
            MeshFragment::single(make_quad_strip(2), "leaf".into()),
        ];
        assert!(matches!(
            pipeline.run(&fragments),
            Err(Error::InvalidConfiguration(_))
        ));
    }
}
