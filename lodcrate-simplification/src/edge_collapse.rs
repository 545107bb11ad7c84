//! Edge collapse decimation
//!
//! Greedy decimation over a sorted edge array. Each successful collapse pairs
//! an edge with a later edge bounding a different triangle across the same
//! vertices (or the same welded locations), removes both triangles, and pulls
//! every involved vertex to the midpoint of the driving edge. The edge array
//! goes stale as collapses move vertices and is rebuilt from the live faces
//! after a fixed number of collapses.

use crate::edge_index::{Edge, EdgeIndex, MatchPriority};
use crate::materialize::materialize;
use crate::welding::VertexWelds;
use crate::MeshDecimator;
use itertools::Itertools;
use lodcrate_core::{Error, Point3f, Result, TriangleMesh, Uv};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

/// Collapses between full rebuilds of the edge array
pub const DEFAULT_REBUILD_INTERVAL: usize = 20;

/// Cell size under which two vertex positions count as the same location
pub const DEFAULT_WELD_EPSILON: f32 = 1e-5;

// ============================================================
// Traversal Mode
// ============================================================

/// How the scan resumes after a successful collapse.
///
/// Serialized as the integers `0` and `1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum DecimationMode {
    /// Resume right after the matched edge, keeping strict shortest-first order.
    #[default]
    SmallestFirst,
    /// Jump ahead by a fixed stride per collapse, spreading collapses over the
    /// whole mesh instead of clustering on the globally shortest edges.
    Distributed,
}

impl TryFrom<u8> for DecimationMode {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            0 => Ok(Self::SmallestFirst),
            1 => Ok(Self::Distributed),
            other => Err(Error::InvalidConfiguration(format!(
                "Unknown decimation mode {}, expected 0 or 1",
                other
            ))),
        }
    }
}

impl From<DecimationMode> for u8 {
    fn from(mode: DecimationMode) -> Self {
        match mode {
            DecimationMode::SmallestFirst => 0,
            DecimationMode::Distributed => 1,
        }
    }
}

// ============================================================
// Breakpoints
// ============================================================

#[derive(Debug, Clone, Copy)]
struct Breakpoint {
    /// Position of the ratio in the caller's slice
    ratio_index: usize,
    /// Faces that may remain, `floor(n * (1 - ratio))`
    remaining: usize,
    /// Faces that must be removed, `n - remaining`
    quota: usize,
}

/// Breakpoints in the order they are realized (ascending quota, stable).
fn plan_breakpoints(face_count: usize, ratios: &[f32]) -> Vec<Breakpoint> {
    ratios
        .iter()
        .enumerate()
        .map(|(ratio_index, &ratio)| {
            // Ratios arrive as f32, so 0.6 is really 0.6000000238. Allow one
            // f32 ulp of slack per face before flooring.
            let exact = face_count as f64 * (1.0 - ratio as f64);
            let slack = face_count as f64 * f32::EPSILON as f64;
            let remaining = ((exact + slack).floor() as usize).min(face_count);
            Breakpoint {
                ratio_index,
                remaining,
                quota: face_count - remaining,
            }
        })
        .sorted_by_key(|bp| bp.quota)
        .collect()
}

// ============================================================
// Working State
// ============================================================

/// Private mutable copy of the mesh being decimated.
struct WorkingMesh<'a> {
    uvs: &'a [Uv],
    faces: &'a [[usize; 3]],
    positions: Vec<Point3f>,
    removed: Vec<bool>,
    removed_count: usize,
    welds: VertexWelds,
}

impl<'a> WorkingMesh<'a> {
    fn new(mesh: &'a TriangleMesh, weld_epsilon: f32) -> Self {
        Self {
            uvs: &mesh.uvs,
            faces: &mesh.faces,
            positions: mesh.vertices.clone(),
            removed: vec![false; mesh.faces.len()],
            removed_count: 0,
            welds: VertexWelds::new(&mesh.vertices, weld_epsilon),
        }
    }

    fn remove_face(&mut self, face: usize) {
        if !self.removed[face] {
            self.removed[face] = true;
            self.removed_count += 1;
        }
    }

    /// Collapse `driver` onto its midpoint, taking `matched` along with it.
    fn collapse(&mut self, driver: &Edge, matched: &Edge) {
        let target = nalgebra::center(&self.positions[driver.v0], &self.positions[driver.v1]);

        let mut endpoints = vec![driver.v0, driver.v1];
        if matched.vertex_key() != driver.vertex_key() {
            endpoints.extend([matched.v0, matched.v1]);
        }

        let mut moved: Vec<usize> = endpoints
            .iter()
            .flat_map(|&v| self.welds.colocated(v).iter().copied())
            .chain(endpoints.iter().copied())
            .collect();
        moved.sort_unstable();
        moved.dedup();

        for &v in &moved {
            self.positions[v] = target;
            self.welds.relocate(v, &target);
        }

        self.remove_face(driver.face);
        self.remove_face(matched.face);
    }

    fn snapshot(&self) -> TriangleMesh {
        materialize(&self.positions, self.uvs, self.faces, &self.removed)
    }

    /// Materialize every breakpoint from `next` on whose quota is met.
    ///
    /// Returns the index of the first unmet breakpoint.
    fn realize(
        &self,
        breakpoints: &[Breakpoint],
        mut next: usize,
        results: &mut [Option<TriangleMesh>],
    ) -> usize {
        let mut snapshot: Option<TriangleMesh> = None;
        while let Some(bp) = breakpoints.get(next) {
            if self.removed_count < bp.quota {
                break;
            }
            let mesh = snapshot.get_or_insert_with(|| self.snapshot());
            debug!(
                ratio_index = bp.ratio_index,
                faces = mesh.face_count(),
                target = bp.remaining,
                "breakpoint realized"
            );
            results[bp.ratio_index] = Some(mesh.clone());
            next += 1;
        }
        next
    }
}

// ============================================================
// Edge Collapse Decimator
// ============================================================

/// Greedy edge-collapse decimator.
///
/// Produces one mesh per requested ratio from a single incremental run, so
/// coarser results are always continuations of finer ones. The output is a
/// pure function of the input mesh, the ratios and these settings.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeCollapseDecimator {
    /// Scan resumption policy after a collapse
    pub mode: DecimationMode,
    /// Collapses between full rebuilds of the sorted edge array
    pub rebuild_interval: usize,
    /// Grid cell size for treating unwelded vertices as one location
    pub weld_epsilon: f32,
    /// Tie-break when index and location matching disagree
    pub match_priority: MatchPriority,
}

impl Default for EdgeCollapseDecimator {
    fn default() -> Self {
        Self {
            mode: DecimationMode::SmallestFirst,
            rebuild_interval: DEFAULT_REBUILD_INTERVAL,
            weld_epsilon: DEFAULT_WELD_EPSILON,
            match_priority: MatchPriority::Nearest,
        }
    }
}

impl EdgeCollapseDecimator {
    pub fn new(mode: DecimationMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    pub fn with_params(
        mode: DecimationMode,
        rebuild_interval: usize,
        weld_epsilon: f32,
        match_priority: MatchPriority,
    ) -> Self {
        Self {
            mode,
            rebuild_interval,
            weld_epsilon,
            match_priority,
        }
    }

    /// Check the tunables before any work is done.
    pub fn validate(&self) -> Result<()> {
        if self.rebuild_interval == 0 {
            return Err(Error::InvalidConfiguration(
                "Rebuild interval must be at least 1".to_string(),
            ));
        }
        if !(self.weld_epsilon.is_finite() && self.weld_epsilon > 0.0) {
            return Err(Error::InvalidConfiguration(format!(
                "Weld epsilon must be a positive finite number, got {}",
                self.weld_epsilon
            )));
        }
        Ok(())
    }

    fn next_cursor(&self, matched_slot: usize, collapses: usize, stride: usize) -> usize {
        match self.mode {
            DecimationMode::SmallestFirst => matched_slot + 1,
            DecimationMode::Distributed => collapses * stride,
        }
    }
}

impl MeshDecimator for EdgeCollapseDecimator {
    fn decimate(&self, mesh: &TriangleMesh, target_ratios: &[f32]) -> Result<Vec<TriangleMesh>> {
        self.validate()?;
        mesh.validate()?;
        if let Some(bad) = target_ratios.iter().find(|r| !(0.0..=1.0).contains(*r)) {
            return Err(Error::InvalidConfiguration(format!(
                "Decimation ratio must be between 0.0 and 1.0, got {}",
                bad
            )));
        }

        let breakpoints = plan_breakpoints(mesh.face_count(), target_ratios);
        let mut results: Vec<Option<TriangleMesh>> = vec![None; target_ratios.len()];
        let mut work = WorkingMesh::new(mesh, self.weld_epsilon);
        let mut next = 0;
        let mut pass = 0usize;

        'passes: loop {
            next = work.realize(&breakpoints, next, &mut results);
            if next == breakpoints.len() {
                break;
            }

            let index = EdgeIndex::build(work.faces, &work.removed, &work.positions, self.weld_epsilon);
            let stride = index.len() / (self.rebuild_interval + 2);
            let mut cursor = 0;
            let mut collapses = 0;
            pass += 1;
            debug!(
                pass,
                edges = index.len(),
                removed = work.removed_count,
                "rebuilt edge array"
            );

            while cursor < index.len() {
                let driver = index.edge(cursor);
                if work.removed[driver.face] {
                    cursor += 1;
                    continue;
                }

                let Some(slot) =
                    index.find_match(cursor, &work.removed, self.weld_epsilon, self.match_priority)
                else {
                    cursor += 1;
                    continue;
                };

                let matched = index.edge(slot);
                trace!(
                    driver = ?(driver.v0, driver.v1),
                    matched = ?(matched.v0, matched.v1),
                    faces = ?(driver.face, matched.face),
                    "collapse"
                );
                work.collapse(driver, matched);
                collapses += 1;

                next = work.realize(&breakpoints, next, &mut results);
                if next == breakpoints.len() {
                    break 'passes;
                }
                if collapses >= self.rebuild_interval {
                    continue 'passes;
                }
                cursor = self.next_cursor(slot, collapses, stride);
            }

            // Reached the end of the array: no further convergent pair in this
            // pass. Every unmet breakpoint gets the current state.
            let unmet = breakpoints[next..]
                .iter()
                .map(|bp| bp.remaining)
                .collect::<Vec<_>>();
            debug!(
                pass,
                collapses,
                removed = work.removed_count,
                faces = mesh.face_count() - work.removed_count,
                ?unmet,
                "decimation starved before reaching all breakpoints"
            );
            let last = work.snapshot();
            for bp in &breakpoints[next..] {
                results[bp.ratio_index] = Some(last.clone());
            }
            break;
        }

        debug_assert!(results.iter().all(Option::is_some));
        Ok(results.into_iter().flatten().collect())
    }
}
