//! Mesh decimation for level-of-detail generation
//!
//! This crate provides a greedy edge-collapse decimator that turns one mesh
//! into a series of progressively coarser meshes in a single run:
//! - Sorted edge array with hashed index/location adjacency lookup
//! - Two traversal modes (shortest-first and distributed)
//! - Compact re-indexing of every realized level

pub mod edge_index;
pub mod welding;
pub mod materialize;
pub mod edge_collapse;

pub use edge_index::{MatchPriority, PositionKey};
pub use edge_collapse::*;

use lodcrate_core::{Error, Result, TriangleMesh};

/// Reduce a mesh to one or more target ratios
pub trait MeshDecimator {
    /// Decimate `mesh` once per ratio (0.0 = untouched, 1.0 = remove everything
    /// possible). Results come back in the order of `target_ratios`.
    fn decimate(&self, mesh: &TriangleMesh, target_ratios: &[f32]) -> Result<Vec<TriangleMesh>>;

    /// Decimate to a single ratio
    fn decimate_to(&self, mesh: &TriangleMesh, ratio: f32) -> Result<TriangleMesh> {
        self.decimate(mesh, &[ratio])?
            .pop()
            .ok_or_else(|| Error::InvalidConfiguration("Decimator returned no mesh".to_string()))
    }
}
