//! Sorted edge array with hashed adjacency lookup
//!
//! The decimator walks edges in ascending squared-length order. For each
//! driving edge it needs the first later edge that bounds a different live
//! triangle across the same vertex pair, or across the same pair of locations
//! when duplicate vertices were never welded. Two hash indices answer both
//! questions without a forward linear scan.

use lodcrate_core::Point3f;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Location of a point snapped to a grid of `epsilon`-sized cells.
///
/// Two positions are treated as coincident when they snap to the same cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PositionKey([i64; 3]);

impl PositionKey {
    pub fn quantize(point: &Point3f, epsilon: f32) -> Self {
        let snap = |c: f32| (c as f64 / epsilon as f64).round() as i64;
        Self([snap(point.x), snap(point.y), snap(point.z)])
    }
}

/// Which adjacency test wins when both find a candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchPriority {
    /// Whichever candidate comes first in sorted order
    #[default]
    Nearest,
    /// Prefer an edge over the same vertex indices
    IndexFirst,
    /// Prefer an edge over the same welded locations
    PositionFirst,
}

/// One side of a triangle, captured when the edge array was built
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    pub v0: usize,
    pub v1: usize,
    pub face: usize,
    pub p0: Point3f,
    pub p1: Point3f,
    pub length_sq: f32,
}

impl Edge {
    fn new(v0: usize, v1: usize, face: usize, positions: &[Point3f]) -> Self {
        let p0 = positions[v0];
        let p1 = positions[v1];
        Self {
            v0,
            v1,
            face,
            p0,
            p1,
            length_sq: (p1 - p0).norm_squared(),
        }
    }

    /// Unordered vertex pair as `(min, max)`
    pub fn vertex_key(&self) -> (usize, usize) {
        (self.v0.min(self.v1), self.v0.max(self.v1))
    }

    /// Unordered location pair, smaller key first
    pub fn location_key(&self, epsilon: f32) -> (PositionKey, PositionKey) {
        let k0 = PositionKey::quantize(&self.p0, epsilon);
        let k1 = PositionKey::quantize(&self.p1, epsilon);
        (k0.min(k1), k0.max(k1))
    }
}

/// Edges of every live triangle, ascending by squared length
pub struct EdgeIndex {
    edges: Vec<Edge>,
    by_vertices: HashMap<(usize, usize), Vec<usize>>,
    by_location: HashMap<(PositionKey, PositionKey), Vec<usize>>,
}

impl EdgeIndex {
    /// Extract and sort the edges of all faces not flagged in `removed`.
    ///
    /// Ties keep extraction order (face, then side), so the array is a pure
    /// function of its inputs.
    pub fn build(
        faces: &[[usize; 3]],
        removed: &[bool],
        positions: &[Point3f],
        epsilon: f32,
    ) -> Self {
        let mut edges = Vec::with_capacity(faces.len() * 3);
        for (fi, face) in faces.iter().enumerate() {
            if removed[fi] {
                continue;
            }
            for j in 0..3 {
                edges.push(Edge::new(face[j], face[(j + 1) % 3], fi, positions));
            }
        }
        edges.sort_by(|a, b| a.length_sq.total_cmp(&b.length_sq));

        let mut by_vertices: HashMap<(usize, usize), Vec<usize>> = HashMap::new();
        let mut by_location: HashMap<(PositionKey, PositionKey), Vec<usize>> = HashMap::new();
        for (slot, edge) in edges.iter().enumerate() {
            by_vertices.entry(edge.vertex_key()).or_default().push(slot);
            by_location
                .entry(edge.location_key(epsilon))
                .or_default()
                .push(slot);
        }

        Self {
            edges,
            by_vertices,
            by_location,
        }
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    pub fn edge(&self, slot: usize) -> &Edge {
        &self.edges[slot]
    }

    /// First slot after `slot` whose edge converges with it.
    ///
    /// A candidate must belong to a different, still-live triangle.
    pub fn find_match(
        &self,
        slot: usize,
        removed: &[bool],
        epsilon: f32,
        priority: MatchPriority,
    ) -> Option<usize> {
        let driver = &self.edges[slot];
        let first_after = |slots: &Vec<usize>| {
            let start = slots.partition_point(|&s| s <= slot);
            slots[start..].iter().copied().find(|&s| {
                let candidate = &self.edges[s];
                candidate.face != driver.face && !removed[candidate.face]
            })
        };

        let by_index = self.by_vertices.get(&driver.vertex_key()).and_then(first_after);
        let by_position = self
            .by_location
            .get(&driver.location_key(epsilon))
            .and_then(first_after);

        match priority {
            MatchPriority::Nearest => match (by_index, by_position) {
                (Some(a), Some(b)) => Some(a.min(b)),
                (a, b) => a.or(b),
            },
            MatchPriority::IndexFirst => by_index.or(by_position),
            MatchPriority::PositionFirst => by_position.or(by_index),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-5;

    /// Two triangles sharing edge (1, 2), plus a detached copy of that edge
    /// on its own triangle (vertices 4, 5 duplicate 1, 2).
    fn make_fixture() -> (Vec<Point3f>, Vec<[usize; 3]>) {
        let positions = vec![
            Point3f::new(0.0, 0.0, 0.0),
            Point3f::new(1.0, 0.0, 0.0),
            Point3f::new(0.0, 1.0, 0.0),
            Point3f::new(1.0, 1.0, 0.0),
            Point3f::new(1.0, 0.0, 0.0),
            Point3f::new(0.0, 1.0, 0.0),
            Point3f::new(-1.0, -1.0, 0.0),
        ];
        let faces = vec![[0, 1, 2], [2, 1, 3], [4, 5, 6]];
        (positions, faces)
    }

    #[test]
    fn test_edges_sorted_ascending() {
        let (positions, faces) = make_fixture();
        let index = EdgeIndex::build(&faces, &[false; 3], &positions, EPS);
        assert_eq!(index.len(), 9);
        for slot in 1..index.len() {
            assert!(index.edge(slot - 1).length_sq <= index.edge(slot).length_sq);
        }
    }

    #[test]
    fn test_removed_faces_contribute_no_edges() {
        let (positions, faces) = make_fixture();
        let index = EdgeIndex::build(&faces, &[false, true, false], &positions, EPS);
        assert_eq!(index.len(), 6);
        assert!((0..index.len()).all(|s| index.edge(s).face != 1));
    }

    #[test]
    fn test_position_key_snaps_nearby_points() {
        let a = PositionKey::quantize(&Point3f::new(1.0, 2.0, 3.0), EPS);
        let b = PositionKey::quantize(&Point3f::new(1.000_001, 2.0, 3.0), EPS);
        let c = PositionKey::quantize(&Point3f::new(1.001, 2.0, 3.0), EPS);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    fn diagonal_slots(index: &EdgeIndex) -> Vec<usize> {
        (0..index.len())
            .filter(|&s| {
                let e = index.edge(s);
                (e.length_sq - 2.0).abs() < 1e-6
            })
            .collect()
    }

    #[test]
    fn test_match_by_vertices_and_by_location() {
        let (positions, faces) = make_fixture();
        let removed = [false; 3];
        let index = EdgeIndex::build(&faces, &removed, &positions, EPS);

        // The three diagonals have identical length and stay in face order.
        let diagonals = diagonal_slots(&index);
        assert_eq!(diagonals.len(), 3);
        let [d0, d1, d2] = [diagonals[0], diagonals[1], diagonals[2]];
        assert_eq!(index.edge(d0).face, 0);
        assert_eq!(index.edge(d1).face, 1);
        assert_eq!(index.edge(d2).face, 2);

        assert_eq!(index.find_match(d0, &removed, EPS, MatchPriority::IndexFirst), Some(d1));
        assert_eq!(index.find_match(d0, &removed, EPS, MatchPriority::Nearest), Some(d1));
        // Face 2 only shares locations with the diagonal of face 1.
        assert_eq!(index.find_match(d1, &removed, EPS, MatchPriority::Nearest), Some(d2));
        assert_eq!(index.find_match(d1, &removed, EPS, MatchPriority::IndexFirst), Some(d2));
        assert_eq!(index.find_match(d2, &removed, EPS, MatchPriority::Nearest), None);
    }

    #[test]
    fn test_match_skips_removed_faces() {
        let (positions, faces) = make_fixture();
        let index = EdgeIndex::build(&faces, &[false; 3], &positions, EPS);
        let diagonals = diagonal_slots(&index);

        let removed = [false, true, false];
        assert_eq!(
            index.find_match(diagonals[0], &removed, EPS, MatchPriority::Nearest),
            Some(diagonals[2])
        );
        assert_eq!(
            index.find_match(diagonals[0], &removed, EPS, MatchPriority::IndexFirst),
            Some(diagonals[2])
        );
    }

    #[test]
    fn test_boundary_edge_has_no_match() {
        let (positions, faces) = make_fixture();
        let removed = [false; 3];
        let index = EdgeIndex::build(&faces, &removed, &positions, EPS);
        let slot = (0..index.len())
            .find(|&s| index.edge(s).vertex_key() == (0, 1))
            .unwrap();
        assert_eq!(index.find_match(slot, &removed, EPS, MatchPriority::Nearest), None);
    }
}
