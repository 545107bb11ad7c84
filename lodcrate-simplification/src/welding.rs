//! Groups of vertices that currently share a location

use crate::edge_index::PositionKey;
use lodcrate_core::Point3f;
use std::collections::HashMap;

/// Tracks which vertex indices sit in the same position cell.
///
/// Kept in sync with the decimator's working positions through [`relocate`].
///
/// [`relocate`]: VertexWelds::relocate
pub struct VertexWelds {
    epsilon: f32,
    key_of: Vec<PositionKey>,
    buckets: HashMap<PositionKey, Vec<usize>>,
}

impl VertexWelds {
    pub fn new(positions: &[Point3f], epsilon: f32) -> Self {
        let key_of: Vec<PositionKey> = positions
            .iter()
            .map(|p| PositionKey::quantize(p, epsilon))
            .collect();
        let mut buckets: HashMap<PositionKey, Vec<usize>> = HashMap::new();
        for (vi, key) in key_of.iter().enumerate() {
            buckets.entry(*key).or_default().push(vi);
        }
        Self {
            epsilon,
            key_of,
            buckets,
        }
    }

    /// All vertices sharing the cell of `vertex`, itself included
    pub fn colocated(&self, vertex: usize) -> &[usize] {
        self.buckets
            .get(&self.key_of[vertex])
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Move `vertex` to the cell of `position`
    pub fn relocate(&mut self, vertex: usize, position: &Point3f) {
        let new_key = PositionKey::quantize(position, self.epsilon);
        let old_key = self.key_of[vertex];
        if new_key == old_key {
            return;
        }

        if let Some(bucket) = self.buckets.get_mut(&old_key) {
            if let Some(at) = bucket.iter().position(|&v| v == vertex) {
                bucket.swap_remove(at);
            }
            if bucket.is_empty() {
                self.buckets.remove(&old_key);
            }
        }
        self.buckets.entry(new_key).or_default().push(vertex);
        self.key_of[vertex] = new_key;
    }
}
