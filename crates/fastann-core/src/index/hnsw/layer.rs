//! HNSW Layer implementation.
//!
//! A single layer in the HNSW hierarchy containing node adjacency lists.

use crate::error::Result;

/// Unique identifier for a node in the graph: its store position.
pub type NodeId = usize;

/// A single layer in the HNSW hierarchy.
#[derive(Debug, Clone, Default)]
pub(crate) struct Layer {
    /// Adjacency list: `node_id -> neighbor node_ids`
    neighbors: Vec<Vec<NodeId>>,
}

impl Layer {
    /// Creates a new layer with empty lists for `capacity` nodes.
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            neighbors: vec![Vec::new(); capacity],
        }
    }

    /// Ensures the layer has a slot for `node_id`.
    pub(crate) fn ensure_capacity(&mut self, node_id: NodeId) -> Result<()> {
        if self.neighbors.len() <= node_id {
            self.neighbors.try_reserve(node_id + 1 - self.neighbors.len())?;
            self.neighbors.resize_with(node_id + 1, Vec::new);
        }
        Ok(())
    }

    /// Gets the neighbors of a node. Empty for unknown nodes.
    pub(crate) fn get_neighbors(&self, node_id: NodeId) -> &[NodeId] {
        self.neighbors.get(node_id).map_or(&[][..], Vec::as_slice)
    }

    /// Replaces the adjacency list of a node. No-op for unknown nodes.
    pub(crate) fn set_neighbors(&mut self, node_id: NodeId, neighbors: Vec<NodeId>) {
        if let Some(slot) = self.neighbors.get_mut(node_id) {
            *slot = neighbors;
        }
    }

    /// Mutable adjacency list of a node.
    pub(crate) fn neighbors_mut(&mut self, node_id: NodeId) -> Option<&mut Vec<NodeId>> {
        self.neighbors.get_mut(node_id)
    }
}
