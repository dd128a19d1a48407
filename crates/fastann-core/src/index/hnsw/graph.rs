//! HNSW Graph Structure
//!
//! Implements the hierarchical navigable small world graph structure
//! as described in the Malkov & Yashunin paper, over vectors owned by a
//! [`VectorStore`]. Node ids are store positions.

use super::layer::{Layer, NodeId};
use super::params::{HnswParams, MAX_LEVEL};
use crate::distance::Distance;
use crate::error::Result;
use crate::store::VectorStore;
use rand::Rng;

/// Layered adjacency plus the navigation state of an HNSW index.
#[derive(Debug, Clone)]
pub(crate) struct HnswGraph {
    /// Hierarchical layers (layer 0 = bottom, dense connections)
    pub(super) layers: Vec<Layer>,
    /// Highest layer of each inserted node
    pub(super) levels: Vec<usize>,
    /// Entry point for search (a node of the highest layer)
    pub(super) entry_point: Option<NodeId>,
    /// Highest populated layer
    pub(super) max_level: usize,
    pub(super) params: HnswParams,
    level_mult: f64,
}

impl HnswGraph {
    /// Creates an empty graph.
    pub(crate) fn new(params: HnswParams) -> Self {
        Self {
            layers: vec![Layer::default()],
            levels: Vec::new(),
            entry_point: None,
            max_level: 0,
            level_mult: params.level_multiplier(),
            params,
        }
    }

    /// Number of inserted nodes.
    pub(crate) fn len(&self) -> usize {
        self.levels.len()
    }

    /// Inserts the store record at position `node`.
    ///
    /// Nodes must be inserted in position order, starting at 0.
    pub(crate) fn insert<D: Distance + ?Sized, R: Rng + ?Sized>(
        &mut self,
        node: NodeId,
        store: &VectorStore,
        metric: &D,
        rng: &mut R,
    ) -> Result<()> {
        debug_assert_eq!(node, self.levels.len());
        let node_level = self.random_level(rng);

        self.levels.try_reserve(1)?;
        self.levels.push(node_level);
        while self.layers.len() <= node_level {
            self.layers.try_reserve(1)?;
            self.layers.push(Layer::new(node + 1));
        }
        for layer in &mut self.layers[..=node_level] {
            layer.ensure_capacity(node)?;
        }

        let Some(entry) = self.entry_point else {
            // First node becomes the entry point
            self.entry_point = Some(node);
            self.max_level = node_level;
            return Ok(());
        };

        let query = store.vector(node);

        // Single-path descent through layers the new node does not live in
        let mut current_ep = entry;
        for layer_idx in (node_level + 1..=self.max_level).rev() {
            current_ep = self.closest_in_layer(store, metric, query, current_ep, layer_idx);
        }

        let mut entry_points = vec![current_ep];
        for layer_idx in (0..=node_level.min(self.max_level)).rev() {
            let candidates = self.search_layer(
                store,
                metric,
                query,
                &entry_points,
                self.params.ef_construction,
                layer_idx,
            );

            let max_conn = self.params.max_connections(layer_idx);
            let selected = select_neighbors(&candidates, max_conn);
            self.layers[layer_idx].set_neighbors(node, selected.clone());

            for &neighbor in &selected {
                self.add_bidirectional_connection(store, metric, node, neighbor, layer_idx, max_conn);
            }

            if !candidates.is_empty() {
                entry_points = candidates.into_iter().map(|(n, _)| n).collect();
            }
        }

        if node_level > self.max_level {
            self.max_level = node_level;
            self.entry_point = Some(node);
        }
        Ok(())
    }

    /// Draws `floor(-ln(u) * ml)` for `u` uniform in `(0, 1]`, capped at [`MAX_LEVEL`].
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub(crate) fn random_level<R: Rng + ?Sized>(&self, rng: &mut R) -> usize {
        let uniform: f64 = 1.0 - rng.gen::<f64>();
        let level = (-uniform.ln() * self.level_mult).floor() as usize;
        level.min(MAX_LEVEL)
    }

    /// Adds `new_node` to `neighbor`'s list, pruning it back to `max_conn`
    /// by distance from `neighbor` when it overflows.
    fn add_bidirectional_connection<D: Distance + ?Sized>(
        &mut self,
        store: &VectorStore,
        metric: &D,
        new_node: NodeId,
        neighbor: NodeId,
        layer: usize,
        max_conn: usize,
    ) {
        let Some(links) = self.layers[layer].neighbors_mut(neighbor) else {
            return;
        };
        links.push(new_node);
        if links.len() <= max_conn {
            return;
        }

        let neighbor_vec = store.vector(neighbor);
        let mut with_dist: Vec<(NodeId, f32)> = links
            .iter()
            .map(|&n| (n, metric.distance(neighbor_vec, store.vector(n))))
            .collect();
        with_dist.sort_by(|a, b| a.1.total_cmp(&b.1));
        *links = with_dist
            .into_iter()
            .take(max_conn)
            .map(|(n, _)| n)
            .collect();
    }
}

/// Closest-M selection: the first `max_neighbors` of an ascending candidate list.
pub(crate) fn select_neighbors(candidates: &[(NodeId, f32)], max_neighbors: usize) -> Vec<NodeId> {
    candidates
        .iter()
        .take(max_neighbors)
        .map(|&(id, _)| id)
        .collect()
}
