//! Best-first layer search.

use super::graph::HnswGraph;
use super::layer::NodeId;
use crate::distance::Distance;
use crate::ordered_float::OrderedFloat;
use crate::store::VectorStore;
use rustc_hash::FxHashSet;
use std::cmp::Reverse;
use std::collections::BinaryHeap;

impl HnswGraph {
    /// Searches for the `k` nearest nodes with candidate width `max(ef, k)`.
    ///
    /// Returns `(node_id, distance)` pairs sorted by distance, exactly
    /// `min(k, len)` of them: when layer 0 is not connected enough to
    /// reach `k` nodes, the result is completed from the unreached ones.
    pub(crate) fn search<D: Distance + ?Sized>(
        &self,
        store: &VectorStore,
        metric: &D,
        query: &[f32],
        k: usize,
        ef: usize,
    ) -> Vec<(NodeId, f32)> {
        let Some(ep) = self.entry_point else {
            return Vec::new();
        };

        let mut current_ep = ep;
        for layer_idx in (1..=self.max_level).rev() {
            current_ep = self.closest_in_layer(store, metric, query, current_ep, layer_idx);
        }

        let mut candidates = self.search_layer(store, metric, query, &[current_ep], ef.max(k), 0);
        let wanted = k.min(self.len());
        if candidates.len() < wanted {
            self.fill_from_unreached(store, metric, query, &mut candidates, wanted);
        }
        candidates.truncate(k);
        candidates
    }

    /// Tops `results` up to `wanted` entries with the closest nodes it does
    /// not hold yet, keeping it sorted by distance.
    fn fill_from_unreached<D: Distance + ?Sized>(
        &self,
        store: &VectorStore,
        metric: &D,
        query: &[f32],
        results: &mut Vec<(NodeId, f32)>,
        wanted: usize,
    ) {
        let reached: FxHashSet<NodeId> = results.iter().map(|&(node, _)| node).collect();
        let missing = wanted - results.len();
        tracing::trace!(reached = reached.len(), missing, "Layer 0 walk fell short");

        let mut rest: Vec<(NodeId, f32)> = (0..self.len())
            .filter(|node| !reached.contains(node))
            .map(|node| (node, metric.distance(query, store.vector(node))))
            .collect();
        if rest.len() > missing {
            rest.select_nth_unstable_by(missing, |a, b| a.1.total_cmp(&b.1));
            rest.truncate(missing);
        }

        results.extend(rest);
        results.sort_by(|a, b| a.1.total_cmp(&b.1));
    }

    /// Width-1 layer search: the closest node reachable from `entry`.
    pub(super) fn closest_in_layer<D: Distance + ?Sized>(
        &self,
        store: &VectorStore,
        metric: &D,
        query: &[f32],
        entry: NodeId,
        layer: usize,
    ) -> NodeId {
        self.search_layer(store, metric, query, &[entry], 1, layer)
            .first()
            .map_or(entry, |&(node, _)| node)
    }

    /// Search a single layer with `ef` candidates.
    ///
    /// Stops once the closest unexpanded candidate is farther than the worst
    /// of `ef` retained results.
    pub(super) fn search_layer<D: Distance + ?Sized>(
        &self,
        store: &VectorStore,
        metric: &D,
        query: &[f32],
        entry_points: &[NodeId],
        ef: usize,
        layer: usize,
    ) -> Vec<(NodeId, f32)> {
        let mut visited: FxHashSet<NodeId> = FxHashSet::default();
        let mut candidates: BinaryHeap<Reverse<(OrderedFloat, NodeId)>> = BinaryHeap::new();
        let mut results: BinaryHeap<(OrderedFloat, NodeId)> = BinaryHeap::new();

        for &ep in entry_points {
            if !visited.insert(ep) {
                continue;
            }
            let dist = metric.distance(query, store.vector(ep));
            candidates.push(Reverse((OrderedFloat(dist), ep)));
            results.push((OrderedFloat(dist), ep));
            if results.len() > ef {
                results.pop();
            }
        }

        let adjacency = &self.layers[layer];
        while let Some(Reverse((OrderedFloat(c_dist), c_node))) = candidates.pop() {
            let furthest_dist = results.peek().map_or(f32::MAX, |r| r.0 .0);

            if c_dist > furthest_dist && results.len() >= ef {
                break;
            }

            for &neighbor in adjacency.get_neighbors(c_node) {
                if visited.insert(neighbor) {
                    let dist = metric.distance(query, store.vector(neighbor));
                    let furthest = results.peek().map_or(f32::MAX, |r| r.0 .0);

                    if dist < furthest || results.len() < ef {
                        candidates.push(Reverse((OrderedFloat(dist), neighbor)));
                        results.push((OrderedFloat(dist), neighbor));

                        if results.len() > ef {
                            results.pop();
                        }
                    }
                }
            }
        }

        results
            .into_sorted_vec()
            .into_iter()
            .map(|(d, n)| (n, d.0))
            .collect()
    }
}
