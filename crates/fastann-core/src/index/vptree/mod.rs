//! Vantage-point tree.
//!
//! An exact metric tree: each node holds a pivot and the median distance
//! from that pivot to the rest of its range. The left subtree holds points
//! no farther than the threshold, the right subtree points no closer. A
//! query descends into a side only if the triangle inequality leaves room
//! for a better hit there, so results match brute force for any true
//! metric.
//!
//! # Layout
//!
//! The tree is built in place over the owned [`VectorStore`]: construction
//! permutes store positions, and every node refers to its pivot by store
//! position. Nodes live in a flat arena and link to their children by
//! arena index.

mod build;
mod params;
mod search;


pub use params::{VpTreeParams, DEFAULT_PARALLEL_THRESHOLD};

use super::{validate_query, IndexKind, NearestNeighbors};
use crate::distance::{Distance, DistanceMetric};
use crate::error::Result;
use crate::store::VectorStore;
use crate::topk::{BoundedTopK, Neighbor};
use std::time::Instant;

/// One tree node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VpNode {
    /// Store position of the pivot.
    pub position: usize,
    /// Pivot-to-median distance. Zero for leaves.
    pub threshold: f32,
    /// Arena index of the inner ball (distance <= threshold).
    pub left: Option<usize>,
    /// Arena index of the outer shell (distance >= threshold).
    pub right: Option<usize>,
}

impl VpNode {
    pub(crate) const fn leaf(position: usize) -> Self {
        Self {
            position,
            threshold: 0.0,
            left: None,
            right: None,
        }
    }

    /// Returns true if the node has no children.
    #[must_use]
    pub const fn is_leaf(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }
}

/// Vantage-point tree over an owned store.
#[derive(Debug, Clone)]
pub struct VpTree<D = DistanceMetric> {
    store: VectorStore,
    metric: D,
    nodes: Vec<VpNode>,
    root: Option<usize>,
}

impl<D: Distance> VpTree<D> {
    /// Builds a tree over every record of `store`.
    ///
    /// Construction reorders the store in place. With a fixed
    /// [`VpTreeParams::seed`] the resulting tree is reproducible, whether or
    /// not subtrees are built in parallel.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::ResourceExhausted`] if the arena cannot grow.
    pub fn build(mut store: VectorStore, metric: D, params: &VpTreeParams) -> Result<Self> {
        if !metric.is_metric() {
            tracing::warn!("VP tree built over a non-metric distance; results may be inexact");
        }

        let start = Instant::now();
        let len = store.len();
        let seed = params.seed.unwrap_or_else(rand::random);
        tracing::debug!(points = len, seed, parallel = params.parallel, "Building VP tree");

        let mut nodes = Vec::new();
        nodes.try_reserve_exact(len)?;
        let root = build::build_subtree(&mut nodes, store.slice_mut(0..len), &metric, seed, params)?;

        let tree = Self {
            store,
            metric,
            nodes,
            root,
        };
        tracing::info!(
            points = len,
            depth = tree.depth(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "VP tree built"
        );
        Ok(tree)
    }

    /// Returns the `k` nearest records to `query`, ascending by distance.
    ///
    /// Exact when the distance is a true metric.
    ///
    /// # Errors
    ///
    /// See [`NearestNeighbors::search`].
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor>> {
        let k = validate_query(query, k, self.store.dimension(), self.store.len())?;
        let mut top = BoundedTopK::new(k);
        if let Some(root) = self.root {
            self.search_node(root, query, &mut top);
        }
        Ok(top.drain_sorted())
    }

    /// Node arena in preorder; index 0 is the root when the tree is non-empty.
    #[must_use]
    pub fn nodes(&self) -> &[VpNode] {
        &self.nodes
    }

    /// Arena index of the root, `None` for an empty tree.
    #[must_use]
    pub fn root(&self) -> Option<usize> {
        self.root
    }

    /// Number of nodes on the longest root-to-leaf path.
    #[must_use]
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack: Vec<(usize, usize)> = self.root.map(|r| (r, 1)).into_iter().collect();
        while let Some((node, depth)) = stack.pop() {
            deepest = deepest.max(depth);
            let n = &self.nodes[node];
            stack.extend(n.left.into_iter().chain(n.right).map(|c| (c, depth + 1)));
        }
        deepest
    }

    /// The reordered store the tree indexes.
    #[must_use]
    pub fn store(&self) -> &VectorStore {
        &self.store
    }

    /// The distance function.
    #[must_use]
    pub fn metric(&self) -> &D {
        &self.metric
    }
}

impl<D: Distance> NearestNeighbors for VpTree<D> {
    fn search(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor>> {
        VpTree::search(self, query, k)
    }

    fn len(&self) -> usize {
        self.store.len()
    }

    fn dimension(&self) -> usize {
        self.store.dimension()
    }

    fn kind(&self) -> IndexKind {
        IndexKind::VpTree
    }
}
