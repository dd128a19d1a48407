//! HNSW (Hierarchical Navigable Small World) index.
//!
//! Approximate k-NN over a multi-layer proximity graph. Layer 0 links every
//! point to up to `2M` near neighbors; each higher layer holds an
//! exponentially thinner subset linked to up to `M` neighbors. A query
//! walks greedily down from the top layer, then runs a best-first search of
//! width `ef` on layer 0.
//!
//! # Example
//!
//! ```rust
//! use fastann_core::{DistanceMetric, HnswIndex, HnswParams, VectorStore};
//!
//! let mut store = VectorStore::new(2)?;
//! for i in 0..100u64 {
//!     store.append(i, &[i as f32, 0.0])?;
//! }
//! let params = HnswParams::default().with_seed(Some(42));
//! let index = HnswIndex::build(store, DistanceMetric::Euclidean, params)?;
//!
//! let hits = index.search(&[10.2, 0.0], 3)?;
//! assert_eq!(hits[0].id, 10);
//! # Ok::<(), fastann_core::Error>(())
//! ```

mod graph;
mod layer;
mod params;
mod search;


pub use layer::NodeId;
pub use params::{HnswParams, MAX_LEVEL};

use super::{validate_query, IndexKind, NearestNeighbors};
use crate::distance::{Distance, DistanceMetric};
use crate::error::Result;
use crate::store::VectorStore;
use crate::topk::Neighbor;
use graph::HnswGraph;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::time::Instant;

/// HNSW index over an owned store.
#[derive(Debug, Clone)]
pub struct HnswIndex<D = DistanceMetric> {
    store: VectorStore,
    metric: D,
    graph: HnswGraph,
}

impl<D: Distance> HnswIndex<D> {
    /// Builds the graph by inserting every store position in order.
    ///
    /// The topology depends on the level-assignment RNG; it is reproducible
    /// only when [`HnswParams::seed`] is set. Parameters are re-checked as in
    /// [`HnswParams::new`], so `ef_construction` below `m` is raised to `m`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Config`] if `m`, `ef_construction` or
    /// `ef_search` is zero, and [`crate::Error::ResourceExhausted`] if the
    /// graph cannot grow.
    pub fn build(store: VectorStore, metric: D, params: HnswParams) -> Result<Self> {
        let params = HnswParams::new(params.m, params.ef_construction, params.ef_search)?
            .with_seed(params.seed);
        let start = Instant::now();
        let seed = params.seed.unwrap_or_else(rand::random);
        let mut rng = StdRng::seed_from_u64(seed);
        tracing::debug!(
            points = store.len(),
            m = params.m,
            ef_construction = params.ef_construction,
            seed,
            "Building HNSW index"
        );

        let mut graph = HnswGraph::new(params);
        for node in 0..store.len() {
            graph.insert(node, &store, &metric, &mut rng)?;
        }

        tracing::info!(
            points = graph.len(),
            max_level = graph.max_level,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "HNSW index built"
        );
        Ok(Self {
            store,
            metric,
            graph,
        })
    }

    /// Returns approximately the `k` nearest records, using the configured
    /// `ef_search`.
    ///
    /// # Errors
    ///
    /// See [`NearestNeighbors::search`].
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor>> {
        self.search_with_ef(query, k, self.graph.params.ef_search)
    }

    /// Like [`search`](Self::search) with an explicit candidate width.
    ///
    /// The effective width is `max(ef, k)`.
    ///
    /// # Errors
    ///
    /// See [`NearestNeighbors::search`].
    pub fn search_with_ef(&self, query: &[f32], k: usize, ef: usize) -> Result<Vec<Neighbor>> {
        let k = validate_query(query, k, self.store.dimension(), self.store.len())?;
        Ok(self
            .graph
            .search(&self.store, &self.metric, query, k, ef)
            .into_iter()
            .map(|(node, distance)| Neighbor::new(self.store.id(node), distance))
            .collect())
    }

    /// Build parameters.
    #[must_use]
    pub fn params(&self) -> &HnswParams {
        &self.graph.params
    }

    /// Highest populated layer.
    #[must_use]
    pub fn max_level(&self) -> usize {
        self.graph.max_level
    }

    /// Store position of the entry node, `None` when empty.
    #[must_use]
    pub fn entry_point(&self) -> Option<NodeId> {
        self.graph.entry_point
    }

    /// Highest layer `node` lives in.
    #[must_use]
    pub fn level_of(&self, node: NodeId) -> Option<usize> {
        self.graph.levels.get(node).copied()
    }

    /// Neighbors of `node` on `layer`. Empty if either is unknown.
    #[must_use]
    pub fn neighbors(&self, node: NodeId, layer: usize) -> &[NodeId] {
        self.graph
            .layers
            .get(layer)
            .map_or(&[][..], |l| l.get_neighbors(node))
    }

    /// Number of nodes living in `layer`.
    #[must_use]
    pub fn layer_size(&self, layer: usize) -> usize {
        self.graph.levels.iter().filter(|&&l| l >= layer).count()
    }

    /// The indexed store.
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

impl<D: Distance> NearestNeighbors for HnswIndex<D> {
    fn search(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor>> {
        HnswIndex::search(self, query, k)
    }

    fn len(&self) -> usize {
        self.store.len()
    }

    fn dimension(&self) -> usize {
        self.store.dimension()
    }

    fn kind(&self) -> IndexKind {
        IndexKind::Hnsw
    }
}
