//! Exhaustive linear-scan search.

use super::{validate_query, IndexKind, NearestNeighbors};
use crate::distance::{Distance, DistanceMetric};
use crate::error::Result;
use crate::store::VectorStore;
use crate::topk::{BoundedTopK, Neighbor};

/// Exact k-NN by scanning every stored vector. O(N·D) per query.
///
/// Used as ground truth for the other indexes.
#[derive(Debug, Clone)]
pub struct BruteForceIndex<D = DistanceMetric> {
    store: VectorStore,
    metric: D,
}

impl<D: Distance> BruteForceIndex<D> {
    /// Wraps `store`; there is nothing to precompute.
    #[must_use]
    pub fn build(store: VectorStore, metric: D) -> Self {
        Self { store, metric }
    }

    /// Returns the `k` nearest records to `query`, ascending by distance.
    ///
    /// # Errors
    ///
    /// See [`NearestNeighbors::search`].
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor>> {
        let k = validate_query(query, k, self.store.dimension(), self.store.len())?;
        let mut top = BoundedTopK::new(k);
        for record in self.store.iter() {
            top.offer(self.metric.distance(query, record.vector), record.id);
        }
        Ok(top.drain_sorted())
    }

    /// The underlying store.
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

impl<D: Distance> NearestNeighbors for BruteForceIndex<D> {
    fn search(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor>> {
        BruteForceIndex::search(self, query, k)
    }

    fn len(&self) -> usize {
        self.store.len()
    }

    fn dimension(&self) -> usize {
        self.store.dimension()
    }

    fn kind(&self) -> IndexKind {
        IndexKind::BruteForce
    }
}
