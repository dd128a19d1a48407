//! Nearest-neighbor indexes.
//!
//! Three implementations share the [`NearestNeighbors`] trait:
//!
//! - [`BruteForceIndex`]: linear scan, always exact, the reference oracle.
//! - [`VpTree`]: vantage-point tree, exact for true metrics.
//! - [`HnswIndex`]: hierarchical navigable small world graph, approximate.
//!
//! Every index takes ownership of a [`VectorStore`] at build time and is
//! read-only afterwards, so a built index can be queried from many threads.

mod brute_force;
pub mod hnsw;
pub mod vptree;


pub use brute_force::BruteForceIndex;
pub use hnsw::{HnswIndex, HnswParams};
pub use vptree::{VpNode, VpTree, VpTreeParams};

use crate::config::FastAnnConfig;
use crate::distance::DistanceMetric;
use crate::error::{Error, Result};
use crate::store::VectorStore;
use crate::topk::Neighbor;
use serde::{Deserialize, Serialize};

/// Common query surface of every index.
pub trait NearestNeighbors: Send + Sync {
    /// Returns up to `k` neighbors of `query`, ascending by distance.
    ///
    /// `k` larger than the index is clamped; an empty index yields `[]`.
    ///
    /// # Errors
    ///
    /// - [`Error::DimensionMismatch`] if `query.len()` differs from the
    ///   indexed dimension.
    /// - [`Error::InvalidArgument`] if `k` is zero.
    fn search(&self, query: &[f32], k: usize) -> Result<Vec<Neighbor>>;

    /// Number of indexed points.
    fn len(&self) -> usize;

    /// Returns true if nothing is indexed.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Dimension of indexed vectors.
    fn dimension(&self) -> usize;

    /// Which algorithm backs this index.
    fn kind(&self) -> IndexKind;
}

/// Index algorithm selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexKind {
    /// Exhaustive linear scan.
    BruteForce,
    /// Vantage-point tree.
    VpTree,
    /// HNSW graph (default).
    #[default]
    Hnsw,
}

impl IndexKind {
    /// Returns the configuration name (`"brute_force"`, `"vp_tree"`, `"hnsw"`).
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::BruteForce => "brute_force",
            Self::VpTree => "vp_tree",
            Self::Hnsw => "hnsw",
        }
    }

    /// Returns true if the algorithm returns exact results
    /// (for the VP tree: given a true metric).
    #[must_use]
    pub const fn is_exact(&self) -> bool {
        matches!(self, Self::BruteForce | Self::VpTree)
    }
}

impl std::fmt::Display for IndexKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for IndexKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "brute_force" | "bruteforce" | "flat" => Ok(Self::BruteForce),
            "vp_tree" | "vptree" | "vp" => Ok(Self::VpTree),
            "hnsw" => Ok(Self::Hnsw),
            other => Err(format!(
                "unknown index '{other}', expected one of: brute_force, vp_tree, hnsw"
            )),
        }
    }
}

/// Builds the index selected by `kind`, taking its parameters from `config`.
///
/// # Errors
///
/// Propagates parameter validation and allocation errors from the builder.
pub fn build_index(
    kind: IndexKind,
    store: VectorStore,
    metric: DistanceMetric,
    config: &FastAnnConfig,
) -> Result<Box<dyn NearestNeighbors>> {
    let index: Box<dyn NearestNeighbors> = match kind {
        IndexKind::BruteForce => Box::new(BruteForceIndex::build(store, metric)),
        IndexKind::VpTree => {
            let params = VpTreeParams::from_config(&config.vptree);
            Box::new(VpTree::build(store, metric, &params)?)
        }
        IndexKind::Hnsw => {
            let params = HnswParams::from_config(&config.hnsw)?;
            Box::new(HnswIndex::build(store, metric, params)?)
        }
    };
    Ok(index)
}

/// Checks the shared query contract and returns the effective `k`.
///
/// The returned value is `k` clamped to `len`.
pub(crate) fn validate_query(
    query: &[f32],
    k: usize,
    dimension: usize,
    len: usize,
) -> Result<usize> {
    if query.len() != dimension {
        return Err(Error::DimensionMismatch {
            expected: dimension,
            actual: query.len(),
        });
    }
    if k == 0 {
        return Err(Error::InvalidArgument("k must be at least 1".to_string()));
    }
    Ok(k.min(len))
}
