//! # `fastann` Core
//!
//! Exact and approximate k-nearest-neighbor search over fixed-dimension
//! `f32` vectors.
//!
//! ## Features
//!
//! - **Brute force**: exhaustive scan, the ground-truth oracle
//! - **Vantage-point tree**: exact branch-and-bound search for true metrics,
//!   with optional parallel construction
//! - **HNSW**: approximate multi-layer graph search with tunable recall
//! - **Explicit SIMD** distance kernels (8-lane `wide::f32x8`)
//! - **Layered configuration** via `fastann.toml` and `FASTANN_*` variables
//!
//! ## Quick Start
//!
//! ```rust
//! use fastann_core::{DistanceMetric, VectorStore, VpTree, VpTreeParams};
//!
//! let mut store = VectorStore::new(2)?;
//! store.append(0, &[0.0, 0.0])?;
//! store.append(1, &[1.0, 0.0])?;
//! store.append(2, &[0.0, 1.0])?;
//! store.append(3, &[5.0, 5.0])?;
//!
//! let tree = VpTree::build(store, DistanceMetric::Euclidean, &VpTreeParams::seeded(7))?;
//! let hits = tree.search(&[0.0, 0.0], 2)?;
//!
//! assert_eq!(hits[0].id, 0);
//! assert!((hits[1].distance - 1.0).abs() < 1e-6);
//! # Ok::<(), fastann_core::Error>(())
//! ```
//!
//! Indexes own their [`VectorStore`] and are read-only once built, so
//! queries may run concurrently from any number of threads.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
// Distances are f32 and counts are usize; the casts between them are bounded.
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::redundant_pub_crate)]
#![allow(clippy::doc_markdown)]

pub mod config;
#[cfg(test)]
mod config_tests;
pub mod distance;
pub mod error;
pub mod index;
pub mod metrics;
#[cfg(test)]
mod metrics_tests;
mod ordered_float;
pub mod simd;
pub mod store;
#[cfg(test)]
mod store_tests;
pub mod topk;

pub use config::{
    ConfigError, FastAnnConfig, HnswConfig, IndexConfig, LoggingConfig, SearchConfig,
    VpTreeConfig,
};
pub use distance::{Distance, DistanceMetric};
pub use error::{Error, Result};
pub use index::{
    build_index, BruteForceIndex, HnswIndex, HnswParams, IndexKind, NearestNeighbors, VpNode,
    VpTree, VpTreeParams,
};
pub use metrics::{
    average_metrics, compute_latency_percentiles, mrr, precision_at_k, recall_at_k, LatencyStats,
    QualityMetrics,
};
pub use store::{RecordRef, VectorStore};
pub use topk::{merge_neighbors, BoundedTopK, Neighbor};
