//! Result-quality and latency measures for evaluating indexes.
//!
//! Quality is measured against exact neighbor ids from the brute-force
//! oracle:
//! - **Recall@k**: share of the true neighbors that were returned
//! - **Precision@k**: share of the returned ids that are true neighbors
//! - **Reciprocal rank**: `1 / rank` of the first true neighbor returned
//!
//! [`LatencyStats`] summarizes per-query timings.
//!
//! # Example
//!
//! ```rust
//! use fastann_core::metrics::{mrr, precision_at_k, recall_at_k};
//!
//! let exact = [1u64, 2, 3, 4, 5];
//! let returned = [1u64, 3, 6, 2, 7];
//!
//! assert!((recall_at_k(&exact, &returned) - 0.6).abs() < 1e-9);
//! assert!((precision_at_k(&exact, &returned) - 0.6).abs() < 1e-9);
//! assert!((mrr(&exact, &returned) - 1.0).abs() < 1e-9);
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::hash::Hash;
use std::time::Duration;

/// Number of `results` entries found in `ground_truth`.
fn overlap<T: Eq + Hash>(ground_truth: &[T], results: &[T]) -> usize {
    let exact: HashSet<&T> = ground_truth.iter().collect();
    results.iter().filter(|id| exact.contains(id)).count()
}

/// `part / whole`, or 0.0 for an empty whole.
fn share(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64
    }
}

/// `|ground_truth ∩ results| / |ground_truth|`; 0.0 for empty ground truth.
#[must_use]
pub fn recall_at_k<T: Eq + Hash>(ground_truth: &[T], results: &[T]) -> f64 {
    share(overlap(ground_truth, results), ground_truth.len())
}

/// `|ground_truth ∩ results| / |results|`; 0.0 for empty results.
#[must_use]
pub fn precision_at_k<T: Eq + Hash>(ground_truth: &[T], results: &[T]) -> f64 {
    share(overlap(ground_truth, results), results.len())
}

/// Reciprocal rank of the first returned id that is a true neighbor.
///
/// 0.0 when none is.
#[must_use]
pub fn mrr<T: Eq + Hash>(ground_truth: &[T], results: &[T]) -> f64 {
    let exact: HashSet<&T> = ground_truth.iter().collect();
    results
        .iter()
        .position(|id| exact.contains(id))
        .map_or(0.0, |rank| 1.0 / (rank + 1) as f64)
}

/// Mean quality over a query set.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct QualityMetrics {
    /// Number of scored queries.
    pub queries: usize,
    /// Mean recall@k.
    pub recall: f64,
    /// Mean precision@k.
    pub precision: f64,
    /// Mean reciprocal rank.
    pub mrr: f64,
}

/// Scores paired per-query id lists; unpaired trailing entries are ignored.
#[must_use]
pub fn average_metrics<T: Eq + Hash>(
    ground_truths: &[Vec<T>],
    results: &[Vec<T>],
) -> QualityMetrics {
    let pairs = ground_truths.iter().zip(results);
    let queries = pairs.len();
    if queries == 0 {
        return QualityMetrics::default();
    }

    let mut sum = QualityMetrics {
        queries,
        ..QualityMetrics::default()
    };
    for (exact, returned) in pairs {
        sum.recall += recall_at_k(exact, returned);
        sum.precision += precision_at_k(exact, returned);
        sum.mrr += mrr(exact, returned);
    }

    let n = queries as f64;
    QualityMetrics {
        queries,
        recall: sum.recall / n,
        precision: sum.precision / n,
        mrr: sum.mrr / n,
    }
}

/// Latency summary over a set of query timings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LatencyStats {
    /// Number of samples.
    pub count: usize,
    /// Fastest sample.
    pub min: Duration,
    /// Slowest sample.
    pub max: Duration,
    /// Arithmetic mean.
    pub mean: Duration,
    /// Median.
    pub p50: Duration,
    /// 95th percentile.
    pub p95: Duration,
    /// 99th percentile.
    pub p99: Duration,
}

/// Computes nearest-rank percentiles of `samples`.
///
/// All fields are zero for an empty input.
#[must_use]
pub fn compute_latency_percentiles(samples: &[Duration]) -> LatencyStats {
    if samples.is_empty() {
        return LatencyStats::default();
    }

    let mut sorted = samples.to_vec();
    sorted.sort_unstable();
    let total: Duration = sorted.iter().sum();

    LatencyStats {
        count: sorted.len(),
        min: sorted[0],
        max: sorted[sorted.len() - 1],
        mean: total / sorted.len() as u32,
        p50: percentile(&sorted, 50),
        p95: percentile(&sorted, 95),
        p99: percentile(&sorted, 99),
    }
}

/// Nearest-rank percentile of a non-empty ascending slice.
fn percentile(sorted: &[Duration], pct: usize) -> Duration {
    let rank = (pct * sorted.len()).div_ceil(100).max(1);
    sorted[rank - 1]
}
