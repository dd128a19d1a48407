//! Distance metrics for nearest-neighbor search.
//!
//! Every index in this crate is generic over [`Distance`], the pluggable
//! dissimilarity seam. [`DistanceMetric`] is the built-in implementation
//! backed by the explicit SIMD kernels in [`crate::simd`].
//!
//! All distances are "lower is closer". Brute force and HNSW accept any
//! symmetric dissimilarity; the vantage-point tree is only exact when the
//! function also satisfies the triangle inequality (see
//! [`Distance::is_metric`]).

use crate::simd;
use serde::{Deserialize, Serialize};

/// A symmetric, non-negative dissimilarity between two equal-length vectors.
///
/// Implementations must be pure: the same pair of inputs always yields the
/// same value, in either argument order.
pub trait Distance: Send + Sync {
    /// Computes the distance between `a` and `b`.
    fn distance(&self, a: &[f32], b: &[f32]) -> f32;

    /// Returns true if this function satisfies the triangle inequality.
    ///
    /// The vantage-point tree relies on it for exact pruning.
    fn is_metric(&self) -> bool {
        false
    }
}

/// Built-in distance functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistanceMetric {
    /// Squared L2 distance. Cheapest; ranks like `Euclidean` but is not a metric.
    #[default]
    SquaredEuclidean,

    /// L2 distance.
    Euclidean,

    /// L1 distance.
    Manhattan,

    /// Cosine distance, `1 - cos(a, b)`. Zero vectors are at distance 1.
    Cosine,
}

impl DistanceMetric {
    /// Calculates the distance between two vectors.
    ///
    /// # Performance
    ///
    /// Uses the 8-lane SIMD kernels; the remainder of a dimension that is not
    /// a multiple of 8 goes through a scalar loop.
    #[must_use]
    #[inline]
    pub fn calculate(&self, a: &[f32], b: &[f32]) -> f32 {
        match self {
            Self::SquaredEuclidean => simd::squared_l2(a, b),
            Self::Euclidean => simd::squared_l2(a, b).sqrt(),
            Self::Manhattan => simd::manhattan(a, b),
            Self::Cosine => simd::cosine_distance(a, b),
        }
    }

    /// Returns the metric's configuration name (`"squared_euclidean"`, ...).
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::SquaredEuclidean => "squared_euclidean",
            Self::Euclidean => "euclidean",
            Self::Manhattan => "manhattan",
            Self::Cosine => "cosine",
        }
    }
}

impl Distance for DistanceMetric {
    #[inline]
    fn distance(&self, a: &[f32], b: &[f32]) -> f32 {
        self.calculate(a, b)
    }

    fn is_metric(&self) -> bool {
        matches!(self, Self::Euclidean | Self::Manhattan)
    }
}

impl<D: Distance + ?Sized> Distance for &D {
    #[inline]
    fn distance(&self, a: &[f32], b: &[f32]) -> f32 {
        (**self).distance(a, b)
    }

    fn is_metric(&self) -> bool {
        (**self).is_metric()
    }
}

impl std::fmt::Display for DistanceMetric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for DistanceMetric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "squared_euclidean" | "l2sq" | "l2_squared" => Ok(Self::SquaredEuclidean),
            "euclidean" | "l2" => Ok(Self::Euclidean),
            "manhattan" | "l1" => Ok(Self::Manhattan),
            "cosine" => Ok(Self::Cosine),
            other => Err(format!(
                "unknown metric '{other}', expected one of: squared_euclidean, euclidean, manhattan, cosine"
            )),
        }
    }
}
