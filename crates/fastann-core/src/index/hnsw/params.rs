//! HNSW index parameters.

use crate::config::HnswConfig;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Highest layer a node can be assigned to.
pub const MAX_LEVEL: usize = 16;

/// HNSW index parameters for tuning recall against build and query cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HnswParams {
    /// Target out-degree per node on upper layers (M parameter).
    /// Layer 0 allows twice as many links.
    pub m: usize,
    /// Candidate list width during construction. Never below `m`.
    pub ef_construction: usize,
    /// Candidate list width during search.
    pub ef_search: usize,
    /// Seed for level assignment. `None` draws a fresh seed per build.
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for HnswParams {
    fn default() -> Self {
        Self {
            m: 16,
            ef_construction: 200,
            ef_search: 100,
            seed: None,
        }
    }
}

impl HnswParams {
    /// Creates validated parameters.
    ///
    /// `ef_construction` below `m` is raised to `m`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if `m`, `ef_construction` or `ef_search` is zero.
    pub fn new(m: usize, ef_construction: usize, ef_search: usize) -> Result<Self> {
        if m == 0 {
            return Err(Error::Config("HNSW M must be at least 1".to_string()));
        }
        if ef_construction == 0 {
            return Err(Error::Config(
                "HNSW ef_construction must be at least 1".to_string(),
            ));
        }
        if ef_search == 0 {
            return Err(Error::Config("HNSW ef_search must be at least 1".to_string()));
        }
        Ok(Self {
            m,
            ef_construction: ef_construction.max(m),
            ef_search,
            seed: None,
        })
    }

    /// Derives parameters from the `[hnsw]` configuration section.
    ///
    /// # Errors
    ///
    /// Same as [`HnswParams::new`].
    pub fn from_config(config: &HnswConfig) -> Result<Self> {
        Ok(Self::new(config.m, config.ef_construction, config.ef_search)?.with_seed(config.seed))
    }

    /// Sets the level-assignment seed.
    #[must_use]
    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    /// Degree cap on layer 0 (`Mmax0 = 2M`).
    #[must_use]
    pub const fn m_max0(&self) -> usize {
        self.m * 2
    }

    /// Degree cap on `layer`.
    #[must_use]
    pub const fn max_connections(&self, layer: usize) -> usize {
        if layer == 0 {
            self.m_max0()
        } else {
            self.m
        }
    }

    /// Level multiplier `ml = 1 / ln(M)`.
    ///
    /// `M == 1` uses `ln 2` so the multiplier stays finite.
    #[must_use]
    pub fn level_multiplier(&self) -> f64 {
        1.0 / (self.m.max(2) as f64).ln()
    }
}
