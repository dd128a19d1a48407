//! Vantage-point tree build parameters.

use crate::config::VpTreeConfig;
use serde::{Deserialize, Serialize};

/// Range length below which subtrees are always built on the calling thread.
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 4096;

/// Vantage-point tree build parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VpTreeParams {
    /// Seed for pivot selection. `None` draws a fresh seed per build.
    pub seed: Option<u64>,
    /// Build the two subtrees of large nodes concurrently.
    ///
    /// Ignored when the crate is compiled without the `parallel` feature.
    /// The resulting tree is identical either way for a given seed.
    pub parallel: bool,
    /// Minimum node range length that is split across threads.
    pub parallel_threshold: usize,
}

impl Default for VpTreeParams {
    fn default() -> Self {
        Self {
            seed: None,
            parallel: true,
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
        }
    }
}

impl VpTreeParams {
    /// Parameters with a fixed seed, for reproducible trees.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..Self::default()
        }
    }

    /// Disables concurrent subtree construction.
    #[must_use]
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    /// Derives parameters from the `[vptree]` configuration section.
    #[must_use]
    pub fn from_config(config: &VpTreeConfig) -> Self {
        Self {
            seed: config.seed,
            parallel: config.parallel,
            parallel_threshold: config.parallel_threshold.max(2),
        }
    }
}
