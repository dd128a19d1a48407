//! `fastann` Configuration Module
//!
//! Provides configuration file support via `fastann.toml`, environment
//! variables, and programmatic overrides.
//!
//! # Priority (highest to lowest)
//!
//! 1. Environment variables (`FASTANN_*`, sections separated by `__`,
//!    e.g. `FASTANN_HNSW__EF_SEARCH=200`)
//! 2. Configuration file (`fastann.toml`)
//! 3. Default values

use crate::distance::DistanceMetric;
use crate::index::vptree::DEFAULT_PARALLEL_THRESHOLD;
use crate::index::IndexKind;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default configuration file name.
pub const DEFAULT_CONFIG_FILE: &str = "fastann.toml";

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "FASTANN_";

/// Largest accepted `hnsw.m`.
const MAX_M: usize = 1024;

const LOG_LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];
const LOG_FORMATS: [&str; 2] = ["text", "json"];

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to parse configuration.
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    /// Invalid configuration value.
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue {
        /// Configuration key that failed validation.
        key: String,
        /// Validation error message.
        message: String,
    },

    /// IO error.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl ConfigError {
    fn invalid(key: &str, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            key: key.to_string(),
            message: message.into(),
        }
    }
}

impl From<ConfigError> for crate::error::Error {
    fn from(err: ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

/// Index selection section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    /// Which index to build.
    pub algorithm: IndexKind,
    /// Distance function used for build and search.
    pub metric: DistanceMetric,
}

/// Search configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Number of neighbors returned per query.
    pub k: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self { k: 100 }
    }
}

/// HNSW index configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HnswConfig {
    /// Target out-degree per node (M parameter).
    pub m: usize,
    /// Candidate list width during construction.
    pub ef_construction: usize,
    /// Candidate list width during search.
    pub ef_search: usize,
    /// Seed for level assignment. `None` draws from OS entropy.
    pub seed: Option<u64>,
}

impl Default for HnswConfig {
    fn default() -> Self {
        Self {
            m: 16,
            ef_construction: 200,
            ef_search: 100,
            seed: None,
        }
    }
}

/// Vantage-point tree configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VpTreeConfig {
    /// Seed for pivot selection. `None` draws from OS entropy.
    pub seed: Option<u64>,
    /// Build independent subtrees concurrently (needs the `parallel` feature).
    pub parallel: bool,
    /// Smallest range length handed to another thread.
    pub parallel_threshold: usize,
}

impl Default for VpTreeConfig {
    fn default() -> Self {
        Self {
            seed: None,
            parallel: true,
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
        }
    }
}

/// Logging configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace.
    pub level: String,
    /// Log format: text or json.
    pub format: String,
    /// Log file. Diagnostics go to stderr when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "text".to_string(),
            file: None,
        }
    }
}

/// Main `fastann` configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct FastAnnConfig {
    /// Index selection.
    pub index: IndexConfig,
    /// Search configuration.
    pub search: SearchConfig,
    /// HNSW configuration.
    pub hnsw: HnswConfig,
    /// Vantage-point tree configuration.
    pub vptree: VpTreeConfig,
    /// Logging configuration.
    pub logging: LoggingConfig,
}

impl FastAnnConfig {
    /// Loads configuration from default sources.
    ///
    /// Priority: defaults < `fastann.toml` < environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration parsing fails.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_path(DEFAULT_CONFIG_FILE)
    }

    /// Loads configuration from a specific file path.
    ///
    /// A missing file is not an error; defaults and environment still apply.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration parsing fails.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        extract(
            Self::with_defaults()
                .merge(Toml::file(path.as_ref()))
                .merge(Env::prefixed(ENV_PREFIX).split("__")),
        )
    }

    /// Creates a configuration from a TOML string, ignoring the environment.
    ///
    /// # Errors
    ///
    /// Returns an error if parsing fails.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        extract(Self::with_defaults().merge(Toml::string(toml_str)))
    }

    fn with_defaults() -> Figment {
        Figment::from(Serialized::defaults(Self::default()))
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error naming the first invalid key.
    pub fn validate(&self) -> Result<(), ConfigError> {
        at_least("search.k", self.search.k, 1)?;

        at_least("hnsw.m", self.hnsw.m, 1)?;
        if self.hnsw.m > MAX_M {
            return Err(ConfigError::invalid(
                "hnsw.m",
                format!("value {} exceeds {MAX_M}", self.hnsw.m),
            ));
        }
        at_least("hnsw.ef_construction", self.hnsw.ef_construction, 1)?;
        at_least("hnsw.ef_search", self.hnsw.ef_search, 1)?;

        at_least("vptree.parallel_threshold", self.vptree.parallel_threshold, 2)?;

        one_of("logging.level", &self.logging.level, &LOG_LEVELS)?;
        one_of("logging.format", &self.logging.format, &LOG_FORMATS)
    }

    /// Serializes the configuration to TOML.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ParseError(e.to_string()))
    }
}

fn extract(figment: Figment) -> Result<FastAnnConfig, ConfigError> {
    figment
        .extract()
        .map_err(|e| ConfigError::ParseError(e.to_string()))
}

fn at_least(key: &str, value: usize, min: usize) -> Result<(), ConfigError> {
    if value < min {
        return Err(ConfigError::invalid(
            key,
            format!("value {value} must be >= {min}"),
        ));
    }
    Ok(())
}

fn one_of(key: &str, value: &str, allowed: &[&str]) -> Result<(), ConfigError> {
    if !allowed.contains(&value) {
        return Err(ConfigError::invalid(
            key,
            format!("'{value}' is not one of {}", allowed.join(", ")),
        ));
    }
    Ok(())
}
