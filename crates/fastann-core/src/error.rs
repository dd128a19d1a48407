//! Error types for `fastann`.
//!
//! This module provides a unified error type for building and querying
//! every index in the crate.

use thiserror::Error;

/// Result type alias for `fastann` operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in `fastann` operations.
///
/// Error codes follow the pattern `FANN-XXX` for easy debugging.
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid construction parameter (FANN-001).
    ///
    /// Dimension of zero, `M < 1`, or any other rejected index setting.
    #[error("[FANN-001] Configuration error: {0}")]
    Config(String),

    /// Dimension mismatch (FANN-002).
    #[error("[FANN-002] Vector dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected dimension.
        expected: usize,
        /// Actual dimension.
        actual: usize,
    },

    /// Invalid call argument (FANN-003).
    #[error("[FANN-003] Invalid argument: {0}")]
    InvalidArgument(String),

    /// Positional access past the end of a store (FANN-004).
    ///
    /// This is a programmer error: callers are expected to enforce bounds.
    #[error("[FANN-004] Position {position} out of range for store of {len} records")]
    IndexOutOfRange {
        /// Requested position.
        position: usize,
        /// Number of records in the store.
        len: usize,
    },

    /// Allocation failure while growing an index structure (FANN-005).
    #[error("[FANN-005] Resource exhausted: {0}")]
    ResourceExhausted(String),
}

impl Error {
    /// Returns the error code (e.g., "FANN-001").
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Config(_) => "FANN-001",
            Self::DimensionMismatch { .. } => "FANN-002",
            Self::InvalidArgument(_) => "FANN-003",
            Self::IndexOutOfRange { .. } => "FANN-004",
            Self::ResourceExhausted(_) => "FANN-005",
        }
    }

    /// Returns true if this error is recoverable.
    ///
    /// Out-of-range access and allocation failure are not: the first is a
    /// caller bug, the second leaves nothing to retry with.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        !matches!(
            self,
            Self::IndexOutOfRange { .. } | Self::ResourceExhausted(_)
        )
    }
}

impl From<std::collections::TryReserveError> for Error {
    fn from(err: std::collections::TryReserveError) -> Self {
        Self::ResourceExhausted(err.to_string())
    }
}
