//! Error types for the search crate.

use thiserror::Error;

/// Result type alias for search operations.
pub type Result<T> = std::result::Result<T, SearchError>;

/// Errors that abort a matching run.
///
/// Per-pair faults never show up here; they are collected as
/// [`ScoringFailure`]s on the run outcome.
#[derive(Debug, Error)]
pub enum SearchError {
    /// A value set was empty after normalization
    #[error("Empty input: the {collection} collection has no values to match")]
    EmptyInput {
        /// Provenance label of the empty collection
        collection: String,
    },

    /// Threshold, limit or engine option outside its valid range
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// The run was cancelled before it completed
    #[error("Matching cancelled after {scored} of {total} pairs")]
    Cancelled {
        /// Pairs scored before the workers stopped
        scored: u64,
        /// Size of the full cross product
        total: u64,
    },

    /// The worker pool could not be started
    #[error("Worker pool error: {0}")]
    WorkerPool(String),
}

/// Error code for integration with fuzzy-lookup-core error handling.
/// Range: 11xxx for search errors.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchErrorCode {
    /// Empty value set
    EmptyInput = 11001,
    /// Invalid parameter
    InvalidParameter = 11002,
    /// Cancelled run
    Cancelled = 11003,
    /// Worker pool failure
    WorkerPool = 11004,
    /// Single pair could not be scored
    ScoringFailure = 11005,
}

impl SearchError {
    /// Returns the error code for this error.
    pub fn code(&self) -> SearchErrorCode {
        match self {
            SearchError::EmptyInput { .. } => SearchErrorCode::EmptyInput,
            SearchError::InvalidParameter(_) => SearchErrorCode::InvalidParameter,
            SearchError::Cancelled { .. } => SearchErrorCode::Cancelled,
            SearchError::WorkerPool(_) => SearchErrorCode::WorkerPool,
        }
    }

    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        SearchError::InvalidParameter(message.into())
    }
}

/// Why a single pair could not be scored.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScoreFault {
    /// A value exceeds the configured scoring length guard
    #[error("value has {chars} characters, limit is {limit}")]
    ValueTooLong {
        /// Length of the offending value in characters
        chars: usize,
        /// Configured `max_value_chars`
        limit: usize,
    },
}

/// A pair that was skipped because the scorer rejected it.
#[derive(Debug, Clone, PartialEq, Eq, Error, serde::Serialize)]
#[error("Scoring failed for ({source_value:?}, {target_value:?}): {reason}")]
pub struct ScoringFailure {
    /// Position of the source value in its value set
    pub source_index: usize,
    /// Position of the target value in its value set
    pub target_index: usize,
    /// The source value
    pub source_value: String,
    /// The target value
    pub target_value: String,
    /// Human readable reason
    pub reason: String,
}

impl ScoringFailure {
    /// Returns the error code shared by all scoring failures.
    pub fn code(&self) -> SearchErrorCode {
        SearchErrorCode::ScoringFailure
    }
}
