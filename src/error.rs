//! Error types for the distribution scorer
//!
//! ## Table of Contents
//! - **ScorerError**: Main error enum covering all failure modes
//! - **Result**: Type alias for `Result<T, ScorerError>`

use thiserror::Error;

/// Result type alias for scorer operations
pub type Result<T> = std::result::Result<T, ScorerError>;

/// Main error type for the distribution scorer
#[derive(Error, Debug)]
pub enum ScorerError {
    /// Configuration error (malformed URL, invalid weight, bad env var)
    #[error("configuration error: {0}")]
    Config(String),

    /// No allocation survived feasibility pruning
    #[error("infeasible: {0}")]
    Infeasible(String),

    /// The AHP evaluator was unreachable, returned a non-success status, or
    /// its response could not be decoded
    #[error("ahp evaluator error: {0}")]
    RemoteEvaluator(String),

    /// The AHP evaluator returned an empty score list
    #[error("no winning allocation: {0}")]
    NoWinner(String),

    /// The enumeration ceiling was exceeded before any allocation was produced
    #[error("too many allocations: {0}")]
    TooManyAllocations(String),

    /// Bin packer was invoked with a replica that cannot fit on any node
    #[error("bin packing error: {0}")]
    BinPacking(String),

    /// Metrics collection or export failure
    #[error("metrics error: {0}")]
    Metrics(String),

    /// A cancellation token fired before or during the operation
    #[error("cancelled: {0}")]
    Cancelled(String),

    /// Generic IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Internal error (should not occur in normal operation)
    #[error("internal error: {0}")]
    Internal(String),
}

impl ScorerError {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an infeasibility error
    pub fn infeasible(msg: impl Into<String>) -> Self {
        Self::Infeasible(msg.into())
    }

    /// Create an AHP evaluator error
    pub fn remote_evaluator(msg: impl Into<String>) -> Self {
        Self::RemoteEvaluator(msg.into())
    }

    /// Create a no-winner error
    pub fn no_winner(msg: impl Into<String>) -> Self {
        Self::NoWinner(msg.into())
    }

    /// Create a too-many-allocations error
    pub fn too_many_allocations(msg: impl Into<String>) -> Self {
        Self::TooManyAllocations(msg.into())
    }

    /// Create a bin-packing error
    pub fn bin_packing(msg: impl Into<String>) -> Self {
        Self::BinPacking(msg.into())
    }

    /// Create a metrics error
    pub fn metrics(msg: impl Into<String>) -> Self {
        Self::Metrics(msg.into())
    }

    /// Create a cancellation error
    pub fn cancelled(msg: impl Into<String>) -> Self {
        Self::Cancelled(msg.into())
    }
}

impl From<reqwest::Error> for ScorerError {
    fn from(err: reqwest::Error) -> Self {
        Self::RemoteEvaluator(err.to_string())
    }
}

impl From<prometheus::Error> for ScorerError {
    fn from(err: prometheus::Error) -> Self {
        Self::Metrics(err.to_string())
    }
}
