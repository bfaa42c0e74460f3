//! Error types for phishgnn.

use thiserror::Error;

/// Errors raised while building, training or sweeping models.
#[derive(Debug, Error)]
pub enum GnnError {
    /// Candle tensor error.
    #[error("tensor error: {0}")]
    Tensor(#[from] candle_core::Error),

    /// File access error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Result log (de)serialization error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Dataset exchange file error.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// Invalid configuration (missing widths, bad ratios, empty grids ...).
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// A graph violating the data model (no node, dangling edge ...).
    #[error("invalid graph: {0}")]
    InvalidGraph(String),

    /// Dimension mismatch between a layer and its input.
    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    /// Empty dataset or empty split.
    #[error("empty dataset: {0}")]
    EmptyDataset(String),

    /// The result record could not be durably written.
    #[error("persistence failure: {0}")]
    Persistence(String),
}

/// Result type alias.
pub type Result<T> = std::result::Result<T, GnnError>;
