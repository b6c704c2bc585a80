//! Error types for KAN operations

use thiserror::Error;

/// KAN-specific errors
#[derive(Debug, Error)]
pub enum KanError {
    /// Invalid network configuration (bad shape, input-id mismatch)
    #[error("Invalid network configuration: {0}")]
    InvalidConfig(String),

    /// Arity mismatch between a call and the network's input layer
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
}

/// Result type for KAN operations
pub type Result<T> = std::result::Result<T, KanError>;
