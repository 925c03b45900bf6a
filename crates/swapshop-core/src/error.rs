// crates/swapshop-core/src/error.rs

use thiserror::Error;

/// Workspace-wide error types for the SwapShop trust-score subsystem.
#[derive(Debug, Error)]
pub enum SwapshopError {
    /// Caller-supplied input rejected before any mutation.
    #[error("Validation error: {0}")]
    Validation(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// A record with the same unique key already exists.
    #[error("Already exists: {0}")]
    AlreadyExists(String),

    /// Optimistic version check failed on save.
    #[error("Concurrency conflict: {0}")]
    ConcurrencyConflict(String),

    /// Concurrent writers kept winning; the bounded retry budget ran out.
    #[error("Transient failure after {attempts} attempts: {message}")]
    TransientFailure { attempts: u32, message: String },

    /// Storage layer error (RocksDB, in-memory backend).
    #[error("Storage error: {0}")]
    Storage(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// The denormalized user projection could not be updated.
    #[error("Projection sync error: {0}")]
    ProjectionSync(String),
}

impl SwapshopError {
    /// Whether retrying the same operation later may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            SwapshopError::ConcurrencyConflict(_) | SwapshopError::TransientFailure { .. }
        )
    }
}

impl From<serde_json::Error> for SwapshopError {
    fn from(e: serde_json::Error) -> Self {
        SwapshopError::Serialization(e.to_string())
    }
}
