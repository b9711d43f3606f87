//! Error types for store operations.

use std::io;
use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A slot key contains characters the backend cannot represent.
    #[error("invalid slot key: {0}")]
    InvalidKey(String),

    /// The store is closed or its root directory is gone.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}
