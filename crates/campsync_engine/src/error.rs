//! Error types for the engine.

use crate::item::QueueKind;
use thiserror::Error;
use uuid::Uuid;

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors surfaced by engine commands.
///
/// Persistence failures never appear here; they are logged and swallowed so
/// the rest of the application stays usable.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The addressed item is not in the addressed queue.
    #[error("item {id} not found in queue {queue}")]
    ItemNotFound {
        /// Queue searched.
        queue: QueueKind,
        /// Item id requested.
        id: Uuid,
    },

    /// A flush is already outstanding; re-entrant triggers are refused.
    #[error("a flush is already in progress")]
    FlushInProgress,
}
