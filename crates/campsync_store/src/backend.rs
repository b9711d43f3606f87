//! Slot store backend trait definition.

use crate::error::StoreResult;

/// A low-level slot store backend for Campsync.
///
/// Backends are **opaque slot stores**. Each key addresses one slot that
/// holds a single serialized value; `write` replaces the slot wholesale.
/// Backends do not understand queue items or telemetry events - the engine
/// owns all encoding.
///
/// # Invariants
///
/// - `read` returns exactly the bytes of the last successful `write`, or
///   `None` if the slot was never written or has been removed
/// - `write` is atomic per slot: a crashed write leaves either the old or
///   the new value, never a torn one
/// - Backends must be `Send + Sync` so engine components can share them
///
/// # Implementors
///
/// - [`super::InMemoryBackend`] - For testing
/// - [`super::FileBackend`] - For persistent storage
pub trait StoreBackend: Send + Sync {
    /// Reads the current contents of a slot.
    ///
    /// Returns `None` if the slot does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if an I/O error occurs.
    fn read(&self, key: &str) -> StoreResult<Option<Vec<u8>>>;

    /// Replaces the contents of a slot.
    ///
    /// Creates the slot if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is invalid or an I/O error occurs.
    fn write(&self, key: &str, data: &[u8]) -> StoreResult<()>;

    /// Removes a slot entirely.
    ///
    /// Removing a slot that does not exist is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if an I/O error occurs.
    fn remove(&self, key: &str) -> StoreResult<()>;
}
