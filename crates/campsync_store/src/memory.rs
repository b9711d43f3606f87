//! In-memory slot store backend for testing.

use crate::backend::StoreBackend;
use crate::error::StoreResult;
use parking_lot::RwLock;
use std::collections::HashMap;

/// An in-memory slot store backend.
///
/// This backend stores all slots in memory and is suitable for:
/// - Unit tests
/// - Integration tests
/// - Ephemeral clients that don't need persistence
///
/// # Thread Safety
///
/// This backend is thread-safe and can be shared across threads.
///
/// # Example
///
/// ```rust
/// use campsync_store::{InMemoryBackend, StoreBackend};
///
/// let backend = InMemoryBackend::new();
/// backend.write("guest-messages", b"[]").unwrap();
/// assert_eq!(backend.read("guest-messages").unwrap(), Some(b"[]".to_vec()));
/// ```
#[derive(Debug, Default)]
pub struct InMemoryBackend {
    slots: RwLock<HashMap<String, Vec<u8>>>,
}

impl InMemoryBackend {
    /// Creates a new empty in-memory backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a backend pre-seeded with slot contents.
    ///
    /// Useful for testing recovery and corruption scenarios.
    #[must_use]
    pub fn with_slots(slots: HashMap<String, Vec<u8>>) -> Self {
        Self {
            slots: RwLock::new(slots),
        }
    }

    /// Returns the keys of all existing slots.
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        self.slots.read().keys().cloned().collect()
    }

    /// Clears all slots.
    pub fn clear(&self) {
        self.slots.write().clear();
    }
}

impl StoreBackend for InMemoryBackend {
    fn read(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        Ok(self.slots.read().get(key).cloned())
    }

    fn write(&self, key: &str, data: &[u8]) -> StoreResult<()> {
        self.slots.write().insert(key.to_string(), data.to_vec());
        Ok(())
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        self.slots.write().remove(key);
        Ok(())
    }
}
