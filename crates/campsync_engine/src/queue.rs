//! Durable named queue store.

use crate::item::{QueueItem, QueueKind, QueuePayload};
use crate::telemetry::{EventStatus, EventType, TelemetryLog};
use campsync_store::StoreBackend;
use std::sync::Arc;
use tracing::warn;

/// Persisted, ordered collections of [`QueueItem`], one slot per
/// [`QueueKind`].
///
/// The store deliberately never surfaces persistence errors: a client that
/// cannot read its queue must degrade to "queue appears empty", and a client
/// that cannot write must keep working with a stale queue. Both cases are
/// logged so they stay diagnosable.
///
/// Callers keep load-mutate-save effectively single-threaded; the host
/// runtime is cooperative, so no locking is provided here.
#[derive(Clone)]
pub struct QueueStore {
    backend: Arc<dyn StoreBackend>,
}

impl QueueStore {
    /// Creates a queue store over a slot backend.
    pub fn new(backend: Arc<dyn StoreBackend>) -> Self {
        Self { backend }
    }

    /// Loads the current items of a queue in insertion order.
    ///
    /// An absent, unreadable, or corrupt slot yields an empty queue.
    #[must_use]
    pub fn load(&self, kind: QueueKind) -> Vec<QueueItem> {
        let key = kind.storage_key();
        let bytes = match self.backend.read(key) {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return Vec::new(),
            Err(e) => {
                warn!(queue = key, error = %e, "queue slot unreadable, treating as empty");
                return Vec::new();
            }
        };

        match serde_json::from_slice(&bytes) {
            Ok(items) => items,
            Err(e) => {
                warn!(queue = key, error = %e, "queue slot corrupt, treating as empty");
                Vec::new()
            }
        }
    }

    /// Replaces the persisted items of a queue.
    ///
    /// A failure to persist is logged and swallowed; losing one queue write
    /// must not crash the caller.
    pub fn save(&self, kind: QueueKind, items: &[QueueItem]) {
        let key = kind.storage_key();
        let bytes = match serde_json::to_vec(items) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(queue = key, error = %e, "queue encode failed, save skipped");
                return;
            }
        };
        if let Err(e) = self.backend.write(key, &bytes) {
            warn!(queue = key, error = %e, "queue save failed, queue left stale");
        }
    }

    /// Appends a new item to its owning queue and returns it.
    pub fn enqueue(&self, payload: QueuePayload) -> QueueItem {
        let item = QueueItem::new(payload);
        let kind = item.payload.kind();
        let mut items = self.load(kind);
        items.push(item.clone());
        self.save(kind, &items);
        item
    }

    /// Appends a new item and records a pending telemetry event for it.
    pub fn enqueue_with_telemetry(
        &self,
        payload: QueuePayload,
        telemetry: &TelemetryLog,
        source: &str,
    ) -> QueueItem {
        let item = self.enqueue(payload);
        telemetry.record(
            source,
            EventType::Queue,
            EventStatus::Pending,
            format!("Queued {} item", item.payload.kind().label()),
            Some(serde_json::json!({ "itemId": item.id })),
        );
        item
    }
}
