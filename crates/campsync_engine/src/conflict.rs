//! Conflict triage: the read model over flagged items plus the two
//! operator actions, retry and discard.

use crate::error::{EngineError, EngineResult};
use crate::item::{now_ms, QueueItem, QueueKind};
use crate::queue::QueueStore;
use crate::telemetry::{EventStatus, EventType, TelemetryLog};
use uuid::Uuid;

/// One conflicted item, paired with its owning queue for display.
#[derive(Debug, Clone, PartialEq)]
pub struct ConflictEntry {
    /// Owning queue.
    pub queue: QueueKind,
    /// Human label of the owning queue.
    pub label: &'static str,
    /// The flagged item.
    pub item: QueueItem,
}

/// Operator surface over conflicted items.
///
/// Both mutations are load-transform-save on the single owning queue; the
/// cooperative host runtime keeps that race-free.
#[derive(Clone)]
pub struct ConflictSurface {
    store: QueueStore,
    telemetry: TelemetryLog,
    source: String,
}

impl ConflictSurface {
    /// Creates a conflict surface over the given store and telemetry log.
    pub fn new(store: QueueStore, telemetry: TelemetryLog, source: impl Into<String>) -> Self {
        Self {
            store,
            telemetry,
            source: source.into(),
        }
    }

    /// Collects every conflicted item across all known queues.
    #[must_use]
    pub fn list(&self) -> Vec<ConflictEntry> {
        let mut entries = Vec::new();
        for kind in QueueKind::ALL {
            for item in self.store.load(kind) {
                if item.conflict {
                    entries.push(ConflictEntry {
                        queue: kind,
                        label: kind.label(),
                        item,
                    });
                }
            }
        }
        entries
    }

    /// Re-arms a conflicted item for the next automatic flush.
    ///
    /// Clears the conflict flag, resets the attempt count, and makes the
    /// item immediately eligible.
    pub fn retry(&self, queue: QueueKind, id: Uuid) -> EngineResult<()> {
        let mut items = self.store.load(queue);
        let item = items
            .iter_mut()
            .find(|item| item.id == id)
            .ok_or(EngineError::ItemNotFound { queue, id })?;

        item.conflict = false;
        item.attempts = 0;
        item.next_attempt_at = Some(now_ms());
        self.store.save(queue, &items);

        self.telemetry.record(
            &self.source,
            EventType::Conflict,
            EventStatus::Pending,
            format!("Retrying {} item", queue.label()),
            Some(serde_json::json!({ "itemId": id, "queue": queue.storage_key() })),
        );
        Ok(())
    }

    /// Permanently removes an item from its queue.
    ///
    /// The discard itself is the successful resolution, so it records a
    /// success event.
    pub fn discard(&self, queue: QueueKind, id: Uuid) -> EngineResult<()> {
        let mut items = self.store.load(queue);
        let before = items.len();
        items.retain(|item| item.id != id);
        if items.len() == before {
            return Err(EngineError::ItemNotFound { queue, id });
        }
        self.store.save(queue, &items);

        self.telemetry.record(
            &self.source,
            EventType::Conflict,
            EventStatus::Success,
            format!("Discarded {} item", queue.label()),
            Some(serde_json::json!({ "itemId": id, "queue": queue.storage_key() })),
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::QueuePayload;
    use campsync_store::{InMemoryBackend, StoreBackend};
    use serde_json::json;
    use std::sync::Arc;

    fn fixture() -> (ConflictSurface, QueueStore, TelemetryLog) {
        let backend: Arc<dyn StoreBackend> = Arc::new(InMemoryBackend::new());
        let store = QueueStore::new(Arc::clone(&backend));
        let telemetry = TelemetryLog::new(backend);
        let surface = ConflictSurface::new(store.clone(), telemetry.clone(), "test");
        (surface, store, telemetry)
    }

    fn conflicted_check_in(store: &QueueStore) -> QueueItem {
        let mut item = QueueItem::new(QueuePayload::KioskCheckIn {
            reservation_id: "res-7".into(),
            upsell_total: 20.0,
        });
        item.conflict = true;
        item.last_error = Some("rejected".into());
        store.save(QueueKind::KioskCheckIns, std::slice::from_ref(&item));
        item
    }

    #[test]
    fn list_collects_conflicts_across_queues() {
        let (surface, store, _) = fixture();
        conflicted_check_in(&store);
        let mut order = QueueItem::new(QueuePayload::PosOrder {
            campground_id: None,
            order: json!({}),
        });
        order.conflict = true;
        store.save(QueueKind::PosOrders, &[order]);
        // A healthy item must not appear.
        store.enqueue(QueuePayload::GuestMessage {
            reservation_id: "r".into(),
            guest_id: "g".into(),
            content: "fine".into(),
        });

        let entries = surface.list();
        assert_eq!(entries.len(), 2);
        assert!(entries.iter().any(|e| e.queue == QueueKind::KioskCheckIns));
        assert!(entries.iter().any(|e| e.label == "POS orders"));
    }

    #[test]
    fn retry_rearms_item() {
        let (surface, store, telemetry) = fixture();
        let item = conflicted_check_in(&store);

        surface.retry(QueueKind::KioskCheckIns, item.id).unwrap();

        let items = store.load(QueueKind::KioskCheckIns);
        assert!(!items[0].conflict);
        assert_eq!(items[0].attempts, 0);
        assert!(items[0].next_attempt_at.unwrap() <= now_ms());

        let events = telemetry.read_all();
        assert_eq!(events[0].event_type, EventType::Conflict);
        assert_eq!(events[0].status, EventStatus::Pending);
    }

    #[test]
    fn discard_removes_item_and_records_success() {
        let (surface, store, telemetry) = fixture();
        let item = conflicted_check_in(&store);

        surface.discard(QueueKind::KioskCheckIns, item.id).unwrap();

        assert!(store.load(QueueKind::KioskCheckIns).is_empty());
        let events = telemetry.read_all();
        assert_eq!(events[0].event_type, EventType::Conflict);
        assert_eq!(events[0].status, EventStatus::Success);
    }

    #[test]
    fn retry_unknown_item_fails() {
        let (surface, _, _) = fixture();
        let result = surface.retry(QueueKind::PosOrders, Uuid::new_v4());
        assert!(matches!(result, Err(EngineError::ItemNotFound { .. })));
    }

    #[test]
    fn discard_unknown_item_fails() {
        let (surface, store, _) = fixture();
        conflicted_check_in(&store);
        let result = surface.discard(QueueKind::KioskCheckIns, Uuid::new_v4());
        assert!(matches!(result, Err(EngineError::ItemNotFound { .. })));
        assert_eq!(store.load(QueueKind::KioskCheckIns).len(), 1);
    }
}
