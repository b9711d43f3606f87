//! Append-only, size-bounded telemetry log.

use crate::item::now_ms;
use campsync_store::StoreBackend;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::warn;
use uuid::Uuid;

/// Slot key holding the persisted telemetry log.
const LOG_KEY: &str = "telemetry-log";

/// Default number of events retained, newest first.
pub const MAX_EVENTS: usize = 50;

/// What kind of occurrence an event describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventType {
    /// An item was enqueued or a queue was mutated.
    Queue,
    /// Local cache activity.
    Cache,
    /// A flush or submission attempt.
    Sync,
    /// An engine-level failure.
    Error,
    /// A conflict was flagged or resolved.
    Conflict,
}

/// Outcome attached to an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    /// The described action succeeded.
    Success,
    /// The described action is awaiting a later attempt.
    Pending,
    /// The described action failed.
    Failed,
    /// Informational only.
    Info,
    /// The described action ended in a conflict.
    Conflict,
}

/// One immutable telemetry record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetryEvent {
    /// Unique event id.
    pub id: Uuid,
    /// Free-text origin, e.g. "pos", "kiosk", "guest-pwa", "sync-log".
    pub source: String,
    /// Occurrence category.
    pub event_type: EventType,
    /// Outcome.
    pub status: EventStatus,
    /// Human-readable description.
    pub message: String,
    /// Arbitrary structured context.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<serde_json::Value>,
    /// Creation time (epoch ms).
    pub created_at: u64,
}

/// Bounded, persisted event log used to diagnose why an action never
/// synced.
///
/// Telemetry must never break the feature it observes, so persistence
/// failures are logged and swallowed and read failures yield an empty
/// timeline.
#[derive(Clone)]
pub struct TelemetryLog {
    backend: Arc<dyn StoreBackend>,
    capacity: usize,
}

impl TelemetryLog {
    /// Creates a log with the default 50-event capacity.
    pub fn new(backend: Arc<dyn StoreBackend>) -> Self {
        Self::with_capacity(backend, MAX_EVENTS)
    }

    /// Creates a log retaining at most `capacity` events.
    pub fn with_capacity(backend: Arc<dyn StoreBackend>, capacity: usize) -> Self {
        Self { backend, capacity }
    }

    /// Returns a log over the same backend with a different capacity.
    #[must_use]
    pub fn capped(&self, capacity: usize) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            capacity,
        }
    }

    /// Returns the maximum number of events retained.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Records an event, assigning its id and timestamp.
    ///
    /// The log is prepended to and truncated to capacity, so `read_all`
    /// always returns the most recent events newest-first.
    pub fn record(
        &self,
        source: &str,
        event_type: EventType,
        status: EventStatus,
        message: impl Into<String>,
        meta: Option<serde_json::Value>,
    ) {
        let event = TelemetryEvent {
            id: Uuid::new_v4(),
            source: source.to_string(),
            event_type,
            status,
            message: message.into(),
            meta,
            created_at: now_ms(),
        };

        let mut events = self.read_all();
        events.insert(0, event);
        events.truncate(self.capacity);

        let bytes = match serde_json::to_vec(&events) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(error = %e, "telemetry encode failed, event dropped");
                return;
            }
        };
        if let Err(e) = self.backend.write(LOG_KEY, &bytes) {
            warn!(error = %e, "telemetry save failed, event dropped");
        }
    }

    /// Returns all retained events, newest first.
    ///
    /// Any read or parse failure yields an empty timeline.
    #[must_use]
    pub fn read_all(&self) -> Vec<TelemetryEvent> {
        let bytes = match self.backend.read(LOG_KEY) {
            Ok(Some(bytes)) => bytes,
            Ok(None) => return Vec::new(),
            Err(e) => {
                warn!(error = %e, "telemetry log unreadable");
                return Vec::new();
            }
        };
        match serde_json::from_slice(&bytes) {
            Ok(events) => events,
            Err(e) => {
                warn!(error = %e, "telemetry log corrupt");
                Vec::new()
            }
        }
    }

    /// Removes the persisted log entirely.
    pub fn clear(&self) {
        if let Err(e) = self.backend.remove(LOG_KEY) {
            warn!(error = %e, "telemetry clear failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use campsync_store::InMemoryBackend;
    use std::collections::HashMap;

    fn log() -> TelemetryLog {
        TelemetryLog::new(Arc::new(InMemoryBackend::new()))
    }

    #[test]
    fn read_empty_log() {
        assert!(log().read_all().is_empty());
    }

    #[test]
    fn read_corrupt_log_is_empty() {
        let mut slots = HashMap::new();
        slots.insert(LOG_KEY.to_string(), b"oops".to_vec());
        let log = TelemetryLog::new(Arc::new(InMemoryBackend::with_slots(slots)));
        assert!(log.read_all().is_empty());
    }

    #[test]
    fn record_assigns_id_and_timestamp() {
        let log = log();
        log.record("pos", EventType::Queue, EventStatus::Pending, "queued", None);

        let events = log.read_all();
        assert_eq!(events.len(), 1);
        assert!(events[0].created_at > 0);
        assert_eq!(events[0].message, "queued");
    }

    #[test]
    fn newest_event_comes_first() {
        let log = log();
        log.record("pos", EventType::Sync, EventStatus::Success, "first", None);
        log.record("pos", EventType::Sync, EventStatus::Success, "second", None);

        let events = log.read_all();
        assert_eq!(events[0].message, "second");
        assert_eq!(events[1].message, "first");
    }

    #[test]
    fn log_is_bounded_to_fifty_newest() {
        let log = log();
        for i in 0..55 {
            log.record("sync-log", EventType::Sync, EventStatus::Info, format!("event {i}"), None);
        }

        let events = log.read_all();
        assert_eq!(events.len(), MAX_EVENTS);
        assert_eq!(events[0].message, "event 54");
        assert_eq!(events[49].message, "event 5");
    }

    #[test]
    fn capped_log_shares_backend_and_truncates() {
        let log = log();
        let capped = log.capped(2);
        assert_eq!(capped.capacity(), 2);

        for i in 0..3 {
            capped.record("pos", EventType::Sync, EventStatus::Info, format!("e{i}"), None);
        }

        // Both views read the same persisted slot.
        assert_eq!(log.read_all().len(), 2);
        assert_eq!(capped.read_all()[0].message, "e2");
    }

    #[test]
    fn clear_removes_everything() {
        let log = log();
        log.record("pos", EventType::Queue, EventStatus::Info, "x", None);
        log.clear();
        assert!(log.read_all().is_empty());
    }

    #[test]
    fn meta_round_trips() {
        let log = log();
        log.record(
            "kiosk",
            EventType::Conflict,
            EventStatus::Conflict,
            "conflict",
            Some(serde_json::json!({ "queue": "kiosk-check-ins" })),
        );

        let events = log.read_all();
        assert_eq!(
            events[0].meta,
            Some(serde_json::json!({ "queue": "kiosk-check-ins" }))
        );
    }
}
