//! Flush orchestration: draining every known queue once per invocation.

use crate::adapter::{submit_item, SubmitOutcome};
use crate::api::{CampreservApi, Connectivity, SessionContext};
use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::item::{now_ms, QueueKind};
use crate::queue::QueueStore;
use crate::telemetry::{EventStatus, EventType, TelemetryLog};
use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// The current state of the flush engine, surfaced to the presentation
/// layer as a status badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushState {
    /// No flush has run yet.
    Idle,
    /// The last trigger found the host offline; nothing was attempted.
    Offline,
    /// A flush is in progress.
    Flushing,
    /// The last flush completed.
    Completed,
    /// The last flush could not complete.
    Error,
}

/// Cumulative statistics across flushes.
#[derive(Debug, Clone, Default)]
pub struct FlushStats {
    /// Flush invocations that ran to completion.
    pub flushes_completed: u64,
    /// Items delivered and dropped from their queues.
    pub items_delivered: u64,
    /// Items requeued after a transient failure.
    pub items_requeued: u64,
    /// Items newly flagged as conflicts.
    pub conflicts_flagged: u64,
    /// When the last flush finished (epoch ms).
    pub last_flush_at: Option<u64>,
    /// Last engine-level error message.
    pub last_error: Option<String>,
}

/// Result of one flush invocation.
#[derive(Debug, Clone, Default)]
pub struct FlushReport {
    /// True if the host was offline and nothing was attempted.
    pub offline: bool,
    /// Items delivered and removed.
    pub delivered: u64,
    /// Items kept for a later automatic attempt.
    pub requeued: u64,
    /// Items newly flagged as conflicts.
    pub conflicts: u64,
    /// Items skipped: already conflicted or backing off.
    pub skipped: u64,
    /// Wall-clock duration of the flush.
    pub duration: Duration,
}

impl FlushReport {
    fn offline() -> Self {
        Self {
            offline: true,
            ..Self::default()
        }
    }
}

/// Attempts to drain every known named queue exactly once per invocation,
/// isolating per-item failures so one bad item never blocks its siblings.
///
/// All collaborators are injected: the durable store, the remote domain
/// API, the host's connectivity signal, and the operator session. Swapping
/// in an in-memory store and a scripted API makes the engine fully
/// unit-testable.
pub struct FlushEngine {
    config: EngineConfig,
    store: QueueStore,
    telemetry: TelemetryLog,
    api: Arc<dyn CampreservApi>,
    connectivity: Arc<dyn Connectivity>,
    session: Arc<dyn SessionContext>,
    state: RwLock<FlushState>,
    stats: RwLock<FlushStats>,
    flushing: AtomicBool,
}

impl FlushEngine {
    /// Creates a flush engine over injected collaborators.
    ///
    /// The telemetry log is re-capped to `config.telemetry_capacity` so the
    /// configured bound governs what the engine records.
    pub fn new(
        config: EngineConfig,
        store: QueueStore,
        telemetry: TelemetryLog,
        api: Arc<dyn CampreservApi>,
        connectivity: Arc<dyn Connectivity>,
        session: Arc<dyn SessionContext>,
    ) -> Self {
        let telemetry = telemetry.capped(config.telemetry_capacity);
        Self {
            config,
            store,
            telemetry,
            api,
            connectivity,
            session,
            state: RwLock::new(FlushState::Idle),
            stats: RwLock::new(FlushStats::default()),
            flushing: AtomicBool::new(false),
        }
    }

    /// Gets the current state.
    pub fn state(&self) -> FlushState {
        *self.state.read()
    }

    /// Gets the cumulative stats.
    pub fn stats(&self) -> FlushStats {
        self.stats.read().clone()
    }

    fn set_state(&self, state: FlushState) {
        *self.state.write() = state;
    }

    /// Flushes every known queue once.
    ///
    /// Refuses to run while the host is offline (no telemetry, no
    /// mutation) and refuses re-entrant triggers while a flush is
    /// outstanding. State and stats are refreshed on every exit path.
    pub fn flush_all(&self) -> EngineResult<FlushReport> {
        if !self.connectivity.is_online() {
            self.set_state(FlushState::Offline);
            debug!("flush skipped: host offline");
            return Ok(FlushReport::offline());
        }

        if self.flushing.swap(true, Ordering::SeqCst) {
            return Err(EngineError::FlushInProgress);
        }

        self.set_state(FlushState::Flushing);
        let start = Instant::now();
        let mut report = FlushReport::default();
        let mut failure: Option<String> = None;

        // Each queue is isolated at its own boundary: a failing queue is
        // reported and the remaining queues are still attempted.
        for kind in QueueKind::ALL {
            if let Err(e) = self.flush_queue(kind, &mut report) {
                warn!(queue = %kind, error = %e, "queue flush failed");
                failure = Some(format!("{} flush failed: {e}", kind.label()));
            }
        }

        report.duration = start.elapsed();

        // Guaranteed cleanup: refresh status and stats regardless of
        // outcome, then re-arm the trigger.
        {
            let mut stats = self.stats.write();
            stats.items_delivered += report.delivered;
            stats.items_requeued += report.requeued;
            stats.conflicts_flagged += report.conflicts;
            stats.last_flush_at = Some(now_ms());
            stats.last_error = failure.clone();
            if failure.is_none() {
                stats.flushes_completed += 1;
            }
        }
        match &failure {
            None => self.set_state(FlushState::Completed),
            Some(message) => {
                self.telemetry.record(
                    &self.config.source,
                    EventType::Error,
                    EventStatus::Failed,
                    message.clone(),
                    None,
                );
                self.set_state(FlushState::Error);
            }
        }
        self.flushing.store(false, Ordering::SeqCst);

        Ok(report)
    }

    /// Drains one queue: submit eligible items in FIFO order, keep the
    /// rest, and persist whatever remains.
    fn flush_queue(&self, kind: QueueKind, report: &mut FlushReport) -> EngineResult<()> {
        let items = self.store.load(kind);
        if items.is_empty() {
            return Ok(());
        }

        let now = now_ms();
        let mut remaining = Vec::with_capacity(items.len());

        for mut item in items {
            if !item.eligible_at(now) {
                report.skipped += 1;
                remaining.push(item);
                continue;
            }

            match submit_item(&item, self.api.as_ref(), self.session.as_ref()) {
                SubmitOutcome::Delivered => {
                    report.delivered += 1;
                    self.telemetry.record(
                        &self.config.source,
                        EventType::Sync,
                        EventStatus::Success,
                        format!("Delivered {} item", kind.label()),
                        Some(serde_json::json!({ "itemId": item.id, "queue": kind.storage_key() })),
                    );
                }
                SubmitOutcome::Transient(reason) => {
                    item.attempts += 1;
                    let delay = self.config.retry.delay_for_attempt(item.attempts);
                    item.next_attempt_at = Some(now + delay.as_millis() as u64);
                    item.last_error = Some(reason.clone());
                    report.requeued += 1;
                    self.telemetry.record(
                        &self.config.source,
                        EventType::Sync,
                        EventStatus::Failed,
                        format!("Requeued {} item: {reason}", kind.label()),
                        Some(serde_json::json!({
                            "itemId": item.id,
                            "queue": kind.storage_key(),
                            "attempts": item.attempts,
                        })),
                    );
                    remaining.push(item);
                }
                SubmitOutcome::Conflict(reason) => {
                    item.conflict = true;
                    item.last_error = Some(reason.clone());
                    report.conflicts += 1;
                    self.telemetry.record(
                        &self.config.source,
                        EventType::Conflict,
                        EventStatus::Conflict,
                        format!("{} item needs attention: {reason}", kind.label()),
                        Some(serde_json::json!({ "itemId": item.id, "queue": kind.storage_key() })),
                    );
                    remaining.push(item);
                }
            }
        }

        // Persist even an empty remainder so delivered items are cleared.
        self.store.save(kind, &remaining);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ApiError, MockApi, StaticConnectivity, StaticSession};
    use crate::config::RetryConfig;
    use crate::item::QueuePayload;
    use campsync_store::{InMemoryBackend, StoreBackend};
    use serde_json::json;

    struct Fixture {
        engine: FlushEngine,
        store: QueueStore,
        telemetry: TelemetryLog,
        api: Arc<MockApi>,
    }

    fn fixture_with(online: bool, retry: RetryConfig) -> Fixture {
        let backend: Arc<dyn StoreBackend> = Arc::new(InMemoryBackend::new());
        let store = QueueStore::new(Arc::clone(&backend));
        let telemetry = TelemetryLog::new(Arc::clone(&backend));
        let api = Arc::new(MockApi::new());
        let engine = FlushEngine::new(
            EngineConfig::new("test").with_retry(retry),
            store.clone(),
            telemetry.clone(),
            Arc::clone(&api) as Arc<dyn CampreservApi>,
            Arc::new(StaticConnectivity(online)),
            Arc::new(StaticSession::default()),
        );
        Fixture {
            engine,
            store,
            telemetry,
            api,
        }
    }

    fn fixture() -> Fixture {
        fixture_with(true, RetryConfig::immediate())
    }

    fn message(content: &str) -> QueuePayload {
        QueuePayload::GuestMessage {
            reservation_id: "res-1".into(),
            guest_id: "guest-1".into(),
            content: content.into(),
        }
    }

    fn pos_order(campground_id: Option<&str>) -> QueuePayload {
        QueuePayload::PosOrder {
            campground_id: campground_id.map(str::to_string),
            order: json!({"total": 10.0}),
        }
    }

    #[test]
    fn engine_initial_state() {
        let f = fixture();
        assert_eq!(f.engine.state(), FlushState::Idle);
        assert_eq!(f.engine.stats().flushes_completed, 0);
    }

    #[test]
    fn flush_delivers_and_clears_queue() {
        let f = fixture();
        f.store.enqueue(message("a"));
        f.store.enqueue(message("b"));

        let report = f.engine.flush_all().unwrap();
        assert_eq!(report.delivered, 2);
        assert!(f.store.load(QueueKind::GuestMessages).is_empty());
        assert_eq!(f.engine.state(), FlushState::Completed);
        assert_eq!(f.engine.stats().flushes_completed, 1);
    }

    #[test]
    fn offline_flush_mutates_nothing_and_emits_no_telemetry() {
        let f = fixture_with(false, RetryConfig::immediate());
        f.store.enqueue(message("stuck"));

        let report = f.engine.flush_all().unwrap();
        assert!(report.offline);
        assert_eq!(f.engine.state(), FlushState::Offline);
        assert_eq!(f.store.load(QueueKind::GuestMessages).len(), 1);
        assert!(f.api.requests().is_empty());
        assert!(f.telemetry.read_all().is_empty());
    }

    #[test]
    fn partial_failure_isolation_within_queue() {
        // Queue of 3 POS orders; item 2 lacks its campground id.
        let f = fixture();
        f.store.enqueue(pos_order(Some("cg-1")));
        let bad = f.store.enqueue(pos_order(None));
        f.store.enqueue(pos_order(Some("cg-1")));

        let report = f.engine.flush_all().unwrap();
        assert_eq!(report.delivered, 2);
        assert_eq!(report.conflicts, 1);

        let items = f.store.load(QueueKind::PosOrders);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, bad.id);
        assert!(items[0].conflict);
        assert_eq!(items[0].last_error.as_deref(), Some("Missing campground ID"));
    }

    #[test]
    fn transient_failure_requeues_with_error_and_backoff() {
        let f = fixture_with(
            true,
            RetryConfig::new()
                .with_initial_delay(Duration::from_secs(30))
                .with_max_delay(Duration::from_secs(30)),
        );
        f.api
            .push_response(Err(ApiError::Network("connection reset".into())));
        f.store.enqueue(message("retry me"));

        let before = now_ms();
        let report = f.engine.flush_all().unwrap();
        assert_eq!(report.requeued, 1);

        let items = f.store.load(QueueKind::GuestMessages);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].attempts, 1);
        assert!(items[0].last_error.as_deref().unwrap().contains("connection reset"));
        assert!(items[0].next_attempt_at.unwrap() >= before + 30_000);
    }

    #[test]
    fn backed_off_item_is_skipped_until_due() {
        let f = fixture();
        let mut item = crate::item::QueueItem::new(message("later"));
        item.next_attempt_at = Some(now_ms() + 60_000);
        f.store.save(QueueKind::GuestMessages, &[item]);

        let report = f.engine.flush_all().unwrap();
        assert_eq!(report.skipped, 1);
        assert_eq!(report.delivered, 0);
        assert!(f.api.requests().is_empty());
    }

    #[test]
    fn conflict_is_sticky_across_flushes() {
        let f = fixture();
        f.store.enqueue(pos_order(None));

        f.engine.flush_all().unwrap();
        let first_calls = f.api.requests().len();

        // Repeated flushes never attempt the conflicted item again.
        f.engine.flush_all().unwrap();
        f.engine.flush_all().unwrap();
        assert_eq!(f.api.requests().len(), first_calls);
        assert_eq!(f.store.load(QueueKind::PosOrders).len(), 1);
    }

    #[test]
    fn fifo_order_preserved_for_requeued_items() {
        let f = fixture();
        // First and third fail transiently, second delivers.
        f.api.push_response(Err(ApiError::Network("down".into())));
        f.api.push_response(Ok(()));
        f.api.push_response(Err(ApiError::Network("down".into())));

        let a = f.store.enqueue(message("a"));
        f.store.enqueue(message("b"));
        let c = f.store.enqueue(message("c"));

        f.engine.flush_all().unwrap();

        let items = f.store.load(QueueKind::GuestMessages);
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].id, a.id);
        assert_eq!(items[1].id, c.id);
    }

    #[test]
    fn flush_is_idempotent_when_queues_are_empty() {
        let f = fixture();
        f.store.enqueue(message("once"));

        let first = f.engine.flush_all().unwrap();
        assert_eq!(first.delivered, 1);

        let second = f.engine.flush_all().unwrap();
        assert_eq!(second.delivered, 0);
        assert_eq!(f.api.requests().len(), 1);
    }

    #[test]
    fn reentrant_flush_is_refused() {
        let f = fixture();
        f.engine.flushing.store(true, Ordering::SeqCst);
        assert!(matches!(
            f.engine.flush_all(),
            Err(EngineError::FlushInProgress)
        ));
    }

    #[test]
    fn configured_telemetry_capacity_bounds_engine_events() {
        let backend: Arc<dyn StoreBackend> = Arc::new(InMemoryBackend::new());
        let store = QueueStore::new(Arc::clone(&backend));
        let telemetry = TelemetryLog::new(Arc::clone(&backend));
        let engine = FlushEngine::new(
            EngineConfig::new("test")
                .with_retry(RetryConfig::immediate())
                .with_telemetry_capacity(1),
            store.clone(),
            telemetry.clone(),
            Arc::new(MockApi::new()) as Arc<dyn CampreservApi>,
            Arc::new(StaticConnectivity(true)),
            Arc::new(StaticSession::default()),
        );

        for i in 0..5 {
            store.enqueue(message(&format!("m{i}")));
        }
        let report = engine.flush_all().unwrap();
        assert_eq!(report.delivered, 5);

        // The engine truncates the persisted log, so any reader sees the
        // configured bound.
        assert_eq!(telemetry.read_all().len(), 1);
    }

    #[test]
    fn delivery_and_conflict_emit_telemetry() {
        let f = fixture();
        f.store.enqueue(message("ok"));
        f.store.enqueue(pos_order(None));

        f.engine.flush_all().unwrap();

        let events = f.telemetry.read_all();
        assert!(events
            .iter()
            .any(|e| e.event_type == EventType::Sync && e.status == EventStatus::Success));
        assert!(events
            .iter()
            .any(|e| e.event_type == EventType::Conflict && e.status == EventStatus::Conflict));
    }
}
