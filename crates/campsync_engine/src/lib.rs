//! # Campsync Engine
//!
//! Offline action queue and synchronization engine for Campsync.
//!
//! This crate provides:
//! - Durable named queues of pending actions (guest messages, POS orders,
//!   kiosk check-ins, portal orders, activity bookings)
//! - Domain submission adapters that validate items and map them onto
//!   remote calls
//! - A flush engine that drains every queue once per trigger
//! - A conflict surface for operator retry/discard decisions
//! - A bounded telemetry log for diagnosing why an action never synced
//!
//! ## Architecture
//!
//! Staff and kiosks keep working while disconnected; every action is
//! appended to its named queue. When connectivity returns, a flush walks
//! each queue in FIFO order, submits each item through its adapter, and
//! partitions outcomes: delivered items are dropped, transient failures
//! are requeued with backoff, and conflicts are flagged until a human
//! retries or discards them.
//!
//! ## Key Invariants
//!
//! - One bad item never blocks its queue siblings
//! - Requeued items keep their original relative order
//! - Conflicted items are never auto-retried
//! - Persistence failures degrade the queue, never crash the caller
//! - The telemetry log never exceeds its capacity

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod adapter;
mod api;
mod config;
mod conflict;
mod error;
mod flush;
mod http;
mod item;
mod queue;
mod status;
mod telemetry;

pub use adapter::{normalize_booking, submit_item, SubmitOutcome};
pub use api::{
    ApiError, ApiResult, BookingRequest, CampreservApi, CheckInRequest, Connectivity,
    GuestMessageRequest, MockApi, OrderRequest, RecordedRequest, SessionContext,
    StaticConnectivity, StaticSession,
};
pub use config::{EngineConfig, RetryConfig};
pub use conflict::{ConflictEntry, ConflictSurface};
pub use error::{EngineError, EngineResult};
pub use flush::{FlushEngine, FlushReport, FlushState, FlushStats};
pub use http::{HttpApi, HttpClient, HttpResponse, LoopbackClient, LoopbackServer};
pub use item::{now_ms, QueueItem, QueueKind, QueuePayload};
pub use queue::QueueStore;
pub use status::{QueueBadge, QueueHealth};
pub use telemetry::{EventStatus, EventType, TelemetryEvent, TelemetryLog, MAX_EVENTS};
