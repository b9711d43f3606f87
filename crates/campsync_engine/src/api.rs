//! Remote domain API boundary.
//!
//! The engine never talks to the network directly; it goes through the
//! [`CampreservApi`] trait so hosts can plug in their HTTP stack and tests
//! can script outcomes. Responses are interpreted only as success/failure
//! with a reason string.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use thiserror::Error;
use uuid::Uuid;

/// Result type for remote domain calls.
pub type ApiResult<T> = Result<T, ApiError>;

/// Failure of a remote domain call.
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// The call never reached the server or the connection dropped.
    #[error("network error: {0}")]
    Network(String),

    /// The server answered with an error status.
    #[error("server error ({status}): {message}")]
    Server {
        /// HTTP-style status code.
        status: u16,
        /// Reason extracted from the response body when present.
        message: String,
    },

    /// The server understood the request and permanently rejected it.
    #[error("rejected: {0}")]
    Rejected(String),
}

impl ApiError {
    /// True if a later attempt with the same item may succeed.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            ApiError::Network(_) => true,
            ApiError::Server { status, .. } => *status >= 500,
            ApiError::Rejected(_) => false,
        }
    }
}

/// A guest message submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuestMessageRequest {
    /// Client-generated idempotency key (the queue item id).
    pub idempotency_key: Uuid,
    /// Reservation thread.
    pub reservation_id: String,
    /// Addressed guest.
    pub guest_id: String,
    /// Message body.
    pub content: String,
    /// Sender role; queued messages are always sent as "guest".
    pub sender_role: String,
}

/// A store or portal order submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderRequest {
    /// Client-generated idempotency key (the queue item id).
    pub idempotency_key: Uuid,
    /// Owning campground.
    pub campground_id: String,
    /// Opaque order body.
    pub order: serde_json::Value,
}

/// A kiosk check-in submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckInRequest {
    /// Client-generated idempotency key (the queue item id).
    pub idempotency_key: Uuid,
    /// Reservation being checked in.
    pub reservation_id: String,
    /// Upsell total accepted during check-in.
    pub upsell_total: f64,
    /// Kiosk device token, read from session state at submit time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_token: Option<String>,
}

/// An activity booking submission, already normalized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingRequest {
    /// Client-generated idempotency key (the queue item id).
    pub idempotency_key: Uuid,
    /// Activity session.
    pub session_id: String,
    /// Booking guest.
    pub guest_id: String,
    /// Number of spots booked.
    pub quantity: u32,
    /// Optional owning reservation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reservation_id: Option<String>,
}

/// The remote domain endpoints the engine submits queued actions to.
///
/// One call per adapter. Implementations decide transport; see
/// [`crate::HttpApi`] for the JSON-over-POST implementation and
/// [`MockApi`] for tests.
pub trait CampreservApi: Send + Sync {
    /// Sends a guest message on a reservation thread.
    fn send_guest_message(&self, request: &GuestMessageRequest) -> ApiResult<()>;

    /// Creates a store point-of-sale order.
    fn create_pos_order(&self, request: &OrderRequest) -> ApiResult<()>;

    /// Performs a kiosk check-in.
    fn perform_check_in(&self, request: &CheckInRequest) -> ApiResult<()>;

    /// Creates a guest-portal store order.
    fn create_portal_order(&self, request: &OrderRequest) -> ApiResult<()>;

    /// Books an activity session.
    fn book_activity(&self, request: &BookingRequest) -> ApiResult<()>;
}

/// The host's network-availability signal, read once per flush.
pub trait Connectivity: Send + Sync {
    /// True if the host believes the network is reachable.
    fn is_online(&self) -> bool;
}

/// Operator device/session context, read at submit time.
pub trait SessionContext: Send + Sync {
    /// Current kiosk device token, if any. Tokens rotate, so they are
    /// never stored on queue items.
    fn device_token(&self) -> Option<String>;
}

/// A fixed connectivity signal for tests and simple hosts.
#[derive(Debug, Clone, Copy)]
pub struct StaticConnectivity(pub bool);

impl Connectivity for StaticConnectivity {
    fn is_online(&self) -> bool {
        self.0
    }
}

/// A fixed session context for tests and non-kiosk hosts.
#[derive(Debug, Clone, Default)]
pub struct StaticSession {
    /// Device token returned by [`SessionContext::device_token`].
    pub device_token: Option<String>,
}

impl SessionContext for StaticSession {
    fn device_token(&self) -> Option<String> {
        self.device_token.clone()
    }
}

/// A request observed by [`MockApi`], for assertions.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedRequest {
    /// A guest message call.
    GuestMessage(GuestMessageRequest),
    /// A POS order call.
    PosOrder(OrderRequest),
    /// A check-in call.
    CheckIn(CheckInRequest),
    /// A portal order call.
    PortalOrder(OrderRequest),
    /// A booking call.
    Booking(BookingRequest),
}

/// A scripted API for testing.
///
/// Responses are consumed in FIFO order per call; when the script runs dry
/// the call succeeds. Every received request is recorded.
#[derive(Default)]
pub struct MockApi {
    responses: Mutex<VecDeque<ApiResult<()>>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl MockApi {
    /// Creates a mock that succeeds on every call.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues the outcome for the next call, whatever its endpoint.
    pub fn push_response(&self, response: ApiResult<()>) {
        self.responses.lock().push_back(response);
    }

    /// Returns every request received so far, in call order.
    #[must_use]
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().clone()
    }

    fn next_response(&self) -> ApiResult<()> {
        self.responses.lock().pop_front().unwrap_or(Ok(()))
    }

    fn call(&self, request: RecordedRequest) -> ApiResult<()> {
        self.requests.lock().push(request);
        self.next_response()
    }
}

impl CampreservApi for MockApi {
    fn send_guest_message(&self, request: &GuestMessageRequest) -> ApiResult<()> {
        self.call(RecordedRequest::GuestMessage(request.clone()))
    }

    fn create_pos_order(&self, request: &OrderRequest) -> ApiResult<()> {
        self.call(RecordedRequest::PosOrder(request.clone()))
    }

    fn perform_check_in(&self, request: &CheckInRequest) -> ApiResult<()> {
        self.call(RecordedRequest::CheckIn(request.clone()))
    }

    fn create_portal_order(&self, request: &OrderRequest) -> ApiResult<()> {
        self.call(RecordedRequest::PortalOrder(request.clone()))
    }

    fn book_activity(&self, request: &BookingRequest) -> ApiResult<()> {
        self.call(RecordedRequest::Booking(request.clone()))
    }
}
