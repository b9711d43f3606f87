//! HTTP implementation of the remote domain API.
//!
//! The actual HTTP client is abstracted via a trait so hosts can bring
//! whatever stack they already use (reqwest, ureq, a platform webview
//! bridge) and tests can loop requests back in-process.

use crate::api::{
    ApiError, ApiResult, BookingRequest, CampreservApi, CheckInRequest, Connectivity,
    GuestMessageRequest, OrderRequest,
};
use parking_lot::RwLock;
use serde::Serialize;

/// An HTTP response as the engine sees it.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// HTTP status code.
    pub status: u16,
    /// Raw response body.
    pub body: Vec<u8>,
}

/// HTTP client abstraction.
///
/// `post` returns `Err` only for network-level failures (no connection,
/// timeout); server answers come back as an [`HttpResponse`] whatever
/// their status.
pub trait HttpClient: Send + Sync {
    /// Sends a POST request with a JSON body.
    fn post(&self, url: &str, body: Vec<u8>) -> Result<HttpResponse, String>;

    /// Checks if the client believes the network is reachable.
    fn is_healthy(&self) -> bool;
}

/// JSON-over-POST implementation of [`CampreservApi`].
pub struct HttpApi<C: HttpClient> {
    base_url: String,
    client: C,
    last_error: RwLock<Option<String>>,
}

impl<C: HttpClient> HttpApi<C> {
    /// Creates an HTTP API rooted at `base_url`.
    pub fn new(base_url: impl Into<String>, client: C) -> Self {
        Self {
            base_url: base_url.into(),
            client,
            last_error: RwLock::new(None),
        }
    }

    /// Returns the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the last network-level error message.
    pub fn last_error(&self) -> Option<String> {
        self.last_error.read().clone()
    }

    fn post_json<Req: Serialize>(&self, endpoint: &str, request: &Req) -> ApiResult<()> {
        let body = serde_json::to_vec(request)
            .map_err(|e| ApiError::Rejected(format!("failed to encode request: {e}")))?;

        let url = format!("{}{}", self.base_url, endpoint);
        let response = self.client.post(&url, body).map_err(|e| {
            *self.last_error.write() = Some(e.clone());
            ApiError::Network(e)
        })?;

        *self.last_error.write() = None;

        if (200..300).contains(&response.status) {
            return Ok(());
        }

        Err(ApiError::Server {
            status: response.status,
            message: extract_message(&response.body)
                .unwrap_or_else(|| format!("HTTP {}", response.status)),
        })
    }
}

/// Pulls the failure reason out of a response body's `message` field.
fn extract_message(body: &[u8]) -> Option<String> {
    let value: serde_json::Value = serde_json::from_slice(body).ok()?;
    value
        .get("message")
        .and_then(|m| m.as_str())
        .map(str::to_string)
}

impl<C: HttpClient> CampreservApi for HttpApi<C> {
    fn send_guest_message(&self, request: &GuestMessageRequest) -> ApiResult<()> {
        self.post_json("/messages", request)
    }

    fn create_pos_order(&self, request: &OrderRequest) -> ApiResult<()> {
        self.post_json("/pos/orders", request)
    }

    fn perform_check_in(&self, request: &CheckInRequest) -> ApiResult<()> {
        self.post_json("/check-ins", request)
    }

    fn create_portal_order(&self, request: &OrderRequest) -> ApiResult<()> {
        self.post_json("/portal/orders", request)
    }

    fn book_activity(&self, request: &BookingRequest) -> ApiResult<()> {
        self.post_json("/activities/bookings", request)
    }
}

impl<C: HttpClient> Connectivity for HttpApi<C> {
    fn is_online(&self) -> bool {
        self.client.is_healthy()
    }
}

/// A loopback HTTP client that routes requests to an in-process handler.
///
/// Useful for testing without actual network overhead.
pub struct LoopbackClient<S: LoopbackServer> {
    server: S,
}

impl<S: LoopbackServer + Send + Sync> LoopbackClient<S> {
    /// Creates a loopback client over the given handler.
    pub fn new(server: S) -> Self {
        Self { server }
    }
}

/// Handler for loopback requests.
pub trait LoopbackServer {
    /// Handles a POST request and returns the response.
    fn handle_post(&self, path: &str, body: &[u8]) -> Result<HttpResponse, String>;
}

impl<S: LoopbackServer + Send + Sync> HttpClient for LoopbackClient<S> {
    fn post(&self, url: &str, body: Vec<u8>) -> Result<HttpResponse, String> {
        // Strip any base URL prefix down to the path.
        let path = url.find("://").map_or(url, |i| {
            let after_scheme = &url[i + 3..];
            after_scheme
                .find('/')
                .map_or("/", |j| &after_scheme[j..])
        });
        self.server.handle_post(path, &body)
    }

    fn is_healthy(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use uuid::Uuid;

    struct TestClient {
        response: RwLock<Option<Result<HttpResponse, String>>>,
        healthy: AtomicBool,
    }

    impl TestClient {
        fn new() -> Self {
            Self {
                response: RwLock::new(None),
                healthy: AtomicBool::new(true),
            }
        }

        fn set_response(&self, response: Result<HttpResponse, String>) {
            *self.response.write() = Some(response);
        }
    }

    impl HttpClient for TestClient {
        fn post(&self, _url: &str, _body: Vec<u8>) -> Result<HttpResponse, String> {
            self.response
                .read()
                .clone()
                .unwrap_or_else(|| Err("no response set".into()))
        }

        fn is_healthy(&self) -> bool {
            self.healthy.load(Ordering::SeqCst)
        }
    }

    fn check_in() -> CheckInRequest {
        CheckInRequest {
            idempotency_key: Uuid::new_v4(),
            reservation_id: "res-1".into(),
            upsell_total: 0.0,
            device_token: None,
        }
    }

    #[test]
    fn success_status_is_ok() {
        let client = TestClient::new();
        client.set_response(Ok(HttpResponse {
            status: 201,
            body: Vec::new(),
        }));
        let api = HttpApi::new("https://api.example.com", client);

        assert!(api.perform_check_in(&check_in()).is_ok());
        assert_eq!(api.last_error(), None);
    }

    #[test]
    fn network_failure_maps_to_network_error() {
        let client = TestClient::new();
        client.set_response(Err("connection refused".into()));
        let api = HttpApi::new("https://api.example.com", client);

        let err = api.perform_check_in(&check_in()).unwrap_err();
        assert!(matches!(err, ApiError::Network(_)));
        assert!(err.is_transient());
        assert_eq!(api.last_error().as_deref(), Some("connection refused"));
    }

    #[test]
    fn server_error_extracts_body_message() {
        let client = TestClient::new();
        client.set_response(Ok(HttpResponse {
            status: 503,
            body: br#"{"message":"maintenance window"}"#.to_vec(),
        }));
        let api = HttpApi::new("https://api.example.com", client);

        let err = api.perform_check_in(&check_in()).unwrap_err();
        match err {
            ApiError::Server { status, message } => {
                assert_eq!(status, 503);
                assert_eq!(message, "maintenance window");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn client_error_is_not_transient() {
        let client = TestClient::new();
        client.set_response(Ok(HttpResponse {
            status: 422,
            body: Vec::new(),
        }));
        let api = HttpApi::new("https://api.example.com", client);

        let err = api.perform_check_in(&check_in()).unwrap_err();
        assert!(!err.is_transient());
    }

    #[test]
    fn connectivity_follows_client_health() {
        let client = TestClient::new();
        client.healthy.store(false, Ordering::SeqCst);
        let api = HttpApi::new("https://api.example.com", client);
        assert!(!api.is_online());
    }

    #[test]
    fn loopback_strips_base_url() {
        struct Echo;
        impl LoopbackServer for Echo {
            fn handle_post(&self, path: &str, _body: &[u8]) -> Result<HttpResponse, String> {
                Ok(HttpResponse {
                    status: 200,
                    body: path.as_bytes().to_vec(),
                })
            }
        }

        let client = LoopbackClient::new(Echo);
        let response = client
            .post("https://api.example.com/messages", Vec::new())
            .unwrap();
        assert_eq!(response.body, b"/messages");
    }
}
