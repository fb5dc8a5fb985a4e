//! Mock image model backend for integration tests
//!
//! Serves `generateContent` with a canned reply and records what it was sent

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router, routing};
use serde_json::{Value, json};
use tokio_util::sync::CancellationToken;

/// Base64 payload of every image the mock returns
pub const IMAGE_DATA: &str = "iVBORw0KGgo=";

/// Size of the `HugeError` body
pub const HUGE_ERROR_BYTES: usize = 1024 * 1024;

/// What the mock answers with
#[derive(Debug, Clone, Copy)]
pub enum MockReply {
    /// Text part followed by an inline PNG
    Image,
    /// Image in a flat top-level `media` array
    FlatMedia,
    /// Text only, with a safety block reason
    Blocked,
    /// Text only, no block reason
    TextOnly,
    /// Plain-text error body far larger than anything a result carries
    HugeError(u16),
    /// Google error envelope with the given status
    Status(u16),
    /// 200 with a body that is not JSON
    Garbage,
}

/// Mock upstream that returns predictable responses
pub struct MockGemini {
    addr: SocketAddr,
    shutdown: CancellationToken,
    state: Arc<MockState>,
}

struct MockState {
    reply: MockReply,
    request_count: AtomicU32,
    last_request: Mutex<Option<Value>>,
    last_path: Mutex<Option<String>>,
    last_api_key: Mutex<Option<String>>,
}

impl MockGemini {
    /// Start the mock server, returning immediately
    pub async fn start(reply: MockReply) -> anyhow::Result<Self> {
        let state = Arc::new(MockState {
            reply,
            request_count: AtomicU32::new(0),
            last_request: Mutex::new(None),
            last_path: Mutex::new(None),
            last_api_key: Mutex::new(None),
        });

        let app = Router::new()
            .route("/v1beta/models/{action}", routing::post(handle_generate_content))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let addr = listener.local_addr()?;
        let shutdown = CancellationToken::new();
        let shutdown_clone = shutdown.clone();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    shutdown_clone.cancelled().await;
                })
                .await
                .ok();
        });

        Ok(Self { addr, shutdown, state })
    }

    /// Base URL to configure as the upstream
    pub fn base_url(&self) -> String {
        format!("http://{}/v1beta", self.addr)
    }

    /// Number of upstream calls received
    pub fn request_count(&self) -> u32 {
        self.state.request_count.load(Ordering::Relaxed)
    }

    /// JSON body of the most recent call
    pub fn last_request(&self) -> Option<Value> {
        self.state.last_request.lock().unwrap().clone()
    }

    /// `model:method` path segment of the most recent call
    pub fn last_path(&self) -> Option<String> {
        self.state.last_path.lock().unwrap().clone()
    }

    /// API key header of the most recent call
    pub fn last_api_key(&self) -> Option<String> {
        self.state.last_api_key.lock().unwrap().clone()
    }
}

impl Drop for MockGemini {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

async fn handle_generate_content(
    State(state): State<Arc<MockState>>,
    Path(action): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    state.request_count.fetch_add(1, Ordering::Relaxed);
    *state.last_request.lock().unwrap() = Some(body);
    *state.last_path.lock().unwrap() = Some(action);
    *state.last_api_key.lock().unwrap() = headers
        .get("x-goog-api-key")
        .and_then(|value| value.to_str().ok())
        .map(ToString::to_string);

    match state.reply {
        MockReply::Image => Json(json!({
            "candidates": [{
                "content": {
                    "role": "model",
                    "parts": [
                        {"text": "Here is your mockup."},
                        {"inlineData": {"mimeType": "image/png", "data": IMAGE_DATA}}
                    ]
                },
                "finishReason": "STOP"
            }]
        }))
        .into_response(),
        MockReply::FlatMedia => Json(json!({
            "media": [{"inlineData": {"mimeType": "image/jpeg", "data": IMAGE_DATA}}]
        }))
        .into_response(),
        MockReply::Blocked => Json(json!({
            "candidates": [{"content": {"parts": [{"text": "I can't help with that."}]}}],
            "promptFeedback": {"blockReason": "SAFETY"}
        }))
        .into_response(),
        MockReply::TextOnly => Json(json!({
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": "Here is a description of a lamp instead."}]},
                "finishReason": "STOP"
            }]
        }))
        .into_response(),
        MockReply::HugeError(status) => {
            let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            (status, "E".repeat(HUGE_ERROR_BYTES)).into_response()
        }
        MockReply::Status(status) => {
            let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            let body = json!({
                "error": {
                    "code": status.as_u16(),
                    "message": "Resource has been exhausted (e.g. check quota).",
                    "status": "RESOURCE_EXHAUSTED"
                }
            });
            (status, Json(body)).into_response()
        }
        MockReply::Garbage => (StatusCode::OK, "<html>not json</html>").into_response(),
    }
}
