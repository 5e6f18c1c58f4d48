//! HTTP transport for MCP server.
//!
//! Server-sent events for remote agents:
//!
//! - `GET /sse` opens a session. The first event is `endpoint`, whose data is
//!   the URL to post requests to; responses arrive as `message` events.
//! - `POST /messages?session_id=<id>` submits a request and answers `202`.
//! - `POST /mcp` is a plain request/response endpoint for simple clients.
//! - `GET /health` reports liveness.

use crate::error::McpError;
use crate::protocol::JsonRpcRequest;
use crate::server::McpServer;
use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::{
        IntoResponse, Response, Sse,
        sse::{Event, KeepAlive},
    },
    routing::{get, post},
};
use serde::Deserialize;
use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;
use tower_http::trace::TraceLayer;

/// Interval between SSE keep-alive comments.
const KEEP_ALIVE_INTERVAL: Duration = Duration::from_secs(30);

/// Buffered events per SSE session.
const SESSION_BUFFER: usize = 100;

/// SSE event for streaming.
#[derive(Debug, Clone)]
pub struct SseEvent {
    pub event: &'static str,
    pub data: String,
}

/// HTTP transport handler state.
pub struct HttpTransportState {
    server: McpServer,
    /// Open SSE sessions by id.
    sessions: Mutex<HashMap<String, mpsc::Sender<SseEvent>>>,
}

impl HttpTransportState {
    /// Create a new HTTP transport state.
    pub fn new(server: McpServer) -> Self {
        Self {
            server,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    fn open_session(&self) -> (String, mpsc::Receiver<SseEvent>) {
        let session_id = uuid::Uuid::new_v4().to_string();
        let (tx, rx) = mpsc::channel(SESSION_BUFFER);
        if let Ok(mut sessions) = self.sessions.lock() {
            sessions.insert(session_id.clone(), tx);
        }
        (session_id, rx)
    }

    fn session(&self, session_id: &str) -> Option<mpsc::Sender<SseEvent>> {
        self.sessions
            .lock()
            .ok()
            .and_then(|sessions| sessions.get(session_id).cloned())
    }

    fn close_session(&self, session_id: &str) {
        if let Ok(mut sessions) = self.sessions.lock() {
            sessions.remove(session_id);
        }
    }

    /// Number of open SSE sessions.
    pub fn session_count(&self) -> usize {
        self.sessions.lock().map(|s| s.len()).unwrap_or(0)
    }
}

/// Removes the session when its SSE stream is dropped.
struct SessionGuard {
    state: Arc<HttpTransportState>,
    session_id: String,
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        self.state.close_session(&self.session_id);
        tracing::debug!(session_id = %self.session_id, "SSE session closed");
    }
}

/// Query parameters for the message endpoint.
#[derive(Debug, Deserialize)]
pub struct MessageQuery {
    session_id: Option<String>,
}

/// Create the HTTP router for MCP.
pub fn create_router(state: Arc<HttpTransportState>) -> Router {
    Router::new()
        .route("/sse", get(handle_sse))
        .route("/messages", post(handle_message))
        .route("/mcp", post(handle_mcp_post))
        .route("/health", get(handle_health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Handle GET /sse.
async fn handle_sse(State(state): State<Arc<HttpTransportState>>) -> impl IntoResponse {
    let (session_id, mut rx) = state.open_session();
    tracing::info!(session_id = %session_id, "SSE session opened");

    let endpoint = format!("/messages?session_id={}", session_id);
    let guard = SessionGuard {
        state: state.clone(),
        session_id,
    };

    let stream = async_stream::stream! {
        let _guard = guard;
        yield Ok::<_, Infallible>(Event::default().event("endpoint").data(endpoint));
        while let Some(event) = rx.recv().await {
            yield Ok(Event::default().event(event.event).data(event.data));
        }
    };

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(KEEP_ALIVE_INTERVAL)
            .text("ping"),
    )
}

/// Handle POST /messages.
async fn handle_message(
    State(state): State<Arc<HttpTransportState>>,
    Query(query): Query<MessageQuery>,
    Json(request): Json<JsonRpcRequest>,
) -> Response {
    let Some(session_id) = query.session_id else {
        return (StatusCode::BAD_REQUEST, "session_id is required").into_response();
    };
    let Some(events) = state.session(&session_id) else {
        return (StatusCode::NOT_FOUND, "Could not find session").into_response();
    };

    let server = state.server.clone();
    tokio::spawn(async move {
        let Some(response) = server.handle_request(request).await else {
            return;
        };
        let data = match serde_json::to_string(&response) {
            Ok(data) => data,
            Err(e) => {
                tracing::error!(error = %e, "Failed to serialize response");
                return;
            }
        };
        if events
            .send(SseEvent {
                event: "message",
                data,
            })
            .await
            .is_err()
        {
            tracing::debug!(session_id = %session_id, "SSE session went away before the response");
        }
    });

    (StatusCode::ACCEPTED, "Accepted").into_response()
}

/// Handle POST /mcp (JSON-RPC over HTTP).
async fn handle_mcp_post(
    State(state): State<Arc<HttpTransportState>>,
    Json(request): Json<JsonRpcRequest>,
) -> Response {
    match state.server.handle_request(request).await {
        Some(response) => (StatusCode::OK, Json(response)).into_response(),
        None => StatusCode::ACCEPTED.into_response(),
    }
}

/// Handle health check requests.
async fn handle_health(State(state): State<Arc<HttpTransportState>>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "sqlgate",
        "version": env!("CARGO_PKG_VERSION"),
        "sessions": state.session_count(),
    }))
}

/// HTTP server for MCP transport.
pub struct HttpServer {
    address: String,
    state: Arc<HttpTransportState>,
}

impl HttpServer {
    /// Create a new HTTP server.
    pub fn new(address: impl Into<String>, server: McpServer) -> Self {
        Self {
            address: address.into(),
            state: Arc::new(HttpTransportState::new(server)),
        }
    }

    /// Run the HTTP server.
    pub async fn run(self) -> Result<(), McpError> {
        let app = create_router(self.state);

        let listener = tokio::net::TcpListener::bind(&self.address)
            .await
            .map_err(|e| {
                McpError::StartupFailed(format!("Failed to bind to {}: {}", self.address, e))
            })?;

        tracing::info!(address = %self.address, "MCP HTTP server listening");

        axum::serve(listener, app)
            .await
            .map_err(|e| McpError::TransportError(e.to_string()))?;

        Ok(())
    }
}
