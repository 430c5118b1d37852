//! HTTP routes for the SSE transport.
//!
//! ```text
//! GET  /sse                     → event stream (first frame: endpoint)
//! POST /messages?sessionId=<id> → 202 Accepted | 404 Session not found
//! GET  /health                  → JSON status
//! ```

use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use futures_util::{Stream, StreamExt};
use rmcp::ServiceExt;
use rmcp::model::ClientJsonRpcMessage;
use serde::Deserialize;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::server::Logic64Server;
use super::session::{NewSession, SessionId, SessionRegistry};
use super::sse::{FrameStream, KEEP_ALIVE_TEXT, SseFrame};
use crate::error::TransportError;

/// Shared state for the HTTP routes.
#[derive(Clone)]
pub struct AppState {
    /// Live sessions.
    pub registry: Arc<SessionRegistry>,
    /// Protocol server template, cloned per session.
    pub server: Logic64Server,
    /// Interval between keep-alive frames.
    pub keep_alive: Duration,
}

impl AppState {
    /// Creates state with an empty registry.
    pub fn new(server: Logic64Server) -> Self {
        let keep_alive = server.config().keep_alive;
        Self {
            registry: Arc::new(SessionRegistry::new()),
            server,
            keep_alive,
        }
    }
}

/// Builds the axum router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/sse", get(open_stream))
        .route("/messages", post(post_message))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Opens a session and wires it up.
///
/// Order of events: the session is registered, the endpoint frame is
/// queued, a protocol server is attached to the transport, and an abort
/// hook waits for the session's cancellation. The returned stream owns the
/// trigger for that cancellation: dropping it tears the session down. A
/// failed write to a vanished stream fires it as well.
pub fn open_session(state: &AppState) -> (SessionId, FrameStream) {
    let NewSession {
        session,
        transport,
        outbound,
        frames,
    } = state.registry.create();
    let id = session.id().clone();
    let cancel = session.cancellation_token();
    tracing::info!(session_id = %id, "new session");

    let write_failed = cancel.clone();
    let transport =
        transport.with_error_hook(Arc::new(move |_: &TransportError| write_failed.cancel()));

    let _ = outbound.send(SseFrame::Endpoint(format!("/messages?sessionId={id}")));

    let server = state.server.clone();
    let service_ct = cancel.child_token();
    let session_id = id.clone();
    tokio::spawn(async move {
        match server.serve_with_ct(transport, service_ct).await {
            Ok(service) => {
                if let Err(e) = service.waiting().await {
                    tracing::warn!(session_id = %session_id, error = %e, "protocol service failed");
                }
            }
            Err(e) => {
                tracing::debug!(session_id = %session_id, error = %e, "session closed before initialization");
            }
        }
    });

    let registry = Arc::clone(&state.registry);
    let abort = cancel.clone();
    tokio::spawn(async move {
        abort.cancelled().await;
        registry.remove(session.id().as_str());
        let duration_secs = (Utc::now() - session.created_at()).num_seconds();
        tracing::info!(session_id = %session.id(), duration_secs, "session ended");
    });

    (id, FrameStream::new(frames, cancel))
}

async fn open_stream(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>> + Send + 'static> {
    let (_id, frames) = open_session(&state);
    Sse::new(frames.map(|frame| Ok::<_, Infallible>(frame.into_event()))).keep_alive(
        KeepAlive::new()
            .interval(state.keep_alive)
            .text(KEEP_ALIVE_TEXT),
    )
}

/// Query string of `POST /messages`.
#[derive(Debug, Deserialize)]
pub struct MessageQuery {
    /// Target session.
    #[serde(rename = "sessionId")]
    pub session_id: Option<String>,
}

/// Forwards a posted message to its session.
///
/// Returns once the message is queued; any reply travels over the event
/// stream.
pub fn deliver(state: &AppState, session_id: Option<&str>, body: &[u8]) -> (StatusCode, &'static str) {
    let Some(session) = session_id.and_then(|id| state.registry.get(id)) else {
        return (StatusCode::NOT_FOUND, "Session not found");
    };

    let message: ClientJsonRpcMessage = match serde_json::from_slice(body) {
        Ok(message) => message,
        Err(e) => {
            tracing::debug!(session_id = %session.id(), error = %e, "unparseable message");
            return (StatusCode::BAD_REQUEST, "Invalid message");
        }
    };

    session.handle_message(message);
    (StatusCode::ACCEPTED, "Accepted")
}

async fn post_message(
    State(state): State<AppState>,
    Query(query): Query<MessageQuery>,
    body: Bytes,
) -> (StatusCode, &'static str) {
    deliver(&state, query.session_id.as_deref(), &body)
}

async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    let config = state.server.config();
    Json(serde_json::json!({
        "status": "ok",
        "server": config.server_name,
        "governance": config.governance_mode.as_str(),
        "sessions": state.registry.len(),
    }))
}
