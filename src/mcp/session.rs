//! Session registry for SSE connections.
//!
//! Each open event stream is a session. The registry owns every live
//! session and is the only mutable state shared between requests; it is
//! passed to the router explicitly, so independent registries can coexist.

use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use chrono::{DateTime, Utc};
use rmcp::model::ClientJsonRpcMessage;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use super::sse::{SseFrame, SseTransport};

/// Opaque session identifier (random UUID v4).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionId(String);

impl SessionId {
    /// Generates a fresh random identifier.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for SessionId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// A live session as seen by the router.
#[derive(Debug)]
pub struct Session {
    id: SessionId,
    inbound: mpsc::UnboundedSender<ClientJsonRpcMessage>,
    created_at: DateTime<Utc>,
    cancel: CancellationToken,
}

impl Session {
    /// Session identifier.
    pub const fn id(&self) -> &SessionId {
        &self.id
    }

    /// When the stream was opened.
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Token fired when the session is torn down.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Delivers an inbound message to the session's protocol handler.
    ///
    /// Returns `false` if no handler is listening any more; the message is
    /// dropped in that case.
    pub fn handle_message(&self, message: ClientJsonRpcMessage) -> bool {
        if self.inbound.send(message).is_ok() {
            true
        } else {
            tracing::debug!(session_id = %self.id, "no message handler, dropping message");
            false
        }
    }

    /// Returns `true` once teardown has been requested.
    pub fn is_closed(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

/// Everything the router needs to wire up a freshly created session.
#[derive(Debug)]
pub struct NewSession {
    /// Registered session handle.
    pub session: Arc<Session>,
    /// Transport to hand to the protocol server.
    pub transport: SseTransport,
    /// Writer for router-originated frames (the endpoint announcement).
    pub outbound: mpsc::UnboundedSender<SseFrame>,
    /// Frames to stream to the client.
    pub frames: mpsc::UnboundedReceiver<SseFrame>,
}

/// Map of live sessions keyed by id.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: RwLock<HashMap<SessionId, Arc<Session>>>,
    shutdown: CancellationToken,
}

impl SessionRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates and registers a new session with its transport.
    pub fn create(&self) -> NewSession {
        let id = SessionId::generate();
        let (outbound, frames) = mpsc::unbounded_channel();
        let (inbound_tx, inbound_rx) = mpsc::unbounded_channel();

        let session = Arc::new(Session {
            id: id.clone(),
            inbound: inbound_tx,
            created_at: Utc::now(),
            cancel: self.shutdown.child_token(),
        });
        let transport = SseTransport::new(id.clone(), outbound.clone(), inbound_rx);

        self.sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, Arc::clone(&session));

        NewSession {
            session,
            transport,
            outbound,
            frames,
        }
    }

    /// Looks up a session.
    pub fn get(&self, id: &str) -> Option<Arc<Session>> {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
    }

    /// Removes a session. Removing an unknown id is a no-op.
    pub fn remove(&self, id: &str) -> Option<Arc<Session>> {
        self.sessions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(id)
    }

    /// Returns `true` if the session is registered.
    pub fn contains(&self, id: &str) -> bool {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(id)
    }

    /// Number of live sessions.
    pub fn len(&self) -> usize {
        self.sessions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns `true` if no sessions are live.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Tears down every session, current and future.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }
}
