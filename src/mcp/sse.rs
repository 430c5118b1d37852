//! Server-Sent-Events transport.
//!
//! Adapts one outbound event stream plus the inbound `POST /messages`
//! channel of a session into an [`rmcp`] transport. Frames are written to
//! an unbounded channel drained by the HTTP response body, so writes reach
//! the client in call order. Wire framing and keep-alive comments come from
//! [`axum::response::sse`].

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::response::sse::Event;
use futures_util::Stream;
use rmcp::RoleServer;
use rmcp::model::{ClientJsonRpcMessage, ServerJsonRpcMessage};
use rmcp::transport::Transport;
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tokio_util::sync::{CancellationToken, DropGuard};

use super::session::SessionId;
use crate::error::TransportError;

/// Comment text of keep-alive frames.
pub const KEEP_ALIVE_TEXT: &str = "keep-alive";

/// A single SSE frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SseFrame {
    /// Tells the client where to POST its messages.
    Endpoint(String),
    /// A serialized protocol message.
    Message(String),
}

impl SseFrame {
    /// Converts the frame into an SSE event.
    pub fn into_event(self) -> Event {
        match self {
            Self::Endpoint(url) => Event::default().event("endpoint").data(url),
            Self::Message(json) => Event::default().event("message").data(json),
        }
    }
}

/// Callback invoked when a frame cannot be written.
pub type ErrorHook = Arc<dyn Fn(&TransportError) + Send + Sync>;

/// SSE-backed MCP transport for one session.
pub struct SseTransport {
    session_id: SessionId,
    outbound: mpsc::UnboundedSender<SseFrame>,
    inbound: mpsc::UnboundedReceiver<ClientJsonRpcMessage>,
    on_error: Option<ErrorHook>,
}

impl fmt::Debug for SseTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SseTransport")
            .field("session_id", &self.session_id)
            .field("closed", &self.outbound.is_closed())
            .finish_non_exhaustive()
    }
}

impl SseTransport {
    /// Creates a transport writing to `outbound` and reading from `inbound`.
    pub const fn new(
        session_id: SessionId,
        outbound: mpsc::UnboundedSender<SseFrame>,
        inbound: mpsc::UnboundedReceiver<ClientJsonRpcMessage>,
    ) -> Self {
        Self {
            session_id,
            outbound,
            inbound,
            on_error: None,
        }
    }

    /// Registers a callback for write failures.
    #[must_use]
    pub fn with_error_hook(mut self, hook: ErrorHook) -> Self {
        self.on_error = Some(hook);
        self
    }

    /// Session this transport belongs to.
    pub const fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    /// Serializes `message` and enqueues it as one `message` frame.
    pub fn write(&self, message: &ServerJsonRpcMessage) -> Result<(), TransportError> {
        let json = serde_json::to_string(message).map_err(|source| TransportError::Serialize {
            session_id: self.session_id.to_string(),
            source,
        })?;
        self.outbound
            .send(SseFrame::Message(json))
            .map_err(|_| TransportError::StreamClosed(self.session_id.to_string()))
    }

    fn report(&self, err: &TransportError) {
        tracing::warn!(session_id = %self.session_id, error = %err, "SSE write failed");
        if let Some(hook) = &self.on_error {
            hook(err);
        }
    }
}

impl Transport<RoleServer> for SseTransport {
    type Error = TransportError;

    // Write failures go to the error hook; teardown is left to the abort path.
    fn send(
        &mut self,
        item: ServerJsonRpcMessage,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'static {
        if let Err(err) = self.write(&item) {
            self.report(&err);
        }
        std::future::ready(Ok(()))
    }

    fn receive(&mut self) -> impl Future<Output = Option<ClientJsonRpcMessage>> + Send {
        self.inbound.recv()
    }

    fn close(&mut self) -> impl Future<Output = Result<(), Self::Error>> + Send {
        tracing::debug!(session_id = %self.session_id, "transport closed");
        self.inbound.close();
        std::future::ready(Ok(()))
    }
}

/// Outbound frames of one session.
///
/// Dropping the stream (the client went away, or the response was
/// discarded) fires the session's cancellation token.
pub struct FrameStream {
    inner: UnboundedReceiverStream<SseFrame>,
    _abort: DropGuard,
}

impl FrameStream {
    /// Wraps `frames`; `cancel` fires when the stream is dropped.
    pub fn new(frames: mpsc::UnboundedReceiver<SseFrame>, cancel: CancellationToken) -> Self {
        Self {
            inner: UnboundedReceiverStream::new(frames),
            _abort: cancel.drop_guard(),
        }
    }
}

impl Stream for FrameStream {
    type Item = SseFrame;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.get_mut().inner).poll_next(cx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn pong() -> ServerJsonRpcMessage {
        serde_json::from_str(r#"{"jsonrpc":"2.0","id":7,"result":{}}"#)
            .unwrap_or_else(|_| unreachable!())
    }

    fn transport() -> (SseTransport, mpsc::UnboundedReceiver<SseFrame>) {
        let (outbound, frames) = mpsc::unbounded_channel();
        let (_inbound_tx, inbound) = mpsc::unbounded_channel();
        (
            SseTransport::new(SessionId::generate(), outbound, inbound),
            frames,
        )
    }

    async fn encoded(frame: SseFrame) -> String {
        use axum::response::{IntoResponse, Sse};

        let events = futures_util::stream::iter([Ok::<_, std::convert::Infallible>(frame.into_event())]);
        let body = Sse::new(events).into_response().into_body();
        let bytes = axum::body::to_bytes(body, usize::MAX)
            .await
            .unwrap_or_default();
        String::from_utf8_lossy(&bytes).into_owned()
    }

    #[tokio::test]
    async fn test_frame_encoding() {
        assert_eq!(
            encoded(SseFrame::Endpoint("/messages?sessionId=abc".into())).await,
            "event: endpoint\ndata: /messages?sessionId=abc\n\n"
        );
        assert_eq!(
            encoded(SseFrame::Message("{}".into())).await,
            "event: message\ndata: {}\n\n"
        );
    }

    #[tokio::test]
    async fn test_send_writes_message_frame() {
        let (mut transport, mut frames) = transport();
        let result = Transport::<RoleServer>::send(&mut transport, pong()).await;
        assert!(result.is_ok());

        let Some(SseFrame::Message(json)) = frames.recv().await else {
            unreachable!()
        };
        let value: serde_json::Value = serde_json::from_str(&json).unwrap_or_default();
        assert_eq!(value["id"], 7);
        assert!(!json.contains('\n'));
    }

    #[tokio::test]
    async fn test_send_preserves_call_order() {
        let (mut transport, mut frames) = transport();
        for id in 0..5 {
            let msg: ServerJsonRpcMessage =
                serde_json::from_str(&format!(r#"{{"jsonrpc":"2.0","id":{id},"result":{{}}}}"#))
                    .unwrap_or_else(|_| unreachable!());
            let _ = Transport::<RoleServer>::send(&mut transport, msg).await;
        }
        for id in 0..5 {
            let Some(SseFrame::Message(json)) = frames.recv().await else {
                unreachable!()
            };
            assert!(json.contains(&format!(r#""id":{id}"#)));
        }
    }

    #[tokio::test]
    async fn test_send_failure_invokes_error_hook() {
        let (transport, frames) = transport();
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&calls);
        let mut transport = transport.with_error_hook(Arc::new(move |err: &TransportError| {
            assert!(matches!(err, TransportError::StreamClosed(_)));
            seen.fetch_add(1, Ordering::SeqCst);
        }));
        drop(frames);

        let result = Transport::<RoleServer>::send(&mut transport, pong()).await;
        assert!(result.is_ok());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_close_stops_receiving() {
        let (mut transport, _frames) = transport();
        let closed = Transport::<RoleServer>::close(&mut transport).await;
        assert!(closed.is_ok());
        assert!(Transport::<RoleServer>::receive(&mut transport).await.is_none());
    }

    #[test]
    fn test_dropping_frame_stream_fires_token() {
        let (_outbound, frames) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();
        let stream = FrameStream::new(frames, cancel.clone());
        assert!(!cancel.is_cancelled());
        drop(stream);
        assert!(cancel.is_cancelled());
    }
}
