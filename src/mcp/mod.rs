//! MCP (Model Context Protocol) server for logic64.
//!
//! Serves the governance tools over stdio or over a session-multiplexed
//! Server-Sent-Events transport.
//!
//! # Architecture
//!
//! ```text
//! MCP Client (IDE agent)
//!   ├── GET  /sse ───────────────▶ Router::open_session
//!   │                                ├── SessionRegistry::create
//!   │                                ├── endpoint frame
//!   │                                ├── Logic64Server ⇄ SseTransport
//!   │                                └── keep-alive ticker
//!   └── POST /messages?sessionId ─▶ Session::handle_message
//!                                    ↓
//!                        ask_cortex / read_specific_spec / ...
//!                                    ↓
//!                        event: message frame on the same stream
//! ```

pub mod params;
pub mod router;
pub mod server;
pub mod session;
pub mod sse;
pub mod transport;

pub use router::{AppState, open_session, router};
pub use server::Logic64Server;
pub use session::{Session, SessionId, SessionRegistry};
pub use sse::{FrameStream, SseFrame, SseTransport};
pub use transport::{serve_sse, serve_stdio};
