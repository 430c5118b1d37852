//! MCP transport layer for stdio and SSE.
//!
//! Provides functions to start the MCP server with different transports.

use rmcp::ServiceExt;
use rmcp::transport::io::stdio;

use super::router::{AppState, router};
use super::server::Logic64Server;

/// Starts the MCP server with stdio transport.
///
/// The server reads JSON-RPC messages from stdin and writes responses to stdout.
/// This is the standard transport for IDE agent integration.
///
/// # Errors
///
/// Returns an error if the server fails to start or encounters a runtime error.
pub async fn serve_stdio(server: Logic64Server) -> anyhow::Result<()> {
    tracing::info!(server = %server.config().server_name, "MCP server connected on stdio");
    let service = server.serve(stdio()).await?;
    service.waiting().await?;
    Ok(())
}

/// Starts the MCP server with the SSE transport.
///
/// Clients open `GET /sse`, receive an `endpoint` event naming their
/// `POST /messages?sessionId=<id>` URL, and get every reply on the event
/// stream. Ctrl-C closes all sessions and stops the listener.
///
/// # Errors
///
/// Returns an error if the server fails to bind or encounters a runtime error.
pub async fn serve_sse(server: Logic64Server, host: &str, port: u16) -> anyhow::Result<()> {
    let state = AppState::new(server);
    let registry = std::sync::Arc::clone(&state.registry);
    let app = router(state);

    let addr = format!("{host}:{port}");
    let tcp_listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Logic64 governance kernel listening on http://{addr}/sse");

    axum::serve(tcp_listener, app)
        .with_graceful_shutdown(async move {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!(sessions = registry.len(), "shutting down");
            registry.shutdown();
        })
        .await?;

    Ok(())
}
