use std::net::SocketAddr;

use axum::{Router, routing::get};
use thiserror::Error;
use tokio::net::TcpListener;

/// Errors of the health endpoint.
#[derive(Debug, Error)]
pub enum HealthError {
    /// The listening socket could not be opened.
    #[error("Failed to bind health endpoint on {addr}: {source}")]
    Bind {
        /// Address the endpoint tried to listen on.
        addr: SocketAddr,
        /// The underlying I/O error.
        source: std::io::Error,
    },
    /// The server stopped with an error.
    #[error("Health endpoint stopped: {0}")]
    Serve(#[source] std::io::Error),
}

/// Builds the router with the `/healthz` route.
pub fn router() -> Router {
    Router::new().route("/healthz", get(healthz))
}

async fn healthz() -> &'static str {
    "OK"
}

/// Binds the health endpoint. Binding is split from serving so a taken port
/// fails startup instead of a background task.
pub async fn bind(addr: SocketAddr) -> Result<TcpListener, HealthError> {
    TcpListener::bind(addr).await.map_err(|source| HealthError::Bind { addr, source })
}

/// Serves the health endpoint until the process exits.
pub async fn serve(listener: TcpListener) -> Result<(), HealthError> {
    if let Ok(addr) = listener.local_addr() {
        tracing::info!("Health endpoint listening on http://{addr}/healthz");
    }
    axum::serve(listener, router()).await.map_err(HealthError::Serve)
}
