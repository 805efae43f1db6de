use std::net::SocketAddr;

use axum::routing::get;
use axum::{Json, Router};
use tracing::info;

use crate::error::Error;

pub fn router() -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health_check", get(health_check))
}

async fn root() -> Json<&'static str> {
    Json("locale-sync")
}

async fn health_check() -> Json<&'static str> {
    Json("good")
}

/// Serves the two health routes until the process is stopped. Stateless;
/// every request is handled independently.
pub async fn run(addr: SocketAddr) -> Result<(), Error> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "health-check service listening");
    axum::serve(listener, router()).await?;
    Ok(())
}
