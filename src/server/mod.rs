//! HTTP listener
//!
//! Thin pass-through over the analysis engine and the audit log: it owns
//! none of the classification or durability logic.

pub mod handler;

pub use handler::{app_router, AppState, UNKNOWN_APPLICATION};

use crate::config::KeysentryConfig;
use crate::error::Result;

/// Bind the listener and serve submissions until shutdown.
pub async fn serve(config: &KeysentryConfig, state: AppState) -> Result<()> {
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, "Listening for capture submissions");
    axum::serve(listener, app_router(state)).await?;
    Ok(())
}
