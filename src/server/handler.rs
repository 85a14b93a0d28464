//! HTTP handlers for the capture API
//!
//! - POST /log    — submit captured keystrokes for analysis and logging
//! - GET  /health — liveness probe (pure query, no side effects)
//! - GET  /stats  — aggregate statistics scanned from the log file

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::analysis::AnalysisEngine;
use crate::audit::{utc_timestamp, AuditLog};
use crate::error::Error;

/// Context label recorded when a request omits the window name.
pub const UNKNOWN_APPLICATION: &str = "Unknown Application";

/// Shared state for the capture handlers
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<AnalysisEngine>,
    pub audit: Arc<AuditLog>,
    /// Backend identifier reported by /health
    pub backend_id: String,
}

/// Create the capture router
pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/log", post(log_capture))
        .route("/health", get(health))
        .route("/stats", get(stats))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// =============================================================================
// Request / Response types
// =============================================================================

/// Strict submission schema: `keys` is required, `window` defaults.
#[derive(Debug, Deserialize)]
struct CaptureRequest {
    keys: String,
    #[serde(default)]
    window: Option<String>,
}

// =============================================================================
// Handlers
// =============================================================================

/// POST /log — analyze one captured fragment and append it to the audit log
async fn log_capture(
    State(state): State<AppState>,
    payload: Result<Json<serde_json::Value>, JsonRejection>,
) -> impl IntoResponse {
    let raw = match payload {
        Ok(Json(value)) => value,
        Err(rejection) => {
            return malformed_submission(&state, "<unparseable request body>", rejection.body_text())
                .await;
        }
    };

    let request: CaptureRequest = match serde_json::from_value(raw.clone()) {
        Ok(r) => r,
        Err(e) => {
            return malformed_submission(&state, &raw.to_string(), e.to_string()).await;
        }
    };

    let text = request.keys.trim().to_string();
    let window = request
        .window
        .unwrap_or_else(|| UNKNOWN_APPLICATION.to_string());
    let timestamp = utc_timestamp();

    let verdict = state.engine.analyze(&text, &window).await;

    state
        .audit
        .append(&timestamp, &window, &text, &verdict.text)
        .await;

    tracing::info!(
        window = %window,
        source = ?verdict.source,
        text = %preview(&text, 50),
        verdict = %preview(&verdict.text, 100),
        "Capture logged"
    );

    (
        StatusCode::OK,
        Json(serde_json::json!({ "status": "success", "logged": true })),
    )
}

/// Record a malformed submission for audit continuity and fail the caller.
async fn malformed_submission(
    state: &AppState,
    payload_text: &str,
    message: String,
) -> (StatusCode, Json<serde_json::Value>) {
    let error_msg = format!("Server error: {}", message);
    tracing::error!(error = %message, "Malformed submission");

    state
        .audit
        .append(
            &utc_timestamp(),
            "ERROR",
            payload_text,
            &format!("ERROR: {}", error_msg),
        )
        .await;

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(serde_json::json!({ "status": "error", "message": message })),
    )
}

/// GET /health — current timestamp, backend identifier, log file and its
/// existence flag
async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "model": state.backend_id,
        "log_file": state.audit.path().display().to_string(),
        "log_exists": state.audit.exists().await,
    }))
}

/// GET /stats — record count and file size scanned from the log
async fn stats(State(state): State<AppState>) -> impl IntoResponse {
    match state.audit.stats().await {
        Ok(stats) => {
            let mb = (stats.file_size_bytes as f64 / 1_048_576.0 * 100.0).round() / 100.0;
            (
                StatusCode::OK,
                Json(serde_json::json!({
                    "total_entries": stats.total_entries,
                    "file_size_bytes": stats.file_size_bytes,
                    "file_size_mb": mb,
                    "log_file": state.audit.path().display().to_string(),
                })),
            )
        }
        Err(Error::NotFound(_)) => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({ "error": "Log file not found" })),
        ),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({ "error": e.to_string() })),
        ),
    }
}

/// Truncated single-line preview for console logging.
fn preview(text: &str, max_chars: usize) -> String {
    let flat = text.replace('\n', " ");
    let truncated: String = flat.chars().take(max_chars).collect();
    if flat.chars().count() > max_chars {
        format!("{}...", truncated)
    } else {
        truncated
    }
}
