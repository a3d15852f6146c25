//! Health check and metrics endpoints.
//!
//! Used by load balancers and monitoring systems to verify service health.

use crate::state::AppState;
use axum::{extract::State, http::StatusCode};

/// Liveness: the process is up. Does not touch the database.
///
/// # Endpoint
///
/// ```text
/// GET /health
/// ```
#[allow(clippy::unused_async)]
pub async fn health_check() -> (StatusCode, &'static str) {
    (StatusCode::OK, "ok")
}

/// Readiness: the document store answers a ping.
///
/// # Endpoint
///
/// ```text
/// GET /ready
/// ```
///
/// # Status Codes
///
/// - 200 OK: store reachable
/// - 503 Service Unavailable: store unreachable or too slow
pub async fn readiness_check(State(state): State<AppState>) -> (StatusCode, &'static str) {
    match state.service().ping().await {
        Ok(()) => (StatusCode::OK, "ready"),
        Err(error) => {
            tracing::warn!(error = %error, "Readiness check failed");
            (StatusCode::SERVICE_UNAVAILABLE, "not ready")
        }
    }
}

/// Prometheus metrics in text exposition format.
///
/// # Endpoint
///
/// ```text
/// GET /metrics
/// ```
#[allow(clippy::unused_async)]
pub async fn metrics(State(state): State<AppState>) -> (StatusCode, String) {
    state.metrics().map_or_else(
        || (StatusCode::NOT_FOUND, "metrics exporter not installed".to_string()),
        |handle| (StatusCode::OK, handle.render()),
    )
}
