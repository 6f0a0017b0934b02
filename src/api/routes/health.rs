//! Health Routes
//!
//! Health check endpoints for monitoring. These are the only routes served
//! without authentication.
//!
//! - GET /health/live - Liveness check (process is alive)
//! - GET /health/ready - Readiness check (data directory usable)
//! - GET /health - Full health status

use axum::{extract::State, http::StatusCode, Json};
use std::sync::Arc;

use crate::api::dto::HealthResponse;
use crate::api::state::AppState;

/// GET /health/live
///
/// Returns 200 if the process is alive, no dependency checks.
pub async fn liveness() -> StatusCode {
    StatusCode::OK
}

/// GET /health/ready
///
/// Returns 200 once the store's data directory exists or can be created.
pub async fn readiness(State(state): State<Arc<AppState>>) -> StatusCode {
    match check_storage_health(&state).await {
        true => StatusCode::OK,
        false => StatusCode::SERVICE_UNAVAILABLE,
    }
}

/// GET /health
///
/// Full health status with component details.
pub async fn full_health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let storage_ok = check_storage_health(&state).await;

    let collector = match &state.scheduler {
        None => "disabled",
        Some(scheduler) if scheduler.status().await.error_count > 0 => "failing",
        Some(_) => "ok",
    };

    let status = if storage_ok && collector != "failing" {
        "healthy"
    } else {
        "degraded"
    };

    Json(HealthResponse {
        status: status.to_string(),
        storage: if storage_ok { "ok" } else { "error" }.to_string(),
        collector: collector.to_string(),
        tweets: state.store.tweet_count().await,
        uptime_seconds: state.uptime_seconds(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

async fn check_storage_health(state: &AppState) -> bool {
    let dir = &state.store.config().data_dir;
    match tokio::fs::create_dir_all(dir).await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(data_dir = ?dir, error = %e, "Data directory unavailable");
            false
        }
    }
}
