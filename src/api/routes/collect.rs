//! Collector Routes
//!
//! - POST /api/collect - Run one collection now
//! - GET /api/collector/status - Scheduler status

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::api::dto::CollectResponse;
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::collector::CollectorStatus;

/// POST /api/collect
pub async fn trigger_collect(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<CollectResponse>> {
    let scheduler = state
        .scheduler
        .as_ref()
        .ok_or_else(|| ApiError::ServiceUnavailable("Collector is disabled".to_string()))?;

    tracing::info!("Manual collection requested");
    let report = scheduler.collect_once().await?;

    Ok(Json(report.into()))
}

/// GET /api/collector/status
pub async fn collector_status(State(state): State<Arc<AppState>>) -> Json<CollectorStatus> {
    match &state.scheduler {
        Some(scheduler) => Json(scheduler.status().await),
        None => Json(CollectorStatus {
            enabled: false,
            running: false,
            sources: Vec::new(),
            interval_secs: 0,
            last_run: None,
            last_outcome: None,
            next_run: None,
            error_count: 0,
        }),
    }
}
