//! Statistics Routes
//!
//! - GET /api - The statistics snapshot
//! - GET /api/summary - Overview view-model computed from the snapshot

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::api::state::AppState;
use crate::dashboard::DashboardView;
use crate::storage::StatsSnapshot;

/// GET /api
///
/// The snapshot exactly as stored in `stats.json`. Before the first
/// collection every map is empty and `last_updated` is null.
pub async fn get_stats(State(state): State<Arc<AppState>>) -> Json<StatsSnapshot> {
    Json(state.store.snapshot().await)
}

/// GET /api/summary
pub async fn get_summary(State(state): State<Arc<AppState>>) -> Json<DashboardView> {
    let snapshot = state.store.snapshot().await;
    Json(DashboardView::from_snapshot(&snapshot))
}
