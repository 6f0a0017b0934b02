//! Dashboard Pages
//!
//! - GET / - Overview charts
//! - GET /records - Raw record table
//! - GET /legacy - Heatmap view

use axum::{extract::State, response::Html};
use std::sync::Arc;

use crate::api::error::ApiResult;
use crate::api::state::AppState;
use crate::dashboard::{loading_page, render_legacy, render_snapshot, DashboardResult, Page};
use crate::storage::StatsSnapshot;

/// GET /
pub async fn overview(State(state): State<Arc<AppState>>) -> ApiResult<Html<String>> {
    render(&state, |snapshot| render_snapshot(snapshot, Page::Overview)).await
}

/// GET /records
pub async fn records(State(state): State<Arc<AppState>>) -> ApiResult<Html<String>> {
    render(&state, |snapshot| render_snapshot(snapshot, Page::Records)).await
}

/// GET /legacy
pub async fn legacy(State(state): State<Arc<AppState>>) -> ApiResult<Html<String>> {
    render(&state, render_legacy).await
}

async fn render(
    state: &AppState,
    page: impl Fn(&StatsSnapshot) -> DashboardResult<String>,
) -> ApiResult<Html<String>> {
    let snapshot = state.store.snapshot().await;

    // Nothing collected yet
    if snapshot.daily.is_empty() && snapshot.last_updated.is_none() {
        return Ok(Html(loading_page()?));
    }

    Ok(Html(page(&snapshot)?))
}
