//! Dashboard
//!
//! Turns a statistics snapshot into the pages the dashboard serves:
//! - `view`: overview view-model (14-day trend, hourly breakdown, headline numbers)
//! - `records`: flattened raw tweet entries
//! - `analytics`: aggregates for the legacy heatmap page
//! - `render`: HTML for every page
//! - `fetch`: reads a snapshot from a remote `/api`
//!
//! # Example
//!
//! ```rust
//! use tweet_monitor::dashboard::{overview_page, DashboardView};
//! use tweet_monitor::storage::StatsSnapshot;
//!
//! let snapshot = StatsSnapshot::parse(r#"{"daily": {"2026-02-23": {"count": 3}}, "total_tweets": 3}"#).unwrap();
//! let view = DashboardView::from_snapshot(&snapshot);
//! assert_eq!(view.today, 3);
//!
//! let html = overview_page(&view).unwrap();
//! assert!(html.contains("02-23"));
//! ```

pub mod analytics;
pub mod fetch;
pub mod records;
pub mod render;
pub mod view;

pub use analytics::LegacyAnalytics;
pub use fetch::{Credentials, StatsClient};
pub use records::{flatten_records, RawRecord};
pub use render::{
    error_page, legacy_page, loading_page, overview_page, records_page, sidebar, Page,
};
pub use view::{DailyPoint, DashboardView, HourlyPoint};

use crate::storage::{PayloadError, StatsSnapshot};
use thiserror::Error;

/// Errors raised while loading a snapshot for display
#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("Invalid payload: {0}")]
    InvalidPayload(#[from] PayloadError),

    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Template error: {0}")]
    Template(#[from] askama::Error),
}

impl From<reqwest::Error> for DashboardError {
    fn from(err: reqwest::Error) -> Self {
        DashboardError::Http(err.to_string())
    }
}

pub type DashboardResult<T> = Result<T, DashboardError>;

/// Render a page straight from a snapshot
pub fn render_snapshot(snapshot: &StatsSnapshot, page: Page) -> DashboardResult<String> {
    match page {
        Page::Overview => overview_page(&DashboardView::from_snapshot(snapshot)),
        Page::Records => records_page(&flatten_records(snapshot)),
    }
}

/// Render the legacy heatmap page straight from a snapshot
pub fn render_legacy(snapshot: &StatsSnapshot) -> DashboardResult<String> {
    let records = flatten_records(snapshot);
    legacy_page(&LegacyAnalytics::compute(&records), &records)
}
