//! # Tweet Monitor
//!
//! Collects the public timeline of one account, keeps daily/hourly tweet
//! statistics and serves them through a private dashboard.
//!
//! ## Modules
//!
//! - [`collector`]: Timeline sources (Nitter HTML, RSS) and the collection scheduler
//! - [`storage`]: Tweet store and the statistics snapshot
//! - [`dashboard`]: View-models and HTML rendering for the dashboard pages
//! - [`api`]: HTTP server with Axum
//! - [`config`]: TOML configuration with environment overrides
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use tweet_monitor::dashboard::{DashboardView, StatsClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = StatsClient::new("http://127.0.0.1:8080/api", None)?;
//!     let snapshot = client.fetch().await?;
//!
//!     let view = DashboardView::from_snapshot(&snapshot);
//!     println!("{} tweets today, {} in total", view.today, view.total);
//!
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod collector;
pub mod config;
pub mod dashboard;
pub mod storage;

#[cfg(test)]
mod test_support;

// Re-export top-level types for convenience
pub use storage::{
    DailyRecord, PayloadError, StatsSnapshot, StorageError, StorageResult, StoreConfig,
    TweetEntry, TweetRecord, TweetStore,
};

pub use collector::{
    CollectionReport, CollectorError, CollectorScheduler, CollectorStatus, NitterSource,
    RssSource, ScheduleConfig, TweetSource,
};

pub use dashboard::{
    flatten_records, Credentials, DashboardError, DashboardView, LegacyAnalytics, Page,
    RawRecord, StatsClient,
};

pub use api::{build_router, serve, ApiConfig, ApiError, AppState};

pub use config::{Config, ConfigError, LoggingConfig};
