//! Data Transfer Objects
//!
//! Request and response types for the API endpoints that are not plain
//! storage or dashboard types.

use serde::{Deserialize, Serialize};

use crate::collector::CollectionReport;

// ============================================
// COLLECT DTOs
// ============================================

/// Response of `POST /api/collect`
#[derive(Debug, Serialize, Deserialize)]
pub struct CollectResponse {
    /// Source that produced the tweets
    pub source: String,
    /// Tweets returned by the source
    pub fetched: usize,
    /// Tweets in the store after the merge
    pub total: usize,
    /// Tweets new to the store
    pub added: usize,
}

impl From<CollectionReport> for CollectResponse {
    fn from(report: CollectionReport) -> Self {
        Self {
            source: report.source,
            fetched: report.fetched,
            total: report.total,
            added: report.added,
        }
    }
}

// ============================================
// HEALTH DTOs
// ============================================

/// Full health response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Overall status: healthy, degraded
    pub status: String,
    /// Storage status
    pub storage: String,
    /// Collector status: ok, failing, disabled
    pub collector: String,
    /// Stored tweets
    pub tweets: usize,
    /// Server uptime in seconds
    pub uptime_seconds: u64,
    /// Application version
    pub version: String,
}

// ============================================
// EXPORT DTOs
// ============================================

/// Export query parameters
#[derive(Debug, Deserialize)]
pub struct ExportParams {
    /// Only tweets published at or after this time (`now-7d`, RFC 3339, `YYYY-MM-DD`)
    #[serde(default)]
    pub since: Option<String>,
    /// Format: json, csv
    #[serde(default = "default_export_format")]
    pub format: String,
}

fn default_export_format() -> String {
    "json".to_string()
}
