//! Tweet Collection
//!
//! Sources that read a public timeline and return the tweets currently
//! visible on it:
//! - Nitter-style HTML timeline (`nitter`)
//! - RSS feeds exposed by the same front-ends (`rss`)
//!
//! The `scheduler` runs the sources periodically and merges their output into
//! the tweet store.

pub mod nitter;
pub mod rss;
pub mod scheduler;
pub mod snowflake;

pub use nitter::NitterSource;
pub use rss::RssSource;
pub use scheduler::{
    CollectionReport, CollectorScheduler, CollectorStatus, RunOutcome, ScheduleConfig,
};
pub use snowflake::snowflake_to_time;

pub use crate::storage::ScrapedTweet;

use async_trait::async_trait;
use regex::Regex;
use std::sync::OnceLock;
use std::time::Duration;

use crate::config::CollectorConfig;
use crate::storage::StorageError;

/// Common trait for all tweet sources
#[async_trait]
pub trait TweetSource: Send + Sync {
    /// Unique name for this source
    fn name(&self) -> &str;

    /// Fetch the tweets currently visible on the timeline
    async fn fetch(&self) -> Result<Vec<ScrapedTweet>, CollectorError>;
}

/// Errors that can occur while collecting tweets
#[derive(Debug, thiserror::Error)]
pub enum CollectorError {
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("Unexpected status {status} from {url}")]
    Status { url: String, status: u16 },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("No sources configured")]
    NoSources,

    #[error("All sources failed: {0}")]
    AllSourcesFailed(String),

    #[error("Unknown source: {0}")]
    UnknownSource(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl From<reqwest::Error> for CollectorError {
    fn from(err: reqwest::Error) -> Self {
        CollectorError::Http(err.to_string())
    }
}

/// Result type alias for collector operations
pub type CollectorResult<T> = Result<T, CollectorError>;

/// Extract the status ID from a tweet link such as
/// `/elonmusk/status/2024727442427171118#m`.
pub fn extract_status_id(link: &str) -> Option<String> {
    static STATUS_RE: OnceLock<Regex> = OnceLock::new();
    let re = STATUS_RE.get_or_init(|| Regex::new(r"/status/(\d+)").expect("status regex"));

    re.captures(link)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Build the HTTP client shared by the sources
pub(crate) fn http_client(config: &CollectorConfig) -> CollectorResult<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()
        .map_err(CollectorError::from)
}

/// Build the configured sources, in the order they should be tried
pub fn build_sources(config: &CollectorConfig) -> CollectorResult<Vec<Box<dyn TweetSource>>> {
    let client = http_client(config)?;
    let mut sources: Vec<Box<dyn TweetSource>> = Vec::new();

    for name in &config.sources {
        match name.as_str() {
            "nitter" => sources.push(Box::new(NitterSource::new(
                client.clone(),
                &config.nitter_base_url,
                &config.account,
            ))),
            "rss" => sources.push(Box::new(RssSource::new(
                client.clone(),
                config.rss_urls.clone(),
                &config.account,
                config.include_replies,
            ))),
            other => return Err(CollectorError::UnknownSource(other.to_string())),
        }
    }

    if sources.is_empty() {
        return Err(CollectorError::NoSources);
    }

    Ok(sources)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_status_id() {
        assert_eq!(
            extract_status_id("/elonmusk/status/2024727442427171118#m").as_deref(),
            Some("2024727442427171118")
        );
        assert_eq!(
            extract_status_id("https://nitter.net/elonmusk/status/123?s=20").as_deref(),
            Some("123")
        );
        assert_eq!(extract_status_id("/elonmusk"), None);
        assert_eq!(extract_status_id(""), None);
    }

    #[test]
    fn test_build_sources_in_order() {
        let config = CollectorConfig {
            sources: vec!["rss".into(), "nitter".into()],
            ..Default::default()
        };
        let sources = build_sources(&config).unwrap();
        let names: Vec<&str> = sources.iter().map(|s| s.name()).collect();
        assert_eq!(names, vec!["rss", "nitter"]);
    }

    #[test]
    fn test_build_sources_rejects_unknown() {
        let config = CollectorConfig {
            sources: vec!["selenium".into()],
            ..Default::default()
        };
        assert!(matches!(
            build_sources(&config),
            Err(CollectorError::UnknownSource(name)) if name == "selenium"
        ));

        let config = CollectorConfig {
            sources: Vec::new(),
            ..Default::default()
        };
        assert!(matches!(build_sources(&config), Err(CollectorError::NoSources)));
    }
}
