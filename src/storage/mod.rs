//! Tweet Storage
//!
//! Persistence for collected tweets and the statistics snapshot derived from
//! them.
//!
//! # Example
//!
//! ```rust,no_run
//! use tweet_monitor::storage::{StoreConfig, TweetStore};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = TweetStore::open(StoreConfig::new("./data")).await?;
//!
//!     let snapshot = store.snapshot().await;
//!     println!("{} tweets over {} days", snapshot.total_tweets, snapshot.daily.len());
//!
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod store;
pub mod types;

// Re-export commonly used types
pub use error::{PayloadError, StorageError, StorageResult};
pub use store::{CollectionSummary, MergeOutcome, StoreConfig, TweetStore};
pub use types::{
    DailyRecord, MonthlyRecord, ScrapedTweet, StatsSnapshot, TweetEntry, TweetRecord,
    WeeklyRecord,
};
