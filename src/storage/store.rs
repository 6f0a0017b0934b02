//! Tweet Store
//!
//! Keeps the collected tweets and the derived statistics snapshot:
//! - `all_tweets.json`: every collected tweet, deduplicated by status ID
//! - `stats.json`: daily/weekly/monthly aggregates served at `GET /api`
//!
//! Both documents are held in memory behind a Tokio `RwLock` and rewritten
//! after every merge.

use crate::storage::error::{StorageError, StorageResult};
use crate::storage::types::{
    DailyRecord, MonthlyRecord, ScrapedTweet, StatsSnapshot, TweetRecord, WeeklyRecord,
    DATE_FORMAT, MONTH_FORMAT, TIMESTAMP_FORMAT, WEEK_FORMAT,
};
use chrono::{DateTime, Duration, FixedOffset, Offset, Utc};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;

/// Configuration for the tweet store
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Directory holding `all_tweets.json` and `stats.json`
    pub data_dir: PathBuf,
    /// Offset used to assign tweets to local dates and hours
    pub utc_offset: FixedOffset,
    /// Characters of tweet text kept in daily entries (default: 50)
    pub preview_chars: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            utc_offset: Utc.fix(),
            preview_chars: 50,
        }
    }
}

impl StoreConfig {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..Default::default()
        }
    }

    /// Builder method: set the local offset in minutes east of UTC
    pub fn offset_minutes(mut self, minutes: i32) -> StorageResult<Self> {
        self.utc_offset = FixedOffset::east_opt(minutes * 60)
            .ok_or_else(|| {
                StorageError::Config(format!("invalid UTC offset: {} minutes", minutes))
            })?;
        Ok(self)
    }

    /// Get path to the tweet list
    pub fn tweets_path(&self) -> PathBuf {
        self.data_dir.join("all_tweets.json")
    }

    /// Get path to the statistics snapshot
    pub fn stats_path(&self) -> PathBuf {
        self.data_dir.join("stats.json")
    }
}

/// Result of merging a batch of scraped tweets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MergeOutcome {
    /// Tweets in the store after the merge
    pub total: usize,
    /// Tweets added by this merge
    pub added: usize,
}

/// Recent per-period counts for the collection summary
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CollectionSummary {
    pub total_tweets: usize,
    pub new_today: u64,
    /// Last 7 days, newest first; only dates with a record
    pub recent_days: Vec<(String, u64)>,
    /// Last 4 weeks, newest first; only weeks with a record
    pub recent_weeks: Vec<(String, u64)>,
    /// Last 6 months, oldest first
    pub months: Vec<(String, u64)>,
}

#[derive(Debug, Clone, Default)]
struct StoreState {
    tweets: Vec<TweetRecord>,
    stats: StatsSnapshot,
}

/// JSON-file backed tweet store
#[derive(Debug)]
pub struct TweetStore {
    config: StoreConfig,
    state: RwLock<StoreState>,
}

impl TweetStore {
    /// Open the store, loading existing documents. Missing files start empty.
    pub async fn open(config: StoreConfig) -> StorageResult<Self> {
        let tweets = load_tweets(&config.tweets_path())?;
        let stats = load_stats(&config.stats_path())?;

        tracing::info!(
            data_dir = ?config.data_dir,
            tweets = tweets.len(),
            days = stats.daily.len(),
            "Tweet store opened"
        );

        Ok(Self {
            config,
            state: RwLock::new(StoreState { tweets, stats }),
        })
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Copy of the current statistics snapshot
    pub async fn snapshot(&self) -> StatsSnapshot {
        self.state.read().await.stats.clone()
    }

    /// Copy of all stored tweets
    pub async fn tweets(&self) -> Vec<TweetRecord> {
        self.state.read().await.tweets.clone()
    }

    pub async fn tweet_count(&self) -> usize {
        self.state.read().await.tweets.len()
    }

    /// Merge freshly scraped tweets and refresh the statistics.
    ///
    /// Tweets without a status ID, or whose ID is already stored, are dropped.
    /// The daily record of today and of every date that received a tweet is
    /// rebuilt from the stored tweets, along with their weeks and months.
    pub async fn merge(
        &self,
        scraped: Vec<ScrapedTweet>,
        now: DateTime<Utc>,
    ) -> StorageResult<MergeOutcome> {
        let mut state = self.state.write().await;
        let offset = self.config.utc_offset;

        // Work on a copy; memory only changes once both files are written
        let mut next = state.clone();
        let mut known: HashSet<String> = next.tweets.iter().map(|t| t.tweet_id.clone()).collect();
        let mut touched_dates = BTreeSet::new();
        let mut added = 0;

        for tweet in scraped {
            let record = TweetRecord::from_scraped(tweet, now, offset);
            if record.tweet_id.is_empty() || !known.insert(record.tweet_id.clone()) {
                continue;
            }
            if let Some(date) = &record.date {
                touched_dates.insert(date.clone());
            }
            next.tweets.push(record);
            added += 1;
        }

        let local_now = now.with_timezone(&offset);
        touched_dates.insert(local_now.format(DATE_FORMAT).to_string());

        let StoreState { tweets, stats } = &mut next;
        refresh_periods(stats, tweets, &touched_dates, self.config.preview_chars);

        stats.last_updated = Some(local_now.format(TIMESTAMP_FORMAT).to_string());
        stats.total_tweets = tweets.len() as u64;
        stats.new_today = added as u64;

        self.persist(&next)?;
        *state = next;

        let outcome = MergeOutcome {
            total: state.tweets.len(),
            added,
        };
        tracing::info!(total = outcome.total, added = outcome.added, "Merged scraped tweets");
        Ok(outcome)
    }

    /// Recompute every daily, weekly and monthly record from the stored tweets.
    ///
    /// Returns the number of days in the rebuilt snapshot.
    pub async fn rebuild(&self) -> StorageResult<usize> {
        let mut state = self.state.write().await;
        let mut next = state.clone();
        let StoreState { tweets, stats } = &mut next;

        let dates: BTreeSet<String> = tweets.iter().filter_map(|t| t.date.clone()).collect();
        stats.daily.clear();
        stats.weekly.clear();
        stats.monthly.clear();
        refresh_periods(stats, tweets, &dates, self.config.preview_chars);
        stats.total_tweets = tweets.len() as u64;

        let days = stats.daily.len();
        self.persist(&next)?;
        *state = next;

        tracing::info!(days, tweets = state.tweets.len(), "Rebuilt statistics");
        Ok(days)
    }

    /// Per-period counts around `now` for the collection summary
    pub async fn summary(&self, now: DateTime<Utc>) -> CollectionSummary {
        let state = self.state.read().await;
        let stats = &state.stats;
        let local_now = now.with_timezone(&self.config.utc_offset);

        let recent_days = (0..7)
            .map(|i| (local_now - Duration::days(i)).format(DATE_FORMAT).to_string())
            .filter_map(|date| stats.daily.get(&date).map(|d| (date, d.count)))
            .collect();

        let recent_weeks = (0..4)
            .map(|i| (local_now - Duration::weeks(i)).format(WEEK_FORMAT).to_string())
            .filter_map(|week| stats.weekly.get(&week).map(|w| (week, w.count)))
            .collect();

        let months: Vec<(String, u64)> = stats
            .monthly
            .iter()
            .rev()
            .take(6)
            .map(|(month, record)| (month.clone(), record.count))
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .collect();

        CollectionSummary {
            total_tweets: state.tweets.len(),
            new_today: stats.new_today,
            recent_days,
            recent_weeks,
            months,
        }
    }

    fn persist(&self, state: &StoreState) -> StorageResult<()> {
        write_json(&self.config.tweets_path(), &state.tweets)?;
        write_json(&self.config.stats_path(), &state.stats)?;
        Ok(())
    }
}

/// Rebuild the daily records for `dates` and the weekly/monthly records
/// those dates fall in.
fn refresh_periods(
    stats: &mut StatsSnapshot,
    tweets: &[TweetRecord],
    dates: &BTreeSet<String>,
    preview_chars: usize,
) {
    let mut weeks = BTreeSet::new();
    let mut months = BTreeSet::new();

    for date in dates {
        let day_tweets: Vec<&TweetRecord> = tweets
            .iter()
            .filter(|t| t.date.as_deref() == Some(date.as_str()))
            .collect();

        if let Ok(parsed) = chrono::NaiveDate::parse_from_str(date, DATE_FORMAT) {
            weeks.insert(parsed.format(WEEK_FORMAT).to_string());
            months.insert(parsed.format(MONTH_FORMAT).to_string());
        }

        stats
            .daily
            .insert(date.clone(), DailyRecord::from_tweets(day_tweets, preview_chars));
    }

    for week in weeks {
        let mut breakdown = BTreeMap::new();
        let mut count = 0;
        for tweet in tweets.iter().filter(|t| t.week.as_deref() == Some(week.as_str())) {
            count += 1;
            if let Some(date) = &tweet.date {
                *breakdown.entry(date.clone()).or_insert(0) += 1;
            }
        }
        stats.weekly.insert(
            week,
            WeeklyRecord {
                count,
                daily_breakdown: breakdown,
            },
        );
    }

    for month in months {
        let count = tweets
            .iter()
            .filter(|t| t.month.as_deref() == Some(month.as_str()))
            .count() as u64;
        stats.monthly.insert(month, MonthlyRecord { count });
    }
}

fn load_tweets(path: &Path) -> StorageResult<Vec<TweetRecord>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let content = std::fs::read_to_string(path)?;
    let tweets = serde_json::from_str(&content)?;
    Ok(tweets)
}

fn load_stats(path: &Path) -> StorageResult<StatsSnapshot> {
    if !path.exists() {
        return Ok(StatsSnapshot::default());
    }

    let content = std::fs::read_to_string(path)?;
    Ok(StatsSnapshot::parse(&content)?)
}

/// Write pretty JSON through a temporary file so readers never see a torn document
fn write_json<T: Serialize>(path: &Path, value: &T) -> StorageResult<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let content = serde_json::to_string_pretty(value)?;
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, content)?;
    std::fs::rename(&tmp, path)?;
    Ok(())
}
