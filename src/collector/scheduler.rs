//! Collector Scheduler
//!
//! Runs the tweet sources periodically and merges what they return into the
//! store. Failed runs push the next attempt back with a growing delay.

use super::*;
use crate::storage::TweetStore;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

/// Configuration for periodic collection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    pub enabled: bool,
    /// Seconds between successful runs
    pub interval_secs: u64,
    /// How often the background task checks whether a run is due
    pub check_interval_secs: u64,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_secs: 300,
            check_interval_secs: 15,
        }
    }
}

/// Outcome of the last collection run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RunOutcome {
    Success {
        source: String,
        fetched: usize,
        added: usize,
    },
    Failed {
        error: String,
    },
}

/// Report of a single successful collection
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CollectionReport {
    /// Source that produced the tweets
    pub source: String,
    /// Tweets returned by the source
    pub fetched: usize,
    /// Tweets in the store after the merge
    pub total: usize,
    /// Tweets new to the store
    pub added: usize,
}

/// Current state of the collector
#[derive(Debug, Clone, Serialize)]
pub struct CollectorStatus {
    pub enabled: bool,
    pub running: bool,
    pub sources: Vec<String>,
    pub interval_secs: u64,
    pub last_run: Option<DateTime<Utc>>,
    pub last_outcome: Option<RunOutcome>,
    pub next_run: Option<DateTime<Utc>>,
    pub error_count: u32,
}

#[derive(Debug, Default)]
struct ScheduleState {
    last_run: Option<DateTime<Utc>>,
    last_outcome: Option<RunOutcome>,
    next_run: Option<DateTime<Utc>>,
    error_count: u32,
}

/// Manages scheduled collection into the tweet store
pub struct CollectorScheduler {
    sources: Vec<Box<dyn TweetSource>>,
    store: Arc<TweetStore>,
    config: ScheduleConfig,
    state: RwLock<ScheduleState>,
    running: AtomicBool,
    /// Serializes manual and scheduled runs
    run_lock: Mutex<()>,
}

impl CollectorScheduler {
    /// Create a new scheduler
    pub fn new(
        sources: Vec<Box<dyn TweetSource>>,
        store: Arc<TweetStore>,
        config: ScheduleConfig,
    ) -> Self {
        let next_run = config.enabled.then(Utc::now);

        Self {
            sources,
            store,
            config,
            state: RwLock::new(ScheduleState {
                next_run,
                ..Default::default()
            }),
            running: AtomicBool::new(false),
            run_lock: Mutex::new(()),
        }
    }

    pub fn store(&self) -> &Arc<TweetStore> {
        &self.store
    }

    /// Names of the configured sources, in try order
    pub fn source_names(&self) -> Vec<String> {
        self.sources.iter().map(|s| s.name().to_string()).collect()
    }

    /// Run one collection: try the sources in order until one returns tweets,
    /// then merge them into the store.
    pub async fn collect_once(&self) -> CollectorResult<CollectionReport> {
        let _guard = self.run_lock.lock().await;
        let result = self.run_sources().await;

        let mut state = self.state.write().await;
        let now = Utc::now();
        state.last_run = Some(now);

        match &result {
            Ok(report) => {
                state.last_outcome = Some(RunOutcome::Success {
                    source: report.source.clone(),
                    fetched: report.fetched,
                    added: report.added,
                });
                state.error_count = 0;
                state.next_run = Some(now + Duration::seconds(self.config.interval_secs as i64));
            }
            Err(e) => {
                state.last_outcome = Some(RunOutcome::Failed {
                    error: e.to_string(),
                });
                state.error_count += 1;
                let backoff = std::cmp::min(state.error_count as i64 * 5, 60);
                state.next_run = Some(now + Duration::minutes(backoff));
            }
        }

        result
    }

    async fn run_sources(&self) -> CollectorResult<CollectionReport> {
        if self.sources.is_empty() {
            return Err(CollectorError::NoSources);
        }

        let mut failures = Vec::new();

        for source in &self.sources {
            match source.fetch().await {
                Ok(tweets) if !tweets.is_empty() => {
                    let fetched = tweets.len();
                    let outcome = self.store.merge(tweets, Utc::now()).await?;

                    return Ok(CollectionReport {
                        source: source.name().to_string(),
                        fetched,
                        total: outcome.total,
                        added: outcome.added,
                    });
                }
                Ok(_) => {
                    tracing::warn!(source = source.name(), "Source returned no tweets");
                    failures.push(format!("{}: no tweets", source.name()));
                }
                Err(e) => {
                    tracing::warn!(source = source.name(), error = %e, "Source failed");
                    failures.push(format!("{}: {}", source.name(), e));
                }
            }
        }

        Err(CollectorError::AllSourcesFailed(failures.join("; ")))
    }

    /// Get the current collector status
    pub async fn status(&self) -> CollectorStatus {
        let state = self.state.read().await;

        CollectorStatus {
            enabled: self.config.enabled,
            running: self.running.load(Ordering::SeqCst),
            sources: self.source_names(),
            interval_secs: self.config.interval_secs,
            last_run: state.last_run,
            last_outcome: state.last_outcome.clone(),
            next_run: state.next_run,
            error_count: state.error_count,
        }
    }

    /// Start the scheduler background task
    pub fn start(self: Arc<Self>) -> tokio::task::JoinHandle<()> {
        // Raised before spawning so an early stop() is not overwritten
        self.running.store(true, Ordering::SeqCst);
        let scheduler = self.clone();

        tokio::spawn(async move {
            let period =
                std::time::Duration::from_secs(scheduler.config.check_interval_secs.max(1));
            let mut interval = tokio::time::interval(period);

            loop {
                interval.tick().await;

                if !scheduler.running.load(Ordering::SeqCst) {
                    break;
                }

                if scheduler.is_due(Utc::now()).await {
                    scheduler.run_scheduled().await;
                }
            }
        })
    }

    /// Stop the scheduler
    pub async fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    async fn is_due(&self, now: DateTime<Utc>) -> bool {
        if !self.config.enabled {
            return false;
        }
        let state = self.state.read().await;
        state.next_run.map(|next| now >= next).unwrap_or(true)
    }

    async fn run_scheduled(&self) {
        tracing::info!("Running scheduled collection");

        match self.collect_once().await {
            Ok(report) => {
                tracing::info!(
                    source = %report.source,
                    fetched = report.fetched,
                    added = report.added,
                    total = report.total,
                    "Collection finished"
                );
            }
            Err(e) => {
                tracing::error!(error = %e, "Collection failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::snowflake::TWITTER_EPOCH_MS;
    use crate::collector::{CollectorError, ScrapedTweet, TweetSource};
    use crate::storage::StoreConfig;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::tempdir;

    struct FixedSource {
        name: &'static str,
        tweets: Vec<ScrapedTweet>,
        calls: AtomicUsize,
    }

    impl FixedSource {
        fn new(name: &'static str, tweets: Vec<ScrapedTweet>) -> Self {
            Self {
                name,
                tweets,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl TweetSource for FixedSource {
        fn name(&self) -> &str {
            self.name
        }

        async fn fetch(&self) -> Result<Vec<ScrapedTweet>, CollectorError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.tweets.clone())
        }
    }

    struct FailingSource;

    #[async_trait]
    impl TweetSource for FailingSource {
        fn name(&self) -> &str {
            "failing"
        }

        async fn fetch(&self) -> Result<Vec<ScrapedTweet>, CollectorError> {
            Err(CollectorError::Status {
                url: "https://mirror.invalid/elonmusk".into(),
                status: 503,
            })
        }
    }

    fn recent_tweet(minutes_ago: i64, content: &str) -> ScrapedTweet {
        let at = Utc::now() - Duration::minutes(minutes_ago);
        let id = (((at.timestamp_millis() - TWITTER_EPOCH_MS) as u64) << 22).to_string();
        ScrapedTweet {
            tweet_id: Some(id.clone()),
            content: content.to_string(),
            link: format!("https://xcancel.com/elonmusk/status/{}#m", id),
        }
    }

    async fn create_store() -> (Arc<TweetStore>, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let store = TweetStore::open(StoreConfig::new(dir.path())).await.unwrap();
        (Arc::new(store), dir)
    }

    #[tokio::test]
    async fn test_collect_falls_through_to_next_source() {
        let (store, _dir) = create_store().await;
        let sources: Vec<Box<dyn TweetSource>> = vec![
            Box::new(FailingSource),
            Box::new(FixedSource::new("empty", Vec::new())),
            Box::new(FixedSource::new(
                "rss",
                vec![recent_tweet(1, "a"), recent_tweet(2, "b")],
            )),
        ];
        let scheduler =
            CollectorScheduler::new(sources, Arc::clone(&store), ScheduleConfig::default());

        let report = scheduler.collect_once().await.unwrap();
        assert_eq!(report.source, "rss");
        assert_eq!(report.fetched, 2);
        assert_eq!(report.added, 2);
        assert_eq!(store.tweet_count().await, 2);

        let status = scheduler.status().await;
        assert_eq!(status.error_count, 0);
        assert!(matches!(status.last_outcome, Some(RunOutcome::Success { added: 2, .. })));
        assert!(status.next_run.unwrap() > status.last_run.unwrap());
    }

    #[tokio::test]
    async fn test_collect_failure_backs_off() {
        let (store, _dir) = create_store().await;
        let scheduler = CollectorScheduler::new(
            vec![Box::new(FailingSource)],
            store,
            ScheduleConfig::default(),
        );

        assert!(matches!(
            scheduler.collect_once().await,
            Err(CollectorError::AllSourcesFailed(_))
        ));
        assert!(scheduler.collect_once().await.is_err());

        let status = scheduler.status().await;
        assert_eq!(status.error_count, 2);
        let delay = status.next_run.unwrap() - status.last_run.unwrap();
        assert_eq!(delay, Duration::minutes(10));
        assert!(matches!(status.last_outcome, Some(RunOutcome::Failed { .. })));
    }

    #[tokio::test]
    async fn test_collect_without_sources() {
        let (store, _dir) = create_store().await;
        let scheduler = CollectorScheduler::new(Vec::new(), store, ScheduleConfig::default());
        assert!(matches!(
            scheduler.collect_once().await,
            Err(CollectorError::NoSources)
        ));
    }

    #[tokio::test]
    async fn test_disabled_scheduler_is_never_due() {
        let (store, _dir) = create_store().await;
        let config = ScheduleConfig {
            enabled: false,
            ..Default::default()
        };
        let scheduler = CollectorScheduler::new(Vec::new(), store, config);
        assert!(!scheduler.is_due(Utc::now()).await);
        assert!(scheduler.status().await.next_run.is_none());
    }

    #[tokio::test]
    async fn test_background_task_runs_due_collection() {
        let (store, _dir) = create_store().await;
        let config = ScheduleConfig {
            enabled: true,
            interval_secs: 3600,
            check_interval_secs: 1,
        };
        let scheduler = Arc::new(CollectorScheduler::new(
            vec![Box::new(FixedSource::new("nitter", vec![recent_tweet(1, "tick")]))],
            Arc::clone(&store),
            config,
        ));

        let handle = Arc::clone(&scheduler).start();
        tokio::time::sleep(std::time::Duration::from_millis(200)).await;
        scheduler.stop().await;
        handle.abort();

        assert_eq!(store.tweet_count().await, 1);
    }

    #[tokio::test]
    async fn test_stop_right_after_start() {
        let (store, _dir) = create_store().await;
        let scheduler = Arc::new(CollectorScheduler::new(
            vec![Box::new(FixedSource::new("nitter", vec![recent_tweet(1, "never")]))],
            Arc::clone(&store),
            ScheduleConfig::default(),
        ));

        let handle = Arc::clone(&scheduler).start();
        assert!(scheduler.status().await.running);

        // Stopped before the task had a chance to run
        scheduler.stop().await;
        tokio::time::timeout(std::time::Duration::from_secs(5), handle)
            .await
            .unwrap()
            .unwrap();

        assert!(!scheduler.status().await.running);
        assert_eq!(store.tweet_count().await, 0);
    }
}
