//! Tweet Monitor server
//!
//! Loads the configuration, opens the tweet store, starts the background
//! collector and serves the dashboard until Ctrl+C / SIGTERM.

use anyhow::Context;
use std::sync::Arc;
use tweet_monitor::api::{serve, ApiConfig, AppState};
use tweet_monitor::collector::{build_sources, CollectorScheduler};
use tweet_monitor::config::Config;
use tweet_monitor::storage::TweetStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::load_default();
    config.logging.init();

    tracing::info!("Starting tweet monitor v{}", env!("CARGO_PKG_VERSION"));
    config.validate()?;

    let store_config = config.storage.store_config()?;
    tracing::info!("Data directory: {:?}", store_config.data_dir);
    let store = Arc::new(
        TweetStore::open(store_config)
            .await
            .context("failed to open tweet store")?,
    );

    let api_config = ApiConfig::from_config(&config);

    let (state, collector_task) = if config.collector.enabled {
        let sources = build_sources(&config.collector)?;
        let scheduler = Arc::new(CollectorScheduler::new(
            sources,
            Arc::clone(&store),
            config.collector.schedule(),
        ));

        tracing::info!(
            account = %config.collector.account,
            sources = ?scheduler.source_names(),
            interval_secs = config.collector.interval_secs,
            "Starting background collection"
        );
        let handle = Arc::clone(&scheduler).start();

        let state = AppState::with_scheduler(
            Arc::clone(&store),
            Arc::clone(&scheduler),
            api_config.clone(),
        );
        (state, Some((scheduler, handle)))
    } else {
        tracing::info!("Collector disabled, serving existing data only");
        (AppState::new(Arc::clone(&store), api_config.clone()), None)
    };

    serve(state, &api_config).await?;

    if let Some((scheduler, handle)) = collector_task {
        scheduler.stop().await;
        handle.abort();
    }

    tracing::info!("Tweet monitor stopped");
    Ok(())
}
