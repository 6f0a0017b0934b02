//! Tweet Monitor CLI
//!
//! Command-line interface for tweet monitor operations:
//! - Run a collection against the local store
//! - Print the collection summary
//! - Render dashboard pages offline
//! - Check a running server
//! - Rebuild statistics from the stored tweets

use anyhow::Context;
use chrono::Utc;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tweet_monitor::collector::{build_sources, CollectorScheduler};
use tweet_monitor::config::{generate_default_config, Config};
use tweet_monitor::dashboard::{
    error_page, render_legacy, render_snapshot, Credentials, Page, StatsClient,
};
use tweet_monitor::storage::{StatsSnapshot, TweetStore};

#[derive(Parser)]
#[command(name = "tweet-monitor-cli")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Collect tweets and inspect tweet-count statistics")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: standard locations)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run one collection and merge it into the local store
    Collect,

    /// Print recent daily, weekly and monthly counts
    Summary,

    /// Render a dashboard page to HTML
    Render {
        /// Page to render
        #[arg(value_enum, default_value = "overview")]
        page: RenderPage,
        /// Read the snapshot from a stats.json file instead of the server
        #[arg(long)]
        from_file: Option<PathBuf>,
        /// Snapshot URL (default: dashboard.api_url)
        #[arg(long)]
        api_url: Option<String>,
        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show the status of a running server
    Status {
        /// Server base URL (default: derived from dashboard.api_url)
        #[arg(long)]
        server: Option<String>,
    },

    /// Recompute all statistics from the stored tweets
    Rebuild,

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum RenderPage {
    Overview,
    Records,
    Legacy,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_with_env(path)?,
        None => Config::load_default(),
    };
    config.logging.init();

    match cli.command {
        Commands::Collect => {
            let store = Arc::new(open_store(&config).await?);
            let sources = build_sources(&config.collector)?;
            let scheduler =
                CollectorScheduler::new(sources, Arc::clone(&store), config.collector.schedule());

            let report = scheduler.collect_once().await?;
            println!(
                "Fetched {} tweets from {}: {} new, {} stored",
                report.fetched, report.source, report.added, report.total
            );
            println!();
            print_summary(&store).await;
        }

        Commands::Summary => {
            let store = open_store(&config).await?;
            print_summary(&store).await;
        }

        Commands::Render {
            page,
            from_file,
            api_url,
            output,
        } => {
            let snapshot = match from_file {
                Some(path) => read_snapshot(&path),
                None => {
                    let url = api_url.unwrap_or_else(|| config.dashboard.api_url.clone());
                    fetch_snapshot(url, config.dashboard.credentials()).await
                }
            };

            // Still produce a page when there is nothing to show
            let snapshot = match snapshot {
                Ok(snapshot) => snapshot,
                Err(e) => {
                    let html = error_page(&format!("{:#}", e))?;
                    write_page(output.as_deref(), &html)?;
                    return Err(e);
                }
            };

            let html = match page {
                RenderPage::Overview => render_snapshot(&snapshot, Page::Overview)?,
                RenderPage::Records => render_snapshot(&snapshot, Page::Records)?,
                RenderPage::Legacy => render_legacy(&snapshot)?,
            };
            write_page(output.as_deref(), &html)?;
        }

        Commands::Status { server } => {
            let base = server.unwrap_or_else(|| server_base(&config.dashboard.api_url));
            let client = reqwest::Client::new();

            let response = client.get(format!("{}/health", base)).send().await;

            match response {
                Ok(resp) if resp.status().is_success() => {
                    let health: serde_json::Value = resp.json().await?;

                    println!("Tweet monitor v{}", env!("CARGO_PKG_VERSION"));
                    println!();
                    println!("Server status: {}", health["status"].as_str().unwrap_or("unknown"));
                    println!("Storage:       {}", health["storage"].as_str().unwrap_or("unknown"));
                    let collector = health["collector"].as_str().unwrap_or("unknown");
                    println!("Collector:     {}", collector);
                    if let Some(tweets) = health["tweets"].as_u64() {
                        println!("Tweets:        {}", tweets);
                    }
                    if let Some(uptime) = health["uptime_seconds"].as_u64() {
                        println!("Uptime:        {}", format_duration(uptime));
                    }
                }
                Ok(resp) => {
                    eprintln!("Server returned error: {}", resp.status());
                    std::process::exit(1);
                }
                Err(e) => {
                    eprintln!("Cannot connect to tweet monitor at {}", base);
                    eprintln!("Error: {}", e);
                    eprintln!();
                    eprintln!("Make sure the server is running:");
                    eprintln!("  cargo run --bin tweet-monitor");
                    std::process::exit(1);
                }
            }

            let mut request = client.get(format!("{}/api/collector/status", base));
            if let Some(creds) = config.dashboard.credentials() {
                request = request.basic_auth(creds.username, Some(creds.password));
            }
            match request.send().await {
                Ok(resp) if resp.status().is_success() => {
                    let status: serde_json::Value = resp.json().await?;
                    println!();
                    println!("Last run:      {}", status["last_run"].as_str().unwrap_or("never"));
                    println!("Next run:      {}", status["next_run"].as_str().unwrap_or("-"));
                    println!("Errors:        {}", status["error_count"].as_u64().unwrap_or(0));
                }
                Ok(resp) => {
                    println!();
                    println!("Collector status unavailable ({})", resp.status());
                }
                Err(e) => {
                    println!();
                    println!("Collector status unavailable: {}", e);
                }
            }
        }

        Commands::Rebuild => {
            let store = open_store(&config).await?;
            let days = store.rebuild().await?;
            let tweets = store.tweet_count().await;
            println!("Rebuilt statistics for {} days from {} tweets", days, tweets);
        }

        Commands::Config { output } => {
            let config = generate_default_config();

            match output {
                Some(path) => {
                    if let Some(parent) = path.parent() {
                        std::fs::create_dir_all(parent)?;
                    }
                    std::fs::write(&path, &config)?;
                    println!("Config written to {:?}", path);
                }
                None => {
                    print!("{}", config);
                }
            }
        }
    }

    Ok(())
}

async fn open_store(config: &Config) -> anyhow::Result<TweetStore> {
    let store_config = config.storage.store_config()?;
    TweetStore::open(store_config)
        .await
        .context("failed to open tweet store")
}

fn read_snapshot(path: &Path) -> anyhow::Result<StatsSnapshot> {
    let text =
        std::fs::read_to_string(path).with_context(|| format!("failed to read {:?}", path))?;
    StatsSnapshot::parse(&text).with_context(|| format!("invalid snapshot in {:?}", path))
}

async fn fetch_snapshot(
    url: String,
    credentials: Option<Credentials>,
) -> anyhow::Result<StatsSnapshot> {
    let client = StatsClient::new(url, credentials)?;
    client
        .fetch()
        .await
        .with_context(|| format!("failed to fetch snapshot from {}", client.url()))
}

fn write_page(output: Option<&Path>, html: &str) -> anyhow::Result<()> {
    match output {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, html)?;
            println!("Page written to {:?}", path);
        }
        None => {
            print!("{}", html);
        }
    }
    Ok(())
}

async fn print_summary(store: &TweetStore) {
    let summary = store.summary(Utc::now()).await;

    println!("Total tweets: {}", summary.total_tweets);
    println!("New in last run: {}", summary.new_today);

    println!();
    println!("Last 7 days:");
    for (date, count) in &summary.recent_days {
        println!("  {:<12} {:>5}", date, count);
    }

    println!();
    println!("Last 4 weeks:");
    for (week, count) in &summary.recent_weeks {
        println!("  {:<12} {:>5}", week, count);
    }

    println!();
    println!("Months:");
    for (month, count) in &summary.months {
        println!("  {:<12} {:>5}", month, count);
    }
}

/// `http://host:8080/api` → `http://host:8080`
fn server_base(api_url: &str) -> String {
    let trimmed = api_url.trim_end_matches('/');
    trimmed.strip_suffix("/api").unwrap_or(trimmed).to_string()
}

fn format_duration(seconds: u64) -> String {
    if seconds < 60 {
        format!("{}s", seconds)
    } else if seconds < 3600 {
        format!("{}m {}s", seconds / 60, seconds % 60)
    } else if seconds < 86400 {
        format!("{}h {}m", seconds / 3600, (seconds % 3600) / 60)
    } else {
        format!("{}d {}h", seconds / 86400, (seconds % 86400) / 3600)
    }
}
