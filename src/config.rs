//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and `TWEET_MONITOR_*` environment overrides.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::collector::ScheduleConfig;
use crate::dashboard::Credentials;
use crate::storage::{StorageResult, StoreConfig};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub collector: CollectorConfig,

    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub auth: AuthConfig,

    #[serde(default)]
    pub dashboard: DashboardConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Tweet store configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    /// Offset from UTC used for dates and hours, in minutes
    #[serde(default)]
    pub utc_offset_minutes: i32,

    /// Characters of tweet text kept in the daily entries
    #[serde(default = "default_preview_chars")]
    pub preview_chars: usize,
}

fn default_data_dir() -> String {
    dirs::data_local_dir()
        .map(|p| p.join("tweet-monitor").to_string_lossy().to_string())
        .unwrap_or_else(|| "./data".to_string())
}

fn default_preview_chars() -> usize {
    50
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            utc_offset_minutes: 0,
            preview_chars: default_preview_chars(),
        }
    }
}

impl StorageConfig {
    pub fn store_config(&self) -> StorageResult<StoreConfig> {
        let mut config =
            StoreConfig::new(expand_home(&self.data_dir)).offset_minutes(self.utc_offset_minutes)?;
        config.preview_chars = self.preview_chars;
        Ok(config)
    }
}

/// Expand a leading `~/` to the home directory
fn expand_home(path: &str) -> PathBuf {
    match (path.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(path),
    }
}

/// Timeline collection configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CollectorConfig {
    pub enabled: bool,
    /// Sources to try, in order: `nitter`, `rss`
    pub sources: Vec<String>,
    pub account: String,
    pub nitter_base_url: String,
    pub rss_urls: Vec<String>,
    pub include_replies: bool,
    pub user_agent: String,
    pub timeout_secs: u64,
    pub interval_secs: u64,
    pub check_interval_secs: u64,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            sources: vec!["nitter".to_string(), "rss".to_string()],
            account: "elonmusk".to_string(),
            nitter_base_url: "https://xcancel.com".to_string(),
            rss_urls: vec![
                "https://xcancel.com/elonmusk/rss".to_string(),
                "https://nitter.privacydev.net/elonmusk/rss".to_string(),
                "https://nitter.poast.org/elonmusk/rss".to_string(),
            ],
            include_replies: false,
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_string(),
            timeout_secs: 20,
            interval_secs: 300,
            check_interval_secs: 15,
        }
    }
}

impl CollectorConfig {
    pub fn schedule(&self) -> ScheduleConfig {
        ScheduleConfig {
            enabled: self.enabled,
            interval_secs: self.interval_secs,
            check_interval_secs: self.check_interval_secs,
        }
    }
}

/// API server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_enable_export")]
    pub enable_export: bool,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_enable_export() -> bool {
    true
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            enable_export: default_enable_export(),
        }
    }
}

/// HTTP Basic authentication for the server
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    #[serde(default = "default_auth_enabled")]
    pub enabled: bool,

    #[serde(default = "default_username")]
    pub username: String,

    #[serde(default)]
    pub password: String,
}

fn default_auth_enabled() -> bool {
    true
}

fn default_username() -> String {
    "admin".to_string()
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            enabled: default_auth_enabled(),
            username: default_username(),
            password: String::new(),
        }
    }
}

impl AuthConfig {
    /// Credentials the server should require, `None` when auth is off
    pub fn credentials(&self) -> Option<Credentials> {
        self.enabled
            .then(|| Credentials::new(&self.username, &self.password))
    }
}

/// Remote snapshot used by the CLI `render` command
#[derive(Debug, Clone, Deserialize)]
pub struct DashboardConfig {
    #[serde(default = "default_dashboard_url")]
    pub api_url: String,

    pub username: Option<String>,

    pub password: Option<String>,
}

fn default_dashboard_url() -> String {
    "http://127.0.0.1:8080/api".to_string()
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            api_url: default_dashboard_url(),
            username: None,
            password: None,
        }
    }
}

impl DashboardConfig {
    pub fn credentials(&self) -> Option<Credentials> {
        match (&self.username, &self.password) {
            (Some(user), Some(pass)) => Some(Credentials::new(user, pass)),
            _ => None,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl LoggingConfig {
    /// Filter directive used when `RUST_LOG` is not set
    pub fn default_filter(&self) -> String {
        format!("tweet_monitor={},tower_http=debug", self.level)
    }

    pub fn is_json(&self) -> bool {
        self.format.eq_ignore_ascii_case("json")
    }

    /// Install the global tracing subscriber. `RUST_LOG` wins over `level`.
    pub fn init(&self) {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(self.default_filter()));
        let registry = tracing_subscriber::registry().with(filter);

        let result = if self.is_json() {
            registry.with(tracing_subscriber::fmt::layer().json()).try_init()
        } else {
            registry.with(tracing_subscriber::fmt::layer()).try_init()
        };

        if let Err(e) = result {
            eprintln!("Logging already initialized: {}", e);
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Self::parse(&content).map_err(|error| ConfigError::Parse {
            path: path.to_path_buf(),
            error,
        })
    }

    fn parse(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| e.to_string())
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("tweet-monitor").join("config.toml")),
            Some(PathBuf::from("/etc/tweet-monitor/config.toml")),
            Some(PathBuf::from("./config.toml")),
        ];

        for path in config_paths.iter().flatten() {
            if path.exists() {
                match Self::load_with_env(path) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path, e);
                    }
                }
            }
        }

        tracing::info!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Check settings that cannot be expressed with serde defaults
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.auth.enabled && self.auth.password.is_empty() {
            return Err(ConfigError::Invalid(
                "auth is enabled but auth.password is empty".to_string(),
            ));
        }
        if self.collector.enabled && self.collector.sources.is_empty() {
            return Err(ConfigError::Invalid(
                "collector is enabled but no sources are configured".to_string(),
            ));
        }
        if !(-14 * 60..=14 * 60).contains(&self.storage.utc_offset_minutes) {
            return Err(ConfigError::Invalid(format!(
                "storage.utc_offset_minutes out of range: {}",
                self.storage.utc_offset_minutes
            )));
        }
        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    fn apply_overrides_from(&mut self, var: impl Fn(&str) -> Option<String>) {
        // Storage overrides
        if let Some(data_dir) = var("TWEET_MONITOR_DATA_DIR") {
            self.storage.data_dir = data_dir;
        }
        if let Some(offset) = var("TWEET_MONITOR_UTC_OFFSET_MINUTES").and_then(|v| v.parse().ok()) {
            self.storage.utc_offset_minutes = offset;
        }

        // Collector overrides
        if let Some(account) = var("TWEET_MONITOR_ACCOUNT") {
            self.collector.account = account;
        }
        if let Some(url) = var("TWEET_MONITOR_NITTER_URL") {
            self.collector.nitter_base_url = url;
        }

        // API overrides
        if let Some(host) = var("TWEET_MONITOR_API_HOST") {
            self.api.host = host;
        }
        if let Some(port) = var("TWEET_MONITOR_API_PORT").and_then(|v| v.parse().ok()) {
            self.api.port = port;
        }

        // Auth overrides
        if let Some(username) = var("TWEET_MONITOR_AUTH_USERNAME") {
            self.auth.username = username;
        }
        if let Some(password) = var("TWEET_MONITOR_AUTH_PASSWORD") {
            self.auth.password = password;
        }

        // Dashboard overrides
        if let Some(url) = var("TWEET_MONITOR_DASHBOARD_URL") {
            self.dashboard.api_url = url;
        }

        // Logging overrides
        if let Some(level) = var("TWEET_MONITOR_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = var("TWEET_MONITOR_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# Tweet Monitor Configuration
#
# Environment variables override these settings:
# - TWEET_MONITOR_DATA_DIR
# - TWEET_MONITOR_UTC_OFFSET_MINUTES
# - TWEET_MONITOR_ACCOUNT
# - TWEET_MONITOR_NITTER_URL
# - TWEET_MONITOR_API_HOST
# - TWEET_MONITOR_API_PORT
# - TWEET_MONITOR_AUTH_USERNAME
# - TWEET_MONITOR_AUTH_PASSWORD
# - TWEET_MONITOR_DASHBOARD_URL
# - TWEET_MONITOR_LOG_LEVEL
# - TWEET_MONITOR_LOG_FORMAT

[storage]
# Directory holding all_tweets.json and stats.json
data_dir = "~/.local/share/tweet-monitor"

# Offset from UTC for dates and hours, in minutes (480 = UTC+8)
utc_offset_minutes = 0

# Characters of tweet text kept per daily entry
preview_chars = 50

[collector]
# Run collection in the background
enabled = true

# Sources to try, in order: "nitter", "rss"
sources = ["nitter", "rss"]

# Account whose timeline is monitored
account = "elonmusk"

# Nitter-style front-end serving the HTML timeline
nitter_base_url = "https://xcancel.com"

# RSS feeds tried in order by the rss source
rss_urls = [
    "https://xcancel.com/elonmusk/rss",
    "https://nitter.privacydev.net/elonmusk/rss",
    "https://nitter.poast.org/elonmusk/rss",
]

# Keep "R to @..." replies from RSS feeds
include_replies = false

# HTTP request timeout in seconds
timeout_secs = 20

# Seconds between collections
interval_secs = 300

# How often the scheduler checks whether a collection is due
check_interval_secs = 15

[api]
# API server host
host = "0.0.0.0"

# API server port
port = 8080

# Enable /api/export
enable_export = true

[auth]
# Require HTTP Basic auth on everything except /health
enabled = true
username = "admin"
password = ""

[dashboard]
# Snapshot endpoint used by `tweet-monitor-cli render`
api_url = "http://127.0.0.1:8080/api"
# username = "admin"
# password = ""

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config_parses() {
        let config = Config::parse(&generate_default_config()).unwrap();
        assert_eq!(config.api.port, 8080);
        assert_eq!(config.collector.sources, vec!["nitter", "rss"]);
        assert_eq!(config.collector.rss_urls.len(), 3);
        assert_eq!(config.storage.preview_chars, 50);
        assert_eq!(config.auth.username, "admin");
        assert!(config.dashboard.credentials().is_none());
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config.api.host, "0.0.0.0");
        assert_eq!(config.collector.account, "elonmusk");
        assert_eq!(config.collector.interval_secs, 300);
        assert_eq!(config.logging.format, "pretty");
    }

    #[test]
    fn test_partial_sections() {
        let config = Config::parse(
            r#"
[collector]
sources = ["rss"]
interval_secs = 60

[storage]
utc_offset_minutes = 480
"#,
        )
        .unwrap();

        assert_eq!(config.collector.sources, vec!["rss"]);
        assert_eq!(config.collector.schedule().interval_secs, 60);
        assert_eq!(config.collector.timeout_secs, 20);
        assert_eq!(config.storage.utc_offset_minutes, 480);
        assert_eq!(config.storage.preview_chars, 50);
    }

    #[test]
    fn test_invalid_toml() {
        assert!(Config::parse("[api\nport = 1").is_err());
    }

    #[test]
    fn test_load_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[api]\nport = \"not a number\"\n").unwrap();

        match Config::load(&path) {
            Err(ConfigError::Parse { path: p, .. }) => assert_eq!(p, path),
            other => panic!("unexpected result: {:?}", other),
        }
        assert!(matches!(
            Config::load(&dir.path().join("missing.toml")),
            Err(ConfigError::Io { .. })
        ));
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [
            ("TWEET_MONITOR_DATA_DIR", "/srv/tweets"),
            ("TWEET_MONITOR_API_PORT", "9000"),
            ("TWEET_MONITOR_UTC_OFFSET_MINUTES", "480"),
            ("TWEET_MONITOR_AUTH_PASSWORD", "hunter2"),
            ("TWEET_MONITOR_LOG_FORMAT", "json"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_overrides_from(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.storage.data_dir, "/srv/tweets");
        assert_eq!(config.api.port, 9000);
        assert_eq!(config.storage.utc_offset_minutes, 480);
        assert_eq!(config.auth.password, "hunter2");
        assert!(config.logging.is_json());
    }

    #[test]
    fn test_bad_numeric_override_is_ignored() {
        let mut config = Config::default();
        config.apply_overrides_from(|key| {
            (key == "TWEET_MONITOR_API_PORT").then(|| "eighty".to_string())
        });
        assert_eq!(config.api.port, 8080);
    }

    #[test]
    fn test_validate() {
        let mut config = Config::default();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        config.auth.password = "secret".into();
        assert!(config.validate().is_ok());

        config.auth.enabled = false;
        config.auth.password.clear();
        assert!(config.validate().is_ok());
        assert!(config.auth.credentials().is_none());

        config.storage.utc_offset_minutes = 24 * 60;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_store_config() {
        let config = StorageConfig {
            data_dir: "/tmp/tweets".into(),
            utc_offset_minutes: 480,
            preview_chars: 80,
        };
        let store = config.store_config().unwrap();
        assert_eq!(store.preview_chars, 80);
        assert_eq!(store.utc_offset.local_minus_utc(), 480 * 60);
        assert_eq!(store.data_dir, PathBuf::from("/tmp/tweets"));
    }

    #[test]
    fn test_expand_home() {
        assert_eq!(expand_home("/var/lib/x"), PathBuf::from("/var/lib/x"));
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_home("~/data"), home.join("data"));
        }
    }

    #[test]
    fn test_log_filter() {
        let logging = LoggingConfig::default();
        assert_eq!(logging.default_filter(), "tweet_monitor=info,tower_http=debug");
        assert!(!logging.is_json());
    }
}
