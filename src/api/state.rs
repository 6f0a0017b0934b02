//! Application State
//!
//! Shared state accessible by all API handlers.
//! Wrapped in Arc for thread-safe sharing across async tasks.

use crate::collector::CollectorScheduler;
use crate::config::Config;
use crate::dashboard::Credentials;
use crate::storage::TweetStore;
use std::sync::Arc;
use std::time::Instant;

/// Shared application state for all handlers
#[derive(Clone)]
pub struct AppState {
    /// Tweet store backing `/api` and the pages
    pub store: Arc<TweetStore>,
    /// Collector, absent when collection is disabled
    pub scheduler: Option<Arc<CollectorScheduler>>,
    /// API configuration
    pub config: Arc<ApiConfig>,
    /// Server start time for uptime tracking
    pub start_time: Instant,
}

impl AppState {
    /// Create a new AppState without a collector
    pub fn new(store: Arc<TweetStore>, config: ApiConfig) -> Self {
        Self {
            store,
            scheduler: None,
            config: Arc::new(config),
            start_time: Instant::now(),
        }
    }

    /// Create AppState with a collector scheduler
    pub fn with_scheduler(
        store: Arc<TweetStore>,
        scheduler: Arc<CollectorScheduler>,
        config: ApiConfig,
    ) -> Self {
        Self {
            scheduler: Some(scheduler),
            ..Self::new(store, config)
        }
    }

    /// Get server uptime in seconds
    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}

/// API server configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Required Basic credentials, `None` disables auth
    pub credentials: Option<Credentials>,
    /// Enable data export endpoint
    pub enable_export: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            credentials: None,
            enable_export: true,
        }
    }
}

impl ApiConfig {
    /// Create config with custom host and port
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Default::default()
        }
    }

    /// Builder method: require Basic credentials
    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Server settings from the loaded configuration file
    pub fn from_config(config: &Config) -> Self {
        Self {
            host: config.api.host.clone(),
            port: config.api.port,
            credentials: config.auth.credentials(),
            enable_export: config.api.enable_export,
        }
    }

    /// Get the socket address string
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
