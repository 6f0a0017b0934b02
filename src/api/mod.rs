//! Tweet Monitor HTTP server
//!
//! HTTP layer built with Axum. Everything except the health endpoints requires
//! HTTP Basic authentication when credentials are configured.
//!
//! # Endpoints
//!
//! ## Statistics
//! - `GET /api` - Statistics snapshot (`daily`, `weekly`, `monthly`, `total_tweets`, `last_updated`)
//! - `GET /api/summary` - Overview view-model
//! - `GET /api/export` - Stored tweets (`format=json|csv`, `since=now-7d`)
//!
//! ## Collector
//! - `POST /api/collect` - Run one collection now
//! - `GET /api/collector/status` - Scheduler status
//!
//! ## Pages
//! - `GET /` - Overview charts
//! - `GET /records` - Raw record table
//! - `GET /legacy` - Heatmap view
//!
//! ## Health
//! - `GET /health/live` - Liveness check
//! - `GET /health/ready` - Readiness check
//! - `GET /health` - Full health status
//!
//! # Example
//!
//! ```rust,ignore
//! use tweet_monitor::api::{serve, ApiConfig, AppState};
//! use tweet_monitor::storage::{StoreConfig, TweetStore};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = Arc::new(TweetStore::open(StoreConfig::new("./data")).await?);
//!     let config = ApiConfig::default();
//!
//!     let state = AppState::new(store, config.clone());
//!     serve(state, &config).await?;
//!
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod dto;
pub mod error;
pub mod routes;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use state::{ApiConfig, AppState};

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

/// Build the router with all routes and middleware
pub fn build_router(state: AppState) -> Router {
    let shared_state = Arc::new(state);

    let protected_routes = Router::new()
        // Pages
        .route("/", get(routes::pages::overview))
        .route("/records", get(routes::pages::records))
        .route("/legacy", get(routes::pages::legacy))
        // Statistics
        .route("/api", get(routes::stats::get_stats))
        .route("/api/summary", get(routes::stats::get_summary))
        .route("/api/export", get(routes::export::export_tweets))
        // Collector
        .route("/api/collect", post(routes::collect::trigger_collect))
        .route("/api/collector/status", get(routes::collect::collector_status))
        .route_layer(middleware::from_fn_with_state(
            Arc::clone(&shared_state),
            auth::require_basic_auth,
        ));

    let health_routes = Router::new()
        .route("/health", get(routes::health::full_health))
        .route("/health/live", get(routes::health::liveness))
        .route("/health/ready", get(routes::health::readiness));

    Router::new()
        .merge(protected_routes)
        .merge(health_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(shared_state)
}

/// Start the HTTP server
pub async fn serve(state: AppState, config: &ApiConfig) -> Result<(), ApiError> {
    let router = build_router(state);

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!(
        auth = config.credentials.is_some(),
        "Tweet monitor listening on {}",
        addr
    );

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ApiError::Internal(format!("Server error: {}", e)))?;

    tracing::info!("Tweet monitor shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
