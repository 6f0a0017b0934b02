//! Snapshot fetching
//!
//! Reads the statistics snapshot from a running server's `/api` endpoint.

use reqwest::Client;
use std::time::Duration;

use super::{DashboardError, DashboardResult};
use crate::storage::StatsSnapshot;

/// Username and password for HTTP Basic authentication
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

/// Client for a remote statistics endpoint
#[derive(Debug, Clone)]
pub struct StatsClient {
    client: Client,
    url: String,
    credentials: Option<Credentials>,
}

impl StatsClient {
    pub fn new(url: impl Into<String>, credentials: Option<Credentials>) -> DashboardResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            url: url.into(),
            credentials,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// GET the snapshot and parse it defensively
    pub async fn fetch(&self) -> DashboardResult<StatsSnapshot> {
        let mut request = self.client.get(&self.url);
        if let Some(creds) = &self.credentials {
            request = request.basic_auth(&creds.username, Some(&creds.password));
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(DashboardError::Http(format!("{} returned {}", self.url, status)));
        }

        let body = response.text().await?;
        tracing::debug!(url = %self.url, bytes = body.len(), "Fetched snapshot");

        Ok(StatsSnapshot::parse(&body)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fetch_unreachable_host() {
        // Port 9 (discard) on localhost is expected to refuse connections
        let client = StatsClient::new("http://127.0.0.1:9/api", None).unwrap();
        assert!(matches!(client.fetch().await, Err(DashboardError::Http(_))));
    }

    async fn stats_server() -> String {
        use axum::{
            http::{header, HeaderMap, StatusCode},
            response::IntoResponse,
            routing::get,
            Router,
        };

        let router = Router::new()
            .route(
                "/api",
                get(|headers: HeaderMap| async move {
                    if headers.contains_key(header::AUTHORIZATION) {
                        (
                            StatusCode::OK,
                            r#"{"daily": {"2026-02-23": {"count": 4}}, "total_tweets": 4}"#,
                        )
                            .into_response()
                    } else {
                        StatusCode::UNAUTHORIZED.into_response()
                    }
                }),
            )
            .route("/not-an-object", get(|| async { "[1, 2, 3]" }));

        crate::test_support::serve_locally(router).await
    }

    #[tokio::test]
    async fn test_fetch_parses_snapshot() {
        let base = stats_server().await;
        let client = StatsClient::new(
            format!("{}/api", base),
            Some(Credentials::new("admin", "secret")),
        )
        .unwrap();

        let snapshot = client.fetch().await.unwrap();
        assert_eq!(snapshot.total_tweets, 4);
        assert_eq!(snapshot.daily["2026-02-23"].count, 4);
    }

    #[tokio::test]
    async fn test_fetch_rejects_error_status() {
        let base = stats_server().await;
        let client = StatsClient::new(format!("{}/api", base), None).unwrap();

        match client.fetch().await {
            Err(DashboardError::Http(msg)) => assert!(msg.contains("401")),
            other => panic!("expected HTTP error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_fetch_rejects_non_object_body() {
        let base = stats_server().await;
        let client = StatsClient::new(format!("{}/not-an-object", base), None).unwrap();
        assert!(matches!(
            client.fetch().await,
            Err(DashboardError::InvalidPayload(_))
        ));
    }

    #[test]
    fn test_credentials() {
        let creds = Credentials::new("admin", "secret");
        assert_eq!(creds.username, "admin");
        assert_eq!(creds.password, "secret");
    }
}
