//! API Error Types
//!
//! Defines error types for the API layer and implements conversion
//! to HTTP responses with appropriate status codes.

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::collector::CollectorError;
use crate::dashboard::DashboardError;

/// Realm sent with every authentication challenge
pub const AUTH_REALM: &str = "Basic realm=\"Private\"";

/// API error types
#[derive(Error, Debug)]
pub enum ApiError {
    /// Request validation failed
    #[error("Validation error: {0}")]
    Validation(String),

    /// Missing or wrong Basic credentials
    #[error("Authentication required")]
    Unauthorized,

    /// Collection run failed
    #[error("Collector error: {0}")]
    Collector(#[from] CollectorError),

    /// Page could not be rendered
    #[error("Dashboard error: {0}")]
    Dashboard(#[from] DashboardError),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),

    /// Service unavailable (feature disabled or dependency down)
    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Error response body
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
    pub request_id: String,
}

/// Error details
#[derive(Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

impl ApiError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            ApiError::Collector(CollectorError::Storage(_)) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "STORAGE_ERROR")
            }
            ApiError::Collector(CollectorError::NoSources | CollectorError::UnknownSource(_)) => {
                (StatusCode::SERVICE_UNAVAILABLE, "COLLECTOR_UNAVAILABLE")
            }
            ApiError::Collector(_) => (StatusCode::BAD_GATEWAY, "COLLECTOR_ERROR"),
            ApiError::Dashboard(_) => (StatusCode::INTERNAL_SERVER_ERROR, "RENDER_ERROR"),
            ApiError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
            ApiError::ServiceUnavailable(_) => {
                (StatusCode::SERVICE_UNAVAILABLE, "SERVICE_UNAVAILABLE")
            }
            ApiError::Io(_) => (StatusCode::INTERNAL_SERVER_ERROR, "IO_ERROR"),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        let request_id = uuid::Uuid::new_v4().to_string();

        if status.is_server_error() {
            tracing::error!(
                request_id = %request_id,
                error_code = %code,
                error_message = %self,
                "API error occurred"
            );
        } else {
            tracing::debug!(
                request_id = %request_id,
                error_code = %code,
                error_message = %self,
                "Request rejected"
            );
        }

        let body = ErrorResponse {
            error: ErrorBody {
                code: code.to_string(),
                message: self.to_string(),
            },
            request_id,
        };

        let mut response = (status, Json(body)).into_response();
        if matches!(self, ApiError::Unauthorized) {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static(AUTH_REALM));
        }
        response
    }
}

/// Result type for API operations
pub type ApiResult<T> = Result<T, ApiError>;
