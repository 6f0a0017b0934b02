//! HTTP Basic authentication
//!
//! Every route except the health endpoints sits behind
//! [`require_basic_auth`]. Requests without the configured credentials get
//! `401` with a `WWW-Authenticate` challenge so browsers show a login prompt.

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use base64::Engine;
use std::sync::Arc;

use crate::api::error::ApiError;
use crate::api::state::AppState;
use crate::dashboard::Credentials;

/// Middleware rejecting requests that do not carry the configured credentials
pub async fn require_basic_auth(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if let Some(expected) = &state.config.credentials {
        match basic_credentials(request.headers()) {
            Some(given) if credentials_match(&given, expected) => {}
            Some(given) => {
                tracing::warn!(
                    username = %given.username,
                    path = %request.uri().path(),
                    "Rejected credentials"
                );
                return Err(ApiError::Unauthorized);
            }
            None => return Err(ApiError::Unauthorized),
        }
    }

    Ok(next.run(request).await)
}

/// Decode `Authorization: Basic <base64(user:pass)>`
pub fn basic_credentials(headers: &HeaderMap) -> Option<Credentials> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, encoded) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return None;
    }

    let decoded = base64::engine::general_purpose::STANDARD
        .decode(encoded.trim())
        .ok()?;
    let text = String::from_utf8(decoded).ok()?;
    let (username, password) = text.split_once(':')?;

    Some(Credentials::new(username, password))
}

fn credentials_match(given: &Credentials, expected: &Credentials) -> bool {
    constant_time_eq(given.username.as_bytes(), expected.username.as_bytes())
        & constant_time_eq(given.password.as_bytes(), expected.password.as_bytes())
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
