// SPDX-FileCopyrightText: 2026 Wabi Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers for the chat proxy.
//!
//! Handles POST/OPTIONS /api/chat and GET /health.

use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::{StatusCode, header::CONTENT_TYPE},
    response::{IntoResponse, Response},
};
use secrecy::ExposeSecret;
use serde::Serialize;
use tracing::{debug, warn};

use crate::server::ProxyState;

/// Response body for GET /health.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Health status string.
    pub status: String,
    /// Binary version.
    pub version: String,
    /// Seconds since the proxy started.
    pub uptime_secs: u64,
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error description.
    pub error: String,
    /// Underlying failure, when there is one worth reporting.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorResponse {
    fn new(error: &str) -> Self {
        Self {
            error: error.to_string(),
            details: None,
        }
    }
}

/// POST /api/chat
///
/// Forwards the body verbatim to the provider with the credential injected,
/// then relays the provider's status and JSON body unmodified.
pub async fn proxy_chat(State(state): State<ProxyState>, body: Bytes) -> Response {
    let mut request = state
        .http
        .post(&*state.upstream_url)
        .header(CONTENT_TYPE.as_str(), "application/json")
        .header("anthropic-version", &*state.api_version)
        .body(body);
    if let Some(key) = &state.api_key {
        request = request.header("x-api-key", key.expose_secret());
    }

    let upstream = match request.send().await {
        Ok(response) => response,
        Err(e) => return api_call_failed(&e),
    };

    let status =
        StatusCode::from_u16(upstream.status().as_u16()).unwrap_or(StatusCode::BAD_GATEWAY);
    match upstream.json::<serde_json::Value>().await {
        Ok(data) => {
            debug!(status = status.as_u16(), "upstream reply relayed");
            (status, Json(data)).into_response()
        }
        Err(e) => api_call_failed(&e),
    }
}

fn api_call_failed(e: &reqwest::Error) -> Response {
    warn!(error = %e, "upstream call failed");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: "API call failed".to_string(),
            details: Some(e.to_string()),
        }),
    )
        .into_response()
}

/// OPTIONS /api/chat
pub async fn preflight() -> StatusCode {
    StatusCode::OK
}

/// Any other method on /api/chat.
pub async fn method_not_allowed() -> Response {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(ErrorResponse::new("Method not allowed")),
    )
        .into_response()
}

/// GET /health
pub async fn get_health(State(state): State<ProxyState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_response_serializes() {
        let resp = HealthResponse {
            status: "ok".to_string(),
            version: "0.1.0".to_string(),
            uptime_secs: 42,
        };
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("\"status\":\"ok\""));
        assert!(json.contains("\"version\":\"0.1.0\""));
        assert!(json.contains("\"uptime_secs\":42"));
    }

    #[test]
    fn error_without_details_omits_the_field() {
        let json = serde_json::to_string(&ErrorResponse::new("Method not allowed")).unwrap();
        assert_eq!(json, r#"{"error":"Method not allowed"}"#);
    }

    #[test]
    fn error_with_details_serializes_both() {
        let resp = ErrorResponse {
            error: "API call failed".to_string(),
            details: Some("connection refused".to_string()),
        };
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["error"], "API call failed");
        assert_eq!(json["details"], "connection refused");
    }
}
