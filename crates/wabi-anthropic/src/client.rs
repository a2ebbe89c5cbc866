// SPDX-FileCopyrightText: 2026 Wabi Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the Anthropic Messages API.
//!
//! Provides [`AnthropicClient`] which handles request construction,
//! authentication headers, and error mapping. Failed calls are not retried:
//! the reflection session substitutes a fallback reply instead.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue};
use tracing::debug;
use wabi_core::WabiError;

use crate::types::{ApiErrorResponse, MessageRequest, MessageResponse};

/// HTTP client for Anthropic API communication.
#[derive(Debug, Clone)]
pub struct AnthropicClient {
    client: reqwest::Client,
    endpoint: String,
}

impl AnthropicClient {
    /// Creates a new client posting to `endpoint`.
    ///
    /// `api_key` is sent as `x-api-key` when present. A `wabi serve` proxy
    /// injects the key itself, so callers pointing at the proxy pass `None`.
    pub fn new(
        endpoint: String,
        api_key: Option<&str>,
        api_version: &str,
        timeout: Duration,
    ) -> Result<Self, WabiError> {
        let mut headers = HeaderMap::new();
        if let Some(key) = api_key {
            headers.insert(
                "x-api-key",
                HeaderValue::from_str(key).map_err(|e| {
                    WabiError::Config(format!("invalid API key header value: {e}"))
                })?,
            );
        }
        headers.insert(
            "anthropic-version",
            HeaderValue::from_str(api_version).map_err(|e| {
                WabiError::Config(format!("invalid API version header value: {e}"))
            })?,
        );
        headers.insert("content-type", HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| WabiError::Assistant {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self { client, endpoint })
    }

    /// Returns the endpoint this client posts to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Sends a non-streaming request and returns the full response.
    pub async fn complete_message(
        &self,
        request: &MessageRequest,
    ) -> Result<MessageResponse, WabiError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await
            .map_err(|e| WabiError::Assistant {
                message: format!("HTTP request failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        debug!(status = %status, messages = request.messages.len(), "completion response received");

        let body = response.text().await.map_err(|e| WabiError::Assistant {
            message: format!("failed to read response body: {e}"),
            source: Some(Box::new(e)),
        })?;

        if !status.is_success() {
            let message = match serde_json::from_str::<ApiErrorResponse>(&body) {
                Ok(api_err) => format!(
                    "Anthropic API error ({}): {}",
                    api_err.error.type_, api_err.error.message
                ),
                Err(_) => format!("API returned {status}: {body}"),
            };
            return Err(WabiError::Assistant {
                message,
                source: None,
            });
        }

        serde_json::from_str(&body).map_err(|e| WabiError::Assistant {
            message: format!("failed to parse API response: {e}"),
            source: Some(Box::new(e)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ApiMessage;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(base_url: &str, api_key: Option<&str>) -> AnthropicClient {
        AnthropicClient::new(
            format!("{base_url}/v1/messages"),
            api_key,
            "2023-06-01",
            Duration::from_secs(5),
        )
        .unwrap()
    }

    fn test_request() -> MessageRequest {
        MessageRequest {
            model: "claude-sonnet-4-20250514".into(),
            max_tokens: 1000,
            messages: vec![ApiMessage {
                role: "user".into(),
                content: "Hello".into(),
            }],
        }
    }

    #[tokio::test]
    async fn complete_message_success() {
        let server = MockServer::start().await;

        let response_body = serde_json::json!({
            "id": "msg_test",
            "type": "message",
            "role": "assistant",
            "content": [{"type": "text", "text": "Hi there!"}],
            "model": "claude-sonnet-4-20250514",
            "stop_reason": "end_turn",
            "usage": {"input_tokens": 10, "output_tokens": 5}
        });

        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .and(header("x-api-key", "test-api-key"))
            .and(header("anthropic-version", "2023-06-01"))
            .and(body_json(serde_json::json!({
                "model": "claude-sonnet-4-20250514",
                "max_tokens": 1000,
                "messages": [{"role": "user", "content": "Hello"}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(&response_body))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server.uri(), Some("test-api-key"));
        let result = client.complete_message(&test_request()).await.unwrap();

        assert_eq!(result.id.as_deref(), Some("msg_test"));
        assert_eq!(result.content.len(), 1);
        assert_eq!(result.content[0].text.as_deref(), Some("Hi there!"));
    }

    #[tokio::test]
    async fn no_api_key_header_without_key() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"content": [{"type": "text", "text": "ok"}]})),
            )
            .mount(&server)
            .await;

        let client = test_client(&server.uri(), None);
        client.complete_message(&test_request()).await.unwrap();

        let received = server.received_requests().await.unwrap();
        assert_eq!(received.len(), 1);
        assert!(received[0].headers.get("x-api-key").is_none());
        assert!(received[0].headers.get("anthropic-version").is_some());
    }

    #[tokio::test]
    async fn complete_message_does_not_retry_on_429() {
        let server = MockServer::start().await;

        let error_body = serde_json::json!({
            "type": "error",
            "error": {"type": "rate_limit_error", "message": "Rate limited"}
        });

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_json(&error_body))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server.uri(), Some("k"));
        let err = client.complete_message(&test_request()).await.unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("rate_limit_error"), "got: {msg}");
        assert!(msg.contains("Rate limited"), "got: {msg}");
    }

    #[tokio::test]
    async fn non_json_error_body_is_reported_with_status() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
            .mount(&server)
            .await;

        let client = test_client(&server.uri(), Some("k"));
        let msg = client
            .complete_message(&test_request())
            .await
            .unwrap_err()
            .to_string();
        assert!(msg.contains("502"), "got: {msg}");
        assert!(msg.contains("bad gateway"), "got: {msg}");
    }

    #[tokio::test]
    async fn malformed_success_body_is_an_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let client = test_client(&server.uri(), Some("k"));
        let err = client.complete_message(&test_request()).await.unwrap_err();
        assert!(err.to_string().contains("failed to parse API response"));
    }

    #[test]
    fn invalid_header_value_is_config_error() {
        let err = AnthropicClient::new(
            "http://localhost/v1/messages".into(),
            Some("bad\nkey"),
            "2023-06-01",
            Duration::from_secs(1),
        )
        .unwrap_err();
        assert!(matches!(err, WabiError::Config(_)));
    }
}
