// SPDX-FileCopyrightText: 2026 Wabi Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Anthropic Messages API request and response types.
//!
//! These types map directly to the Anthropic API JSON format. The chat proxy
//! forwards the same payload, so both endpoints share them.

use serde::{Deserialize, Serialize};

/// Request body for `POST /v1/messages`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageRequest {
    /// Model identifier.
    pub model: String,
    /// Maximum tokens to generate.
    pub max_tokens: u32,
    /// Conversation messages.
    pub messages: Vec<ApiMessage>,
}

/// A single message in the API conversation format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiMessage {
    /// Role: "user" or "assistant".
    pub role: String,
    /// Plain-text content.
    pub content: String,
}

/// Response body from a non-streaming messages call.
///
/// Metadata fields are optional so provider-compatible payloads relayed
/// through the proxy still parse. `content` is required: a body without it
/// is malformed.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub stop_reason: Option<String>,
    pub content: Vec<ResponseContentBlock>,
}

/// A content block in the response.
///
/// Kept untyped on `type` so unknown block kinds (tool use, thinking)
/// are carried through instead of failing the whole response.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ResponseContentBlock {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub text: Option<String>,
}

/// API error response (non-streaming).
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorResponse {
    /// Error details.
    pub error: ApiErrorDetail,
}

/// Error detail within an API error response.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorDetail {
    /// Error type identifier.
    #[serde(rename = "type")]
    pub type_: String,
    /// Human-readable error message.
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serialize_message_request() {
        let req = MessageRequest {
            model: "claude-sonnet-4-20250514".into(),
            max_tokens: 1000,
            messages: vec![ApiMessage {
                role: "user".into(),
                content: "I went to the meetup.".into(),
            }],
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["model"], "claude-sonnet-4-20250514");
        assert_eq!(json["max_tokens"], 1000);
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["messages"][0]["content"], "I went to the meetup.");
        assert!(json.get("stream").is_none());
        assert!(json.get("system").is_none());
    }

    #[test]
    fn deserialize_mixed_content_blocks() {
        let json = r#"{
            "id": "msg_01",
            "type": "message",
            "role": "assistant",
            "content": [
                {"type": "thinking", "thinking": "..."},
                {"type": "text", "text": "That took courage."}
            ],
            "model": "claude-sonnet-4-20250514",
            "stop_reason": "end_turn",
            "usage": {"input_tokens": 10, "output_tokens": 5}
        }"#;
        let resp: MessageResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.id.as_deref(), Some("msg_01"));
        assert_eq!(resp.content.len(), 2);
        assert_eq!(resp.content[0].kind, "thinking");
        assert_eq!(resp.content[0].text, None);
        assert_eq!(resp.content[1].text.as_deref(), Some("That took courage."));
    }

    #[test]
    fn deserialize_sparse_response() {
        let resp: MessageResponse = serde_json::from_str(r#"{"content": []}"#).unwrap();
        assert!(resp.id.is_none());
        assert!(resp.content.is_empty());
    }

    #[test]
    fn response_without_content_is_rejected() {
        assert!(serde_json::from_str::<MessageResponse>(r#"{"type":"error"}"#).is_err());
        assert!(serde_json::from_str::<MessageResponse>("{}").is_err());
    }

    #[test]
    fn deserialize_api_error() {
        let json = r#"{"type":"error","error":{"type":"overloaded_error","message":"Overloaded"}}"#;
        let err: ApiErrorResponse = serde_json::from_str(json).unwrap();
        assert_eq!(err.error.type_, "overloaded_error");
        assert_eq!(err.error.message, "Overloaded");
    }
}
