// SPDX-FileCopyrightText: 2026 Wabi Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock assistant adapter for deterministic testing.
//!
//! `MockAssistant` implements `AssistantAdapter` with a scripted FIFO queue
//! of replies and failures, and keeps every request it receives.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use wabi_core::traits::{AssistantAdapter, PluginAdapter};
use wabi_core::types::{
    AdapterType, AssistantRequest, AssistantResponse, ContentBlock, HealthStatus,
};
use wabi_core::WabiError;

/// Text returned once the script runs out.
pub const DEFAULT_MOCK_REPLY: &str = "mock reply";

/// One scripted outcome.
#[derive(Debug, Clone)]
pub enum MockReply {
    /// A single text block.
    Text(String),
    /// A raw response, e.g. one without any text block.
    Response(AssistantResponse),
    /// A collaborator failure with the given message.
    Failure(String),
}

/// A mock assistant that plays back scripted replies.
#[derive(Clone, Default)]
pub struct MockAssistant {
    script: Arc<Mutex<VecDeque<MockReply>>>,
    requests: Arc<Mutex<Vec<AssistantRequest>>>,
}

impl MockAssistant {
    /// Create a mock assistant with an empty script.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mock assistant pre-loaded with text replies.
    pub fn with_replies<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let script = replies
            .into_iter()
            .map(|text| MockReply::Text(text.into()))
            .collect();
        Self {
            script: Arc::new(Mutex::new(script)),
            requests: Arc::default(),
        }
    }

    /// Append an outcome to the end of the script.
    pub async fn push(&self, reply: MockReply) {
        self.script.lock().await.push_back(reply);
    }

    /// Append a text reply.
    pub async fn push_text(&self, text: impl Into<String>) {
        self.push(MockReply::Text(text.into())).await;
    }

    /// Append a failure.
    pub async fn push_failure(&self, message: impl Into<String>) {
        self.push(MockReply::Failure(message.into())).await;
    }

    /// All requests received so far, in order.
    pub async fn requests(&self) -> Vec<AssistantRequest> {
        self.requests.lock().await.clone()
    }

    async fn next_reply(&self) -> MockReply {
        self.script
            .lock()
            .await
            .pop_front()
            .unwrap_or_else(|| MockReply::Text(DEFAULT_MOCK_REPLY.to_string()))
    }
}

#[async_trait]
impl PluginAdapter for MockAssistant {
    fn name(&self) -> &str {
        "mock-assistant"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Assistant
    }

    async fn health_check(&self) -> Result<HealthStatus, WabiError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), WabiError> {
        Ok(())
    }
}

#[async_trait]
impl AssistantAdapter for MockAssistant {
    async fn complete(&self, request: AssistantRequest) -> Result<AssistantResponse, WabiError> {
        self.requests.lock().await.push(request);
        match self.next_reply().await {
            MockReply::Text(text) => Ok(AssistantResponse {
                id: Some(format!("mock-{}", uuid::Uuid::new_v4())),
                content: vec![ContentBlock::Text { text }],
            }),
            MockReply::Response(response) => Ok(response),
            MockReply::Failure(message) => Err(WabiError::Assistant {
                message,
                source: None,
            }),
        }
    }
}
