// SPDX-FileCopyrightText: 2026 Wabi Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Anthropic assistant adapter for Wabi.
//!
//! This crate implements [`AssistantAdapter`] for the Anthropic Messages API,
//! either directly or through a `wabi serve` chat proxy.

pub mod client;
pub mod types;

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info};
use wabi_config::model::AssistantConfig;
use wabi_core::error::WabiError;
use wabi_core::traits::{AssistantAdapter, PluginAdapter};
use wabi_core::types::{
    AdapterType, AssistantRequest, AssistantResponse, ContentBlock, HealthStatus,
};

use crate::client::AnthropicClient;
use crate::types::{ApiMessage, MessageRequest, MessageResponse, ResponseContentBlock};

/// Anthropic-backed assistant implementing [`AssistantAdapter`].
pub struct AnthropicAssistant {
    client: AnthropicClient,
}

impl AnthropicAssistant {
    /// Creates a new assistant from the given configuration.
    ///
    /// # API Key Resolution
    /// 1. `config.api_key` if set and non-empty
    /// 2. `ANTHROPIC_API_KEY` environment variable
    /// 3. No key: requests go out without `x-api-key` (proxy mode)
    pub fn new(config: &AssistantConfig) -> Result<Self, WabiError> {
        let api_key = resolve_api_key(config.api_key.as_deref());
        let client = AnthropicClient::new(
            config.endpoint.clone(),
            api_key.as_deref(),
            &config.api_version,
            Duration::from_secs(config.timeout_secs),
        )?;

        info!(
            endpoint = %config.endpoint,
            model = %config.model,
            keyed = api_key.is_some(),
            "assistant adapter initialized"
        );

        Ok(Self { client })
    }

    /// Creates an assistant with an existing client.
    pub fn with_client(client: AnthropicClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PluginAdapter for AnthropicAssistant {
    fn name(&self) -> &str {
        "anthropic"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Assistant
    }

    async fn health_check(&self) -> Result<HealthStatus, WabiError> {
        // Avoid spending tokens on health checks.
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), WabiError> {
        debug!("assistant adapter shutting down");
        Ok(())
    }
}

#[async_trait]
impl AssistantAdapter for AnthropicAssistant {
    async fn complete(&self, request: AssistantRequest) -> Result<AssistantResponse, WabiError> {
        let api_request = to_message_request(&request);
        let response = self.client.complete_message(&api_request).await?;
        Ok(to_assistant_response(response))
    }
}

fn to_message_request(request: &AssistantRequest) -> MessageRequest {
    MessageRequest {
        model: request.model.clone(),
        max_tokens: request.max_tokens,
        messages: request
            .messages
            .iter()
            .map(|m| ApiMessage {
                role: m.role.to_string(),
                content: m.content.clone(),
            })
            .collect(),
    }
}

fn to_assistant_response(response: MessageResponse) -> AssistantResponse {
    AssistantResponse {
        id: response.id,
        content: response
            .content
            .into_iter()
            .map(|block| match block {
                ResponseContentBlock {
                    kind,
                    text: Some(text),
                } if kind == "text" => ContentBlock::Text { text },
                ResponseContentBlock { kind, .. } => ContentBlock::Other { kind },
            })
            .collect(),
    }
}

/// Resolves the API key: config value, then `ANTHROPIC_API_KEY`.
pub fn resolve_api_key(config_key: Option<&str>) -> Option<String> {
    if let Some(key) = config_key
        && !key.is_empty()
    {
        return Some(key.to_string());
    }

    std::env::var("ANTHROPIC_API_KEY")
        .ok()
        .filter(|k| !k.is_empty())
}
