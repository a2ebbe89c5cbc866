// SPDX-FileCopyrightText: 2026 Wabi Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Assistant adapter trait for the external text-generation collaborator.

use async_trait::async_trait;

use crate::error::WabiError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{AssistantRequest, AssistantResponse};

/// Adapter for the text-generation service that produces assistant turns.
///
/// Implementations report every failure (transport, non-success status,
/// malformed payload) as an error; callers decide how to recover.
#[async_trait]
pub trait AssistantAdapter: PluginAdapter {
    /// Sends one turn request and returns the structured reply.
    async fn complete(&self, request: AssistantRequest) -> Result<AssistantResponse, WabiError>;
}
