// SPDX-FileCopyrightText: 2026 Wabi Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for Wabi.
//!
//! This crate provides the domain types (events, reflections, conversation
//! messages), the error taxonomy, and the adapter traits implemented by the
//! assistant client and the record store.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::WabiError;
pub use types::{
    AdapterType, AssistantRequest, AssistantResponse, ContentBlock, ConversationMessage, Event,
    EventCategory, EventId, HealthStatus, RecordSet, Reflection, ReflectionId, Role, SessionId,
};

pub use traits::{AssistantAdapter, PluginAdapter, RecordStore};
