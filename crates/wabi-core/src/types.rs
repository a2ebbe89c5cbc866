// SPDX-FileCopyrightText: 2026 Wabi Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types shared across adapter traits and the reflection engine.

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Unique identifier for a reflection conversation session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

/// Identifier of a logged event. Assigned monotonically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(pub u64);

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a stored reflection. Assigned monotonically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReflectionId(pub u64);

impl fmt::Display for ReflectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the kind of collaborator behind an adapter.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Assistant,
    Storage,
    Gateway,
}

// --- Events ---

/// Closed set of event categories.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(ascii_case_insensitive)]
pub enum EventCategory {
    #[default]
    Social,
    Professional,
    Networking,
}

impl EventCategory {
    /// Display-color tag derived from the category.
    pub fn color(self) -> &'static str {
        match self {
            EventCategory::Social => "bg-indigo-100 text-indigo-600",
            EventCategory::Professional => "bg-amber-100 text-amber-600",
            EventCategory::Networking => "bg-emerald-100 text-emerald-600",
        }
    }

    /// Single-letter badge used in event listings.
    pub fn initial(self) -> char {
        match self {
            EventCategory::Social => 'S',
            EventCategory::Professional => 'P',
            EventCategory::Networking => 'N',
        }
    }
}

/// A social event the user plans to attend and later reflect on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub name: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub category: EventCategory,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub goal: Option<String>,
    pub type_color: String,
}

// --- Conversation ---

/// Speaker of a conversation message.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One turn of a reflection conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationMessage {
    pub role: Role,
    pub content: String,
}

impl ConversationMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// A turn request sent to the assistant collaborator.
#[derive(Debug, Clone)]
pub struct AssistantRequest {
    /// Model identifier (e.g., "claude-sonnet-4-20250514").
    pub model: String,
    /// Maximum output tokens.
    pub max_tokens: u32,
    /// Full ordered message history for this turn.
    pub messages: Vec<ConversationMessage>,
}

/// A content block of an assistant reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentBlock {
    /// Plain text.
    Text { text: String },
    /// Any non-text block (tool use, thinking, ...), identified by its kind.
    Other { kind: String },
}

/// The payload returned by the assistant collaborator.
#[derive(Debug, Clone, Default)]
pub struct AssistantResponse {
    /// Provider-assigned response id, if any.
    pub id: Option<String>,
    /// Content blocks in provider order.
    pub content: Vec<ContentBlock>,
}

impl AssistantResponse {
    /// Returns the text of the first `text` block.
    pub fn first_text(&self) -> Option<&str> {
        self.content.iter().find_map(|block| match block {
            ContentBlock::Text { text } => Some(text.as_str()),
            ContentBlock::Other { .. } => None,
        })
    }
}

// --- Reflections ---

/// A stored, immutable reflection record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reflection {
    pub id: ReflectionId,
    /// Originating event, absent for freestanding reflections.
    #[serde(default)]
    pub event_id: Option<EventId>,
    pub event_name: String,
    /// Creation day, used for streaks.
    pub date: NaiveDate,
    pub created_at: DateTime<Utc>,
    /// Emotion emoji.
    pub emotion: String,
    pub emotion_bg: String,
    pub emotion_border: String,
    pub snippet: String,
    pub full_reflection: String,
    pub highlights: Vec<String>,
    pub comfort_level: String,
    pub goal_for_next: String,
}

/// The three persisted collections, as loaded at startup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordSet {
    pub events: Vec<Event>,
    pub reflections: Vec<Reflection>,
    pub completed_event_ids: Vec<EventId>,
}
