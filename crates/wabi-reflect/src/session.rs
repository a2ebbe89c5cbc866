// SPDX-FileCopyrightText: 2026 Wabi Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-reflection FSM that drives turn-taking with the assistant.
//!
//! Each session goes through states: Idle -> AwaitingFirstReply -> Conversing -> Saved.
//! A turn in flight occupies the single pending slot; no second turn can start
//! until the first resolves. Assistant failures never escape a session: the
//! reply becomes a fixed fallback string and the conversation continues.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Local};
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{debug, info, warn};
use wabi_config::WabiConfig;
use wabi_config::model::PacingConfig;
use wabi_core::error::WabiError;
use wabi_core::traits::AssistantAdapter;
use wabi_core::types::{
    AssistantRequest, ConversationMessage, EventId, ReflectionId, SessionId,
};

use crate::builder::{self, ReflectionDraft, ReflectionOutcome};
use crate::emotion::EmotionTag;
use crate::insight::{EMPTY_REPLY, FALLBACK_REPLY};

/// States in the reflection session FSM.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Collecting the reflection text and emotion.
    Idle,
    /// Initial turn sent, waiting for the first reply.
    AwaitingFirstReply,
    /// Exchanging follow-up turns.
    Conversing,
    /// Reflection built; terminal.
    Saved,
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionState::Idle => write!(f, "idle"),
            SessionState::AwaitingFirstReply => write!(f, "awaiting first reply"),
            SessionState::Conversing => write!(f, "conversing"),
            SessionState::Saved => write!(f, "saved"),
        }
    }
}

/// Simulated reading time before each assistant call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacing {
    pub enabled: bool,
    pub base: Duration,
    pub per_char: Duration,
    pub max_reading: Duration,
}

impl Pacing {
    pub fn from_config(config: &PacingConfig) -> Self {
        Self {
            enabled: config.enabled,
            base: Duration::from_millis(config.base_delay_ms),
            per_char: Duration::from_millis(config.per_char_delay_ms),
            max_reading: Duration::from_millis(config.max_reading_delay_ms),
        }
    }

    /// No delay at all.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::from_config(&PacingConfig::default())
        }
    }

    /// `base + min(chars(previous) * per_char, max_reading)`.
    pub fn thinking_delay(&self, previous: &str) -> Duration {
        if !self.enabled {
            return Duration::ZERO;
        }
        let chars = u32::try_from(previous.chars().count()).unwrap_or(u32::MAX);
        let reading = self.per_char.saturating_mul(chars).min(self.max_reading);
        self.base + reading
    }
}

impl Default for Pacing {
    fn default() -> Self {
        Self::from_config(&PacingConfig::default())
    }
}

/// Per-session generation settings.
#[derive(Debug, Clone)]
pub struct SessionSettings {
    /// Persona name used in the initial prompt.
    pub agent_name: String,
    pub model: String,
    pub max_tokens: u32,
    pub pacing: Pacing,
}

impl SessionSettings {
    pub fn from_config(config: &WabiConfig) -> Self {
        Self {
            agent_name: config.agent.name.clone(),
            model: config.assistant.model.clone(),
            max_tokens: config.assistant.max_tokens,
            pacing: Pacing::from_config(&config.pacing),
        }
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self::from_config(&WabiConfig::default())
    }
}

/// What a reflection is about: a logged event or a freestanding name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReflectionTarget {
    pub event_id: Option<EventId>,
    pub event_name: String,
}

impl ReflectionTarget {
    pub fn event(id: EventId, name: impl Into<String>) -> Self {
        Self {
            event_id: Some(id),
            event_name: name.into(),
        }
    }

    pub fn freestanding(name: impl Into<String>) -> Self {
        Self {
            event_id: None,
            event_name: name.into(),
        }
    }
}

/// The turn currently holding the pending slot.
#[derive(Debug, Clone, Copy)]
struct PendingTurn {
    started_at: Instant,
    follow_up: bool,
}

/// Drives one reflection conversation from submission to save.
pub struct ReflectionSession {
    id: SessionId,
    state: SessionState,
    target: ReflectionTarget,
    settings: SessionSettings,
    assistant: Arc<dyn AssistantAdapter>,
    reflection: String,
    emotion: Option<EmotionTag>,
    /// Display conversation: first reply, then alternating turns.
    messages: Vec<ConversationMessage>,
    pending: Option<PendingTurn>,
    typing: watch::Sender<bool>,
}

impl ReflectionSession {
    pub fn new(
        target: ReflectionTarget,
        assistant: Arc<dyn AssistantAdapter>,
        settings: SessionSettings,
    ) -> Self {
        let id = SessionId(uuid::Uuid::new_v4().to_string());
        debug!(session_id = %id.0, event = %target.event_name, "reflection session created");
        Self {
            id,
            state: SessionState::Idle,
            target,
            settings,
            assistant,
            reflection: String::new(),
            emotion: None,
            messages: Vec::new(),
            pending: None,
            typing: watch::Sender::new(false),
        }
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn target(&self) -> &ReflectionTarget {
        &self.target
    }

    pub fn messages(&self) -> &[ConversationMessage] {
        &self.messages
    }

    pub fn reflection_text(&self) -> &str {
        &self.reflection
    }

    pub fn emotion(&self) -> Option<EmotionTag> {
        self.emotion
    }

    /// Subscribe to the typing indicator.
    pub fn typing(&self) -> watch::Receiver<bool> {
        self.typing.subscribe()
    }

    pub fn is_typing(&self) -> bool {
        *self.typing.borrow()
    }

    /// Submits the reflection and returns the first assistant reply.
    ///
    /// Rejects empty text or a missing emotion without changing state.
    pub async fn submit(
        &mut self,
        reflection: &str,
        emotion: Option<EmotionTag>,
    ) -> Result<String, WabiError> {
        self.ensure_ready("submit", SessionState::Idle)?;

        let text = reflection.trim();
        let Some(emotion) = emotion.filter(|_| !text.is_empty()) else {
            return Err(WabiError::Validation(
                "Please share your reflection and select how you felt".into(),
            ));
        };

        self.reflection = text.to_string();
        self.emotion = Some(emotion);
        self.state = SessionState::AwaitingFirstReply;
        info!(
            session_id = %self.id.0,
            event = %self.target.event_name,
            emotion = emotion.label(),
            "reflection submitted"
        );

        let prompt = persona_prompt(
            &self.settings.agent_name,
            &self.target.event_name,
            emotion.label(),
            &self.reflection,
        );
        let previous = self.reflection.clone();
        let reply = self
            .run_turn(vec![ConversationMessage::user(prompt)], &previous, false)
            .await;

        self.messages.push(ConversationMessage::assistant(reply.clone()));
        self.state = SessionState::Conversing;
        Ok(reply)
    }

    /// Sends a follow-up user message and returns the assistant reply.
    pub async fn respond(&mut self, text: &str) -> Result<String, WabiError> {
        self.ensure_ready("respond", SessionState::Conversing)?;

        let text = text.trim();
        if text.is_empty() {
            return Err(WabiError::Validation("Please enter a response".into()));
        }

        self.messages.push(ConversationMessage::user(text));
        let history = self.history();
        let reply = self.run_turn(history, text, true).await;

        self.messages.push(ConversationMessage::assistant(reply.clone()));
        Ok(reply)
    }

    /// Ends the conversation and builds the reflection record.
    pub fn save(
        &mut self,
        id: ReflectionId,
        now: DateTime<Local>,
    ) -> Result<ReflectionOutcome, WabiError> {
        self.ensure_ready("save", SessionState::Conversing)?;
        let emotion = self.emotion.ok_or_else(|| {
            WabiError::Internal("conversing session without an emotion".into())
        })?;

        let outcome = builder::build_reflection(ReflectionDraft {
            id,
            event_id: self.target.event_id,
            event_name: &self.target.event_name,
            emotion,
            body: &self.reflection,
            messages: &self.messages,
            now,
        });
        self.state = SessionState::Saved;
        info!(
            session_id = %self.id.0,
            reflection_id = %id,
            turns = self.messages.len(),
            "reflection saved"
        );
        Ok(outcome)
    }

    /// Full request history for a follow-up turn: seed message, then every
    /// display message in order (the first reply included).
    fn history(&self) -> Vec<ConversationMessage> {
        let label = self.emotion.map(EmotionTag::label).unwrap_or("uncertain");
        let mut history = Vec::with_capacity(self.messages.len() + 1);
        history.push(ConversationMessage::user(seed_message(
            &self.target.event_name,
            label,
            &self.reflection,
        )));
        history.extend(self.messages.iter().cloned());
        history
    }

    fn ensure_ready(&self, action: &'static str, expected: SessionState) -> Result<(), WabiError> {
        if self.pending.is_some() {
            return Err(WabiError::InvalidState {
                action,
                state: "awaiting a reply".into(),
            });
        }
        if self.state != expected {
            return Err(WabiError::InvalidState {
                action,
                state: self.state.to_string(),
            });
        }
        Ok(())
    }

    /// Runs one assistant turn inside the pending slot.
    ///
    /// If this future is dropped before completion the slot stays occupied.
    async fn run_turn(
        &mut self,
        messages: Vec<ConversationMessage>,
        previous: &str,
        follow_up: bool,
    ) -> String {
        self.pending = Some(PendingTurn {
            started_at: Instant::now(),
            follow_up,
        });
        self.typing.send_replace(true);

        let delay = self.settings.pacing.thinking_delay(previous);
        if !delay.is_zero() {
            debug!(session_id = %self.id.0, delay_ms = delay.as_millis() as u64, "simulating reading time");
            tokio::time::sleep(delay).await;
        }

        let request = AssistantRequest {
            model: self.settings.model.clone(),
            max_tokens: self.settings.max_tokens,
            messages,
        };
        let reply = match self.assistant.complete(request).await {
            Ok(response) => match response.first_text().filter(|t| !t.is_empty()) {
                Some(text) => text.to_string(),
                None => {
                    debug!(session_id = %self.id.0, "reply had no text block");
                    EMPTY_REPLY.to_string()
                }
            },
            Err(e) => {
                warn!(session_id = %self.id.0, error = %e, "assistant call failed, using fallback reply");
                FALLBACK_REPLY.to_string()
            }
        };

        if let Some(turn) = self.pending.take() {
            debug!(
                session_id = %self.id.0,
                follow_up = turn.follow_up,
                elapsed_ms = turn.started_at.elapsed().as_millis() as u64,
                "turn resolved"
            );
        }
        self.typing.send_replace(false);
        reply
    }
}

/// Instruction prompt sent as the sole message of the initial turn.
pub fn persona_prompt(agent_name: &str, event_name: &str, label: &str, reflection: &str) -> String {
    format!(
        "You are {agent_name}, a warm, supportive AI companion for introverts reflecting on social events.\n\n\
         The person just attended: {event_name}\n\
         They felt: {label}\n\
         Their reflection: \"{reflection}\"\n\n\
         IMPORTANT: Keep your FIRST response very brief (1-2 sentences max). Acknowledge one specific positive thing they did, then simply ask: \"Would you like to set a small goal for next time?\"\n\n\
         For FOLLOW-UP responses: If they engage further or give longer answers, you can be more conversational and ask deeper questions. Match their energy level - short answers get short responses, longer answers get more thoughtful engagement."
    )
}

/// First message of every follow-up request.
pub fn seed_message(event_name: &str, label: &str, reflection: &str) -> String {
    format!("I'm reflecting on: {event_name}. I felt {label}. My reflection: \"{reflection}\"")
}
