// SPDX-FileCopyrightText: 2026 Wabi Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Reflection dialogue and insight extraction for Wabi.
//!
//! A [`ReflectionSession`] runs one conversation about an event: the user
//! submits a written reflection with an emotion tag, the assistant answers,
//! and the exchange continues until the user saves. Saving turns the
//! transcript into a [`Reflection`](wabi_core::types::Reflection) with
//! highlights and a concrete goal for next time, extracted heuristically
//! from the conversation.
//!
//! [`AppState`] owns the persisted record collections and coordinates
//! event logging, session start and reflection commit.

pub mod app;
pub mod builder;
pub mod emotion;
pub mod insight;
pub mod session;
pub mod stats;

pub use app::{AppState, EventDraft, ReflectOn, format_event_date};
pub use builder::{ReflectionDraft, ReflectionOutcome, build_reflection};
pub use emotion::{EmotionStyle, EmotionTag};
pub use insight::{extract_goal, extract_highlights};
pub use session::{Pacing, ReflectionSession, ReflectionTarget, SessionSettings, SessionState};
pub use stats::{Stats, compute_stats};
