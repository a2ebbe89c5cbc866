// SPDX-FileCopyrightText: 2026 Wabi Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Composes a finished conversation into an immutable [`Reflection`].

use chrono::{DateTime, Local, Utc};
use wabi_core::types::{ConversationMessage, EventId, Reflection, ReflectionId};

use crate::emotion::EmotionTag;
use crate::insight;

const SNIPPET_CHARS: usize = 40;

/// Everything the builder needs; identifier and clock come from the caller.
#[derive(Debug, Clone, Copy)]
pub struct ReflectionDraft<'a> {
    pub id: ReflectionId,
    pub event_id: Option<EventId>,
    pub event_name: &'a str,
    pub emotion: EmotionTag,
    pub body: &'a str,
    pub messages: &'a [ConversationMessage],
    pub now: DateTime<Local>,
}

/// A built reflection plus the event it completes, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReflectionOutcome {
    pub reflection: Reflection,
    pub completed_event: Option<EventId>,
}

/// Builds the reflection record. Pure.
pub fn build_reflection(draft: ReflectionDraft<'_>) -> ReflectionOutcome {
    let style = draft.emotion.classify();
    let reflection = Reflection {
        id: draft.id,
        event_id: draft.event_id,
        event_name: draft.event_name.to_string(),
        date: draft.now.date_naive(),
        created_at: draft.now.with_timezone(&Utc),
        emotion: draft.emotion.emoji().to_string(),
        emotion_bg: style.background.to_string(),
        emotion_border: style.border.to_string(),
        snippet: snippet(draft.body),
        full_reflection: draft.body.to_string(),
        highlights: insight::extract_highlights(draft.messages),
        comfort_level: style.label.to_string(),
        goal_for_next: insight::extract_goal(draft.messages, draft.body),
    };

    ReflectionOutcome {
        reflection,
        completed_event: draft.event_id,
    }
}

/// First 40 characters plus `...`, appended even when nothing was cut.
pub fn snippet(body: &str) -> String {
    let mut preview: String = body.chars().take(SNIPPET_CHARS).collect();
    preview.push_str("...");
    preview
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeZone};

    fn draft<'a>(body: &'a str, messages: &'a [ConversationMessage]) -> ReflectionDraft<'a> {
        ReflectionDraft {
            id: ReflectionId(3),
            event_id: Some(EventId(7)),
            event_name: "Board Game Night",
            emotion: EmotionTag::Positive,
            body,
            messages,
            now: Local.with_ymd_and_hms(2026, 3, 14, 20, 30, 0).unwrap(),
        }
    }

    #[test]
    fn short_body_snippet_still_gets_ellipsis() {
        assert_eq!(snippet("Fun night."), "Fun night....");
        assert_eq!(snippet(""), "...");
    }

    #[test]
    fn long_body_snippet_is_cut_at_forty_chars() {
        let body = "I laughed a lot and even explained the rules to a newcomer.";
        assert_eq!(snippet(body), "I laughed a lot and even explained the r...");
    }

    #[test]
    fn snippet_counts_characters_not_bytes() {
        let body = "😊".repeat(45);
        assert_eq!(snippet(&body).chars().count(), 43);
    }

    #[test]
    fn builds_full_record() {
        let messages = vec![
            ConversationMessage::assistant(
                "You taught the rules to someone new.\nWould you like to set a small goal for next time?",
            ),
            ConversationMessage::user("yes"),
            ConversationMessage::assistant("How about trying to host one round yourself?"),
        ];
        let outcome = build_reflection(draft("Fun night.", &messages));
        let r = &outcome.reflection;

        assert_eq!(r.id, ReflectionId(3));
        assert_eq!(r.event_id, Some(EventId(7)));
        assert_eq!(r.event_name, "Board Game Night");
        assert_eq!(r.date, NaiveDate::from_ymd_opt(2026, 3, 14).unwrap());
        assert_eq!(r.emotion, "🙂");
        assert_eq!(r.emotion_bg, "bg-green-100");
        assert_eq!(r.emotion_border, "border-green-300");
        assert_eq!(r.comfort_level, "Comfortable");
        assert_eq!(r.snippet, "Fun night....");
        assert_eq!(r.full_reflection, "Fun night.");
        assert_eq!(r.highlights, vec!["You taught the rules to someone new."]);
        assert_eq!(r.goal_for_next, "Host one round yourself");
        assert_eq!(outcome.completed_event, Some(EventId(7)));
    }

    #[test]
    fn freestanding_reflection_completes_nothing() {
        let mut d = draft("Quiet coffee.", &[]);
        d.event_id = None;
        let outcome = build_reflection(d);
        assert_eq!(outcome.completed_event, None);
        assert_eq!(outcome.reflection.goal_for_next, insight::DEFAULT_GOAL);
        assert_eq!(
            outcome.reflection.highlights,
            insight::DEFAULT_HIGHLIGHTS.to_vec()
        );
    }
}
