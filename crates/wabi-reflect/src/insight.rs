// SPDX-FileCopyrightText: 2026 Wabi Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Heuristic goal and highlight extraction from a finished conversation.
//!
//! Goal extraction runs an ordered table of independent matchers. Each
//! matcher either proposes a candidate or passes; the first usable
//! candidate wins. No model call, no network.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;
use wabi_core::types::{ConversationMessage, Role};

/// Goal used whenever nothing usable can be extracted.
pub const DEFAULT_GOAL: &str = "Continue building social confidence";

/// Reply substituted when the assistant call fails.
pub const FALLBACK_REPLY: &str = "I'm having trouble connecting right now, but I'm here for you. Could you tell me more about your experience?";

/// Reply substituted when the assistant answers without any text block.
pub const EMPTY_REPLY: &str = "I'm here to support you.";

/// Highlights used when the first assistant reply was the fallback.
pub const FALLBACK_HIGHLIGHTS: [&str; 3] = [
    "You showed up",
    "You took time to reflect",
    "You're building self-awareness",
];

/// Highlights used when the first reply had no usable lines.
pub const DEFAULT_HIGHLIGHTS: [&str; 2] = ["You showed up", "You participated"];

/// Hard cap on goal length, in characters.
pub const MAX_GOAL_CHARS: usize = 120;

const MAX_HIGHLIGHTS: usize = 3;
const MIN_CANDIDATE_CHARS: usize = 8;
const MIN_ASSISTANT_SIGNAL_CHARS: usize = 20;
const SHORT_STATEMENT_MIN_CHARS: usize = 15;
const SHORT_STATEMENT_MAX_CHARS: usize = 150;
const MIN_USER_STATEMENT_CHARS: usize = 15;

/// Assistant phrasings that introduce a goal clause, strongest first.
/// Each captures the clause up to the next sentence break.
static SUGGESTION_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    vec![
        Regex::new(r"(?i)\bso your goal is\s+([^.!?\n]+)").unwrap(),
        Regex::new(r"(?i)\byour goal\b[^.!?\n]*?\bcould be\s+([^.!?\n]+)").unwrap(),
        Regex::new(r"(?i)\ba small goal could be\s+([^.!?\n]+)").unwrap(),
        Regex::new(r"(?i)\bhow about trying to\s+([^.!?\n]+)").unwrap(),
        Regex::new(r"(?i)\bhow about\s+([^.!?\n]+)").unwrap(),
        Regex::new(r"(?i)\bwhy don['’]t you\s+([^.!?\n]+)").unwrap(),
        Regex::new(r"(?i)\bwhat if you\s+([^.!?\n]+)").unwrap(),
        Regex::new(r"(?i)\byou could\s+([^.!?\n]+)").unwrap(),
        Regex::new(r"(?i)\bmaybe\s+([^.!?\n]+)").unwrap(),
    ]
});

/// Leading acknowledgements dropped from a short assistant statement.
static LEADING_ACKNOWLEDGEMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^(?:(?:okay|ok|great|perfect|awesome|sure|yes|wonderful|got it|sounds good|alright)\b[\s,.!:;-]*)+",
    )
    .unwrap()
});

/// Words that never start a goal.
const FILLER_WORDS: &[&str] = &["to", "you", "will", "can", "could", "would", "should"];

/// Replies that carry no goal on their own.
const ACKNOWLEDGEMENT_TOKENS: &[&str] = &["yes", "yeah", "sure", "okay", "ok", "no"];

/// First-person intent prefixes, longest first so partial strips cannot win.
const INTENT_PREFIXES: &[&str] = &[
    "next time i want to ",
    "next time i will ",
    "i would like to ",
    "next time i'll ",
    "i think i will ",
    "i can try to ",
    "maybe i can ",
    "i want to ",
    "i plan to ",
    "i could ",
    "i will ",
    "try to ",
    "i'll ",
    "to ",
];

/// Inputs shared by every goal matcher.
#[derive(Debug, Clone, Copy)]
pub struct GoalContext<'a> {
    /// Display conversation in turn order (no seed or persona prompt).
    pub messages: &'a [ConversationMessage],
    /// The reflection body the conversation started from.
    pub reflection: &'a str,
}

impl<'a> GoalContext<'a> {
    /// Assistant replies in turn order, stand-in replies excluded.
    fn assistant_messages(&self) -> impl DoubleEndedIterator<Item = &'a str> {
        self.messages
            .iter()
            .filter(|m| m.role == Role::Assistant && !is_substitute_reply(&m.content))
            .map(|m| m.content.as_str())
    }

    fn user_messages(&self) -> impl DoubleEndedIterator<Item = &'a str> {
        self.messages
            .iter()
            .filter(|m| m.role == Role::User)
            .map(|m| m.content.as_str())
    }
}

type GoalMatcher = fn(&GoalContext<'_>) -> Option<String>;

/// Ordered goal rules. The first candidate wins.
const GOAL_RULES: &[(&str, GoalMatcher)] = &[
    ("assistant_suggestion", assistant_suggestion),
    ("short_statement", short_statement),
    ("user_statement", user_statement),
];

/// Returns true for either fixed stand-in reply. Neither carries signal.
pub fn is_substitute_reply(text: &str) -> bool {
    let text = text.trim();
    text == FALLBACK_REPLY || text == EMPTY_REPLY
}

/// Extracts exactly one goal from the conversation.
///
/// Always returns a non-empty string of at most [`MAX_GOAL_CHARS`] characters.
pub fn extract_goal(messages: &[ConversationMessage], reflection: &str) -> String {
    let ctx = GoalContext {
        messages,
        reflection,
    };

    if lacks_signal(&ctx) {
        debug!("no assistant signal, using default goal");
        return DEFAULT_GOAL.to_string();
    }

    for (rule, matcher) in GOAL_RULES {
        if let Some(goal) = matcher(&ctx) {
            debug!(rule, goal_chars = goal.chars().count(), "goal extracted");
            return goal;
        }
    }

    debug!("no goal rule matched, using default goal");
    DEFAULT_GOAL.to_string()
}

/// No real assistant replies, or too little assistant text.
fn lacks_signal(ctx: &GoalContext<'_>) -> bool {
    let total_chars: usize = ctx
        .assistant_messages()
        .map(|text| text.trim().chars().count())
        .sum();
    total_chars < MIN_ASSISTANT_SIGNAL_CHARS
}

fn assistant_suggestion(ctx: &GoalContext<'_>) -> Option<String> {
    ctx.assistant_messages()
        .rev()
        .find_map(|text| {
            SUGGESTION_PATTERNS.iter().find_map(|pattern| {
                let clause = pattern.captures(text)?.get(1)?.as_str();
                let clause = strip_filler_words(trim_trailing_punctuation(clause));
                finalize_candidate(clause)
            })
        })
}

fn short_statement(ctx: &GoalContext<'_>) -> Option<String> {
    let text = ctx.assistant_messages().next_back()?.trim();
    let chars = text.chars().count();
    if !(SHORT_STATEMENT_MIN_CHARS..=SHORT_STATEMENT_MAX_CHARS).contains(&chars)
        || text.contains('?')
    {
        return None;
    }
    let without_ack = LEADING_ACKNOWLEDGEMENT.replace(text, "");
    finalize_candidate(trim_trailing_punctuation(&without_ack))
}

fn user_statement(ctx: &GoalContext<'_>) -> Option<String> {
    let reflection = ctx.reflection.trim();
    let text = ctx.user_messages().rev().map(str::trim).find(|text| {
        text.chars().count() >= MIN_USER_STATEMENT_CHARS
            && !ACKNOWLEDGEMENT_TOKENS
                .iter()
                .any(|ack| text.eq_ignore_ascii_case(ack))
            && *text != reflection
    })?;
    finalize_candidate(strip_intent_prefix(text))
}

/// Strips the longest matching first-person intent prefix.
fn strip_intent_prefix(text: &str) -> &str {
    for prefix in INTENT_PREFIXES {
        if text
            .get(..prefix.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
        {
            return &text[prefix.len()..];
        }
    }
    text
}

fn strip_filler_words(mut text: &str) -> &str {
    loop {
        text = text.trim_start();
        let stripped = FILLER_WORDS.iter().find_map(|word| {
            let head = text.get(..word.len())?;
            let rest = &text[word.len()..];
            (head.eq_ignore_ascii_case(word) && rest.starts_with(char::is_whitespace))
                .then_some(rest)
        });
        match stripped {
            Some(rest) => text = rest,
            None => return text,
        }
    }
}

fn trim_trailing_punctuation(text: &str) -> &str {
    text.trim()
        .trim_end_matches(|c: char| c.is_ascii_punctuation() || c.is_whitespace())
}

/// Trims, rejects unusably short text, capitalizes and caps length.
fn finalize_candidate(text: &str) -> Option<String> {
    let text = text.trim();
    if text.chars().count() < MIN_CANDIDATE_CHARS {
        return None;
    }
    Some(cap_goal(&capitalize(text)))
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Caps a goal at [`MAX_GOAL_CHARS`], ending truncated text with `...`.
pub fn cap_goal(text: &str) -> String {
    if text.chars().count() <= MAX_GOAL_CHARS {
        return text.to_string();
    }
    let mut capped: String = text.chars().take(MAX_GOAL_CHARS - 3).collect();
    capped.push_str("...");
    capped
}

/// Extracts up to three highlights from the first assistant reply.
pub fn extract_highlights(messages: &[ConversationMessage]) -> Vec<String> {
    let first = messages
        .iter()
        .find(|m| m.role == Role::Assistant)
        .map(|m| m.content.as_str())
        .unwrap_or_default();

    if is_substitute_reply(first) {
        return FALLBACK_HIGHLIGHTS.iter().map(|s| s.to_string()).collect();
    }

    let highlights: Vec<String> = first
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.contains('?'))
        .take(MAX_HIGHLIGHTS)
        .map(str::to_string)
        .collect();

    if highlights.is_empty() {
        DEFAULT_HIGHLIGHTS.iter().map(|s| s.to_string()).collect()
    } else {
        highlights
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn assistant(text: &str) -> ConversationMessage {
        ConversationMessage::assistant(text)
    }

    fn user(text: &str) -> ConversationMessage {
        ConversationMessage::user(text)
    }

    const FIRST_REPLY: &str =
        "You stayed for the whole dinner, which took real energy. Would you like to set a small goal for next time?";

    #[test]
    fn empty_conversation_yields_default_goal() {
        assert_eq!(extract_goal(&[], ""), DEFAULT_GOAL);
    }

    #[test]
    fn fallback_only_yields_defaults() {
        let messages = vec![
            assistant(FALLBACK_REPLY),
            user("I want to talk to two new people"),
            assistant(FALLBACK_REPLY),
        ];
        assert_eq!(extract_goal(&messages, "It was loud."), DEFAULT_GOAL);
        assert_eq!(extract_highlights(&messages), FALLBACK_HIGHLIGHTS.to_vec());
    }

    #[test]
    fn empty_text_reply_is_not_a_goal() {
        let messages = vec![
            assistant(EMPTY_REPLY),
            user("ok"),
            assistant(EMPTY_REPLY),
        ];
        assert_eq!(extract_goal(&messages, "It was fine."), DEFAULT_GOAL);
        assert_eq!(extract_highlights(&messages), FALLBACK_HIGHLIGHTS.to_vec());
    }

    #[test]
    fn stand_in_reply_after_real_one_is_skipped() {
        let messages = vec![
            assistant(FIRST_REPLY),
            user("Yes, something small please"),
            assistant("Arrive five minutes early and pick a seat."),
            user("Thanks"),
            assistant(EMPTY_REPLY),
        ];
        assert_eq!(
            extract_goal(&messages, ""),
            "Arrive five minutes early and pick a seat"
        );
    }

    #[test]
    fn tiny_assistant_text_short_circuits() {
        let messages = vec![assistant("Nice!"), user("I want to ask one question")];
        assert_eq!(extract_goal(&messages, ""), DEFAULT_GOAL);
    }

    #[test]
    fn assistant_suggestion_beats_later_user_statement() {
        let messages = vec![
            assistant(FIRST_REPLY),
            user("Yes please"),
            assistant("How about trying to introduce yourself first?"),
            user("I want to ask one question"),
        ];
        assert_eq!(extract_goal(&messages, ""), "Introduce yourself first");
    }

    #[test]
    fn most_recent_assistant_message_wins() {
        let messages = vec![
            assistant(FIRST_REPLY),
            user("Sure"),
            assistant("You could sit near the door at the start."),
            user("Hmm, that feels hard."),
            assistant("Maybe just say hello to the host when you arrive."),
        ];
        assert_eq!(
            extract_goal(&messages, ""),
            "Just say hello to the host when you arrive"
        );
    }

    #[test]
    fn pattern_order_within_a_message() {
        let messages = vec![assistant(
            "Maybe relax a little. So your goal is to ask one follow-up question!",
        )];
        assert_eq!(extract_goal(&messages, ""), "Ask one follow-up question");
    }

    #[test]
    fn your_goal_could_be_pattern() {
        let messages = vec![assistant(
            "That's a great start. Your goal for next time could be to stay ten minutes longer.",
        )];
        assert_eq!(extract_goal(&messages, ""), "Stay ten minutes longer");
    }

    #[test]
    fn leading_fillers_are_stripped_repeatedly() {
        let messages = vec![assistant(
            "It sounds like it went fine. Maybe you could try greeting one coworker.",
        )];
        assert_eq!(extract_goal(&messages, ""), "Try greeting one coworker");
    }

    #[test]
    fn short_suggestion_clause_falls_through() {
        // "Maybe not." yields a clause under the usable length.
        let messages = vec![
            assistant(FIRST_REPLY),
            user("I'd rather not set anything big"),
            assistant("Maybe not. Keeping it low-key is completely fine."),
        ];
        assert_eq!(
            extract_goal(&messages, ""),
            "Maybe not. Keeping it low-key is completely fine"
        );
    }

    #[test]
    fn short_statement_strips_acknowledgements() {
        let messages = vec![
            assistant(FIRST_REPLY),
            user("Yes, something small please"),
            assistant("Great! Perfect, arrive five minutes early and pick a seat."),
        ];
        assert_eq!(
            extract_goal(&messages, ""),
            "Arrive five minutes early and pick a seat"
        );
    }

    #[test]
    fn questions_are_not_short_statements() {
        let messages = vec![
            assistant(FIRST_REPLY),
            user("I will bring a friend along next time"),
            assistant("Does that feel doable for you?"),
        ];
        assert_eq!(extract_goal(&messages, ""), "Bring a friend along next time");
    }

    #[test]
    fn user_statement_uses_longest_prefix() {
        let messages = vec![
            assistant(FIRST_REPLY),
            user("next time i want to ask about their weekend"),
            assistant("That sounds like a lovely plan, and very doable for you to try out. Is there anything else?"),
        ];
        assert_eq!(extract_goal(&messages, ""), "Ask about their weekend");
    }

    #[test]
    fn acknowledgements_and_short_user_messages_are_skipped() {
        let messages = vec![
            assistant(FIRST_REPLY),
            user("I plan to stay for one more round of drinks"),
            assistant("What would make that easier?"),
            user("ok"),
            assistant("Does that sound okay to you?"),
            user("not sure"),
        ];
        assert_eq!(
            extract_goal(&messages, ""),
            "Stay for one more round of drinks"
        );
    }

    #[test]
    fn user_message_repeating_reflection_is_skipped() {
        let body = "The party was overwhelming but fine";
        let messages = vec![
            assistant(FIRST_REPLY),
            user("i'll say goodbye before leaving"),
            assistant("Would that feel comfortable?"),
            user(body),
        ];
        assert_eq!(extract_goal(&messages, body), "Say goodbye before leaving");
    }

    #[test]
    fn long_goal_is_capped_with_ellipsis() {
        let long = format!("I want to {}", "practice small talk ".repeat(10));
        let messages = vec![assistant(FIRST_REPLY), user(&long)];
        let goal = extract_goal(&messages, "");
        assert_eq!(goal.chars().count(), MAX_GOAL_CHARS);
        assert!(goal.ends_with("..."));
        assert!(goal.starts_with("Practice small talk"));
    }

    #[test]
    fn cap_goal_handles_multibyte_text() {
        let text = "é".repeat(130);
        let capped = cap_goal(&text);
        assert_eq!(capped.chars().count(), 120);
        assert_eq!(cap_goal("short"), "short");
    }

    #[test]
    fn intent_prefixes_are_sorted_longest_first() {
        for pair in INTENT_PREFIXES.windows(2) {
            assert!(pair[0].len() >= pair[1].len(), "{pair:?}");
        }
    }

    #[test]
    fn highlights_drop_questions_and_blank_lines() {
        let messages = vec![assistant(
            "You spoke up in the meeting.\n\nYou asked for help when needed.\nWant to set a goal?\nYou stayed calm.\nYou left on time.",
        )];
        assert_eq!(
            extract_highlights(&messages),
            vec![
                "You spoke up in the meeting.",
                "You asked for help when needed.",
                "You stayed calm.",
            ]
        );
    }

    #[test]
    fn highlights_default_when_only_questions() {
        let messages = vec![assistant("How did that feel? Would you like a goal?")];
        assert_eq!(extract_highlights(&messages), DEFAULT_HIGHLIGHTS.to_vec());
        assert_eq!(extract_highlights(&[]), DEFAULT_HIGHLIGHTS.to_vec());
    }

    #[test]
    fn highlights_use_first_assistant_message_only() {
        let messages = vec![
            user("hello"),
            assistant("You went even though you were tired."),
            assistant("Another line.\nAnd another."),
        ];
        assert_eq!(
            extract_highlights(&messages),
            vec!["You went even though you were tired."]
        );
    }

    fn arb_message() -> impl Strategy<Value = ConversationMessage> {
        let text = prop_oneof![
            Just(FALLBACK_REPLY.to_string()),
            Just(EMPTY_REPLY.to_string()),
            Just("ok".to_string()),
            "\\PC{0,200}",
            "(maybe|you could|how about|i want to|so your goal is) [a-z ]{0,160}[.?!]?",
        ];
        (any::<bool>(), text).prop_map(|(is_user, text)| {
            if is_user {
                ConversationMessage::user(text)
            } else {
                ConversationMessage::assistant(text)
            }
        })
    }

    proptest! {
        #[test]
        fn goal_extraction_is_total(
            messages in prop::collection::vec(arb_message(), 0..8),
            reflection in "\\PC{0,80}",
        ) {
            let goal = extract_goal(&messages, &reflection);
            prop_assert!(!goal.trim().is_empty());
            prop_assert!(goal.chars().count() <= MAX_GOAL_CHARS);
        }

        #[test]
        fn highlights_are_bounded(messages in prop::collection::vec(arb_message(), 0..6)) {
            let highlights = extract_highlights(&messages);
            prop_assert!(!highlights.is_empty());
            prop_assert!(highlights.len() <= 3);
            prop_assert!(highlights.iter().all(|h| !h.contains('?')));
        }
    }
}
