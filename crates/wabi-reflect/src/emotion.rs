// SPDX-FileCopyrightText: 2026 Wabi Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Emotion tags and their display classification.
//!
//! The mapping is a pure function of the tag. Parsing from user input never
//! fails: anything unrecognized is treated as neutral.

use std::fmt;

/// How the user felt about an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EmotionTag {
    Negative,
    Neutral,
    Positive,
}

/// Display classes and label derived from an [`EmotionTag`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmotionStyle {
    pub background: &'static str,
    pub border: &'static str,
    pub label: &'static str,
}

impl EmotionTag {
    /// All tags in picker order.
    pub const ALL: [EmotionTag; 3] = [EmotionTag::Negative, EmotionTag::Neutral, EmotionTag::Positive];

    pub fn emoji(self) -> &'static str {
        match self {
            EmotionTag::Negative => "😔",
            EmotionTag::Neutral => "😐",
            EmotionTag::Positive => "🙂",
        }
    }

    /// Comfort-level label stored on reflections.
    pub fn label(self) -> &'static str {
        self.classify().label
    }

    pub fn classify(self) -> EmotionStyle {
        match self {
            EmotionTag::Negative => EmotionStyle {
                background: "bg-red-100",
                border: "border-red-300",
                label: "Uncomfortable",
            },
            EmotionTag::Neutral => EmotionStyle {
                background: "bg-gray-100",
                border: "border-gray-300",
                label: "Neutral",
            },
            EmotionTag::Positive => EmotionStyle {
                background: "bg-green-100",
                border: "border-green-300",
                label: "Comfortable",
            },
        }
    }

    /// Parses an emoji, tag name, label, or picker index (`1`..`3`).
    ///
    /// Unknown input maps to [`EmotionTag::Neutral`].
    pub fn from_symbol(input: &str) -> EmotionTag {
        Self::parse(input).unwrap_or(EmotionTag::Neutral)
    }

    /// Strict variant of [`EmotionTag::from_symbol`] for interactive prompts
    /// that want to re-ask instead of defaulting.
    pub fn parse(input: &str) -> Option<EmotionTag> {
        let trimmed = input.trim();
        let lowered = trimmed.to_lowercase();
        match lowered.as_str() {
            "😔" | "1" | "negative" | "uncomfortable" => Some(EmotionTag::Negative),
            "😐" | "2" | "neutral" => Some(EmotionTag::Neutral),
            "🙂" | "3" | "positive" | "comfortable" => Some(EmotionTag::Positive),
            _ => None,
        }
    }
}

impl fmt::Display for EmotionTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.emoji(), self.label())
    }
}
