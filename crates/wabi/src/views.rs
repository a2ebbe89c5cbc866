// SPDX-FileCopyrightText: 2026 Wabi Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Plain-text renderings of the record views.
//!
//! Every function returns the finished text so commands only print it.

use std::fmt::Write;

use chrono::{NaiveDate, NaiveTime};
use colored::Colorize;
use wabi_core::types::{Event, Reflection, ReflectionId};
use wabi_reflect::{AppState, Stats, format_event_date};

/// `12:00 PM` style clock.
pub fn clock(time: NaiveTime) -> String {
    time.format("%-I:%M %p").to_string()
}

/// All events in insertion order with their completion mark.
pub fn events(app: &AppState, today: NaiveDate) -> String {
    let mut out = String::new();
    if app.events().is_empty() {
        let _ = writeln!(out, "No events yet. Log one with `wabi event add`.");
        return out;
    }

    let _ = writeln!(out, "{}", "Events".bold());
    for event in app.events() {
        let mark = if app.is_completed(event.id) {
            " ✓ reflected".green().to_string()
        } else {
            String::new()
        };
        let _ = writeln!(out, "{}{mark}", event_line(event, today));
    }
    out
}

fn event_line(event: &Event, today: NaiveDate) -> String {
    let mut line = format!(
        "[{}] #{} {} {} · {}",
        event.category.initial(),
        event.id,
        event.name.bold(),
        format_event_date(event.date, today),
        clock(event.time),
    );
    if let Some(location) = &event.location {
        let _ = write!(line, " @ {location}");
    }
    line
}

/// "Coming Up Next" card followed by the reflection list.
pub fn home(app: &AppState, today: NaiveDate) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "{}", "Coming Up Next".bold());
    match app.next_event(today) {
        Some(event) => {
            let _ = writeln!(out, "  {}", event_line(event, today));
            if let Some(goal) = &event.goal {
                let _ = writeln!(out, "  Goal: {goal}");
            }
            let _ = writeln!(
                out,
                "  {}",
                format!("Reflect with `wabi reflect --event {}`", event.id).dimmed()
            );
        }
        None => {
            let _ = writeln!(out, "  Nothing coming up. Log an event with `wabi event add`.");
        }
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "{}", "Your Reflections".bold());
    if app.reflections().is_empty() {
        let _ = writeln!(out, "  No reflections yet.");
    }
    for reflection in app.reflections() {
        let _ = writeln!(
            out,
            "  #{} {} {} · {}",
            reflection.id,
            reflection.emotion,
            reflection.event_name.bold(),
            format_event_date(reflection.date, today),
        );
        let _ = writeln!(out, "     {}", reflection.snippet.dimmed());
    }
    out
}

/// Full detail view, or a placeholder for an unknown id.
pub fn reflection(app: &AppState, id: ReflectionId, today: NaiveDate) -> String {
    match app.reflection(id) {
        Ok(reflection) => reflection_detail(reflection, today),
        Err(_) => "Reflection not found\n".to_string(),
    }
}

fn reflection_detail(reflection: &Reflection, today: NaiveDate) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} · {}",
        reflection.event_name.bold(),
        format_event_date(reflection.date, today)
    );
    let _ = writeln!(out, "{} {}", reflection.emotion, reflection.comfort_level);
    let _ = writeln!(out);
    let _ = writeln!(out, "{}", "Your reflection".bold());
    let _ = writeln!(out, "  {}", reflection.full_reflection);
    let _ = writeln!(out);
    let _ = writeln!(out, "{}", "Highlights".bold());
    for highlight in &reflection.highlights {
        let _ = writeln!(out, "  • {highlight}");
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "{}", "Goal for next time".bold());
    let _ = writeln!(out, "  {}", reflection.goal_for_next.green());
    out
}

pub fn stats(stats: &Stats) -> String {
    let days = if stats.streak == 1 { "day" } else { "days" };
    format!(
        "{}\n  Goals completed: {}\n  Events attended: {}\n  Current streak:  {} {days}\n",
        "Your Progress".bold(),
        stats.goals_completed,
        stats.events_attended,
        stats.streak,
    )
}
