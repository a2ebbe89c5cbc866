// SPDX-FileCopyrightText: 2026 Wabi Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `wabi event add` command implementation.

use colored::Colorize;
use wabi_core::error::WabiError;
use wabi_reflect::{AppState, EventDraft};

use crate::views;

/// Logs a new event and echoes it back.
pub async fn add(app: &mut AppState, draft: EventDraft) -> Result<(), WabiError> {
    let event = app.add_event(draft).await?;
    println!(
        "{} #{} {} on {} at {}",
        "added".green(),
        event.id,
        event.name.bold(),
        event.date.format("%b %-d"),
        views::clock(event.time),
    );
    Ok(())
}
