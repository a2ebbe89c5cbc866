// SPDX-FileCopyrightText: 2026 Wabi Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Derived statistics over the reflection set.
//!
//! Nothing here is persisted; every value is recomputed from the records.

use std::collections::HashSet;

use chrono::NaiveDate;
use wabi_core::types::Reflection;

/// Summary shown on the stats screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Stats {
    /// One per saved reflection.
    pub goals_completed: usize,
    /// Distinct events referenced by reflections.
    pub events_attended: usize,
    /// Consecutive days with a reflection, counting back from today.
    pub streak: u32,
}

pub fn compute_stats(reflections: &[Reflection], today: NaiveDate) -> Stats {
    let events_attended = reflections
        .iter()
        .filter_map(|r| r.event_id)
        .collect::<HashSet<_>>()
        .len();

    Stats {
        goals_completed: reflections.len(),
        events_attended,
        streak: streak(reflections.iter().map(|r| r.date), today),
    }
}

/// Walks dates newest first. A date exactly `counter` days back extends the
/// streak; an older one ends it; a newer one (same-day duplicate or future
/// date) is skipped.
pub fn streak(dates: impl IntoIterator<Item = NaiveDate>, today: NaiveDate) -> u32 {
    let mut dates: Vec<NaiveDate> = dates.into_iter().collect();
    dates.sort_unstable_by(|a, b| b.cmp(a));

    let mut counter: u32 = 0;
    for date in dates {
        let gap = (today - date).num_days();
        if gap == i64::from(counter) {
            counter += 1;
        } else if gap > i64::from(counter) {
            break;
        }
    }
    counter
}
