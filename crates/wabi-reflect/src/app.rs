// SPDX-FileCopyrightText: 2026 Wabi Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Application coordinator.
//!
//! [`AppState`] owns the three record collections and is the only place
//! they change. Every mutation rewrites the affected collections through the
//! [`RecordStore`] after the in-memory transition completes.

use std::sync::Arc;

use chrono::{DateTime, Days, Local, NaiveDate, NaiveTime};
use tracing::{debug, info};
use wabi_core::error::WabiError;
use wabi_core::traits::{AssistantAdapter, RecordStore};
use wabi_core::types::{Event, EventCategory, EventId, RecordSet, Reflection, ReflectionId};

use crate::builder::ReflectionOutcome;
use crate::session::{ReflectionSession, ReflectionTarget, SessionSettings};
use crate::stats::{self, Stats};

/// How far back an unreflected event still counts as "coming up".
const NEXT_EVENT_LOOKBACK_DAYS: u64 = 7;

/// Raw event form input. Date and time are validated on submit.
#[derive(Debug, Clone, Default)]
pub struct EventDraft {
    pub name: String,
    /// `YYYY-MM-DD`.
    pub date: String,
    /// `HH:MM` or `H:MM AM`.
    pub time: String,
    pub category: EventCategory,
    pub location: Option<String>,
    pub goal: Option<String>,
}

/// What to reflect on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReflectOn {
    Event(EventId),
    Name(String),
}

/// Owns the in-memory record set and persists every change.
pub struct AppState {
    store: Arc<dyn RecordStore>,
    records: RecordSet,
}

impl AppState {
    /// Loads all collections from the store. Missing collections load empty.
    pub async fn load(store: Arc<dyn RecordStore>) -> Result<Self, WabiError> {
        let records = store.load().await?;
        info!(
            events = records.events.len(),
            reflections = records.reflections.len(),
            completed = records.completed_event_ids.len(),
            "records loaded"
        );
        Ok(Self { store, records })
    }

    pub fn events(&self) -> &[Event] {
        &self.records.events
    }

    /// Reflections, newest first.
    pub fn reflections(&self) -> &[Reflection] {
        &self.records.reflections
    }

    pub fn completed_event_ids(&self) -> &[EventId] {
        &self.records.completed_event_ids
    }

    pub fn is_completed(&self, id: EventId) -> bool {
        self.records.completed_event_ids.contains(&id)
    }

    pub fn event(&self, id: EventId) -> Result<&Event, WabiError> {
        self.records
            .events
            .iter()
            .find(|e| e.id == id)
            .ok_or_else(|| WabiError::NotFound {
                kind: "event",
                id: id.to_string(),
            })
    }

    /// Validates the draft, appends the event and rewrites the events collection.
    pub async fn add_event(&mut self, draft: EventDraft) -> Result<&Event, WabiError> {
        let event = self.validate_event(draft)?;
        debug!(event_id = %event.id, name = %event.name, "event added");
        self.records.events.push(event);
        self.store.save_events(&self.records.events).await?;
        let added = self.records.events.len() - 1;
        Ok(&self.records.events[added])
    }

    fn validate_event(&self, draft: EventDraft) -> Result<Event, WabiError> {
        let name = draft.name.trim();
        let (date, time) = (draft.date.trim(), draft.time.trim());
        if name.is_empty() || date.is_empty() || time.is_empty() {
            return Err(WabiError::Validation("Please fill in required fields".into()));
        }

        let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").map_err(|_| {
            WabiError::Validation(format!("invalid date `{date}`, expected YYYY-MM-DD"))
        })?;
        let time = NaiveTime::parse_from_str(time, "%H:%M")
            .or_else(|_| NaiveTime::parse_from_str(time, "%I:%M %p"))
            .map_err(|_| {
                WabiError::Validation(format!("invalid time `{time}`, expected HH:MM"))
            })?;

        let id = self
            .records
            .events
            .iter()
            .map(|e| e.id.0)
            .max()
            .map_or(EventId(1), |max| EventId(max + 1));

        Ok(Event {
            id,
            name: name.to_string(),
            date,
            time,
            category: draft.category,
            location: non_blank(draft.location),
            goal: non_blank(draft.goal),
            type_color: draft.category.color().to_string(),
        })
    }

    /// First event, in insertion order, dated within the last week or later
    /// that has not been reflected on yet.
    pub fn next_event(&self, today: NaiveDate) -> Option<&Event> {
        let cutoff = today
            .checked_sub_days(Days::new(NEXT_EVENT_LOOKBACK_DAYS))
            .unwrap_or(NaiveDate::MIN);
        self.records
            .events
            .iter()
            .find(|e| e.date >= cutoff && !self.is_completed(e.id))
    }

    /// Starts a conversation session about an event or a freestanding name.
    pub fn begin_reflection(
        &self,
        on: ReflectOn,
        assistant: Arc<dyn AssistantAdapter>,
        settings: SessionSettings,
    ) -> Result<ReflectionSession, WabiError> {
        let target = match on {
            ReflectOn::Event(id) => {
                let event = self.event(id)?;
                ReflectionTarget::event(event.id, event.name.clone())
            }
            ReflectOn::Name(name) => {
                let name = name.trim();
                if name.is_empty() {
                    return Err(WabiError::Validation("Please name what you are reflecting on".into()));
                }
                ReflectionTarget::freestanding(name)
            }
        };
        Ok(ReflectionSession::new(target, assistant, settings))
    }

    pub fn next_reflection_id(&self) -> ReflectionId {
        self.records
            .reflections
            .iter()
            .map(|r| r.id.0)
            .max()
            .map_or(ReflectionId(1), |max| ReflectionId(max + 1))
    }

    /// Saves the session under the next id and commits the outcome.
    pub async fn finish(
        &mut self,
        session: &mut ReflectionSession,
        now: DateTime<Local>,
    ) -> Result<&Reflection, WabiError> {
        let outcome = session.save(self.next_reflection_id(), now)?;
        self.commit(outcome).await
    }

    /// Prepends the reflection and marks its event completed (once).
    pub async fn commit(&mut self, outcome: ReflectionOutcome) -> Result<&Reflection, WabiError> {
        let ReflectionOutcome {
            reflection,
            completed_event,
        } = outcome;

        let reflection_id = reflection.id;
        self.records.reflections.insert(0, reflection);

        let newly_completed = completed_event.filter(|id| !self.is_completed(*id));
        if let Some(id) = newly_completed {
            self.records.completed_event_ids.push(id);
        }

        self.store.save_reflections(&self.records.reflections).await?;
        if newly_completed.is_some() {
            self.store
                .save_completed(&self.records.completed_event_ids)
                .await?;
        }

        info!(
            reflection_id = %reflection_id,
            completed_event = ?completed_event.map(|id| id.0),
            "reflection committed"
        );
        Ok(&self.records.reflections[0])
    }

    /// Looks up a reflection. A missing id is a not-found error, never fatal.
    pub fn reflection(&self, id: ReflectionId) -> Result<&Reflection, WabiError> {
        self.records
            .reflections
            .iter()
            .find(|r| r.id == id)
            .ok_or_else(|| WabiError::NotFound {
                kind: "reflection",
                id: id.to_string(),
            })
    }

    pub fn stats(&self, today: NaiveDate) -> Stats {
        stats::compute_stats(&self.records.reflections, today)
    }
}

/// `Today`, or an abbreviated month and day such as `Jun 3`.
pub fn format_event_date(date: NaiveDate, today: NaiveDate) -> String {
    if date == today {
        "Today".to_string()
    } else {
        date.format("%b %-d").to_string()
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use wabi_test_utils::{MemoryStore, MockAssistant};

    use crate::emotion::EmotionTag;
    use crate::session::Pacing;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn draft(name: &str, date: &str) -> EventDraft {
        EventDraft {
            name: name.into(),
            date: date.into(),
            time: "12:00".into(),
            ..EventDraft::default()
        }
    }

    fn quiet_settings() -> SessionSettings {
        SessionSettings {
            pacing: Pacing::disabled(),
            ..SessionSettings::default()
        }
    }

    async fn app(store: &MemoryStore) -> AppState {
        AppState::load(Arc::new(store.clone())).await.unwrap()
    }

    #[tokio::test]
    async fn empty_store_loads_empty_state() {
        let store = MemoryStore::new();
        let state = app(&store).await;
        assert!(state.events().is_empty());
        assert!(state.reflections().is_empty());
        assert!(state.completed_event_ids().is_empty());
        assert_eq!(state.next_reflection_id(), ReflectionId(1));
    }

    #[tokio::test]
    async fn add_event_assigns_ids_and_colors() {
        let store = MemoryStore::new();
        let mut state = app(&store).await;

        let first = state
            .add_event(EventDraft {
                category: EventCategory::Networking,
                location: Some("  ".into()),
                goal: Some(" Ask one question ".into()),
                ..draft("Startup Mixer", "2026-06-03")
            })
            .await
            .unwrap()
            .clone();
        assert_eq!(first.id, EventId(1));
        assert_eq!(first.type_color, "bg-emerald-100 text-emerald-600");
        assert_eq!(first.location, None);
        assert_eq!(first.goal.as_deref(), Some("Ask one question"));

        let second = state.add_event(draft("Lunch", "2026-06-04")).await.unwrap();
        assert_eq!(second.id, EventId(2));
        assert_eq!(second.category, EventCategory::Social);

        assert_eq!(store.snapshot().await.events.len(), 2);
        assert_eq!(store.write_counts(), (2, 0, 0));
    }

    #[tokio::test]
    async fn add_event_validates_required_fields() {
        let store = MemoryStore::new();
        let mut state = app(&store).await;

        for bad in [
            draft("", "2026-06-03"),
            draft("Lunch", ""),
            EventDraft {
                time: " ".into(),
                ..draft("Lunch", "2026-06-03")
            },
            draft("Lunch", "06/03/2026"),
        ] {
            let err = state.add_event(bad).await.unwrap_err();
            assert!(err.is_validation(), "{err}");
        }
        assert!(state.events().is_empty());
        assert_eq!(store.write_counts(), (0, 0, 0));
    }

    #[tokio::test]
    async fn twelve_hour_time_is_accepted() {
        let store = MemoryStore::new();
        let mut state = app(&store).await;
        let event = state
            .add_event(EventDraft {
                time: "7:30 PM".into(),
                ..draft("Book club", "2026-06-03")
            })
            .await
            .unwrap();
        assert_eq!(event.time, NaiveTime::from_hms_opt(19, 30, 0).unwrap());
    }

    #[tokio::test]
    async fn next_event_skips_old_and_completed() {
        let store = MemoryStore::new();
        let mut state = app(&store).await;
        let today = day(2026, 6, 10);

        state.add_event(draft("Long ago", "2026-06-01")).await.unwrap();
        state.add_event(draft("Last week", "2026-06-03")).await.unwrap();
        state.add_event(draft("Tomorrow", "2026-06-11")).await.unwrap();

        assert_eq!(state.next_event(today).unwrap().name, "Last week");

        state.records.completed_event_ids.push(EventId(2));
        assert_eq!(state.next_event(today).unwrap().name, "Tomorrow");

        state.records.completed_event_ids.push(EventId(3));
        assert!(state.next_event(today).is_none());
    }

    #[tokio::test]
    async fn reflecting_on_event_marks_exactly_that_event() {
        let store = MemoryStore::new();
        let mut state = app(&store).await;
        state.add_event(draft("Team Lunch", "2026-06-03")).await.unwrap();
        state.add_event(draft("Standup", "2026-06-04")).await.unwrap();
        let events_before = state.events().to_vec();

        let mock = MockAssistant::with_replies(["You joined the table."]);
        let mut session = state
            .begin_reflection(ReflectOn::Event(EventId(2)), Arc::new(mock), quiet_settings())
            .unwrap();
        assert_eq!(session.target().event_name, "Standup");
        session
            .submit("I said good morning.", Some(EmotionTag::Positive))
            .await
            .unwrap();

        let now = Local.with_ymd_and_hms(2026, 6, 4, 18, 0, 0).unwrap();
        let saved = state.finish(&mut session, now).await.unwrap().clone();
        assert_eq!(saved.id, ReflectionId(1));
        assert_eq!(saved.event_id, Some(EventId(2)));

        assert_eq!(state.completed_event_ids(), &[EventId(2)]);
        assert_eq!(state.events(), events_before.as_slice());
        assert!(!state.is_completed(EventId(1)));

        let persisted = store.snapshot().await;
        assert_eq!(persisted.reflections.len(), 1);
        assert_eq!(persisted.completed_event_ids, vec![EventId(2)]);
        assert_eq!(store.write_counts(), (2, 1, 1));
    }

    #[tokio::test]
    async fn reflections_are_prepended_and_completion_is_idempotent() {
        let store = MemoryStore::new();
        let mut state = app(&store).await;
        state.add_event(draft("Team Lunch", "2026-06-03")).await.unwrap();
        let now = Local.with_ymd_and_hms(2026, 6, 4, 18, 0, 0).unwrap();

        for _ in 0..2 {
            let mock = MockAssistant::with_replies(["Nice."]);
            let mut session = state
                .begin_reflection(ReflectOn::Event(EventId(1)), Arc::new(mock), quiet_settings())
                .unwrap();
            session.submit("Body", Some(EmotionTag::Neutral)).await.unwrap();
            state.finish(&mut session, now).await.unwrap();
        }

        let ids: Vec<_> = state.reflections().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![ReflectionId(2), ReflectionId(1)]);
        assert_eq!(state.completed_event_ids(), &[EventId(1)]);
        assert_eq!(store.write_counts(), (1, 2, 1));
    }

    #[tokio::test]
    async fn freestanding_reflection_needs_a_name() {
        let store = MemoryStore::new();
        let state = app(&store).await;
        let mock: Arc<dyn AssistantAdapter> = Arc::new(MockAssistant::new());

        let err = state
            .begin_reflection(ReflectOn::Name("  ".into()), mock.clone(), quiet_settings())
            .err()
            .unwrap();
        assert!(err.is_validation());

        let err = state
            .begin_reflection(ReflectOn::Event(EventId(42)), mock.clone(), quiet_settings())
            .err()
            .unwrap();
        assert_eq!(err.to_string(), "event 42 not found");

        let session = state
            .begin_reflection(ReflectOn::Name("Coffee chat".into()), mock, quiet_settings())
            .unwrap();
        assert_eq!(session.target().event_id, None);
    }

    #[tokio::test]
    async fn missing_reflection_is_not_found() {
        let store = MemoryStore::new();
        let state = app(&store).await;
        let err = state.reflection(ReflectionId(5)).unwrap_err();
        assert!(matches!(err, WabiError::NotFound { kind: "reflection", .. }));
    }

    #[test]
    fn formats_event_dates() {
        let today = day(2026, 6, 3);
        assert_eq!(format_event_date(today, today), "Today");
        assert_eq!(format_event_date(day(2026, 6, 4), today), "Jun 4");
        assert_eq!(format_event_date(day(2025, 12, 25), today), "Dec 25");
    }
}
