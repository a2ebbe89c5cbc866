// SPDX-FileCopyrightText: 2026 Wabi Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Record store trait for the persisted event/reflection collections.

use async_trait::async_trait;

use crate::error::WabiError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{Event, EventId, RecordSet, Reflection};

/// Persistence for the three named collections.
///
/// Collections are read once at startup and rewritten in full on every
/// mutation. A collection that was never written loads as empty.
#[async_trait]
pub trait RecordStore: PluginAdapter {
    /// Initializes the backend (open connection, create schema).
    async fn initialize(&self) -> Result<(), WabiError>;

    /// Loads all three collections.
    async fn load(&self) -> Result<RecordSet, WabiError>;

    /// Replaces the events collection.
    async fn save_events(&self, events: &[Event]) -> Result<(), WabiError>;

    /// Replaces the reflections collection.
    async fn save_reflections(&self, reflections: &[Reflection]) -> Result<(), WabiError>;

    /// Replaces the completed-event id set.
    async fn save_completed(&self, ids: &[EventId]) -> Result<(), WabiError>;

    /// Closes the backend, flushing pending writes.
    async fn close(&self) -> Result<(), WabiError>;
}
