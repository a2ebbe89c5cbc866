// SPDX-FileCopyrightText: 2026 Wabi Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory record store.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use wabi_core::traits::{PluginAdapter, RecordStore};
use wabi_core::types::{AdapterType, Event, EventId, HealthStatus, RecordSet, Reflection};
use wabi_core::WabiError;

/// A [`RecordStore`] holding its collections in memory.
///
/// Counts whole-collection writes so tests can assert which collections a
/// transition rewrote.
#[derive(Clone, Default)]
pub struct MemoryStore {
    records: Arc<Mutex<RecordSet>>,
    event_writes: Arc<AtomicUsize>,
    reflection_writes: Arc<AtomicUsize>,
    completed_writes: Arc<AtomicUsize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with `records`.
    pub fn with_records(records: RecordSet) -> Self {
        Self {
            records: Arc::new(Mutex::new(records)),
            ..Self::default()
        }
    }

    /// Current persisted contents.
    pub async fn snapshot(&self) -> RecordSet {
        self.records.lock().await.clone()
    }

    /// Number of writes per collection: (events, reflections, completed).
    pub fn write_counts(&self) -> (usize, usize, usize) {
        (
            self.event_writes.load(Ordering::SeqCst),
            self.reflection_writes.load(Ordering::SeqCst),
            self.completed_writes.load(Ordering::SeqCst),
        )
    }
}

#[async_trait]
impl PluginAdapter for MemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, WabiError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), WabiError> {
        Ok(())
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn initialize(&self) -> Result<(), WabiError> {
        Ok(())
    }

    async fn load(&self) -> Result<RecordSet, WabiError> {
        Ok(self.snapshot().await)
    }

    async fn save_events(&self, events: &[Event]) -> Result<(), WabiError> {
        self.records.lock().await.events = events.to_vec();
        self.event_writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn save_reflections(&self, reflections: &[Reflection]) -> Result<(), WabiError> {
        self.records.lock().await.reflections = reflections.to_vec();
        self.reflection_writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn save_completed(&self, ids: &[EventId]) -> Result<(), WabiError> {
        self.records.lock().await.completed_event_ids = ids.to_vec();
        self.completed_writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn close(&self) -> Result<(), WabiError> {
        Ok(())
    }
}
