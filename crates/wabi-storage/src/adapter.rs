// SPDX-FileCopyrightText: 2026 Wabi Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the RecordStore trait.

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::debug;

use wabi_config::model::StorageConfig;
use wabi_core::error::WabiError;
use wabi_core::traits::{PluginAdapter, RecordStore};
use wabi_core::types::{AdapterType, Event, EventId, HealthStatus, RecordSet, Reflection};

use crate::collections::{self, COMPLETED, EVENTS, REFLECTIONS};
use crate::database::{Database, storage_err};

/// SQLite-backed record store.
///
/// Wraps a [`Database`] handle and keeps each collection as one JSON
/// document. The database is lazily opened on the first call to
/// [`RecordStore::initialize`].
pub struct SqliteStore {
    config: StorageConfig,
    db: OnceCell<Database>,
}

impl SqliteStore {
    /// Create a new SqliteStore with the given configuration.
    ///
    /// The database connection is not opened until [`initialize`] is called.
    ///
    /// [`initialize`]: RecordStore::initialize
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
        }
    }

    /// Returns the underlying Database, or an error if not initialized.
    fn db(&self) -> Result<&Database, WabiError> {
        self.db.get().ok_or_else(|| WabiError::Storage {
            source: "storage not initialized -- call initialize() first".into(),
        })
    }
}

#[async_trait]
impl PluginAdapter for SqliteStore {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, WabiError> {
        self.db()?
            .connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("SELECT 1;")?;
                Ok(())
            })
            .await
            .map_err(storage_err)?;
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), WabiError> {
        if let Some(db) = self.db.get() {
            db.checkpoint().await?;
            debug!("shutdown: WAL checkpoint complete");
        }
        Ok(())
    }
}

#[async_trait]
impl RecordStore for SqliteStore {
    async fn initialize(&self) -> Result<(), WabiError> {
        let db = Database::open(&self.config.database_path, self.config.wal_mode).await?;
        self.db.set(db).map_err(|_| WabiError::Storage {
            source: "storage already initialized".into(),
        })?;
        debug!(path = %self.config.database_path, "SQLite storage initialized");
        Ok(())
    }

    async fn load(&self) -> Result<RecordSet, WabiError> {
        let db = self.db()?;
        Ok(RecordSet {
            events: collections::read(db, EVENTS).await?,
            reflections: collections::read(db, REFLECTIONS).await?,
            completed_event_ids: collections::read(db, COMPLETED).await?,
        })
    }

    async fn save_events(&self, events: &[Event]) -> Result<(), WabiError> {
        collections::write(self.db()?, EVENTS, events).await
    }

    async fn save_reflections(&self, reflections: &[Reflection]) -> Result<(), WabiError> {
        collections::write(self.db()?, REFLECTIONS, reflections).await
    }

    async fn save_completed(&self, ids: &[EventId]) -> Result<(), WabiError> {
        collections::write(self.db()?, COMPLETED, ids).await
    }

    async fn close(&self) -> Result<(), WabiError> {
        self.db()?.checkpoint().await?;
        debug!("WAL checkpoint complete");
        Ok(())
    }
}
