// SPDX-FileCopyrightText: 2026 Wabi Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and lifecycle.
//!
//! All writes are serialized through tokio-rusqlite's single background thread.
//! Do NOT create additional Connection instances for writes.

use std::path::Path;

use tokio_rusqlite::Connection;
use tracing::debug;
use wabi_core::error::WabiError;

/// Schema for the collection documents. Idempotent.
const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS collections (
    name TEXT PRIMARY KEY NOT NULL,
    payload TEXT NOT NULL,
    updated_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
);
";

/// Wraps the single `tokio_rusqlite::Connection` every query goes through.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Opens (creating if needed) the database file and applies the schema.
    pub async fn open(path: &str, wal_mode: bool) -> Result<Self, WabiError> {
        match Path::new(path).parent() {
            Some(parent) if !parent.as_os_str().is_empty() => {
                std::fs::create_dir_all(parent).map_err(storage_err)?;
            }
            _ => {}
        }

        let conn = Connection::open(path).await.map_err(storage_err)?;
        let db = Self::prepare(conn, wal_mode).await?;
        debug!(path, wal_mode, "database opened");
        Ok(db)
    }

    /// Opens a private in-memory database with the schema applied.
    pub async fn open_in_memory() -> Result<Self, WabiError> {
        let conn = Connection::open_in_memory().await.map_err(storage_err)?;
        Self::prepare(conn, false).await
    }

    async fn prepare(conn: Connection, wal_mode: bool) -> Result<Self, WabiError> {
        conn.call(move |conn| -> Result<(), rusqlite::Error> {
            if wal_mode {
                conn.execute_batch("PRAGMA journal_mode = WAL;")?;
            }
            conn.execute_batch(
                "PRAGMA synchronous = NORMAL;
                 PRAGMA busy_timeout = 5000;",
            )?;
            conn.execute_batch(SCHEMA)?;
            Ok(())
        })
        .await
        .map_err(storage_err)?;
        Ok(Self { conn })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Truncates the write-ahead log into the main database file.
    pub async fn checkpoint(&self) -> Result<(), WabiError> {
        self.conn
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
                Ok(())
            })
            .await
            .map_err(storage_err)
    }
}

/// Converts any backend error into [`WabiError::Storage`].
pub(crate) fn storage_err<E>(e: E) -> WabiError
where
    E: std::error::Error + Send + Sync + 'static,
{
    WabiError::Storage {
        source: Box::new(e),
    }
}
