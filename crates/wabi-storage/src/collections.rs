// SPDX-FileCopyrightText: 2026 Wabi Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Named JSON document operations.
//!
//! Each collection is one row; a write replaces the whole document.

use rusqlite::params;
use serde::Serialize;
use serde::de::DeserializeOwned;
use wabi_core::error::WabiError;

use crate::database::{Database, storage_err};

pub const EVENTS: &str = "wabi_events";
pub const REFLECTIONS: &str = "wabi_reflections";
pub const COMPLETED: &str = "wabi_completed";

/// Reads a raw document. `None` when the collection was never written.
pub async fn read_raw(db: &Database, name: &'static str) -> Result<Option<String>, WabiError> {
    db.connection()
        .call(move |conn| -> Result<Option<String>, rusqlite::Error> {
            let mut stmt = conn.prepare("SELECT payload FROM collections WHERE name = ?1")?;
            match stmt.query_row(params![name], |row| row.get(0)) {
                Ok(payload) => Ok(Some(payload)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(storage_err)
}

/// Replaces a raw document.
pub async fn write_raw(db: &Database, name: &'static str, payload: String) -> Result<(), WabiError> {
    db.connection()
        .call(move |conn| -> Result<(), rusqlite::Error> {
            conn.execute(
                "INSERT INTO collections (name, payload, updated_at)
                 VALUES (?1, ?2, strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
                 ON CONFLICT(name) DO UPDATE SET
                     payload = excluded.payload,
                     updated_at = excluded.updated_at",
                params![name, payload],
            )?;
            Ok(())
        })
        .await
        .map_err(storage_err)
}

/// Reads and decodes a collection; a missing one decodes as empty.
pub async fn read<T>(db: &Database, name: &'static str) -> Result<Vec<T>, WabiError>
where
    T: DeserializeOwned,
{
    match read_raw(db, name).await? {
        Some(payload) => serde_json::from_str(&payload).map_err(storage_err),
        None => Ok(Vec::new()),
    }
}

/// Encodes and replaces a collection.
pub async fn write<T>(db: &Database, name: &'static str, items: &[T]) -> Result<(), WabiError>
where
    T: Serialize,
{
    let payload = serde_json::to_string(items).map_err(storage_err)?;
    write_raw(db, name, payload).await
}
