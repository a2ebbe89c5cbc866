// SPDX-FileCopyrightText: 2026 Wabi Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence for Wabi records.
//!
//! Events, reflections and the completed-event set are kept as three named
//! JSON documents in one table. Every write replaces a whole collection and
//! is serialized through a single `tokio-rusqlite` connection.

pub mod adapter;
pub mod collections;
pub mod database;

pub use adapter::SqliteStore;
pub use database::Database;
