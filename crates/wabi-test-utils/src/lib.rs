// SPDX-FileCopyrightText: 2026 Wabi Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Wabi.
//!
//! Provides mock adapters for fast, deterministic tests without a network
//! or a database.
//!
//! # Components
//!
//! - [`MockAssistant`] - Scripted assistant that records every request
//! - [`MemoryStore`] - In-memory record store with write counters

pub mod mock_assistant;
pub mod mock_store;

pub use mock_assistant::{MockAssistant, MockReply};
pub use mock_store::MemoryStore;
