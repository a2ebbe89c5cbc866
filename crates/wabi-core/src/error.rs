// SPDX-FileCopyrightText: 2026 Wabi Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types shared by every Wabi crate.

use thiserror::Error;

/// The primary error type used across adapter traits and the reflection engine.
#[derive(Debug, Error)]
pub enum WabiError {
    /// Configuration errors (invalid TOML, missing required fields, bad values).
    #[error("configuration error: {0}")]
    Config(String),

    /// Missing or malformed user input before a state transition.
    ///
    /// Surfaced to the user as-is; the rejected operation changes nothing.
    #[error("{0}")]
    Validation(String),

    /// An operation was attempted in a state that does not accept it.
    #[error("invalid state: cannot {action} while {state}")]
    InvalidState { action: &'static str, state: String },

    /// A referenced record does not resolve.
    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: String },

    /// Assistant collaborator failure (transport, HTTP status, payload).
    #[error("assistant error: {message}")]
    Assistant {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Storage backend errors (database connection, query failure, serialization).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Proxy server errors (bind failure, serve loop).
    #[error("gateway error: {message}")]
    Gateway {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl WabiError {
    /// Returns true for errors the user caused and can fix by re-entering input.
    pub fn is_validation(&self) -> bool {
        matches!(self, WabiError::Validation(_))
    }
}
