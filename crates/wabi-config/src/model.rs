// SPDX-FileCopyrightText: 2026 Wabi Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level Wabi configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct WabiConfig {
    /// Companion identity and logging.
    #[serde(default)]
    pub agent: AgentConfig,

    /// Assistant (text-generation) collaborator settings.
    #[serde(default)]
    pub assistant: AssistantConfig,

    /// Simulated typing latency before assistant turns.
    #[serde(default)]
    pub pacing: PacingConfig,

    /// Record store settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Chat proxy settings.
    #[serde(default)]
    pub proxy: ProxyConfig,
}

/// Companion identity and logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    /// Name the assistant persona introduces itself with.
    #[serde(default = "default_agent_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: default_agent_name(),
            log_level: default_log_level(),
        }
    }
}

fn default_agent_name() -> String {
    "Wabi".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Assistant collaborator configuration.
///
/// `endpoint` may point either at the Anthropic Messages API directly or at
/// a running `wabi serve` proxy, which accepts the same payload.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AssistantConfig {
    /// Messages endpoint URL.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// API key sent as `x-api-key`. `None` falls back to `ANTHROPIC_API_KEY`,
    /// and is omitted entirely when talking to the proxy.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Anthropic API version header.
    #[serde(default = "default_api_version")]
    pub api_version: String,

    /// Model identifier.
    #[serde(default = "default_model")]
    pub model: String,

    /// Maximum output tokens per turn.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// HTTP request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            api_key: None,
            api_version: default_api_version(),
            model: default_model(),
            max_tokens: default_max_tokens(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_endpoint() -> String {
    "https://api.anthropic.com/v1/messages".to_string()
}

fn default_api_version() -> String {
    "2023-06-01".to_string()
}

fn default_model() -> String {
    "claude-sonnet-4-20250514".to_string()
}

fn default_max_tokens() -> u32 {
    1000
}

fn default_timeout_secs() -> u64 {
    60
}

/// Simulated latency: `base + min(len * per_char, max_reading)` milliseconds.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PacingConfig {
    /// Disable to issue assistant requests immediately.
    #[serde(default = "default_pacing_enabled")]
    pub enabled: bool,

    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,

    #[serde(default = "default_per_char_delay_ms")]
    pub per_char_delay_ms: u64,

    /// Cap on the length-dependent part of the delay.
    #[serde(default = "default_max_reading_delay_ms")]
    pub max_reading_delay_ms: u64,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            enabled: default_pacing_enabled(),
            base_delay_ms: default_base_delay_ms(),
            per_char_delay_ms: default_per_char_delay_ms(),
            max_reading_delay_ms: default_max_reading_delay_ms(),
        }
    }
}

fn default_pacing_enabled() -> bool {
    true
}

fn default_base_delay_ms() -> u64 {
    1500
}

fn default_per_char_delay_ms() -> u64 {
    20
}

fn default_max_reading_delay_ms() -> u64 {
    3000
}

/// Record store configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("wabi").join("wabi.db"))
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "wabi.db".to_string())
}

fn default_wal_mode() -> bool {
    true
}

/// Chat proxy configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ProxyConfig {
    /// Host address to bind.
    #[serde(default = "default_proxy_host")]
    pub host: String,

    /// Port to bind.
    #[serde(default = "default_proxy_port")]
    pub port: u16,

    /// Provider URL requests are forwarded to.
    #[serde(default = "default_endpoint")]
    pub upstream_url: String,

    /// Provider credential injected into forwarded requests.
    /// `None` falls back to `ANTHROPIC_API_KEY`.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Anthropic API version header sent upstream.
    #[serde(default = "default_api_version")]
    pub api_version: String,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            host: default_proxy_host(),
            port: default_proxy_port(),
            upstream_url: default_endpoint(),
            api_key: None,
            api_version: default_api_version(),
        }
    }
}

fn default_proxy_host() -> String {
    "127.0.0.1".to_string()
}

fn default_proxy_port() -> u16 {
    8787
}
