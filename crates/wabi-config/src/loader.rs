// SPDX-FileCopyrightText: 2026 Wabi Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./wabi.toml` > `~/.config/wabi/wabi.toml` > `/etc/wabi/wabi.toml`
//! with environment variable overrides via `WABI_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use tracing::debug;

use crate::model::WabiConfig;

/// System-wide config file.
pub const SYSTEM_CONFIG_PATH: &str = "/etc/wabi/wabi.toml";

/// Config file looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "wabi.toml";

/// Per-user config file under the XDG config directory.
pub fn user_config_path() -> PathBuf {
    dirs::config_dir()
        .map(|d| d.join("wabi/wabi.toml"))
        .unwrap_or_default()
}

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/wabi/wabi.toml` (system-wide)
/// 3. `~/.config/wabi/wabi.toml` (user XDG config)
/// 4. `./wabi.toml` (local directory)
/// 5. `WABI_*` environment variables
pub fn load_config() -> Result<WabiConfig, figment::Error> {
    for path in [
        PathBuf::from(SYSTEM_CONFIG_PATH),
        user_config_path(),
        PathBuf::from(LOCAL_CONFIG_FILE),
    ] {
        if path.is_file() {
            debug!(path = %path.display(), "config file found");
        }
    }
    build_figment().extract()
}

/// Load configuration from a TOML string only (no files, no env).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<WabiConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(WabiConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<WabiConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(WabiConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used for config loading, before extraction.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(WabiConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG_PATH))
        .merge(Toml::file(user_config_path()))
        .merge(Toml::file(LOCAL_CONFIG_FILE))
        .merge(env_provider())
}

/// Create the environment variable provider using explicit `map()` for section-to-dot mapping.
///
/// Uses `Env::map()` rather than `Env::split("_")` because key names contain
/// underscores: `WABI_PACING_BASE_DELAY_MS` must map to `pacing.base_delay_ms`.
fn env_provider() -> Env {
    Env::prefixed("WABI_").map(|key| {
        let mapped = map_env_key(key.as_str());
        mapped.into()
    })
}

/// Maps a lowercased, prefix-stripped env key to its dotted config path.
pub(crate) fn map_env_key(key: &str) -> String {
    const SECTIONS: &[&str] = &["agent", "assistant", "pacing", "storage", "proxy"];

    for section in SECTIONS {
        if let Some(rest) = key.strip_prefix(section).and_then(|r| r.strip_prefix('_')) {
            return format!("{section}.{rest}");
        }
    }
    key.to_string()
}
