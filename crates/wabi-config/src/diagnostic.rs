// SPDX-FileCopyrightText: 2026 Wabi Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration problems as miette diagnostics.
//!
//! Figment errors are mapped onto [`ConfigError`], pointing at the offending
//! line of `wabi.toml` when the value came from a file, and suggesting the
//! closest real setting for a misspelled key.

#![allow(unused_assignments)] // miette's Diagnostic derive generates code triggering this lint

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// Jaro-Winkler score a key must beat to be offered as a correction.
const SUGGESTION_THRESHOLD: f64 = 0.75;

/// Every table of `wabi.toml` and the keys it accepts.
pub const SECTION_KEYS: &[(&str, &[&str])] = &[
    ("agent", &["name", "log_level"]),
    (
        "assistant",
        &["endpoint", "api_key", "api_version", "model", "max_tokens", "timeout_secs"],
    ),
    (
        "pacing",
        &["enabled", "base_delay_ms", "per_char_delay_ms", "max_reading_delay_ms"],
    ),
    ("storage", &["database_path", "wal_mode"]),
    ("proxy", &["host", "port", "upstream_url", "api_key", "api_version"]),
];

/// A problem with the Wabi configuration.
#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("unknown key `{key}` {}", location(.section))]
    #[diagnostic(
        code(wabi::config::unknown_key),
        help("{}", unknown_key_help(suggestion.as_deref(), valid_keys))
    )]
    UnknownKey {
        key: String,
        /// Table the key appeared in; `None` at the top level.
        section: Option<String>,
        suggestion: Option<String>,
        /// Comma-separated keys accepted where `key` was found.
        valid_keys: String,
        #[label("not a Wabi setting")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    #[error("`{key}` has the wrong type: found {found}")]
    #[diagnostic(
        code(wabi::config::invalid_type),
        help("`{key}` takes {expected}")
    )]
    InvalidType {
        /// Dotted path, e.g. `proxy.port`.
        key: String,
        found: String,
        expected: String,
        #[label("this value")]
        span: Option<SourceSpan>,
        #[source_code]
        src: Option<NamedSource<String>>,
    },

    /// A value that parsed but makes no sense, e.g. port 0.
    #[error("invalid setting: {message}")]
    #[diagnostic(
        code(wabi::config::validation),
        help("fix the value in wabi.toml or the matching WABI_* environment variable")
    )]
    Validation { message: String },

    /// Anything else figment reports, such as TOML syntax errors.
    #[error("could not read configuration: {0}")]
    #[diagnostic(code(wabi::config::unreadable))]
    Unreadable(String),
}

fn location(section: &Option<String>) -> String {
    match section {
        Some(section) => format!("in [{section}]"),
        None => "at the top level".to_string(),
    }
}

fn unknown_key_help(suggestion: Option<&str>, valid_keys: &str) -> String {
    match suggestion {
        Some(s) => format!("did you mean `{s}`? This table accepts: {valid_keys}"),
        None => format!("this table accepts: {valid_keys}"),
    }
}

/// Keys accepted under `section` (`None` lists the tables themselves).
pub fn keys_for(section: Option<&str>) -> Vec<&'static str> {
    match section {
        None => SECTION_KEYS.iter().map(|(name, _)| *name).collect(),
        Some(section) => SECTION_KEYS
            .iter()
            .find(|(name, _)| *name == section)
            .map(|(_, keys)| keys.to_vec())
            .unwrap_or_default(),
    }
}

/// Maps every error inside a `figment::Error` to a [`ConfigError`].
///
/// `toml_sources` pairs each file path with its content so spans can be
/// attached for values that came from a file.
pub fn figment_to_config_errors(
    err: figment::Error,
    toml_sources: &[(String, String)],
) -> Vec<ConfigError> {
    use figment::error::Kind;

    err.into_iter()
        .map(|error| {
            let source = file_source(&error, toml_sources);
            match &error.kind {
                Kind::UnknownField(field, expected) => {
                    let section = error.path.first().cloned();
                    let mut valid = keys_for(section.as_deref());
                    if valid.is_empty() {
                        valid = expected.to_vec();
                    }
                    let (span, src) = attach(source, section.as_deref(), field);
                    ConfigError::UnknownKey {
                        key: field.clone(),
                        suggestion: suggest_key(field, &valid),
                        valid_keys: valid.join(", "),
                        section,
                        span,
                        src,
                    }
                }
                Kind::InvalidType(actual, expected) => {
                    let (section, field) = match error.path.split_last() {
                        Some((field, parents)) => {
                            (parents.first().map(String::as_str), field.as_str())
                        }
                        None => (None, ""),
                    };
                    let (span, src) = attach(source, section, field);
                    ConfigError::InvalidType {
                        key: error.path.join("."),
                        found: actual.to_string(),
                        expected: expected.clone(),
                        span,
                        src,
                    }
                }
                _ => ConfigError::Unreadable(error.to_string()),
            }
        })
        .collect()
}

/// The file (path, content) this error's value was read from, if any.
fn file_source<'a>(
    error: &figment::error::Error,
    toml_sources: &'a [(String, String)],
) -> Option<(&'a str, &'a str)> {
    let Some(figment::Source::File(path)) = error.metadata.as_ref().and_then(|m| m.source.as_ref())
    else {
        return None;
    };
    let path = path.display().to_string();
    toml_sources
        .iter()
        .find(|(p, _)| *p == path)
        .map(|(p, content)| (p.as_str(), content.as_str()))
}

fn attach(
    source: Option<(&str, &str)>,
    section: Option<&str>,
    key: &str,
) -> (Option<SourceSpan>, Option<NamedSource<String>>) {
    source
        .and_then(|(path, content)| {
            let offset = find_key_offset(content, section, key)?;
            Some((
                Some(SourceSpan::new(offset.into(), key.len())),
                Some(NamedSource::new(path, content.to_string())),
            ))
        })
        .unwrap_or((None, None))
}

/// Byte offset of `key = ...` inside `[section]` (or before any table when
/// `section` is `None`).
pub fn find_key_offset(content: &str, section: Option<&str>, key: &str) -> Option<usize> {
    let mut current: Option<&str> = None;
    let mut offset = 0;

    for line in content.split_inclusive('\n') {
        let trimmed = line.trim_start();
        if let Some(header) = trimmed.strip_prefix('[') {
            current = header.split(']').next().map(str::trim);
        } else if current == section
            && let Some((name, _)) = trimmed.split_once('=')
            && name.trim_end() == key
        {
            return Some(offset + (line.len() - trimmed.len()));
        }
        offset += line.len();
    }

    None
}

/// Closest valid key to `unknown`, if any is similar enough.
pub fn suggest_key(unknown: &str, valid_keys: &[&str]) -> Option<String> {
    valid_keys
        .iter()
        .map(|key| (strsim::jaro_winkler(unknown, key), *key))
        .filter(|(score, _)| *score > SUGGESTION_THRESHOLD)
        .max_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, key)| key.to_string())
}

/// Prints each error to stderr with miette's graphical report.
pub fn render_errors(errors: &[ConfigError]) {
    use miette::GraphicalReportHandler;

    let handler = GraphicalReportHandler::new();
    eprintln!(
        "wabi: {} configuration problem{}",
        errors.len(),
        if errors.len() == 1 { "" } else { "s" }
    );
    for error in errors {
        let mut buf = String::new();
        match handler.render_report(&mut buf, error as &dyn Diagnostic) {
            Ok(()) => eprint!("{buf}"),
            Err(_) => eprintln!("error: {error}"),
        }
    }
}
