// SPDX-FileCopyrightText: 2026 Wabi Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `wabi serve` command implementation.
//!
//! Runs the chat proxy in the foreground until the server fails or the
//! process receives SIGINT/SIGTERM.

use std::time::Duration;

use secrecy::SecretString;
use tracing::info;
use wabi_config::WabiConfig;
use wabi_core::error::WabiError;
use wabi_gateway::{ProxyServer, ServerConfig};

/// Runs the `wabi serve` command.
pub async fn run_serve(config: &WabiConfig) -> Result<(), WabiError> {
    let proxy = ProxyServer::new(server_config(config), proxy_key(config));

    tokio::select! {
        result = proxy.run() => result,
        () = shutdown_signal() => {
            info!("chat proxy stopped");
            Ok(())
        }
    }
}

fn server_config(config: &WabiConfig) -> ServerConfig {
    ServerConfig {
        host: config.proxy.host.clone(),
        port: config.proxy.port,
        upstream_url: config.proxy.upstream_url.clone(),
        api_version: config.proxy.api_version.clone(),
        upstream_timeout: Duration::from_secs(config.assistant.timeout_secs),
    }
}

/// The proxy key falls back to `ANTHROPIC_API_KEY` like the assistant key.
fn proxy_key(config: &WabiConfig) -> Option<SecretString> {
    wabi_anthropic::resolve_api_key(config.proxy.api_key.as_deref()).map(SecretString::from)
}

/// Resolves on Ctrl+C, or SIGTERM on unix.
async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();

    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = ctrl_c => info!("received SIGINT (Ctrl+C), shutting down"),
                    _ = sigterm.recv() => info!("received SIGTERM, shutting down"),
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to install SIGTERM handler");
                let _ = ctrl_c.await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = ctrl_c.await;
        info!("received Ctrl+C, shutting down");
    }
}
