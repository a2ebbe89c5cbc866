// SPDX-FileCopyrightText: 2026 Wabi Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Chat proxy for Wabi.
//!
//! Keeps the provider credential on the server side: clients post the
//! assistant payload to `/api/chat` and the proxy forwards it upstream with
//! `x-api-key` injected, relaying the provider's reply unmodified.

pub mod handlers;
pub mod server;

use std::net::SocketAddr;

use async_trait::async_trait;
use secrecy::SecretString;
use tokio::sync::Mutex;

use wabi_core::error::WabiError;
use wabi_core::traits::PluginAdapter;
use wabi_core::types::{AdapterType, HealthStatus};

pub use crate::server::{ProxyState, ServerConfig, router};

/// Chat proxy server with a background task lifecycle.
pub struct ProxyServer {
    config: ServerConfig,
    api_key: Option<SecretString>,
    server_handle: Mutex<Option<tokio::task::JoinHandle<()>>>,
}

impl ProxyServer {
    /// Create a new ProxyServer. Nothing is bound until [`start`](Self::start).
    pub fn new(config: ServerConfig, api_key: Option<SecretString>) -> Self {
        if api_key.is_none() {
            tracing::warn!("no provider API key configured; upstream calls will be unauthenticated");
        }
        Self {
            config,
            api_key,
            server_handle: Mutex::new(None),
        }
    }

    /// Binds and serves in a background task, returning the bound address.
    pub async fn start(&self) -> Result<SocketAddr, WabiError> {
        let mut handle = self.server_handle.lock().await;
        if handle.is_some() {
            return Err(WabiError::InvalidState {
                action: "start the proxy",
                state: "running".to_string(),
            });
        }

        let state = ProxyState::new(&self.config, self.api_key.clone())?;
        let listener = server::bind(&self.config).await?;
        let addr = listener.local_addr().map_err(|e| WabiError::Gateway {
            message: format!("failed to read bound address: {e}"),
            source: Some(Box::new(e)),
        })?;

        *handle = Some(tokio::spawn(async move {
            if let Err(e) = server::serve(listener, state).await {
                tracing::error!("proxy server error: {e}");
            }
        }));

        tracing::info!(%addr, upstream = %self.config.upstream_url, "chat proxy started");
        Ok(addr)
    }

    /// Binds and serves in the foreground until the server fails.
    pub async fn run(&self) -> Result<(), WabiError> {
        let state = ProxyState::new(&self.config, self.api_key.clone())?;
        let listener = server::bind(&self.config).await?;
        server::serve(listener, state).await
    }
}

#[async_trait]
impl PluginAdapter for ProxyServer {
    fn name(&self) -> &str {
        "proxy"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Gateway
    }

    async fn health_check(&self) -> Result<HealthStatus, WabiError> {
        let handle = self.server_handle.lock().await;
        match handle.as_ref() {
            Some(h) if !h.is_finished() => Ok(HealthStatus::Healthy),
            Some(_) => Ok(HealthStatus::Unhealthy("server task exited".to_string())),
            None => Ok(HealthStatus::Unhealthy("server not started".to_string())),
        }
    }

    async fn shutdown(&self) -> Result<(), WabiError> {
        let mut handle = self.server_handle.lock().await;
        if let Some(h) = handle.take() {
            h.abort();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn test_config() -> ServerConfig {
        ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0, // Will bind to random port
            upstream_url: "http://127.0.0.1:1/v1/messages".to_string(),
            api_version: "2023-06-01".to_string(),
            upstream_timeout: Duration::from_secs(5),
        }
    }

    #[test]
    fn proxy_server_new() {
        let proxy = ProxyServer::new(test_config(), None);
        assert_eq!(proxy.name(), "proxy");
        assert_eq!(proxy.adapter_type(), AdapterType::Gateway);
        assert_eq!(proxy.version(), semver::Version::new(0, 1, 0));
    }

    #[tokio::test]
    async fn health_check_before_start() {
        let proxy = ProxyServer::new(test_config(), None);
        match proxy.health_check().await.unwrap() {
            HealthStatus::Unhealthy(msg) => assert!(msg.contains("not started")),
            other => panic!("expected Unhealthy before start, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn start_serves_health_and_shutdown_stops() {
        let proxy = ProxyServer::new(test_config(), Some(SecretString::from("sk-test".to_string())));
        let addr = proxy.start().await.unwrap();
        assert_eq!(proxy.health_check().await.unwrap(), HealthStatus::Healthy);

        let body: serde_json::Value = reqwest::get(format!("http://{addr}/health"))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(body["status"], "ok");

        assert!(proxy.start().await.is_err(), "second start should fail");

        proxy.shutdown().await.unwrap();
        match proxy.health_check().await.unwrap() {
            HealthStatus::Unhealthy(_) => {}
            other => panic!("expected Unhealthy after shutdown, got {other:?}"),
        }
    }
}
