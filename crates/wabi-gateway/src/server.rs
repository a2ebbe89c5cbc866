// SPDX-FileCopyrightText: 2026 Wabi Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Proxy HTTP server built on axum.
//!
//! Sets up routes, middleware, and shared state for the chat proxy.

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::Router;
use axum::routing::{get, post};
use secrecy::SecretString;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use wabi_core::error::WabiError;

use crate::handlers;

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct ProxyState {
    /// Client used for upstream calls.
    pub http: reqwest::Client,
    /// Provider endpoint every chat request is forwarded to.
    pub upstream_url: Arc<str>,
    /// Provider credential injected as `x-api-key`.
    pub api_key: Option<SecretString>,
    /// Value for the `anthropic-version` header.
    pub api_version: Arc<str>,
    /// Process start time for uptime calculation.
    pub start_time: Instant,
}

impl ProxyState {
    pub fn new(config: &ServerConfig, api_key: Option<SecretString>) -> Result<Self, WabiError> {
        let http = reqwest::Client::builder()
            .timeout(config.upstream_timeout)
            .build()
            .map_err(|e| WabiError::Gateway {
                message: format!("failed to build upstream client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            http,
            upstream_url: Arc::from(config.upstream_url.as_str()),
            api_key,
            api_version: Arc::from(config.api_version.as_str()),
            start_time: Instant::now(),
        })
    }
}

/// Proxy server configuration (mirrors `ProxyConfig` from wabi-config).
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host address to bind.
    pub host: String,
    /// Port to bind.
    pub port: u16,
    /// Provider URL requests are forwarded to.
    pub upstream_url: String,
    /// Value for the `anthropic-version` header.
    pub api_version: String,
    /// Upper bound on one upstream call.
    pub upstream_timeout: Duration,
}

/// Builds the proxy router:
/// - POST /api/chat (forwarded upstream)
/// - OPTIONS /api/chat (200, empty)
/// - any other method on /api/chat (405)
/// - GET /health (unauthenticated)
pub fn router(state: ProxyState) -> Router {
    Router::new()
        .route(
            "/api/chat",
            post(handlers::proxy_chat)
                .options(handlers::preflight)
                .fallback(handlers::method_not_allowed),
        )
        .route("/health", get(handlers::get_health))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Binds the configured address.
pub async fn bind(config: &ServerConfig) -> Result<TcpListener, WabiError> {
    let addr = format!("{}:{}", config.host, config.port);
    TcpListener::bind(&addr)
        .await
        .map_err(|e| WabiError::Gateway {
            message: format!("failed to bind proxy to {addr}: {e}"),
            source: Some(Box::new(e)),
        })
}

/// Serves the router on an already-bound listener until it fails.
pub async fn serve(listener: TcpListener, state: ProxyState) -> Result<(), WabiError> {
    if let Ok(addr) = listener.local_addr() {
        tracing::info!("Chat proxy listening on {addr}");
    }

    axum::serve(listener, router(state))
        .await
        .map_err(|e| WabiError::Gateway {
            message: format!("proxy server error: {e}"),
            source: Some(Box::new(e)),
        })
}
