//! Shared HTTP client construction (timeouts, user agent, proxy)

use anyhow::{Context, Result};
use extsync_core::types::SyncConfig;
use std::time::Duration;
use tracing::debug;

/// Build a client honoring the configured proxy and user agent
pub fn build_client(config: &SyncConfig, timeout: Duration) -> Result<reqwest::Client> {
    let mut builder = reqwest::Client::builder()
        .user_agent(&config.network.user_agent)
        .timeout(timeout);

    if let Some(proxy_url) = config.proxy.as_deref().filter(|p| !p.is_empty()) {
        let proxy = reqwest::Proxy::all(proxy_url)
            .with_context(|| format!("Invalid proxy URL: {}", proxy_url))?;
        debug!("Routing extension transfers through proxy {}", proxy_url);
        builder = builder.proxy(proxy);
    } else {
        // Environment proxies are already folded into the config
        builder = builder.no_proxy();
    }

    builder.build().context("Failed to create HTTP client")
}

/// Client for registry queries
pub fn query_client(config: &SyncConfig) -> Result<reqwest::Client> {
    build_client(config, Duration::from_secs(config.network.http_timeout_secs))
}

/// Client for package downloads
pub fn download_client(config: &SyncConfig) -> Result<reqwest::Client> {
    build_client(
        config,
        Duration::from_secs(config.network.download_timeout_secs),
    )
}
