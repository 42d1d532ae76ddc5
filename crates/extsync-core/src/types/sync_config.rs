//! Synchronization configuration types
//!
//! These types control how a desired extension list is applied: whether
//! versions are bumped to the registry's latest, which installed extensions
//! are protected from removal, and the network parameters used for transfers.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Complete synchronization configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SyncConfig {
    /// Replace desired versions with the registry's latest before diffing
    #[serde(default)]
    pub auto_update_extensions: bool,

    /// Globs (matched case-insensitively against the full id) protecting
    /// installed extensions from removal
    #[serde(default)]
    pub excluded_extension_patterns: Vec<String>,

    /// Upstream HTTP/HTTPS proxy applied to every transfer
    #[serde(default)]
    pub proxy: Option<String>,

    /// Directory holding installed extensions; defaults to ~/.vscode/extensions
    #[serde(default)]
    pub extensions_dir: Option<PathBuf>,

    /// Network and HTTP configuration
    #[serde(default)]
    pub network: NetworkConfig,

    /// Extension registry endpoints
    #[serde(default)]
    pub gallery: GalleryConfig,
}

impl SyncConfig {
    /// Extensions directory, falling back to the editor's conventional location
    pub fn resolved_extensions_dir(&self) -> anyhow::Result<PathBuf> {
        match &self.extensions_dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(crate::get_home_dir()?.join(".vscode").join("extensions")),
        }
    }

    /// Obsolete ledger location inside the extensions directory
    pub fn obsolete_ledger_path(&self) -> anyhow::Result<PathBuf> {
        Ok(self.resolved_extensions_dir()?.join(OBSOLETE_FILE_NAME))
    }
}

/// File name of the obsolete ledger inside the extensions directory
pub const OBSOLETE_FILE_NAME: &str = ".obsolete";

/// Network and HTTP configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct NetworkConfig {
    /// Registry query timeout in seconds
    #[serde(default = "default_http_timeout")]
    pub http_timeout_secs: u64,

    /// Package download timeout in seconds
    #[serde(default = "default_download_timeout")]
    pub download_timeout_secs: u64,

    /// User agent string for HTTP requests
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            http_timeout_secs: default_http_timeout(),
            download_timeout_secs: default_download_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_http_timeout() -> u64 {
    30
}
fn default_download_timeout() -> u64 {
    300 // 5 minutes
}
fn default_user_agent() -> String {
    format!(
        "extsync/{} ({}; {})",
        env!("CARGO_PKG_VERSION"),
        std::env::consts::OS,
        std::env::consts::ARCH
    )
}

/// Extension registry configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct GalleryConfig {
    /// Batch metadata query endpoint
    #[serde(default = "default_query_url")]
    pub query_url: String,

    /// Direct asset URL used when the registry supplied none.
    /// `{publisher}`, `{name}` and `{version}` are substituted.
    #[serde(default = "default_fallback_download_url")]
    pub fallback_download_url: String,

    /// Top-level directory inside a package archive holding the payload
    #[serde(default = "default_payload_dir")]
    pub payload_dir: String,
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            query_url: default_query_url(),
            fallback_download_url: default_fallback_download_url(),
            payload_dir: default_payload_dir(),
        }
    }
}

impl GalleryConfig {
    /// Build the fallback download URL for one extension version
    pub fn fallback_url(&self, publisher: &str, name: &str, version: &str) -> String {
        self.fallback_download_url
            .replace("{publisher}", publisher)
            .replace("{name}", name)
            .replace("{version}", version)
    }
}

fn default_query_url() -> String {
    "https://marketplace.visualstudio.com/_apis/public/gallery/extensionquery".to_string()
}
fn default_fallback_download_url() -> String {
    "https://{publisher}.gallery.vsassets.io/_apis/public/gallery/publisher/{publisher}/extension/{name}/{version}/assetbyname/Microsoft.VisualStudio.Services.VSIXPackage".to_string()
}
fn default_payload_dir() -> String {
    "extension".to_string()
}
