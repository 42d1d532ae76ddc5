//! Hierarchical configuration loader with precedence
//!
//! Loads configuration from multiple sources with the following precedence (low to high):
//! 1. Embedded defaults (built into binary)
//! 2. User config (~/.extsync/config.yaml)
//! 3. Environment variables (EXTSYNC_* prefix, plus HTTP(S)_PROXY)
//! 4. CLI flags (handled by caller)

use crate::error::{Error, Result};
use crate::types::SyncConfig;
use camino::{Utf8Path, Utf8PathBuf};
use rust_embed::RustEmbed;
use serde::de::DeserializeOwned;
use std::env;
use std::fs;
use std::path::PathBuf;
use tracing::debug;

/// Embedded configuration files
#[derive(RustEmbed)]
#[folder = "$CARGO_MANIFEST_DIR/../../embedded/config/"]
#[prefix = ""]
struct EmbeddedConfigs;

const DEFAULTS_FILE: &str = "sync-defaults.yaml";
const USER_CONFIG_FILE: &str = "config.yaml";

/// Configuration hierarchy loader
pub struct HierarchicalConfigLoader {
    /// Base directory for configuration files
    config_dir: Utf8PathBuf,
}

impl HierarchicalConfigLoader {
    /// Create a new hierarchical config loader rooted at ~/.extsync
    pub fn new() -> Result<Self> {
        let config_dir = Self::get_config_dir()?;
        Ok(Self { config_dir })
    }

    /// Create a loader with a custom config directory
    pub fn with_dir(config_dir: Utf8PathBuf) -> Self {
        Self { config_dir }
    }

    fn get_config_dir() -> Result<Utf8PathBuf> {
        let home = env::var("HOME")
            .or_else(|_| env::var("USERPROFILE"))
            .map_err(|_| Error::invalid_config("Could not determine home directory"))?;

        Ok(Utf8PathBuf::from(home).join(".extsync"))
    }

    /// Load sync configuration with hierarchical precedence
    pub fn load_sync_config(&self) -> Result<SyncConfig> {
        let mut config = Self::load_embedded_config::<SyncConfig>(DEFAULTS_FILE)?;

        let user_config_path = self.config_dir.join(USER_CONFIG_FILE);
        if user_config_path.exists() {
            debug!("Loading user config from {}", user_config_path);
            let file_config = self.load_yaml_file::<SyncConfig>(&user_config_path)?;
            config = Self::merge_sync_config(config, file_config);
        }

        self.apply_env_overrides(config)
    }

    /// Load an embedded configuration file
    fn load_embedded_config<T: DeserializeOwned>(filename: &str) -> Result<T> {
        let embedded_file = EmbeddedConfigs::get(filename).ok_or_else(|| {
            Error::config_not_found(format!("Embedded config not found: {}", filename))
        })?;

        let content = std::str::from_utf8(&embedded_file.data).map_err(|_| {
            Error::invalid_config(format!("Invalid UTF-8 in embedded config: {}", filename))
        })?;

        serde_yaml_ng::from_str(content).map_err(|e| {
            Error::invalid_config(format!(
                "Failed to parse embedded config {}: {}",
                filename, e
            ))
        })
    }

    /// Load a YAML file and parse it
    fn load_yaml_file<T: DeserializeOwned>(&self, path: &Utf8Path) -> Result<T> {
        let content = fs::read_to_string(path)?;
        serde_yaml_ng::from_str(&content)
            .map_err(|e| Error::invalid_config(format!("Failed to parse {}: {}", path, e)))
    }

    /// Merge two sync configs (base is overridden by overlay)
    fn merge_sync_config(base: SyncConfig, overlay: SyncConfig) -> SyncConfig {
        SyncConfig {
            auto_update_extensions: overlay.auto_update_extensions,
            excluded_extension_patterns: if overlay.excluded_extension_patterns.is_empty() {
                base.excluded_extension_patterns
            } else {
                overlay.excluded_extension_patterns
            },
            proxy: overlay.proxy.or(base.proxy),
            extensions_dir: overlay.extensions_dir.or(base.extensions_dir),
            network: overlay.network,
            gallery: overlay.gallery,
        }
    }

    /// Apply environment variable overrides to sync config
    fn apply_env_overrides(&self, mut config: SyncConfig) -> Result<SyncConfig> {
        if let Ok(val) = env::var("EXTSYNC_AUTO_UPDATE") {
            config.auto_update_extensions = val
                .parse()
                .map_err(|_| Error::invalid_config("EXTSYNC_AUTO_UPDATE must be true or false"))?;
        }

        if let Ok(val) = env::var("EXTSYNC_EXCLUDED") {
            config.excluded_extension_patterns = val
                .split(',')
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(String::from)
                .collect();
        }

        if let Ok(val) = env::var("EXTSYNC_EXTENSIONS_DIR") {
            config.extensions_dir = Some(PathBuf::from(val));
        }

        if let Ok(val) = env::var("EXTSYNC_HTTP_TIMEOUT_SECS") {
            config.network.http_timeout_secs = val.parse().map_err(|_| {
                Error::invalid_config("EXTSYNC_HTTP_TIMEOUT_SECS must be a valid number")
            })?;
        }

        if let Ok(val) = env::var("EXTSYNC_DOWNLOAD_TIMEOUT_SECS") {
            config.network.download_timeout_secs = val.parse().map_err(|_| {
                Error::invalid_config("EXTSYNC_DOWNLOAD_TIMEOUT_SECS must be a valid number")
            })?;
        }

        // Explicit setting first, then the conventional proxy variables
        if let Ok(val) = env::var("EXTSYNC_PROXY") {
            config.proxy = Some(val);
        } else if config.proxy.is_none() {
            config.proxy = ["HTTPS_PROXY", "https_proxy", "HTTP_PROXY", "http_proxy"]
                .iter()
                .find_map(|key| env::var(key).ok().filter(|val| !val.is_empty()));
        }

        Ok(config)
    }

    /// Get the config directory path
    pub fn config_dir(&self) -> &Utf8Path {
        &self.config_dir
    }
}
