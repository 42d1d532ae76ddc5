//! CLI command implementations

pub mod config;
pub mod diff;
pub mod list;
pub mod sync;

use anyhow::{Context, Result};
use camino::Utf8Path;
use extsync_core::types::{parse_extension_list, ExtensionRecord};
use extsync_core::{HierarchicalConfigLoader, SyncConfig};
use extsync_engine::{ExtensionSyncEngine, GalleryClient, LocalInventory};
use std::sync::Arc;

use crate::cli::SyncOverrides;

/// Load the effective configuration and apply command-line overrides
pub fn load_config(overrides: &SyncOverrides) -> Result<SyncConfig> {
    let mut config = HierarchicalConfigLoader::new()?
        .load_sync_config()
        .context("Failed to load configuration")?;

    if let Some(dir) = &overrides.extensions_dir {
        config.extensions_dir = Some(dir.clone().into_std_path_buf());
    }
    if !overrides.exclude.is_empty() {
        config
            .excluded_extension_patterns
            .extend(overrides.exclude.iter().cloned());
    }
    if overrides.auto_update {
        config.auto_update_extensions = true;
    }
    if let Some(proxy) = &overrides.proxy {
        config.proxy = Some(proxy.clone());
    }

    Ok(config)
}

/// Read the desired extension list
pub fn load_desired(path: &Utf8Path) -> Result<Vec<ExtensionRecord>> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path))?;
    parse_extension_list(&content).with_context(|| format!("Invalid extension list in {}", path))
}

/// Engine over the local extensions directory and the configured registry
pub fn build_engine(config: SyncConfig) -> Result<ExtensionSyncEngine> {
    let inventory = Arc::new(LocalInventory::new(config.resolved_extensions_dir()?));
    let gallery = Arc::new(GalleryClient::new(&config)?);
    ExtensionSyncEngine::new(config, inventory, gallery)
}
