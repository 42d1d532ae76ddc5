//! Builders for records and configuration

use extsync_core::types::{ExtensionRecord, SyncConfig};
use std::path::Path;

/// Desired or installed record from a `publisher.name` id
pub fn ext(id: &str, version: &str) -> ExtensionRecord {
    ExtensionRecord::from_id(id, version).unwrap()
}

/// Ids of a record list, in order
pub fn ids(records: &[ExtensionRecord]) -> Vec<String> {
    records.iter().map(|r| r.id.clone()).collect()
}

/// Builder for test [`SyncConfig`] values
pub struct ConfigBuilder {
    config: SyncConfig,
}

impl ConfigBuilder {
    /// Configuration rooted at a sandbox extensions directory
    pub fn new(extensions_dir: &Path) -> Self {
        let mut config = SyncConfig::default();
        config.extensions_dir = Some(extensions_dir.to_path_buf());
        Self { config }
    }

    /// Fetch fallback packages from a mock server
    pub fn gallery(mut self, server_uri: &str) -> Self {
        self.config.gallery.fallback_download_url =
            format!("{}/{{publisher}}.{{name}}-{{version}}.vsix", server_uri);
        self.config.gallery.query_url = format!("{}/extensionquery", server_uri);
        self
    }

    pub fn auto_update(mut self, enabled: bool) -> Self {
        self.config.auto_update_extensions = enabled;
        self
    }

    pub fn exclude(mut self, pattern: &str) -> Self {
        self.config
            .excluded_extension_patterns
            .push(pattern.to_string());
        self
    }

    pub fn build(self) -> SyncConfig {
        self.config
    }
}
