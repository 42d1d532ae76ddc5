//! Local extension inventory
//!
//! Installed extensions live one per directory under the extensions
//! directory, each with a `package.json` describing name, publisher and
//! version. Built-in extensions (flagged in `__metadata`), dot-directories
//! and directories already flagged in the obsolete ledger are not reported.

use crate::error::SyncError;
use crate::obsolete::ObsoleteLedger;
use extsync_core::types::{id_key, ExtensionRecord, OBSOLETE_FILE_NAME};
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use semver::Version;
use serde::Deserialize;
use std::cmp::Ordering;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Source of truth for what is installed on this machine
pub trait InventoryReader: Send + Sync {
    /// Installed, non built-in extensions minus those matching `excluded_patterns`
    fn list_installed(&self, excluded_patterns: &[String])
        -> Result<Vec<ExtensionRecord>, SyncError>;

    /// Installed extension with this id (case-insensitive)
    fn find_by_id(&self, id: &str) -> Result<Option<ExtensionRecord>, SyncError>;

    /// Where the extension actually lives, preferring the live installed path
    fn resolve_install_path(&self, record: &ExtensionRecord) -> PathBuf;

    /// Directory a freshly installed version of `record` goes into
    fn install_target(&self, record: &ExtensionRecord) -> PathBuf;
}

/// Order two version strings by semver, falling back to plain string order
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    match (Version::parse(a), Version::parse(b)) {
        (Ok(va), Ok(vb)) => va.cmp(&vb),
        _ => a.cmp(b),
    }
}

/// Case-insensitive glob filter over full extension ids
#[derive(Debug, Clone)]
pub struct ExclusionFilter {
    globset: GlobSet,
}

impl ExclusionFilter {
    /// Compile exclusion patterns
    pub fn new(patterns: &[String]) -> anyhow::Result<Self> {
        let mut builder = GlobSetBuilder::new();

        for pattern in patterns {
            let glob = GlobBuilder::new(pattern)
                .case_insensitive(true)
                .build()
                .map_err(|e| anyhow::anyhow!("Invalid exclusion pattern '{}': {}", pattern, e))?;
            builder.add(glob);
        }

        let globset = builder
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build exclusion globset: {}", e))?;

        Ok(Self { globset })
    }

    /// Checks whether an extension id is excluded
    pub fn is_excluded(&self, id: &str) -> bool {
        self.globset.is_match(id)
    }
}

#[derive(Debug, Deserialize)]
struct PackageManifest {
    name: String,
    publisher: String,
    version: String,
    #[serde(rename = "__metadata", default)]
    metadata: Option<InstallMetadata>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InstallMetadata {
    #[serde(default)]
    is_builtin: bool,
}

/// Filesystem-backed inventory over an extensions directory
pub struct LocalInventory {
    extensions_dir: PathBuf,
}

impl LocalInventory {
    /// Create an inventory over `extensions_dir`
    pub fn new(extensions_dir: impl Into<PathBuf>) -> Self {
        Self {
            extensions_dir: extensions_dir.into(),
        }
    }

    /// The scanned directory
    pub fn extensions_dir(&self) -> &Path {
        &self.extensions_dir
    }

    /// Scan every extension directory, no exclusions applied
    fn scan(&self) -> Result<Vec<ExtensionRecord>, SyncError> {
        if !self.extensions_dir.exists() {
            debug!(
                "Extensions directory {:?} does not exist; nothing installed",
                self.extensions_dir
            );
            return Ok(Vec::new());
        }

        let obsolete =
            ObsoleteLedger::new(self.extensions_dir.join(OBSOLETE_FILE_NAME)).read_entries();

        let entries = fs::read_dir(&self.extensions_dir).map_err(|e| {
            SyncError::inventory(format!(
                "cannot read {}: {}",
                self.extensions_dir.display(),
                e
            ))
        })?;

        let mut records = Vec::new();
        for entry in entries {
            let entry = entry.map_err(SyncError::inventory)?;
            let path = entry.path();
            if !path.is_dir() {
                continue;
            }

            let dir_name = entry.file_name().to_string_lossy().to_string();
            if dir_name.starts_with('.') {
                continue;
            }
            if obsolete
                .as_ref()
                .is_some_and(|map| map.get(&dir_name).copied().unwrap_or(false))
            {
                debug!("Skipping {} (flagged obsolete)", dir_name);
                continue;
            }

            match Self::read_manifest(&path) {
                Some(manifest) => {
                    if manifest.metadata.is_some_and(|m| m.is_builtin) {
                        debug!("Skipping built-in extension in {}", dir_name);
                        continue;
                    }
                    records.push(
                        ExtensionRecord::new(manifest.publisher, manifest.name, manifest.version)
                            .with_install_path(path),
                    );
                }
                None => debug!("Skipping {} (no readable package.json)", dir_name),
            }
        }

        records.sort_by(|a, b| a.key().cmp(&b.key()));
        Ok(records)
    }

    fn read_manifest(dir: &Path) -> Option<PackageManifest> {
        let content = fs::read_to_string(dir.join("package.json")).ok()?;
        match serde_json::from_str(&content) {
            Ok(manifest) => Some(manifest),
            Err(e) => {
                warn!("Ignoring malformed package.json in {:?}: {}", dir, e);
                None
            }
        }
    }
}

impl InventoryReader for LocalInventory {
    fn list_installed(
        &self,
        excluded_patterns: &[String],
    ) -> Result<Vec<ExtensionRecord>, SyncError> {
        let filter = ExclusionFilter::new(excluded_patterns).map_err(SyncError::inventory)?;
        let records = self.scan()?;

        Ok(records
            .into_iter()
            .filter(|record| {
                let excluded = filter.is_excluded(&record.id);
                if excluded {
                    debug!("{} matches an exclusion pattern", record.id);
                }
                !excluded
            })
            .collect())
    }

    fn find_by_id(&self, id: &str) -> Result<Option<ExtensionRecord>, SyncError> {
        let key = id_key(id);
        // Stale side-by-side versions can coexist; report the newest
        Ok(self
            .scan()?
            .into_iter()
            .filter(|record| record.key() == key)
            .max_by(|a, b| compare_versions(&a.version, &b.version)))
    }

    fn resolve_install_path(&self, record: &ExtensionRecord) -> PathBuf {
        match self.find_by_id(&record.id) {
            Ok(Some(live)) => {
                if let Some(path) = live.install_path {
                    return path;
                }
            }
            Ok(None) => {}
            Err(e) => warn!("Could not look up {}: {}", record.id, e),
        }

        record
            .install_path
            .clone()
            .unwrap_or_else(|| self.install_target(record))
    }

    fn install_target(&self, record: &ExtensionRecord) -> PathBuf {
        self.extensions_dir.join(record.dir_name())
    }
}
