//! Desired-versus-installed classification
//!
//! Every desired extension lands in exactly one of `added`, `updated` or
//! `reserved`. Installed extensions that are not desired and do not match an
//! exclusion pattern land in `removed`. Exclusions only protect from removal;
//! an excluded extension that is desired is still added or updated.

use crate::error::SyncError;
use crate::gallery::MetadataQuery;
use crate::inventory::{compare_versions, InventoryReader};
use extsync_core::types::ExtensionRecord;
use serde::Serialize;
use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};
use tracing::{debug, info, warn};

/// Classification of one desired list against the installed set
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DiffResult {
    /// Desired, not installed
    pub added: Vec<ExtensionRecord>,
    /// Desired and installed at a different version
    pub updated: Vec<ExtensionRecord>,
    /// Installed, not desired, not excluded
    pub removed: Vec<ExtensionRecord>,
    /// Desired and installed at the same version; nothing to do
    pub reserved: Vec<ExtensionRecord>,
}

impl DiffResult {
    /// Number of items the pipeline will act on
    pub fn total(&self) -> usize {
        self.added.len() + self.updated.len() + self.removed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

/// Computes a [`DiffResult`]
pub struct DiffEngine<'a> {
    inventory: &'a dyn InventoryReader,
    query: &'a dyn MetadataQuery,
    auto_update: bool,
}

impl<'a> DiffEngine<'a> {
    pub fn new(
        inventory: &'a dyn InventoryReader,
        query: &'a dyn MetadataQuery,
        auto_update: bool,
    ) -> Self {
        Self {
            inventory,
            query,
            auto_update,
        }
    }

    /// Classify `desired` against what is installed.
    ///
    /// Only an unreadable inventory is an error; registry failures degrade to
    /// "no update available".
    pub async fn compute(
        &self,
        desired: &[ExtensionRecord],
        excluded_patterns: &[String],
    ) -> Result<DiffResult, SyncError> {
        let mut desired = dedupe(desired);

        if self.auto_update {
            let remote = self.latest_metadata(&desired).await;
            for record in desired.iter_mut() {
                let Some(meta) = remote.get(&record.key()) else {
                    continue;
                };
                if let (Some(version), Some(url)) = (&meta.version, &meta.download_url) {
                    if *version != record.version {
                        debug!("{}: registry has {}", record, version);
                    }
                    record.version = version.clone();
                    record.download_url = Some(url.clone());
                }
            }
        }

        // Side-by-side versions of one id: the newest is the live one
        let mut installed: HashMap<String, ExtensionRecord> = HashMap::new();
        for record in self.inventory.list_installed(&[])? {
            match installed.entry(record.key()) {
                Entry::Occupied(mut current) => {
                    if compare_versions(&record.version, &current.get().version).is_gt() {
                        current.insert(record);
                    }
                }
                Entry::Vacant(slot) => {
                    slot.insert(record);
                }
            }
        }

        let mut result = DiffResult::default();
        let mut desired_keys = HashSet::new();
        for record in desired {
            desired_keys.insert(record.key());
            match installed.get(&record.key()) {
                None => result.added.push(record),
                Some(current) if current.version == record.version => {
                    result.reserved.push(record)
                }
                Some(current) => {
                    debug!("{} installed at {}", record, current.version);
                    result.updated.push(record);
                }
            }
        }

        result.removed = self
            .inventory
            .list_installed(excluded_patterns)?
            .into_iter()
            .filter(|record| !desired_keys.contains(&record.key()))
            .collect();

        info!(
            "Extension diff: {} to add, {} to update, {} to remove, {} unchanged",
            result.added.len(),
            result.updated.len(),
            result.removed.len(),
            result.reserved.len()
        );
        Ok(result)
    }

    async fn latest_metadata(
        &self,
        desired: &[ExtensionRecord],
    ) -> HashMap<String, crate::gallery::RemoteMetadata> {
        let ids: Vec<String> = desired.iter().map(|r| r.id.clone()).collect();
        match self.query.query_latest(&ids).await {
            Ok(remote) => remote,
            Err(e) => {
                warn!("{}; continuing without updates", e);
                HashMap::new()
            }
        }
    }
}

/// Collapse duplicate ids: the first occurrence keeps its position, the
/// last occurrence supplies the data
fn dedupe(desired: &[ExtensionRecord]) -> Vec<ExtensionRecord> {
    let mut position: HashMap<String, usize> = HashMap::new();
    let mut unique: Vec<ExtensionRecord> = Vec::with_capacity(desired.len());

    for record in desired {
        match position.get(&record.key()) {
            Some(&index) => unique[index] = record.clone(),
            None => {
                position.insert(record.key(), unique.len());
                unique.push(record.clone());
            }
        }
    }
    unique
}
