//! Obsolete ledger
//!
//! A flat JSON object at `<extensions_dir>/.obsolete` mapping install
//! directory names to `true`. The host deletes flagged directories on its
//! next start. The ledger is only ever touched when it already exists, and
//! the file is removed rather than left as `{}` once no entries remain.

use anyhow::{Context, Result};
use extsync_core::types::ExtensionRecord;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// What a reconcile pass did to the ledger file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerOutcome {
    /// No (readable) ledger present; nothing touched
    Skipped,
    /// Ledger rewritten with this many entries
    Written { entries: usize },
    /// Ledger emptied and deleted
    Deleted,
}

/// Obsolete ledger manager
pub struct ObsoleteLedger {
    ledger_path: PathBuf,
}

impl ObsoleteLedger {
    /// Create a ledger manager for a custom path
    pub fn new(ledger_path: impl Into<PathBuf>) -> Self {
        Self {
            ledger_path: ledger_path.into(),
        }
    }

    /// Ledger file location
    pub fn path(&self) -> &Path {
        &self.ledger_path
    }

    /// Current entries, or `None` when the ledger is missing or unparsable
    pub fn read_entries(&self) -> Option<BTreeMap<String, bool>> {
        let content = fs::read_to_string(&self.ledger_path).ok()?;
        match serde_json::from_str(&content) {
            Ok(entries) => Some(entries),
            Err(e) => {
                debug!(
                    "Ignoring unparsable obsolete ledger {:?}: {}",
                    self.ledger_path, e
                );
                None
            }
        }
    }

    /// Clear entries for extensions now present and flag removed ones.
    ///
    /// Best-effort: the caller logs an `Err` and carries on; a failed write
    /// only means the host may clean up one restart later, or not at all.
    pub fn reconcile(
        &self,
        added: &[ExtensionRecord],
        updated: &[ExtensionRecord],
        removed: &[ExtensionRecord],
    ) -> Result<LedgerOutcome> {
        let Some(mut entries) = self.read_entries() else {
            debug!("No obsolete ledger at {:?}; skipping", self.ledger_path);
            return Ok(LedgerOutcome::Skipped);
        };

        for record in added.iter().chain(updated) {
            entries.remove(&ledger_key(record));
        }
        for record in removed {
            entries.insert(ledger_key(record), true);
        }
        entries.retain(|_, flagged| *flagged);

        if entries.is_empty() {
            fs::remove_file(&self.ledger_path).with_context(|| {
                format!("Failed to delete obsolete ledger {:?}", self.ledger_path)
            })?;
            info!("Obsolete ledger emptied; removed {:?}", self.ledger_path);
            return Ok(LedgerOutcome::Deleted);
        }

        let json = serde_json::to_string(&entries).context("Failed to serialize obsolete ledger")?;
        fs::write(&self.ledger_path, json)
            .with_context(|| format!("Failed to write obsolete ledger {:?}", self.ledger_path))?;
        debug!("Obsolete ledger now has {} entries", entries.len());

        Ok(LedgerOutcome::Written {
            entries: entries.len(),
        })
    }
}

/// Ledger key for a record: its actual directory name when known
fn ledger_key(record: &ExtensionRecord) -> String {
    record
        .install_path
        .as_ref()
        .and_then(|path| path.file_name())
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| record.dir_name())
}
