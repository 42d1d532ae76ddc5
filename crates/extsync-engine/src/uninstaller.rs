//! Extension removal

use crate::error::SyncError;
use crate::inventory::InventoryReader;
use extsync_core::types::ExtensionRecord;
use std::io::ErrorKind;
use std::sync::Arc;
use tracing::{debug, info};

/// Removes installed extension directories
pub struct Uninstaller {
    inventory: Arc<dyn InventoryReader>,
}

impl Uninstaller {
    pub fn new(inventory: Arc<dyn InventoryReader>) -> Self {
        Self { inventory }
    }

    /// Remove the directory `record` is installed in.
    ///
    /// The live path reported by the inventory wins over the computed
    /// default. A directory that is already gone counts as removed.
    pub async fn uninstall(&self, mut record: ExtensionRecord) -> Result<ExtensionRecord, SyncError> {
        let path = self.inventory.resolve_install_path(&record);
        debug!("Removing {} from {}", record, path.display());

        match tokio::fs::remove_dir_all(&path).await {
            Ok(()) => info!("Uninstalled {}", record),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("{} already absent at {}", record, path.display());
            }
            Err(e) => return Err(SyncError::uninstall(&record.id, path, e)),
        }

        record.install_path = Some(path);
        Ok(record)
    }
}
