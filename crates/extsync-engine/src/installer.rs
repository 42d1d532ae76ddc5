//! Package installation
//!
//! The archive is unpacked into a scratch directory first. Its payload
//! directory (conventionally `extension/`) then replaces the contents of the
//! target directory: the target is emptied and the payload copied in, so an
//! existing directory with stale files ends up matching the archive exactly.
//! An interruption between the two steps leaves the target empty; the next
//! sync reinstalls it.

use crate::error::SyncError;
use extsync_core::types::ExtensionRecord;
use std::fs::{self, File};
use std::io;
use std::path::Path;
use tracing::{debug, info};
use walkdir::WalkDir;
use zip::ZipArchive;

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

/// Installs downloaded packages into their target directory
#[derive(Debug, Clone)]
pub struct PackageInstaller {
    payload_dir: String,
}

impl Default for PackageInstaller {
    fn default() -> Self {
        Self::new("extension")
    }
}

impl PackageInstaller {
    /// Create an installer expecting `payload_dir` at the archive root
    pub fn new(payload_dir: impl Into<String>) -> Self {
        Self {
            payload_dir: payload_dir.into(),
        }
    }

    /// Replace `target_dir`'s contents with the record's downloaded payload
    pub fn install(
        &self,
        mut record: ExtensionRecord,
        target_dir: &Path,
    ) -> Result<ExtensionRecord, SyncError> {
        let archive_path = record
            .archive_path
            .clone()
            .ok_or_else(|| SyncError::state(&record.id, "no downloaded archive to install"))?;

        let scratch = tempfile::Builder::new()
            .prefix("extsync-extract-")
            .tempdir()
            .map_err(|e| {
                SyncError::extract(&record.id, format!("cannot create scratch directory: {}", e))
            })?;

        extract_archive(&archive_path, scratch.path())
            .map_err(|e| SyncError::extract(&record.id, e))?;

        let payload = scratch.path().join(&self.payload_dir);
        if !payload.is_dir() {
            return Err(SyncError::extract(
                &record.id,
                format!("archive has no '{}' directory", self.payload_dir),
            ));
        }

        empty_dir(target_dir).map_err(|e| {
            SyncError::extract(
                &record.id,
                format!("cannot clear {}: {}", target_dir.display(), e),
            )
        })?;
        copy_dir_contents(&payload, target_dir).map_err(|e| {
            SyncError::extract(
                &record.id,
                format!("cannot copy into {}: {}", target_dir.display(), e),
            )
        })?;

        info!("Installed {} into {}", record, target_dir.display());
        record.install_path = Some(target_dir.to_path_buf());
        Ok(record)
    }
}

/// Unpack a zip archive, skipping entries that would escape `dest`
fn extract_archive(archive_path: &Path, dest: &Path) -> anyhow::Result<()> {
    let file = File::open(archive_path)?;
    let mut archive = ZipArchive::new(file)?;

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i)?;
        let Some(enclosed) = entry.enclosed_name().map(|p| dest.join(p)) else {
            debug!("Skipping unsafe archive entry {}", entry.name());
            continue;
        };
        if entry.is_dir() {
            fs::create_dir_all(&enclosed)?;
            continue;
        }
        if let Some(parent) = enclosed.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut outfile = File::create(&enclosed)?;
        io::copy(&mut entry, &mut outfile)?;
        #[cfg(unix)]
        {
            if let Some(mode) = entry.unix_mode() {
                fs::set_permissions(&enclosed, fs::Permissions::from_mode(mode))?;
            }
        }
    }

    Ok(())
}

/// Remove everything inside `dir`, creating it when missing
fn empty_dir(dir: &Path) -> io::Result<()> {
    if !dir.exists() {
        return fs::create_dir_all(dir);
    }

    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_type()?.is_dir() {
            fs::remove_dir_all(entry.path())?;
        } else {
            fs::remove_file(entry.path())?;
        }
    }
    Ok(())
}

/// Copy the tree under `src` into `dest`
fn copy_dir_contents(src: &Path, dest: &Path) -> anyhow::Result<()> {
    for entry in WalkDir::new(src).min_depth(1) {
        let entry = entry?;
        let relative = entry.path().strip_prefix(src)?;
        let target = dest.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else if entry.file_type().is_file() {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}
