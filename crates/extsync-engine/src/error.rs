//! Error types for the synchronization engine
//!
//! `Download`, `Extract`, `State` and `Uninstall` are item-level: the
//! pipeline records them against the failing extension and carries on.
//! `Inventory` aborts a run before any stage starts. `Query` never leaves
//! the diff.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while converging one extension set onto another
#[derive(Error, Debug)]
pub enum SyncError {
    /// Network transfer or temporary file failure
    #[error("Failed to download {id}: {message}")]
    Download { id: String, message: String },

    /// Corrupt archive or extraction I/O failure
    #[error("Failed to extract {id}: {message}")]
    Extract { id: String, message: String },

    /// Precondition violated (e.g. install without a downloaded archive)
    #[error("Invalid state for {id}: {message}")]
    State { id: String, message: String },

    /// Install directory could not be removed
    #[error("Failed to uninstall {id} from {}: {source}", .path.display())]
    Uninstall {
        id: String,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Installed extensions could not be enumerated
    #[error("Failed to read installed extensions: {0}")]
    Inventory(String),

    /// Registry metadata query failed
    #[error("Extension registry query failed: {0}")]
    Query(String),
}

impl SyncError {
    /// Create a download error
    pub fn download(id: impl Into<String>, message: impl std::fmt::Display) -> Self {
        Self::Download {
            id: id.into(),
            message: message.to_string(),
        }
    }

    /// Create an extract error
    pub fn extract(id: impl Into<String>, message: impl std::fmt::Display) -> Self {
        Self::Extract {
            id: id.into(),
            message: message.to_string(),
        }
    }

    /// Create a state error
    pub fn state(id: impl Into<String>, message: impl std::fmt::Display) -> Self {
        Self::State {
            id: id.into(),
            message: message.to_string(),
        }
    }

    /// Create an uninstall error
    pub fn uninstall(id: impl Into<String>, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Uninstall {
            id: id.into(),
            path: path.into(),
            source,
        }
    }

    /// Create an inventory error
    pub fn inventory(message: impl std::fmt::Display) -> Self {
        Self::Inventory(message.to_string())
    }

    /// Create a query error
    pub fn query(message: impl std::fmt::Display) -> Self {
        Self::Query(message.to_string())
    }

    /// Short kind label used in summaries
    pub fn kind(&self) -> &'static str {
        match self {
            SyncError::Download { .. } => "download",
            SyncError::Extract { .. } => "extract",
            SyncError::State { .. } => "state",
            SyncError::Uninstall { .. } => "uninstall",
            SyncError::Inventory(_) => "inventory",
            SyncError::Query(_) => "query",
        }
    }
}
