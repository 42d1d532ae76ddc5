//! Extension synchronization engine
//!
//! This crate handles:
//! - Reading the locally installed extension inventory
//! - Querying the extension registry for latest versions
//! - Diffing a desired extension list against the installed set
//! - Downloading, installing and uninstalling extension packages
//! - Maintaining the obsolete ledger consumed by the host after restart
//! - Running the add/update/remove convergence pipeline

pub mod diff;
pub mod error;
pub mod fetcher;
pub mod gallery;
pub mod http;
pub mod installer;
pub mod inventory;
pub mod obsolete;
pub mod pipeline;
pub mod progress;
pub mod uninstaller;

pub use diff::{DiffEngine, DiffResult};
pub use error::SyncError;
pub use fetcher::{FetchedPackage, PackageFetcher};
pub use gallery::{GalleryClient, MetadataQuery, RemoteMetadata};
pub use installer::PackageInstaller;
pub use inventory::{ExclusionFilter, InventoryReader, LocalInventory};
pub use obsolete::{LedgerOutcome, ObsoleteLedger};
pub use pipeline::{ExtensionSyncEngine, FailedSync, SyncOutcome, SyncPhase, SyncReport};
pub use progress::{NoopProgress, ProgressReporter};
pub use uninstaller::Uninstaller;
