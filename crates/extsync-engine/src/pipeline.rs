//! Convergence pipeline
//!
//! Applies a [`DiffResult`] in three strictly ordered stages: add, update,
//! remove. Items are processed one at a time; a failing item is recorded
//! with the sub-step it failed in and the stage moves on. Once every stage
//! has run the obsolete ledger is reconciled with the successful items.

use crate::diff::{DiffEngine, DiffResult};
use crate::error::SyncError;
use crate::fetcher::PackageFetcher;
use crate::gallery::MetadataQuery;
use crate::installer::PackageInstaller;
use crate::inventory::InventoryReader;
use crate::obsolete::{LedgerOutcome, ObsoleteLedger};
use crate::progress::{NoopProgress, ProgressReporter};
use crate::uninstaller::Uninstaller;
use extsync_core::types::{ExtensionRecord, SyncConfig};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Sub-step an item failed in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncPhase {
    Download,
    Uninstall,
    Install,
}

impl std::fmt::Display for SyncPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SyncPhase::Download => write!(f, "Download"),
            SyncPhase::Uninstall => write!(f, "Uninstall"),
            SyncPhase::Install => write!(f, "Install"),
        }
    }
}

/// An item that did not converge
#[derive(Debug)]
pub struct FailedSync {
    /// The record as it entered the stage
    pub record: ExtensionRecord,
    pub phase: SyncPhase,
    pub error: SyncError,
}

/// Result of one stage; `succeeded` and `failed` partition its input
#[derive(Debug, Default)]
pub struct SyncOutcome {
    pub succeeded: Vec<ExtensionRecord>,
    pub failed: Vec<FailedSync>,
}

impl SyncOutcome {
    /// Number of items the stage processed
    pub fn len(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn fail(&mut self, record: ExtensionRecord, phase: SyncPhase, error: SyncError) {
        warn!(
            "{} failed during {}: {} (continuing...)",
            record, phase, error
        );
        self.failed.push(FailedSync {
            record,
            phase,
            error,
        });
    }
}

/// Result of a whole sync run
#[derive(Debug, Default)]
pub struct SyncReport {
    pub added: SyncOutcome,
    pub updated: SyncOutcome,
    pub removed: SyncOutcome,
    /// What happened to the obsolete ledger; `None` when reconciling failed
    pub ledger: Option<LedgerOutcome>,
}

impl SyncReport {
    /// Check if every item converged
    pub fn is_success(&self) -> bool {
        self.total_failed() == 0
    }

    /// Check if some items converged and some did not
    pub fn is_partial(&self) -> bool {
        self.total_succeeded() > 0 && self.total_failed() > 0
    }

    pub fn total_succeeded(&self) -> usize {
        self.added.succeeded.len() + self.updated.succeeded.len() + self.removed.succeeded.len()
    }

    pub fn total_failed(&self) -> usize {
        self.added.failed.len() + self.updated.failed.len() + self.removed.failed.len()
    }

    /// Every failure, tagged with its stage name
    pub fn failures(&self) -> impl Iterator<Item = (&'static str, &FailedSync)> {
        self.added
            .failed
            .iter()
            .map(|f| ("added", f))
            .chain(self.updated.failed.iter().map(|f| ("updated", f)))
            .chain(self.removed.failed.iter().map(|f| ("removed", f)))
    }
}

/// Step counter shared by all three stages
struct StepCounter<'a> {
    reporter: &'a dyn ProgressReporter,
    current: usize,
    total: usize,
}

impl StepCounter<'_> {
    fn next_item(&mut self) {
        self.current += 1;
    }

    fn step(&self, message: &str) {
        self.reporter.show_step(message, self.current, self.total);
    }
}

/// Drives a desired extension list to convergence
pub struct ExtensionSyncEngine {
    config: SyncConfig,
    inventory: Arc<dyn InventoryReader>,
    query: Arc<dyn MetadataQuery>,
    fetcher: PackageFetcher,
    installer: PackageInstaller,
    uninstaller: Uninstaller,
    ledger: ObsoleteLedger,
    progress: Arc<dyn ProgressReporter>,
}

impl ExtensionSyncEngine {
    /// Create an engine wired from configuration
    pub fn new(
        config: SyncConfig,
        inventory: Arc<dyn InventoryReader>,
        query: Arc<dyn MetadataQuery>,
    ) -> anyhow::Result<Self> {
        let fetcher = PackageFetcher::new(&config)?;
        let installer = PackageInstaller::new(config.gallery.payload_dir.clone());
        let ledger = ObsoleteLedger::new(config.obsolete_ledger_path()?);

        Ok(Self {
            uninstaller: Uninstaller::new(Arc::clone(&inventory)),
            config,
            inventory,
            query,
            fetcher,
            installer,
            ledger,
            progress: Arc::new(NoopProgress),
        })
    }

    /// Report steps to `progress` when a sync runs with progress enabled
    pub fn with_progress(mut self, progress: Arc<dyn ProgressReporter>) -> Self {
        self.progress = progress;
        self
    }

    /// Replace the package fetcher
    pub fn with_fetcher(mut self, fetcher: PackageFetcher) -> Self {
        self.fetcher = fetcher;
        self
    }

    /// Replace the obsolete ledger location
    pub fn with_ledger(mut self, ledger: ObsoleteLedger) -> Self {
        self.ledger = ledger;
        self
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Classify `desired` against the installed set using the configured
    /// exclusions and auto-update setting
    pub async fn compute_diff(&self, desired: &[ExtensionRecord]) -> Result<DiffResult, SyncError> {
        DiffEngine::new(
            self.inventory.as_ref(),
            self.query.as_ref(),
            self.config.auto_update_extensions,
        )
        .compute(desired, &self.config.excluded_extension_patterns)
        .await
    }

    /// Converge the installed set onto `desired`.
    ///
    /// Only an unreadable inventory fails the run; item failures are in the
    /// returned report.
    pub async fn sync(
        &self,
        desired: &[ExtensionRecord],
        show_progress: bool,
    ) -> Result<SyncReport, SyncError> {
        let diff = self.compute_diff(desired).await?;
        Ok(self.apply(diff, show_progress).await)
    }

    /// Run the add, update and remove stages for an already computed diff
    pub async fn apply(&self, diff: DiffResult, show_progress: bool) -> SyncReport {
        let noop = NoopProgress;
        let reporter: &dyn ProgressReporter = if show_progress {
            self.progress.as_ref()
        } else {
            &noop
        };
        let mut counter = StepCounter {
            reporter,
            current: 0,
            total: diff.total(),
        };

        info!(
            "Synchronizing {} extensions ({} add, {} update, {} remove)",
            counter.total,
            diff.added.len(),
            diff.updated.len(),
            diff.removed.len()
        );

        let mut report = SyncReport::default();

        for record in diff.added {
            counter.next_item();
            match self.add_one(record.clone(), &counter).await {
                Ok(installed) => report.added.succeeded.push(installed),
                Err((phase, e)) => report.added.fail(record, phase, e),
            }
        }

        for record in diff.updated {
            counter.next_item();
            match self.update_one(record.clone(), &counter).await {
                Ok(installed) => report.updated.succeeded.push(installed),
                Err((phase, e)) => report.updated.fail(record, phase, e),
            }
        }

        for record in diff.removed {
            counter.next_item();
            counter.step(&format!("Uninstalling {}", record));
            match self.uninstaller.uninstall(record.clone()).await {
                Ok(removed) => report.removed.succeeded.push(removed),
                Err(e) => report.removed.fail(record, SyncPhase::Uninstall, e),
            }
        }

        reporter.clear();

        report.ledger = match self.ledger.reconcile(
            &report.added.succeeded,
            &report.updated.succeeded,
            &report.removed.succeeded,
        ) {
            Ok(outcome) => {
                debug!("Obsolete ledger: {:?}", outcome);
                Some(outcome)
            }
            Err(e) => {
                warn!("Failed to update obsolete ledger: {:#}", e);
                None
            }
        };

        if report.is_success() {
            info!("Extensions synchronized ({} changes)", report.total_succeeded());
        } else {
            warn!(
                "Extension sync finished with failures: {} succeeded, {} failed",
                report.total_succeeded(),
                report.total_failed()
            );
        }

        report
    }

    async fn add_one(
        &self,
        record: ExtensionRecord,
        counter: &StepCounter<'_>,
    ) -> Result<ExtensionRecord, (SyncPhase, SyncError)> {
        counter.step(&format!("Downloading {}", record));
        let package = self
            .fetcher
            .fetch(record)
            .await
            .map_err(|e| (SyncPhase::Download, e))?;

        counter.step(&format!("Installing {}", package.record));
        let target = self.inventory.install_target(&package.record);
        let installed = self
            .install_blocking(package.record.clone(), target)
            .await
            .map_err(|e| (SyncPhase::Install, e))?;

        Ok(strip_archive(installed))
    }

    async fn update_one(
        &self,
        record: ExtensionRecord,
        counter: &StepCounter<'_>,
    ) -> Result<ExtensionRecord, (SyncPhase, SyncError)> {
        counter.step(&format!("Downloading {}", record));
        let package = self
            .fetcher
            .fetch(record)
            .await
            .map_err(|e| (SyncPhase::Download, e))?;

        counter.step(&format!("Uninstalling previous {}", package.record.id));
        self.uninstaller
            .uninstall(package.record.clone())
            .await
            .map_err(|e| (SyncPhase::Uninstall, e))?;

        counter.step(&format!("Installing {}", package.record));
        let target = self.inventory.install_target(&package.record);
        let installed = self
            .install_blocking(package.record.clone(), target)
            .await
            .map_err(|e| (SyncPhase::Install, e))?;

        Ok(strip_archive(installed))
    }

    /// Extraction and copying are blocking filesystem work; keep them off the
    /// async workers. The caller's `FetchedPackage` keeps the archive alive.
    async fn install_blocking(
        &self,
        record: ExtensionRecord,
        target: PathBuf,
    ) -> Result<ExtensionRecord, SyncError> {
        let installer = self.installer.clone();
        let id = record.id.clone();
        tokio::task::spawn_blocking(move || installer.install(record, &target))
            .await
            .map_err(|e| SyncError::extract(id, format!("install task failed: {}", e)))?
    }
}

/// The archive is deleted with its [`crate::fetcher::FetchedPackage`]
fn strip_archive(mut record: ExtensionRecord) -> ExtensionRecord {
    record.archive_path = None;
    record
}
