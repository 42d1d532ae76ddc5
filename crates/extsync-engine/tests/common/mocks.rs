//! Mock collaborators for engine tests

use async_trait::async_trait;
use extsync_core::types::{id_key, ExtensionRecord};
use extsync_engine::{
    ExclusionFilter, InventoryReader, MetadataQuery, ProgressReporter, RemoteMetadata, SyncError,
};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Inventory held in memory; paths are conventional under `root`
pub struct MockInventory {
    root: PathBuf,
    installed: Mutex<Vec<ExtensionRecord>>,
    list_calls: AtomicUsize,
}

impl MockInventory {
    pub fn new(installed: Vec<ExtensionRecord>) -> Self {
        Self::with_root("/exts", installed)
    }

    pub fn with_root(root: impl Into<PathBuf>, installed: Vec<ExtensionRecord>) -> Self {
        Self {
            root: root.into(),
            installed: Mutex::new(installed),
            list_calls: AtomicUsize::new(0),
        }
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }
}

impl InventoryReader for MockInventory {
    fn list_installed(
        &self,
        excluded_patterns: &[String],
    ) -> Result<Vec<ExtensionRecord>, SyncError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        let filter = ExclusionFilter::new(excluded_patterns).map_err(SyncError::inventory)?;
        Ok(self
            .installed
            .lock()
            .unwrap()
            .iter()
            .filter(|r| !filter.is_excluded(&r.id))
            .cloned()
            .collect())
    }

    fn find_by_id(&self, id: &str) -> Result<Option<ExtensionRecord>, SyncError> {
        Ok(self
            .installed
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.matches_id(id))
            .cloned())
    }

    fn resolve_install_path(&self, record: &ExtensionRecord) -> PathBuf {
        self.find_by_id(&record.id)
            .ok()
            .flatten()
            .and_then(|r| r.install_path)
            .unwrap_or_else(|| self.install_target(record))
    }

    fn install_target(&self, record: &ExtensionRecord) -> PathBuf {
        self.root.join(record.dir_name())
    }
}

/// Inventory that cannot be read
pub struct BrokenInventory;

impl InventoryReader for BrokenInventory {
    fn list_installed(&self, _: &[String]) -> Result<Vec<ExtensionRecord>, SyncError> {
        Err(SyncError::inventory("permission denied"))
    }

    fn find_by_id(&self, _: &str) -> Result<Option<ExtensionRecord>, SyncError> {
        Err(SyncError::inventory("permission denied"))
    }

    fn resolve_install_path(&self, record: &ExtensionRecord) -> PathBuf {
        PathBuf::from("/exts").join(record.dir_name())
    }

    fn install_target(&self, record: &ExtensionRecord) -> PathBuf {
        PathBuf::from("/exts").join(record.dir_name())
    }
}

/// Registry returning canned metadata and counting queries
#[derive(Default)]
pub struct StaticQuery {
    latest: HashMap<String, RemoteMetadata>,
    calls: AtomicUsize,
}

impl StaticQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry knows `id` at `version`, downloadable from `url`
    pub fn with(mut self, id: &str, version: &str, url: &str) -> Self {
        self.latest.insert(
            id_key(id),
            RemoteMetadata {
                version: Some(version.to_string()),
                download_url: Some(url.to_string()),
            },
        );
        self
    }

    /// Registry knows `id` but returns incomplete metadata
    pub fn with_partial(mut self, id: &str, version: Option<&str>, url: Option<&str>) -> Self {
        self.latest.insert(
            id_key(id),
            RemoteMetadata {
                version: version.map(str::to_string),
                download_url: url.map(str::to_string),
            },
        );
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MetadataQuery for StaticQuery {
    async fn query_latest(
        &self,
        ids: &[String],
    ) -> Result<HashMap<String, RemoteMetadata>, SyncError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(ids
            .iter()
            .filter_map(|id| {
                let key = id_key(id);
                self.latest.get(&key).map(|m| (key, m.clone()))
            })
            .collect())
    }
}

/// Registry that is unreachable
pub struct FailingQuery;

#[async_trait]
impl MetadataQuery for FailingQuery {
    async fn query_latest(
        &self,
        _: &[String],
    ) -> Result<HashMap<String, RemoteMetadata>, SyncError> {
        Err(SyncError::query("connection refused"))
    }
}

/// Progress reporter recording every call
#[derive(Default)]
pub struct RecordingProgress {
    steps: Mutex<Vec<(String, usize, usize)>>,
    clears: AtomicUsize,
}

impl RecordingProgress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn steps(&self) -> Vec<(String, usize, usize)> {
        self.steps.lock().unwrap().clone()
    }

    pub fn clears(&self) -> usize {
        self.clears.load(Ordering::SeqCst)
    }
}

impl ProgressReporter for RecordingProgress {
    fn show_step(&self, message: &str, current: usize, total: usize) {
        self.steps
            .lock()
            .unwrap()
            .push((message.to_string(), current, total));
    }

    fn clear(&self) {
        self.clears.fetch_add(1, Ordering::SeqCst);
    }
}
