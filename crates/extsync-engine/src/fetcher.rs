//! Package download
//!
//! Each package is streamed into its own uniquely named temporary file. The
//! file belongs to the returned [`FetchedPackage`] and is deleted when that
//! handle is dropped, whichever way the caller leaves the install step.

use crate::error::SyncError;
use crate::http;
use extsync_core::types::{ExtensionRecord, GalleryConfig, SyncConfig};
use futures_util::StreamExt;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::TempPath;
use tracing::{debug, info};
use url::Url;

/// A downloaded package; the archive lives as long as this value
#[derive(Debug)]
pub struct FetchedPackage {
    /// The record, with `archive_path` pointing at the temporary archive
    pub record: ExtensionRecord,
    archive: TempPath,
}

impl FetchedPackage {
    /// Path of the downloaded archive
    pub fn archive_path(&self) -> &Path {
        &self.archive
    }
}

/// Downloads extension packages
pub struct PackageFetcher {
    client: reqwest::Client,
    gallery: GalleryConfig,
    temp_dir: Option<PathBuf>,
}

impl PackageFetcher {
    /// Create a fetcher from configuration (proxy, download timeout, fallback URL)
    pub fn new(config: &SyncConfig) -> anyhow::Result<Self> {
        Ok(Self {
            client: http::download_client(config)?,
            gallery: config.gallery.clone(),
            temp_dir: None,
        })
    }

    /// Create a fetcher around an existing client
    pub fn with_client(client: reqwest::Client, gallery: GalleryConfig) -> Self {
        Self {
            client,
            gallery,
            temp_dir: None,
        }
    }

    /// Place temporary archives in `dir` instead of the system temp directory
    pub fn with_temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = Some(dir.into());
        self
    }

    /// URL the package will be fetched from
    pub fn download_url(&self, record: &ExtensionRecord) -> String {
        match &record.download_url {
            Some(url) => url.clone(),
            None => self
                .gallery
                .fallback_url(&record.publisher, &record.name, &record.version),
        }
    }

    /// Download `record`'s package into a scoped temporary file
    pub async fn fetch(&self, mut record: ExtensionRecord) -> Result<FetchedPackage, SyncError> {
        let url = self.download_url(&record);
        let parsed = Url::parse(&url).map_err(|e| {
            SyncError::download(&record.id, format!("invalid package URL '{}': {}", url, e))
        })?;
        info!("Downloading {} from {}", record, url);

        let mut builder = tempfile::Builder::new();
        builder.prefix("extsync-").suffix(".vsix");
        let temp_file = match &self.temp_dir {
            Some(dir) => builder.tempfile_in(dir),
            None => builder.tempfile(),
        }
        .map_err(|e| {
            SyncError::download(&record.id, format!("cannot create temporary file: {}", e))
        })?;
        let (mut file, archive) = temp_file.into_parts();

        let response = self
            .client
            .get(parsed)
            .send()
            .await
            .map_err(|e| SyncError::download(&record.id, e))?;

        if !response.status().is_success() {
            return Err(SyncError::download(
                &record.id,
                format!("server responded with status {}", response.status()),
            ));
        }

        let mut downloaded: u64 = 0;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| SyncError::download(&record.id, e))?;
            file.write_all(&chunk).map_err(|e| {
                SyncError::download(&record.id, format!("cannot write temporary file: {}", e))
            })?;
            downloaded += chunk.len() as u64;
        }
        file.flush()
            .map_err(|e| SyncError::download(&record.id, e))?;

        debug!("Downloaded {} bytes to {:?}", downloaded, &*archive);

        if record.download_url.is_none() {
            record.download_url = Some(url);
        }
        record.archive_path = Some(archive.to_path_buf());

        Ok(FetchedPackage { record, archive })
    }
}
