//! Extension registry metadata queries
//!
//! Only used when auto-update is enabled: one batched request asks the
//! registry for the latest version and package URL of every desired id.
//! Ids the registry does not know are simply absent from the result.

use crate::error::SyncError;
use crate::http;
use async_trait::async_trait;
use extsync_core::types::{id_key, SyncConfig};
use semver::Version;
use serde::Deserialize;
use serde_json::json;
use std::collections::HashMap;
use tracing::{debug, info};

/// Filter type selecting extensions by `publisher.name`
const FILTER_EXTENSION_NAME: u32 = 7;
/// Filter type restricting results to the editor target
const FILTER_TARGET: u32 = 8;
const TARGET_EDITOR: &str = "Microsoft.VisualStudio.Code";
/// IncludeVersions | IncludeFiles | IncludeAssetUri | IncludeLatestVersionOnly
const QUERY_FLAGS: u32 = 0x1 | 0x2 | 0x80 | 0x200;
const QUERY_ACCEPT: &str = "application/json;api-version=3.0-preview.1";
const PACKAGE_ASSET_TYPE: &str = "Microsoft.VisualStudio.Services.VSIXPackage";

/// Latest-version information for one extension
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemoteMetadata {
    pub version: Option<String>,
    pub download_url: Option<String>,
}

/// Registry lookup used by the diff when auto-update is on
#[async_trait]
pub trait MetadataQuery: Send + Sync {
    /// Latest metadata keyed by lower-cased id; partial results are valid
    async fn query_latest(
        &self,
        ids: &[String],
    ) -> Result<HashMap<String, RemoteMetadata>, SyncError>;
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    results: Vec<QueryResult>,
}

#[derive(Debug, Deserialize)]
struct QueryResult {
    #[serde(default)]
    extensions: Vec<GalleryExtension>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GalleryExtension {
    extension_name: String,
    publisher: GalleryPublisher,
    #[serde(default)]
    versions: Vec<GalleryVersion>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GalleryPublisher {
    publisher_name: String,
}

#[derive(Debug, Deserialize)]
struct GalleryVersion {
    version: String,
    #[serde(default)]
    files: Vec<GalleryFile>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GalleryFile {
    asset_type: String,
    source: String,
}

impl GalleryExtension {
    fn id(&self) -> String {
        format!("{}.{}", self.publisher.publisher_name, self.extension_name)
    }

    /// Highest semver version listed, falling back to the registry's order
    fn latest(&self) -> Option<&GalleryVersion> {
        self.versions
            .iter()
            .filter_map(|v| Version::parse(&v.version).ok().map(|parsed| (parsed, v)))
            .max_by(|(a, _), (b, _)| a.cmp(b))
            .map(|(_, v)| v)
            .or_else(|| self.versions.first())
    }
}

impl GalleryVersion {
    fn package_url(&self) -> Option<String> {
        self.files
            .iter()
            .find(|f| f.asset_type == PACKAGE_ASSET_TYPE)
            .map(|f| f.source.clone())
    }
}

/// HTTP client for the extension registry's batch query endpoint
pub struct GalleryClient {
    client: reqwest::Client,
    query_url: String,
}

impl GalleryClient {
    /// Create a client from configuration (proxy, timeouts, endpoint)
    pub fn new(config: &SyncConfig) -> anyhow::Result<Self> {
        Ok(Self {
            client: http::query_client(config)?,
            query_url: config.gallery.query_url.clone(),
        })
    }

    /// Create a client with an explicit endpoint
    pub fn with_client(client: reqwest::Client, query_url: impl Into<String>) -> Self {
        Self {
            client,
            query_url: query_url.into(),
        }
    }

    fn request_body(ids: &[String]) -> serde_json::Value {
        let mut criteria: Vec<serde_json::Value> = ids
            .iter()
            .map(|id| json!({ "filterType": FILTER_EXTENSION_NAME, "value": id }))
            .collect();
        criteria.push(json!({ "filterType": FILTER_TARGET, "value": TARGET_EDITOR }));

        json!({
            "filters": [{
                "criteria": criteria,
                "pageNumber": 1,
                "pageSize": ids.len(),
                "sortBy": 0,
                "sortOrder": 0,
            }],
            "assetTypes": [],
            "flags": QUERY_FLAGS,
        })
    }
}

#[async_trait]
impl MetadataQuery for GalleryClient {
    async fn query_latest(
        &self,
        ids: &[String],
    ) -> Result<HashMap<String, RemoteMetadata>, SyncError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        debug!("Querying {} for {} extensions", self.query_url, ids.len());
        let response = self
            .client
            .post(&self.query_url)
            .header(reqwest::header::ACCEPT, QUERY_ACCEPT)
            .json(&Self::request_body(ids))
            .send()
            .await
            .map_err(SyncError::query)?;

        if !response.status().is_success() {
            return Err(SyncError::query(format!(
                "registry responded with status {}",
                response.status()
            )));
        }

        let body: QueryResponse = response.json().await.map_err(SyncError::query)?;

        let mut latest = HashMap::new();
        for extension in body.results.iter().flat_map(|r| &r.extensions) {
            let Some(version) = extension.latest() else {
                continue;
            };
            latest.insert(
                id_key(&extension.id()),
                RemoteMetadata {
                    version: Some(version.version.clone()),
                    download_url: version.package_url(),
                },
            );
        }

        info!(
            "Registry returned metadata for {}/{} extensions",
            latest.len(),
            ids.len()
        );
        Ok(latest)
    }
}
