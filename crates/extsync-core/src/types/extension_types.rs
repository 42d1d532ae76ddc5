//! Extension identity and version descriptor
//!
//! Extension ids are publisher-qualified (`publisher.name`) and compared
//! case-insensitively everywhere. Use [`id_key`] whenever an id is used as a
//! map key.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Canonical map key for an extension id
pub fn id_key(id: &str) -> String {
    id.to_lowercase()
}

/// One extension, either desired (from the caller) or installed (from disk)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtensionRecord {
    /// Publisher-qualified id, e.g. `rust-lang.rust-analyzer`
    #[serde(default)]
    pub id: String,

    /// Extension name without publisher
    pub name: String,

    /// Publisher name
    pub publisher: String,

    /// Semantic version string
    pub version: String,

    /// Package download URL, filled by the registry query or the fetcher fallback
    #[serde(
        default,
        rename = "downloadURL",
        skip_serializing_if = "Option::is_none"
    )]
    pub download_url: Option<String>,

    /// Local archive, set once the package has been downloaded
    #[serde(skip)]
    pub archive_path: Option<PathBuf>,

    /// Directory the extension was discovered in (installed records only)
    #[serde(skip)]
    pub install_path: Option<PathBuf>,
}

impl ExtensionRecord {
    /// Create a record from its parts, deriving the id
    pub fn new(
        publisher: impl Into<String>,
        name: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        let publisher = publisher.into();
        let name = name.into();
        Self {
            id: format!("{}.{}", publisher, name),
            name,
            publisher,
            version: version.into(),
            download_url: None,
            archive_path: None,
            install_path: None,
        }
    }

    /// Create a record from a `publisher.name` id
    pub fn from_id(id: &str, version: impl Into<String>) -> Result<Self> {
        let (publisher, name) = id
            .split_once('.')
            .filter(|(p, n)| !p.is_empty() && !n.is_empty())
            .ok_or_else(|| Error::invalid_extension_id(id))?;
        let mut record = Self::new(publisher, name, version);
        record.id = id.to_string();
        Ok(record)
    }

    /// Case-insensitive map key for this record
    pub fn key(&self) -> String {
        id_key(&self.id)
    }

    /// Case-insensitive id comparison
    pub fn matches_id(&self, id: &str) -> bool {
        self.id.eq_ignore_ascii_case(id)
    }

    /// Conventional install directory name: `publisher.name-version`
    pub fn dir_name(&self) -> String {
        format!("{}-{}", self.key(), self.version)
    }

    /// Attach a download URL
    pub fn with_download_url(mut self, url: impl Into<String>) -> Self {
        self.download_url = Some(url.into());
        self
    }

    /// Attach the directory the extension lives in
    pub fn with_install_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.install_path = Some(path.into());
        self
    }

    /// Fill in a missing id from publisher and name
    fn normalize(mut self) -> Result<Self> {
        if self.id.trim().is_empty() {
            if self.publisher.is_empty() || self.name.is_empty() {
                return Err(Error::invalid_extension_id(format!(
                    "{}.{}",
                    self.publisher, self.name
                )));
            }
            self.id = format!("{}.{}", self.publisher, self.name);
        }
        Ok(self)
    }
}

impl std::fmt::Display for ExtensionRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{}", self.id, self.version)
    }
}

/// Parse a desired extension list (JSON array of records)
pub fn parse_extension_list(content: &str) -> Result<Vec<ExtensionRecord>> {
    let records: Vec<ExtensionRecord> = serde_json::from_str(content)?;
    records.into_iter().map(ExtensionRecord::normalize).collect()
}
