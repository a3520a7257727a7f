//! Local-first schema acquisition.
//!
//! Schema files are stored under the cache root at the path derived from
//! their [`SchemaKey`]. A file that exists is never fetched again; one that
//! is missing is downloaded once, written byte-for-byte, and read back from
//! the downloaded body. Directories are created on demand and never cleaned.
//!
//! Two processes missing the same file at once both fetch and both write.
//! The mirror serves identical bytes for a path, so the last write wins
//! without changing the content.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::Value;
use url::Url;

use crate::error::SchemaError;
use crate::fetch::SchemaFetcher;
use crate::key::SchemaKey;

/// Schema files on disk, backed by a remote mirror.
#[derive(Clone)]
pub struct SchemaStore {
    root: PathBuf,
    base_url: Url,
    fetcher: Arc<dyn SchemaFetcher>,
    offline: bool,
}

impl std::fmt::Debug for SchemaStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchemaStore")
            .field("root", &self.root)
            .field("base_url", &self.base_url.as_str())
            .field("offline", &self.offline)
            .finish()
    }
}

impl SchemaStore {
    /// Create a store rooted at `root` that fetches misses from `base_url`.
    pub fn new(root: impl Into<PathBuf>, base_url: Url, fetcher: Arc<dyn SchemaFetcher>) -> Self {
        Self {
            root: root.into(),
            base_url,
            fetcher,
            offline: false,
        }
    }

    /// Refuse to fetch; cache misses become [`SchemaError::OfflineCacheMiss`].
    pub fn offline(mut self, offline: bool) -> Self {
        self.offline = offline;
        self
    }

    /// Root of the local cache.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Local path of the schema for `key`.
    pub fn local_path(&self, key: &SchemaKey) -> PathBuf {
        self.root.join(key.version_dir()).join(key.file_name())
    }

    /// Remote URL of the schema for `key`.
    pub fn remote_url(&self, key: &SchemaKey) -> Result<Url, SchemaError> {
        let raw = format!(
            "{}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            key.relative_path()
        );
        Url::parse(&raw).map_err(|e| SchemaError::Transport {
            url: raw.clone(),
            reason: format!("invalid schema URL: {e}"),
        })
    }

    /// Load the schema for `key`, fetching and persisting it on a miss.
    ///
    /// The returned document has passed the Draft-7 meta-schema check.
    ///
    /// # Errors
    ///
    /// - [`SchemaError::Fetch`] / [`SchemaError::Transport`] when the mirror
    ///   cannot supply a missing schema.
    /// - [`SchemaError::OfflineCacheMiss`] when offline and not cached.
    /// - [`SchemaError::SchemaLoad`] when the document is not JSON.
    /// - [`SchemaError::SchemaInvalid`] when it is not a Draft-7 schema.
    pub fn load(&self, key: &SchemaKey) -> Result<Value, SchemaError> {
        let path = self.local_path(key);

        let bytes = if path.exists() {
            tracing::debug!(path = %path.display(), "schema cache hit");
            fs::read(&path)?
        } else {
            self.fetch_and_persist(key, &path)?
        };

        let schema: Value =
            serde_json::from_slice(&bytes).map_err(|e| SchemaError::SchemaLoad {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;

        jsonschema::draft7::meta::validate(&schema).map_err(|e| SchemaError::SchemaInvalid {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        Ok(schema)
    }

    fn fetch_and_persist(&self, key: &SchemaKey, path: &Path) -> Result<Vec<u8>, SchemaError> {
        if self.offline {
            return Err(SchemaError::OfflineCacheMiss {
                path: path.display().to_string(),
            });
        }

        if let Some(parent) = path.parent() {
            if !parent.is_dir() {
                fs::create_dir_all(parent)?;
            }
        }

        let url = self.remote_url(key)?;
        let body = self.fetcher.fetch(&url)?;
        fs::write(path, &body)?;
        tracing::info!(path = %path.display(), %url, "schema cached");
        Ok(body)
    }
}
