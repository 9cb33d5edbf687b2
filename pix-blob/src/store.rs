use async_trait::async_trait;
use bytes::Bytes;

use crate::{BlobError, BlobResult, Listing, ObjectItem, ObjectPath};

/// Storage primitives the gallery needs - must be implemented by all backends
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// List the leaf objects and child nodes directly below `path`
    async fn list(&self, path: &ObjectPath) -> BlobResult<Listing>;

    /// Resolve a downloadable locator for an object
    async fn resolve_url(&self, item: &ObjectItem) -> BlobResult<String>;

    /// Store `body` at `path`, replacing any existing object
    async fn upload(
        &self,
        path: &ObjectPath,
        body: Bytes,
        content_type: Option<&str>,
    ) -> BlobResult<PutResult>;

    /// Get store capabilities
    fn capabilities(&self) -> StoreCapabilities;
}

/// Result of a successful upload
#[derive(Debug, Clone)]
pub struct PutResult {
    pub etag: Option<String>,
    pub size_bytes: u64,
}

/// Store capabilities
#[derive(Debug, Clone, Default)]
pub struct StoreCapabilities {
    pub supports_signed_urls: bool,
    pub url_ttl_secs: Option<u64>,
}

impl StoreCapabilities {
    pub fn basic() -> Self {
        Self {
            supports_signed_urls: false,
            url_ttl_secs: None,
        }
    }

    pub fn with_signed_urls(mut self, ttl_secs: u64) -> Self {
        self.supports_signed_urls = true;
        self.url_ttl_secs = Some(ttl_secs);
        self
    }
}

/// Strategy for naming uploaded objects
pub trait UploadKeyStrategy: Send + Sync {
    /// Storage path for an uploaded file called `file_name`
    fn object_path(&self, file_name: &str) -> BlobResult<ObjectPath>;
}

/// Default strategy: `<prefix>/<file_name>`
#[derive(Debug, Clone)]
pub struct DefaultKeyStrategy {
    prefix: ObjectPath,
}

impl DefaultKeyStrategy {
    pub fn new<S: AsRef<str>>(prefix: S) -> Self {
        Self {
            prefix: ObjectPath::new(prefix),
        }
    }
}

impl Default for DefaultKeyStrategy {
    fn default() -> Self {
        Self::new("images")
    }
}

impl UploadKeyStrategy for DefaultKeyStrategy {
    fn object_path(&self, file_name: &str) -> BlobResult<ObjectPath> {
        let file_name = file_name.trim();
        if file_name.is_empty() || file_name.contains('/') {
            return Err(BlobError::invalid(format!(
                "Invalid object name {:?}",
                file_name
            )));
        }
        Ok(self.prefix.join(file_name))
    }
}
