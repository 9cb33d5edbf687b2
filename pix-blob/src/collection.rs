use std::collections::HashSet;
use std::sync::Arc;

use bytes::Bytes;
use futures::{stream, StreamExt, TryStreamExt};
use tracing::{debug, info, instrument};

use crate::{
    BlobError, BlobResult, BlobStore, CollectionConfig, DefaultKeyStrategy, ImageRef, Listing,
    ObjectItem, ObjectPath, StoreCapabilities, UploadAck, UploadKeyStrategy,
};

/// Gateway over a [`BlobStore`] that exposes the bucket as a flat image collection.
///
/// The controller embeds one of these and never talks to the store directly.
pub struct RemoteCollection {
    store: Arc<dyn BlobStore>,
    keys: Arc<dyn UploadKeyStrategy>,
    config: CollectionConfig,
}

impl RemoteCollection {
    /// Create a gateway that names uploads `<upload_prefix>/<file name>`
    pub fn new<S: BlobStore + 'static>(store: S, config: CollectionConfig) -> Self {
        Self::from_shared(Arc::new(store), config)
    }

    /// Create from an already shared store
    pub fn from_shared(store: Arc<dyn BlobStore>, config: CollectionConfig) -> Self {
        Self {
            store,
            keys: Arc::new(DefaultKeyStrategy::new(&config.upload_prefix)),
            config,
        }
    }

    /// Create with custom key strategy
    pub fn with_key_strategy<S: BlobStore + 'static, K: UploadKeyStrategy + 'static>(
        store: S,
        keys: K,
        config: CollectionConfig,
    ) -> Self {
        Self {
            store: Arc::new(store),
            keys: Arc::new(keys),
            config,
        }
    }

    /// Walk the whole namespace below the configured root and resolve a
    /// locator for every object.
    ///
    /// The walk goes level by level: every node of the current level is
    /// listed, then every object found on it is resolved, then the child
    /// nodes form the next level. At most `max_concurrency` requests are in
    /// flight at once. The first failure aborts the walk and nothing is
    /// returned.
    #[instrument(skip(self), fields(root = %self.config.root))]
    pub async fn fetch_all(&self) -> BlobResult<Vec<ImageRef>> {
        let limit = self.config.max_concurrency.max(1);
        let mut visited: HashSet<ObjectPath> = HashSet::new();
        let mut seen: HashSet<ImageRef> = HashSet::new();
        let mut images = Vec::new();

        let mut frontier = vec![self.config.root.clone()];
        let mut depth = 0usize;

        while !frontier.is_empty() {
            if depth > self.config.max_depth {
                return Err(BlobError::invalid(format!(
                    "Namespace below {} is deeper than {} levels",
                    self.config.root, self.config.max_depth
                )));
            }

            frontier.retain(|path| visited.insert(path.clone()));

            let listings: Vec<Listing> = stream::iter(frontier.iter().map(|path| self.store.list(path)))
                .buffer_unordered(limit)
                .try_collect()
                .await?;

            let mut items = Vec::new();
            let mut next = Vec::new();
            for listing in listings {
                items.extend(listing.items);
                next.extend(listing.sub_paths);
            }

            let locators: Vec<String> = stream::iter(items.iter().map(|item| self.store.resolve_url(item)))
                .buffered(limit)
                .try_collect()
                .await?;

            for locator in locators {
                let image = ImageRef::new(locator);
                if seen.insert(image.clone()) {
                    images.push(image);
                }
            }

            debug!(
                depth,
                nodes = frontier.len(),
                objects = items.len(),
                children = next.len(),
                "walked namespace level"
            );

            frontier = next;
            depth += 1;
        }

        info!(count = images.len(), "collection fetched");
        Ok(images)
    }

    /// Store `body` as `file_name` under the upload prefix
    #[instrument(skip(self, body), fields(size = body.len()))]
    pub async fn upload(
        &self,
        file_name: &str,
        body: Bytes,
        content_type: Option<&str>,
    ) -> BlobResult<UploadAck> {
        let size = body.len() as u64;
        if size > self.config.max_upload_bytes {
            return Err(BlobError::invalid(format!(
                "Upload size {} exceeds maximum {}",
                size, self.config.max_upload_bytes
            )));
        }

        let path = self.keys.object_path(file_name)?;
        let result = self.store.upload(&path, body, content_type).await?;

        let mut ack = UploadAck::new(path, result.size_bytes);
        if let Some(etag) = result.etag {
            ack = ack.with_etag(etag);
        }

        info!(path = %ack.path, size = ack.size_bytes, "upload stored");
        Ok(ack)
    }

    /// Resolve the download locator of a single stored object
    pub async fn locate(&self, path: &ObjectPath) -> BlobResult<ImageRef> {
        let locator = self.store.resolve_url(&ObjectItem::new(path.clone())).await?;
        Ok(ImageRef::new(locator))
    }

    /// Path an upload named `file_name` would be stored at
    pub fn upload_path(&self, file_name: &str) -> BlobResult<ObjectPath> {
        self.keys.object_path(file_name)
    }

    /// Get configuration
    pub fn config(&self) -> &CollectionConfig {
        &self.config
    }

    /// Capabilities of the underlying store
    pub fn capabilities(&self) -> StoreCapabilities {
        self.store.capabilities()
    }
}

/// Content type for an image file name, judged by extension
pub fn content_type_for(file_name: &str) -> &'static str {
    let extension = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "heic" => "image/heic",
        "heif" => "image/heif",
        "avif" => "image/avif",
        "tif" | "tiff" => "image/tiff",
        "svg" => "image/svg+xml",
        _ => "application/octet-stream",
    }
}
