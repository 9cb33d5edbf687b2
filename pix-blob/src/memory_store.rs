use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::RwLock;
use tracing::warn;

use crate::{
    BlobError, BlobResult, BlobStore, Listing, ObjectItem, ObjectPath, PutResult,
    StoreCapabilities,
};

/// In-memory bucket with `/`-delimited keys
#[derive(Clone, Default)]
pub struct MemoryStore {
    objects: Arc<RwLock<BTreeMap<String, Bytes>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an object (builder style, for fixtures)
    pub fn with_object<K: AsRef<str>, B: Into<Bytes>>(self, key: K, body: B) -> Self {
        let key = ObjectPath::new(key).as_str().to_string();
        // Fixtures are seeded before any guard on the map is taken.
        let seeded = match self.objects.try_write() {
            Ok(mut objects) => {
                objects.insert(key, body.into());
                true
            }
            Err(_) => {
                warn!(key = %key, "object not seeded, store is locked");
                false
            }
        };
        debug_assert!(seeded, "with_object called while the store is locked");
        self
    }

    /// Read an object back
    pub async fn get(&self, key: &str) -> Option<Bytes> {
        self.objects.read().await.get(ObjectPath::new(key).as_str()).cloned()
    }

    /// All stored keys in order
    pub async fn keys(&self) -> Vec<String> {
        self.objects.read().await.keys().cloned().collect()
    }

    pub async fn len(&self) -> usize {
        self.objects.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.objects.read().await.is_empty()
    }

    fn locator(key: &str) -> String {
        format!("memory://{}", key)
    }
}

#[async_trait]
impl BlobStore for MemoryStore {
    async fn list(&self, path: &ObjectPath) -> BlobResult<Listing> {
        let prefix = path.as_prefix();
        let objects = self.objects.read().await;

        let mut items = Vec::new();
        let mut children = BTreeSet::new();

        for (key, body) in objects.range(prefix.clone()..) {
            let Some(rest) = key.strip_prefix(&prefix) else {
                break;
            };
            match rest.split_once(ObjectPath::SEPARATOR) {
                Some((child, _)) => {
                    children.insert(path.join(child));
                }
                None => items.push(
                    ObjectItem::new(ObjectPath::new(key)).with_size(body.len() as u64),
                ),
            }
        }

        Ok(Listing {
            items,
            sub_paths: children.into_iter().collect(),
        })
    }

    async fn resolve_url(&self, item: &ObjectItem) -> BlobResult<String> {
        if self.objects.read().await.contains_key(item.key()) {
            Ok(Self::locator(item.key()))
        } else {
            Err(BlobError::not_found(item.key()))
        }
    }

    async fn upload(
        &self,
        path: &ObjectPath,
        body: Bytes,
        _content_type: Option<&str>,
    ) -> BlobResult<PutResult> {
        if path.is_root() {
            return Err(BlobError::invalid("Cannot upload to the namespace root"));
        }
        let size_bytes = body.len() as u64;
        self.objects
            .write()
            .await
            .insert(path.as_str().to_string(), body);

        Ok(PutResult {
            etag: None,
            size_bytes,
        })
    }

    fn capabilities(&self) -> StoreCapabilities {
        StoreCapabilities::basic()
    }
}
