use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use tracing::warn;

use crate::{
    BlobError, BlobResult, BlobStore, Listing, ObjectItem, ObjectPath, PutResult,
    StoreCapabilities,
};

/// A local directory used as a bucket. Sub-directories are namespace nodes.
#[derive(Debug, Clone)]
pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map an object path onto the filesystem, refusing anything that could
    /// escape the root directory.
    fn local_path(&self, path: &ObjectPath) -> BlobResult<PathBuf> {
        let mut local = self.root.clone();
        if path.is_root() {
            return Ok(local);
        }
        for segment in path.as_str().split(ObjectPath::SEPARATOR) {
            if segment == "." || segment == ".." || segment.contains('\\') {
                return Err(BlobError::invalid(format!("Illegal path segment in {}", path)));
            }
            local.push(segment);
        }
        Ok(local)
    }
}

#[async_trait]
impl BlobStore for FsStore {
    async fn list(&self, path: &ObjectPath) -> BlobResult<Listing> {
        let dir = self.local_path(path)?;
        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Listing::default()),
            Err(e) => return Err(BlobError::list_failed(path.to_string(), e)),
        };

        let mut files = Vec::new();
        let mut dirs = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| BlobError::list_failed(path.to_string(), e))?
        {
            let file_name = entry.file_name();
            let Some(name) = file_name.to_str() else {
                warn!(path = %path, name = ?file_name, "skipping entry with a non UTF-8 name");
                continue;
            };
            if name.starts_with('.') {
                continue;
            }
            if name.contains('\\') {
                warn!(path = %path, name, "skipping entry with a backslash in its name");
                continue;
            }
            let metadata = entry
                .metadata()
                .await
                .map_err(|e| BlobError::list_failed(path.to_string(), e))?;
            if metadata.is_dir() {
                dirs.push(path.join(name));
            } else if metadata.is_file() {
                files.push(ObjectItem::new(path.join(name)).with_size(metadata.len()));
            }
        }

        files.sort_by(|a, b| a.path.cmp(&b.path));
        dirs.sort();

        Ok(Listing {
            items: files,
            sub_paths: dirs,
        })
    }

    async fn resolve_url(&self, item: &ObjectItem) -> BlobResult<String> {
        let local = self.local_path(&item.path)?;
        let absolute = tokio::fs::canonicalize(&local).await.map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                BlobError::not_found(item.key())
            } else {
                BlobError::resolve_failed(item.key(), e)
            }
        })?;
        Ok(format!("file://{}", absolute.display()))
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
        let local = self.local_path(path)?;
        if let Some(parent) = local.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| BlobError::upload_failed(path.as_str(), e))?;
        }
        tokio::fs::write(&local, &body)
            .await
            .map_err(|e| BlobError::upload_failed(path.as_str(), e))?;

        Ok(PutResult {
            etag: None,
            size_bytes: body.len() as u64,
        })
    }

    fn capabilities(&self) -> StoreCapabilities {
        StoreCapabilities::basic()
    }
}
