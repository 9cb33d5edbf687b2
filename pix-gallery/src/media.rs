use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use pix_blob::ImageRef;
use serde::{Deserialize, Serialize};

use crate::{GalleryError, GalleryResult};

/// Options handed to the device picker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PickOptions {
    pub allow_editing: bool,
    /// Crop aspect ratio (width, height)
    pub aspect: (u32, u32),
    /// Compression quality in `0.0..=1.0`
    pub quality: f32,
}

impl Default for PickOptions {
    fn default() -> Self {
        Self {
            allow_editing: true,
            aspect: (4, 3),
            quality: 1.0,
        }
    }
}

/// What the picker returned
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PickOutcome {
    Cancelled,
    Picked(ImageRef),
}

/// Device media picker
#[async_trait]
pub trait ImagePicker: Send + Sync {
    async fn pick_image(&self, options: &PickOptions) -> GalleryResult<PickOutcome>;
}

/// Reads the bytes behind a local locator
#[async_trait]
pub trait MediaReader: Send + Sync {
    async fn read(&self, image: &ImageRef) -> GalleryResult<Bytes>;
}

/// Reads plain paths and `file://` locators from the local filesystem
#[derive(Debug, Clone, Default)]
pub struct FsMediaReader;

impl FsMediaReader {
    pub fn new() -> Self {
        Self
    }

    fn local_path(image: &ImageRef) -> GalleryResult<PathBuf> {
        let locator = image.as_str().trim();
        if let Some(path) = locator.strip_prefix("file://") {
            return Ok(PathBuf::from(path));
        }
        match locator.split_once("://") {
            Some((scheme, _)) => Err(GalleryError::read(
                locator,
                format!("unsupported scheme {:?}", scheme),
            )),
            None if locator.is_empty() => Err(GalleryError::read(locator, "empty locator")),
            None => Ok(PathBuf::from(locator)),
        }
    }
}

#[async_trait]
impl MediaReader for FsMediaReader {
    async fn read(&self, image: &ImageRef) -> GalleryResult<Bytes> {
        let path = Self::local_path(image)?;
        let data = tokio::fs::read(&path)
            .await
            .map_err(|e| GalleryError::read(image.as_str(), e))?;
        Ok(Bytes::from(data))
    }
}

/// Picker that hands back a file chosen up front (command line, drag and drop, ...).
///
/// With no file it behaves like a user dismissing the picker.
#[derive(Debug, Clone, Default)]
pub struct PathPicker {
    path: Option<PathBuf>,
}

impl PathPicker {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    pub fn cancelled() -> Self {
        Self { path: None }
    }

    fn locator(path: &Path) -> ImageRef {
        ImageRef::new(format!("file://{}", path.display()))
    }
}

#[async_trait]
impl ImagePicker for PathPicker {
    async fn pick_image(&self, _options: &PickOptions) -> GalleryResult<PickOutcome> {
        let Some(path) = &self.path else {
            return Ok(PickOutcome::Cancelled);
        };
        let absolute = tokio::fs::canonicalize(path)
            .await
            .map_err(|e| GalleryError::picker(format!("{}: {}", path.display(), e)))?;
        if !tokio::fs::metadata(&absolute)
            .await
            .map_err(|e| GalleryError::picker(format!("{}: {}", absolute.display(), e)))?
            .is_file()
        {
            return Err(GalleryError::picker(format!("{} is not a file", absolute.display())));
        }
        Ok(PickOutcome::Picked(Self::locator(&absolute)))
    }
}
