use pix_blob::{BlobError, BoxError};
use thiserror::Error;

/// Result type for controller operations
pub type GalleryResult<T> = Result<T, GalleryError>;

/// Errors surfaced by the gallery controller.
///
/// None of these leave the controller in an unusable state: by the time an
/// operation returns one, the view has already been reset to a safe state.
#[derive(Error, Debug)]
pub enum GalleryError {
    /// Listing or URL resolution failed; the whole refresh was discarded
    #[error("Could not load the gallery: {0}")]
    Transfer(#[source] BlobError),

    /// A single upload failed; the collection is untouched
    #[error("Upload failed: {0}")]
    Upload(#[source] BlobError),

    #[error("No image selected for upload")]
    NoSelection,

    #[error("An upload is already in progress")]
    UploadInProgress,

    #[error("Image picker failed: {reason}")]
    Picker { reason: String },

    #[error("Could not read {locator}: {source}")]
    Read {
        locator: String,
        #[source]
        source: BoxError,
    },
}

impl GalleryError {
    /// Create a picker error
    pub fn picker<S: Into<String>>(reason: S) -> Self {
        Self::Picker {
            reason: reason.into(),
        }
    }

    /// Create a read error for a locator
    pub fn read<L: Into<String>, E: Into<BoxError>>(locator: L, error: E) -> Self {
        Self::Read {
            locator: locator.into(),
            source: error.into(),
        }
    }
}
