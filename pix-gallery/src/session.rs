use pix_blob::ImageRef;
use serde::Serialize;

use crate::{GalleryError, GalleryResult};

/// Phase of the pick-to-upload workflow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum UploadPhase {
    #[default]
    Idle,
    /// The picker is open
    Selecting,
    /// An image is staged and waits for confirmation
    Confirming,
    /// The staged image is being transferred
    Uploading,
}

/// The single pick-to-upload session.
///
/// `Confirming` and `Uploading` always carry a selected image; `Idle` never
/// does.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UploadSession {
    selected: Option<ImageRef>,
    phase: UploadPhase,
}

impl UploadSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected(&self) -> Option<&ImageRef> {
        self.selected.as_ref()
    }

    pub fn phase(&self) -> UploadPhase {
        self.phase
    }

    pub fn is_idle(&self) -> bool {
        self.phase == UploadPhase::Idle
    }

    pub fn is_uploading(&self) -> bool {
        self.phase == UploadPhase::Uploading
    }

    /// Open the picker. Returns the session as it was so a cancelled pick can
    /// put it back untouched.
    pub(crate) fn begin_selecting(&mut self) -> GalleryResult<UploadSession> {
        if self.is_uploading() {
            return Err(GalleryError::UploadInProgress);
        }
        let previous = self.clone();
        self.phase = UploadPhase::Selecting;
        Ok(previous)
    }

    pub(crate) fn restore(&mut self, previous: UploadSession) {
        *self = previous;
    }

    /// Stage a picked image
    pub(crate) fn stage(&mut self, image: ImageRef) {
        self.selected = Some(image);
        self.phase = UploadPhase::Confirming;
    }

    /// Move the staged image into `Uploading`
    pub(crate) fn start_upload(&mut self) -> GalleryResult<ImageRef> {
        if self.is_uploading() {
            return Err(GalleryError::UploadInProgress);
        }
        let image = self.selected.clone().ok_or(GalleryError::NoSelection)?;
        self.phase = UploadPhase::Uploading;
        Ok(image)
    }

    /// Tear the session down after an upload, whatever its outcome
    pub(crate) fn finish(&mut self) {
        self.selected = None;
        self.phase = UploadPhase::Idle;
    }

    /// Drop the selection before upload. In-flight uploads cannot be cancelled.
    pub(crate) fn cancel(&mut self) -> bool {
        match self.phase {
            UploadPhase::Selecting | UploadPhase::Confirming => {
                self.finish();
                true
            }
            UploadPhase::Idle | UploadPhase::Uploading => false,
        }
    }
}
