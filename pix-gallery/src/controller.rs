use std::sync::Arc;

use pix_blob::{content_type_for, BlobError, ImageRef, RemoteCollection, UploadAck};
use tracing::{debug, error, info, instrument, warn};

use crate::layout::{chunk_rows, layout_rows};
use crate::view::{display_name, Controls, GalleryBody, GalleryView, TileView};
use crate::{
    DisplayFlags, DisplayState, GalleryConfig, GalleryError, GalleryResult, ImagePicker,
    LoadState, MediaReader, PickOutcome, Row, UploadPhase, UploadSession, Viewport,
};

/// Owns the gallery screen state and runs the pick/upload workflow.
///
/// Every mutation goes through `&mut self`, so the controller is the only
/// writer of the collection, the display flags and the upload session.
/// Failures from the storage or device side are logged and folded back into
/// a safe state before the operation returns.
pub struct GalleryController {
    collection: Arc<RemoteCollection>,
    picker: Arc<dyn ImagePicker>,
    reader: Arc<dyn MediaReader>,
    config: GalleryConfig,

    load_state: LoadState,
    images: Vec<ImageRef>,
    display: DisplayState,
    session: UploadSession,
    last_error: Option<String>,
}

impl GalleryController {
    pub fn new<P, R>(collection: RemoteCollection, picker: P, reader: R, config: GalleryConfig) -> Self
    where
        P: ImagePicker + 'static,
        R: MediaReader + 'static,
    {
        Self::from_shared(Arc::new(collection), Arc::new(picker), Arc::new(reader), config)
    }

    pub fn from_shared(
        collection: Arc<RemoteCollection>,
        picker: Arc<dyn ImagePicker>,
        reader: Arc<dyn MediaReader>,
        config: GalleryConfig,
    ) -> Self {
        Self {
            collection,
            picker,
            reader,
            config,
            load_state: LoadState::Idle,
            images: Vec::new(),
            display: DisplayState::new(),
            session: UploadSession::new(),
            last_error: None,
        }
    }

    /// Load (or reload) the whole collection.
    ///
    /// Always ends `Ready`. On failure the gallery is left empty and the
    /// error is returned for inspection only.
    #[instrument(skip(self))]
    pub async fn activate(&mut self) -> GalleryResult<usize> {
        self.load_state = LoadState::Loading;

        let result = self.collection.fetch_all().await;
        self.load_state = LoadState::Ready;

        match result {
            Ok(images) => {
                self.images = images;
                self.sync_display();
                self.last_error = None;
                info!(count = self.images.len(), "gallery loaded");
                Ok(self.images.len())
            }
            Err(e) => {
                error!(error = %e, "Error fetching storage images");
                self.images.clear();
                self.sync_display();
                let e = GalleryError::Transfer(e);
                self.last_error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Open the picker and stage the chosen image.
    ///
    /// A cancelled pick leaves everything as it was. When confirmation is
    /// disabled the staged image is uploaded straight away.
    #[instrument(skip(self))]
    pub async fn request_pick(&mut self) -> GalleryResult<PickOutcome> {
        let previous = match self.session.begin_selecting() {
            Ok(previous) => previous,
            Err(e) => {
                warn!(error = %e, "pick requested during upload");
                return Err(e);
            }
        };

        let picked = match self.picker.pick_image(&self.config.pick).await {
            Ok(PickOutcome::Picked(image)) if image.is_empty() => {
                Err(GalleryError::picker("picker returned an empty locator"))
            }
            other => other,
        };

        match picked {
            Ok(PickOutcome::Cancelled) => {
                self.session.restore(previous);
                debug!("pick cancelled");
                Ok(PickOutcome::Cancelled)
            }
            Ok(PickOutcome::Picked(image)) => {
                self.session.stage(image.clone());
                self.display.reset(&image);
                self.sync_display();
                info!(image = %image, "image selected");

                if !self.config.confirm_before_upload {
                    self.confirm_upload().await?;
                }
                Ok(PickOutcome::Picked(image))
            }
            Err(e) => {
                self.session.restore(previous);
                error!(error = %e, "Error picking image");
                self.last_error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Upload the staged image to `images/<file name>`.
    ///
    /// The session returns to `Idle` with no selection whatever the outcome.
    /// On success the stored object is added to the collection.
    #[instrument(skip(self))]
    pub async fn confirm_upload(&mut self) -> GalleryResult<UploadAck> {
        let image = match self.session.start_upload() {
            Ok(image) => image,
            Err(GalleryError::NoSelection) => {
                error!("No image selected for upload");
                return Err(GalleryError::NoSelection);
            }
            Err(e) => {
                error!(error = %e, "upload confirmed while another is in flight");
                return Err(e);
            }
        };

        let result = self.upload(&image).await;

        let outcome = match result {
            Ok(ack) => {
                info!(path = %ack.path, size = ack.size_bytes, "Image uploaded successfully");
                match self.collection.locate(&ack.path).await {
                    Ok(uploaded) => self.add_image(uploaded),
                    Err(e) => warn!(
                        error = %e,
                        path = %ack.path,
                        "uploaded image could not be located; it will appear after the next refresh"
                    ),
                }
                self.last_error = None;
                Ok(ack)
            }
            Err(e) => {
                error!(error = %e, image = %image, "Error uploading image");
                self.last_error = Some(e.to_string());
                Err(e)
            }
        };

        self.session.finish();
        self.sync_display();
        outcome
    }

    /// Drop the staged image. Returns whether anything was cancelled.
    pub fn cancel_upload(&mut self) -> bool {
        match self.session.phase() {
            UploadPhase::Uploading => {
                warn!("upload already in flight; it cannot be cancelled");
                false
            }
            UploadPhase::Idle => false,
            UploadPhase::Selecting | UploadPhase::Confirming => {
                let cancelled = self.session.cancel();
                self.sync_display();
                debug!("selection cancelled");
                cancelled
            }
        }
    }

    /// Flip the name caption of `image`, returning the new value.
    ///
    /// Images the screen does not know about are ignored and read as hidden.
    pub fn toggle_name(&mut self, image: &ImageRef) -> bool {
        if !self.is_known(image) {
            debug!(image = %image, "toggle for unknown image ignored");
            return false;
        }
        self.display.toggle_name(image)
    }

    /// Flip the action buttons of `image`, returning the new value.
    ///
    /// Always false while per-image actions are disabled.
    pub fn toggle_actions(&mut self, image: &ImageRef) -> bool {
        if !self.config.show_per_image_actions || !self.is_known(image) {
            return false;
        }
        self.display.toggle_actions(image)
    }

    /// Grid layout of the collection for an explicit viewport
    pub fn layout_rows(&self, viewport_width: f32, item_width: f32) -> Vec<Row<ImageRef>> {
        layout_rows(&self.images, viewport_width, item_width)
    }

    /// Grid layout of the collection for the configured viewport
    pub fn rows(&self) -> Vec<Row<ImageRef>> {
        chunk_rows(&self.images, self.config.viewport.images_per_row())
    }

    /// Apply a new viewport (rotation, window resize, ...)
    pub fn set_viewport(&mut self, viewport: Viewport) {
        debug!(width = viewport.width, item_width = viewport.item_width, "viewport changed");
        self.config.viewport = viewport;
    }

    /// Snapshot for rendering
    pub fn view(&self) -> GalleryView {
        let body = match self.load_state {
            LoadState::Idle | LoadState::Loading => GalleryBody::Loading,
            LoadState::Ready if self.images.is_empty() => GalleryBody::Empty,
            LoadState::Ready => {
                let tiles: Vec<TileView> = self.images.iter().map(|image| self.tile(image)).collect();
                GalleryBody::Rows(chunk_rows(&tiles, self.config.viewport.images_per_row()))
            }
        };

        GalleryView {
            load_state: self.load_state,
            body,
            selection: self.session.selected().map(|image| self.tile(image)),
            phase: self.session.phase(),
            controls: Controls::for_phase(self.session.phase(), self.config.confirm_before_upload),
            last_error: self.last_error.clone(),
        }
    }

    pub fn images(&self) -> &[ImageRef] {
        &self.images
    }

    pub fn display_flags(&self, image: &ImageRef) -> DisplayFlags {
        self.display.get(image)
    }

    pub fn display_state(&self) -> &DisplayState {
        &self.display
    }

    pub fn session(&self) -> &UploadSession {
        &self.session
    }

    pub fn load_state(&self) -> LoadState {
        self.load_state
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn config(&self) -> &GalleryConfig {
        &self.config
    }

    async fn upload(&self, image: &ImageRef) -> GalleryResult<UploadAck> {
        let name = image.file_name().ok_or_else(|| {
            GalleryError::Upload(BlobError::invalid(format!(
                "Cannot derive an object name from {:?}",
                image.as_str()
            )))
        })?;
        let body = self.reader.read(image).await?;
        self.collection
            .upload(name, body, Some(content_type_for(name)))
            .await
            .map_err(GalleryError::Upload)
    }

    fn add_image(&mut self, image: ImageRef) {
        if !self.images.contains(&image) {
            self.images.push(image);
        }
        self.sync_display();
    }

    fn is_known(&self, image: &ImageRef) -> bool {
        self.session.selected() == Some(image) || self.images.contains(image)
    }

    /// Give every shown or selected image a flag entry and drop the rest
    fn sync_display(&mut self) {
        for image in &self.images {
            self.display.ensure(image);
        }
        if let Some(selected) = self.session.selected() {
            self.display.ensure(selected);
        }

        let images = &self.images;
        let selected = self.session.selected();
        let pruned = self
            .display
            .retain(|image| selected == Some(image) || images.contains(image));
        if pruned > 0 {
            debug!(pruned, "dropped display flags of removed images");
        }
    }

    fn tile(&self, image: &ImageRef) -> TileView {
        let flags = self.display.get(image);
        TileView {
            image: image.clone(),
            caption: flags.name_visible.then(|| display_name(Some(image))),
            show_actions: self.config.show_per_image_actions && flags.actions_visible,
        }
    }
}
