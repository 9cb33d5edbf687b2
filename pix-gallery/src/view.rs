use pix_blob::ImageRef;
use serde::Serialize;

use crate::{LoadState, Row, UploadPhase};

/// Name shown for images whose locator has no usable final segment
pub const UNKNOWN_NAME: &str = "Unknown";

/// Display name of an image: the final segment of its locator, or [`UNKNOWN_NAME`]
pub fn display_name(image: Option<&ImageRef>) -> String {
    image
        .and_then(ImageRef::file_name)
        .unwrap_or(UNKNOWN_NAME)
        .to_string()
}

/// Everything a shell needs to draw the screen
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GalleryView {
    pub load_state: LoadState,
    pub body: GalleryBody,
    /// The staged or uploading image, if any
    pub selection: Option<TileView>,
    pub phase: UploadPhase,
    pub controls: Controls,
    /// Most recent failure, for a toast or banner
    pub last_error: Option<String>,
}

/// Main area of the screen
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "rows", rename_all = "snake_case")]
pub enum GalleryBody {
    /// Spinner
    Loading,
    /// Loaded, nothing stored
    Empty,
    Rows(Vec<Row<TileView>>),
}

/// A single image tile
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TileView {
    pub image: ImageRef,
    /// Present when the name toggle is on
    pub caption: Option<String>,
    pub show_actions: bool,
}

/// Enabled state of the screen's controls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Controls {
    pub can_pick: bool,
    pub can_confirm: bool,
    pub can_cancel: bool,
    /// Upload in flight; shells show a busy indicator instead of buttons
    pub busy: bool,
}

impl Controls {
    pub(crate) fn for_phase(phase: UploadPhase, confirm_before_upload: bool) -> Self {
        Self {
            can_pick: phase != UploadPhase::Uploading,
            can_confirm: confirm_before_upload && phase == UploadPhase::Confirming,
            can_cancel: matches!(phase, UploadPhase::Selecting | UploadPhase::Confirming),
            busy: phase == UploadPhase::Uploading,
        }
    }
}

impl GalleryView {
    /// True when the gallery loaded and holds nothing
    pub fn is_empty_gallery(&self) -> bool {
        matches!(self.body, GalleryBody::Empty)
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.body, GalleryBody::Loading)
    }

    /// All tiles in display order
    pub fn tiles(&self) -> impl Iterator<Item = &TileView> {
        let rows: &[Row<TileView>] = match &self.body {
            GalleryBody::Rows(rows) => rows,
            GalleryBody::Loading | GalleryBody::Empty => &[],
        };
        rows.iter().flat_map(|row| row.items.iter())
    }
}
