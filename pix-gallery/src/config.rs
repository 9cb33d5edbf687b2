use serde::{Deserialize, Serialize};

use crate::PickOptions;

/// Screen geometry used to lay the gallery out in rows
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Width of the visible area
    pub width: f32,
    /// Width of a single tile
    pub item_width: f32,
}

impl Viewport {
    pub fn new(width: f32, item_width: f32) -> Self {
        Self { width, item_width }
    }

    /// Tiles that fit on one row (at least 1)
    pub fn images_per_row(&self) -> usize {
        crate::layout::images_per_row(self.width, self.item_width)
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1000.0,
            item_width: 250.0,
        }
    }
}

/// Controller behaviour and layout configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GalleryConfig {
    /// If true, a picked image waits for `confirm_upload`; otherwise it uploads right away
    pub confirm_before_upload: bool,

    /// Enables the per-image action flag
    pub show_per_image_actions: bool,

    pub viewport: Viewport,

    /// Options passed to the picker
    pub pick: PickOptions,
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            confirm_before_upload: true,
            show_per_image_actions: false,
            viewport: Viewport::default(),
            pick: PickOptions::default(),
        }
    }
}

impl GalleryConfig {
    /// Create a new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Upload immediately after a pick instead of waiting for confirmation
    pub fn upload_on_pick(mut self) -> Self {
        self.confirm_before_upload = false;
        self
    }

    /// Set whether picks need confirmation
    pub fn with_confirmation(mut self, confirm: bool) -> Self {
        self.confirm_before_upload = confirm;
        self
    }

    /// Enable per-image actions
    pub fn with_actions(mut self, enabled: bool) -> Self {
        self.show_per_image_actions = enabled;
        self
    }

    /// Set viewport geometry
    pub fn with_viewport(mut self, viewport: Viewport) -> Self {
        self.viewport = viewport;
        self
    }

    /// Set picker options
    pub fn with_pick_options(mut self, pick: PickOptions) -> Self {
        self.pick = pick;
        self
    }
}
