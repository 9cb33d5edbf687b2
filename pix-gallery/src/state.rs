use std::collections::HashMap;

use pix_blob::ImageRef;
use serde::Serialize;

/// Progress of the initial (or refresh) load
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum LoadState {
    #[default]
    Idle,
    Loading,
    Ready,
}

/// Per-image UI toggles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct DisplayFlags {
    pub name_visible: bool,
    pub actions_visible: bool,
}

/// Display toggles keyed by locator
#[derive(Debug, Clone, Default)]
pub struct DisplayState {
    flags: HashMap<ImageRef, DisplayFlags>,
}

impl DisplayState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flags for `image`; images without an entry read as all-false
    pub fn get(&self, image: &ImageRef) -> DisplayFlags {
        self.flags.get(image).copied().unwrap_or_default()
    }

    pub fn contains(&self, image: &ImageRef) -> bool {
        self.flags.contains_key(image)
    }

    /// Add a default entry unless one exists
    pub fn ensure(&mut self, image: &ImageRef) {
        self.flags.entry(image.clone()).or_default();
    }

    /// Force `image` back to all-false
    pub fn reset(&mut self, image: &ImageRef) {
        self.flags.insert(image.clone(), DisplayFlags::default());
    }

    /// Flip the name flag, returning the new value
    pub fn toggle_name(&mut self, image: &ImageRef) -> bool {
        let flags = self.flags.entry(image.clone()).or_default();
        flags.name_visible = !flags.name_visible;
        flags.name_visible
    }

    /// Flip the actions flag, returning the new value
    pub fn toggle_actions(&mut self, image: &ImageRef) -> bool {
        let flags = self.flags.entry(image.clone()).or_default();
        flags.actions_visible = !flags.actions_visible;
        flags.actions_visible
    }

    /// Drop every entry `keep` rejects, returning how many were removed
    pub fn retain<F>(&mut self, mut keep: F) -> usize
    where
        F: FnMut(&ImageRef) -> bool,
    {
        let before = self.flags.len();
        self.flags.retain(|image, _| keep(image));
        before - self.flags.len()
    }

    pub fn len(&self) -> usize {
        self.flags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }
}
