//! # pix-gallery: gallery & upload controller
//!
//! Keeps a local view of a remote image collection consistent with what the
//! user does on the screen: browse, toggle captions, pick an image, confirm
//! or cancel, upload.
//!
//! The controller talks to three collaborators:
//!
//! - a [`pix_blob::RemoteCollection`] for listing and uploading,
//! - an [`ImagePicker`] standing in for the device media picker,
//! - a [`MediaReader`] that turns a picked locator into bytes.
//!
//! ```rust
//! use pix_blob::{CollectionConfig, MemoryStore, RemoteCollection};
//! use pix_gallery::prelude::*;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let store = MemoryStore::new().with_object("images/cat.png", "meow");
//! let mut gallery = GalleryController::new(
//!     RemoteCollection::new(store, CollectionConfig::default()),
//!     PathPicker::cancelled(),
//!     FsMediaReader::new(),
//!     GalleryConfig::default(),
//! );
//!
//! gallery.activate().await.ok();
//! assert_eq!(gallery.images().len(), 1);
//! assert!(!gallery.view().is_empty_gallery());
//! # }
//! ```

mod config;
mod controller;
mod error;
pub mod layout;
mod media;
mod session;
mod state;
mod view;

pub use config::{GalleryConfig, Viewport};
pub use controller::GalleryController;
pub use error::{GalleryError, GalleryResult};
pub use layout::Row;
pub use media::{FsMediaReader, ImagePicker, MediaReader, PathPicker, PickOptions, PickOutcome};
pub use session::{UploadPhase, UploadSession};
pub use state::{DisplayFlags, DisplayState, LoadState};
pub use view::{display_name, Controls, GalleryBody, GalleryView, TileView, UNKNOWN_NAME};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        FsMediaReader, GalleryConfig, GalleryController, GalleryError, GalleryResult,
        GalleryView, ImagePicker, MediaReader, PathPicker, PickOutcome, UploadPhase,
    };
}
