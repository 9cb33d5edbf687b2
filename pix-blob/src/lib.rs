//! # pix-blob: object-storage gateway for image galleries
//!
//! `pix-blob` turns a hierarchical object store into a flat, de-duplicated
//! list of image locators and forwards uploads into it.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────┐
//! │ Gallery controller │  ← View state, pick & upload workflow
//! ├────────────────────┤
//! │  RemoteCollection  │  ← Namespace walk, upload naming, guards
//! ├────────────────────┤
//! │     BlobStore      │  ← list / resolve_url / upload primitives
//! └────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use pix_blob::prelude::*;
//!
//! # #[tokio::main]
//! # async fn main() -> BlobResult<()> {
//! let store = MemoryStore::new()
//!     .with_object("cat.png", "meow")
//!     .with_object("trips/dog.png", "woof");
//! let collection = RemoteCollection::new(store, CollectionConfig::default());
//!
//! let images = collection.fetch_all().await?;
//! assert_eq!(images.len(), 2);
//!
//! let ack = collection.upload("bird.png", bytes::Bytes::from_static(b"tweet"), None).await?;
//! assert_eq!(ack.path.as_str(), "images/bird.png");
//! # Ok(())
//! # }
//! ```

mod collection;
mod config;
mod error;
mod fs_store;
mod memory_store;
mod s3_store;
pub mod store;
mod types;

pub use collection::{content_type_for, RemoteCollection};
pub use config::CollectionConfig;
pub use error::{BlobError, BlobResult, BoxError};
pub use fs_store::FsStore;
pub use memory_store::MemoryStore;
pub use s3_store::{S3Config, S3Store};
pub use store::{BlobStore, DefaultKeyStrategy, PutResult, StoreCapabilities, UploadKeyStrategy};
pub use types::{ImageRef, Listing, ObjectItem, ObjectPath, UploadAck};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        BlobError, BlobResult, BlobStore, CollectionConfig, ImageRef, MemoryStore, ObjectPath,
        RemoteCollection, UploadAck,
    };
}
