//! Gallery domain layer.
//!
//! This module holds the storage-agnostic gallery logic: the naming rules
//! (filename sanitization, display titles) and the [`GalleryService`] that
//! validates uploads and deletes before they reach a store.

mod naming;
mod service;

pub use naming::{display_title, extension_for, sanitize_filename};
pub use service::{Artwork, ArtworkUpload, GalleryService, DEFAULT_MAX_UPLOAD_BYTES};
