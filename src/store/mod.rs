//! Storage abstraction layer.
//!
//! This module provides a unified interface for artwork storage regardless
//! of the underlying backend.
//!
//! # Architecture
//!
//! The store sits between the gallery service and the bytes on disk or in
//! the cloud:
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │            GalleryService               │
//! └────────────────────┬────────────────────┘
//!                      │
//!                      ▼
//! ┌─────────────────────────────────────────┐
//! │          ArtworkStore Trait             │
//! │   (backend-agnostic list/put/delete)    │
//! └────────────────────┬────────────────────┘
//!                      │
//!          ┌───────────┴───────────┐
//!          ▼                       ▼
//! ┌─────────────────┐    ┌─────────────────────┐
//! │   LocalStore    │    │      S3Store        │
//! │ (directory on   │    │ (S3 / MinIO bucket) │
//! │   disk)         │    │                     │
//! └─────────────────┘    └─────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use gallery_server::store::{ArtworkStore, LocalStore};
//!
//! let store = LocalStore::new("public/artworks", "/artworks/files");
//! store.ensure_ready().await?;
//!
//! let stored = store.put("sunset.jpg", "image/jpeg", data).await?;
//! let all = store.list().await?;
//! store.delete("sunset.jpg").await?;
//! ```

mod local;
mod s3;

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::StoreError;

pub use local::LocalStore;
pub use s3::{create_s3_client, S3Store};

/// One object held by a storage backend.
///
/// `filename` is the storage key: the basename within the local directory,
/// or the object key within the bucket. `url` is the address a browser can
/// fetch the bytes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredArtwork {
    /// Storage key (basename or object key)
    pub filename: String,

    /// Public URL for the object
    pub url: String,

    /// Object size in bytes
    pub size: u64,
}

/// A backend that can list, store and delete artwork files.
///
/// Implementations must reject names that would escape the configured
/// root or prefix before performing any backend operation.
#[async_trait]
pub trait ArtworkStore: Send + Sync + 'static {
    /// List all artworks currently in the store.
    async fn list(&self) -> Result<Vec<StoredArtwork>, StoreError>;

    /// Store an artwork under the given filename, overwriting any
    /// existing object with the same name.
    async fn put(
        &self,
        filename: &str,
        content_type: &str,
        data: Bytes,
    ) -> Result<StoredArtwork, StoreError>;

    /// Delete an artwork by filename.
    ///
    /// Returns [`StoreError::NotFound`] if no such artwork exists.
    async fn delete(&self, filename: &str) -> Result<(), StoreError>;
}

/// Reject names that could escape the store root.
///
/// Both backends call this before touching the filesystem or bucket: a
/// valid name is non-empty, has no path separators and no `..` component.
pub(crate) fn validate_name(filename: &str) -> Result<(), StoreError> {
    if filename.is_empty() {
        return Err(StoreError::InvalidName("(empty)".to_string()));
    }
    if filename.contains('/') || filename.contains('\\') || filename.contains("..") {
        return Err(StoreError::InvalidName(filename.to_string()));
    }
    Ok(())
}
