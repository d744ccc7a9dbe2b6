//! Gallery service: validation layer between the HTTP handlers and a store.

use std::time::{SystemTime, UNIX_EPOCH};

use bytes::Bytes;
use serde::Serialize;
use tracing::info;

use crate::error::GalleryError;
use crate::store::ArtworkStore;

use super::naming::{display_title, extension_for, sanitize_filename};

/// Default upload size limit (10 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

/// A gallery entry as returned to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Artwork {
    /// Storage key; what the delete endpoint expects back
    pub filename: String,

    /// Display title derived from the filename
    pub title: String,

    /// URL the image bytes are served from
    pub path: String,
}

/// An incoming upload, already read out of the multipart body.
#[derive(Debug, Clone, Default)]
pub struct ArtworkUpload {
    /// Client-side filename, if the browser sent one
    pub filename: Option<String>,

    /// User-supplied title, if the form had one
    pub title: Option<String>,

    /// Declared content type of the file part
    pub content_type: Option<String>,

    /// The file bytes
    pub data: Bytes,
}

/// Validation wrapper over an [`ArtworkStore`].
///
/// Generic over the backend so the same service runs against the local
/// directory, S3, or an in-memory mock in tests.
pub struct GalleryService<S: ArtworkStore> {
    store: S,
    max_upload_bytes: u64,
}

impl<S: ArtworkStore> GalleryService<S> {
    /// Create a service with the default upload size limit.
    pub fn new(store: S) -> Self {
        Self {
            store,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }

    /// Create a service with a custom upload size limit.
    pub fn with_max_upload_bytes(store: S, max_upload_bytes: u64) -> Self {
        Self {
            store,
            max_upload_bytes,
        }
    }

    /// The configured upload size limit in bytes.
    pub fn max_upload_bytes(&self) -> u64 {
        self.max_upload_bytes
    }

    /// List all artworks, sorted by filename.
    ///
    /// Backends differ in listing order (read_dir is arbitrary, S3 is
    /// lexicographic by key), so the service pins the order here.
    pub async fn list_artworks(&self) -> Result<Vec<Artwork>, GalleryError> {
        let mut artworks: Vec<Artwork> = self
            .store
            .list()
            .await?
            .into_iter()
            .map(|stored| Artwork {
                title: display_title(&stored.filename),
                filename: stored.filename,
                path: stored.url,
            })
            .collect();

        artworks.sort_by(|a, b| a.filename.cmp(&b.filename));
        Ok(artworks)
    }

    /// Validate and store an upload, returning the new gallery entry.
    pub async fn upload(&self, upload: ArtworkUpload) -> Result<Artwork, GalleryError> {
        if upload.data.is_empty() {
            return Err(GalleryError::EmptyUpload);
        }

        let size = upload.data.len() as u64;
        if size > self.max_upload_bytes {
            return Err(GalleryError::TooLarge {
                size,
                max_bytes: self.max_upload_bytes,
            });
        }

        let content_type = upload.content_type.as_deref().unwrap_or("");
        if !content_type.starts_with("image/") {
            return Err(GalleryError::NotAnImage {
                content_type: if content_type.is_empty() {
                    "(none)".to_string()
                } else {
                    content_type.to_string()
                },
            });
        }

        let filename = self.stored_name(&upload, content_type);

        let stored = self
            .store
            .put(&filename, content_type, upload.data)
            .await?;

        info!(
            filename = %stored.filename,
            size = stored.size,
            content_type = content_type,
            "artwork uploaded"
        );

        Ok(Artwork {
            title: display_title(&stored.filename),
            filename: stored.filename,
            path: stored.url,
        })
    }

    /// Delete an artwork by filename (or, for S3, by its public URL).
    pub async fn delete(&self, filename: &str) -> Result<(), GalleryError> {
        if filename.trim().is_empty() {
            return Err(GalleryError::MissingFilename);
        }

        self.store.delete(filename).await?;
        info!(filename = filename, "artwork deleted");
        Ok(())
    }

    /// Pick the storage name for an upload.
    ///
    /// Preference order: sanitized user title (keeping the original
    /// extension), sanitized client filename, generated fallback.
    fn stored_name(&self, upload: &ArtworkUpload, content_type: &str) -> String {
        let client_name = upload.filename.as_deref().and_then(sanitize_filename);

        if let Some(title) = upload.title.as_deref().and_then(sanitize_filename) {
            let ext = client_name
                .as_deref()
                .and_then(|name| name.rsplit_once('.').map(|(_, ext)| ext.to_string()))
                .unwrap_or_else(|| extension_for(content_type).to_string());
            return format!("{}.{}", title, ext);
        }

        client_name.unwrap_or_else(|| {
            let millis = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_millis())
                .unwrap_or(0);
            format!("artwork-{}.{}", millis, extension_for(content_type))
        })
    }
}
