//! Filesystem-backed artwork store.
//!
//! Stores artworks as plain files in a single directory. Listing walks the
//! directory, uploads are a single `write`, deletes a single `remove_file`.
//! The router serves the directory at `public_base` so the returned URLs
//! resolve.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use bytes::Bytes;
use tracing::debug;

use crate::error::StoreError;

use super::{validate_name, ArtworkStore, StoredArtwork};

/// Artwork store backed by a directory on the local filesystem.
///
/// # Example
///
/// ```ignore
/// use gallery_server::store::LocalStore;
///
/// let store = LocalStore::new("public/artworks", "/artworks/files");
/// store.ensure_ready().await?;
/// ```
#[derive(Clone)]
pub struct LocalStore {
    root: PathBuf,
    public_base: String,
}

impl LocalStore {
    /// Create a new LocalStore rooted at the given directory.
    ///
    /// # Arguments
    /// * `root` - Directory that holds the artwork files
    /// * `public_base` - URL prefix the files are served under
    ///   (e.g. "/artworks/files")
    pub fn new(root: impl Into<PathBuf>, public_base: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            public_base: public_base.into().trim_end_matches('/').to_string(),
        }
    }

    /// Create the root directory if it does not exist yet.
    pub async fn ensure_ready(&self) -> Result<(), StoreError> {
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|e| StoreError::Io(format!("create {}: {}", self.root.display(), e)))
    }

    /// The directory holding the artwork files.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Public URL for a stored filename.
    fn url_for(&self, filename: &str) -> String {
        format!("{}/{}", self.public_base, urlencoding::encode(filename))
    }
}

#[async_trait]
impl ArtworkStore for LocalStore {
    async fn list(&self) -> Result<Vec<StoredArtwork>, StoreError> {
        let mut entries = tokio::fs::read_dir(&self.root)
            .await
            .map_err(|e| StoreError::Io(format!("read_dir {}: {}", self.root.display(), e)))?;

        let mut artworks = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| StoreError::Io(e.to_string()))?
        {
            let meta = entry
                .metadata()
                .await
                .map_err(|e| StoreError::Io(e.to_string()))?;
            if !meta.is_file() {
                continue;
            }
            // Non-UTF-8 names cannot have come from this server; skip them.
            let Ok(filename) = entry.file_name().into_string() else {
                continue;
            };
            artworks.push(StoredArtwork {
                url: self.url_for(&filename),
                filename,
                size: meta.len(),
            });
        }

        Ok(artworks)
    }

    async fn put(
        &self,
        filename: &str,
        _content_type: &str,
        data: Bytes,
    ) -> Result<StoredArtwork, StoreError> {
        validate_name(filename)?;

        let path = self.root.join(filename);
        let size = data.len() as u64;
        tokio::fs::write(&path, &data)
            .await
            .map_err(|e| StoreError::Io(format!("write {}: {}", path.display(), e)))?;

        debug!(filename = filename, size = size, "stored artwork on disk");

        Ok(StoredArtwork {
            filename: filename.to_string(),
            url: self.url_for(filename),
            size,
        })
    }

    async fn delete(&self, filename: &str) -> Result<(), StoreError> {
        validate_name(filename)?;

        let path = self.root.join(filename);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                debug!(filename = filename, "deleted artwork from disk");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StoreError::NotFound(filename.to_string()))
            }
            Err(e) => Err(StoreError::Io(format!("remove {}: {}", path.display(), e))),
        }
    }
}
