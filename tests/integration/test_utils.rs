//! Test utilities for integration tests.
//!
//! This module provides an in-memory mock store, a deliberately failing
//! store, and helpers for building multipart upload requests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request};
use bytes::Bytes;

use gallery_server::error::StoreError;
use gallery_server::store::{ArtworkStore, StoredArtwork};

/// Multipart boundary used by the request builders.
pub const BOUNDARY: &str = "test-boundary-7MA4YWxkTrZu0gW";

// =============================================================================
// Mock Store
// =============================================================================

/// An in-memory store that serves pre-configured artworks.
///
/// The object map is shared behind an Arc so tests can keep a handle and
/// inspect the contents after the router has taken ownership.
#[derive(Clone, Default)]
pub struct MockStore {
    objects: Arc<Mutex<HashMap<String, Bytes>>>,
}

impl MockStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with an artwork.
    pub fn with_artwork(self, filename: impl Into<String>, data: impl Into<Bytes>) -> Self {
        self.objects
            .lock()
            .unwrap()
            .insert(filename.into(), data.into());
        self
    }

    /// Snapshot of the stored filenames.
    pub fn filenames(&self) -> Vec<String> {
        let mut names: Vec<String> = self.objects.lock().unwrap().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn contains(&self, filename: &str) -> bool {
        self.objects.lock().unwrap().contains_key(filename)
    }
}

#[async_trait]
impl ArtworkStore for MockStore {
    async fn list(&self) -> Result<Vec<StoredArtwork>, StoreError> {
        Ok(self
            .objects
            .lock()
            .unwrap()
            .iter()
            .map(|(name, data)| StoredArtwork {
                filename: name.clone(),
                url: format!("/artworks/files/{}", urlencoding::encode(name)),
                size: data.len() as u64,
            })
            .collect())
    }

    async fn put(
        &self,
        filename: &str,
        _content_type: &str,
        data: Bytes,
    ) -> Result<StoredArtwork, StoreError> {
        let size = data.len() as u64;
        self.objects
            .lock()
            .unwrap()
            .insert(filename.to_string(), data);
        Ok(StoredArtwork {
            filename: filename.to_string(),
            url: format!("/artworks/files/{}", urlencoding::encode(filename)),
            size,
        })
    }

    async fn delete(&self, filename: &str) -> Result<(), StoreError> {
        self.objects
            .lock()
            .unwrap()
            .remove(filename)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound(filename.to_string()))
    }
}

// =============================================================================
// Failing Store
// =============================================================================

/// A store where every operation fails, for exercising 5xx paths.
#[derive(Clone)]
pub struct FailingStore;

#[async_trait]
impl ArtworkStore for FailingStore {
    async fn list(&self) -> Result<Vec<StoredArtwork>, StoreError> {
        Err(StoreError::Io("disk unavailable".to_string()))
    }

    async fn put(
        &self,
        _filename: &str,
        _content_type: &str,
        _data: Bytes,
    ) -> Result<StoredArtwork, StoreError> {
        Err(StoreError::Io("disk unavailable".to_string()))
    }

    async fn delete(&self, _filename: &str) -> Result<(), StoreError> {
        Err(StoreError::Io("disk unavailable".to_string()))
    }
}

// =============================================================================
// Request Builders
// =============================================================================

/// Build a multipart upload body with a single file part.
pub fn multipart_file(filename: Option<&str>, content_type: &str, data: &[u8]) -> Vec<u8> {
    multipart_body(filename, content_type, data, None)
}

/// Build a multipart upload body with a file part and a title part.
pub fn multipart_body(
    filename: Option<&str>,
    content_type: &str,
    data: &[u8],
    title: Option<&str>,
) -> Vec<u8> {
    let mut body = Vec::new();

    body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    match filename {
        Some(name) => body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"file\"; filename=\"{}\"\r\n",
                name
            )
            .as_bytes(),
        ),
        None => {
            body.extend_from_slice(b"Content-Disposition: form-data; name=\"file\"\r\n");
        }
    }
    body.extend_from_slice(format!("Content-Type: {}\r\n\r\n", content_type).as_bytes());
    body.extend_from_slice(data);
    body.extend_from_slice(b"\r\n");

    if let Some(title) = title {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        body.extend_from_slice(b"Content-Disposition: form-data; name=\"title\"\r\n\r\n");
        body.extend_from_slice(title.as_bytes());
        body.extend_from_slice(b"\r\n");
    }

    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

/// Build a `POST /upload` request carrying the given multipart body.
pub fn upload_request(body: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

/// Build a `POST /upload` request with a session cookie attached.
pub fn upload_request_with_cookie(body: Vec<u8>, cookie_value: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .header(
            header::COOKIE,
            format!("gallery_session={}", cookie_value),
        )
        .body(Body::from(body))
        .unwrap()
}

/// Build a `DELETE /artworks` request with a JSON body.
pub fn delete_request(json_body: &str) -> Request<Body> {
    Request::builder()
        .method("DELETE")
        .uri("/artworks")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json_body.to_string()))
        .unwrap()
}

/// A tiny valid PNG header; enough for the store, which never decodes.
pub fn png_bytes() -> Vec<u8> {
    let mut data = vec![0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
    data.extend_from_slice(&[0u8; 32]);
    data
}
