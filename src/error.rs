use thiserror::Error;

/// Errors from the storage backends (local directory or S3).
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// The named artwork does not exist in the store
    #[error("Artwork not found: {0}")]
    NotFound(String),

    /// Name rejected before touching the backend (traversal, empty, ...)
    #[error("Invalid artwork name: {0}")]
    InvalidName(String),

    /// Local filesystem error
    #[error("I/O error: {0}")]
    Io(String),

    /// Error from S3 or S3-compatible storage
    #[error("S3 error: {0}")]
    S3(String),
}

/// Errors from the gallery service layer.
///
/// Upload validation failures map to 4xx responses; store failures keep
/// their own granularity via the wrapped [`StoreError`].
#[derive(Debug, Clone, Error)]
pub enum GalleryError {
    /// Upload contained no file data
    #[error("No file uploaded")]
    EmptyUpload,

    /// Content type did not start with `image/` (should map to HTTP 400)
    #[error("Must be an image, got content type: {content_type}")]
    NotAnImage { content_type: String },

    /// Upload exceeds the configured size limit (should map to HTTP 413)
    #[error("File too large: {size} bytes (max {max_bytes})")]
    TooLarge { size: u64, max_bytes: u64 },

    /// Filename failed sanitization
    #[error("Invalid filename: {name}")]
    InvalidFilename { name: String },

    /// Delete request without a filename
    #[error("Filename required")]
    MissingFilename,

    /// Storage backend error
    #[error(transparent)]
    Store(#[from] StoreError),
}
