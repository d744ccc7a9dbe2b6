//! # Gallery Server
//!
//! A small HTTP server for a private image gallery: list, upload and
//! delete artworks over interchangeable storage backends.
//!
//! ## Features
//!
//! - **Pluggable storage**: the same three endpoints run against a local
//!   directory or an S3-compatible bucket
//! - **Allow-list sign-in**: OAuth (Google) with admission restricted to
//!   a configured set of emails
//! - **Stateless sessions**: HMAC-SHA256 signed cookies, no server state
//! - **Safe naming**: user-supplied filenames and titles are sanitized
//!   and path traversal is rejected at the store boundary
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`store`] - Storage backends (local filesystem, S3)
//! - [`gallery`] - Naming rules and the validation service
//! - [`server`] - Axum-based HTTP server, sessions and routes
//! - [`config`] - CLI and configuration types
//!
//! ## Example
//!
//! ```rust,no_run
//! use gallery_server::gallery::GalleryService;
//! use gallery_server::server::{create_router, RouterConfig};
//! use gallery_server::store::LocalStore;
//!
//! #[tokio::main]
//! async fn main() {
//!     let store = LocalStore::new("public/artworks", "/artworks/files");
//!     let service = GalleryService::new(store);
//!
//!     let config = RouterConfig::new("my-secret-key")
//!         .with_allowed_emails(vec!["ada@example.com".to_string()])
//!         .with_serve_dir("public/artworks");
//!
//!     let router = create_router(service, config);
//!
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:3000")
//!         .await
//!         .unwrap();
//!     axum::serve(listener, router).await.unwrap();
//! }
//! ```

pub mod config;
pub mod error;
pub mod gallery;
pub mod server;
pub mod store;

// Re-export commonly used types
pub use config::{Config, StorageBackend};
pub use error::{GalleryError, StoreError};
pub use gallery::{
    display_title, extension_for, sanitize_filename, Artwork, ArtworkUpload, GalleryService,
    DEFAULT_MAX_UPLOAD_BYTES,
};
pub use server::{
    create_dev_router, create_router, AllowList, AppState, AuthError, ErrorResponse,
    HealthResponse, OAuthClient, OAuthSettings, RouterConfig, SessionAuth, SessionUser,
};
pub use store::{create_s3_client, ArtworkStore, LocalStore, S3Store, StoredArtwork};
