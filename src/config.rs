//! Configuration management for the gallery server.
//!
//! This module provides a flexible configuration system that supports:
//! - Command-line arguments via clap
//! - Environment variables with `GALLERY_` prefix
//! - Sensible defaults for all optional settings
//!
//! # Example
//!
//! ```ignore
//! use gallery_server::config::Config;
//!
//! // Parse from command line and environment
//! let config = Config::parse();
//!
//! println!("Listening on {}", config.bind_address());
//! ```
//!
//! # Environment Variables
//!
//! All configuration options can be set via environment variables with
//! the `GALLERY_` prefix:
//!
//! - `GALLERY_HOST` - Server bind address (default: 0.0.0.0)
//! - `GALLERY_PORT` - Server port (default: 3000)
//! - `GALLERY_STORAGE` - Storage backend: `local` or `s3` (default: local)
//! - `GALLERY_LOCAL_DIR` - Directory for the local backend
//! - `GALLERY_S3_BUCKET` - Bucket name (required for the s3 backend)
//! - `GALLERY_S3_ENDPOINT` - Custom S3 endpoint for S3-compatible services
//! - `GALLERY_S3_REGION` - AWS region (default: us-east-1)
//! - `GALLERY_SESSION_SECRET` - HMAC secret for session cookies
//! - `GALLERY_ALLOWED_EMAILS` - Comma-separated email allow-list
//! - `GALLERY_GOOGLE_CLIENT_ID` / `GALLERY_GOOGLE_CLIENT_SECRET` -
//!   OAuth client credentials
//! - `GALLERY_OAUTH_REDIRECT_URL` - OAuth callback URL
//! - `GALLERY_MAX_UPLOAD_BYTES` - Upload size limit (default: 10 MiB)

use clap::{Parser, ValueEnum};

use crate::gallery::DEFAULT_MAX_UPLOAD_BYTES;
use crate::server::routes::{DEFAULT_CACHE_MAX_AGE, DEFAULT_SESSION_TTL_SECS};

// =============================================================================
// Default Values
// =============================================================================

/// Default server host.
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default server port.
pub const DEFAULT_PORT: u16 = 3000;

/// Default AWS region.
pub const DEFAULT_REGION: &str = "us-east-1";

/// Default directory for the local backend.
pub const DEFAULT_LOCAL_DIR: &str = "public/artworks";

/// Default URL prefix the local backend's files are served under.
pub const DEFAULT_LOCAL_PUBLIC_BASE: &str = "/artworks/files";

// =============================================================================
// CLI Arguments
// =============================================================================

/// Which storage backend holds the artworks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StorageBackend {
    /// A directory on the local filesystem
    Local,
    /// An S3 or S3-compatible bucket
    S3,
}

/// Gallery Server - a private image gallery over pluggable storage.
///
/// Serves the gallery API from a local directory or an S3-compatible
/// bucket, with sign-in restricted to an email allow-list.
#[derive(Parser, Debug, Clone)]
#[command(name = "gallery-server")]
#[command(author, version, about, long_about = None)]
pub struct Config {
    // =========================================================================
    // Server Configuration
    // =========================================================================
    /// Host address to bind the server to.
    #[arg(long, default_value = DEFAULT_HOST, env = "GALLERY_HOST")]
    pub host: String,

    /// Port to listen on.
    #[arg(short, long, default_value_t = DEFAULT_PORT, env = "GALLERY_PORT")]
    pub port: u16,

    // =========================================================================
    // Storage Configuration
    // =========================================================================
    /// Storage backend for artworks.
    #[arg(long, value_enum, default_value = "local", env = "GALLERY_STORAGE")]
    pub storage: StorageBackend,

    /// Directory holding the artworks (local backend).
    #[arg(long, default_value = DEFAULT_LOCAL_DIR, env = "GALLERY_LOCAL_DIR")]
    pub local_dir: String,

    /// URL prefix the local files are served under.
    #[arg(long, default_value = DEFAULT_LOCAL_PUBLIC_BASE, env = "GALLERY_LOCAL_PUBLIC_BASE")]
    pub local_public_base: String,

    /// S3 bucket name containing the artworks (s3 backend).
    #[arg(long, env = "GALLERY_S3_BUCKET")]
    pub s3_bucket: Option<String>,

    /// Key prefix within the bucket (e.g. "artworks").
    #[arg(long, env = "GALLERY_S3_PREFIX")]
    pub s3_prefix: Option<String>,

    /// Custom S3 endpoint URL for S3-compatible services (MinIO, etc.).
    ///
    /// If not specified, uses the default AWS S3 endpoint.
    #[arg(long, env = "GALLERY_S3_ENDPOINT")]
    pub s3_endpoint: Option<String>,

    /// AWS region for S3.
    #[arg(long, default_value = DEFAULT_REGION, env = "GALLERY_S3_REGION")]
    pub s3_region: String,

    // =========================================================================
    // Authentication Configuration
    // =========================================================================
    /// Require a session for uploads and deletes.
    ///
    /// When disabled, the mutating endpoints are open to anyone.
    /// WARNING: Only disable authentication in development/testing.
    #[arg(
        long,
        default_value_t = true,
        env = "GALLERY_AUTH_ENABLED",
        action = clap::ArgAction::Set
    )]
    pub auth_enabled: bool,

    /// Secret key for HMAC-SHA256 session cookie signing.
    ///
    /// If not provided and auth is enabled, the server will fail to start.
    #[arg(long, env = "GALLERY_SESSION_SECRET")]
    pub session_secret: Option<String>,

    /// Session lifetime in seconds.
    #[arg(long, default_value_t = DEFAULT_SESSION_TTL_SECS, env = "GALLERY_SESSION_TTL")]
    pub session_ttl: u64,

    /// Emails admitted by the sign-in flow (comma-separated).
    #[arg(long, env = "GALLERY_ALLOWED_EMAILS", value_delimiter = ',')]
    pub allowed_emails: Vec<String>,

    /// Google OAuth client ID.
    #[arg(long, env = "GALLERY_GOOGLE_CLIENT_ID")]
    pub google_client_id: Option<String>,

    /// Google OAuth client secret.
    #[arg(long, env = "GALLERY_GOOGLE_CLIENT_SECRET")]
    pub google_client_secret: Option<String>,

    /// OAuth callback URL registered with the provider.
    #[arg(long, env = "GALLERY_OAUTH_REDIRECT_URL")]
    pub oauth_redirect_url: Option<String>,

    /// Where the browser lands after a successful sign-in.
    #[arg(long, default_value = "/upload", env = "GALLERY_POST_LOGIN_REDIRECT")]
    pub post_login_redirect: String,

    // =========================================================================
    // Limits and Caching
    // =========================================================================
    /// Upload size limit in bytes.
    #[arg(long, default_value_t = DEFAULT_MAX_UPLOAD_BYTES, env = "GALLERY_MAX_UPLOAD_BYTES")]
    pub max_upload_bytes: u64,

    /// HTTP Cache-Control max-age for served files, in seconds.
    #[arg(long, default_value_t = DEFAULT_CACHE_MAX_AGE, env = "GALLERY_CACHE_MAX_AGE")]
    pub cache_max_age: u32,

    // =========================================================================
    // CORS Configuration
    // =========================================================================
    /// Allowed CORS origins (comma-separated).
    ///
    /// If not specified, allows any origin.
    #[arg(long, env = "GALLERY_CORS_ORIGINS", value_delimiter = ',')]
    pub cors_origins: Option<Vec<String>>,

    // =========================================================================
    // Logging Configuration
    // =========================================================================
    /// Enable verbose logging (debug level).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,

    /// Disable request tracing.
    #[arg(long, default_value_t = false)]
    pub no_tracing: bool,
}

impl Config {
    /// Validate the configuration and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.storage == StorageBackend::S3
            && self.s3_bucket.as_deref().unwrap_or("").is_empty()
        {
            return Err(
                "S3 storage selected but no bucket provided. \
                 Set --s3-bucket or GALLERY_S3_BUCKET"
                    .to_string(),
            );
        }

        if self.storage == StorageBackend::Local && self.local_dir.is_empty() {
            return Err("local_dir must not be empty".to_string());
        }

        if self.auth_enabled {
            if self.session_secret.as_deref().unwrap_or("").is_empty() {
                return Err(
                    "Authentication is enabled but no session secret provided. \
                     Set --session-secret or GALLERY_SESSION_SECRET, \
                     or disable auth with --auth-enabled=false"
                        .to_string(),
                );
            }

            if self.allowed_emails.iter().all(|e| e.trim().is_empty()) {
                return Err(
                    "Authentication is enabled but the allow-list is empty. \
                     Set --allowed-emails or GALLERY_ALLOWED_EMAILS"
                        .to_string(),
                );
            }

            // The sign-in flow cannot run without the OAuth client settings.
            if self.google_client_id.as_deref().unwrap_or("").is_empty()
                || self.google_client_secret.as_deref().unwrap_or("").is_empty()
                || self.oauth_redirect_url.as_deref().unwrap_or("").is_empty()
            {
                return Err(
                    "Authentication is enabled but the OAuth client is not configured. \
                     Set --google-client-id, --google-client-secret and --oauth-redirect-url"
                        .to_string(),
                );
            }
        }

        if self.max_upload_bytes == 0 {
            return Err("max_upload_bytes must be greater than 0".to_string());
        }

        if self.session_ttl == 0 {
            return Err("session_ttl must be greater than 0".to_string());
        }

        Ok(())
    }

    /// Get the server bind address as "host:port".
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the session secret, or empty if not set (call validate() first).
    pub fn session_secret_or_empty(&self) -> &str {
        self.session_secret.as_deref().unwrap_or("")
    }

    /// Get the S3 bucket, or empty if not set (call validate() first).
    pub fn bucket_or_empty(&self) -> &str {
        self.s3_bucket.as_deref().unwrap_or("")
    }
}

// =============================================================================
// Tests
// =============================================================================
