//! Router configuration for the gallery server.
//!
//! This module defines the HTTP routes and applies middleware for
//! authentication and CORS.
//!
//! # Route Structure
//!
//! ```text
//! /health                  - Health check (public)
//! /artworks      GET       - List artworks (public)
//! /upload        POST      - Upload an artwork (session required)
//! /artworks      DELETE    - Delete an artwork (session required)
//! /auth/google/login       - Start the sign-in flow
//! /auth/google             - OAuth callback
//! /auth/logout   POST      - Clear the session
//! /artworks/files/{name}   - Static files (local backend only)
//! ```
//!
//! # Example
//!
//! ```ignore
//! use gallery_server::gallery::GalleryService;
//! use gallery_server::server::routes::{create_router, RouterConfig};
//! use gallery_server::store::LocalStore;
//!
//! let store = LocalStore::new("public/artworks", "/artworks/files");
//! let service = GalleryService::new(store);
//!
//! let config = RouterConfig::new("my-secret-key")
//!     .with_allowed_emails(vec!["ada@example.com".to_string()]);
//!
//! let router = create_router(service, config);
//!
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
//! axum::serve(listener, router).await?;
//! ```

use std::path::PathBuf;
use std::time::Duration;

use axum::extract::DefaultBodyLimit;
use axum::routing::{delete, get, post};
use axum::{middleware, Router};
use http::header::{HeaderValue, AUTHORIZATION, CACHE_CONTROL, CONTENT_TYPE};
use http::Method;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::gallery::{GalleryService, DEFAULT_MAX_UPLOAD_BYTES};
use crate::store::ArtworkStore;

use super::auth::{session_middleware, AllowList, OAuthClient, SessionAuth, SessionLayer};
use super::handlers::{
    delete_artwork_handler, health_handler, list_artworks_handler, logout_handler,
    oauth_callback_handler, oauth_login_handler, upload_handler, AppState, AuthContext,
};

/// Default session lifetime: 7 days.
pub const DEFAULT_SESSION_TTL_SECS: u64 = 7 * 24 * 3600;

/// Default Cache-Control max-age for served artwork files (1 hour).
pub const DEFAULT_CACHE_MAX_AGE: u32 = 3600;

// =============================================================================
// Router Configuration
// =============================================================================

/// OAuth provider settings for the sign-in flow.
#[derive(Clone)]
pub struct OAuthSettings {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_url: String,

    /// Endpoint overrides; None uses the Google defaults
    pub auth_endpoint: Option<String>,
    pub token_endpoint: Option<String>,
    pub userinfo_endpoint: Option<String>,
}

impl OAuthSettings {
    fn client(&self) -> OAuthClient {
        let client = OAuthClient::google(
            self.client_id.clone(),
            self.client_secret.clone(),
            self.redirect_url.clone(),
        );
        match (
            &self.auth_endpoint,
            &self.token_endpoint,
            &self.userinfo_endpoint,
        ) {
            (Some(auth), Some(token), Some(userinfo)) => {
                client.with_endpoints(auth.clone(), token.clone(), userinfo.clone())
            }
            _ => client,
        }
    }
}

/// Configuration for the HTTP router.
#[derive(Clone)]
pub struct RouterConfig {
    /// Secret key for session cookie signing
    pub session_secret: String,

    /// Whether the mutating routes require a session
    pub auth_enabled: bool,

    /// Session lifetime in seconds
    pub session_ttl_secs: u64,

    /// Emails admitted by the sign-in flow and the middleware
    pub allowed_emails: Vec<String>,

    /// OAuth provider settings (None = sign-in routes are not mounted)
    pub oauth: Option<OAuthSettings>,

    /// Where the browser is sent after sign-in
    pub post_login_redirect: String,

    /// Allowed CORS origins (None = allow any origin)
    pub cors_origins: Option<Vec<String>>,

    /// Directory to serve at /artworks/files (local backend only)
    pub serve_dir: Option<PathBuf>,

    /// Cache-Control max-age for served files, in seconds
    pub cache_max_age: u32,

    /// Upload size limit in bytes
    pub max_upload_bytes: u64,

    /// Whether to enable request tracing
    pub enable_tracing: bool,
}

impl RouterConfig {
    /// Create a new router configuration with the given session secret.
    ///
    /// By default:
    /// - Authentication is enabled (add emails with
    ///   [`with_allowed_emails`](Self::with_allowed_emails))
    /// - Sessions last 7 days
    /// - CORS allows any origin
    /// - Tracing is enabled
    pub fn new(session_secret: impl Into<String>) -> Self {
        Self {
            session_secret: session_secret.into(),
            auth_enabled: true,
            session_ttl_secs: DEFAULT_SESSION_TTL_SECS,
            allowed_emails: Vec::new(),
            oauth: None,
            post_login_redirect: "/upload".to_string(),
            cors_origins: None,
            serve_dir: None,
            cache_max_age: DEFAULT_CACHE_MAX_AGE,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            enable_tracing: true,
        }
    }

    /// Create a configuration with authentication disabled.
    ///
    /// **Warning**: This should only be used for development/testing.
    pub fn without_auth() -> Self {
        Self {
            session_secret: String::new(),
            auth_enabled: false,
            ..Self::new("")
        }
    }

    /// Set the admitted emails.
    pub fn with_allowed_emails(mut self, emails: Vec<String>) -> Self {
        self.allowed_emails = emails;
        self
    }

    /// Set the OAuth provider settings, mounting the sign-in routes.
    pub fn with_oauth(mut self, oauth: OAuthSettings) -> Self {
        self.oauth = Some(oauth);
        self
    }

    /// Set the session lifetime in seconds.
    pub fn with_session_ttl_secs(mut self, secs: u64) -> Self {
        self.session_ttl_secs = secs;
        self
    }

    /// Set where the browser lands after sign-in.
    pub fn with_post_login_redirect(mut self, path: impl Into<String>) -> Self {
        self.post_login_redirect = path.into();
        self
    }

    /// Set specific allowed CORS origins.
    ///
    /// Pass None (or don't call this method) to allow any origin.
    pub fn with_cors_origins(mut self, origins: Vec<String>) -> Self {
        self.cors_origins = Some(origins);
        self
    }

    /// Serve artwork files from a directory at `/artworks/files`.
    pub fn with_serve_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.serve_dir = Some(dir.into());
        self
    }

    /// Set the Cache-Control max-age for served files.
    pub fn with_cache_max_age(mut self, seconds: u32) -> Self {
        self.cache_max_age = seconds;
        self
    }

    /// Set the upload size limit in bytes.
    pub fn with_max_upload_bytes(mut self, bytes: u64) -> Self {
        self.max_upload_bytes = bytes;
        self
    }

    /// Enable or disable request tracing.
    pub fn with_tracing(mut self, enabled: bool) -> Self {
        self.enable_tracing = enabled;
        self
    }
}

// =============================================================================
// Router Builder
// =============================================================================

/// Create the main application router.
///
/// Builds the complete Axum router with:
/// - Public routes (health check, gallery listing, sign-in flow)
/// - Protected routes (upload and delete, behind the session middleware)
/// - Static file serving for the local backend
/// - CORS configuration and optional request tracing
pub fn create_router<S>(service: GalleryService<S>, config: RouterConfig) -> Router
where
    S: ArtworkStore,
{
    let mut app_state = AppState::new(service);

    let session_layer = if config.auth_enabled {
        let sessions = SessionAuth::new(
            &config.session_secret,
            Duration::from_secs(config.session_ttl_secs),
        );
        let allow_list = AllowList::new(config.allowed_emails.clone());

        if let Some(ref oauth) = config.oauth {
            app_state = app_state.with_auth(AuthContext {
                sessions: sessions.clone(),
                allow_list: allow_list.clone(),
                oauth: oauth.client(),
                post_login_redirect: config.post_login_redirect.clone(),
            });
        }

        Some(SessionLayer {
            auth: sessions,
            allow_list,
        })
    } else {
        None
    };

    // Mutating routes; the multipart body limit covers the upload.
    let mut mutating_routes = Router::new()
        .route("/upload", post(upload_handler::<S>))
        .route("/artworks", delete(delete_artwork_handler::<S>))
        .layer(DefaultBodyLimit::max(
            config.max_upload_bytes as usize + 64 * 1024,
        ))
        .with_state(app_state.clone());

    if let Some(session_layer) = session_layer {
        mutating_routes = mutating_routes.layer(middleware::from_fn_with_state(
            session_layer,
            session_middleware,
        ));
    }

    let public_routes = Router::new()
        .route("/health", get(health_handler))
        .route("/artworks", get(list_artworks_handler::<S>))
        .with_state(app_state.clone());

    let mut router = Router::new().merge(mutating_routes).merge(public_routes);

    if config.auth_enabled {
        let auth_routes = Router::new()
            .route("/auth/google/login", get(oauth_login_handler::<S>))
            .route("/auth/google", get(oauth_callback_handler::<S>))
            .route("/auth/logout", post(logout_handler::<S>))
            .with_state(app_state);
        router = router.merge(auth_routes);
    }

    if let Some(ref dir) = config.serve_dir {
        router = router.nest_service("/artworks/files", file_service(dir, config.cache_max_age));
    }

    let router = router.layer(build_cors_layer(&config));

    if config.enable_tracing {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    }
}

/// Static file router for the local backend's public directory.
fn file_service(dir: &PathBuf, cache_max_age: u32) -> Router {
    let cache_value = HeaderValue::from_str(&format!("public, max-age={}", cache_max_age))
        .unwrap_or_else(|_| HeaderValue::from_static("public, max-age=3600"));

    Router::new()
        .fallback_service(ServeDir::new(dir))
        .layer(SetResponseHeaderLayer::if_not_present(
            CACHE_CONTROL,
            cache_value,
        ))
}

/// Build the CORS layer based on configuration.
fn build_cors_layer(config: &RouterConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE])
        .max_age(Duration::from_secs(86400)); // 24 hours

    match &config.cors_origins {
        None => cors.allow_origin(Any),
        Some(origins) if origins.is_empty() => cors,
        Some(origins) => {
            let parsed_origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();
            cors.allow_origin(parsed_origins)
        }
    }
}

// =============================================================================
// Convenience Functions
// =============================================================================

/// Create a development router with authentication disabled.
///
/// **Warning**: This should only be used for local development and
/// testing. Never use this in production.
pub fn create_dev_router<S>(service: GalleryService<S>) -> Router
where
    S: ArtworkStore,
{
    create_router(service, RouterConfig::without_auth())
}

// =============================================================================
// Tests
// =============================================================================
