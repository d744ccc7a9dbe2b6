//! HTTP request handlers for the gallery API.
//!
//! # Endpoints
//!
//! - `GET /artworks` - List the gallery
//! - `POST /upload` - Upload an artwork (multipart)
//! - `DELETE /artworks` - Delete an artwork by filename
//! - `GET /health` - Health check
//! - `GET /auth/google/login`, `GET /auth/google`, `POST /auth/logout`

use std::sync::Arc;

use axum::{
    extract::{Multipart, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Redirect, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::error::{GalleryError, StoreError};
use crate::gallery::{Artwork, ArtworkUpload, GalleryService};
use crate::store::ArtworkStore;

use super::auth::{
    clear_session_cookie, session_cookie, AllowList, AuthError, OAuthClient, SessionAuth,
};

// =============================================================================
// Application State
// =============================================================================

/// Everything the sign-in flow needs, carried in [`AppState`] when
/// authentication is enabled.
#[derive(Clone)]
pub struct AuthContext {
    /// Session cookie issuer/verifier
    pub sessions: SessionAuth,

    /// Admitted emails
    pub allow_list: AllowList,

    /// OAuth provider client
    pub oauth: OAuthClient,

    /// Where the browser lands after a successful sign-in
    pub post_login_redirect: String,
}

/// Shared application state containing the gallery service.
///
/// This is passed to all handlers via Axum's State extractor.
pub struct AppState<S: ArtworkStore> {
    /// The gallery service for processing requests
    pub gallery: Arc<GalleryService<S>>,

    /// Sign-in configuration; None when auth is disabled
    pub auth: Option<AuthContext>,
}

impl<S: ArtworkStore> AppState<S> {
    /// Create a new application state with the given service.
    pub fn new(gallery: GalleryService<S>) -> Self {
        Self {
            gallery: Arc::new(gallery),
            auth: None,
        }
    }

    /// Attach the sign-in configuration.
    pub fn with_auth(mut self, auth: AuthContext) -> Self {
        self.auth = Some(auth);
        self
    }
}

impl<S: ArtworkStore> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            gallery: Arc::clone(&self.gallery),
            auth: self.auth.clone(),
        }
    }
}

// =============================================================================
// Request / Response Types
// =============================================================================

/// JSON error response returned for all error conditions.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error type identifier (e.g., "not_found", "not_an_image")
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// HTTP status code (included for convenience)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
}

impl ErrorResponse {
    /// Create a new error response.
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            status: None,
        }
    }

    /// Create a new error response with status code.
    pub fn with_status(
        error: impl Into<String>,
        message: impl Into<String>,
        status: StatusCode,
    ) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            status: Some(status.as_u16()),
        }
    }
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,

    /// Service version
    pub version: String,
}

/// Response from a successful upload.
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub success: bool,
    pub message: String,
    pub artwork: Artwork,
}

/// Body of a delete request.
#[derive(Debug, Deserialize)]
pub struct DeleteRequest {
    /// Filename (or, for the S3 backend, the public URL) to delete.
    /// Optional so a missing field maps to 400 rather than a
    /// deserialization rejection.
    #[serde(default)]
    pub filename: Option<String>,
}

/// Response from a successful delete.
#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub success: bool,
    pub message: String,
    pub deleted: String,
}

/// Query parameters on the OAuth callback.
#[derive(Debug, Deserialize)]
pub struct OAuthCallbackParams {
    #[serde(default)]
    pub code: Option<String>,

    /// Set by the provider when the user cancelled or the request failed
    #[serde(default)]
    pub error: Option<String>,
}

// =============================================================================
// Error Mapping
// =============================================================================

/// Convert GalleryError to an HTTP response.
///
/// 4xx errors are logged at WARN level (client errors), 5xx at ERROR,
/// and 404s at DEBUG (common and expected).
impl IntoResponse for GalleryError {
    fn into_response(self) -> Response {
        let (status, error_type) = match &self {
            GalleryError::EmptyUpload => (StatusCode::BAD_REQUEST, "no_file"),
            GalleryError::NotAnImage { .. } => (StatusCode::BAD_REQUEST, "not_an_image"),
            GalleryError::TooLarge { .. } => (StatusCode::PAYLOAD_TOO_LARGE, "too_large"),
            GalleryError::InvalidFilename { .. } => (StatusCode::BAD_REQUEST, "invalid_filename"),
            GalleryError::MissingFilename => (StatusCode::BAD_REQUEST, "missing_filename"),
            GalleryError::Store(store_err) => match store_err {
                StoreError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
                StoreError::InvalidName(_) => (StatusCode::BAD_REQUEST, "invalid_filename"),
                StoreError::Io(_) => (StatusCode::INTERNAL_SERVER_ERROR, "io_error"),
                StoreError::S3(_) => (StatusCode::INTERNAL_SERVER_ERROR, "storage_error"),
            },
        };

        let message = self.to_string();

        if status.is_server_error() {
            error!(
                error_type = error_type,
                status = status.as_u16(),
                "Server error: {}",
                message
            );
        } else if status == StatusCode::NOT_FOUND {
            debug!(
                error_type = error_type,
                status = status.as_u16(),
                "Resource not found: {}",
                message
            );
        } else {
            warn!(
                error_type = error_type,
                status = status.as_u16(),
                "Client error: {}",
                message
            );
        }

        let error_response = ErrorResponse::with_status(error_type, message, status);
        (status, Json(error_response)).into_response()
    }
}

// =============================================================================
// Gallery Handlers
// =============================================================================

/// Handler for `GET /health`.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Handler for `GET /artworks`.
///
/// Returns the full gallery listing, sorted by filename.
pub async fn list_artworks_handler<S: ArtworkStore>(
    State(state): State<AppState<S>>,
) -> Result<Json<Vec<Artwork>>, GalleryError> {
    let artworks = state.gallery.list_artworks().await?;
    debug!(count = artworks.len(), "listed artworks");
    Ok(Json(artworks))
}

/// Handler for `POST /upload`.
///
/// Reads the multipart form: the first field carrying file data becomes
/// the artwork, and an optional `title` field names it.
pub async fn upload_handler<S: ArtworkStore>(
    State(state): State<AppState<S>>,
    mut multipart: Multipart,
) -> Result<Response, GalleryError> {
    let mut upload = ArtworkUpload::default();
    let mut saw_file = false;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| GalleryError::EmptyUpload)?
    {
        let field_name = field.name().map(String::from);
        match field_name.as_deref() {
            Some("title") => {
                if let Ok(text) = field.text().await {
                    upload.title = Some(text);
                }
            }
            // Any other field with bytes is treated as the file; the
            // original took the first part of the form.
            _ if !saw_file => {
                upload.filename = field.file_name().map(String::from);
                upload.content_type = field.content_type().map(String::from);
                upload.data = field
                    .bytes()
                    .await
                    .map_err(|_| GalleryError::EmptyUpload)?;
                saw_file = true;
            }
            _ => {}
        }
    }

    if !saw_file {
        return Err(GalleryError::EmptyUpload);
    }

    let artwork = state.gallery.upload(upload).await?;

    let response = UploadResponse {
        success: true,
        message: "Artifact summoned successfully!".to_string(),
        artwork,
    };
    Ok((StatusCode::CREATED, Json(response)).into_response())
}

/// Handler for `DELETE /artworks`.
pub async fn delete_artwork_handler<S: ArtworkStore>(
    State(state): State<AppState<S>>,
    Json(request): Json<DeleteRequest>,
) -> Result<Json<DeleteResponse>, GalleryError> {
    let filename = request.filename.ok_or(GalleryError::MissingFilename)?;

    state.gallery.delete(&filename).await?;

    Ok(Json(DeleteResponse {
        success: true,
        message: "Artifact banished.".to_string(),
        deleted: filename,
    }))
}

// =============================================================================
// Auth Handlers
// =============================================================================

/// Handler for `GET /auth/google/login`: send the browser to the
/// provider's consent screen.
pub async fn oauth_login_handler<S: ArtworkStore>(
    State(state): State<AppState<S>>,
) -> Result<Redirect, StatusCode> {
    let auth = state.auth.as_ref().ok_or(StatusCode::NOT_FOUND)?;
    Ok(Redirect::temporary(&auth.oauth.authorize_url()))
}

/// Handler for `GET /auth/google`: the OAuth callback.
///
/// Exchanges the authorization code, checks the email against the
/// allow-list, and sets the session cookie on success.
pub async fn oauth_callback_handler<S: ArtworkStore>(
    State(state): State<AppState<S>>,
    Query(params): Query<OAuthCallbackParams>,
) -> Result<Response, AuthError> {
    let Some(auth) = state.auth.as_ref() else {
        return Ok(StatusCode::NOT_FOUND.into_response());
    };

    if let Some(provider_error) = params.error {
        return Err(AuthError::Exchange(format!(
            "provider returned error: {}",
            provider_error
        )));
    }

    let code = params.code.ok_or(AuthError::MissingCode)?;
    let user = auth.oauth.exchange_code(&code).await?;

    if !auth.allow_list.contains(&user.email) {
        return Err(AuthError::EmailNotAllowed { email: user.email });
    }

    let (cookie_value, _expiry) = auth.sessions.issue(&user.email);
    info!(email = %user.email, "user signed in");

    let response = (
        [(
            header::SET_COOKIE,
            session_cookie(&cookie_value, auth.sessions.ttl()),
        )],
        Redirect::to(&auth.post_login_redirect),
    )
        .into_response();

    Ok(response)
}

/// Handler for `POST /auth/logout`: clear the session cookie.
pub async fn logout_handler<S: ArtworkStore>(State(state): State<AppState<S>>) -> Response {
    if state.auth.is_none() {
        return StatusCode::NOT_FOUND.into_response();
    }

    (
        [(header::SET_COOKIE, clear_session_cookie())],
        Redirect::to("/"),
    )
        .into_response()
}

// =============================================================================
// Tests
// =============================================================================
