//! HTTP server layer for the gallery.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                         HTTP Layer                              │
//! │   GET /artworks   POST /upload   DELETE /artworks               │
//! │                                                                 │
//! │  ┌─────────────┐  ┌─────────────┐  ┌─────────────────────────┐  │
//! │  │  handlers   │  │    auth     │  │        routes           │  │
//! │  │ (requests)  │  │ (sessions,  │  │  (router config)        │  │
//! │  │             │  │  OAuth)     │  │                         │  │
//! │  └─────────────┘  └─────────────┘  └─────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod auth;
pub mod handlers;
pub mod routes;

pub use auth::{
    clear_session_cookie, session_cookie, session_middleware, AllowList, AuthError, OAuthClient,
    OAuthUser, SessionAuth, SessionLayer, SessionUser, SESSION_COOKIE,
};
pub use handlers::{
    delete_artwork_handler, health_handler, list_artworks_handler, logout_handler,
    oauth_callback_handler, oauth_login_handler, upload_handler, AppState, AuthContext,
    DeleteRequest, DeleteResponse, ErrorResponse, HealthResponse, OAuthCallbackParams,
    UploadResponse,
};
pub use routes::{
    create_dev_router, create_router, OAuthSettings, RouterConfig, DEFAULT_SESSION_TTL_SECS,
};
