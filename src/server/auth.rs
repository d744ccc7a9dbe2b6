//! Session authentication for the gallery.
//!
//! Sign-in goes through an OAuth provider (Google); the callback checks
//! the user's email against a configured allow-list and, when admitted,
//! sets a stateless session cookie. The cookie is HMAC-SHA256 signed so
//! the server keeps no session state.
//!
//! # Cookie Scheme
//!
//! ```text
//! gallery_session = {email-urlencoded}.{expiry-unix}.{hex hmac}
//! mac = HMAC-SHA256(secret_key, "{email}:{expiry}")
//! ```
//!
//! # Security Properties
//!
//! - **Tamper-proof**: the MAC binds the email and expiry together
//! - **Time-limited**: sessions expire after a configurable TTL
//! - **Constant-time comparison**: MAC verification uses constant-time
//!   comparison to prevent timing attacks
//! - **Revocable**: the middleware re-checks the allow-list on every
//!   request, so removing an email locks the user out immediately
//!
//! # Example
//!
//! ```rust
//! use std::time::Duration;
//! use gallery_server::server::auth::SessionAuth;
//!
//! let auth = SessionAuth::new("my-secret-key", Duration::from_secs(3600));
//! let (cookie, _expiry) = auth.issue("ada@example.com");
//! let user = auth.verify(&cookie).unwrap();
//! assert_eq!(user.email, "ada@example.com");
//! ```

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;
use subtle::ConstantTimeEq;
use tracing::{debug, error, warn};

use super::handlers::ErrorResponse;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "gallery_session";

/// HMAC-SHA256 type alias
type HmacSha256 = Hmac<Sha256>;

// =============================================================================
// Errors
// =============================================================================

/// Authentication error types.
#[derive(Debug, Clone)]
pub enum AuthError {
    /// No session cookie on the request
    MissingSession,

    /// Session cookie is malformed or has a bad MAC
    InvalidSession,

    /// Session has expired
    SessionExpired {
        /// When the session expired
        expired_at: u64,
        /// Current time
        current_time: u64,
    },

    /// Signed-in email is not on the allow-list
    EmailNotAllowed { email: String },

    /// OAuth callback arrived without a `code` parameter
    MissingCode,

    /// OAuth token or userinfo exchange failed
    Exchange(String),
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthError::MissingSession => write!(f, "Not signed in"),
            AuthError::InvalidSession => write!(f, "Invalid session"),
            AuthError::SessionExpired {
                expired_at,
                current_time,
            } => write!(
                f,
                "Session expired at {} (current time: {})",
                expired_at, current_time
            ),
            AuthError::EmailNotAllowed { email } => {
                write!(f, "Unauthorized: {} is not on the allow-list", email)
            }
            AuthError::MissingCode => write!(f, "Missing authorization code"),
            AuthError::Exchange(msg) => write!(f, "OAuth exchange failed: {}", msg),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, error_type) = match &self {
            AuthError::MissingSession => (StatusCode::UNAUTHORIZED, "not_signed_in"),
            AuthError::InvalidSession => (StatusCode::UNAUTHORIZED, "invalid_session"),
            AuthError::SessionExpired { .. } => (StatusCode::UNAUTHORIZED, "session_expired"),
            AuthError::EmailNotAllowed { .. } => (StatusCode::UNAUTHORIZED, "email_not_allowed"),
            AuthError::MissingCode => (StatusCode::BAD_REQUEST, "missing_code"),
            AuthError::Exchange(_) => (StatusCode::BAD_GATEWAY, "oauth_exchange_failed"),
        };

        let message = self.to_string();

        // A rejected email or a bad MAC is worth noticing; expired and
        // missing sessions are routine.
        match &self {
            AuthError::EmailNotAllowed { .. } | AuthError::InvalidSession => {
                warn!(
                    error_type = error_type,
                    status = status.as_u16(),
                    "Authentication failed: {}",
                    message
                );
            }
            AuthError::Exchange(_) => {
                error!(
                    error_type = error_type,
                    status = status.as_u16(),
                    "OAuth exchange error: {}",
                    message
                );
            }
            _ => {
                debug!(
                    error_type = error_type,
                    status = status.as_u16(),
                    "Authentication failed: {}",
                    message
                );
            }
        }

        let error_response = ErrorResponse::with_status(error_type, message, status);
        (status, Json(error_response)).into_response()
    }
}

// =============================================================================
// Allow-list
// =============================================================================

/// The set of emails admitted to the gallery.
///
/// Built from a comma-separated config value; membership is
/// case-insensitive.
#[derive(Debug, Clone, Default)]
pub struct AllowList {
    emails: Vec<String>,
}

impl AllowList {
    /// Build an allow-list from explicit entries.
    pub fn new(emails: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            emails: emails
                .into_iter()
                .map(|e| e.into().trim().to_lowercase())
                .filter(|e| !e.is_empty())
                .collect(),
        }
    }

    /// Parse a comma-separated allow-list, trimming whitespace around
    /// each entry.
    pub fn from_csv(csv: &str) -> Self {
        Self::new(csv.split(','))
    }

    /// Whether the email is admitted.
    pub fn contains(&self, email: &str) -> bool {
        let email = email.trim().to_lowercase();
        self.emails.iter().any(|e| *e == email)
    }

    /// Whether the list has no entries.
    pub fn is_empty(&self) -> bool {
        self.emails.is_empty()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.emails.len()
    }
}

// =============================================================================
// Session cookies
// =============================================================================

/// The signed-in user, injected into request extensions by the
/// session middleware.
#[derive(Debug, Clone)]
pub struct SessionUser {
    /// Email address from the verified session
    pub email: String,
}

/// Stateless session cookie issuer and verifier using HMAC-SHA256.
#[derive(Clone)]
pub struct SessionAuth {
    /// Secret key for HMAC computation
    secret_key: Vec<u8>,

    /// Session lifetime
    ttl: Duration,
}

impl SessionAuth {
    /// Create a new session authenticator.
    ///
    /// # Arguments
    ///
    /// * `secret_key` - The secret key used for HMAC computation. Should
    ///   be at least 32 bytes.
    /// * `ttl` - How long issued sessions stay valid.
    pub fn new(secret_key: impl AsRef<[u8]>, ttl: Duration) -> Self {
        Self {
            secret_key: secret_key.as_ref().to_vec(),
            ttl,
        }
    }

    /// The configured session lifetime.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issue a session cookie value for an email.
    ///
    /// Returns the cookie value and the expiry timestamp (Unix epoch
    /// seconds).
    pub fn issue(&self, email: &str) -> (String, u64) {
        let expiry = now_unix() + self.ttl.as_secs();
        (self.issue_with_expiry(email, expiry), expiry)
    }

    /// Issue a session cookie value with a specific expiry timestamp.
    pub fn issue_with_expiry(&self, email: &str, expiry: u64) -> String {
        let mac = self.compute_mac(email, expiry);
        format!("{}.{}.{}", urlencoding::encode(email), expiry, mac)
    }

    /// Verify a session cookie value.
    ///
    /// Checks expiry first, then the MAC in constant time.
    pub fn verify(&self, cookie_value: &str) -> Result<SessionUser, AuthError> {
        // Emails contain dots, so parse from the right.
        let mut parts = cookie_value.rsplitn(3, '.');
        let (Some(mac), Some(expiry), Some(email_enc)) =
            (parts.next(), parts.next(), parts.next())
        else {
            return Err(AuthError::InvalidSession);
        };

        let expiry: u64 = expiry.parse().map_err(|_| AuthError::InvalidSession)?;
        let email = urlencoding::decode(email_enc)
            .map_err(|_| AuthError::InvalidSession)?
            .into_owned();

        let current_time = now_unix();
        if current_time > expiry {
            return Err(AuthError::SessionExpired {
                expired_at: expiry,
                current_time,
            });
        }

        let provided = hex::decode(mac).map_err(|_| AuthError::InvalidSession)?;
        let expected =
            hex::decode(self.compute_mac(&email, expiry)).map_err(|_| AuthError::InvalidSession)?;

        if provided.ct_eq(&expected).into() {
            Ok(SessionUser { email })
        } else {
            Err(AuthError::InvalidSession)
        }
    }

    /// Compute the hex-encoded MAC over an email and expiry.
    fn compute_mac(&self, email: &str, expiry: u64) -> String {
        let mut mac =
            HmacSha256::new_from_slice(&self.secret_key).expect("HMAC accepts any key length");
        mac.update(email.as_bytes());
        mac.update(b":");
        mac.update(expiry.to_string().as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }
}

/// Build the `Set-Cookie` header value for a fresh session.
pub fn session_cookie(value: &str, max_age: Duration) -> String {
    format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        SESSION_COOKIE,
        value,
        max_age.as_secs()
    )
}

/// Build the `Set-Cookie` header value that clears the session.
pub fn clear_session_cookie() -> String {
    format!("{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0", SESSION_COOKIE)
}

/// Pull the session cookie value out of a `Cookie` header.
fn session_from_cookie_header(header: &str) -> Option<&str> {
    header.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        (name == SESSION_COOKIE).then_some(value)
    })
}

fn now_unix() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

// =============================================================================
// Middleware
// =============================================================================

/// State for [`session_middleware`]: the verifier plus the allow-list.
#[derive(Clone)]
pub struct SessionLayer {
    pub auth: SessionAuth,
    pub allow_list: AllowList,
}

/// Axum middleware protecting the mutating gallery routes.
///
/// Verifies the session cookie, re-checks the allow-list, and injects
/// [`SessionUser`] into request extensions for downstream handlers.
pub async fn session_middleware(
    State(layer): State<SessionLayer>,
    mut request: Request,
    next: Next,
) -> Response {
    let cookie_header = request
        .headers()
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok());

    let Some(cookie_value) = cookie_header.and_then(session_from_cookie_header) else {
        return AuthError::MissingSession.into_response();
    };

    let user = match layer.auth.verify(cookie_value) {
        Ok(user) => user,
        Err(e) => return e.into_response(),
    };

    // Allow-list removals take effect on the next request, not at
    // cookie expiry.
    if !layer.allow_list.contains(&user.email) {
        return AuthError::EmailNotAllowed { email: user.email }.into_response();
    }

    debug!(email = %user.email, "session verified");
    request.extensions_mut().insert(user);
    next.run(request).await
}

// =============================================================================
// OAuth client
// =============================================================================

/// Default Google OAuth endpoints.
pub const GOOGLE_AUTH_ENDPOINT: &str = "https://accounts.google.com/o/oauth2/v2/auth";
pub const GOOGLE_TOKEN_ENDPOINT: &str = "https://oauth2.googleapis.com/token";
pub const GOOGLE_USERINFO_ENDPOINT: &str = "https://openidconnect.googleapis.com/v1/userinfo";

/// Profile returned by the userinfo endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct OAuthUser {
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub picture: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Minimal OAuth 2.0 authorization-code client for the sign-in flow.
///
/// Endpoints default to Google but are overridable, which keeps tests and
/// self-hosted identity providers off the public internet.
#[derive(Clone)]
pub struct OAuthClient {
    client_id: String,
    client_secret: String,
    redirect_url: String,
    auth_endpoint: String,
    token_endpoint: String,
    userinfo_endpoint: String,
    http: reqwest::Client,
}

impl OAuthClient {
    /// Create a client against the default Google endpoints.
    pub fn google(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        redirect_url: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            redirect_url: redirect_url.into(),
            auth_endpoint: GOOGLE_AUTH_ENDPOINT.to_string(),
            token_endpoint: GOOGLE_TOKEN_ENDPOINT.to_string(),
            userinfo_endpoint: GOOGLE_USERINFO_ENDPOINT.to_string(),
            http: reqwest::Client::new(),
        }
    }

    /// Override the provider endpoints (tests, self-hosted providers).
    pub fn with_endpoints(
        mut self,
        auth_endpoint: impl Into<String>,
        token_endpoint: impl Into<String>,
        userinfo_endpoint: impl Into<String>,
    ) -> Self {
        self.auth_endpoint = auth_endpoint.into();
        self.token_endpoint = token_endpoint.into();
        self.userinfo_endpoint = userinfo_endpoint.into();
        self
    }

    /// The URL to send the browser to for sign-in.
    pub fn authorize_url(&self) -> String {
        format!(
            "{}?client_id={}&redirect_uri={}&response_type=code&scope={}",
            self.auth_endpoint,
            urlencoding::encode(&self.client_id),
            urlencoding::encode(&self.redirect_url),
            urlencoding::encode("openid email profile"),
        )
    }

    /// Exchange an authorization code for the user's profile.
    ///
    /// Runs the code/token exchange and then fetches userinfo with the
    /// access token.
    pub async fn exchange_code(&self, code: &str) -> Result<OAuthUser, AuthError> {
        let token: TokenResponse = self
            .http
            .post(&self.token_endpoint)
            .form(&[
                ("code", code),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("redirect_uri", self.redirect_url.as_str()),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await
            .map_err(|e| AuthError::Exchange(format!("token request: {}", e)))?
            .error_for_status()
            .map_err(|e| AuthError::Exchange(format!("token request: {}", e)))?
            .json()
            .await
            .map_err(|e| AuthError::Exchange(format!("token response: {}", e)))?;

        let user: OAuthUser = self
            .http
            .get(&self.userinfo_endpoint)
            .bearer_auth(&token.access_token)
            .send()
            .await
            .map_err(|e| AuthError::Exchange(format!("userinfo request: {}", e)))?
            .error_for_status()
            .map_err(|e| AuthError::Exchange(format!("userinfo request: {}", e)))?
            .json()
            .await
            .map_err(|e| AuthError::Exchange(format!("userinfo response: {}", e)))?;

        Ok(user)
    }
}

// =============================================================================
// Tests
// =============================================================================
