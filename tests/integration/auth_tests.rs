//! Session authentication integration tests.
//!
//! Tests verify:
//! - Mutating routes require a valid session
//! - Expired and tampered cookies are rejected
//! - Allow-list removals lock out existing sessions
//! - The sign-in routes (login redirect, callback validation, logout)

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use http_body_util::BodyExt;
use tower::ServiceExt;

use gallery_server::gallery::GalleryService;
use gallery_server::server::OAuthSettings;
use gallery_server::{create_router, RouterConfig, SessionAuth};

use super::test_utils::{
    delete_request, multipart_file, png_bytes, upload_request, upload_request_with_cookie,
    MockStore,
};

const TEST_SECRET: &str = "test-secret-key-for-hmac-signing";
const ALLOWED_EMAIL: &str = "ada@example.com";

fn protected_router(store: MockStore) -> axum::Router {
    create_router(
        GalleryService::new(store),
        RouterConfig::new(TEST_SECRET)
            .with_allowed_emails(vec![ALLOWED_EMAIL.to_string()])
            .with_oauth(test_oauth_settings()),
    )
}

fn test_oauth_settings() -> OAuthSettings {
    OAuthSettings {
        client_id: "client-id".to_string(),
        client_secret: "client-secret".to_string(),
        redirect_url: "http://localhost:3000/auth/google".to_string(),
        auth_endpoint: None,
        token_endpoint: None,
        userinfo_endpoint: None,
    }
}

fn session_auth() -> SessionAuth {
    SessionAuth::new(TEST_SECRET, Duration::from_secs(3600))
}

fn now_unix() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

// =============================================================================
// Protected Routes
// =============================================================================

#[tokio::test]
async fn test_upload_without_session_is_401() {
    let router = protected_router(MockStore::new());

    let body = multipart_file(Some("cat.png"), "image/png", &png_bytes());
    let response = router.oneshot(upload_request(body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(response).await;
    assert_eq!(json["error"], "not_signed_in");
}

#[tokio::test]
async fn test_delete_without_session_is_401() {
    let router = protected_router(MockStore::new().with_artwork("cat.png", png_bytes()));

    let response = router
        .oneshot(delete_request(r#"{"filename":"cat.png"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_listing_is_public() {
    let router = protected_router(MockStore::new());

    let request = Request::builder()
        .uri("/artworks")
        .body(Body::empty())
        .unwrap();
    let response = router.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_upload_with_valid_session_succeeds() {
    let store = MockStore::new();
    let router = protected_router(store.clone());

    let (cookie, _) = session_auth().issue(ALLOWED_EMAIL);
    let body = multipart_file(Some("cat.png"), "image/png", &png_bytes());
    let response = router
        .oneshot(upload_request_with_cookie(body, &cookie))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    assert!(store.contains("cat.png"));
}

#[tokio::test]
async fn test_delete_with_valid_session_succeeds() {
    let store = MockStore::new().with_artwork("cat.png", png_bytes());
    let router = protected_router(store.clone());

    let (cookie, _) = session_auth().issue(ALLOWED_EMAIL);
    let request = Request::builder()
        .method("DELETE")
        .uri("/artworks")
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::COOKIE, format!("gallery_session={}", cookie))
        .body(Body::from(r#"{"filename":"cat.png"}"#))
        .unwrap();

    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(!store.contains("cat.png"));
}

// =============================================================================
// Bad Sessions
// =============================================================================

#[tokio::test]
async fn test_expired_session_is_rejected() {
    let router = protected_router(MockStore::new());

    let cookie = session_auth().issue_with_expiry(ALLOWED_EMAIL, now_unix() - 60);
    let body = multipart_file(Some("cat.png"), "image/png", &png_bytes());
    let response = router
        .oneshot(upload_request_with_cookie(body, &cookie))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(response).await;
    assert_eq!(json["error"], "session_expired");
}

#[tokio::test]
async fn test_tampered_session_is_rejected() {
    let router = protected_router(MockStore::new());

    let (cookie, _) = session_auth().issue(ALLOWED_EMAIL);
    let tampered = cookie.replacen("ada", "eve", 1);
    let body = multipart_file(Some("cat.png"), "image/png", &png_bytes());
    let response = router
        .oneshot(upload_request_with_cookie(body, &tampered))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(response).await;
    assert_eq!(json["error"], "invalid_session");
}

#[tokio::test]
async fn test_session_signed_with_other_secret_rejected() {
    let router = protected_router(MockStore::new());

    let other = SessionAuth::new("another-secret", Duration::from_secs(3600));
    let (cookie, _) = other.issue(ALLOWED_EMAIL);
    let body = multipart_file(Some("cat.png"), "image/png", &png_bytes());
    let response = router
        .oneshot(upload_request_with_cookie(body, &cookie))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_valid_session_for_removed_email_rejected() {
    // Cookie is valid but the email is no longer on the allow-list
    let router = create_router(
        GalleryService::new(MockStore::new()),
        RouterConfig::new(TEST_SECRET)
            .with_allowed_emails(vec!["grace@example.com".to_string()])
            .with_oauth(test_oauth_settings()),
    );

    let (cookie, _) = session_auth().issue(ALLOWED_EMAIL);
    let body = multipart_file(Some("cat.png"), "image/png", &png_bytes());
    let response = router
        .oneshot(upload_request_with_cookie(body, &cookie))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(response).await;
    assert_eq!(json["error"], "email_not_allowed");
}

// =============================================================================
// Sign-in Routes
// =============================================================================

#[tokio::test]
async fn test_login_redirects_to_provider() {
    let router = protected_router(MockStore::new());

    let request = Request::builder()
        .uri("/auth/google/login")
        .body(Body::empty())
        .unwrap();
    let response = router.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT);
    let location = response
        .headers()
        .get(header::LOCATION)
        .unwrap()
        .to_str()
        .unwrap();
    assert!(location.starts_with("https://accounts.google.com/"));
    assert!(location.contains("client_id=client-id"));
}

#[tokio::test]
async fn test_callback_without_code_is_400() {
    let router = protected_router(MockStore::new());

    let request = Request::builder()
        .uri("/auth/google")
        .body(Body::empty())
        .unwrap();
    let response = router.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"], "missing_code");
}

#[tokio::test]
async fn test_callback_with_provider_error_is_502() {
    let router = protected_router(MockStore::new());

    let request = Request::builder()
        .uri("/auth/google?error=access_denied")
        .body(Body::empty())
        .unwrap();
    let response = router.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn test_logout_clears_cookie() {
    let router = protected_router(MockStore::new());

    let request = Request::builder()
        .method("POST")
        .uri("/auth/logout")
        .body(Body::empty())
        .unwrap();
    let response = router.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap();
    assert!(set_cookie.starts_with("gallery_session="));
    assert!(set_cookie.contains("Max-Age=0"));
}

// =============================================================================
// Auth Disabled
// =============================================================================

#[tokio::test]
async fn test_auth_disabled_allows_anonymous_upload() {
    let store = MockStore::new();
    let router = create_router(
        GalleryService::new(store.clone()),
        RouterConfig::without_auth(),
    );

    let body = multipart_file(Some("cat.png"), "image/png", &png_bytes());
    let response = router.oneshot(upload_request(body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    assert!(store.contains("cat.png"));
}

#[tokio::test]
async fn test_auth_disabled_has_no_login_route() {
    let router = create_router(
        GalleryService::new(MockStore::new()),
        RouterConfig::without_auth(),
    );

    let request = Request::builder()
        .uri("/auth/google/login")
        .body(Body::empty())
        .unwrap();
    let response = router.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
