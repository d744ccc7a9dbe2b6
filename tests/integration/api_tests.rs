//! API integration tests for the gallery endpoints.
//!
//! Tests verify:
//! - Listing, upload and delete against an in-memory store
//! - Naming rules end to end (titles, sanitization, fallbacks)
//! - Error cases (non-image uploads, missing artwork, backend failures)
//! - HTTP response codes and bodies

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use tower::ServiceExt;

use gallery_server::gallery::GalleryService;
use gallery_server::{create_dev_router, create_router, RouterConfig};

use super::test_utils::{
    delete_request, multipart_body, multipart_file, png_bytes, upload_request, FailingStore,
    MockStore,
};

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn test_health() {
    let router = create_dev_router(GalleryService::new(MockStore::new()));

    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();
    let response = router.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
}

// =============================================================================
// Listing
// =============================================================================

#[tokio::test]
async fn test_list_empty_gallery() {
    let router = create_dev_router(GalleryService::new(MockStore::new()));

    let request = Request::builder()
        .uri("/artworks")
        .body(Body::empty())
        .unwrap();
    let response = router.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, serde_json::json!([]));
}

#[tokio::test]
async fn test_list_returns_titles_and_paths() {
    let store = MockStore::new()
        .with_artwork("The Oracle.png", png_bytes())
        .with_artwork("sunset.jpg", png_bytes());
    let router = create_dev_router(GalleryService::new(store));

    let request = Request::builder()
        .uri("/artworks")
        .body(Body::empty())
        .unwrap();
    let response = router.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;

    // Sorted by filename
    assert_eq!(json[0]["filename"], "The Oracle.png");
    assert_eq!(json[0]["title"], "The Oracle");
    assert_eq!(json[0]["path"], "/artworks/files/The%20Oracle.png");
    assert_eq!(json[1]["filename"], "sunset.jpg");
    assert_eq!(json[1]["title"], "sunset");
}

#[tokio::test]
async fn test_list_backend_failure_is_500() {
    let router = create_dev_router(GalleryService::new(FailingStore));

    let request = Request::builder()
        .uri("/artworks")
        .body(Body::empty())
        .unwrap();
    let response = router.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_json(response).await;
    assert_eq!(json["error"], "io_error");
}

// =============================================================================
// Upload
// =============================================================================

#[tokio::test]
async fn test_upload_success() {
    let store = MockStore::new();
    let router = create_dev_router(GalleryService::new(store.clone()));

    let body = multipart_file(Some("cat.png"), "image/png", &png_bytes());
    let response = router.oneshot(upload_request(body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["artwork"]["filename"], "cat.png");
    assert_eq!(json["artwork"]["title"], "cat");

    assert!(store.contains("cat.png"));
}

#[tokio::test]
async fn test_upload_with_title_renames() {
    let store = MockStore::new();
    let router = create_dev_router(GalleryService::new(store.clone()));

    let body = multipart_body(
        Some("IMG_0042.jpeg"),
        "image/jpeg",
        &png_bytes(),
        Some("The Oracle"),
    );
    let response = router.oneshot(upload_request(body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["artwork"]["filename"], "The Oracle.jpeg");
    assert_eq!(json["artwork"]["title"], "The Oracle");
}

#[tokio::test]
async fn test_upload_without_filename_gets_fallback_name() {
    let store = MockStore::new();
    let router = create_dev_router(GalleryService::new(store.clone()));

    let body = multipart_file(None, "image/png", &png_bytes());
    let response = router.oneshot(upload_request(body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    let filename = json["artwork"]["filename"].as_str().unwrap();
    assert!(filename.starts_with("artwork-"));
    assert!(filename.ends_with(".png"));
}

#[tokio::test]
async fn test_upload_traversal_name_is_stored_as_basename() {
    let store = MockStore::new();
    let router = create_dev_router(GalleryService::new(store.clone()));

    let body = multipart_file(Some("../../etc/shadow.png"), "image/png", &png_bytes());
    let response = router.oneshot(upload_request(body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(store.filenames(), vec!["shadow.png".to_string()]);
}

#[tokio::test]
async fn test_upload_rejects_non_image() {
    let router = create_dev_router(GalleryService::new(MockStore::new()));

    let body = multipart_file(Some("notes.txt"), "text/plain", b"hello");
    let response = router.oneshot(upload_request(body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"], "not_an_image");
}

#[tokio::test]
async fn test_upload_rejects_empty_file() {
    let router = create_dev_router(GalleryService::new(MockStore::new()));

    let body = multipart_file(Some("empty.png"), "image/png", b"");
    let response = router.oneshot(upload_request(body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"], "no_file");
}

#[tokio::test]
async fn test_upload_without_any_field_is_rejected() {
    let router = create_dev_router(GalleryService::new(MockStore::new()));

    let body = format!("--{}--\r\n", super::test_utils::BOUNDARY).into_bytes();
    let response = router.oneshot(upload_request(body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_upload_over_size_limit_rejected() {
    let service =
        GalleryService::with_max_upload_bytes(MockStore::new(), 16);
    let router = create_router(
        service,
        RouterConfig::without_auth().with_max_upload_bytes(1024 * 1024),
    );

    let body = multipart_file(Some("big.png"), "image/png", &png_bytes());
    let response = router.oneshot(upload_request(body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    let json = body_json(response).await;
    assert_eq!(json["error"], "too_large");
}

// =============================================================================
// Delete
// =============================================================================

#[tokio::test]
async fn test_delete_success() {
    let store = MockStore::new().with_artwork("cat.png", png_bytes());
    let router = create_dev_router(GalleryService::new(store.clone()));

    let response = router
        .oneshot(delete_request(r#"{"filename":"cat.png"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["success"], true);
    assert_eq!(json["deleted"], "cat.png");
    assert!(!store.contains("cat.png"));
}

#[tokio::test]
async fn test_delete_missing_artwork_is_404() {
    let router = create_dev_router(GalleryService::new(MockStore::new()));

    let response = router
        .oneshot(delete_request(r#"{"filename":"ghost.png"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert_eq!(json["error"], "not_found");
}

#[tokio::test]
async fn test_delete_without_filename_is_400() {
    let router = create_dev_router(GalleryService::new(MockStore::new()));

    let response = router.oneshot(delete_request(r#"{}"#)).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["error"], "missing_filename");
}

#[tokio::test]
async fn test_upload_then_visible_in_listing() {
    let router = create_dev_router(GalleryService::new(MockStore::new()));

    let body = multipart_file(Some("cat.png"), "image/png", &png_bytes());
    let response = router
        .clone()
        .oneshot(upload_request(body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let request = Request::builder()
        .uri("/artworks")
        .body(Body::empty())
        .unwrap();
    let response = router.oneshot(request).await.unwrap();
    let json = body_json(response).await;

    assert_eq!(json.as_array().unwrap().len(), 1);
    assert_eq!(json[0]["filename"], "cat.png");
}
