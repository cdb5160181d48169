//! Shared test helpers for handler tests.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use crate::config::Config;
use crate::object_store::LocalStore;
use crate::registry::Registry;
use crate::AppState;

pub const TEST_HOST: &str = "pdf.test:3000";
pub const BOUNDARY: &str = "pdfshareboundary";

/// Create a test AppState over a temporary upload directory.
pub fn test_state(temp_dir: &tempfile::TempDir) -> Arc<AppState> {
    test_state_with(temp_dir, |_| {})
}

/// Like [`test_state`], letting the caller adjust the config first.
pub fn test_state_with(
    temp_dir: &tempfile::TempDir,
    configure: impl FnOnce(&mut Config),
) -> Arc<AppState> {
    let upload_dir = temp_dir.path().join("uploads");

    let mut config = Config::default();
    config.storage.upload_dir = upload_dir.to_string_lossy().to_string();
    config.max_upload_size = 1024 * 1024; // 1MB for tests
    configure(&mut config);

    let object_store = LocalStore::new(&upload_dir).expect("Failed to create test object store");

    Arc::new(AppState {
        config,
        registry: Registry::new(),
        object_store: Arc::new(object_store),
    })
}

/// A small but well-formed looking PDF payload.
pub fn sample_pdf() -> Vec<u8> {
    b"%PDF-1.4\n1 0 obj << /Type /Catalog >> endobj\ntrailer << /Root 1 0 R >>\n%%EOF\n".to_vec()
}

/// Encode a single-part multipart body.
pub fn multipart_body(field: &str, filename: &str, content_type: &str, data: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\n\
             Content-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\n\
             Content-Type: {content_type}\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}

pub fn upload_request(body: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/upload")
        .header(header::HOST, TEST_HOST)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

pub fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::HOST, TEST_HOST)
        .body(Body::empty())
        .unwrap()
}

pub async fn send(app: &Router, request: Request<Body>) -> Response<Body> {
    app.clone().oneshot(request).await.unwrap()
}

pub async fn body_bytes(response: Response<Body>) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

/// Upload `data` as a PDF named `filename` and return the success body.
pub async fn upload_pdf(app: &Router, filename: &str, data: &[u8]) -> serde_json::Value {
    let body = multipart_body("pdf", filename, "application/pdf", data);
    let response = send(app, upload_request(body)).await;
    assert_eq!(response.status(), axum::http::StatusCode::OK);
    body_json(response).await
}
