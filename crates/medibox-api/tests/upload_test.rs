mod helpers;

use axum::http::StatusCode;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use helpers::setup_test_app;
use medibox_storage::Storage;
use medibox_transcribe::test_helpers::StorageOp;
use serde_json::json;

#[tokio::test]
async fn test_upload_with_overwrite_stores_under_file_name() {
    let app = setup_test_app();

    let response = app
        .client()
        .post("/upload")
        .json(&json!({
            "id": "42",
            "file": STANDARD.encode(b"%PDF-1.4"),
            "fileName": "report.pdf",
            "contentType": "application/pdf",
            "overwrite": true
        }))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body: serde_json::Value = response.json();
    assert_eq!(body["s3_key"], "id_42/report.pdf");

    let head = app.memory.head("id_42/report.pdf").await.unwrap();
    assert_eq!(head.content_type.as_deref(), Some("application/pdf"));
    assert_eq!(app.memory.get("id_42/report.pdf").await.unwrap(), b"%PDF-1.4");
}

#[tokio::test]
async fn test_upload_without_overwrite_uses_timestamped_key() {
    let app = setup_test_app();

    let response = app
        .client()
        .post("/upload")
        .json(&json!({
            "id": 7,
            "file": STANDARD.encode(b"video"),
            "fileName": "clip.mp4",
            "contentType": "video/mp4"
        }))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body: serde_json::Value = response.json();
    let key = body["s3_key"].as_str().unwrap();
    assert!(key.starts_with("id_7/"), "got {}", key);
    assert!(key.ends_with(".mp4"), "got {}", key);
    assert_ne!(key, "id_7/clip.mp4");
    assert!(app.memory.contains(key));
}

#[tokio::test]
async fn test_upload_without_file_creates_directory_layout() {
    let app = setup_test_app();

    let response = app.client().post("/upload").json(&json!({ "id": "9" })).await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body: serde_json::Value = response.json();
    assert_eq!(body["s3_key"], "id_9/");
    assert_eq!(
        app.storage.calls_of(StorageOp::Put),
        vec![
            "id_9/".to_string(),
            "id_9/output/".to_string(),
            "id_9/output/Summary/".to_string(),
            "id_9/output/transcribe/".to_string(),
        ]
    );
}

#[tokio::test]
async fn test_upload_missing_id_is_bad_request() {
    let app = setup_test_app();

    let response = app
        .client()
        .post("/upload")
        .json(&json!({ "file": STANDARD.encode(b"x") }))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert_eq!(body["errorKind"], "InvalidRequest");
    assert!(app.memory.is_empty());
}

#[tokio::test]
async fn test_upload_invalid_base64_is_bad_request() {
    let app = setup_test_app();

    let response = app
        .client()
        .post("/upload")
        .json(&json!({ "id": "1", "file": "not base64!!", "fileName": "a.pdf" }))
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    assert!(app.storage.calls_of(StorageOp::Put).is_empty());
}

#[tokio::test]
async fn test_upload_storage_failure_is_server_error() {
    let app = setup_test_app();
    app.storage.fail(StorageOp::Put);

    let response = app
        .client()
        .post("/upload")
        .json(&json!({ "id": "1", "file": STANDARD.encode(b"x"), "fileName": "a.pdf", "overwrite": true }))
        .await;

    assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: serde_json::Value = response.json();
    assert_eq!(body["errorKind"], "StorageError");
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let app = setup_test_app();

    let response = app
        .client()
        .post("/upload")
        .bytes("{ not json".into())
        .content_type("application/json")
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert_eq!(body["errorKind"], "InvalidRequest");
}
