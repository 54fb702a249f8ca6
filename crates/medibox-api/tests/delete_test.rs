mod helpers;

use axum::http::StatusCode;
use helpers::{seed, setup_test_app};
use medibox_transcribe::test_helpers::StorageOp;
use serde_json::json;

#[tokio::test]
async fn test_delete_single_file_by_query() {
    let app = setup_test_app();
    seed(&app.memory, "id_5/a.pdf", "application/pdf").await;
    seed(&app.memory, "id_5/b.pdf", "application/pdf").await;

    let response = app
        .client()
        .delete("/files")
        .add_query_param("patientId", "5")
        .add_query_param("fileName", "a.pdf")
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body: serde_json::Value = response.json();
    assert_eq!(body["message"], "Delete operation completed successfully");
    assert_eq!(app.memory.keys(), vec!["id_5/b.pdf".to_string()]);
}

#[tokio::test]
async fn test_delete_namespace_removes_every_key() {
    let app = setup_test_app();
    for key in ["id_5/", "id_5/output/", "id_5/a.pdf", "id_5/clip.mp4"] {
        seed(&app.memory, key, "application/octet-stream").await;
    }
    seed(&app.memory, "id_50/keep.pdf", "application/pdf").await;

    let response = app.client().delete("/subjects/5").await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(app.storage.calls_of(StorageOp::DeletePrefix), vec!["id_5/".to_string()]);
    assert_eq!(app.memory.keys(), vec!["id_50/keep.pdf".to_string()]);
}

#[tokio::test]
async fn test_delete_namespace_removes_uploaded_markers() {
    let app = setup_test_app();

    let response = app.client().post("/upload").json(&json!({ "id": "9" })).await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert!(app.memory.contains("id_9/"));
    assert!(app.memory.contains("id_9/output/Summary/"));

    let response = app.client().delete("/subjects/9").await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert!(app.memory.is_empty());
}

#[tokio::test]
async fn test_delete_empty_namespace_succeeds() {
    let app = setup_test_app();

    let response = app.client().delete("/subjects/404").await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(app.storage.calls_of(StorageOp::DeletePrefix), vec!["id_404/".to_string()]);
    assert!(app.memory.is_empty());
}

#[tokio::test]
async fn test_delete_by_path() {
    let app = setup_test_app();
    seed(&app.memory, "id_3/scan.png", "image/png").await;

    let response = app.client().delete("/subjects/3/files/scan.png").await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert!(app.memory.is_empty());
}

#[tokio::test]
async fn test_delete_missing_subject_is_bad_request() {
    let app = setup_test_app();

    let response = app
        .client()
        .delete("/files")
        .add_query_param("fileName", "a.pdf")
        .await;

    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert_eq!(body["errorKind"], "InvalidRequest");
    assert!(app.storage.calls().is_empty());
}

#[tokio::test]
async fn test_delete_failure_is_server_error() {
    let app = setup_test_app();
    seed(&app.memory, "id_5/a.pdf", "application/pdf").await;
    app.storage.fail(StorageOp::DeletePrefix);

    let response = app.client().delete("/subjects/5").await;

    assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(app.memory.contains("id_5/a.pdf"));
}
