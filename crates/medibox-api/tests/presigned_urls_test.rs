mod helpers;

use axum::http::StatusCode;
use helpers::{seed, setup_test_app, BUCKET};
use medibox_transcribe::test_helpers::StorageOp;

#[tokio::test]
async fn test_single_file_link() {
    let app = setup_test_app();

    let response = app
        .client()
        .get("/presigned-urls")
        .add_query_param("patientId", "12")
        .add_query_param("fileName", "report.pdf")
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body: serde_json::Value = response.json();
    let files = body["files"].as_array().unwrap();
    assert_eq!(files.len(), 1);
    assert_eq!(files[0]["fileName"], "report.pdf");
    assert_eq!(
        files[0]["url"],
        format!("memory://{}/id_12/report.pdf?expires_in=900", BUCKET)
    );
}

#[tokio::test]
async fn test_lowercase_filename_alias() {
    let app = setup_test_app();

    let response = app
        .client()
        .get("/presigned-urls")
        .add_query_param("patientId", "12")
        .add_query_param("filename", "report.pdf")
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(
        app.storage.calls_of(StorageOp::Presign),
        vec!["id_12/report.pdf".to_string()]
    );
}

#[tokio::test]
async fn test_wildcard_matches_suffix() {
    let app = setup_test_app();
    seed(&app.memory, "id_12/a.pdf", "application/pdf").await;
    seed(&app.memory, "id_12/output/Summary/b.pdf", "application/pdf").await;
    seed(&app.memory, "id_12/clip.mp4", "video/mp4").await;
    seed(&app.memory, "id_120/c.pdf", "application/pdf").await;

    let response = app
        .client()
        .get("/presigned-urls")
        .add_query_param("patientId", "12")
        .add_query_param("fileName", "*.pdf")
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body: serde_json::Value = response.json();
    let mut names: Vec<String> = body["files"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["fileName"].as_str().unwrap().to_string())
        .collect();
    names.sort();
    assert_eq!(names, vec!["a.pdf".to_string(), "b.pdf".to_string()]);
}

#[tokio::test]
async fn test_wildcard_without_matches_is_not_found() {
    let app = setup_test_app();
    seed(&app.memory, "id_12/clip.mp4", "video/mp4").await;

    let response = app
        .client()
        .get("/subjects/12/files/*.pdf/url")
        .await;

    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    let body: serde_json::Value = response.json();
    assert_eq!(body["errorKind"], "NotFound");
}

#[tokio::test]
async fn test_missing_parameters_are_bad_request() {
    let app = setup_test_app();

    let response = app
        .client()
        .get("/presigned-urls")
        .add_query_param("patientId", "12")
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

    let response = app
        .client()
        .get("/presigned-urls")
        .add_query_param("fileName", "a.pdf")
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

    assert!(app.storage.calls().is_empty());
}
