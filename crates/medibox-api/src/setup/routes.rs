//! Route configuration and setup

use crate::handlers;
use crate::state::AppState;
use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderName, HeaderValue, Method},
    routing::{delete, get, post},
    Json, Router,
};
use medibox_core::Config;
use medibox_infra::request_id_middleware;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

const API_KEY_HEADER: &str = "x-api-key";

/// Setup all application routes
pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Result<Router<()>, anyhow::Error> {
    let cors = setup_cors(config)?;
    let body_limit = config.max_upload_size_bytes();

    let app = file_routes()
        .merge(transcription_routes())
        .route("/health", get(handlers::health::health_check))
        .route(
            "/api/openapi.json",
            get(|| async { Json(crate::api_doc::ApiDoc::openapi()) }),
        )
        .merge(utoipa_rapidoc::RapiDoc::new("/api/openapi.json").path("/docs"))
        // Base64 bodies are a third larger than the file they carry
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(axum::middleware::from_fn(request_id_middleware))
        .with_state(state);

    Ok(app)
}

/// Setup CORS configuration
fn setup_cors(config: &Config) -> Result<CorsLayer, anyhow::Error> {
    let methods = [Method::GET, Method::POST, Method::DELETE, Method::OPTIONS];
    let headers = [
        header::CONTENT_TYPE,
        header::AUTHORIZATION,
        HeaderName::from_static(API_KEY_HEADER),
    ];

    let cors = if config.cors_origins().iter().any(|o| o == "*") {
        if config.is_production() {
            tracing::warn!("CORS configured to allow all origins in production");
        }
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(methods)
            .allow_headers(headers)
    } else {
        let origins = config
            .cors_origins()
            .iter()
            .map(|o| {
                o.parse::<HeaderValue>()
                    .map_err(|e| anyhow::anyhow!("Invalid CORS origin '{}': {}", o, e))
            })
            .collect::<Result<Vec<_>, _>>()?;

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(methods)
            .allow_headers(headers)
    };
    Ok(cors)
}

/// Upload, delete and download-link routes
fn file_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/upload", post(handlers::upload::upload))
        .route("/files", delete(handlers::delete::delete_by_query))
        .route("/subjects/{subject_id}", delete(handlers::delete::delete_subject))
        .route(
            "/subjects/{subject_id}/files/{file_name}",
            delete(handlers::delete::delete_subject_file),
        )
        .route(
            "/presigned-urls",
            get(handlers::presigned_urls::links_by_query),
        )
        .route(
            "/subjects/{subject_id}/files/{file_name}/url",
            get(handlers::presigned_urls::subject_file_links),
        )
}

fn transcription_routes() -> Router<Arc<AppState>> {
    Router::new().route("/transcribe", post(handlers::transcribe::transcribe))
}
