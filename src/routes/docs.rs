use crate::routes::{health, notify, subscribe, ApiResponse};
use axum::{response::IntoResponse, routing::get, Json, Router};
use http::{
    header::{self, ACCEPT},
    HeaderMap, StatusCode,
};
use utoipa::OpenApi;

/// Documentation for the service. Can be converted into JSON or YAML.
#[derive(OpenApi)]
#[openapi(
    paths(
        health::is_alive,
        health::status,
        health::build_info,
        subscribe::subscribe,
        notify::notify,
    ),
    components(schemas(ApiResponse, health::Status, health::BuildInfo))
)]
struct ApiDoc;

pub fn create_router() -> Router {
    Router::new()
        .route("/openapi", get(serve_openapi_docs))
        .route("/openapi.json", get(serve_openapi_docs_as_json))
        .route("/openapi.yaml", get(serve_openapi_docs_as_yaml))
}

/// Serve OpenApi docs based on the `Accept` header.
#[tracing::instrument(skip(headers))]
async fn serve_openapi_docs(headers: HeaderMap) -> impl IntoResponse {
    match headers.get(ACCEPT).and_then(|accept| accept.to_str().ok()) {
        Some("application/yaml") => serve_openapi_docs_as_yaml().await.into_response(),
        _ => serve_openapi_docs_as_json().await.into_response(),
    }
}

async fn serve_openapi_docs_as_json() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}

async fn serve_openapi_docs_as_yaml() -> impl IntoResponse {
    match ApiDoc::openapi().to_yaml() {
        Ok(yaml) => ([(header::CONTENT_TYPE, "application/yaml")], yaml).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to render the OpenAPI document");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
