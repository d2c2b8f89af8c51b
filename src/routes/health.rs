use crate::listmonk_client::ListmonkClient;
use crate::state::AppState;
use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use lazy_static::lazy_static;
use std::sync::Arc;
use utoipa::ToSchema;

lazy_static! {
    static ref VERSION: String = env!("CARGO_PKG_VERSION").to_string();
}

/// Create a router to serve health checks.
pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(is_alive))
        .route("/info", get(build_info))
        .route("/status", get(status))
}

/// Simple `is_alive` endpoint that will always return a 200 OK.
/// Used to indicate when the webserver is up and running.
#[tracing::instrument]
#[utoipa::path(
    get,
    path = "/health/health",
    responses((status = OK, description = "Check if service is alive"))
)]
pub(crate) async fn is_alive() -> StatusCode {
    tracing::debug!("Service is alive");
    StatusCode::OK
}

#[derive(Debug, serde::Serialize, ToSchema)]
pub struct Status {
    mailing_list_connected: bool,
}

/// Status endpoint reporting whether the mailing-list manager is reachable.
#[tracing::instrument(skip(listmonk_client))]
#[utoipa::path(
    get,
    path = "/health/status",
    responses(
        (status = OK, description = "Current status of the dependent services", body = Status)
    )
)]
pub(crate) async fn status(State(listmonk_client): State<Arc<ListmonkClient>>) -> Json<Status> {
    let status = Status {
        mailing_list_connected: listmonk_client.is_reachable().await,
    };
    tracing::info!("Status: {:?}", status);
    Json(status)
}

#[derive(serde::Serialize, ToSchema)]
pub struct BuildInfo<'a> {
    version: &'a str,
}

/// Endpoint to get current information about the server's version.
#[tracing::instrument]
#[utoipa::path(
    get,
    path = "/health/info",
    responses(
        (status = OK, description = "Build info for this service", body = BuildInfo)
    )
)]
pub(crate) async fn build_info<'a>() -> Json<BuildInfo<'a>> {
    Json(BuildInfo {
        version: VERSION.as_str(),
    })
}
