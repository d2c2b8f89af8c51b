use crate::state::AppState;
use axum::Router;

mod docs;
pub mod health;
pub mod notify;
pub mod subscribe;

pub fn build_router(app_state: &AppState) -> Router {
    Router::new()
        .nest("/health", health::create_router().with_state(app_state.clone()))
        .nest(
            "/api",
            subscribe::create_router()
                .merge(notify::create_router())
                .with_state(app_state.clone()),
        )
        .merge(docs::create_router())
        .merge(crate::metrics::create_router().with_state(app_state.clone()))
}

/// Uniform response body for the form-facing endpoints: `success` plus an
/// error message on failure, and optionally a human-readable message and the
/// provider-assigned email id on success.
#[derive(Debug, serde::Serialize, utoipa::ToSchema)]
pub struct ApiResponse {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    #[serde(rename = "emailId", skip_serializing_if = "Option::is_none")]
    email_id: Option<String>,
}

impl ApiResponse {
    pub fn success() -> Self {
        Self {
            success: true,
            error: None,
            message: None,
            email_id: None,
        }
    }

    pub fn failure(error: String) -> Self {
        Self {
            success: false,
            error: Some(error),
            message: None,
            email_id: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_email_id(mut self, email_id: String) -> Self {
        self.email_id = Some(email_id);
        self
    }
}
