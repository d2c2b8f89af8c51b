use crate::domain::{AttributeSet, ContactEmail, ContactName};
use crate::list_resolver::{ListId, ListResolver};
use crate::listmonk_client::{ListmonkClient, ListmonkError};
use crate::metrics::Metrics;
use crate::routes::ApiResponse;
use crate::state::AppState;
use axum::extract::multipart::MultipartError;
use axum::extract::{Multipart, State};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use http::StatusCode;
use std::sync::Arc;

/// Create a router to serve endpoints.
pub fn create_router() -> Router<AppState> {
    Router::new().route("/subscribe", post(subscribe))
}

/// The multipart fields posted by the contact form: the core identity fields,
/// an optional JSON-encoded attribute map, and one `l` part per targeted
/// list token.
#[derive(Debug, Default)]
struct SubscribeForm {
    email: String,
    name: String,
    attribs: Option<String>,
    list_tokens: Vec<String>,
}

impl SubscribeForm {
    async fn from_multipart(mut multipart: Multipart) -> Result<Self, SubscribeError> {
        let mut form = Self::default();
        while let Some(field) = multipart.next_field().await.map_err(bad_payload)? {
            let Some(field_name) = field.name().map(ToString::to_string) else {
                continue;
            };
            let value = field.text().await.map_err(bad_payload)?;
            match field_name.as_str() {
                "email" => form.email = value,
                "name" => form.name = value,
                "attribs" => form.attribs = Some(value),
                "l" => form.list_tokens.push(value),
                _ => {}
            }
        }
        Ok(form)
    }
}

fn bad_payload(e: MultipartError) -> SubscribeError {
    SubscribeError::Invalid(format!("Could not read the form payload: {e}"))
}

/// Register a contact with the mailing-list manager.
#[tracing::instrument(
    name = "Handle a contact subscription",
    skip(listmonk_client, list_resolver, metrics, multipart)
)]
#[utoipa::path(
    post,
    path = "/api/subscribe",
    responses(
        (status = OK, description = "Contact registered with the mailing list", body = ApiResponse),
        (status = BAD_REQUEST, description = "Invalid submission or upstream rejection", body = ApiResponse),
        (status = INTERNAL_SERVER_ERROR, description = "Failed to reach the mailing-list manager", body = ApiResponse),
    )
)]
pub(crate) async fn subscribe(
    State(listmonk_client): State<Arc<ListmonkClient>>,
    State(list_resolver): State<Arc<ListResolver>>,
    State(metrics): State<Arc<Metrics>>,
    multipart: Multipart,
) -> Result<Json<ApiResponse>, SubscribeError> {
    let form = SubscribeForm::from_multipart(multipart).await?;

    let email = ContactEmail::parse(form.email).map_err(SubscribeError::Invalid)?;
    let name = ContactName::parse(form.name).map_err(SubscribeError::Invalid)?;
    let attribs = match form.attribs {
        Some(raw) => serde_json::from_str::<AttributeSet>(&raw)
            .map_err(|e| SubscribeError::Invalid(format!("attribs is not a valid object: {e}")))?,
        None => AttributeSet::default(),
    };
    let lists = resolve_lists(&list_resolver, &form.list_tokens);

    tracing::debug!(
        email = %email,
        name = %name,
        lists = ?lists,
        attribs = ?attribs,
        "Submitting subscriber to Listmonk"
    );

    match listmonk_client
        .create_subscriber(&email, &name, &lists, &attribs)
        .await
    {
        Ok(()) => {
            metrics.subscriptions_accepted.inc();
            tracing::info!("Contact registered with the mailing list");
            Ok(Json(ApiResponse::success()))
        }
        Err(e) => {
            metrics.subscriptions_failed.inc();
            match e {
                ListmonkError::Rejected { status, body } => {
                    Err(SubscribeError::Rejected { status, body })
                }
                ListmonkError::Transport(e) => Err(SubscribeError::Unexpected(e.into())),
            }
        }
    }
}

/// Map opaque tokens to internal list ids, dropping the ones the resolver
/// does not know about.
fn resolve_lists(resolver: &ListResolver, tokens: &[String]) -> Vec<ListId> {
    tokens
        .iter()
        .filter_map(|token| {
            let resolved = resolver.resolve(token);
            if resolved.is_none() {
                tracing::warn!(token = %token, "Dropping unknown list token");
            }
            resolved
        })
        .collect()
}

/// Represent the different failures of the subscription endpoint. `Rejected`
/// relays the upstream body inside its message; transport problems stay
/// generic towards the form.
#[derive(thiserror::Error)]
pub enum SubscribeError {
    #[error("Invalid submission: {0}")]
    Invalid(String),
    #[error("Subscription failed: {body}")]
    Rejected { status: StatusCode, body: String },
    #[error("Internal server error")]
    Unexpected(#[from] anyhow::Error),
}

impl IntoResponse for SubscribeError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::Invalid(_) => {
                tracing::info!(error = %self, "Rejected a contact subscription");
                StatusCode::BAD_REQUEST
            }
            Self::Rejected { status, .. } => {
                tracing::info!(
                    upstream_status = %status,
                    error = %self,
                    "The mailing-list manager rejected the subscription"
                );
                StatusCode::BAD_REQUEST
            }
            Self::Unexpected(_) => {
                tracing::error!(error = ?self, "Failed to handle a contact subscription");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        (status, Json(ApiResponse::failure(self.to_string()))).into_response()
    }
}
