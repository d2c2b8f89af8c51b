use crate::domain::{AttributeSet, ContactEmail, ContactName};
use crate::email_client::{EmailClient, EmailError};
use crate::metrics::Metrics;
use crate::routes::ApiResponse;
use crate::state::AppState;
use askama::Template;
use axum::extract::multipart::MultipartError;
use axum::extract::{Multipart, State};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use http::StatusCode;
use std::sync::Arc;

/// Create a router to serve endpoints.
pub fn create_router() -> Router<AppState> {
    Router::new().route("/notify", post(notify))
}

#[derive(Debug, Default)]
struct NotifyForm {
    email: String,
    name: String,
    attribs: Option<String>,
}

impl NotifyForm {
    async fn from_multipart(mut multipart: Multipart) -> Result<Self, NotifyError> {
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
                _ => {}
            }
        }
        Ok(form)
    }
}

fn bad_payload(e: MultipartError) -> NotifyError {
    NotifyError::Invalid(format!("Could not read the form payload: {e}"))
}

/// The notification email body. Each optional block is omitted entirely,
/// label included, when its field is absent; the reply link always deep-links
/// a `mailto:` addressed to the submitter.
#[derive(Template)]
#[template(path = "notification.html")]
struct NotificationEmail<'a> {
    name: &'a str,
    email: &'a str,
    role: Option<&'a str>,
    linkedin: Option<&'a str>,
    phone: Option<&'a str>,
    message: Option<&'a str>,
}

/// Send the courtesy notification email for one contact submission.
#[tracing::instrument(
    name = "Send a contact notification",
    skip(email_client, metrics, multipart)
)]
#[utoipa::path(
    post,
    path = "/api/notify",
    responses(
        (status = OK, description = "Notification email accepted by the provider", body = ApiResponse),
        (status = BAD_REQUEST, description = "Invalid submission", body = ApiResponse),
        (status = INTERNAL_SERVER_ERROR, description = "Provider not configured or delivery failed", body = ApiResponse),
    )
)]
pub(crate) async fn notify(
    State(email_client): State<Option<Arc<EmailClient>>>,
    State(metrics): State<Arc<Metrics>>,
    multipart: Multipart,
) -> Result<Json<ApiResponse>, NotifyError> {
    let form = NotifyForm::from_multipart(multipart).await?;

    let email = ContactEmail::parse(form.email).map_err(NotifyError::Invalid)?;
    let name = ContactName::parse(form.name).map_err(NotifyError::Invalid)?;
    let attribs = parse_attribs(form.attribs);

    tracing::debug!(
        email = %email,
        name = %name,
        attribs = ?attribs,
        "Rendering a contact notification"
    );

    let Some(email_client) = email_client else {
        metrics.notifications_failed.inc();
        return Err(NotifyError::NotConfigured);
    };

    let html_body = NotificationEmail {
        name: name.as_ref(),
        email: email.as_ref(),
        role: attribs.role.as_deref(),
        linkedin: attribs.linkedin.as_deref(),
        phone: attribs.phone.as_deref(),
        message: attribs.message.as_deref(),
    }
    .render()
    .map_err(|e| NotifyError::Unexpected(e.into()))?;
    let subject = format!("New Contact Form Submission from {name}");

    match email_client.send_notification(&subject, &html_body).await {
        Ok(email_id) => {
            metrics.notifications_sent.inc();
            tracing::info!("Contact notification sent");
            Ok(Json(
                ApiResponse::success()
                    .with_message("Email notification sent successfully")
                    .with_email_id(email_id),
            ))
        }
        Err(e) => {
            metrics.notifications_failed.inc();
            Err(NotifyError::Delivery(e))
        }
    }
}

/// The attribute map is best-effort here: a malformed payload is logged and
/// treated as empty rather than failing the notification.
fn parse_attribs(raw: Option<String>) -> AttributeSet {
    let Some(raw) = raw else {
        return AttributeSet::default();
    };
    serde_json::from_str(&raw).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Ignoring a malformed attribs payload");
        AttributeSet::default()
    })
}

/// Represent the different failures of the notification endpoint. Provider
/// detail is logged where it occurs; users only ever see the generic
/// messages below.
#[derive(thiserror::Error)]
pub enum NotifyError {
    #[error("Invalid submission: {0}")]
    Invalid(String),
    #[error("Email service not configured")]
    NotConfigured,
    #[error("Failed to send email notification")]
    Delivery(#[source] EmailError),
    #[error("Internal server error")]
    Unexpected(#[from] anyhow::Error),
}

impl IntoResponse for NotifyError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::Invalid(_) => StatusCode::BAD_REQUEST,
            Self::NotConfigured | Self::Delivery(_) | Self::Unexpected(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        if status.is_server_error() {
            tracing::error!(error = ?self, "Failed to send a contact notification");
        } else {
            tracing::info!(error = %self, "Rejected a contact notification");
        }
        (status, Json(ApiResponse::failure(self.to_string()))).into_response()
    }
}
