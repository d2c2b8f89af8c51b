use std::time::Duration;

use http::StatusCode;
use reqwest::Client;
use secrecy::{ExposeSecret, Secret};
use url::Url;

use crate::domain::ContactEmail;

/// Client for the transactional email provider's send API, authenticating
/// with a Bearer token. Sender and recipient are fixed at construction from
/// configuration; form input never controls either address.
#[derive(Debug)]
pub struct EmailClient {
    http_client: Client,
    base_url: Url,
    api_key: Secret<String>,
    sender: ContactEmail,
    recipient: ContactEmail,
}

impl EmailClient {
    pub fn new(
        base_url: Url,
        api_key: Secret<String>,
        sender: ContactEmail,
        recipient: ContactEmail,
        timeout: Duration,
    ) -> Self {
        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to build the email provider HTTP client");
        Self {
            http_client,
            base_url,
            api_key,
            sender,
            recipient,
        }
    }

    /// Send one HTML notification to the configured recipient. Returns the
    /// provider-assigned id of the accepted email.
    pub async fn send_notification(
        &self,
        subject: &str,
        html_body: &str,
    ) -> Result<String, EmailError> {
        let url = self
            .base_url
            .join("emails")
            .expect("email provider base url is a valid base");
        let request_body = SendEmailRequest {
            from: self.sender.as_ref(),
            to: [self.recipient.as_ref()],
            subject,
            html: html_body,
        };

        let response = self
            .http_client
            .post(url)
            .bearer_auth(self.api_key.expose_secret())
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "The email provider rejected the notification");
            return Err(EmailError::Rejected { status });
        }

        let body: SendEmailResponse = response.json().await?;
        Ok(body.id)
    }
}

#[derive(serde::Serialize)]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: [&'a str; 1],
    subject: &'a str,
    html: &'a str,
}

#[derive(serde::Deserialize)]
struct SendEmailResponse {
    id: String,
}

#[derive(thiserror::Error)]
pub enum EmailError {
    #[error("The email provider rejected the request with status {status}")]
    Rejected { status: StatusCode },
    #[error("Failed to reach the email provider")]
    Transport(#[from] reqwest::Error),
}
