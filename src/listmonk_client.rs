use std::time::Duration;

use http::StatusCode;
use reqwest::Client;
use secrecy::{ExposeSecret, Secret};
use url::Url;

use crate::domain::{AttributeSet, ContactEmail, ContactName};
use crate::list_resolver::ListId;

/// Client for the Listmonk private API, authenticating with HTTP Basic
/// credentials.
#[derive(Debug)]
pub struct ListmonkClient {
    http_client: Client,
    base_url: Url,
    username: String,
    password: Secret<String>,
}

impl ListmonkClient {
    pub fn new(base_url: Url, username: String, password: Secret<String>, timeout: Duration) -> Self {
        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to build the Listmonk HTTP client");
        Self {
            http_client,
            base_url,
            username,
            password,
        }
    }

    /// Register a contact as an enabled, preconfirmed subscriber of the given
    /// lists. A non-2xx response is surfaced with the raw upstream body so the
    /// caller can relay it; it is not parsed here.
    pub async fn create_subscriber(
        &self,
        email: &ContactEmail,
        name: &ContactName,
        lists: &[ListId],
        attribs: &AttributeSet,
    ) -> Result<(), ListmonkError> {
        let url = self
            .base_url
            .join("api/subscribers")
            .expect("Listmonk base url is a valid base");
        let request_body = SubscriberRequest {
            email: email.as_ref(),
            name: name.as_ref(),
            status: "enabled",
            lists,
            attribs,
            preconfirm_subscriptions: true,
        };

        let response = self
            .http_client
            .post(url)
            .basic_auth(&self.username, Some(self.password.expose_secret()))
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        tracing::debug!(status = %status, body = %body, "Listmonk response");

        if status.is_success() {
            Ok(())
        } else {
            Err(ListmonkError::Rejected { status, body })
        }
    }

    /// Probe Listmonk's health endpoint.
    pub async fn is_reachable(&self) -> bool {
        let url = self
            .base_url
            .join("api/health")
            .expect("Listmonk base url is a valid base");
        match self.http_client.get(url).send().await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                tracing::error!(error = %e, "Failed to reach Listmonk");
                false
            }
        }
    }
}

#[derive(serde::Serialize)]
struct SubscriberRequest<'a> {
    email: &'a str,
    name: &'a str,
    status: &'a str,
    lists: &'a [ListId],
    attribs: &'a AttributeSet,
    preconfirm_subscriptions: bool,
}

/// Failures talking to Listmonk. `Rejected` carries the upstream body
/// verbatim; transport problems never expose their detail to form users.
#[derive(thiserror::Error)]
pub enum ListmonkError {
    #[error("Listmonk rejected the subscriber ({status})")]
    Rejected { status: StatusCode, body: String },
    #[error("Failed to reach Listmonk")]
    Transport(#[from] reqwest::Error),
}
