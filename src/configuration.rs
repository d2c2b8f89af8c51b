use std::time::Duration;

use config::{Config, Environment, File, FileFormat};
use secrecy::Secret;
use serde_aux::field_attributes::deserialize_number_from_string;
use url::Url;

use crate::domain::ContactEmail;
use crate::email_client::EmailClient;
use crate::list_resolver::{ListId, ListResolver};
use crate::listmonk_client::ListmonkClient;

/// Retrieve the configuration for the application: an optional
/// `configuration.yaml` overlaid with `APP_`-prefixed environment variables
/// (`__` separating nested keys, e.g. `APP_LISTMONK__PASSWORD`).
pub fn get_configuration() -> Result<Settings, config::ConfigError> {
    Config::builder()
        .add_source(File::new("configuration.yaml", FileFormat::Yaml).required(false))
        .add_source(
            Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?
        .try_deserialize()
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub listmonk: ListmonkSettings,
    pub notification: NotificationSettings,
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct ApplicationSettings {
    pub host: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub port: u16,
}

impl ApplicationSettings {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct ListmonkSettings {
    pub base_url: String,
    pub username: String,
    pub password: Secret<String>,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub timeout_ms: u64,
    pub contact_list: ListSettings,
    pub newsletter_list: ListSettings,
}

impl ListmonkSettings {
    pub fn client(&self) -> Result<ListmonkClient, String> {
        let base_url = Url::parse(&self.base_url)
            .map_err(|e| format!("Invalid Listmonk base url: {e}"))?;
        Ok(ListmonkClient::new(
            base_url,
            self.username.clone(),
            self.password.clone(),
            self.timeout(),
        ))
    }

    pub fn resolver(&self) -> ListResolver {
        ListResolver::new(
            self.contact_list.token.clone(),
            ListId::new(self.contact_list.id),
            self.newsletter_list.token.clone(),
            ListId::new(self.newsletter_list.id),
        )
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// One mailing list: the opaque token exposed to the form and the internal
/// numeric id Listmonk expects on the wire.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct ListSettings {
    pub token: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub id: u32,
}

#[derive(Debug, Clone, serde::Deserialize)]
pub struct NotificationSettings {
    pub base_url: String,
    /// Absent in environments without an email provider account; the
    /// notification path then degrades to a "not configured" failure.
    pub api_key: Option<Secret<String>>,
    pub sender: String,
    pub recipient: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub timeout_ms: u64,
}

impl NotificationSettings {
    /// Build the email client, or `None` when no API key is configured.
    pub fn client(&self) -> Result<Option<EmailClient>, String> {
        let Some(api_key) = &self.api_key else {
            return Ok(None);
        };
        let base_url = Url::parse(&self.base_url)
            .map_err(|e| format!("Invalid email provider base url: {e}"))?;
        let sender = ContactEmail::parse(self.sender.clone())?;
        let recipient = ContactEmail::parse(self.recipient.clone())?;
        Ok(Some(EmailClient::new(
            base_url,
            api_key.clone(),
            sender,
            recipient,
            self.timeout(),
        )))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}
