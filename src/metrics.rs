use anyhow::Context;
use axum::{
    extract::State,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use http::StatusCode;
use prometheus::{Encoder, IntCounter, Registry, TextEncoder};
use std::sync::Arc;

use crate::state::AppState;

/// Outcome counters for the contact pipeline, registered on the registry
/// that backs the `/metrics` endpoint.
pub struct Metrics {
    registry: Registry,
    pub subscriptions_accepted: IntCounter,
    pub subscriptions_failed: IntCounter,
    pub notifications_sent: IntCounter,
    pub notifications_failed: IntCounter,
}

impl Metrics {
    pub fn create() -> anyhow::Result<Self> {
        let registry = Registry::new();
        let subscriptions_accepted = register_counter(
            &registry,
            "subscriptions_accepted_total",
            "Contacts successfully registered with the mailing-list manager",
        )?;
        let subscriptions_failed = register_counter(
            &registry,
            "subscriptions_failed_total",
            "Contact registrations rejected upstream or failed in transport",
        )?;
        let notifications_sent = register_counter(
            &registry,
            "notifications_sent_total",
            "Notification emails accepted by the email provider",
        )?;
        let notifications_failed = register_counter(
            &registry,
            "notifications_failed_total",
            "Notification emails that could not be delivered",
        )?;

        Ok(Self {
            registry,
            subscriptions_accepted,
            subscriptions_failed,
            notifications_sent,
            notifications_failed,
        })
    }
}

impl std::fmt::Debug for Metrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Metrics").finish_non_exhaustive()
    }
}

fn register_counter(registry: &Registry, name: &str, help: &str) -> anyhow::Result<IntCounter> {
    let counter = IntCounter::new(name.to_string(), help.to_string())
        .with_context(|| format!("Failed to create `{name}` counter"))?;
    registry
        .register(Box::new(counter.clone()))
        .with_context(|| format!("Failed to register `{name}` counter"))?;
    Ok(counter)
}

pub fn create_router() -> Router<AppState> {
    Router::new().route("/metrics", get(metrics_endpoint))
}

#[tracing::instrument(skip(metrics))]
async fn metrics_endpoint(State(metrics): State<Arc<Metrics>>) -> Result<String, MetricsError> {
    let mut buffer = vec![];
    let encoder = TextEncoder::new();
    let metric_families = metrics.registry.gather();
    encoder
        .encode(&metric_families, &mut buffer)
        .context("Failed to encode metrics")?;

    String::from_utf8(buffer)
        .context("Failed to convert metrics to a valid string")
        .map_err(MetricsError::UnexpectedError)
}

#[derive(thiserror::Error)]
pub enum MetricsError {
    #[error("Unexpected error when generating metrics")]
    UnexpectedError(#[from] anyhow::Error),
}

impl IntoResponse for MetricsError {
    fn into_response(self) -> Response {
        (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()).into_response()
    }
}
