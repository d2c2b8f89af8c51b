pub mod configuration;
pub mod domain;
pub mod email_client;
mod error;
pub mod form;
pub mod list_resolver;
pub mod listmonk_client;
mod metrics;
mod routes;
mod state;
pub mod telemetry;

use axum::routing::IntoMakeService;
use axum::{Router, Server};
use configuration::Settings;
use hyper::server::conn::AddrIncoming;
use state::AppState;
use std::net::TcpListener;

/// The contact subsystem's HTTP application: the two form-facing gateways
/// plus health, docs and metrics endpoints.
pub struct App {
    port: u16,
    server: Server<AddrIncoming, IntoMakeService<Router>>,
}

impl App {
    /// Build the application from its settings: bind the listener, construct
    /// the downstream clients and assemble the router. Serving only starts
    /// with [`Self::run_until_stopped`].
    pub fn build(configuration: Settings) -> anyhow::Result<Self> {
        let listener = TcpListener::bind(configuration.application.address())?;
        let port = listener.local_addr()?.port();

        let listmonk_client = configuration
            .listmonk
            .client()
            .map_err(|e| anyhow::anyhow!(e))?;
        let email_client = configuration
            .notification
            .client()
            .map_err(|e| anyhow::anyhow!(e))?;
        if email_client.is_none() {
            tracing::warn!(
                "No email provider credential configured. Contact notifications are disabled"
            );
        }
        let list_resolver = configuration.listmonk.resolver();
        let metrics = metrics::Metrics::create()?;

        let app_state = AppState::create(listmonk_client, email_client, list_resolver, metrics);
        let router = Self::build_router(&app_state);
        let server = Server::from_tcp(listener)?.serve(router.into_make_service());

        Ok(Self { port, server })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> Result<(), hyper::Error> {
        tracing::info!("Server running on port {}", self.port);
        self.server.await
    }

    /// Build the router for the application.
    fn build_router(app_state: &AppState) -> Router {
        use tower_http::trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer};
        use tracing::Level;

        routes::build_router(app_state).layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
    }
}
