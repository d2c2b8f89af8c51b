use crate::email_client::EmailClient;
use crate::list_resolver::ListResolver;
use crate::listmonk_client::ListmonkClient;
use crate::metrics::Metrics;
use axum::extract::FromRef;
use duplicate::duplicate_item;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct AppState {
    listmonk_client: Arc<ListmonkClient>,
    email_client: Option<Arc<EmailClient>>,
    list_resolver: Arc<ListResolver>,
    metrics: Arc<Metrics>,
}

impl AppState {
    pub fn create(
        listmonk_client: ListmonkClient,
        email_client: Option<EmailClient>,
        list_resolver: ListResolver,
        metrics: Metrics,
    ) -> Self {
        Self {
            listmonk_client: Arc::new(listmonk_client),
            email_client: email_client.map(Arc::new),
            list_resolver: Arc::new(list_resolver),
            metrics: Arc::new(metrics),
        }
    }
}

#[duplicate_item(
    service_type         field;
    [ ListmonkClient ]   [ listmonk_client ];
    [ ListResolver ]     [ list_resolver ];
    [ Metrics ]          [ metrics ];
)]
impl FromRef<AppState> for Arc<service_type> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.field.clone()
    }
}

// The email client is absent when no provider credential is configured; the
// notification handler turns `None` into its "not configured" failure.
impl FromRef<AppState> for Option<Arc<EmailClient>> {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.email_client.clone()
    }
}
