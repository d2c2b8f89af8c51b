use crate::utils::*;
use http::StatusCode;
use portfolio_contact::domain::Role;
use portfolio_contact::form::{ContactForm, FormSettings, FormState, ToastVariant};
use pretty_assertions::assert_eq;
use wiremock::matchers::{method, path};
use wiremock::{Mock, Request, ResponseTemplate};

fn contact_form(app: &TestApp) -> ContactForm {
    let mut form = ContactForm::new(FormSettings {
        api_base_url: app.address().clone(),
        contact_list_token: CONTACT_LIST_TOKEN.to_string(),
        newsletter_list_token: NEWSLETTER_LIST_TOKEN.to_string(),
    });
    form.set_name("Ursula Le Guin");
    form.set_email("ursula_le_guin@gmail.com");
    form.select_role(Role::Developer);
    form
}

fn provider_accepts() -> ResponseTemplate {
    ResponseTemplate::new(StatusCode::OK).set_body_json(serde_json::json!({ "id": "b3d0c9e2" }))
}

struct ListsMatcher {
    expected_lists: Vec<u32>,
}

impl wiremock::Match for ListsMatcher {
    fn matches(&self, request: &Request) -> bool {
        let Ok(body) = serde_json::from_slice::<serde_json::Value>(&request.body) else {
            return false;
        };
        body.get("lists") == Some(&serde_json::json!(self.expected_lists))
    }
}

#[tokio::test]
async fn a_successful_submission_drives_both_gateways_in_order() {
    // Arrange
    let app = spawn_app().await;

    Mock::given(method("POST"))
        .and(path("/api/subscribers"))
        .respond_with(ResponseTemplate::new(StatusCode::OK))
        .expect(1)
        .mount(app.listmonk_server())
        .await;
    Mock::given(method("POST"))
        .and(path("/emails"))
        .respond_with(provider_accepts())
        .expect(1)
        .mount(app.email_server())
        .await;

    let mut form = contact_form(&app);
    form.set_message("I would like to talk about a project.");

    // Act
    let outcome = form.submit().await.expect("The submit control is enabled");

    // Assert
    assert_eq!(outcome.toast.variant, ToastVariant::Success);
    assert_eq!(
        outcome.toast.message,
        "Message sent successfully! I'll get back to you soon."
    );
    assert_eq!(form.state(), FormState::Submitted);

    // The notification is detached; wait for it before the mocks verify.
    outcome
        .notification
        .expect("A notification task was dispatched")
        .await
        .expect("The notification task does not panic");
}

#[tokio::test]
async fn a_rejected_subscription_returns_the_form_to_idle_with_the_unwrapped_message() {
    // Arrange
    let app = spawn_app().await;

    Mock::given(method("POST"))
        .and(path("/api/subscribers"))
        .respond_with(
            ResponseTemplate::new(StatusCode::BAD_REQUEST)
                .set_body_string(r#"{"message":"email already exists"}"#),
        )
        .expect(1)
        .mount(app.listmonk_server())
        .await;
    Mock::given(method("POST"))
        .and(path("/emails"))
        // The notification must not fire when the subscription failed.
        .respond_with(provider_accepts())
        .expect(0)
        .mount(app.email_server())
        .await;

    let mut form = contact_form(&app);

    // Act
    let outcome = form.submit().await.expect("The submit control is enabled");

    // Assert
    assert_eq!(outcome.toast.variant, ToastVariant::Danger);
    assert_eq!(outcome.toast.message, "email already exists");
    assert!(outcome.notification.is_none());
    // The draft survives for a retry.
    assert_eq!(form.state(), FormState::Idle);
    assert_eq!(form.submission().email, "ursula_le_guin@gmail.com");
    assert!(form.can_submit());
}

#[tokio::test]
async fn a_notification_failure_does_not_affect_the_submission_outcome() {
    // Arrange
    let app = spawn_app().await;

    Mock::given(method("POST"))
        .and(path("/api/subscribers"))
        .respond_with(ResponseTemplate::new(StatusCode::OK))
        .expect(1)
        .mount(app.listmonk_server())
        .await;
    Mock::given(method("POST"))
        .and(path("/emails"))
        .respond_with(ResponseTemplate::new(StatusCode::INTERNAL_SERVER_ERROR))
        .expect(1)
        .mount(app.email_server())
        .await;

    let mut form = contact_form(&app);

    // Act
    let outcome = form.submit().await.expect("The submit control is enabled");

    // Assert
    assert_eq!(outcome.toast.variant, ToastVariant::Success);
    assert_eq!(form.state(), FormState::Submitted);
    outcome
        .notification
        .expect("A notification task was dispatched")
        .await
        .expect("The notification task does not panic");
}

#[tokio::test]
async fn the_submission_succeeds_even_without_an_email_provider_credential() {
    // Arrange
    let app = spawn_app_without_email_credential().await;

    Mock::given(method("POST"))
        .and(path("/api/subscribers"))
        .respond_with(ResponseTemplate::new(StatusCode::OK))
        .expect(1)
        .mount(app.listmonk_server())
        .await;
    Mock::given(method("POST"))
        .and(path("/emails"))
        // The unconfigured gateway never attempts a delivery.
        .respond_with(provider_accepts())
        .expect(0)
        .mount(app.email_server())
        .await;

    let mut form = contact_form(&app);

    // Act
    let outcome = form.submit().await.expect("The submit control is enabled");

    // Assert
    assert_eq!(outcome.toast.variant, ToastVariant::Success);
    assert_eq!(form.state(), FormState::Submitted);
    outcome
        .notification
        .expect("A notification task was dispatched")
        .await
        .expect("The notification task does not panic");
}

#[tokio::test]
async fn opting_out_of_the_newsletter_narrows_the_membership_to_the_contact_list() {
    // Arrange
    let app = spawn_app().await;

    Mock::given(method("POST"))
        .and(path("/api/subscribers"))
        .and(ListsMatcher {
            expected_lists: vec![CONTACT_LIST_ID],
        })
        .respond_with(ResponseTemplate::new(StatusCode::OK))
        .expect(1)
        .mount(app.listmonk_server())
        .await;
    Mock::given(method("POST"))
        .and(path("/emails"))
        .respond_with(provider_accepts())
        .mount(app.email_server())
        .await;

    let mut form = contact_form(&app);
    form.toggle_newsletter();
    form.confirm_opt_out();

    // Act
    let outcome = form.submit().await.expect("The submit control is enabled");

    // Assert
    assert_eq!(outcome.toast.variant, ToastVariant::Success);
    if let Some(notification) = outcome.notification {
        notification.await.expect("The notification task does not panic");
    }
}

#[tokio::test]
async fn both_lists_are_targeted_while_the_subscription_stays_on() {
    // Arrange
    let app = spawn_app().await;

    Mock::given(method("POST"))
        .and(path("/api/subscribers"))
        .and(ListsMatcher {
            expected_lists: vec![CONTACT_LIST_ID, NEWSLETTER_LIST_ID],
        })
        .respond_with(ResponseTemplate::new(StatusCode::OK))
        .expect(1)
        .mount(app.listmonk_server())
        .await;
    Mock::given(method("POST"))
        .and(path("/emails"))
        .respond_with(provider_accepts())
        .mount(app.email_server())
        .await;

    let mut form = contact_form(&app);
    // A cancelled opt-out leaves the subscription on.
    form.toggle_newsletter();
    form.cancel_opt_out();

    // Act
    let outcome = form.submit().await.expect("The submit control is enabled");

    // Assert
    assert_eq!(outcome.toast.variant, ToastVariant::Success);
    if let Some(notification) = outcome.notification {
        notification.await.expect("The notification task does not panic");
    }
}

#[tokio::test]
async fn a_transport_failure_surfaces_the_generic_retry_message() {
    // Arrange: no app at all behind the configured address.
    let mut form = ContactForm::new(FormSettings {
        api_base_url: "http://127.0.0.1:1".to_string(),
        contact_list_token: CONTACT_LIST_TOKEN.to_string(),
        newsletter_list_token: NEWSLETTER_LIST_TOKEN.to_string(),
    });
    form.set_name("Ursula Le Guin");
    form.set_email("ursula_le_guin@gmail.com");
    form.select_role(Role::Developer);

    // Act
    let outcome = form.submit().await.expect("The submit control is enabled");

    // Assert
    assert_eq!(outcome.toast.variant, ToastVariant::Danger);
    assert_eq!(
        outcome.toast.message,
        "Something went wrong. Please try again later."
    );
    assert_eq!(form.state(), FormState::Idle);
}
