use crate::utils::*;
use http::StatusCode;
use pretty_assertions::assert_eq;
use wiremock::matchers::{any, header, method, path};
use wiremock::{Mock, ResponseTemplate};

fn provider_accepts() -> ResponseTemplate {
    ResponseTemplate::new(StatusCode::OK).set_body_json(serde_json::json!({ "id": "b3d0c9e2" }))
}

/// The html body of the one email request captured by the provider double.
async fn sent_html(app: &TestApp) -> String {
    let requests = app
        .email_server()
        .received_requests()
        .await
        .expect("Request recording is enabled");
    assert_eq!(requests.len(), 1);
    let body: serde_json::Value =
        serde_json::from_slice(&requests[0].body).expect("Failed to parse the provider request");
    body["html"]
        .as_str()
        .expect("The provider request carries an html body")
        .to_string()
}

#[tokio::test]
async fn notify_sends_the_email_through_the_provider() {
    // Arrange
    let app = spawn_app().await;

    Mock::given(method("POST"))
        .and(path("/emails"))
        .and(header(
            "Authorization",
            format!("Bearer {EMAIL_API_KEY}").as_str(),
        ))
        .respond_with(provider_accepts())
        .expect(1)
        .mount(app.email_server())
        .await;

    // Act
    let response = app.post_notify(notification_form()).await;

    // Assert
    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = response.json().await.expect("Failed to parse body");
    assert_eq!(body["success"], serde_json::json!(true));
    assert_eq!(body["emailId"], serde_json::json!("b3d0c9e2"));

    let requests = app.email_server().received_requests().await.unwrap();
    let sent: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(sent["from"], serde_json::json!("onboarding@resend.dev"));
    assert_eq!(sent["to"], serde_json::json!([NOTIFICATION_RECIPIENT]));
    assert_eq!(
        sent["subject"],
        serde_json::json!("New Contact Form Submission from Ursula Le Guin")
    );
}

#[tokio::test]
async fn the_email_renders_every_present_attribute_block() {
    // Arrange
    let app = spawn_app().await;

    Mock::given(path("/emails"))
        .respond_with(provider_accepts())
        .expect(1)
        .mount(app.email_server())
        .await;

    // Act
    app.post_notify(notification_form()).await;

    // Assert
    let html = sent_html(&app).await;
    assert!(html.contains("Role:"));
    assert!(html.contains("LinkedIn Profile:"));
    assert!(html.contains("Phone Number:"));
    assert!(html.contains("Message:"));
    assert!(html.contains("I would like to talk about a project."));
    assert!(html.contains("mailto:ursula_le_guin@gmail.com"));

    // The linkedin URL survives rendering as a link.
    let finder = linkify::LinkFinder::new();
    let links: Vec<_> = finder
        .links(&html)
        .filter(|link| link.as_str().contains("linkedin.com"))
        .collect();
    assert!(!links.is_empty());
}

#[tokio::test]
async fn absent_attributes_omit_their_entire_block() {
    // Arrange
    let app = spawn_app().await;

    Mock::given(path("/emails"))
        .respond_with(provider_accepts())
        .expect(1)
        .mount(app.email_server())
        .await;

    let form = reqwest::multipart::Form::new()
        .text("email", "ursula_le_guin@gmail.com")
        .text("name", "Ursula Le Guin")
        .text("attribs", r#"{"role":"Student"}"#);

    // Act
    app.post_notify(form).await;

    // Assert
    let html = sent_html(&app).await;
    assert!(html.contains("Role:"));
    assert!(!html.contains("LinkedIn Profile:"));
    assert!(!html.contains("Phone Number:"));
    assert!(!html.contains("Message:"));
}

#[tokio::test]
async fn a_malformed_attribs_payload_is_tolerated() {
    // Arrange
    let app = spawn_app().await;

    Mock::given(path("/emails"))
        .respond_with(provider_accepts())
        .expect(1)
        .mount(app.email_server())
        .await;

    let form = reqwest::multipart::Form::new()
        .text("email", "ursula_le_guin@gmail.com")
        .text("name", "Ursula Le Guin")
        .text("attribs", "{not json");

    // Act
    let response = app.post_notify(form).await;

    // Assert
    assert_eq!(response.status(), StatusCode::OK);
    let html = sent_html(&app).await;
    assert!(!html.contains("Role:"));
}

#[tokio::test]
async fn notify_fails_cleanly_when_no_credential_is_configured() {
    // Arrange
    let app = spawn_app_without_email_credential().await;

    Mock::given(any())
        // Assert no request is fired to the provider.
        .respond_with(provider_accepts())
        .expect(0)
        .mount(app.email_server())
        .await;

    // Act
    let response = app.post_notify(notification_form()).await;

    // Assert
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: serde_json::Value = response.json().await.expect("Failed to parse body");
    assert_eq!(
        body,
        serde_json::json!({ "success": false, "error": "Email service not configured" })
    );
}

#[tokio::test]
async fn a_provider_rejection_is_not_leaked_to_the_caller() {
    // Arrange
    let app = spawn_app().await;

    Mock::given(path("/emails"))
        .respond_with(
            ResponseTemplate::new(StatusCode::UNAUTHORIZED)
                .set_body_string(r#"{"message":"API key is invalid"}"#),
        )
        .expect(1)
        .mount(app.email_server())
        .await;

    // Act
    let response = app.post_notify(notification_form()).await;

    // Assert
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: serde_json::Value = response.json().await.expect("Failed to parse body");
    assert_eq!(
        body,
        serde_json::json!({ "success": false, "error": "Failed to send email notification" })
    );
}
