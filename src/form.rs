//! The contact form controller: accumulates a [`Submission`] field by field,
//! guards the submit action, sequences the two gateway calls and owns the
//! state shown to the user. The subscription call is the record of truth;
//! the notification email is a courtesy side channel dispatched as a
//! detached task whose outcome is only ever logged.

use crate::domain::{Role, Submission};
use tokio::task::JoinHandle;

pub const SUCCESS_MESSAGE: &str = "Message sent successfully! I'll get back to you soon.";
const FALLBACK_ERROR: &str = "Something went wrong. Please try again later.";
const SUBSCRIPTION_FAILED_PREFIX: &str = "Subscription failed: ";

/// The form's primary state machine. `Submitted` is terminal; a failed
/// submission returns to `Idle` with the draft intact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormState {
    Idle,
    Submitting,
    Submitted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastVariant {
    Success,
    Danger,
}

/// A transient notification shown to the user after a submit attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub variant: ToastVariant,
    pub message: String,
}

impl Toast {
    fn success(message: impl Into<String>) -> Self {
        Self {
            variant: ToastVariant::Success,
            message: message.into(),
        }
    }

    fn danger(message: impl Into<String>) -> Self {
        Self {
            variant: ToastVariant::Danger,
            message: message.into(),
        }
    }
}

/// The result of one submit attempt. `notification` is the handle of the
/// detached notification task when one was dispatched; awaiting it is
/// optional and its outcome never feeds back into the toast or the state.
#[derive(Debug)]
pub struct SubmitOutcome {
    pub toast: Toast,
    pub notification: Option<JoinHandle<()>>,
}

/// Where the form posts to, and which list tokens it targets.
#[derive(Debug, Clone)]
pub struct FormSettings {
    pub api_base_url: String,
    pub contact_list_token: String,
    pub newsletter_list_token: String,
}

pub struct ContactForm {
    settings: FormSettings,
    http_client: reqwest::Client,
    submission: Submission,
    state: FormState,
    awaiting_opt_out_confirmation: bool,
}

impl ContactForm {
    pub fn new(settings: FormSettings) -> Self {
        Self {
            settings,
            http_client: reqwest::Client::new(),
            submission: Submission::default(),
            state: FormState::Idle,
            awaiting_opt_out_confirmation: false,
        }
    }

    pub fn state(&self) -> FormState {
        self.state
    }

    pub fn submission(&self) -> &Submission {
        &self.submission
    }

    /// Whether the submit control is enabled: all required fields are filled
    /// in and no submission is in flight.
    pub fn can_submit(&self) -> bool {
        self.state == FormState::Idle && self.submission.is_complete()
    }

    /// Whether the busy indicator should be shown.
    pub fn is_busy(&self) -> bool {
        self.state == FormState::Submitting
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.submission.name = name.into();
    }

    pub fn set_email(&mut self, email: impl Into<String>) {
        self.submission.email = email.into();
    }

    pub fn select_role(&mut self, role: Role) {
        self.submission.role = Some(role);
    }

    pub fn set_linkedin(&mut self, linkedin: impl Into<String>) {
        self.submission.linkedin = linkedin.into();
    }

    pub fn set_phone(&mut self, phone: impl Into<String>) {
        self.submission.phone = phone.into();
    }

    pub fn set_message(&mut self, message: impl Into<String>) {
        self.submission.message = message.into();
    }

    pub fn subscribes_to_updates(&self) -> bool {
        self.submission.subscribe_to_updates
    }

    /// Whether the opt-out confirmation dialog is open.
    pub fn is_confirmation_open(&self) -> bool {
        self.awaiting_opt_out_confirmation
    }

    /// Toggle the newsletter checkbox. Opting back in is immediate; opting
    /// out only opens the confirmation dialog and leaves the committed value
    /// untouched until [`Self::confirm_opt_out`].
    pub fn toggle_newsletter(&mut self) {
        if self.submission.subscribe_to_updates {
            self.awaiting_opt_out_confirmation = true;
        } else {
            self.submission.subscribe_to_updates = true;
        }
    }

    pub fn confirm_opt_out(&mut self) {
        if self.awaiting_opt_out_confirmation {
            self.submission.subscribe_to_updates = false;
            self.awaiting_opt_out_confirmation = false;
        }
    }

    pub fn cancel_opt_out(&mut self) {
        self.awaiting_opt_out_confirmation = false;
    }

    /// Run one submit attempt: register the contact with the mailing list
    /// and, only once that succeeded, dispatch the notification email as a
    /// detached task. Returns `None` when the submit control is disabled.
    pub async fn submit(&mut self) -> Option<SubmitOutcome> {
        if !self.can_submit() {
            return None;
        }
        self.state = FormState::Submitting;

        // Frozen copy: edits made while the request is in flight do not
        // affect it.
        let submission = self.submission.clone();

        match self.send_subscription(&submission).await {
            Ok(()) => {
                let notification = self.dispatch_notification(&submission);
                self.state = FormState::Submitted;
                Some(SubmitOutcome {
                    toast: Toast::success(SUCCESS_MESSAGE),
                    notification: Some(notification),
                })
            }
            Err(detail) => {
                self.state = FormState::Idle;
                Some(SubmitOutcome {
                    toast: Toast::danger(extract_error_message(detail.as_deref())),
                    notification: None,
                })
            }
        }
    }

    /// Post the subscription request. `Err(Some(detail))` carries the
    /// gateway's error field; `Err(None)` is a transport-level failure with
    /// nothing presentable in it.
    async fn send_subscription(&self, submission: &Submission) -> Result<(), Option<String>> {
        let mut form = reqwest::multipart::Form::new()
            .text("email", submission.email.clone())
            .text("name", submission.name.clone());

        let attribs = submission.list_attributes();
        if !attribs.is_empty() {
            let encoded = serde_json::to_string(&attribs).map_err(|_| None)?;
            form = form.text("attribs", encoded);
        }
        for token in self.list_tokens(submission) {
            form = form.text("l", token);
        }

        let response = self
            .http_client
            .post(format!("{}/api/subscribe", self.settings.api_base_url))
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Failed to reach the subscription gateway");
                None
            })?;
        let result: GatewayResponse = response.json().await.map_err(|e| {
            tracing::error!(error = %e, "Failed to parse the subscription gateway response");
            None
        })?;

        if result.success {
            Ok(())
        } else {
            Err(result.error)
        }
    }

    /// The list tokens targeted by a submission: always the contact list,
    /// plus the newsletter list when the visitor kept the subscription on.
    fn list_tokens(&self, submission: &Submission) -> Vec<String> {
        let mut tokens = vec![self.settings.contact_list_token.clone()];
        if submission.subscribe_to_updates {
            tokens.push(self.settings.newsletter_list_token.clone());
        }
        tokens
    }

    /// Dispatch the notification call as a detached task. The handle is
    /// handed back for callers that want to await shutdown; the delivery
    /// outcome itself is only logged.
    fn dispatch_notification(&self, submission: &Submission) -> JoinHandle<()> {
        let client = self.http_client.clone();
        let url = format!("{}/api/notify", self.settings.api_base_url);
        let email = submission.email.clone();
        let name = submission.name.clone();
        let attribs = serde_json::to_string(&submission.notification_attributes())
            .unwrap_or_else(|_| "{}".to_string());

        tokio::spawn(async move {
            let form = reqwest::multipart::Form::new()
                .text("email", email)
                .text("name", name)
                .text("attribs", attribs);
            let outcome = async {
                client
                    .post(&url)
                    .multipart(form)
                    .send()
                    .await?
                    .json::<GatewayResponse>()
                    .await
            }
            .await;

            match outcome {
                Ok(GatewayResponse { success: true, .. }) => {
                    tracing::debug!("Contact notification delivered");
                }
                Ok(GatewayResponse { error, .. }) => {
                    tracing::warn!(error = ?error, "Contact notification failed");
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Contact notification failed");
                }
            }
        })
    }
}

#[derive(Debug, serde::Deserialize)]
struct GatewayResponse {
    success: bool,
    #[serde(default)]
    error: Option<String>,
}

type DetailParser = fn(&str) -> Option<String>;

/// Best-effort extraction of a human-readable message from a gateway failure
/// detail. The parsers run in order and the first success wins.
fn extract_error_message(detail: Option<&str>) -> String {
    const PARSERS: [DetailParser; 3] = [prefixed_upstream_message, upstream_message, literal_detail];
    detail
        .and_then(|detail| PARSERS.iter().find_map(|parse| parse(detail)))
        .unwrap_or_else(|| FALLBACK_ERROR.to_string())
}

/// A detail wrapped by the subscription gateway: strip the prefix, then read
/// the upstream JSON error.
fn prefixed_upstream_message(detail: &str) -> Option<String> {
    detail
        .strip_prefix(SUBSCRIPTION_FAILED_PREFIX)
        .and_then(upstream_message)
}

/// A bare upstream JSON error with a `message` field.
fn upstream_message(detail: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(detail).ok()?;
    Some(value.get("message")?.as_str()?.to_string())
}

fn literal_detail(detail: &str) -> Option<String> {
    (!detail.trim().is_empty()).then(|| detail.to_string())
}
