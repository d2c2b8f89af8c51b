use super::Role;

/// One contact-form fill, as accumulated by the form controller. Created
/// empty, mutated field by field on user input and cloned at submit time so
/// the in-flight request is unaffected by later edits.
#[derive(Debug, Clone)]
pub struct Submission {
    pub name: String,
    pub email: String,
    pub role: Option<Role>,
    pub linkedin: String,
    pub phone: String,
    pub message: String,
    pub subscribe_to_updates: bool,
}

impl Default for Submission {
    fn default() -> Self {
        Self {
            name: String::new(),
            email: String::new(),
            role: None,
            linkedin: String::new(),
            phone: String::new(),
            message: String::new(),
            subscribe_to_updates: true,
        }
    }
}

impl Submission {
    /// Whether all required fields are filled in. Re-evaluated on every
    /// keystroke.
    pub fn is_complete(&self) -> bool {
        !self.name.is_empty() && !self.email.is_empty() && self.role.is_some()
    }

    /// The attribute projection stored on the mailing-list profile. The free
    /// text message never goes into it.
    pub fn list_attributes(&self) -> AttributeSet {
        AttributeSet {
            role: self.role.map(|role| role.to_string()),
            linkedin: non_empty(&self.linkedin),
            phone: non_empty(&self.phone),
            message: None,
        }
    }

    /// The attribute projection carried by the notification email: the list
    /// projection plus the message.
    pub fn notification_attributes(&self) -> AttributeSet {
        AttributeSet {
            message: non_empty(&self.message),
            ..self.list_attributes()
        }
    }
}

fn non_empty(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

/// The optional-attribute projection shipped to a downstream system. Fields
/// left empty on the form are omitted from the serialized form entirely,
/// never sent as empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct AttributeSet {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linkedin: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl AttributeSet {
    pub fn is_empty(&self) -> bool {
        self.role.is_none()
            && self.linkedin.is_none()
            && self.phone.is_none()
            && self.message.is_none()
    }
}
