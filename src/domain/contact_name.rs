use std::fmt::Display;

use unicode_segmentation::UnicodeSegmentation;

/// The validated display name of the person filling in the contact form.
/// Consumers of this type are guaranteed it is non-empty, bounded in length
/// and free of characters with markup or path meaning.
#[derive(Debug, Clone)]
pub struct ContactName(String);

impl ContactName {
    pub fn parse(s: String) -> Result<Self, String> {
        let is_empty_or_whitespace = s.trim().is_empty();

        // Counting graphemes rather than chars, as some visual characters are
        // composed of more than one `char`.
        let is_too_long = s.graphemes(true).count() > 256;

        let forbidden_characters = ['/', '(', ')', '"', '<', '>', '\\', '{', '}'];
        let contains_forbidden_characters = s.chars().any(|c| forbidden_characters.contains(&c));

        if is_empty_or_whitespace || is_too_long || contains_forbidden_characters {
            Err(format!("{s} is not a valid contact name."))
        } else {
            Ok(Self(s))
        }
    }
}

impl Display for ContactName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for ContactName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
