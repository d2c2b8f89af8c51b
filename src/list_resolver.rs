use std::fmt::Display;

/// A mailing list's internal numeric identifier, as understood by the
/// mailing-list manager's API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct ListId(u32);

impl ListId {
    pub fn new(id: u32) -> Self {
        Self(id)
    }
}

impl Display for ListId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Read-only mapping from the opaque list tokens exposed to the form to the
/// internal identifiers used on the wire. Built once from configuration at
/// startup and shared through the application state.
#[derive(Debug)]
pub struct ListResolver {
    contact: MappedList,
    newsletter: MappedList,
}

#[derive(Debug)]
struct MappedList {
    token: String,
    id: ListId,
}

impl ListResolver {
    pub fn new(
        contact_token: String,
        contact_id: ListId,
        newsletter_token: String,
        newsletter_id: ListId,
    ) -> Self {
        Self {
            contact: MappedList {
                token: contact_token,
                id: contact_id,
            },
            newsletter: MappedList {
                token: newsletter_token,
                id: newsletter_id,
            },
        }
    }

    /// Resolve an opaque token to its internal identifier. Unknown tokens
    /// resolve to `None`; dropping them is the caller's call.
    pub fn resolve(&self, token: &str) -> Option<ListId> {
        [&self.contact, &self.newsletter]
            .into_iter()
            .find(|list| list.token == token)
            .map(|list| list.id)
    }
}
