use serde::{Deserialize, Serialize};

/// A user as scraped from the site.
///
/// Every field defaults to an empty string when the markup does not carry it,
/// so callers must tolerate partially-populated records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: String,
    pub name: String,
    pub email: String,
}

impl UserRecord {
    pub fn new(id: impl Into<String>, name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            email: email.into(),
        }
    }

    /// Build a record from separate name parts, joining them with a space.
    /// Either part may be empty.
    pub fn from_name_parts(id: &str, first_name: &str, last_name: &str, email: &str) -> Self {
        let name = format!("{} {}", first_name.trim(), last_name.trim())
            .trim()
            .to_string();
        Self::new(id.trim(), name, email.trim())
    }
}
