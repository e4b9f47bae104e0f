//! Input and normalized record types

use serde::{Deserialize, Serialize};

/// A raw roster entry. Any field may be absent.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct UserRecord {
    /// Free-text display name
    pub name: Option<String>,
    /// Email address
    pub email: Option<String>,
    /// Login or account handle
    pub login: Option<String>,
    /// Caller-supplied join key; synthesized from the other fields when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_id: Option<String>,
}

impl UserRecord {
    /// Create a record without an explicit `full_id`.
    pub fn new(name: Option<&str>, email: Option<&str>, login: Option<&str>) -> Self {
        Self {
            name: name.map(str::to_string),
            email: email.map(str::to_string),
            login: login.map(str::to_string),
            full_id: None,
        }
    }

    /// Attach an explicit join key.
    pub fn with_full_id(mut self, full_id: impl Into<String>) -> Self {
        self.full_id = Some(full_id.into());
        self
    }

    /// The join key: the supplied `full_id`, or `"{name}:{email}:{login}"`
    /// with absent fields rendered empty.
    pub fn full_id(&self) -> String {
        match &self.full_id {
            Some(id) => id.clone(),
            None => synthesize_full_id(
                self.name.as_deref(),
                self.email.as_deref(),
                self.login.as_deref(),
            ),
        }
    }
}

/// Build the `"{name}:{email}:{login}"` key.
pub fn synthesize_full_id(name: Option<&str>, email: Option<&str>, login: Option<&str>) -> String {
    format!(
        "{}:{}:{}",
        name.unwrap_or_default(),
        email.unwrap_or_default(),
        login.unwrap_or_default()
    )
}

/// A record reduced to the comparable parts used by the scorer.
///
/// Empty strings stand for "absent"; the `has_*` accessors are the only
/// presence checks the scorer uses.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NormalizedRecord {
    /// Name as supplied, kept so that only truly identical rows compare equal
    pub name: String,
    /// Lowercased name without punctuation or banned tokens
    pub normalized_name: String,
    /// First token of the normalized name
    pub first_name: String,
    /// Last token of the normalized name when it has two or more tokens
    pub last_name: String,
    /// Raw email, used for name-in-handle matching
    pub email: String,
    /// Text before the first '@' of the email
    pub email_local_part: String,
    /// Login, passed through unchanged
    pub login: String,
}

impl NormalizedRecord {
    pub fn has_name(&self) -> bool {
        !self.normalized_name.is_empty()
    }

    pub fn has_email(&self) -> bool {
        !self.email_local_part.is_empty()
    }

    pub fn has_login(&self) -> bool {
        !self.login.is_empty()
    }
}
