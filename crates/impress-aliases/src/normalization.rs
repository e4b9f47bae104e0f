//! Text normalization for alias comparison
//!
//! All functions are total: absent input yields an empty string.

use std::collections::HashSet;

use crate::config::DEFAULT_BANNED_WORDS;
use crate::record::{NormalizedRecord, UserRecord};

/// Normalizes names against a fixed set of banned tokens.
#[derive(Debug, Clone)]
pub struct NameNormalizer {
    banned_words: HashSet<String>,
}

impl Default for NameNormalizer {
    fn default() -> Self {
        Self::new(DEFAULT_BANNED_WORDS)
    }
}

impl NameNormalizer {
    /// Create a normalizer that drops the given tokens (case-insensitive).
    pub fn new<I, S>(banned_words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            banned_words: banned_words
                .into_iter()
                .map(|w| w.as_ref().to_lowercase())
                .collect(),
        }
    }

    /// Lowercase, strip punctuation, drop banned tokens, and rejoin with
    /// single spaces.
    pub fn normalize_name(&self, name: Option<&str>) -> String {
        let Some(name) = name else {
            return String::new();
        };
        let cleaned = remove_punctuation(name);
        self.remove_banned_words(&cleaned)
    }

    /// Drop whole tokens that appear in the banned set.
    pub fn remove_banned_words(&self, name: &str) -> String {
        name.split_whitespace()
            .filter(|token| !self.banned_words.contains(&token.to_lowercase()))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Reduce a raw record to its comparable parts.
    pub fn normalize_record(&self, record: &UserRecord) -> NormalizedRecord {
        let normalized_name = self.normalize_name(record.name.as_deref());
        let (first_name, last_name) = split_name(&normalized_name);
        let email = record.email.clone().unwrap_or_default();
        let email_local_part = email_local_part(record.email.as_deref());

        NormalizedRecord {
            name: record.name.clone().unwrap_or_default(),
            normalized_name,
            first_name,
            last_name,
            email,
            email_local_part,
            login: record.login.clone().unwrap_or_default(),
        }
    }
}

/// Normalize a name with the default banned-word list.
pub fn normalize_name(name: Option<&str>) -> String {
    NameNormalizer::default().normalize_name(name)
}

/// Remove ASCII punctuation and lowercase.
pub fn remove_punctuation(name: &str) -> String {
    name.chars()
        .filter(|c| !c.is_ascii_punctuation())
        .collect::<String>()
        .to_lowercase()
}

/// Split a normalized name into (first, last).
///
/// The last name is empty unless the name has at least two tokens.
pub fn split_name(name: &str) -> (String, String) {
    let parts: Vec<&str> = name.split_whitespace().collect();
    match parts.as_slice() {
        [] => (String::new(), String::new()),
        [only] => (only.to_string(), String::new()),
        [first, .., last] => (first.to_string(), last.to_string()),
    }
}

/// Everything before the first '@'.
///
/// An address without '@' is returned whole; an address starting with '@'
/// has no local part.
pub fn email_local_part(email: Option<&str>) -> String {
    match email {
        Some(email) => email.split('@').next().unwrap_or_default().to_string(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_name() {
        assert_eq!(normalize_name(Some("John Smith")), "john smith");
        assert_eq!(normalize_name(Some("Smith, John")), "smith john");
        assert_eq!(normalize_name(Some("  John   O'Brien ")), "john obrien");
    }

    #[test]
    fn test_normalize_name_banned_words() {
        assert_eq!(normalize_name(Some("jr john smith")), "john smith");
        assert_eq!(normalize_name(Some("Dr. John Smith Jr.")), "john smith");
        assert_eq!(normalize_name(Some("Admin")), "");
        assert_eq!(normalize_name(Some("Mrs Support")), "");
    }

    #[test]
    fn test_banned_words_whole_token_only() {
        assert_eq!(normalize_name(Some("Drake Mrsic")), "drake mrsic");
    }

    #[test]
    fn test_normalize_name_missing() {
        assert_eq!(normalize_name(None), "");
        assert_eq!(normalize_name(Some("")), "");
    }

    #[test]
    fn test_custom_banned_words() {
        let normalizer = NameNormalizer::new(["Bot"]);
        assert_eq!(normalizer.normalize_name(Some("Build Bot")), "build");
        assert_eq!(normalizer.normalize_name(Some("Dr Who")), "dr who");
    }

    #[test]
    fn test_split_name() {
        assert_eq!(split_name(""), ("".to_string(), "".to_string()));
        assert_eq!(split_name("john"), ("john".to_string(), "".to_string()));
        assert_eq!(
            split_name("john ronald smith"),
            ("john".to_string(), "smith".to_string())
        );
    }

    #[test]
    fn test_email_local_part() {
        assert_eq!(email_local_part(Some("j.smith@x.com")), "j.smith");
        assert_eq!(email_local_part(Some("a@b@c")), "a");
        assert_eq!(email_local_part(Some("@x.com")), "");
        assert_eq!(email_local_part(Some("jsmith")), "jsmith");
        assert_eq!(email_local_part(None), "");
    }

    #[test]
    fn test_normalize_record() {
        let record = UserRecord::new(Some("Mr. John Smith"), Some("JS@x.com"), Some("jsmith"));
        let normalized = NameNormalizer::default().normalize_record(&record);
        assert_eq!(normalized.normalized_name, "john smith");
        assert_eq!(normalized.first_name, "john");
        assert_eq!(normalized.last_name, "smith");
        assert_eq!(normalized.email, "JS@x.com");
        assert_eq!(normalized.email_local_part, "JS");
        assert_eq!(normalized.login, "jsmith");
        assert!(normalized.has_name() && normalized.has_email() && normalized.has_login());
    }
}
