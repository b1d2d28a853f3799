//! User identity helpers
//!
//! The storage prefix, notification topic, and queue for a user all derive
//! from the same sanitized identifier, so the derivation lives here rather
//! than in any one adapter.

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Sanitize a user identifier (email or id) for use in object keys and
/// topic/queue names: non-alphanumerics become `_`, the result is lowercased.
///
/// Must match the derivation used by the vision pipeline when it names
/// per-user topics, or notifications end up on the wrong topic.
pub fn user_key(identifier: &str) -> String {
    identifier
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_lowercase() } else { '_' })
        .collect()
}

/// The object-storage prefix holding one user's uploads
pub fn storage_prefix(identifier: &str) -> String {
    format!("users/{}/", user_key(identifier))
}

/// Profile row stored in the user-details table
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub user_id: String,
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub profile_picture: String,
    #[serde(default)]
    pub provider: String,
    #[serde(default)]
    pub last_login: String,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
}

impl UserProfile {
    /// Build a profile from identity-provider fields, splitting a display
    /// name into first/last on the first space.
    pub fn from_identity(
        user_id: &str,
        email: &str,
        display_name: Option<&str>,
        avatar_url: Option<&str>,
        provider: Option<&str>,
        created_at: Option<&str>,
        updated_at: Option<&str>,
    ) -> Self {
        let (first_name, last_name) = match display_name {
            Some(name) => split_display_name(name),
            None => (String::new(), String::new()),
        };
        let now = Utc::now().to_rfc3339();
        Self {
            user_id: user_id.to_string(),
            email: email.to_string(),
            first_name,
            last_name,
            profile_picture: avatar_url.unwrap_or_default().to_string(),
            provider: provider.unwrap_or("google").to_string(),
            last_login: now.clone(),
            created_at: created_at.unwrap_or_default().to_string(),
            updated_at: updated_at.map(str::to_string).unwrap_or(now),
        }
    }
}

fn split_display_name(name: &str) -> (String, String) {
    let mut parts = name.split_whitespace();
    let first = parts.next().unwrap_or_default().to_string();
    let rest: Vec<&str> = parts.collect();
    (first, rest.join(" "))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_key_sanitizes_emails() {
        assert_eq!(user_key("john.doe@gmail.com"), "john_doe_gmail_com");
        assert_eq!(user_key("Ada+Test@Example.ORG"), "ada_test_example_org");
        assert_eq!(user_key("plain123"), "plain123");
    }

    #[test]
    fn storage_prefix_embeds_user_key() {
        assert_eq!(storage_prefix("a@b.c"), "users/a_b_c/");
    }

    #[test]
    fn display_name_splits_on_first_space() {
        assert_eq!(
            split_display_name("Grace Brewster Hopper"),
            ("Grace".to_string(), "Brewster Hopper".to_string())
        );
        assert_eq!(split_display_name("Prince"), ("Prince".to_string(), String::new()));
        assert_eq!(split_display_name(""), (String::new(), String::new()));
    }
}
