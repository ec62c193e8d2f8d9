//! The vault data model.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The unit of envelope encryption: an ordered sequence of entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vault {
    #[serde(default)]
    pub entries: Vec<Entry>,
}

impl Vault {
    /// A vault with no entries, as written by first-time setup.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }
}

/// One credential record.
///
/// The `secret` field is normally in obscured form (entry-key ciphertext,
/// see [`crate::crypto::EntryCipher`]) and is only plaintext transiently
/// between an `expose` and the next `obscure`. All other fields are
/// cleartext once the envelope is decrypted.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    pub title: String,
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub secret: String,
}

impl Entry {
    /// Build an entry with a fresh id. `secret` is taken as-is; callers
    /// decide whether it is already obscured.
    pub fn new(
        title: impl Into<String>,
        username: impl Into<String>,
        secret: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            username: username.into(),
            url: None,
            note: None,
            secret: secret.into(),
        }
    }
}

// The secret may be plaintext mid-rotation; keep it out of logs.
impl fmt::Debug for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entry")
            .field("id", &self.id)
            .field("title", &self.title)
            .field("username", &self.username)
            .field("url", &self.url)
            .field("note", &self.note)
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vault_json_round_trip() {
        let vault = Vault {
            entries: vec![Entry::new("mail", "alice", "v1:abc")],
        };
        let json = serde_json::to_string(&vault).unwrap();
        let back: Vault = serde_json::from_str(&json).unwrap();
        assert_eq!(back, vault);
    }

    #[test]
    fn entries_without_ids_get_fresh_ones() {
        let json = r#"{"entries":[{"title":"mail","username":"alice","secret":"v1:abc"}]}"#;
        let vault: Vault = serde_json::from_str(json).unwrap();
        assert_eq!(vault.entries.len(), 1);
        assert!(!vault.entries[0].id.is_nil());
    }

    #[test]
    fn empty_vault_serializes_to_entries_array() {
        let json = serde_json::to_string(&Vault::empty()).unwrap();
        assert_eq!(json, r#"{"entries":[]}"#);
    }

    #[test]
    fn debug_redacts_secret() {
        let entry = Entry::new("mail", "alice", "hunter2");
        let rendered = format!("{entry:?}");
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("[REDACTED]"));
    }
}
