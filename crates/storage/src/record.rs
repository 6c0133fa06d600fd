//! Record types persisted by the stores.
//!
//! Answer payloads are carried as `serde_json::Value` so this crate
//! stays decoupled from the schema model; the engine owns the typed
//! `AnswerSet` representation and converts at the boundary.

use serde::{Deserialize, Serialize};

use crate::error::StorageError;

/// How many characters of the access token participate in a draft
/// session key.
const TOKEN_PREFIX_LEN: usize = 8;

/// A durable snapshot of an in-progress session: the answer set plus the
/// step cursor. Overwritten after every mutation, read once at session
/// start, deleted on successful submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Draft {
    /// Flat field-id → value object (JSON bool or string per field).
    pub answers: serde_json::Value,
    /// Index into the visible-field list at the time of the snapshot.
    /// Clamped on restore if visibility has since changed.
    pub cursor: usize,
}

impl Draft {
    /// The store key for a session: form id plus a fixed-length prefix
    /// of the access token.
    ///
    /// Two tabs opened on the same access link share this key, so their
    /// drafts are last-write-wins. Drafts are device-local convenience
    /// state; the submission itself is unaffected.
    pub fn session_key(form_id: &str, token: &str) -> String {
        let prefix: String = token.chars().take(TOKEN_PREFIX_LEN).collect();
        format!("{}.{}", form_id, prefix)
    }

    pub fn to_json(&self) -> Result<String, StorageError> {
        serde_json::to_string(self).map_err(|e| StorageError::Backend(e.to_string()))
    }

    pub fn from_json(key: &str, text: &str) -> Result<Self, StorageError> {
        serde_json::from_str(text).map_err(|e| StorageError::Corrupt {
            key: key.to_owned(),
            message: e.to_string(),
        })
    }
}

/// An accepted submission, as persisted by the submission collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionRecord {
    pub record_id: String,
    pub form_id: String,
    /// The full answer set as a flat field-id → value object.
    pub answers: serde_json::Value,
    #[serde(with = "time::serde::rfc3339")]
    pub submitted_at: time::OffsetDateTime,
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_key_uses_token_prefix() {
        let key = Draft::session_key("commercial-auto", "tok_4f9a2c81d733");
        assert_eq!(key, "commercial-auto.tok_4f9a");
    }

    #[test]
    fn session_key_tolerates_short_tokens() {
        assert_eq!(Draft::session_key("f", "abc"), "f.abc");
    }

    #[test]
    fn draft_round_trips() {
        let draft = Draft {
            answers: serde_json::json!({"legal_name": "Acme LLC", "prior_claims": true}),
            cursor: 2,
        };
        let text = draft.to_json().unwrap();
        let back = Draft::from_json("k", &text).unwrap();
        assert_eq!(draft, back);
    }

    #[test]
    fn corrupt_draft_reports_key() {
        let err = Draft::from_json("form.tok", "{not json").unwrap_err();
        match err {
            StorageError::Corrupt { key, .. } => assert_eq!(key, "form.tok"),
            other => panic!("unexpected error: {}", other),
        }
    }
}
