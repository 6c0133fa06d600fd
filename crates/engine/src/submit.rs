//! Submitter trait and submission error taxonomy.
//!
//! A `Submitter` asynchronously hands a completed answer set to the
//! external submission collaborator. The session drives the call; the
//! error taxonomy decides whether the session stays retryable
//! (preserving answers and cursor) or ends terminally.

use std::collections::VecDeque;
use std::fmt;
use std::sync::Mutex;

use async_trait::async_trait;
use intake_schema::{default_answers, AnswerSet, AnswerValue, FieldKind, FormSchema};

use crate::validate::ValidationError;

// ──────────────────────────────────────────────
// Errors
// ──────────────────────────────────────────────

/// A structured submission rejection.
///
/// `Unauthorized` and `Gone` are terminal for the session — no retry is
/// meaningful. Everything else preserves the session for a retry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitError {
    /// The collaborator rejected the answer set (missing required
    /// fields, invalid email). Also produced locally when whole-set
    /// validation fails before any network call.
    BadInput {
        message: String,
        errors: Vec<ValidationError>,
    },
    /// The access token does not match the form.
    Unauthorized { message: String },
    /// Too many submissions from this origin within the rolling window.
    RateLimited { retry_after_secs: u64 },
    /// The form has been deactivated.
    Gone { message: String },
    /// The collaborator could not be reached.
    Network { message: String },
    /// The collaborator failed internally.
    Internal { message: String },
}

impl SubmitError {
    /// Terminal rejections end the session; retryable ones preserve it.
    pub fn is_terminal(&self) -> bool {
        matches!(self, SubmitError::Unauthorized { .. } | SubmitError::Gone { .. })
    }
}

impl fmt::Display for SubmitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubmitError::BadInput { message, errors } => {
                if errors.is_empty() {
                    write!(f, "submission rejected: {}", message)
                } else {
                    write!(f, "submission rejected: {} ({} field error(s))", message, errors.len())
                }
            }
            SubmitError::Unauthorized { message } => write!(f, "unauthorized: {}", message),
            SubmitError::RateLimited { retry_after_secs } => {
                write!(f, "rate limited, retry in {}s", retry_after_secs)
            }
            SubmitError::Gone { message } => write!(f, "form no longer available: {}", message),
            SubmitError::Network { message } => write!(f, "network error: {}", message),
            SubmitError::Internal { message } => write!(f, "internal error: {}", message),
        }
    }
}

impl std::error::Error for SubmitError {}

/// Success result: the identifier of the stored submission record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitReceipt {
    pub record_id: String,
}

// ──────────────────────────────────────────────
// Trait
// ──────────────────────────────────────────────

/// Asynchronous handoff of a completed answer set to the submission
/// collaborator. The only suspension point in a form session.
#[async_trait]
pub trait Submitter: Send + Sync {
    async fn submit(
        &self,
        form_id: &str,
        token: &str,
        answers: &AnswerSet,
    ) -> Result<SubmitReceipt, SubmitError>;
}

/// Serialize an answer set as the flat field-id → value JSON object the
/// collaborator accepts.
pub fn answers_to_json(answers: &AnswerSet) -> serde_json::Value {
    let map: serde_json::Map<String, serde_json::Value> = answers
        .iter()
        .map(|(id, value)| {
            let v = match value {
                AnswerValue::Bool(b) => serde_json::Value::Bool(*b),
                AnswerValue::Text(s) => serde_json::Value::String(s.clone()),
            };
            (id.clone(), v)
        })
        .collect();
    serde_json::Value::Object(map)
}

/// Rebuild a typed answer set from a flat JSON object: defaults overlaid
/// with every entry whose JSON type matches the declared field kind.
///
/// Unknown ids and type-mismatched values are dropped, so a stale draft
/// or a tampered submission degrades to defaults instead of failing.
pub fn answers_from_json(schema: &FormSchema, value: &serde_json::Value) -> AnswerSet {
    let mut answers = default_answers(schema);
    let Some(object) = value.as_object() else {
        return answers;
    };
    for (id, raw) in object {
        let Some(flat) = schema.find_field(id) else {
            continue;
        };
        let restored = match (flat.field.kind, raw) {
            (FieldKind::Boolean, serde_json::Value::Bool(b)) => AnswerValue::Bool(*b),
            (FieldKind::Boolean, _) => continue,
            (_, serde_json::Value::String(s)) => AnswerValue::Text(s.clone()),
            _ => continue,
        };
        answers.insert(id.clone(), restored);
    }
    answers
}

// ──────────────────────────────────────────────
// StaticSubmitter
// ──────────────────────────────────────────────

/// A submitter that replays scripted outcomes.
///
/// Useful for testing session submit transitions without a server:
/// scripted outcomes are consumed in order, after which the default
/// receipt (if any) is returned indefinitely.
pub struct StaticSubmitter {
    script: Mutex<VecDeque<Result<SubmitReceipt, SubmitError>>>,
    default_receipt: Option<SubmitReceipt>,
}

impl StaticSubmitter {
    /// Always succeed with the given record id.
    pub fn succeeding(record_id: &str) -> Self {
        StaticSubmitter {
            script: Mutex::new(VecDeque::new()),
            default_receipt: Some(SubmitReceipt {
                record_id: record_id.to_string(),
            }),
        }
    }

    /// Replay the given outcomes in order; further calls fail.
    pub fn with_outcomes(outcomes: Vec<Result<SubmitReceipt, SubmitError>>) -> Self {
        StaticSubmitter {
            script: Mutex::new(outcomes.into()),
            default_receipt: None,
        }
    }
}

#[async_trait]
impl Submitter for StaticSubmitter {
    async fn submit(
        &self,
        _form_id: &str,
        _token: &str,
        _answers: &AnswerSet,
    ) -> Result<SubmitReceipt, SubmitError> {
        let scripted = self
            .script
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front();
        match (scripted, &self.default_receipt) {
            (Some(outcome), _) => outcome,
            (None, Some(receipt)) => Ok(receipt.clone()),
            (None, None) => Err(SubmitError::Internal {
                message: "no scripted outcome left".to_string(),
            }),
        }
    }
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_classification() {
        assert!(SubmitError::Unauthorized { message: "m".into() }.is_terminal());
        assert!(SubmitError::Gone { message: "m".into() }.is_terminal());
        assert!(!SubmitError::RateLimited { retry_after_secs: 30 }.is_terminal());
        assert!(!SubmitError::Network { message: "m".into() }.is_terminal());
        assert!(!SubmitError::BadInput { message: "m".into(), errors: vec![] }.is_terminal());
    }

    #[test]
    fn answers_serialize_flat() {
        let mut answers = AnswerSet::new();
        answers.insert("name".to_string(), AnswerValue::text("Acme"));
        answers.insert("active".to_string(), AnswerValue::Bool(true));
        assert_eq!(
            answers_to_json(&answers),
            serde_json::json!({"active": true, "name": "Acme"})
        );
    }

    #[tokio::test]
    async fn static_submitter_replays_script() {
        let submitter = StaticSubmitter::with_outcomes(vec![
            Err(SubmitError::Network { message: "down".into() }),
            Ok(SubmitReceipt { record_id: "r1".into() }),
        ]);
        let answers = AnswerSet::new();
        assert!(submitter.submit("f", "t", &answers).await.is_err());
        assert_eq!(
            submitter.submit("f", "t", &answers).await.unwrap().record_id,
            "r1"
        );
    }
}
