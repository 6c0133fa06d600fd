//! Field-level answer validation.
//!
//! Rules, in evaluation order:
//!
//! - boolean fields never fail: `false` is a valid, complete answer, so
//!   the required check does not apply to them
//! - required non-boolean fields fail on absent, empty, or
//!   whitespace-only values
//! - email fields additionally fail when non-empty and not shaped like
//!   `local@domain.tld`
//! - number and currency fields must parse as a decimal when non-empty
//! - select fields must carry one of their declared options when non-empty

use std::fmt;
use std::str::FromStr;

use intake_schema::{AnswerSet, AnswerValue, FieldDef, FieldKind, FlattenedField};
use rust_decimal::Decimal;
use serde::Serialize;

/// A field that failed validation, with a message suitable for inline
/// display next to the field. Transient; never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    pub field_id: String,
    pub message: String,
}

impl ValidationError {
    fn new(field: &FieldDef, message: impl Into<String>) -> Self {
        ValidationError {
            field_id: field.id.clone(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field_id, self.message)
    }
}

/// Validate one field against its current value.
///
/// `value` is the entry from the answer set; `None` (an absent key) is
/// treated as an empty answer.
pub fn validate_field(field: &FieldDef, value: Option<&AnswerValue>) -> Result<(), ValidationError> {
    // Booleans are exempt from every check — there is no empty boolean.
    if field.kind.is_boolean() {
        return Ok(());
    }

    let text = match value {
        None => "",
        Some(AnswerValue::Text(s)) => s.as_str(),
        Some(AnswerValue::Bool(_)) => {
            return Err(ValidationError::new(
                field,
                format!("{} has an invalid value", field.label),
            ));
        }
    };
    let trimmed = text.trim();

    if trimmed.is_empty() {
        if field.required {
            return Err(ValidationError::new(
                field,
                format!("{} is required", field.label),
            ));
        }
        return Ok(());
    }

    match field.kind {
        FieldKind::Email if !is_valid_email(trimmed) => Err(ValidationError::new(
            field,
            format!("{} must be a valid email address", field.label),
        )),
        FieldKind::Number if parse_decimal(trimmed).is_none() => Err(ValidationError::new(
            field,
            format!("{} must be a number", field.label),
        )),
        FieldKind::Currency if parse_currency(trimmed).is_none() => Err(ValidationError::new(
            field,
            format!("{} must be a dollar amount", field.label),
        )),
        FieldKind::Select => {
            let options = field.options.as_deref().unwrap_or(&[]);
            if options.iter().any(|o| o == trimmed) {
                Ok(())
            } else {
                Err(ValidationError::new(
                    field,
                    format!("{} must be one of the listed options", field.label),
                ))
            }
        }
        _ => Ok(()),
    }
}

/// Validate every field in the given (visible) list, in document order.
pub fn validate_all(
    visible: &[FlattenedField<'_>],
    answers: &AnswerSet,
) -> Vec<ValidationError> {
    visible
        .iter()
        .filter_map(|f| validate_field(f.field, answers.get(&f.field.id)).err())
        .collect()
}

/// `local@domain.tld`: a single `@`, non-empty local part, dotted domain
/// with non-empty labels, no whitespace anywhere.
fn is_valid_email(s: &str) -> bool {
    if s.chars().any(|c| c.is_whitespace()) {
        return false;
    }
    let Some((local, domain)) = s.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') || !domain.contains('.') {
        return false;
    }
    domain.split('.').all(|label| !label.is_empty())
}

fn parse_decimal(s: &str) -> Option<Decimal> {
    Decimal::from_str(s).ok()
}

/// Currency answers may carry a leading `$` and thousands separators.
fn parse_currency(s: &str) -> Option<Decimal> {
    let cleaned = s.strip_prefix('$').unwrap_or(s).replace(',', "");
    parse_decimal(cleaned.trim())
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────
