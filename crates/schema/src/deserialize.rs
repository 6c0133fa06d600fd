//! Loading form schema documents from JSON.
//!
//! [`load_str`] is the entry point used by the engine and the CLI: it
//! parses and structurally validates in one step, so a schema that
//! loads successfully is safe to run a session against.

use crate::error::SchemaError;
use crate::types::FormSchema;
use crate::validate::validate;

/// Parse a schema document from JSON text without structural validation.
pub fn parse_str(text: &str) -> Result<FormSchema, SchemaError> {
    serde_json::from_str(text).map_err(|e| SchemaError::form(format!("invalid schema JSON: {}", e)))
}

/// Parse a schema document from an already-parsed JSON value.
pub fn parse_value(value: &serde_json::Value) -> Result<FormSchema, SchemaError> {
    serde_json::from_value(value.clone())
        .map_err(|e| SchemaError::form(format!("invalid schema JSON: {}", e)))
}

/// Parse and structurally validate a schema document.
pub fn load_str(text: &str) -> Result<FormSchema, SchemaError> {
    let schema = parse_str(text)?;
    validate(&schema)?;
    Ok(schema)
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AnswerValue, FieldKind};

    const MINIMAL: &str = r#"{
        "id": "commercial-auto",
        "version": "1.0",
        "title": "Commercial Auto Intake",
        "sections": [
            {
                "id": "business",
                "title": "Business profile",
                "fields": [
                    {"id": "legal_name", "kind": "short_text", "label": "Legal business name", "required": true},
                    {"id": "prior_claims", "kind": "boolean", "label": "Any prior claims?", "required": true},
                    {"id": "claim_count", "kind": "number", "label": "How many claims?",
                     "show_if": {"field": "prior_claims", "equals": true}}
                ]
            }
        ]
    }"#;

    #[test]
    fn loads_minimal_document() {
        let schema = load_str(MINIMAL).unwrap();
        assert_eq!(schema.id, "commercial-auto");
        assert_eq!(schema.field_count(), 3);

        let claim_count = schema.find_field("claim_count").unwrap();
        assert_eq!(claim_count.field.kind, FieldKind::Number);
        let cond = claim_count.field.show_if.as_ref().unwrap();
        assert_eq!(cond.field, "prior_claims");
        assert_eq!(cond.equals, AnswerValue::Bool(true));
    }

    #[test]
    fn rejects_unknown_fields() {
        let text = MINIMAL.replace("\"required\": true", "\"required\": true, \"color\": \"red\"");
        let err = parse_str(&text).unwrap_err();
        assert!(err.message.contains("invalid schema JSON"));
    }

    #[test]
    fn rejects_unknown_kind() {
        let text = MINIMAL.replace("short_text", "rich_text");
        assert!(parse_str(&text).is_err());
    }

    #[test]
    fn load_runs_structural_validation() {
        // Flip the condition to reference a later field.
        let text = MINIMAL.replace(
            "{\"field\": \"prior_claims\", \"equals\": true}",
            "{\"field\": \"claim_count\", \"equals\": \"3\"}",
        );
        assert!(parse_str(&text).is_ok());
        assert!(load_str(&text).is_err());
    }

    #[test]
    fn round_trips_through_serde() {
        let schema = load_str(MINIMAL).unwrap();
        let json = serde_json::to_string(&schema).unwrap();
        let again = load_str(&json).unwrap();
        assert_eq!(schema, again);
    }
}
