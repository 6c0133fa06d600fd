//! Structural validation of a loaded schema.
//!
//! Catches authoring mistakes at load time rather than letting them
//! surface as inconsistent visibility mid-session:
//!
//! - duplicate or empty section/field ids
//! - option sets missing from `select` fields, or present on other kinds
//! - visibility conditions referencing unknown, later, or self fields
//!   (which also excludes circular references)
//! - visibility conditions whose expected value can never match the
//!   referenced field (boolean vs text, or an option a select never offers)

use std::collections::HashMap;

use crate::error::SchemaError;
use crate::types::{AnswerValue, Condition, FieldDef, FieldKind, FormSchema};

/// Validate a schema's structure. Returns the first error found, in
/// document order.
pub fn validate(schema: &FormSchema) -> Result<(), SchemaError> {
    if schema.id.trim().is_empty() {
        return Err(SchemaError::form("form id must be non-empty"));
    }
    if schema.version.trim().is_empty() {
        return Err(SchemaError::form("schema version must be non-empty"));
    }

    let mut seen_sections: HashMap<&str, ()> = HashMap::new();
    // Fields already passed in document order; conditions may only
    // reference these.
    let mut earlier_fields: HashMap<&str, &FieldDef> = HashMap::new();

    for section in &schema.sections {
        if section.id.trim().is_empty() {
            return Err(SchemaError::form("section id must be non-empty"));
        }
        if seen_sections.insert(&section.id, ()).is_some() {
            return Err(SchemaError::section(
                &section.id,
                "duplicate section id".to_string(),
            ));
        }

        for field in &section.fields {
            if field.id.trim().is_empty() {
                return Err(SchemaError::section(
                    &section.id,
                    "field id must be non-empty",
                ));
            }
            if earlier_fields.contains_key(field.id.as_str()) {
                return Err(SchemaError::field(
                    &section.id,
                    &field.id,
                    "duplicate field id (ids must be unique across the entire schema)",
                ));
            }

            validate_options(section.id.as_str(), field)?;
            if let Some(cond) = &field.show_if {
                validate_condition(section.id.as_str(), field, cond, &earlier_fields)?;
            }

            earlier_fields.insert(&field.id, field);
        }
    }

    Ok(())
}

/// Option sets belong to `select` fields only, and must be non-empty.
fn validate_options(section_id: &str, field: &FieldDef) -> Result<(), SchemaError> {
    match (field.kind, &field.options) {
        (FieldKind::Select, None) => Err(SchemaError::field(
            section_id,
            &field.id,
            "select field must declare a non-empty option set",
        )),
        (FieldKind::Select, Some(options)) if options.is_empty() => Err(SchemaError::field(
            section_id,
            &field.id,
            "select field must declare a non-empty option set",
        )),
        (FieldKind::Select, Some(_)) => Ok(()),
        (_, Some(_)) => Err(SchemaError::field(
            section_id,
            &field.id,
            format!("options are only valid for select fields, not {}", field.kind.as_str()),
        )),
        (_, None) => Ok(()),
    }
}

/// A condition must reference a strictly earlier field, and its expected
/// value must be one the referenced field can actually produce.
fn validate_condition(
    section_id: &str,
    field: &FieldDef,
    cond: &Condition,
    earlier_fields: &HashMap<&str, &FieldDef>,
) -> Result<(), SchemaError> {
    let referenced = match earlier_fields.get(cond.field.as_str()) {
        Some(f) => *f,
        None => {
            // Distinguish self/forward references from plain typos so the
            // author sees which rule was broken.
            let message = if cond.field == field.id {
                "visibility condition may not reference the field itself".to_string()
            } else {
                format!(
                    "visibility condition references '{}', which does not appear earlier in the form",
                    cond.field
                )
            };
            return Err(SchemaError::field(section_id, &field.id, message));
        }
    };

    match (&cond.equals, referenced.kind) {
        (AnswerValue::Bool(_), FieldKind::Boolean) => Ok(()),
        (AnswerValue::Bool(_), other) => Err(SchemaError::field(
            section_id,
            &field.id,
            format!(
                "condition expects a boolean but '{}' is a {} field",
                cond.field,
                other.as_str()
            ),
        )),
        (AnswerValue::Text(_), FieldKind::Boolean) => Err(SchemaError::field(
            section_id,
            &field.id,
            format!("condition expects text but '{}' is a boolean field", cond.field),
        )),
        (AnswerValue::Text(expected), FieldKind::Select) => {
            let options = referenced.options.as_deref().unwrap_or(&[]);
            if options.iter().any(|o| o == expected) {
                Ok(())
            } else {
                Err(SchemaError::field(
                    section_id,
                    &field.id,
                    format!(
                        "expected value '{}' is not an option of select field '{}'",
                        expected, cond.field
                    ),
                ))
            }
        }
        (AnswerValue::Text(_), _) => Ok(()),
    }
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SectionDef;

    fn field(id: &str, kind: FieldKind) -> FieldDef {
        FieldDef {
            id: id.to_string(),
            kind,
            label: id.to_string(),
            required: false,
            options: None,
            show_if: None,
            placeholder: None,
        }
    }

    fn schema_with(fields: Vec<FieldDef>) -> FormSchema {
        FormSchema {
            id: "intake".to_string(),
            version: "1.0".to_string(),
            title: "Intake".to_string(),
            sections: vec![SectionDef {
                id: "main".to_string(),
                title: "Main".to_string(),
                fields,
            }],
        }
    }

    fn show_if(field: &str, equals: AnswerValue) -> Option<Condition> {
        Some(Condition {
            field: field.to_string(),
            equals,
        })
    }

    #[test]
    fn accepts_well_formed_schema() {
        let mut state = field("state", FieldKind::Select);
        state.options = Some(vec!["CA".to_string(), "NY".to_string()]);
        let mut ny_extra = field("ny_extra", FieldKind::ShortText);
        ny_extra.show_if = show_if("state", AnswerValue::text("NY"));

        let schema = schema_with(vec![field("name", FieldKind::ShortText), state, ny_extra]);
        assert!(validate(&schema).is_ok());
    }

    #[test]
    fn rejects_duplicate_field_id_across_sections() {
        let mut schema = schema_with(vec![field("name", FieldKind::ShortText)]);
        schema.sections.push(SectionDef {
            id: "other".to_string(),
            title: "Other".to_string(),
            fields: vec![field("name", FieldKind::Email)],
        });
        let err = validate(&schema).unwrap_err();
        assert_eq!(err.field_id.as_deref(), Some("name"));
        assert!(err.message.contains("duplicate field id"));
    }

    #[test]
    fn rejects_duplicate_section_id() {
        let mut schema = schema_with(vec![]);
        schema.sections.push(SectionDef {
            id: "main".to_string(),
            title: "Again".to_string(),
            fields: vec![],
        });
        let err = validate(&schema).unwrap_err();
        assert!(err.message.contains("duplicate section id"));
    }

    #[test]
    fn rejects_select_without_options() {
        let schema = schema_with(vec![field("state", FieldKind::Select)]);
        let err = validate(&schema).unwrap_err();
        assert!(err.message.contains("non-empty option set"));

        let mut empty = field("state", FieldKind::Select);
        empty.options = Some(vec![]);
        let err = validate(&schema_with(vec![empty])).unwrap_err();
        assert!(err.message.contains("non-empty option set"));
    }

    #[test]
    fn rejects_options_on_non_select() {
        let mut f = field("name", FieldKind::ShortText);
        f.options = Some(vec!["a".to_string()]);
        let err = validate(&schema_with(vec![f])).unwrap_err();
        assert!(err.message.contains("only valid for select"));
    }

    #[test]
    fn rejects_forward_reference() {
        let mut early = field("early", FieldKind::ShortText);
        early.show_if = show_if("late", AnswerValue::text("x"));
        let schema = schema_with(vec![early, field("late", FieldKind::ShortText)]);
        let err = validate(&schema).unwrap_err();
        assert!(err.message.contains("does not appear earlier"));
    }

    #[test]
    fn rejects_self_reference() {
        let mut f = field("loop", FieldKind::Boolean);
        f.show_if = show_if("loop", AnswerValue::Bool(true));
        let err = validate(&schema_with(vec![f])).unwrap_err();
        assert!(err.message.contains("may not reference the field itself"));
    }

    #[test]
    fn rejects_boolean_text_mismatch() {
        let mut dep = field("dep", FieldKind::ShortText);
        dep.show_if = show_if("flag", AnswerValue::text("true"));
        let schema = schema_with(vec![field("flag", FieldKind::Boolean), dep]);
        let err = validate(&schema).unwrap_err();
        assert!(err.message.contains("boolean field"));

        let mut dep2 = field("dep", FieldKind::ShortText);
        dep2.show_if = show_if("name", AnswerValue::Bool(true));
        let schema2 = schema_with(vec![field("name", FieldKind::ShortText), dep2]);
        let err2 = validate(&schema2).unwrap_err();
        assert!(err2.message.contains("expects a boolean"));
    }

    #[test]
    fn rejects_condition_on_undeclared_option() {
        let mut state = field("state", FieldKind::Select);
        state.options = Some(vec!["CA".to_string()]);
        let mut dep = field("dep", FieldKind::ShortText);
        dep.show_if = show_if("state", AnswerValue::text("TX"));
        let err = validate(&schema_with(vec![state, dep])).unwrap_err();
        assert!(err.message.contains("not an option"));
    }
}
