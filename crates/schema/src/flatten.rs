//! Pure derivation queries over a schema: flattening, visibility,
//! default answers.
//!
//! All three are recomputed fresh on every call — field counts are tens,
//! not thousands, so no incremental caching is kept.

use crate::types::{AnswerSet, AnswerValue, FieldDef, FieldKind, FlattenedField, FormSchema};

/// Every field in document order (section order, then field order within
/// the section), tagged with its owning section. Lazy and restartable;
/// the order is deterministic and equal to authoring order, regardless
/// of visibility.
pub fn flatten(schema: &FormSchema) -> impl Iterator<Item = FlattenedField<'_>> {
    schema.sections.iter().flat_map(|section| {
        section.fields.iter().map(move |field| FlattenedField {
            section_id: &section.id,
            section_title: &section.title,
            field,
        })
    })
}

/// Whether a field is currently visible under the given answers.
///
/// Fields with no condition are always visible. A condition holds only
/// when the referenced answer equals the expected value with exact
/// type-sensitive equality: `Bool(true)` does not match `Text("true")`.
pub fn is_visible(field: &FieldDef, answers: &AnswerSet) -> bool {
    match &field.show_if {
        None => true,
        Some(cond) => answers.get(&cond.field) == Some(&cond.equals),
    }
}

/// The flattened sequence filtered to currently-visible fields.
pub fn visible_fields<'a>(schema: &'a FormSchema, answers: &AnswerSet) -> Vec<FlattenedField<'a>> {
    flatten(schema)
        .filter(|f| is_visible(f.field, answers))
        .collect()
}

/// One entry per declared field: booleans default to `false`, all other
/// kinds to the empty string. Seeding a session with this guarantees
/// every field lookup is defined rather than absent.
pub fn default_answers(schema: &FormSchema) -> AnswerSet {
    flatten(schema)
        .map(|f| {
            let default = if f.field.kind == FieldKind::Boolean {
                AnswerValue::Bool(false)
            } else {
                AnswerValue::Text(String::new())
            };
            (f.field.id.clone(), default)
        })
        .collect()
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Condition, SectionDef};

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

    fn two_section_schema() -> FormSchema {
        FormSchema {
            id: "intake".to_string(),
            version: "1.0".to_string(),
            title: "Intake".to_string(),
            sections: vec![
                SectionDef {
                    id: "business".to_string(),
                    title: "Business".to_string(),
                    fields: vec![
                        field("legal_name", FieldKind::ShortText),
                        field("has_claims", FieldKind::Boolean),
                    ],
                },
                SectionDef {
                    id: "contact".to_string(),
                    title: "Contact".to_string(),
                    fields: vec![field("email", FieldKind::Email)],
                },
            ],
        }
    }

    #[test]
    fn flatten_yields_document_order() {
        let schema = two_section_schema();
        let ids: Vec<&str> = flatten(&schema).map(|f| f.field.id.as_str()).collect();
        assert_eq!(ids, vec!["legal_name", "has_claims", "email"]);

        let sections: Vec<&str> = flatten(&schema).map(|f| f.section_id).collect();
        assert_eq!(sections, vec!["business", "business", "contact"]);
    }

    #[test]
    fn flatten_is_restartable() {
        let schema = two_section_schema();
        assert_eq!(flatten(&schema).count(), 3);
        assert_eq!(flatten(&schema).count(), 3);
    }

    #[test]
    fn unconditional_fields_are_always_visible() {
        let schema = two_section_schema();
        let answers = default_answers(&schema);
        assert_eq!(visible_fields(&schema, &answers).len(), 3);
    }

    #[test]
    fn condition_matches_exact_value_only() {
        let mut schema = two_section_schema();
        schema.sections[1].fields[0].show_if = Some(Condition {
            field: "has_claims".to_string(),
            equals: AnswerValue::Bool(true),
        });

        let mut answers = default_answers(&schema);
        assert_eq!(visible_fields(&schema, &answers).len(), 2);

        answers.insert("has_claims".to_string(), AnswerValue::Bool(true));
        assert_eq!(visible_fields(&schema, &answers).len(), 3);

        // Type-sensitive: the string "true" is not the boolean true.
        answers.insert("has_claims".to_string(), AnswerValue::text("true"));
        assert_eq!(visible_fields(&schema, &answers).len(), 2);
    }

    #[test]
    fn unrelated_answer_never_changes_visibility() {
        let mut schema = two_section_schema();
        schema.sections[1].fields[0].show_if = Some(Condition {
            field: "has_claims".to_string(),
            equals: AnswerValue::Bool(true),
        });

        let mut answers = default_answers(&schema);
        answers.insert("has_claims".to_string(), AnswerValue::Bool(true));
        let before: Vec<String> = visible_fields(&schema, &answers)
            .iter()
            .map(|f| f.field.id.clone())
            .collect();

        answers.insert("legal_name".to_string(), AnswerValue::text("Acme LLC"));
        let after: Vec<String> = visible_fields(&schema, &answers)
            .iter()
            .map(|f| f.field.id.clone())
            .collect();
        assert_eq!(before, after);
    }

    #[test]
    fn defaults_cover_every_field() {
        let schema = two_section_schema();
        let answers = default_answers(&schema);
        assert_eq!(answers.len(), schema.field_count());
        assert_eq!(answers["has_claims"], AnswerValue::Bool(false));
        assert_eq!(answers["legal_name"], AnswerValue::text(""));
        assert_eq!(answers["email"], AnswerValue::text(""));
    }
}
