//! Typed structs representing the form schema JSON document.
//!
//! These types are the declarative shape of a form: ordered sections of
//! typed fields. The engine treats a loaded [`FormSchema`] as immutable
//! for the duration of a session; only the [`AnswerSet`] mutates.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// The closed set of field kinds a schema may declare.
///
/// Each kind determines how an answer is interpreted and which
/// validation rules apply. Serialized snake_case in schema documents
/// (e.g. `"short_text"`, `"select"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    ShortText,
    Number,
    Email,
    Phone,
    Date,
    Select,
    Boolean,
    LongText,
    Currency,
}

impl FieldKind {
    /// True for fields answered with a boolean rather than text.
    pub fn is_boolean(self) -> bool {
        matches!(self, FieldKind::Boolean)
    }

    /// True for kinds whose text answers must parse as a decimal.
    pub fn is_numeric(self) -> bool {
        matches!(self, FieldKind::Number | FieldKind::Currency)
    }

    /// The snake_case name used in schema documents.
    pub fn as_str(self) -> &'static str {
        match self {
            FieldKind::ShortText => "short_text",
            FieldKind::Number => "number",
            FieldKind::Email => "email",
            FieldKind::Phone => "phone",
            FieldKind::Date => "date",
            FieldKind::Select => "select",
            FieldKind::Boolean => "boolean",
            FieldKind::LongText => "long_text",
            FieldKind::Currency => "currency",
        }
    }
}

/// A single answer value: boolean for `boolean` fields, text for all
/// other kinds (numbers, currency amounts and dates are carried as text
/// and interpreted by field kind).
///
/// Equality is type-sensitive: `Bool(true)` never equals `Text("true")`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerValue {
    Bool(bool),
    Text(String),
}

impl AnswerValue {
    /// Convenience constructor for a text answer.
    pub fn text(s: impl Into<String>) -> Self {
        AnswerValue::Text(s.into())
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            AnswerValue::Text(s) => Some(s),
            AnswerValue::Bool(_) => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AnswerValue::Bool(b) => Some(*b),
            AnswerValue::Text(_) => None,
        }
    }

    /// True when the value carries no answer content.
    ///
    /// Booleans are never blank: `false` is a complete answer.
    pub fn is_blank(&self) -> bool {
        match self {
            AnswerValue::Bool(_) => false,
            AnswerValue::Text(s) => s.trim().is_empty(),
        }
    }
}

/// Mutable per-session mapping from field id to current answer value.
///
/// `BTreeMap` keeps iteration (and serialized drafts) deterministic.
pub type AnswerSet = BTreeMap<String, AnswerValue>;

/// A visibility condition attached to a field.
///
/// The field is visible only when the referenced field's current answer
/// exactly equals `equals`. The referenced field must appear strictly
/// earlier in document order; [`crate::validate`] rejects schemas that
/// violate this.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Condition {
    /// Id of the earlier field whose answer gates visibility.
    pub field: String,
    /// Expected value, compared with exact type-sensitive equality.
    pub equals: AnswerValue,
}

/// One form input's declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldDef {
    /// Stable identifier, unique across the entire schema.
    pub id: String,
    pub kind: FieldKind,
    /// Human-readable label, also used in validation messages.
    pub label: String,
    #[serde(default)]
    pub required: bool,
    /// Selectable option values. Only valid for `select` fields, which
    /// must declare a non-empty set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_if: Option<Condition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
}

/// Named, ordered group of fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SectionDef {
    pub id: String,
    pub title: String,
    pub fields: Vec<FieldDef>,
}

/// The root declarative form document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FormSchema {
    /// Form identifier, used to scope submissions and draft keys.
    pub id: String,
    /// Schema document version (e.g. "1.0").
    pub version: String,
    pub title: String,
    pub sections: Vec<SectionDef>,
}

impl FormSchema {
    /// Total number of declared fields across all sections.
    pub fn field_count(&self) -> usize {
        self.sections.iter().map(|s| s.fields.len()).sum()
    }

    /// Look up a field by id anywhere in the schema.
    pub fn find_field(&self, field_id: &str) -> Option<FlattenedField<'_>> {
        crate::flatten::flatten(self).find(|f| f.field.id == field_id)
    }
}

/// A field annotated with its owning section — the projection used for
/// iteration and one-at-a-time presentation. Derived, never stored.
#[derive(Debug, Clone, Copy)]
pub struct FlattenedField<'a> {
    pub section_id: &'a str,
    pub section_title: &'a str,
    pub field: &'a FieldDef,
}
