use serde::{Deserialize, Serialize};

/// A schema load or structural-validation error.
///
/// Carries the section/field the error was found in, when known, so
/// tooling can point at the offending declaration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SchemaError {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub section_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_id: Option<String>,
    pub message: String,
}

impl SchemaError {
    /// An error about the document as a whole.
    pub fn form(message: impl Into<String>) -> Self {
        SchemaError {
            section_id: None,
            field_id: None,
            message: message.into(),
        }
    }

    /// An error located at a section.
    pub fn section(section_id: &str, message: impl Into<String>) -> Self {
        SchemaError {
            section_id: Some(section_id.to_owned()),
            field_id: None,
            message: message.into(),
        }
    }

    /// An error located at a field within a section.
    pub fn field(section_id: &str, field_id: &str, message: impl Into<String>) -> Self {
        SchemaError {
            section_id: Some(section_id.to_owned()),
            field_id: Some(field_id.to_owned()),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for SchemaError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (&self.section_id, &self.field_id) {
            (Some(s), Some(fl)) => write!(f, "section '{}', field '{}': {}", s, fl, self.message),
            (Some(s), None) => write!(f, "section '{}': {}", s, self.message),
            _ => write!(f, "{}", self.message),
        }
    }
}

impl std::error::Error for SchemaError {}
