//! intake-schema: declarative form schema model.
//!
//! A form schema is a versioned JSON document describing ordered sections
//! of typed fields, with per-field conditional visibility and validation
//! metadata. This crate holds the pure data model plus helper queries;
//! it carries no runtime state.
//!
//! # Public API
//!
//! Key types and entry points are re-exported at the crate root:
//!
//! - [`load_str()`] -- parse and structurally validate a schema document
//! - [`FormSchema`], [`SectionDef`], [`FieldDef`], [`FieldKind`],
//!   [`Condition`] -- the schema data model
//! - [`AnswerValue`], [`AnswerSet`] -- runtime answer representation
//! - [`flatten()`], [`visible_fields()`], [`default_answers()`] -- pure
//!   derivation queries over a schema
//! - [`validate()`] -- structural validation (unique ids, option rules,
//!   visibility-reference ordering)
//! - [`SchemaError`] -- load/validation error type

/// Schema document version accepted by this engine (e.g., "1.0").
pub const FORM_SCHEMA_VERSION: &str = "1.0";

pub mod deserialize;
pub mod error;
pub mod flatten;
pub mod types;
pub mod validate;

pub use deserialize::{load_str, parse_str, parse_value};
pub use error::SchemaError;
pub use flatten::{default_answers, flatten, is_visible, visible_fields};
pub use types::{
    AnswerSet, AnswerValue, Condition, FieldDef, FieldKind, FlattenedField, FormSchema, SectionDef,
};
pub use validate::validate;
