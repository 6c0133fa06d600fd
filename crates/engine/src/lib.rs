//! intake-engine: form state controller and presentation adapters.
//!
//! Consumes a loaded [`intake_schema::FormSchema`] plus a mutable answer
//! set and drives one user's pass through the form: visible-field
//! derivation, step cursor, per-field and whole-set validation, draft
//! persistence, and the submission state machine.
//!
//! Two interchangeable presentation adapters sit on top of the same
//! session contract:
//!
//! - [`FlashAdapter`] -- one field at a time with a progress cursor
//! - [`StandardAdapter`] -- the whole schema at once
//!
//! Switching adapters mid-session preserves the answer set unchanged.

pub mod flash;
pub mod session;
pub mod standard;
pub mod submit;
pub mod validate;

pub use flash::{FlashAdapter, FlashView};
pub use session::{Advance, BeginSubmit, FormSession, SessionState};
pub use standard::{FieldView, SectionView, StandardAdapter, StandardView};
pub use submit::{
    answers_from_json, answers_to_json, StaticSubmitter, SubmitError, SubmitReceipt, Submitter,
};
pub use validate::{validate_all, validate_field, ValidationError};
