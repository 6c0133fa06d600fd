//! Standard adapter: the whole schema at once.
//!
//! Renders every section with its currently-visible fields; a single
//! submit action runs whole-set validation and, if clean, the handoff.
//! Routes through the identical session contract as the flash adapter —
//! the two differ only in how much of the visible-field list they
//! expose at a time.

use intake_schema::{AnswerValue, FieldDef, FormSchema};
use intake_storage::DraftStore;

use crate::session::{BeginSubmit, FormSession};
use crate::submit::{SubmitError, SubmitReceipt, Submitter};

/// One renderable field: its declaration, current value, inline error.
#[derive(Debug)]
pub struct FieldView<'s> {
    pub field: &'s FieldDef,
    pub value: Option<&'s AnswerValue>,
    pub error: Option<&'s str>,
}

/// A section with only its currently-visible fields.
#[derive(Debug)]
pub struct SectionView<'s> {
    pub id: &'s str,
    pub title: &'s str,
    pub fields: Vec<FieldView<'s>>,
}

/// What the standard presentation shows: every section at once.
#[derive(Debug)]
pub struct StandardView<'s> {
    pub form_title: &'s str,
    pub sections: Vec<SectionView<'s>>,
    /// Retryable submission rejection to show as a banner.
    pub submit_error: Option<&'s SubmitError>,
}

/// Whole-schema-at-once presentation over a form session.
pub struct StandardAdapter<'a, D: DraftStore> {
    session: FormSession<'a, D>,
}

impl<'a, D: DraftStore> StandardAdapter<'a, D> {
    pub fn new(session: FormSession<'a, D>) -> Self {
        StandardAdapter { session }
    }

    /// Hand the session back, e.g. to switch presentation modes. The
    /// answer set is untouched by the switch.
    pub fn into_session(self) -> FormSession<'a, D> {
        self.session
    }

    pub fn session(&self) -> &FormSession<'a, D> {
        &self.session
    }

    pub fn view(&self) -> StandardView<'_> {
        let schema: &FormSchema = self.session.schema();
        let answers = self.session.answers();
        let sections = schema
            .sections
            .iter()
            .map(|section| SectionView {
                id: &section.id,
                title: &section.title,
                fields: section
                    .fields
                    .iter()
                    .filter(|f| intake_schema::is_visible(f, answers))
                    .map(|f| FieldView {
                        field: f,
                        value: answers.get(&f.id),
                        error: self.session.error_for(&f.id),
                    })
                    .collect(),
            })
            .collect();
        StandardView {
            form_title: &schema.title,
            sections,
            submit_error: self.session.submit_error(),
        }
    }

    pub fn set_answer(&mut self, field_id: &str, value: AnswerValue) {
        self.session.set_answer(field_id, value);
    }

    /// The single submit action: whole-set validation, then handoff.
    ///
    /// Local validation failures are reported as `BadInput` without
    /// contacting the collaborator; the errors are also surfaced inline
    /// per field in the next [`view`](Self::view).
    pub async fn submit<S: Submitter + ?Sized>(
        &mut self,
        submitter: &S,
    ) -> Result<SubmitReceipt, SubmitError> {
        match self.session.begin_submit() {
            BeginSubmit::Ready => self.session.submit(submitter).await,
            BeginSubmit::Invalid { errors } => Err(SubmitError::BadInput {
                message: "please correct the highlighted fields".to_string(),
                errors,
            }),
            BeginSubmit::NotEditable => Err(SubmitError::Internal {
                message: "session is no longer editable".to_string(),
            }),
        }
    }
}
