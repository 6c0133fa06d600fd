//! Flash adapter: one field at a time with step-by-step navigation.
//!
//! Renders exactly the field under the cursor. Boolean fields get the
//! two-button shortcut: answering also advances, composed here from the
//! controller's two separate operations (`set_answer`, then `advance`)
//! rather than fused inside the controller.

use intake_schema::{AnswerValue, FlattenedField};
use intake_storage::DraftStore;

use crate::session::{Advance, FormSession, SessionState};
use crate::submit::{SubmitError, SubmitReceipt, Submitter};

/// What the flash presentation shows for one step.
#[derive(Debug)]
pub struct FlashView<'s> {
    /// The single field to render; `None` once the session has left the
    /// editing state.
    pub field: Option<FlattenedField<'s>>,
    /// Current value of that field.
    pub value: Option<&'s AnswerValue>,
    /// Inline error for that field, if its last validation failed.
    pub error: Option<&'s str>,
    /// 1-based step number.
    pub step: usize,
    /// Count of currently-visible fields.
    pub total: usize,
    /// `(cursor + 1) / N * 100`, rounded down; 100 once submitting.
    pub progress_pct: u8,
    /// Retryable submission rejection to show as a banner.
    pub submit_error: Option<&'s SubmitError>,
}

/// One-field-at-a-time presentation over a form session.
pub struct FlashAdapter<'a, D: DraftStore> {
    session: FormSession<'a, D>,
}

impl<'a, D: DraftStore> FlashAdapter<'a, D> {
    pub fn new(session: FormSession<'a, D>) -> Self {
        FlashAdapter { session }
    }

    /// Hand the session back, e.g. to switch presentation modes. The
    /// answer set is untouched by the switch.
    pub fn into_session(self) -> FormSession<'a, D> {
        self.session
    }

    pub fn session(&self) -> &FormSession<'a, D> {
        &self.session
    }

    pub fn view(&self) -> FlashView<'_> {
        let total = self.session.visible().len();
        match *self.session.state() {
            SessionState::Editing { cursor } => {
                let field = self.session.current_field();
                let value = field.and_then(|f| self.session.answers().get(&f.field.id));
                let error = field.and_then(|f| self.session.error_for(&f.field.id));
                FlashView {
                    field,
                    value,
                    error,
                    step: cursor + 1,
                    total,
                    progress_pct: progress(cursor, total),
                    submit_error: self.session.submit_error(),
                }
            }
            _ => FlashView {
                field: None,
                value: None,
                error: None,
                step: total,
                total,
                progress_pct: 100,
                submit_error: self.session.submit_error(),
            },
        }
    }

    /// Type into the current field without advancing.
    pub fn set_text(&mut self, text: impl Into<String>) {
        if let Some(flat) = self.session.current_field() {
            let id = flat.field.id.clone();
            self.session.set_answer(&id, AnswerValue::Text(text.into()));
        }
    }

    /// The Yes/No shortcut: record the boolean and immediately advance.
    /// Ignored when the current field is not boolean.
    pub fn answer_boolean(&mut self, value: bool) -> Advance {
        let Some(flat) = self.session.current_field() else {
            return Advance::Ignored;
        };
        if !flat.field.kind.is_boolean() {
            return Advance::Ignored;
        }
        let id = flat.field.id.clone();
        self.session.set_answer(&id, AnswerValue::Bool(value));
        self.session.advance()
    }

    /// The explicit Next/Submit action for non-boolean fields.
    pub fn next(&mut self) -> Advance {
        self.session.advance()
    }

    pub fn back(&mut self) {
        self.session.retreat();
    }

    /// Hand off to the collaborator once `next()`/`answer_boolean()`
    /// reported ready-to-submit.
    pub async fn submit<S: Submitter + ?Sized>(
        &mut self,
        submitter: &S,
    ) -> Result<SubmitReceipt, SubmitError> {
        self.session.submit(submitter).await
    }
}

fn progress(cursor: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    (((cursor + 1) * 100) / total) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_is_step_over_total() {
        assert_eq!(progress(0, 4), 25);
        assert_eq!(progress(3, 4), 100);
        assert_eq!(progress(0, 3), 33);
        assert_eq!(progress(0, 0), 100);
    }
}
