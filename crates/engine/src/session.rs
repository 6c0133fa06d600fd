//! Form session: the state machine driving one user's pass through a form.
//!
//! A session owns the mutable answer set and the step cursor, derives
//! the visible-field list fresh after every mutation, and persists a
//! draft snapshot after every change so an interrupted session resumes
//! where it left off.
//!
//! Key invariant: the cursor always indexes into the *currently visible*
//! field list. Any mutation that can change visibility re-derives the
//! list and clamps the cursor into `[0, max(0, N-1)]`.
//!
//! State machine:
//!
//! ```text
//! Editing(cursor) --advance, not last--> Editing(cursor+1)
//! Editing(cursor) --advance, invalid---> Editing(cursor)        [error surfaced]
//! Editing(last)   --advance, all valid-> Submitting
//! Editing(last)   --advance, any invalid-> Editing(first bad)   [all errors surfaced]
//! Submitting      --collaborator ok----> Submitted              [draft deleted]
//! Submitting      --unauthorized/gone--> Failed                 [terminal]
//! Submitting      --other rejection----> Editing(cursor)        [retryable, error kept]
//! ```

use std::collections::BTreeMap;

use intake_schema::{
    default_answers, visible_fields, AnswerSet, AnswerValue, FlattenedField, FormSchema,
};
use intake_storage::{Draft, DraftStore};

use crate::submit::{answers_from_json, answers_to_json, SubmitError, SubmitReceipt, Submitter};
use crate::validate::{validate_all, validate_field, ValidationError};

// ──────────────────────────────────────────────
// State and transition results
// ──────────────────────────────────────────────

/// The per-session state. `Submitted` and `Failed` are terminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// The user is editing; `cursor` indexes the visible-field list.
    Editing { cursor: usize },
    /// Whole-set validation passed; awaiting the collaborator's answer.
    /// `resume_cursor` is restored if the submission is rejected but
    /// retryable.
    Submitting { resume_cursor: usize },
    Submitted { record_id: String },
    Failed { error: SubmitError },
}

/// Outcome of a [`FormSession::advance`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Advance {
    /// Cursor moved to the next visible field.
    Moved { cursor: usize },
    /// Validation failed; the cursor sits at the (first) failing field.
    Blocked { errors: Vec<ValidationError> },
    /// Every visible field validated; the session is now `Submitting`.
    ReadyToSubmit,
    /// The session was not in an editable state; nothing changed.
    Ignored,
}

/// Outcome of a [`FormSession::begin_submit`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BeginSubmit {
    /// The session is now `Submitting`.
    Ready,
    /// Whole-set validation failed; cursor moved to the first failing
    /// field, all errors surfaced.
    Invalid { errors: Vec<ValidationError> },
    /// The session is submitted, failed, or already submitting.
    NotEditable,
}

// ──────────────────────────────────────────────
// Session
// ──────────────────────────────────────────────

/// One active pass through a form: answers, cursor, errors, draft
/// persistence. Exclusively owned; there is no concurrent mutator.
pub struct FormSession<'a, D: DraftStore> {
    schema: &'a FormSchema,
    token: String,
    answers: AnswerSet,
    state: SessionState,
    /// Inline errors keyed by field id; cleared as fields are corrected.
    errors: BTreeMap<String, String>,
    /// Last retryable submission rejection, for banner display.
    submit_error: Option<SubmitError>,
    drafts: D,
    draft_key: String,
}

impl<'a, D: DraftStore> FormSession<'a, D> {
    /// Start a session: seed defaults, merge a stored draft if one
    /// exists, clamp the restored cursor to the current visible count.
    ///
    /// Malformed or unreadable drafts are silently ignored — a fresh
    /// session is never a fatal outcome.
    pub fn start(schema: &'a FormSchema, token: &str, drafts: D) -> Self {
        let draft_key = Draft::session_key(&schema.id, token);
        let mut answers = default_answers(schema);
        let mut cursor = 0;

        if let Ok(Some(text)) = drafts.load(&draft_key) {
            if let Ok(draft) = Draft::from_json(&draft_key, &text) {
                answers = answers_from_json(schema, &draft.answers);
                cursor = draft.cursor;
            }
        }

        let n = visible_fields(schema, &answers).len();
        let cursor = cursor.min(n.saturating_sub(1));

        FormSession {
            schema,
            token: token.to_string(),
            answers,
            state: SessionState::Editing { cursor },
            errors: BTreeMap::new(),
            submit_error: None,
            drafts,
            draft_key,
        }
    }

    // ── Read access ─────────────────────────────────────────────────

    pub fn schema(&self) -> &'a FormSchema {
        self.schema
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn answers(&self) -> &AnswerSet {
        &self.answers
    }

    /// The currently-visible fields, derived fresh.
    pub fn visible(&self) -> Vec<FlattenedField<'a>> {
        visible_fields(self.schema, &self.answers)
    }

    /// The field under the cursor, when editing.
    pub fn current_field(&self) -> Option<FlattenedField<'a>> {
        match self.state {
            SessionState::Editing { cursor } => self.visible().into_iter().nth(cursor),
            _ => None,
        }
    }

    pub fn error_for(&self, field_id: &str) -> Option<&str> {
        self.errors.get(field_id).map(String::as_str)
    }

    pub fn errors(&self) -> &BTreeMap<String, String> {
        &self.errors
    }

    /// The last retryable submission rejection, if any.
    pub fn submit_error(&self) -> Option<&SubmitError> {
        self.submit_error.as_ref()
    }

    // ── Mutation ────────────────────────────────────────────────────

    /// Record an answer. Clears the field's inline error, re-derives
    /// visibility, clamps the cursor, and persists the draft.
    ///
    /// Ignored outside the editing state (the UI disables mutation while
    /// a submission is in flight) and for field ids the schema does not
    /// declare.
    pub fn set_answer(&mut self, field_id: &str, value: AnswerValue) {
        if !matches!(self.state, SessionState::Editing { .. }) {
            return;
        }
        if self.schema.find_field(field_id).is_none() {
            return;
        }

        self.answers.insert(field_id.to_owned(), value);
        self.errors.remove(field_id);

        let n = self.visible().len();
        if let SessionState::Editing { cursor } = &mut self.state {
            *cursor = (*cursor).min(n.saturating_sub(1));
        }
        self.persist_draft();
    }

    /// Validate the field at the cursor and move forward.
    ///
    /// At the last visible field this runs whole-set validation — an
    /// earlier answer may have changed visibility, or earlier fields may
    /// never have been individually validated — and transitions to
    /// `Submitting` only if everything passes.
    pub fn advance(&mut self) -> Advance {
        let cursor = match self.state {
            SessionState::Editing { cursor } => cursor,
            SessionState::Submitting { .. } => return Advance::ReadyToSubmit,
            _ => return Advance::Ignored,
        };

        let visible = self.visible();
        let n = visible.len();
        if n == 0 {
            // No visible fields: the set is vacuously valid.
            self.state = SessionState::Submitting { resume_cursor: 0 };
            return Advance::ReadyToSubmit;
        }

        let cursor = cursor.min(n - 1);
        let field = visible[cursor].field;
        if let Err(err) = validate_field(field, self.answers.get(&field.id)) {
            self.errors.insert(err.field_id.clone(), err.message.clone());
            return Advance::Blocked { errors: vec![err] };
        }
        self.errors.remove(&field.id);

        if cursor + 1 < n {
            self.state = SessionState::Editing { cursor: cursor + 1 };
            self.persist_draft();
            return Advance::Moved { cursor: cursor + 1 };
        }

        match self.begin_submit() {
            BeginSubmit::Ready => Advance::ReadyToSubmit,
            BeginSubmit::Invalid { errors } => Advance::Blocked { errors },
            BeginSubmit::NotEditable => Advance::Ignored,
        }
    }

    /// Step back one field. No validation; no-op at the first field or
    /// outside editing.
    pub fn retreat(&mut self) {
        if let SessionState::Editing { cursor } = self.state {
            if cursor > 0 {
                self.state = SessionState::Editing { cursor: cursor - 1 };
                self.persist_draft();
            }
        }
    }

    /// Run whole-set validation and, if clean, enter `Submitting`.
    ///
    /// This is the standard-mode submit path; flash mode reaches it
    /// through [`advance`](Self::advance) on the last field.
    pub fn begin_submit(&mut self) -> BeginSubmit {
        let cursor = match self.state {
            SessionState::Editing { cursor } => cursor,
            SessionState::Submitting { .. } => return BeginSubmit::Ready,
            _ => return BeginSubmit::NotEditable,
        };

        let visible = self.visible();
        let errors = validate_all(&visible, &self.answers);
        if errors.is_empty() {
            let resume_cursor = cursor.min(visible.len().saturating_sub(1));
            self.state = SessionState::Submitting { resume_cursor };
            return BeginSubmit::Ready;
        }

        for e in &errors {
            self.errors.insert(e.field_id.clone(), e.message.clone());
        }
        let first = visible
            .iter()
            .position(|f| f.field.id == errors[0].field_id)
            .unwrap_or(0);
        self.state = SessionState::Editing { cursor: first };
        self.persist_draft();
        BeginSubmit::Invalid { errors }
    }

    /// Hand the answer set to the collaborator. Requires `Submitting`.
    ///
    /// Success deletes the draft and ends the session. A terminal
    /// rejection (`Unauthorized`, `Gone`) ends it in `Failed`; any other
    /// rejection reverts to `Editing` with answers, cursor, and the
    /// error preserved so the user can retry without re-entering data.
    pub async fn submit<S: Submitter + ?Sized>(
        &mut self,
        submitter: &S,
    ) -> Result<SubmitReceipt, SubmitError> {
        let resume_cursor = match self.state {
            SessionState::Submitting { resume_cursor } => resume_cursor,
            _ => {
                return Err(SubmitError::Internal {
                    message: "submit attempted outside the submitting state".to_string(),
                })
            }
        };

        match submitter
            .submit(&self.schema.id, &self.token, &self.answers)
            .await
        {
            Ok(receipt) => {
                self.state = SessionState::Submitted {
                    record_id: receipt.record_id.clone(),
                };
                self.submit_error = None;
                let _ = self.drafts.delete(&self.draft_key);
                Ok(receipt)
            }
            Err(err) => {
                if err.is_terminal() {
                    self.state = SessionState::Failed { error: err.clone() };
                } else {
                    let n = self.visible().len();
                    self.state = SessionState::Editing {
                        cursor: resume_cursor.min(n.saturating_sub(1)),
                    };
                    self.submit_error = Some(err.clone());
                }
                Err(err)
            }
        }
    }

    // ── Draft persistence ───────────────────────────────────────────

    /// Snapshot `{answers, cursor}` to the draft store. Best-effort:
    /// store failures never interrupt editing.
    fn persist_draft(&mut self) {
        let cursor = match self.state {
            SessionState::Editing { cursor } => cursor,
            SessionState::Submitting { resume_cursor } => resume_cursor,
            _ => 0,
        };
        let draft = Draft {
            answers: answers_to_json(&self.answers),
            cursor,
        };
        if let Ok(text) = draft.to_json() {
            let _ = self.drafts.save(&self.draft_key, &text);
        }
    }
}

