//! The form controller state machine.

use chrono::Utc;
use tracing::{debug, info};

use super::{apply_update, DraftForm, ErrorMap, Field, FieldValue, SubmittedForm, Validator};
use crate::error::Result;
use crate::notify::Notifier;
use crate::storage::{FormDataStore, KeyValueStore};

const MSG_SUBMITTED: &str = "Form submitted successfully!";
const MSG_FIX_ERRORS: &str = "Please fix the errors in the form";
const MSG_SUBMIT_FAILED: &str = "Failed to submit form. Please try again.";
const MSG_DRAFT_SAVED: &str = "Draft saved";
const MSG_DRAFT_SAVE_FAILED: &str = "Failed to save draft";
const MSG_DRAFT_LOADED: &str = "Draft loaded";
const MSG_NO_DRAFT: &str = "No saved draft found";
const MSG_DRAFT_AVAILABLE: &str = "You have a saved draft. Load it to continue.";

/// Where the controller is in a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormState {
    /// Accepting edits.
    Editing,
    /// Running a submit attempt.
    Submitting,
    /// A record was committed; only [`FormController::reset`] leaves this.
    Submitted,
}

/// Result of a submit attempt that reached a decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The draft passed validation and was committed.
    Submitted(SubmittedForm),
    /// The draft failed validation.
    Rejected(ErrorMap),
    /// The session already submitted; nothing was done.
    AlreadySubmitted,
}

/// Drives one editing session over a draft.
#[derive(Debug)]
pub struct FormController<S> {
    store: FormDataStore<S>,
    validator: Validator,
    notifier: Notifier,
    draft: DraftForm,
    errors: ErrorMap,
    state: FormState,
}

impl<S: KeyValueStore> FormController<S> {
    /// Start a session with an empty draft.
    pub fn new(store: FormDataStore<S>, validator: Validator, notifier: Notifier) -> Self {
        Self {
            store,
            validator,
            notifier,
            draft: DraftForm::default(),
            errors: ErrorMap::new(),
            state: FormState::Editing,
        }
    }

    /// The in-memory draft.
    pub fn draft(&self) -> &DraftForm {
        &self.draft
    }

    /// Errors from the last submit attempt still standing.
    pub fn errors(&self) -> &ErrorMap {
        &self.errors
    }

    /// Current state.
    pub fn state(&self) -> FormState {
        self.state
    }

    /// The notification handle.
    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    /// The form data store.
    pub fn store(&self) -> &FormDataStore<S> {
        &self.store
    }

    /// Set one field and clear its error entry.
    ///
    /// Edits are ignored once the session has submitted.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::InvalidFieldValue`] if `value` does not fit
    /// `field`; the draft is left unchanged.
    pub fn update(&mut self, field: Field, value: FieldValue) -> Result<()> {
        if self.state == FormState::Submitted {
            debug!(%field, "Ignoring edit after submit");
            return Ok(());
        }
        self.draft = apply_update(&self.draft, field, value)?;
        self.errors = self.errors.without(field);
        Ok(())
    }

    /// Add or remove one hobby and clear the hobbies error entry.
    pub fn toggle_hobby(&mut self, hobby: &str) {
        if self.state == FormState::Submitted {
            return;
        }
        self.draft.toggle_hobby(hobby);
        self.errors = self.errors.without(Field::Hobbies);
    }

    /// Validate the draft and commit it if valid.
    ///
    /// The draft is saved first so a rejected or failed attempt keeps the
    /// user's input in storage.
    ///
    /// # Errors
    ///
    /// Returns the storage error if the record could not be committed. The
    /// controller is back in [`FormState::Editing`] with the draft intact.
    pub async fn submit(&mut self) -> Result<SubmitOutcome> {
        if self.state == FormState::Submitted {
            return Ok(SubmitOutcome::AlreadySubmitted);
        }
        self.state = FormState::Submitting;

        let saved = self.store.save_draft(&self.draft).await.is_ok();
        let errors = self.validator.validate(&self.draft);

        if !errors.is_empty() {
            debug!(count = errors.len(), "Submit rejected");
            self.errors = errors.clone();
            self.state = FormState::Editing;
            if saved {
                self.notifier.error(MSG_FIX_ERRORS);
            } else {
                self.notifier
                    .error(format!("{MSG_FIX_ERRORS}. {MSG_DRAFT_SAVE_FAILED}."));
            }
            return Ok(SubmitOutcome::Rejected(errors));
        }

        let record = SubmittedForm::from_draft(&self.draft, Utc::now());
        if let Err(e) = self.store.commit_submission(&record).await {
            self.state = FormState::Editing;
            self.notifier.error(MSG_SUBMIT_FAILED);
            return Err(e);
        }

        self.draft = DraftForm::default();
        self.errors = ErrorMap::new();
        self.state = FormState::Submitted;
        self.notifier.success(MSG_SUBMITTED);
        info!(submitted_at = %record.submitted_at, "Form submitted");
        Ok(SubmitOutcome::Submitted(record))
    }

    /// Persist the in-memory draft.
    ///
    /// # Errors
    ///
    /// Returns the storage error after showing a failure toast.
    pub async fn save_draft(&self) -> Result<()> {
        match self.store.save_draft(&self.draft).await {
            Ok(()) => {
                self.notifier.success(MSG_DRAFT_SAVED);
                Ok(())
            }
            Err(e) => {
                self.notifier.error(MSG_DRAFT_SAVE_FAILED);
                Err(e)
            }
        }
    }

    /// Replace the in-memory draft with the saved one, if any.
    ///
    /// Returns whether a draft was loaded.
    pub async fn load_draft(&mut self) -> bool {
        match self.store.get_draft().await {
            Some(draft) => {
                self.draft = draft;
                self.errors = ErrorMap::new();
                self.state = FormState::Editing;
                self.notifier.info(MSG_DRAFT_LOADED);
                true
            }
            None => {
                self.notifier.info(MSG_NO_DRAFT);
                false
            }
        }
    }

    /// Notify if a saved draft exists, without loading it.
    pub async fn check_saved_draft(&self) -> bool {
        let exists = self.store.get_draft().await.is_some();
        if exists {
            self.notifier.info(MSG_DRAFT_AVAILABLE);
        }
        exists
    }

    /// Start over with an empty draft. Storage is untouched.
    pub fn reset(&mut self) {
        self.draft = DraftForm::default();
        self.errors = ErrorMap::new();
        self.state = FormState::Editing;
    }
}
