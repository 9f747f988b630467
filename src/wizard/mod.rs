//! Step navigation for the visa application wizard.
//!
//! [`Wizard`] owns the form, the step cursor, the completed-step set and the
//! current error map. Every mutation schedules a debounced save through
//! [`persistence::DraftPersistence`]; forward moves out of steps 1 to 3 are
//! additionally gated on the remote [`sync::DraftSync`] accepting the step.

use std::collections::BTreeMap;
use std::time::Duration;

use thiserror::Error;
use uuid::Uuid;

use crate::domain::attachment::AttachmentKind;
use crate::forms::fields::validate_attachment;
use crate::forms::steps::{CompletedSteps, Step, validate_step};
use crate::forms::wizard::{CountryCode, FileRef, FormData};
use crate::forms::{ErrorMap, Field, FormError};
use crate::i18n::{Locale, translate};
use crate::wizard::clock::Clock;
use crate::wizard::persistence::DraftPersistence;
use crate::wizard::store::KeyValueStore;
use crate::wizard::sync::{
    ApplicationDraftId, DraftPayload, DraftRequest, DraftSync, SubmitReceipt, SubmitRequest,
    SyncError,
};

pub mod clock;
pub mod debounce;
#[cfg(feature = "client")]
pub mod http;
pub mod persistence;
pub mod store;
pub mod sync;

#[derive(Debug, Error)]
pub enum NavigationError {
    /// The current step has invalid fields; see the map for which.
    #[error("step has invalid fields")]
    Validation(ErrorMap),

    #[error(transparent)]
    Sync(#[from] SyncError),

    #[error("step {0} has not been reached yet")]
    Unreachable(Step),

    #[error("applications can only be submitted from the review step")]
    NotOnReview,

    #[error("the application has already been submitted")]
    AlreadySubmitted,

    #[error(transparent)]
    Form(#[from] FormError),
}

impl NavigationError {
    /// Text to show in a blocking alert. Field errors are shown inline and
    /// have no alert.
    pub fn alert(&self, locale: Locale) -> Option<String> {
        match self {
            NavigationError::Validation(_) | NavigationError::Form(_) => None,
            NavigationError::Sync(SyncError::MissingApplicationId) => {
                Some(translate("alert.application_id_missing", locale).to_string())
            }
            NavigationError::Sync(SyncError::Server { message, .. }) => Some(message.clone()),
            NavigationError::Sync(_) => Some(translate("alert.generic_error", locale).to_string()),
            NavigationError::Unreachable(_) => {
                Some(translate("alert.step_unreachable", locale).to_string())
            }
            NavigationError::NotOnReview => {
                Some(translate("alert.review_required", locale).to_string())
            }
            NavigationError::AlreadySubmitted => {
                Some(translate("alert.already_submitted", locale).to_string())
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Editing,
    Submitted,
}

pub struct Wizard<S, D, C> {
    form: FormData,
    step: Step,
    completed: CompletedSteps,
    errors: ErrorMap,
    phase: Phase,
    step_keys: BTreeMap<Step, Uuid>,
    submit_key: Option<Uuid>,
    persistence: DraftPersistence<S>,
    sync: D,
    clock: C,
}

impl<S, D, C> Wizard<S, D, C>
where
    S: KeyValueStore,
    D: DraftSync,
    C: Clock,
{
    /// Creates a wizard, restoring any draft saved in `store` before
    /// returning.
    pub fn mount(store: S, sync: D, clock: C) -> Self {
        let persistence = DraftPersistence::new(store);
        let restored = persistence.restore();
        log::debug!(
            "Restored draft with {} completed step(s)",
            restored.completed.len()
        );
        Self {
            form: restored.form,
            step: Step::FIRST,
            completed: restored.completed,
            errors: ErrorMap::new(),
            phase: Phase::Editing,
            step_keys: BTreeMap::new(),
            submit_key: None,
            persistence,
            sync,
            clock,
        }
    }

    pub fn set_debounce_window(&mut self, window: Duration) {
        self.persistence.set_window(window);
    }

    pub fn form(&self) -> &FormData {
        &self.form
    }

    pub fn step(&self) -> Step {
        self.step
    }

    pub fn completed_steps(&self) -> &CompletedSteps {
        &self.completed
    }

    pub fn errors(&self) -> &ErrorMap {
        &self.errors
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn application_id(&self) -> Option<ApplicationDraftId> {
        self.persistence.application_id()
    }

    pub fn persistence(&self) -> &DraftPersistence<S> {
        &self.persistence
    }

    pub fn sync(&self) -> &D {
        &self.sync
    }

    /// Steps up to the cursor can be revisited.
    pub fn is_accessible(&self, step: Step) -> bool {
        step <= self.step
    }

    fn ensure_editing(&self) -> Result<(), NavigationError> {
        match self.phase {
            Phase::Editing => Ok(()),
            Phase::Submitted => Err(NavigationError::AlreadySubmitted),
        }
    }

    fn schedule_save(&mut self) {
        let now = self.clock.now();
        self.persistence.schedule(now, &self.form, &self.completed);
    }

    /// Runs the debounce timer; call periodically from the host loop.
    pub fn tick(&mut self) -> bool {
        let now = self.clock.now();
        self.persistence.tick(now)
    }

    pub fn set_field(&mut self, field: Field, value: impl Into<String>) -> Result<(), NavigationError> {
        self.ensure_editing()?;
        self.form.set_text(field, value)?;
        self.errors.clear_field(field);
        self.schedule_save();
        Ok(())
    }

    pub fn select_country(&mut self, country: CountryCode) -> Result<(), NavigationError> {
        self.ensure_editing()?;
        self.form.country_code = Some(country);
        self.errors.clear_field(Field::CountryCode);
        self.errors.clear_field(Field::Phone);
        self.schedule_save();
        Ok(())
    }

    /// Sets the passport photo. A file over the size limit or of the wrong
    /// type is refused and reported on the photo field.
    pub fn attach_photo(&mut self, photo: FileRef) -> Result<(), NavigationError> {
        self.ensure_editing()?;
        if let Some(key) = validate_attachment(AttachmentKind::Photo, &photo.mime_type, photo.size_bytes)
        {
            self.errors.insert(Field::Photo, key);
            return Err(NavigationError::Validation(
                [(Field::Photo, key)].into_iter().collect(),
            ));
        }
        self.form.photo = Some(photo);
        self.errors.clear_field(Field::Photo);
        self.schedule_save();
        Ok(())
    }

    /// Appends documents. Nothing is added when any of them is refused.
    pub fn add_documents(&mut self, files: Vec<FileRef>) -> Result<(), NavigationError> {
        self.ensure_editing()?;
        let refused = files.iter().find_map(|file| {
            validate_attachment(AttachmentKind::Document, &file.mime_type, file.size_bytes)
        });
        if let Some(key) = refused {
            self.errors.insert(Field::Documents, key);
            return Err(NavigationError::Validation(
                [(Field::Documents, key)].into_iter().collect(),
            ));
        }
        self.form.documents.extend(files);
        self.errors.clear_field(Field::Documents);
        self.schedule_save();
        Ok(())
    }

    pub fn remove_document(&mut self, index: usize) -> Result<Option<FileRef>, NavigationError> {
        self.ensure_editing()?;
        if index >= self.form.documents.len() {
            return Ok(None);
        }
        let removed = self.form.documents.remove(index);
        self.errors.clear_field(Field::Documents);
        self.schedule_save();
        Ok(Some(removed))
    }

    /// Validates the current step and moves forward. Steps 1 to 3 must also
    /// be accepted by the server; on any failure the cursor stays put.
    pub fn next(&mut self) -> Result<Step, NavigationError> {
        self.ensure_editing()?;
        let current = self.step;

        self.errors = validate_step(current, &self.form, self.clock.today());
        if !self.errors.is_empty() {
            return Err(NavigationError::Validation(self.errors.clone()));
        }

        if current.is_synced() {
            self.save_step_draft(current)?;
        }

        self.completed.insert(current);
        self.step = current.next();
        self.schedule_save();
        Ok(self.step)
    }

    fn save_step_draft(&mut self, step: Step) -> Result<(), NavigationError> {
        let application_id = self.persistence.application_id();
        if step != Step::General && application_id.is_none() {
            log::error!("No application id stored before saving step {step}");
            return Err(SyncError::MissingApplicationId.into());
        }

        let payload = match step {
            Step::General => DraftPayload::General(self.form.general.clone()),
            Step::Passport => DraftPayload::Passport(self.form.passport.clone()),
            _ => DraftPayload::Traveler(self.form.traveler.clone()),
        };
        let request = DraftRequest {
            payload,
            application_id,
            idempotency_key: *self.step_keys.entry(step).or_insert_with(Uuid::new_v4),
            visa_type_id: Some(self.form.visa_type_id.clone()).filter(|v| !v.is_empty()),
            token: self.persistence.token(),
        };

        match self.sync.save_draft(&request) {
            Ok(receipt) => {
                self.step_keys.remove(&step);
                if step == Step::General {
                    self.persistence.set_application_id(&receipt.application_id);
                }
                log::info!(
                    "Saved step {step} of application {}",
                    receipt.application_number
                );
                Ok(())
            }
            Err(e) => {
                log::error!("Failed to save draft for step {step}: {e}");
                Err(e.into())
            }
        }
    }

    /// Unconditionally steps back, stopping at the first step.
    pub fn previous(&mut self) -> Result<Step, NavigationError> {
        self.ensure_editing()?;
        self.step = self.step.previous();
        Ok(self.step)
    }

    /// Moves the cursor back to an already reached step.
    pub fn jump_to(&mut self, step: Step) -> Result<Step, NavigationError> {
        self.ensure_editing()?;
        if !self.is_accessible(step) {
            return Err(NavigationError::Unreachable(step));
        }
        self.step = step;
        Ok(self.step)
    }

    /// Sends the whole application. On success the saved draft is erased and
    /// the wizard is left in the submitted phase.
    pub fn submit(&mut self) -> Result<SubmitReceipt, NavigationError> {
        self.ensure_editing()?;
        if self.step != Step::Review {
            return Err(NavigationError::NotOnReview);
        }

        self.errors = validate_step(self.step, &self.form, self.clock.today());
        if !self.errors.is_empty() {
            return Err(NavigationError::Validation(self.errors.clone()));
        }

        let request = SubmitRequest {
            application_id: self.persistence.application_id(),
            form: self.form.clone(),
            idempotency_key: *self.submit_key.get_or_insert_with(Uuid::new_v4),
            token: self.persistence.token(),
        };

        match self.sync.submit(&request) {
            Ok(receipt) => {
                log::info!("Submitted application {}", receipt.application_number);
                for failed in &receipt.failed_uploads {
                    log::warn!(
                        "{} was not attached to {}: {}",
                        failed.file_name,
                        receipt.application_number,
                        failed.reason
                    );
                }
                self.clear();
                self.phase = Phase::Submitted;
                Ok(receipt)
            }
            Err(e) => {
                log::error!("Failed to submit application: {e}");
                Err(e.into())
            }
        }
    }

    /// Discards the draft, both in memory and in storage, and starts over.
    pub fn reset(&mut self) {
        self.clear();
        self.phase = Phase::Editing;
    }

    fn clear(&mut self) {
        self.persistence.clear_saved_data();
        self.form = FormData::default();
        self.step = Step::FIRST;
        self.completed.clear();
        self.errors = ErrorMap::new();
        self.step_keys.clear();
        self.submit_key = None;
    }
}
