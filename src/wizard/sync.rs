//! Contract between the wizard and the server that stores drafts.

use std::fmt::Display;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::forms::steps::Step;
use crate::forms::wizard::{FormData, GeneralInfoForm, PassportInfoForm, TravelerInfoForm};

pub const GENERIC_FAILURE: &str = "An error occurred. Please try again.";

/// Server-issued identifier of the draft application the wizard is filling.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct ApplicationDraftId(String);

impl ApplicationDraftId {
    /// Returns `None` for blank values.
    pub fn new(value: impl Into<String>) -> Option<Self> {
        let value = value.into().trim().to_string();
        (!value.is_empty()).then_some(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for ApplicationDraftId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("Application ID not found. Please restart the form.")]
    MissingApplicationId,

    /// Non-2xx reply; `message` is what the server said, or the generic
    /// fallback when it said nothing usable.
    #[error("{message}")]
    Server { status: u16, message: String },

    #[error("network error: {0}")]
    Network(String),

    #[error("unexpected response: {0}")]
    Decode(String),

    #[error("could not read {file_name}: {reason}")]
    File { file_name: String, reason: String },
}

impl SyncError {
    /// Builds a server error from an HTTP status and the `message` field of
    /// the response body, if there was one.
    pub fn from_response(status: u16, message: Option<String>) -> Self {
        let message = message
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| GENERIC_FAILURE.to_string());
        SyncError::Server { status, message }
    }
}

/// Section data carried by a step save.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DraftPayload {
    General(GeneralInfoForm),
    Passport(PassportInfoForm),
    Traveler(TravelerInfoForm),
}

impl DraftPayload {
    pub fn step(&self) -> Step {
        match self {
            DraftPayload::General(_) => Step::General,
            DraftPayload::Passport(_) => Step::Passport,
            DraftPayload::Traveler(_) => Step::Traveler,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DraftRequest {
    pub payload: DraftPayload,
    /// Known draft, if step 1 already succeeded.
    pub application_id: Option<ApplicationDraftId>,
    /// Reused for every retry of the same step until one succeeds.
    pub idempotency_key: Uuid,
    pub visa_type_id: Option<String>,
    pub token: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DraftReceipt {
    pub application_id: ApplicationDraftId,
    pub application_number: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubmitRequest {
    pub application_id: Option<ApplicationDraftId>,
    pub form: FormData,
    pub idempotency_key: Uuid,
    pub token: Option<String>,
}

/// An attachment that could not be sent after the application was created.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FailedUpload {
    pub file_name: String,
    pub reason: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubmitReceipt {
    pub application_id: ApplicationDraftId,
    pub application_number: String,
    /// The application is submitted even when this is not empty.
    pub failed_uploads: Vec<FailedUpload>,
}

/// Remote side of the wizard. Calls block until the server answers.
pub trait DraftSync {
    fn save_draft(&self, request: &DraftRequest) -> Result<DraftReceipt, SyncError>;
    fn submit(&self, request: &SubmitRequest) -> Result<SubmitReceipt, SyncError>;
}

impl<T: DraftSync + ?Sized> DraftSync for &T {
    fn save_draft(&self, request: &DraftRequest) -> Result<DraftReceipt, SyncError> {
        (**self).save_draft(request)
    }

    fn submit(&self, request: &SubmitRequest) -> Result<SubmitReceipt, SyncError> {
        (**self).submit(request)
    }
}

#[cfg(feature = "test-mocks")]
pub mod mock {
    //! Mock remote for isolating the wizard in tests.

    use mockall::mock;

    use super::{DraftReceipt, DraftRequest, DraftSync, SubmitReceipt, SubmitRequest, SyncError};

    mock! {
        pub Remote {}

        impl DraftSync for Remote {
            fn save_draft(&self, request: &DraftRequest) -> Result<DraftReceipt, SyncError>;
            fn submit(&self, request: &SubmitRequest) -> Result<SubmitReceipt, SyncError>;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_error_falls_back_to_generic_message() {
        let err = SyncError::from_response(500, None);
        assert_eq!(err.to_string(), GENERIC_FAILURE);

        let err = SyncError::from_response(400, Some("Missing required data".into()));
        assert_eq!(err.to_string(), "Missing required data");
    }

    #[test]
    fn blank_draft_id_is_rejected() {
        assert_eq!(ApplicationDraftId::new("  "), None);
        assert_eq!(
            ApplicationDraftId::new(" abc ").map(|id| id.to_string()),
            Some("abc".to_string())
        );
    }
}
