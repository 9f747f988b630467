//! Replay protection for draft saves and submissions.

use std::fmt::Display;
use std::str::FromStr;

use uuid::Uuid;

use crate::domain::types::{ApplicationId, TypeConstraintError, UserId};

/// Endpoint an idempotency key was first used with. A key is only valid for
/// the operation it was issued for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum IdempotentOperation {
    GeneralDraft,
    PassportDraft,
    TravelerDraft,
    Submit,
}

impl IdempotentOperation {
    pub fn as_str(self) -> &'static str {
        match self {
            IdempotentOperation::GeneralDraft => "general-draft",
            IdempotentOperation::PassportDraft => "passport-draft",
            IdempotentOperation::TravelerDraft => "traveler-draft",
            IdempotentOperation::Submit => "submit",
        }
    }
}

impl Display for IdempotentOperation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IdempotentOperation {
    type Err = TypeConstraintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "general-draft" => Ok(IdempotentOperation::GeneralDraft),
            "passport-draft" => Ok(IdempotentOperation::PassportDraft),
            "traveler-draft" => Ok(IdempotentOperation::TravelerDraft),
            "submit" => Ok(IdempotentOperation::Submit),
            other => Err(TypeConstraintError::InvalidValue(format!(
                "unknown operation: {other}"
            ))),
        }
    }
}

/// A key that has already been honoured, and the application it produced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IdempotencyRecord {
    pub key: Uuid,
    pub user_id: UserId,
    pub operation: IdempotentOperation,
    pub application_id: ApplicationId,
}

impl IdempotencyRecord {
    /// Whether a replay of `key` by `user_id` for `operation` matches this
    /// record.
    pub fn matches(&self, user_id: &UserId, operation: IdempotentOperation) -> bool {
        &self.user_id == user_id && self.operation == operation
    }
}
