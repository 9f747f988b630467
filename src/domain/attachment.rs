//! Uploaded photo and supporting documents attached to an application.

use std::fmt::Display;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::types::{ApplicationId, AttachmentId, NonEmptyString, TypeConstraintError};

/// Largest accepted passport photo, in bytes.
pub const MAX_PHOTO_BYTES: u64 = 5 * 1024 * 1024;
/// Largest accepted supporting document, in bytes.
pub const MAX_DOCUMENT_BYTES: u64 = 10 * 1024 * 1024;

const PHOTO_MIME_TYPES: [&str; 3] = ["image/jpeg", "image/jpg", "image/png"];
const DOCUMENT_MIME_TYPES: [&str; 4] = ["image/jpeg", "image/jpg", "image/png", "application/pdf"];

/// What an uploaded file is used for.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum AttachmentKind {
    Photo,
    Document,
}

impl AttachmentKind {
    pub fn as_str(self) -> &'static str {
        match self {
            AttachmentKind::Photo => "photo",
            AttachmentKind::Document => "document",
        }
    }

    pub fn max_bytes(self) -> u64 {
        match self {
            AttachmentKind::Photo => MAX_PHOTO_BYTES,
            AttachmentKind::Document => MAX_DOCUMENT_BYTES,
        }
    }

    pub fn accepts_mime(self, mime_type: &str) -> bool {
        let mime_type = mime_type.trim().to_ascii_lowercase();
        match self {
            AttachmentKind::Photo => PHOTO_MIME_TYPES.contains(&mime_type.as_str()),
            AttachmentKind::Document => DOCUMENT_MIME_TYPES.contains(&mime_type.as_str()),
        }
    }
}

impl Display for AttachmentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AttachmentKind {
    type Err = TypeConstraintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "photo" => Ok(AttachmentKind::Photo),
            "document" => Ok(AttachmentKind::Document),
            other => Err(TypeConstraintError::InvalidValue(format!(
                "unknown attachment kind: {other}"
            ))),
        }
    }
}

/// Rounds a byte count up to whole kilobytes.
pub fn size_in_kb(bytes: u64) -> i64 {
    i64::try_from(bytes.div_ceil(1024)).unwrap_or(i64::MAX)
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub id: AttachmentId,
    pub application_id: ApplicationId,
    pub kind: AttachmentKind,
    pub file_name: String,
    pub file_path: String,
    pub mime_type: String,
    pub size_kb: i64,
    pub uploaded_at: NaiveDateTime,
}

#[derive(Clone, Debug)]
pub struct NewAttachment {
    pub application_id: ApplicationId,
    pub kind: AttachmentKind,
    pub file_name: NonEmptyString,
    pub file_path: String,
    pub mime_type: String,
    pub size_kb: i64,
}

impl NewAttachment {
    /// Builds the record for a stored upload, placing it under
    /// `/uploads/{application_id}/{file_name}`.
    pub fn stored(
        application_id: ApplicationId,
        kind: AttachmentKind,
        file_name: NonEmptyString,
        mime_type: impl Into<String>,
        size_bytes: u64,
    ) -> Self {
        let file_path = format!("/uploads/{}/{}", application_id, file_name.as_str());
        Self {
            application_id,
            kind,
            file_name,
            file_path,
            mime_type: mime_type.into(),
            size_kb: size_in_kb(size_bytes),
        }
    }
}
