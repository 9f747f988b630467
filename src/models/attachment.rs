//! Diesel models for uploaded file metadata.

use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::attachment::{
    Attachment as DomainAttachment, NewAttachment as DomainNewAttachment,
};
use crate::domain::types::{ApplicationId, AttachmentId, TypeConstraintError};
use crate::models::application::VisaApplication;

#[derive(Debug, Clone, Identifiable, Queryable, Selectable, Associations)]
#[diesel(table_name = crate::schema::attachments)]
#[diesel(belongs_to(VisaApplication, foreign_key = application_id))]
/// Diesel model for [`crate::domain::attachment::Attachment`].
pub struct Attachment {
    pub id: i32,
    pub application_id: i32,
    pub kind: String,
    pub file_name: String,
    pub file_path: String,
    pub mime_type: String,
    pub size_kb: i64,
    pub uploaded_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::attachments)]
pub struct NewAttachment<'a> {
    pub application_id: i32,
    pub kind: &'a str,
    pub file_name: &'a str,
    pub file_path: &'a str,
    pub mime_type: &'a str,
    pub size_kb: i64,
    pub uploaded_at: NaiveDateTime,
}

impl<'a> NewAttachment<'a> {
    pub fn from_domain(attachment: &'a DomainNewAttachment, now: NaiveDateTime) -> Self {
        Self {
            application_id: attachment.application_id.get(),
            kind: attachment.kind.as_str(),
            file_name: attachment.file_name.as_str(),
            file_path: &attachment.file_path,
            mime_type: &attachment.mime_type,
            size_kb: attachment.size_kb,
            uploaded_at: now,
        }
    }
}

impl TryFrom<Attachment> for DomainAttachment {
    type Error = TypeConstraintError;

    fn try_from(row: Attachment) -> Result<Self, Self::Error> {
        Ok(Self {
            id: AttachmentId::new(row.id)?,
            application_id: ApplicationId::new(row.application_id)?,
            kind: row.kind.parse()?,
            file_name: row.file_name,
            file_path: row.file_path,
            mime_type: row.mime_type,
            size_kb: row.size_kb,
            uploaded_at: row.uploaded_at,
        })
    }
}
