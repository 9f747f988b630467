//! Multipart body of `POST /api/visa-application/upload`.

#[cfg(feature = "server")]
use actix_multipart::form::{MultipartForm, tempfile::TempFile, text::Text};

use crate::domain::attachment::AttachmentKind;
use crate::domain::types::{NonEmptyString, PublicId};
use crate::forms::draft::parse_application_id;
use crate::forms::fields::validate_attachment;
use crate::forms::{ErrorMap, Field, FormError};

#[cfg(feature = "server")]
#[derive(MultipartForm)]
pub struct UploadAttachmentForm {
    #[multipart(rename = "applicationId")]
    pub application_id: Text<String>,
    #[multipart(rename = "fileType")]
    pub file_type: Text<String>,
    #[multipart(limit = "10MB")]
    pub file: TempFile,
}

/// Upload metadata, detached from the transport.
#[derive(Clone, Debug, Default)]
pub struct AttachmentUploadForm {
    pub application_id: String,
    pub file_type: String,
    pub file_name: Option<String>,
    pub mime_type: Option<String>,
    pub size_bytes: u64,
}

#[cfg(feature = "server")]
impl From<UploadAttachmentForm> for AttachmentUploadForm {
    fn from(form: UploadAttachmentForm) -> Self {
        Self {
            application_id: form.application_id.into_inner(),
            file_type: form.file_type.into_inner(),
            file_name: form.file.file_name.clone(),
            mime_type: form.file.content_type.as_ref().map(|m| m.essence_str().to_string()),
            size_bytes: form.file.size as u64,
        }
    }
}

#[derive(Clone, Debug)]
pub struct AttachmentUploadPayload {
    pub application_id: PublicId,
    pub kind: AttachmentKind,
    pub file_name: NonEmptyString,
    pub mime_type: String,
    pub size_bytes: u64,
}

/// Keeps only the last path component of a client-supplied name.
fn base_name(file_name: &str) -> &str {
    file_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(file_name)
        .trim()
}

impl TryFrom<AttachmentUploadForm> for AttachmentUploadPayload {
    type Error = FormError;

    fn try_from(form: AttachmentUploadForm) -> Result<Self, Self::Error> {
        let application_id = parse_application_id(Some(&form.application_id))?;
        let kind: AttachmentKind = form.file_type.trim().parse()?;
        let file_name = NonEmptyString::new(base_name(form.file_name.as_deref().unwrap_or_default()))
            .map_err(|_| FormError::MissingData)?;
        let mime_type = form
            .mime_type
            .unwrap_or_else(|| "application/octet-stream".to_string());

        if let Some(key) = validate_attachment(kind, &mime_type, form.size_bytes) {
            let field = match kind {
                AttachmentKind::Photo => Field::Photo,
                AttachmentKind::Document => Field::Documents,
            };
            return Err(FormError::Fields(ErrorMap::from_iter([(field, key)])));
        }

        Ok(Self {
            application_id,
            kind,
            file_name,
            mime_type,
            size_bytes: form.size_bytes,
        })
    }
}
