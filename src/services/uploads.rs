use crate::domain::attachment::NewAttachment;
use crate::domain::auth::AuthenticatedUser;
use crate::dto::application::AttachmentUploaded;
use crate::forms::upload::{AttachmentUploadForm, AttachmentUploadPayload};
use crate::repository::{ApplicationReader, AttachmentWriter};
use crate::services::{ServiceResult, load_owned};

/// Records the metadata of an uploaded photo or supporting document.
pub fn upload_attachment<R>(
    repo: &R,
    user: &AuthenticatedUser,
    form: AttachmentUploadForm,
) -> ServiceResult<AttachmentUploaded>
where
    R: ApplicationReader + AttachmentWriter + ?Sized,
{
    let payload = AttachmentUploadPayload::try_from(form)?;

    let application = load_owned(repo, user, payload.application_id)?;

    let new_attachment = NewAttachment::stored(
        application.row_id()?,
        payload.kind,
        payload.file_name,
        payload.mime_type,
        payload.size_bytes,
    );
    let attachment = repo.save_attachment(&new_attachment).map_err(|err| {
        log::error!(
            "Failed to store {} for {}: {err}",
            new_attachment.kind,
            application.application_number
        );
        err
    })?;

    Ok(AttachmentUploaded {
        success: true,
        message: "File uploaded successfully".to_string(),
        attachment,
    })
}
