//! Repository implementation for upload metadata.

use chrono::Utc;
use diesel::prelude::*;

use crate::domain::attachment::{Attachment, AttachmentKind, NewAttachment};
use crate::models::attachment::{
    Attachment as DbAttachment, NewAttachment as DbNewAttachment,
};
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{AttachmentWriter, DieselRepository};

impl AttachmentWriter for DieselRepository {
    fn save_attachment(&self, attachment: &NewAttachment) -> RepositoryResult<Attachment> {
        use crate::schema::attachments;

        let mut conn = self.conn()?;

        let db_attachment = conn.transaction::<_, RepositoryError, _>(|conn| {
            let same_application = attachments::application_id
                .eq(attachment.application_id.get())
                .and(attachments::kind.eq(attachment.kind.as_str()));
            match attachment.kind {
                AttachmentKind::Photo => {
                    diesel::delete(attachments::table.filter(same_application)).execute(conn)?;
                }
                AttachmentKind::Document => {
                    diesel::delete(attachments::table.filter(
                        same_application
                            .and(attachments::file_name.eq(attachment.file_name.as_str())),
                    ))
                    .execute(conn)?;
                }
            }

            let row = diesel::insert_into(attachments::table)
                .values(&DbNewAttachment::from_domain(attachment, Utc::now().naive_utc()))
                .returning(DbAttachment::as_returning())
                .get_result(conn)?;
            Ok(row)
        })?;

        Attachment::try_from(db_attachment).map_err(RepositoryError::from)
    }
}
