//! Mock repository implementations for isolating services in tests.

use chrono::NaiveDateTime;
use mockall::mock;
use uuid::Uuid;

use crate::domain::application::{
    ApplicationStats, NewApplication, SectionUpdate, StatusChange, VisaApplication,
};
use crate::domain::attachment::{Attachment, NewAttachment};
use crate::domain::idempotency::IdempotencyRecord;
use crate::domain::types::{ApplicationId, PublicId, UserId};
use crate::repository::errors::RepositoryResult;
use crate::repository::{
    ApplicationListQuery, ApplicationReader, ApplicationWriter, AttachmentWriter,
    IdempotencyReader, IdempotencyWriter,
};

mock! {
    pub Repository {}

    impl ApplicationReader for Repository {
        fn get_application_by_public_id(
            &self,
            public_id: PublicId,
        ) -> RepositoryResult<Option<VisaApplication>>;
        fn get_application_by_id(
            &self,
            id: ApplicationId,
        ) -> RepositoryResult<Option<VisaApplication>>;
        fn find_draft_for_user(&self, user_id: &UserId) -> RepositoryResult<Option<VisaApplication>>;
        fn list_applications(
            &self,
            query: ApplicationListQuery,
        ) -> RepositoryResult<(usize, Vec<VisaApplication>)>;
        fn application_stats(&self, recent_since: NaiveDateTime) -> RepositoryResult<ApplicationStats>;
    }

    impl ApplicationWriter for Repository {
        fn create_application(
            &self,
            new_application: &NewApplication,
        ) -> RepositoryResult<VisaApplication>;
        fn save_sections(
            &self,
            id: ApplicationId,
            update: &SectionUpdate,
        ) -> RepositoryResult<VisaApplication>;
        fn submit_application(
            &self,
            id: ApplicationId,
            update: &SectionUpdate,
            change: &StatusChange,
        ) -> RepositoryResult<VisaApplication>;
        fn change_status(
            &self,
            id: ApplicationId,
            change: &StatusChange,
        ) -> RepositoryResult<VisaApplication>;
    }

    impl AttachmentWriter for Repository {
        fn save_attachment(&self, attachment: &NewAttachment) -> RepositoryResult<Attachment>;
    }

    impl IdempotencyReader for Repository {
        fn find_idempotency_key(&self, key: Uuid) -> RepositoryResult<Option<IdempotencyRecord>>;
    }

    impl IdempotencyWriter for Repository {
        fn record_idempotency_key(&self, record: &IdempotencyRecord) -> RepositoryResult<()>;
    }
}
