use chrono::NaiveDateTime;
use uuid::Uuid;

use crate::db::{DbConnection, DbPool, get_connection};
use crate::domain::application::{
    ApplicationStats, ApplicationStatus, NewApplication, SectionUpdate, StatusChange,
    VisaApplication,
};
use crate::domain::attachment::{Attachment, NewAttachment};
use crate::domain::idempotency::IdempotencyRecord;
use crate::domain::types::{ApplicationId, PublicId, UserId};
use crate::repository::errors::RepositoryResult;

pub mod application;
pub mod attachment;
pub mod errors;
pub mod idempotency;
#[cfg(feature = "test-mocks")]
pub mod mock;

/// Diesel-backed implementation of every repository trait.
#[derive(Clone)]
pub struct DieselRepository {
    pool: DbPool,
}

impl DieselRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn conn(&self) -> RepositoryResult<DbConnection> {
        Ok(get_connection(&self.pool)?)
    }
}

#[derive(Debug, Clone)]
pub struct Pagination {
    pub page: usize,
    pub per_page: usize,
}

#[derive(Debug, Clone, Default)]
pub struct ApplicationListQuery {
    pub user_id: Option<UserId>,
    pub status: Option<ApplicationStatus>,
    pub search: Option<String>,
    pub pagination: Option<Pagination>,
}

impl ApplicationListQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts the listing to one applicant's applications.
    pub fn user(mut self, user_id: UserId) -> Self {
        self.user_id = Some(user_id);
        self
    }

    pub fn status(mut self, status: ApplicationStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Matches the application number, traveler names or applicant email.
    pub fn search(mut self, term: impl Into<String>) -> Self {
        self.search = Some(term.into());
        self
    }

    pub fn paginate(mut self, page: usize, per_page: usize) -> Self {
        self.pagination = Some(Pagination { page, per_page });
        self
    }
}

pub trait ApplicationReader {
    /// Loads an application with its sections, attachments and history.
    fn get_application_by_public_id(
        &self,
        public_id: PublicId,
    ) -> RepositoryResult<Option<VisaApplication>>;
    fn get_application_by_id(&self, id: ApplicationId)
    -> RepositoryResult<Option<VisaApplication>>;
    /// The applicant's open draft, if any.
    fn find_draft_for_user(&self, user_id: &UserId) -> RepositoryResult<Option<VisaApplication>>;
    /// Newest first, with details loaded. Returns the total before paging.
    fn list_applications(
        &self,
        query: ApplicationListQuery,
    ) -> RepositoryResult<(usize, Vec<VisaApplication>)>;
    /// Dashboard counters; `recent_since` bounds the recent-applications count.
    fn application_stats(&self, recent_since: NaiveDateTime) -> RepositoryResult<ApplicationStats>;
}

pub trait ApplicationWriter {
    fn create_application(&self, new_application: &NewApplication)
    -> RepositoryResult<VisaApplication>;
    /// Upserts the sections present in `update` and bumps `updated_at`.
    fn save_sections(
        &self,
        id: ApplicationId,
        update: &SectionUpdate,
    ) -> RepositoryResult<VisaApplication>;
    /// Stores the final sections and moves the application to `change.status`
    /// with a history entry, in one transaction.
    fn submit_application(
        &self,
        id: ApplicationId,
        update: &SectionUpdate,
        change: &StatusChange,
    ) -> RepositoryResult<VisaApplication>;
    /// Applies an administrative status change and records it.
    fn change_status(
        &self,
        id: ApplicationId,
        change: &StatusChange,
    ) -> RepositoryResult<VisaApplication>;
}

pub trait AttachmentWriter {
    /// Stores upload metadata. The photo replaces any previous photo and a
    /// document replaces one with the same file name.
    fn save_attachment(&self, attachment: &NewAttachment) -> RepositoryResult<Attachment>;
}

pub trait IdempotencyReader {
    fn find_idempotency_key(&self, key: Uuid) -> RepositoryResult<Option<IdempotencyRecord>>;
}

pub trait IdempotencyWriter {
    /// Remembers a key. Recording an already known key is a no-op.
    fn record_idempotency_key(&self, record: &IdempotencyRecord) -> RepositoryResult<()>;
}
