//! Diesel models for honoured idempotency keys.

use chrono::NaiveDateTime;
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::idempotency::IdempotencyRecord as DomainIdempotencyRecord;
use crate::domain::types::{ApplicationId, TypeConstraintError, UserId};

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = crate::schema::idempotency_keys)]
pub struct IdempotencyKey {
    pub key: String,
    pub user_id: String,
    pub operation: String,
    pub application_id: i32,
    pub created_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::idempotency_keys)]
pub struct NewIdempotencyKey<'a> {
    pub key: String,
    pub user_id: &'a str,
    pub operation: &'a str,
    pub application_id: i32,
    pub created_at: NaiveDateTime,
}

impl<'a> NewIdempotencyKey<'a> {
    pub fn from_domain(record: &'a DomainIdempotencyRecord, now: NaiveDateTime) -> Self {
        Self {
            key: record.key.to_string(),
            user_id: record.user_id.as_str(),
            operation: record.operation.as_str(),
            application_id: record.application_id.get(),
            created_at: now,
        }
    }
}

impl TryFrom<IdempotencyKey> for DomainIdempotencyRecord {
    type Error = TypeConstraintError;

    fn try_from(row: IdempotencyKey) -> Result<Self, Self::Error> {
        Ok(Self {
            key: Uuid::parse_str(&row.key).map_err(|_| TypeConstraintError::InvalidUuid)?,
            user_id: UserId::new(row.user_id)?,
            operation: row.operation.parse()?,
            application_id: ApplicationId::new(row.application_id)?,
        })
    }
}
