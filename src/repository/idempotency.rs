//! Repository implementation for idempotency keys.

use chrono::Utc;
use diesel::prelude::*;
use uuid::Uuid;

use crate::domain::idempotency::IdempotencyRecord;
use crate::models::idempotency::{
    IdempotencyKey as DbIdempotencyKey, NewIdempotencyKey as DbNewIdempotencyKey,
};
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{DieselRepository, IdempotencyReader, IdempotencyWriter};

impl IdempotencyReader for DieselRepository {
    fn find_idempotency_key(&self, key: Uuid) -> RepositoryResult<Option<IdempotencyRecord>> {
        use crate::schema::idempotency_keys;

        let mut conn = self.conn()?;
        let row = idempotency_keys::table
            .find(key.to_string())
            .select(DbIdempotencyKey::as_select())
            .first(&mut conn)
            .optional()?;

        match row {
            Some(row) => Ok(Some(
                IdempotencyRecord::try_from(row).map_err(RepositoryError::from)?,
            )),
            None => Ok(None),
        }
    }
}

impl IdempotencyWriter for DieselRepository {
    fn record_idempotency_key(&self, record: &IdempotencyRecord) -> RepositoryResult<()> {
        use crate::schema::idempotency_keys;

        let mut conn = self.conn()?;
        diesel::insert_or_ignore_into(idempotency_keys::table)
            .values(&DbNewIdempotencyKey::from_domain(record, Utc::now().naive_utc()))
            .execute(&mut conn)?;
        Ok(())
    }
}
