//! Repository implementation for visa applications and their sections.

use chrono::{NaiveDateTime, Utc};
use diesel::prelude::*;
use diesel::sqlite::{Sqlite, SqliteConnection};

use crate::domain::application::{
    ApplicationStats, ApplicationStatus, GeneralInfo, NewApplication, NewStatusHistory,
    PassportInfo, SectionUpdate, StatusChange, StatusHistory, TravelerInfo, VisaApplication,
};
use crate::domain::attachment::Attachment;
use crate::domain::types::{ApplicationId, PublicId, UserId};
use crate::models::application::{
    NewVisaApplication as DbNewVisaApplication, VisaApplication as DbVisaApplication,
};
use crate::models::attachment::Attachment as DbAttachment;
use crate::models::sections::{
    GeneralInfo as DbGeneralInfo, NewGeneralInfo as DbNewGeneralInfo,
    NewPassportInfo as DbNewPassportInfo, NewTravelerInfo as DbNewTravelerInfo,
    PassportInfo as DbPassportInfo, TravelerInfo as DbTravelerInfo,
};
use crate::models::status_history::{
    NewStatusHistory as DbNewStatusHistory, StatusHistory as DbStatusHistory,
};
use crate::repository::errors::{RepositoryError, RepositoryResult};
use crate::repository::{
    ApplicationListQuery, ApplicationReader, ApplicationWriter, DieselRepository,
};

fn now() -> NaiveDateTime {
    Utc::now().naive_utc()
}

/// Attaches sections, attachments and history to loaded header rows,
/// preserving the order of `rows`.
fn load_details(
    conn: &mut SqliteConnection,
    rows: Vec<DbVisaApplication>,
) -> RepositoryResult<Vec<VisaApplication>> {
    use crate::schema::{attachments, status_histories};

    let generals = DbGeneralInfo::belonging_to(&rows)
        .select(DbGeneralInfo::as_select())
        .load(conn)?
        .grouped_by(&rows);
    let passports = DbPassportInfo::belonging_to(&rows)
        .select(DbPassportInfo::as_select())
        .load(conn)?
        .grouped_by(&rows);
    let travelers = DbTravelerInfo::belonging_to(&rows)
        .select(DbTravelerInfo::as_select())
        .load(conn)?
        .grouped_by(&rows);
    let files = DbAttachment::belonging_to(&rows)
        .select(DbAttachment::as_select())
        .order((attachments::kind.desc(), attachments::uploaded_at.asc()))
        .load(conn)?
        .grouped_by(&rows);
    let histories = DbStatusHistory::belonging_to(&rows)
        .select(DbStatusHistory::as_select())
        .order((status_histories::changed_at.desc(), status_histories::id.desc()))
        .load(conn)?
        .grouped_by(&rows);

    rows.into_iter()
        .zip(generals)
        .zip(passports)
        .zip(travelers)
        .zip(files)
        .zip(histories)
        .map(
            |(((((row, general), passport), traveler), files), histories)| {
                let mut application = VisaApplication::try_from(row)?;
                application.general_info = general
                    .into_iter()
                    .next()
                    .map(GeneralInfo::try_from)
                    .transpose()?;
                application.passport_info = passport
                    .into_iter()
                    .next()
                    .map(PassportInfo::try_from)
                    .transpose()?;
                application.traveler_info = traveler
                    .into_iter()
                    .next()
                    .map(TravelerInfo::try_from)
                    .transpose()?;
                application.attachments = files
                    .into_iter()
                    .map(Attachment::try_from)
                    .collect::<Result<Vec<_>, _>>()?;
                application.histories = histories
                    .into_iter()
                    .map(StatusHistory::try_from)
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(application)
            },
        )
        .collect::<Result<Vec<_>, crate::domain::types::TypeConstraintError>>()
        .map_err(RepositoryError::from)
}

fn load_one(
    conn: &mut SqliteConnection,
    row: Option<DbVisaApplication>,
) -> RepositoryResult<Option<VisaApplication>> {
    match row {
        Some(row) => Ok(load_details(conn, vec![row])?.into_iter().next()),
        None => Ok(None),
    }
}

fn reload(conn: &mut SqliteConnection, id: ApplicationId) -> RepositoryResult<VisaApplication> {
    use crate::schema::visa_applications;

    let row = visa_applications::table
        .find(id.get())
        .select(DbVisaApplication::as_select())
        .first(conn)?;
    load_one(conn, Some(row))?.ok_or(RepositoryError::NotFound)
}

fn upsert_sections(
    conn: &mut SqliteConnection,
    id: ApplicationId,
    update: &SectionUpdate,
    now: NaiveDateTime,
) -> RepositoryResult<()> {
    use crate::schema::{general_infos, passport_infos, traveler_infos, visa_applications};

    let application_id = id.get();

    if let Some(info) = &update.general_info {
        let row = DbNewGeneralInfo::from_domain(application_id, info, now);
        diesel::insert_into(general_infos::table)
            .values(&row)
            .on_conflict(general_infos::application_id)
            .do_update()
            .set(&row)
            .execute(conn)?;
    }
    if let Some(info) = &update.passport_info {
        let row = DbNewPassportInfo::from_domain(application_id, info, now);
        diesel::insert_into(passport_infos::table)
            .values(&row)
            .on_conflict(passport_infos::application_id)
            .do_update()
            .set(&row)
            .execute(conn)?;
    }
    if let Some(info) = &update.traveler_info {
        let row = DbNewTravelerInfo::from_domain(application_id, info, now);
        diesel::insert_into(traveler_infos::table)
            .values(&row)
            .on_conflict(traveler_infos::application_id)
            .do_update()
            .set(&row)
            .execute(conn)?;
    }

    let updated = diesel::update(visa_applications::table.find(application_id))
        .set(visa_applications::updated_at.eq(now))
        .execute(conn)?;
    if updated == 0 {
        return Err(RepositoryError::NotFound);
    }
    if let Some(visa_type_id) = &update.visa_type_id {
        diesel::update(visa_applications::table.find(application_id))
            .set(visa_applications::visa_type_id.eq(visa_type_id))
            .execute(conn)?;
    }
    if let Some(step) = update.current_step {
        // Recorded progress never moves backwards.
        diesel::update(
            visa_applications::table
                .find(application_id)
                .filter(visa_applications::current_step.lt(i32::from(step))),
        )
        .set(visa_applications::current_step.eq(i32::from(step)))
        .execute(conn)?;
    }
    Ok(())
}

fn apply_status(
    conn: &mut SqliteConnection,
    id: ApplicationId,
    change: &StatusChange,
    now: NaiveDateTime,
) -> RepositoryResult<()> {
    use crate::schema::{status_histories, visa_applications};

    let previous: String = visa_applications::table
        .find(id.get())
        .select(visa_applications::status)
        .first(conn)?;
    let previous = previous
        .parse::<ApplicationStatus>()
        .map_err(RepositoryError::from)?;

    diesel::update(visa_applications::table.find(id.get()))
        .set((
            visa_applications::status.eq(change.status.as_str()),
            visa_applications::updated_at.eq(now),
        ))
        .execute(conn)?;

    match change.status {
        ApplicationStatus::Pending if previous == ApplicationStatus::Draft => {
            diesel::update(visa_applications::table.find(id.get()))
                .set(visa_applications::submitted_at.eq(now))
                .execute(conn)?;
        }
        ApplicationStatus::Processing => {
            diesel::update(visa_applications::table.find(id.get()))
                .set(visa_applications::processed_at.eq(now))
                .execute(conn)?;
        }
        ApplicationStatus::Approved => {
            diesel::update(visa_applications::table.find(id.get()))
                .set(visa_applications::approved_at.eq(now))
                .execute(conn)?;
        }
        _ => {}
    }

    let entry = NewStatusHistory {
        application_id: id,
        previous_status: Some(previous),
        new_status: change.status,
        comment: change.comment.clone(),
        agent_id: change.agent_id.clone(),
    };
    diesel::insert_into(status_histories::table)
        .values(&DbNewStatusHistory::from_domain(&entry, now))
        .execute(conn)?;

    Ok(())
}

impl ApplicationReader for DieselRepository {
    fn get_application_by_public_id(
        &self,
        public_id: PublicId,
    ) -> RepositoryResult<Option<VisaApplication>> {
        use crate::schema::visa_applications;

        let mut conn = self.conn()?;
        let row = visa_applications::table
            .filter(visa_applications::public_id.eq(public_id.as_bytes().as_slice()))
            .select(DbVisaApplication::as_select())
            .first(&mut conn)
            .optional()?;

        load_one(&mut conn, row)
    }

    fn get_application_by_id(
        &self,
        id: ApplicationId,
    ) -> RepositoryResult<Option<VisaApplication>> {
        use crate::schema::visa_applications;

        let mut conn = self.conn()?;
        let row = visa_applications::table
            .find(id.get())
            .select(DbVisaApplication::as_select())
            .first(&mut conn)
            .optional()?;

        load_one(&mut conn, row)
    }

    fn find_draft_for_user(&self, user_id: &UserId) -> RepositoryResult<Option<VisaApplication>> {
        use crate::schema::visa_applications;

        let mut conn = self.conn()?;
        let row = visa_applications::table
            .filter(visa_applications::user_id.eq(user_id.as_str()))
            .filter(visa_applications::status.eq(ApplicationStatus::Draft.as_str()))
            .order((
                visa_applications::updated_at.desc(),
                visa_applications::id.desc(),
            ))
            .select(DbVisaApplication::as_select())
            .first(&mut conn)
            .optional()?;

        load_one(&mut conn, row)
    }

    fn list_applications(
        &self,
        query: ApplicationListQuery,
    ) -> RepositoryResult<(usize, Vec<VisaApplication>)> {
        use crate::schema::{general_infos, traveler_infos, visa_applications};

        let mut conn = self.conn()?;

        let query_builder = || {
            let mut items = visa_applications::table.into_boxed::<Sqlite>();

            if let Some(user_id) = &query.user_id {
                items = items.filter(visa_applications::user_id.eq(user_id.as_str().to_string()));
            }
            if let Some(status) = query.status {
                items = items.filter(visa_applications::status.eq(status.as_str()));
            }
            if let Some(term) = &query.search {
                let pattern = format!("%{}%", term.replace(['%', '_'], ""));
                let by_name = traveler_infos::table
                    .filter(
                        traveler_infos::first_name
                            .like(pattern.clone())
                            .or(traveler_infos::last_name.like(pattern.clone())),
                    )
                    .select(traveler_infos::application_id);
                let by_email = general_infos::table
                    .filter(general_infos::email.like(pattern.clone()))
                    .select(general_infos::application_id);
                items = items.filter(
                    visa_applications::application_number
                        .like(pattern)
                        .or(visa_applications::id.eq_any(by_name))
                        .or(visa_applications::id.eq_any(by_email)),
                );
            }
            items
        };

        let total = query_builder().count().get_result::<i64>(&mut conn)? as usize;

        let mut items = query_builder()
            .order((
                visa_applications::created_at.desc(),
                visa_applications::id.desc(),
            ))
            .select(DbVisaApplication::as_select());
        if let Some(pagination) = &query.pagination {
            let offset = ((pagination.page.max(1) - 1) * pagination.per_page) as i64;
            items = items.offset(offset).limit(pagination.per_page as i64);
        }
        let rows = items.load(&mut conn)?;

        Ok((total, load_details(&mut conn, rows)?))
    }

    fn application_stats(&self, recent_since: NaiveDateTime) -> RepositoryResult<ApplicationStats> {
        use crate::schema::visa_applications;
        use diesel::dsl::count_distinct;

        let mut pooled = self.conn()?;
        let conn: &mut SqliteConnection = &mut pooled;

        let by_status = |conn: &mut SqliteConnection, status: ApplicationStatus| {
            visa_applications::table
                .filter(visa_applications::status.eq(status.as_str()))
                .count()
                .get_result::<i64>(conn)
        };

        Ok(ApplicationStats {
            total_applications: visa_applications::table
                .count()
                .get_result::<i64>(conn)?,
            pending_applications: by_status(conn, ApplicationStatus::Pending)?,
            processing_applications: by_status(conn, ApplicationStatus::Processing)?,
            approved_applications: by_status(conn, ApplicationStatus::Approved)?,
            rejected_applications: by_status(conn, ApplicationStatus::Rejected)?,
            total_users: visa_applications::table
                .select(count_distinct(visa_applications::user_id))
                .get_result::<i64>(conn)?,
            recent_applications: visa_applications::table
                .filter(visa_applications::created_at.ge(recent_since))
                .count()
                .get_result::<i64>(conn)?,
        })
    }
}

impl ApplicationWriter for DieselRepository {
    fn create_application(
        &self,
        new_application: &NewApplication,
    ) -> RepositoryResult<VisaApplication> {
        use crate::schema::visa_applications;

        let mut conn = self.conn()?;

        let row = diesel::insert_into(visa_applications::table)
            .values(&DbNewVisaApplication::from_domain(new_application, now()))
            .returning(DbVisaApplication::as_returning())
            .get_result(&mut conn)?;

        VisaApplication::try_from(row).map_err(RepositoryError::from)
    }

    fn save_sections(
        &self,
        id: ApplicationId,
        update: &SectionUpdate,
    ) -> RepositoryResult<VisaApplication> {
        let mut conn = self.conn()?;

        conn.transaction::<_, RepositoryError, _>(|conn| {
            upsert_sections(conn, id, update, now())?;
            reload(conn, id)
        })
    }

    fn submit_application(
        &self,
        id: ApplicationId,
        update: &SectionUpdate,
        change: &StatusChange,
    ) -> RepositoryResult<VisaApplication> {
        let mut conn = self.conn()?;

        conn.transaction::<_, RepositoryError, _>(|conn| {
            let now = now();
            upsert_sections(conn, id, update, now)?;
            apply_status(conn, id, change, now)?;
            reload(conn, id)
        })
    }

    fn change_status(
        &self,
        id: ApplicationId,
        change: &StatusChange,
    ) -> RepositoryResult<VisaApplication> {
        let mut conn = self.conn()?;

        conn.transaction::<_, RepositoryError, _>(|conn| {
            apply_status(conn, id, change, now())?;
            reload(conn, id)
        })
    }
}
