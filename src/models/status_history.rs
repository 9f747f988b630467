//! Diesel models for the status audit trail.

use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::application::{
    ApplicationStatus, NewStatusHistory as DomainNewStatusHistory,
    StatusHistory as DomainStatusHistory,
};
use crate::domain::types::{ApplicationId, StatusHistoryId, TypeConstraintError};
use crate::models::application::VisaApplication;

#[derive(Debug, Clone, Identifiable, Queryable, Selectable, Associations)]
#[diesel(table_name = crate::schema::status_histories)]
#[diesel(belongs_to(VisaApplication, foreign_key = application_id))]
pub struct StatusHistory {
    pub id: i32,
    pub application_id: i32,
    pub previous_status: Option<String>,
    pub new_status: String,
    pub comment: Option<String>,
    pub agent_id: Option<String>,
    pub changed_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::status_histories)]
pub struct NewStatusHistory<'a> {
    pub application_id: i32,
    pub previous_status: Option<&'a str>,
    pub new_status: &'a str,
    pub comment: Option<&'a str>,
    pub agent_id: Option<&'a str>,
    pub changed_at: NaiveDateTime,
}

impl<'a> NewStatusHistory<'a> {
    pub fn from_domain(entry: &'a DomainNewStatusHistory, now: NaiveDateTime) -> Self {
        Self {
            application_id: entry.application_id.get(),
            previous_status: entry.previous_status.map(ApplicationStatus::as_str),
            new_status: entry.new_status.as_str(),
            comment: entry.comment.as_deref(),
            agent_id: entry.agent_id.as_deref(),
            changed_at: now,
        }
    }
}

impl TryFrom<StatusHistory> for DomainStatusHistory {
    type Error = TypeConstraintError;

    fn try_from(row: StatusHistory) -> Result<Self, Self::Error> {
        Ok(Self {
            id: StatusHistoryId::new(row.id)?,
            application_id: ApplicationId::new(row.application_id)?,
            previous_status: row
                .previous_status
                .as_deref()
                .map(str::parse::<ApplicationStatus>)
                .transpose()?,
            new_status: row.new_status.parse()?,
            comment: row.comment,
            agent_id: row.agent_id,
            changed_at: row.changed_at,
        })
    }
}
