//! Diesel models for the visa application header row.

use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::application::{
    NewApplication as DomainNewApplication, VisaApplication as DomainVisaApplication,
};
use crate::domain::types::{ApplicationId, ApplicationNumber, PublicId, TypeConstraintError, UserId};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::visa_applications)]
/// Diesel model for [`crate::domain::application::VisaApplication`].
pub struct VisaApplication {
    pub id: i32,
    pub public_id: Vec<u8>,
    pub user_id: String,
    pub application_number: String,
    pub status: String,
    pub visa_type_id: Option<String>,
    pub current_step: i32,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    pub submitted_at: Option<NaiveDateTime>,
    pub processed_at: Option<NaiveDateTime>,
    pub approved_at: Option<NaiveDateTime>,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::visa_applications)]
/// Insertable form of [`VisaApplication`].
pub struct NewVisaApplication<'a> {
    pub public_id: &'a [u8],
    pub user_id: &'a str,
    pub application_number: &'a str,
    pub status: &'a str,
    pub visa_type_id: Option<&'a str>,
    pub current_step: i32,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl<'a> NewVisaApplication<'a> {
    pub fn from_domain(application: &'a DomainNewApplication, now: NaiveDateTime) -> Self {
        Self {
            public_id: application.public_id.as_bytes(),
            user_id: application.user_id.as_str(),
            application_number: application.application_number.as_str(),
            status: application.status.as_str(),
            visa_type_id: application.visa_type_id.as_deref(),
            current_step: i32::from(application.current_step),
            created_at: now,
            updated_at: now,
        }
    }
}

impl TryFrom<VisaApplication> for DomainVisaApplication {
    type Error = TypeConstraintError;

    fn try_from(row: VisaApplication) -> Result<Self, Self::Error> {
        let current_step = u8::try_from(row.current_step).map_err(|_| {
            TypeConstraintError::InvalidValue(format!("step out of range: {}", row.current_step))
        })?;
        Ok(Self {
            id: Some(ApplicationId::new(row.id)?),
            public_id: PublicId::from_bytes(&row.public_id)?,
            user_id: UserId::new(row.user_id)?,
            application_number: ApplicationNumber::new(row.application_number)?,
            status: row.status.parse()?,
            visa_type_id: row.visa_type_id,
            current_step,
            created_at: row.created_at,
            updated_at: row.updated_at,
            submitted_at: row.submitted_at,
            processed_at: row.processed_at,
            approved_at: row.approved_at,
            general_info: None,
            passport_info: None,
            traveler_info: None,
            attachments: Vec::new(),
            histories: Vec::new(),
        })
    }
}
