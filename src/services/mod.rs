//! Business rules behind the JSON API. Every operation takes the repository
//! through its traits so it can be exercised against the mock.

use std::collections::BTreeMap;

use thiserror::Error;
use uuid::Uuid;

use crate::domain::application::VisaApplication;
use crate::domain::auth::AuthenticatedUser;
use crate::domain::idempotency::{IdempotencyRecord, IdempotentOperation};
use crate::domain::types::{ApplicationId, PublicId};
use crate::repository::{ApplicationReader, IdempotencyReader, IdempotencyWriter};

pub mod admin;
pub mod applications;
pub mod drafts;
pub mod uploads;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("unauthorized")]
    Unauthorized,

    #[error("forbidden")]
    Forbidden,

    #[error("not found")]
    NotFound,

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Form(String),

    /// Field name to message key.
    #[error("validation failed")]
    Validation(BTreeMap<String, String>),

    #[error("{0}")]
    TypeConstraint(String),

    #[error("internal error")]
    Internal,
}

pub type ServiceResult<T> = Result<T, ServiceError>;

pub fn ensure_admin(user: &AuthenticatedUser) -> ServiceResult<()> {
    if user.is_admin() {
        Ok(())
    } else {
        Err(ServiceError::Forbidden)
    }
}

/// Loads an application the caller owns. Other users' applications are
/// reported as missing.
pub(crate) fn load_owned<R>(
    repo: &R,
    user: &AuthenticatedUser,
    public_id: PublicId,
) -> ServiceResult<VisaApplication>
where
    R: ApplicationReader + ?Sized,
{
    repo.get_application_by_public_id(public_id)?
        .filter(|application| application.user_id == user.id)
        .ok_or(ServiceError::NotFound)
}

/// Resolves a previously honoured idempotency key to its application.
///
/// A key issued to another user or another operation is a conflict.
pub(crate) fn replayed<R>(
    repo: &R,
    user: &AuthenticatedUser,
    key: Option<Uuid>,
    operation: IdempotentOperation,
) -> ServiceResult<Option<VisaApplication>>
where
    R: ApplicationReader + IdempotencyReader + ?Sized,
{
    let Some(key) = key else {
        return Ok(None);
    };
    let Some(record) = repo.find_idempotency_key(key)? else {
        return Ok(None);
    };
    if !record.matches(&user.id, operation) {
        return Err(ServiceError::Conflict(
            "Idempotency key already used for another request".to_string(),
        ));
    }
    log::info!("Replaying {operation} request {key} for user {}", user.id);
    let application = repo
        .get_application_by_id(record.application_id)?
        .ok_or(ServiceError::NotFound)?;
    Ok(Some(application))
}

pub(crate) fn remember<R>(
    repo: &R,
    user: &AuthenticatedUser,
    key: Option<Uuid>,
    operation: IdempotentOperation,
    application_id: ApplicationId,
) -> ServiceResult<()>
where
    R: IdempotencyWriter + ?Sized,
{
    if let Some(key) = key {
        repo.record_idempotency_key(&IdempotencyRecord {
            key,
            user_id: user.id.clone(),
            operation,
            application_id,
        })
        .map_err(|err| {
            log::error!("Failed to record idempotency key {key}: {err}");
            err
        })?;
    }
    Ok(())
}

#[cfg(all(test, feature = "test-mocks"))]
pub(crate) mod test_support {
    use chrono::{NaiveDate, NaiveDateTime};

    use crate::domain::application::{ApplicationStatus, VisaApplication};
    use crate::domain::auth::{AuthenticatedUser, Role};
    use crate::domain::types::{ApplicationId, ApplicationNumber, PublicId, UserId};
    use crate::forms::wizard::{GeneralInfoForm, PassportInfoForm, TravelerInfoForm};

    pub fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
    }

    pub fn now() -> NaiveDateTime {
        today().and_hms_opt(9, 30, 0).unwrap()
    }

    pub fn applicant() -> AuthenticatedUser {
        AuthenticatedUser {
            id: UserId::new("user-1").unwrap(),
            email: "awa@example.com".into(),
            name: Some("Awa Diallo".into()),
            role: Role::User,
        }
    }

    pub fn admin() -> AuthenticatedUser {
        AuthenticatedUser {
            id: UserId::new("admin-1").unwrap(),
            email: "agent@example.com".into(),
            name: Some("Moussa".into()),
            role: Role::Admin,
        }
    }

    pub fn application(id: i32, owner: &AuthenticatedUser, status: ApplicationStatus) -> VisaApplication {
        VisaApplication {
            id: Some(ApplicationId::new(id).unwrap()),
            public_id: PublicId::new(),
            user_id: owner.id.clone(),
            application_number: ApplicationNumber::new("EVS-M3K2J1QZ-4F7A9C").unwrap(),
            status,
            visa_type_id: None,
            current_step: 1,
            created_at: now(),
            updated_at: now(),
            submitted_at: None,
            processed_at: None,
            approved_at: None,
            general_info: None,
            passport_info: None,
            traveler_info: None,
            attachments: Vec::new(),
            histories: Vec::new(),
        }
    }

    pub fn general_form() -> GeneralInfoForm {
        GeneralInfoForm {
            email: "awa@example.com".into(),
            phone: "+222 22 12 34 56".into(),
            arrival_date: "2026-12-01".into(),
            number_of_entries: "double".into(),
            address_in_mauritania: "Tevragh Zeina, Nouakchott".into(),
            purpose_description: "Visiting family and attending a wedding in Nouakchott.".into(),
            ..GeneralInfoForm::default()
        }
    }

    pub fn passport_form() -> PassportInfoForm {
        PassportInfoForm {
            document_number: "A1234567".into(),
            issue_date: "2022-01-10".into(),
            expiry_date: "2032-01-09".into(),
            place_of_issue: "Dakar".into(),
            ..PassportInfoForm::default()
        }
    }

    pub fn traveler_form() -> TravelerInfoForm {
        TravelerInfoForm {
            first_name: "Awa".into(),
            last_name: "Diallo".into(),
            birth_date: "1990-05-20".into(),
            birth_place: "Dakar".into(),
            nationality: "Senegalese".into(),
            marital_status: "single".into(),
            occupation: "Engineer".into(),
            ..TravelerInfoForm::default()
        }
    }
}
