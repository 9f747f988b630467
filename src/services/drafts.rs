//! Per-step draft saves issued by the wizard's "Next" button.

use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use crate::domain::application::{ApplicationStatus, NewApplication, SectionUpdate, VisaApplication};
use crate::domain::auth::AuthenticatedUser;
use crate::domain::idempotency::IdempotentOperation;
use crate::domain::types::ApplicationNumber;
use crate::dto::application::DraftSaved;
use crate::forms::draft::{
    SaveGeneralDraft, SavePassportDraft, SaveTravelerDraft, parse_application_id,
};
use crate::repository::{
    ApplicationReader, ApplicationWriter, IdempotencyReader, IdempotencyWriter,
};
use crate::services::{ServiceError, ServiceResult, load_owned, remember, replayed};

const DRAFT_SAVED: &str = "Draft saved successfully";

fn draft_saved(application: &VisaApplication, step: u8) -> DraftSaved {
    DraftSaved {
        success: true,
        message: DRAFT_SAVED.to_string(),
        application_id: application.public_id.to_string(),
        application_number: application.application_number.to_string(),
        step,
    }
}

fn ensure_draft(application: &VisaApplication) -> ServiceResult<()> {
    if application.status == ApplicationStatus::Draft {
        Ok(())
    } else {
        Err(ServiceError::Conflict(
            "Application has already been submitted".to_string(),
        ))
    }
}

/// Stores `update` on the application and remembers the idempotency key.
fn store_step<R>(
    repo: &R,
    user: &AuthenticatedUser,
    application: &VisaApplication,
    update: &SectionUpdate,
    key: Option<Uuid>,
    operation: IdempotentOperation,
) -> ServiceResult<VisaApplication>
where
    R: ApplicationWriter + IdempotencyWriter + ?Sized,
{
    let id = application.row_id()?;
    let saved = repo.save_sections(id, update).map_err(|err| {
        log::error!("Failed to save {operation} for {}: {err}", application.public_id);
        err
    })?;
    remember(repo, user, key, operation, id)?;
    Ok(saved)
}

/// Saves step 1. Reuses the caller's open draft, or starts a new one.
pub fn save_general_draft<R>(
    repo: &R,
    user: &AuthenticatedUser,
    form: SaveGeneralDraft,
    today: NaiveDate,
) -> ServiceResult<DraftSaved>
where
    R: ApplicationReader + ApplicationWriter + IdempotencyReader + IdempotencyWriter + ?Sized,
{
    let operation = IdempotentOperation::GeneralDraft;
    let general_info = form.general_info.to_domain(today)?;

    let application = match replayed(repo, user, form.idempotency_key, operation)? {
        Some(application) => application,
        None => match repo.find_draft_for_user(&user.id)? {
            Some(draft) => draft,
            None => {
                let number = ApplicationNumber::generate(Utc::now().timestamp_millis());
                let created = repo.create_application(&NewApplication::draft(user.id.clone(), number))?;
                log::info!(
                    "Started draft {} for user {}",
                    created.application_number,
                    user.id
                );
                created
            }
        },
    };
    ensure_draft(&application)?;

    let update = SectionUpdate {
        general_info: Some(general_info),
        visa_type_id: form.visa_type_id.filter(|v| !v.trim().is_empty()),
        current_step: Some(form.step),
        ..SectionUpdate::default()
    };
    let saved = store_step(repo, user, &application, &update, form.idempotency_key, operation)?;

    Ok(draft_saved(&saved, form.step))
}

/// Resolves the draft a later step belongs to, from the replayed key or the
/// id the client sent.
fn existing_draft<R>(
    repo: &R,
    user: &AuthenticatedUser,
    application_id: Option<&str>,
    key: Option<Uuid>,
    operation: IdempotentOperation,
) -> ServiceResult<VisaApplication>
where
    R: ApplicationReader + IdempotencyReader + ?Sized,
{
    let application = match replayed(repo, user, key, operation)? {
        Some(application) => application,
        None => load_owned(repo, user, parse_application_id(application_id)?)?,
    };
    ensure_draft(&application)?;
    Ok(application)
}

/// Saves step 2 on an existing draft.
pub fn save_passport_draft<R>(
    repo: &R,
    user: &AuthenticatedUser,
    form: SavePassportDraft,
    today: NaiveDate,
) -> ServiceResult<DraftSaved>
where
    R: ApplicationReader + ApplicationWriter + IdempotencyReader + IdempotencyWriter + ?Sized,
{
    let operation = IdempotentOperation::PassportDraft;
    let passport_info = form.passport_info.to_domain(today)?;
    let application = existing_draft(
        repo,
        user,
        form.application_id.as_deref(),
        form.idempotency_key,
        operation,
    )?;

    let update = SectionUpdate {
        passport_info: Some(passport_info),
        current_step: Some(form.step),
        ..SectionUpdate::default()
    };
    let saved = store_step(repo, user, &application, &update, form.idempotency_key, operation)?;

    Ok(draft_saved(&saved, form.step))
}

/// Saves step 3 on an existing draft.
pub fn save_traveler_draft<R>(
    repo: &R,
    user: &AuthenticatedUser,
    form: SaveTravelerDraft,
    today: NaiveDate,
) -> ServiceResult<DraftSaved>
where
    R: ApplicationReader + ApplicationWriter + IdempotencyReader + IdempotencyWriter + ?Sized,
{
    let operation = IdempotentOperation::TravelerDraft;
    let traveler_info = form.traveler_info.to_domain(today)?;
    let application = existing_draft(
        repo,
        user,
        form.application_id.as_deref(),
        form.idempotency_key,
        operation,
    )?;

    let update = SectionUpdate {
        traveler_info: Some(traveler_info),
        current_step: Some(form.step),
        ..SectionUpdate::default()
    };
    let saved = store_step(repo, user, &application, &update, form.idempotency_key, operation)?;

    Ok(draft_saved(&saved, form.step))
}

#[cfg(all(test, feature = "test-mocks"))]
mod tests {
    use super::*;
    use crate::domain::idempotency::IdempotencyRecord;
    use crate::domain::types::ApplicationId;
    use crate::repository::mock::MockRepository;
    use crate::services::test_support::{
        admin, applicant, application, general_form, passport_form, today, traveler_form,
    };

    fn general(key: Option<Uuid>) -> SaveGeneralDraft {
        SaveGeneralDraft {
            general_info: general_form(),
            step: 1,
            visa_type_id: Some("tourist-30".into()),
            idempotency_key: key,
        }
    }

    #[test]
    fn first_step_creates_a_draft_and_records_the_key() {
        let user = applicant();
        let draft = application(7, &user, ApplicationStatus::Draft);
        let public_id = draft.public_id;
        let key = Uuid::new_v4();

        let mut repo = MockRepository::new();
        repo.expect_find_idempotency_key().returning(|_| Ok(None));
        repo.expect_find_draft_for_user().returning(|_| Ok(None));
        let created = draft.clone();
        repo.expect_create_application()
            .withf(|new| new.status == ApplicationStatus::Draft && new.user_id.as_str() == "user-1")
            .times(1)
            .returning(move |_| Ok(created.clone()));
        let saved = draft.clone();
        repo.expect_save_sections()
            .withf(|id, update| {
                id.get() == 7
                    && update.general_info.is_some()
                    && update.passport_info.is_none()
                    && update.visa_type_id.as_deref() == Some("tourist-30")
            })
            .times(1)
            .returning(move |_, _| Ok(saved.clone()));
        repo.expect_record_idempotency_key()
            .withf(move |record| {
                record.key == key
                    && record.operation == IdempotentOperation::GeneralDraft
                    && record.application_id.get() == 7
            })
            .times(1)
            .returning(|_| Ok(()));

        let reply = save_general_draft(&repo, &user, general(Some(key)), today()).unwrap();
        assert!(reply.success);
        assert_eq!(reply.message, "Draft saved successfully");
        assert_eq!(reply.application_id, public_id.to_string());
        assert_eq!(reply.step, 1);
    }

    #[test]
    fn first_step_reuses_the_open_draft() {
        let user = applicant();
        let draft = application(3, &user, ApplicationStatus::Draft);

        let mut repo = MockRepository::new();
        let existing = draft.clone();
        repo.expect_find_draft_for_user()
            .returning(move |_| Ok(Some(existing.clone())));
        repo.expect_create_application().never();
        repo.expect_record_idempotency_key().never();
        let saved = draft.clone();
        repo.expect_save_sections()
            .withf(|id, _| id.get() == 3)
            .returning(move |_, _| Ok(saved.clone()));

        let reply = save_general_draft(&repo, &user, general(None), today()).unwrap();
        assert_eq!(reply.application_id, draft.public_id.to_string());
    }

    #[test]
    fn replayed_key_returns_the_same_application() {
        let user = applicant();
        let draft = application(5, &user, ApplicationStatus::Draft);
        let key = Uuid::new_v4();

        let mut repo = MockRepository::new();
        repo.expect_find_idempotency_key().returning(move |key| {
            Ok(Some(IdempotencyRecord {
                key,
                user_id: applicant().id,
                operation: IdempotentOperation::GeneralDraft,
                application_id: ApplicationId::new(5).unwrap(),
            }))
        });
        let by_id = draft.clone();
        repo.expect_get_application_by_id()
            .returning(move |_| Ok(Some(by_id.clone())));
        repo.expect_find_draft_for_user().never();
        repo.expect_create_application().never();
        let saved = draft.clone();
        repo.expect_save_sections()
            .returning(move |_, _| Ok(saved.clone()));
        repo.expect_record_idempotency_key().returning(|_| Ok(()));

        let reply = save_general_draft(&repo, &user, general(Some(key)), today()).unwrap();
        assert_eq!(reply.application_id, draft.public_id.to_string());
    }

    #[test]
    fn key_of_another_user_is_a_conflict() {
        let user = applicant();
        let mut repo = MockRepository::new();
        repo.expect_find_idempotency_key().returning(|key| {
            Ok(Some(IdempotencyRecord {
                key,
                user_id: admin().id,
                operation: IdempotentOperation::GeneralDraft,
                application_id: ApplicationId::new(1).unwrap(),
            }))
        });
        repo.expect_save_sections().never();

        let result = save_general_draft(&repo, &user, general(Some(Uuid::new_v4())), today());
        assert!(matches!(result, Err(ServiceError::Conflict(_))));
    }

    #[test]
    fn invalid_first_step_is_rejected_before_storage() {
        let user = applicant();
        let mut form = general(None);
        form.general_info.email = "not-an-email".into();

        let mut repo = MockRepository::new();
        repo.expect_find_draft_for_user().never();
        repo.expect_save_sections().never();

        match save_general_draft(&repo, &user, form, today()) {
            Err(ServiceError::Validation(errors)) => {
                assert_eq!(errors.get("email").map(String::as_str), Some("validation.email_invalid"))
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn passport_step_requires_an_application_id() {
        let user = applicant();
        let repo = MockRepository::new();
        let form = SavePassportDraft {
            passport_info: passport_form(),
            application_id: None,
            step: 2,
            idempotency_key: None,
        };

        assert!(matches!(
            save_passport_draft(&repo, &user, form, today()),
            Err(ServiceError::Form(_))
        ));
    }

    #[test]
    fn passport_step_on_foreign_draft_is_not_found() {
        let user = applicant();
        let foreign = application(9, &admin(), ApplicationStatus::Draft);
        let public_id = foreign.public_id;

        let mut repo = MockRepository::new();
        repo.expect_get_application_by_public_id()
            .returning(move |_| Ok(Some(foreign.clone())));
        repo.expect_save_sections().never();

        let form = SavePassportDraft {
            passport_info: passport_form(),
            application_id: Some(public_id.to_string()),
            step: 2,
            idempotency_key: None,
        };
        assert!(matches!(
            save_passport_draft(&repo, &user, form, today()),
            Err(ServiceError::NotFound)
        ));
    }

    #[test]
    fn traveler_step_on_submitted_application_is_a_conflict() {
        let user = applicant();
        let pending = application(4, &user, ApplicationStatus::Pending);
        let public_id = pending.public_id;

        let mut repo = MockRepository::new();
        repo.expect_get_application_by_public_id()
            .returning(move |_| Ok(Some(pending.clone())));
        repo.expect_save_sections().never();

        let form = SaveTravelerDraft {
            traveler_info: traveler_form(),
            application_id: Some(public_id.to_string()),
            step: 3,
            idempotency_key: None,
        };
        assert!(matches!(
            save_traveler_draft(&repo, &user, form, today()),
            Err(ServiceError::Conflict(_))
        ));
    }

    #[test]
    fn traveler_step_saves_only_its_section() {
        let user = applicant();
        let draft = application(4, &user, ApplicationStatus::Draft);
        let public_id = draft.public_id;

        let mut repo = MockRepository::new();
        let found = draft.clone();
        repo.expect_get_application_by_public_id()
            .returning(move |_| Ok(Some(found.clone())));
        repo.expect_save_sections()
            .withf(|_, update| {
                update.traveler_info.is_some()
                    && update.general_info.is_none()
                    && update.current_step == Some(3)
            })
            .times(1)
            .returning(move |_, _| Ok(draft.clone()));

        let form = SaveTravelerDraft {
            traveler_info: traveler_form(),
            application_id: Some(public_id.to_string()),
            step: 3,
            idempotency_key: None,
        };
        let reply = save_traveler_draft(&repo, &user, form, today()).unwrap();
        assert_eq!(reply.step, 3);
    }
}
