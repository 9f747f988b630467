//! Applicant-side submission, listing and editing.

use chrono::{NaiveDate, Utc};

use crate::domain::application::{
    ApplicationStatus, NewApplication, SectionUpdate, StatusChange, VisaApplication,
};
use crate::domain::auth::AuthenticatedUser;
use crate::domain::idempotency::IdempotentOperation;
use crate::domain::types::ApplicationNumber;
use crate::dto::application::{ApplicationCreated, ApplicationDetail, ApplicationList};
use crate::forms::draft::{CreateApplication, UpdateApplication, parse_application_id};
use crate::forms::steps::Step;
use crate::repository::{
    ApplicationListQuery, ApplicationReader, ApplicationWriter, IdempotencyReader,
    IdempotencyWriter,
};
use crate::services::{ServiceError, ServiceResult, load_owned, remember, replayed};

pub const SUBMITTED_COMMENT: &str = "Application submitted";

fn created(application: &VisaApplication) -> ApplicationCreated {
    ApplicationCreated {
        success: true,
        message: "Visa application created successfully".to_string(),
        application_id: application.public_id.to_string(),
        application_number: application.application_number.to_string(),
    }
}

/// Picks the draft being submitted: the one named by the client, else the
/// caller's open draft, else a fresh record.
fn submission_target<R>(
    repo: &R,
    user: &AuthenticatedUser,
    application_id: Option<&str>,
) -> ServiceResult<VisaApplication>
where
    R: ApplicationReader + ApplicationWriter + ?Sized,
{
    let named = application_id.map(str::trim).filter(|id| !id.is_empty());
    let target = match named {
        Some(id) => Some(load_owned(repo, user, parse_application_id(Some(id))?)?),
        None => repo.find_draft_for_user(&user.id)?,
    };
    match target {
        Some(application) if application.status == ApplicationStatus::Draft => Ok(application),
        Some(_) => Err(ServiceError::Conflict(
            "Application has already been submitted".to_string(),
        )),
        None => {
            let number = ApplicationNumber::generate(Utc::now().timestamp_millis());
            Ok(repo.create_application(&NewApplication::draft(user.id.clone(), number))?)
        }
    }
}

/// Final submission: stores every section and moves the application to
/// `pending`. Replaying the same key returns the original result.
pub fn create_application<R>(
    repo: &R,
    user: &AuthenticatedUser,
    form: CreateApplication,
    today: NaiveDate,
) -> ServiceResult<ApplicationCreated>
where
    R: ApplicationReader + ApplicationWriter + IdempotencyReader + IdempotencyWriter + ?Sized,
{
    let operation = IdempotentOperation::Submit;
    if let Some(application) = replayed(repo, user, form.idempotency_key, operation)? {
        return Ok(created(&application));
    }

    let update = SectionUpdate {
        general_info: Some(form.general_info.to_domain(today)?),
        passport_info: Some(form.passport_info.to_domain(today)?),
        traveler_info: Some(form.traveler_info.to_domain(today)?),
        visa_type_id: form.visa_type_id.filter(|v| !v.trim().is_empty()),
        current_step: Some(Step::LAST.number()),
    };

    let target = submission_target(repo, user, form.application_id.as_deref())?;
    let id = target.row_id()?;
    let change = StatusChange {
        status: ApplicationStatus::Pending,
        comment: Some(SUBMITTED_COMMENT.to_string()),
        agent_id: None,
    };
    let submitted = repo.submit_application(id, &update, &change).map_err(|err| {
        log::error!("Failed to submit application {}: {err}", target.application_number);
        err
    })?;
    remember(repo, user, form.idempotency_key, operation, id)?;

    log::info!(
        "Application {} submitted by user {}",
        submitted.application_number,
        user.id
    );
    Ok(created(&submitted))
}

/// The caller's applications, newest first, each with its latest status
/// entry only.
pub fn list_applications<R>(repo: &R, user: &AuthenticatedUser) -> ServiceResult<ApplicationList>
where
    R: ApplicationReader + ?Sized,
{
    let (_total, mut applications) =
        repo.list_applications(ApplicationListQuery::new().user(user.id.clone()))?;
    for application in &mut applications {
        application.histories.truncate(1);
    }
    Ok(ApplicationList { applications })
}

/// One application with its full history. Administrators may read any
/// application.
pub fn get_application<R>(
    repo: &R,
    user: &AuthenticatedUser,
    application_id: &str,
) -> ServiceResult<ApplicationDetail>
where
    R: ApplicationReader + ?Sized,
{
    let public_id = parse_application_id(Some(application_id))?;
    let application = repo
        .get_application_by_public_id(public_id)?
        .filter(|application| user.is_admin() || application.user_id == user.id)
        .ok_or(ServiceError::NotFound)?;
    Ok(ApplicationDetail { application })
}

/// Applicant edit of a submitted application, allowed while it is pending
/// or after a rejection.
pub fn update_application<R>(
    repo: &R,
    user: &AuthenticatedUser,
    application_id: &str,
    form: UpdateApplication,
    today: NaiveDate,
) -> ServiceResult<ApplicationDetail>
where
    R: ApplicationReader + ApplicationWriter + ?Sized,
{
    let application = load_owned(repo, user, parse_application_id(Some(application_id))?)?;
    if !application.status.is_editable_by_applicant() {
        return Err(ServiceError::Conflict(format!(
            "Application cannot be modified while {}",
            application.status
        )));
    }

    let update = SectionUpdate {
        general_info: form
            .general_info
            .map(|info| info.to_domain(today))
            .transpose()?,
        passport_info: form
            .passport_info
            .map(|info| info.to_domain(today))
            .transpose()?,
        traveler_info: form
            .traveler_info
            .map(|info| info.to_domain(today))
            .transpose()?,
        visa_type_id: form.visa_type_id.filter(|v| !v.trim().is_empty()),
        current_step: None,
    };

    let application = repo.save_sections(application.row_id()?, &update)?;
    Ok(ApplicationDetail { application })
}

#[cfg(all(test, feature = "test-mocks"))]
mod tests {
    use uuid::Uuid;

    use super::*;
    use crate::domain::application::StatusHistory;
    use crate::domain::idempotency::IdempotencyRecord;
    use crate::domain::types::{ApplicationId, StatusHistoryId};
    use crate::repository::mock::MockRepository;
    use crate::services::test_support::{
        admin, applicant, application, general_form, now, passport_form, today, traveler_form,
    };

    fn create_form(application_id: Option<String>, key: Option<Uuid>) -> CreateApplication {
        CreateApplication {
            application_id,
            general_info: general_form(),
            passport_info: passport_form(),
            traveler_info: traveler_form(),
            visa_type_id: None,
            idempotency_key: key,
        }
    }

    fn history(id: i32, status: ApplicationStatus) -> StatusHistory {
        StatusHistory {
            id: StatusHistoryId::new(id).unwrap(),
            application_id: ApplicationId::new(1).unwrap(),
            previous_status: None,
            new_status: status,
            comment: None,
            agent_id: None,
            changed_at: now(),
        }
    }

    #[test]
    fn submit_promotes_the_named_draft() {
        let user = applicant();
        let draft = application(2, &user, ApplicationStatus::Draft);
        let public_id = draft.public_id;
        let key = Uuid::new_v4();

        let mut repo = MockRepository::new();
        repo.expect_find_idempotency_key().returning(|_| Ok(None));
        let found = draft.clone();
        repo.expect_get_application_by_public_id()
            .returning(move |_| Ok(Some(found.clone())));
        repo.expect_create_application().never();
        let mut pending = draft.clone();
        pending.status = ApplicationStatus::Pending;
        repo.expect_submit_application()
            .withf(|id, update, change| {
                id.get() == 2
                    && update.is_complete()
                    && update.current_step == Some(6)
                    && change.status == ApplicationStatus::Pending
                    && change.comment.as_deref() == Some("Application submitted")
            })
            .times(1)
            .returning(move |_, _, _| Ok(pending.clone()));
        repo.expect_record_idempotency_key()
            .withf(|record| record.operation == IdempotentOperation::Submit)
            .times(1)
            .returning(|_| Ok(()));

        let reply = create_application(
            &repo,
            &user,
            create_form(Some(public_id.to_string()), Some(key)),
            today(),
        )
        .unwrap();
        assert_eq!(reply.message, "Visa application created successfully");
        assert_eq!(reply.application_id, public_id.to_string());
    }

    #[test]
    fn submit_without_draft_creates_one() {
        let user = applicant();
        let fresh = application(11, &user, ApplicationStatus::Draft);

        let mut repo = MockRepository::new();
        repo.expect_find_draft_for_user().returning(|_| Ok(None));
        let inserted = fresh.clone();
        repo.expect_create_application()
            .times(1)
            .returning(move |_| Ok(inserted.clone()));
        repo.expect_submit_application()
            .withf(|id, _, _| id.get() == 11)
            .times(1)
            .returning(move |_, _, _| Ok(fresh.clone()));

        assert!(create_application(&repo, &user, create_form(None, None), today()).is_ok());
    }

    #[test]
    fn submit_replay_skips_storage() {
        let user = applicant();
        let pending = application(2, &user, ApplicationStatus::Pending);
        let public_id = pending.public_id;

        let mut repo = MockRepository::new();
        repo.expect_find_idempotency_key().returning(|key| {
            Ok(Some(IdempotencyRecord {
                key,
                user_id: applicant().id,
                operation: IdempotentOperation::Submit,
                application_id: ApplicationId::new(2).unwrap(),
            }))
        });
        repo.expect_get_application_by_id()
            .returning(move |_| Ok(Some(pending.clone())));
        repo.expect_submit_application().never();
        repo.expect_record_idempotency_key().never();

        let reply = create_application(
            &repo,
            &user,
            create_form(Some(public_id.to_string()), Some(Uuid::new_v4())),
            today(),
        )
        .unwrap();
        assert_eq!(reply.application_id, public_id.to_string());
    }

    #[test]
    fn submitting_twice_without_key_is_a_conflict() {
        let user = applicant();
        let pending = application(2, &user, ApplicationStatus::Pending);
        let public_id = pending.public_id;

        let mut repo = MockRepository::new();
        repo.expect_get_application_by_public_id()
            .returning(move |_| Ok(Some(pending.clone())));
        repo.expect_submit_application().never();

        let result = create_application(
            &repo,
            &user,
            create_form(Some(public_id.to_string()), None),
            today(),
        );
        assert!(matches!(result, Err(ServiceError::Conflict(_))));
    }

    #[test]
    fn listing_keeps_only_the_latest_history_entry() {
        let user = applicant();
        let mut pending = application(2, &user, ApplicationStatus::Processing);
        pending.histories = vec![
            history(2, ApplicationStatus::Processing),
            history(1, ApplicationStatus::Pending),
        ];

        let mut repo = MockRepository::new();
        repo.expect_list_applications()
            .withf(|query| query.user_id.as_ref().map(|id| id.as_str()) == Some("user-1"))
            .returning(move |_| Ok((1, vec![pending.clone()])));

        let list = list_applications(&repo, &user).unwrap();
        assert_eq!(list.applications.len(), 1);
        assert_eq!(list.applications[0].histories.len(), 1);
        assert_eq!(
            list.applications[0].histories[0].new_status,
            ApplicationStatus::Processing
        );
    }

    #[test]
    fn detail_is_hidden_from_other_applicants_but_not_admins() {
        let owner = admin();
        let foreign = application(8, &owner, ApplicationStatus::Pending);
        let public_id = foreign.public_id.to_string();

        let mut repo = MockRepository::new();
        repo.expect_get_application_by_public_id()
            .returning(move |_| Ok(Some(foreign.clone())));

        assert!(matches!(
            get_application(&repo, &applicant(), &public_id),
            Err(ServiceError::NotFound)
        ));
        assert!(get_application(&repo, &admin(), &public_id).is_ok());
    }

    #[test]
    fn approved_application_cannot_be_edited() {
        let user = applicant();
        let approved = application(3, &user, ApplicationStatus::Approved);
        let public_id = approved.public_id.to_string();

        let mut repo = MockRepository::new();
        repo.expect_get_application_by_public_id()
            .returning(move |_| Ok(Some(approved.clone())));
        repo.expect_save_sections().never();

        let result = update_application(&repo, &user, &public_id, UpdateApplication::default(), today());
        assert!(matches!(result, Err(ServiceError::Conflict(_))));
    }

    #[test]
    fn rejected_application_accepts_a_partial_edit() {
        let user = applicant();
        let rejected = application(3, &user, ApplicationStatus::Rejected);
        let public_id = rejected.public_id.to_string();

        let mut repo = MockRepository::new();
        let found = rejected.clone();
        repo.expect_get_application_by_public_id()
            .returning(move |_| Ok(Some(found.clone())));
        repo.expect_save_sections()
            .withf(|_, update| {
                update.passport_info.is_some()
                    && update.general_info.is_none()
                    && update.current_step.is_none()
            })
            .times(1)
            .returning(move |_, _| Ok(rejected.clone()));

        let form = UpdateApplication {
            passport_info: Some(passport_form()),
            ..UpdateApplication::default()
        };
        assert!(update_application(&repo, &user, &public_id, form, today()).is_ok());
    }
}
