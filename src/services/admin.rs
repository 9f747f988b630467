//! Admin dashboard: filtered listing, counters and status transitions.

use chrono::{Duration, NaiveDateTime};

use crate::domain::auth::AuthenticatedUser;
use crate::dto::application::{AdminApplicationsPage, StatsResponse, StatusUpdated};
use crate::forms::admin::{ApplicationsFilter, ApplicationsQuery, UpdateStatusForm};
use crate::pagination::Paginated;
use crate::repository::{ApplicationListQuery, ApplicationReader, ApplicationWriter};
use crate::services::{ServiceError, ServiceResult, ensure_admin};

/// Window of the "recent applications" counter.
pub const RECENT_WINDOW_DAYS: i64 = 7;

pub fn list_applications<R>(
    repo: &R,
    user: &AuthenticatedUser,
    query: ApplicationsQuery,
) -> ServiceResult<AdminApplicationsPage>
where
    R: ApplicationReader + ?Sized,
{
    ensure_admin(user)?;

    let filter = ApplicationsFilter::try_from(query)?;

    let mut list_query = ApplicationListQuery::new().paginate(filter.page, filter.limit);
    if let Some(status) = filter.status {
        list_query = list_query.status(status);
    }
    if let Some(term) = filter.search {
        list_query = list_query.search(term);
    }

    let (total, applications) = repo.list_applications(list_query).map_err(|err| {
        log::error!("Failed to list applications: {err}");
        err
    })?;

    Ok(Paginated::new(applications, filter.page, filter.limit, total).into())
}

pub fn stats<R>(repo: &R, user: &AuthenticatedUser, now: NaiveDateTime) -> ServiceResult<StatsResponse>
where
    R: ApplicationReader + ?Sized,
{
    ensure_admin(user)?;

    let stats = repo.application_stats(now - Duration::days(RECENT_WINDOW_DAYS))?;

    Ok(StatsResponse { stats })
}

/// Moves an application to a new status on behalf of the calling agent and
/// records the change in its history.
pub fn update_status<R>(
    repo: &R,
    user: &AuthenticatedUser,
    form: UpdateStatusForm,
) -> ServiceResult<StatusUpdated>
where
    R: ApplicationReader + ApplicationWriter + ?Sized,
{
    ensure_admin(user)?;

    let (public_id, mut change) = form.into_change(user.id.as_str())?;

    let application = repo
        .get_application_by_public_id(public_id)?
        .ok_or(ServiceError::NotFound)?;

    if change.comment.is_none() {
        let agent = user.name.as_deref().unwrap_or(user.email.as_str());
        change.comment = Some(format!("Statut changé par l'administrateur {agent}"));
    }

    let previous = application.status;
    let application = repo
        .change_status(application.row_id()?, &change)
        .map_err(|err| {
            log::error!(
                "Failed to change status of {}: {err}",
                application.application_number
            );
            err
        })?;
    log::info!(
        "Application {} moved from {previous} to {} by {}",
        application.application_number,
        application.status,
        user.id
    );

    Ok(StatusUpdated {
        success: true,
        message: "Statut mis à jour avec succès".to_string(),
        application,
    })
}
