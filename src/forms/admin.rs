//! Query and body forms of the admin dashboard API.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::application::{ApplicationStatus, StatusChange};
use crate::domain::types::PublicId;
use crate::forms::FormError;
use crate::forms::draft::parse_application_id;

pub const DEFAULT_PAGE_SIZE: usize = 20;

#[derive(Debug, Default, Deserialize, Serialize, Validate)]
/// Query string of `GET /api/admin/applications`.
pub struct ApplicationsQuery {
    /// A status name, or `all`.
    pub status: Option<String>,
    #[validate(length(max = 100))]
    pub search: Option<String>,
    #[validate(range(min = 1))]
    pub page: Option<usize>,
    #[validate(range(min = 1, max = 100))]
    pub limit: Option<usize>,
}

/// Validated listing filter handed to the repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplicationsFilter {
    pub status: Option<ApplicationStatus>,
    pub search: Option<String>,
    pub page: usize,
    pub limit: usize,
}

impl TryFrom<ApplicationsQuery> for ApplicationsFilter {
    type Error = FormError;

    fn try_from(query: ApplicationsQuery) -> Result<Self, Self::Error> {
        query.validate()?;

        let status = match query.status.as_deref().map(str::trim) {
            None | Some("") | Some("all") => None,
            Some(value) => Some(
                value
                    .parse::<ApplicationStatus>()
                    .map_err(|_| FormError::InvalidStatus)?,
            ),
        };
        let search = query
            .search
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        Ok(Self {
            status,
            search,
            page: query.page.unwrap_or(1),
            limit: query.limit.unwrap_or(DEFAULT_PAGE_SIZE),
        })
    }
}

#[derive(Debug, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
/// Body of `PUT /api/admin/update-status`.
pub struct UpdateStatusForm {
    pub application_id: String,
    #[validate(length(min = 1))]
    pub status: String,
    #[validate(length(max = 1000))]
    pub comment: Option<String>,
}

impl UpdateStatusForm {
    /// Resolves the target application and the requested change made by
    /// `agent_id`.
    pub fn into_change(self, agent_id: &str) -> Result<(PublicId, StatusChange), FormError> {
        self.validate()?;

        let application_id = parse_application_id(Some(&self.application_id))?;
        let status = self
            .status
            .trim()
            .parse::<ApplicationStatus>()
            .ok()
            .filter(|status| ApplicationStatus::REVIEWABLE.contains(status))
            .ok_or(FormError::InvalidStatus)?;
        let comment = self
            .comment
            .map(|c| ammonia::clean(c.trim()))
            .filter(|c| !c.is_empty());

        Ok((
            application_id,
            StatusChange {
                status,
                comment,
                agent_id: Some(agent_id.to_string()),
            },
        ))
    }
}
