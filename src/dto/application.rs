use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::application::{ApplicationStats, VisaApplication};
use crate::domain::attachment::Attachment;

/// Error body returned by every failing endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorBody {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<BTreeMap<String, String>>,
}

impl ErrorBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            errors: None,
        }
    }
}

/// Reply to any of the three step-draft endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DraftSaved {
    pub success: bool,
    pub message: String,
    pub application_id: String,
    pub application_number: String,
    pub step: u8,
}

/// Reply to `POST /api/visa-application/create`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationCreated {
    pub success: bool,
    pub message: String,
    pub application_id: String,
    pub application_number: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AttachmentUploaded {
    pub success: bool,
    pub message: String,
    pub attachment: Attachment,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApplicationList {
    pub applications: Vec<VisaApplication>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApplicationDetail {
    pub application: VisaApplication,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub page: usize,
    pub limit: usize,
    pub total: usize,
    pub total_pages: usize,
}

/// One page of the admin listing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AdminApplicationsPage {
    pub applications: Vec<VisaApplication>,
    pub pagination: PageInfo,
    /// Page links with `null` gaps, as rendered by the dashboard pager.
    pub links: Vec<Option<usize>>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct StatsResponse {
    pub stats: ApplicationStats,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StatusUpdated {
    pub success: bool,
    pub message: String,
    pub application: VisaApplication,
}
