//! Visa application aggregate and its per-step sections.

use std::fmt::Display;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::domain::attachment::Attachment;
use crate::domain::types::{
    ApplicantEmail, ApplicationId, ApplicationNumber, Occupation, PassportNumber, PersonName,
    PhoneNumber, PlaceName, PublicId, PurposeDescription, ShortLabel, StatusHistoryId,
    TypeConstraintError, UserId,
};

/// Lifecycle state of an application.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    Draft,
    Pending,
    Processing,
    Approved,
    Rejected,
    Cancelled,
}

impl ApplicationStatus {
    /// Statuses an administrator may assign.
    pub const REVIEWABLE: [ApplicationStatus; 5] = [
        ApplicationStatus::Pending,
        ApplicationStatus::Processing,
        ApplicationStatus::Approved,
        ApplicationStatus::Rejected,
        ApplicationStatus::Cancelled,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ApplicationStatus::Draft => "draft",
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::Processing => "processing",
            ApplicationStatus::Approved => "approved",
            ApplicationStatus::Rejected => "rejected",
            ApplicationStatus::Cancelled => "cancelled",
        }
    }

    /// Applicants may only edit a submitted application while it awaits
    /// review or after it was rejected.
    pub fn is_editable_by_applicant(self) -> bool {
        matches!(
            self,
            ApplicationStatus::Pending | ApplicationStatus::Rejected
        )
    }
}

impl Display for ApplicationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ApplicationStatus {
    type Err = TypeConstraintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(ApplicationStatus::Draft),
            "pending" => Ok(ApplicationStatus::Pending),
            "processing" => Ok(ApplicationStatus::Processing),
            "approved" => Ok(ApplicationStatus::Approved),
            "rejected" => Ok(ApplicationStatus::Rejected),
            "cancelled" => Ok(ApplicationStatus::Cancelled),
            other => Err(TypeConstraintError::InvalidValue(format!(
                "unknown status: {other}"
            ))),
        }
    }
}

/// Generates a closed, string-backed select-list enum.
macro_rules! select_enum {
    ($name:ident { $($variant:ident => $value:literal),+ $(,)? }) => {
        #[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
        pub enum $name {
            $(
                #[serde(rename = $value)]
                $variant,
            )+
        }

        impl $name {
            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $value,)+
                }
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = TypeConstraintError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($value => Ok($name::$variant),)+
                    other => Err(TypeConstraintError::InvalidValue(format!(
                        concat!("unknown ", stringify!($name), ": {}"),
                        other
                    ))),
                }
            }
        }
    };
}

select_enum!(TravelPurpose {
    Tourism => "tourism",
    Business => "business",
    Family => "family",
    Medical => "medical",
    CultureSports => "culture-sports",
    Other => "other",
});

select_enum!(NumberOfEntries {
    Double => "double",
    Multiple => "multiple",
});

select_enum!(PassportType {
    Standard => "standard",
    Service => "service",
    Diplomatic => "diplomatic",
});

select_enum!(Title {
    Mr => "mr",
    Mrs => "mrs",
    Ms => "ms",
});

/// Step 1 data as stored for an application.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GeneralInfo {
    pub email: ApplicantEmail,
    pub phone: PhoneNumber,
    pub travel_purpose: TravelPurpose,
    pub arrival_date: NaiveDate,
    pub number_of_entries: NumberOfEntries,
    pub address_in_mauritania: PlaceName,
    pub purpose_description: PurposeDescription,
}

/// Step 2 data as stored for an application.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PassportInfo {
    pub document_number: PassportNumber,
    pub document_type: PassportType,
    pub issue_date: NaiveDate,
    pub expiry_date: NaiveDate,
    pub place_of_issue: PlaceName,
}

/// Step 3 data as stored for an application.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TravelerInfo {
    pub title: Title,
    pub first_name: PersonName,
    pub last_name: PersonName,
    pub birth_date: NaiveDate,
    pub birth_place: PlaceName,
    pub nationality: ShortLabel,
    pub gender: ShortLabel,
    pub marital_status: ShortLabel,
    pub occupation: Occupation,
}

/// Audit record of a status transition.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StatusHistory {
    pub id: StatusHistoryId,
    pub application_id: ApplicationId,
    pub previous_status: Option<ApplicationStatus>,
    pub new_status: ApplicationStatus,
    pub comment: Option<String>,
    pub agent_id: Option<String>,
    pub changed_at: NaiveDateTime,
}

#[derive(Clone, Debug)]
pub struct NewStatusHistory {
    pub application_id: ApplicationId,
    pub previous_status: Option<ApplicationStatus>,
    pub new_status: ApplicationStatus,
    pub comment: Option<String>,
    pub agent_id: Option<String>,
}

/// Application header row with its optional sections.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VisaApplication {
    #[serde(skip)]
    pub id: Option<ApplicationId>,
    #[serde(rename = "id")]
    pub public_id: PublicId,
    pub user_id: UserId,
    pub application_number: ApplicationNumber,
    pub status: ApplicationStatus,
    pub visa_type_id: Option<String>,
    pub current_step: u8,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
    pub submitted_at: Option<NaiveDateTime>,
    pub processed_at: Option<NaiveDateTime>,
    pub approved_at: Option<NaiveDateTime>,
    pub general_info: Option<GeneralInfo>,
    pub passport_info: Option<PassportInfo>,
    pub traveler_info: Option<TravelerInfo>,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    #[serde(default)]
    pub histories: Vec<StatusHistory>,
}

impl VisaApplication {
    /// Internal row id; every application loaded from storage carries one.
    pub fn row_id(&self) -> Result<ApplicationId, TypeConstraintError> {
        self.id.ok_or(TypeConstraintError::NonPositiveId)
    }
}

/// Values for inserting a fresh application header.
#[derive(Clone, Debug)]
pub struct NewApplication {
    pub public_id: PublicId,
    pub user_id: UserId,
    pub application_number: ApplicationNumber,
    pub status: ApplicationStatus,
    pub visa_type_id: Option<String>,
    pub current_step: u8,
}

impl NewApplication {
    #[must_use]
    pub fn draft(user_id: UserId, application_number: ApplicationNumber) -> Self {
        Self {
            public_id: PublicId::new(),
            user_id,
            application_number,
            status: ApplicationStatus::Draft,
            visa_type_id: None,
            current_step: 1,
        }
    }
}

/// Sections to store on an existing application. `None` leaves the stored
/// value untouched.
#[derive(Clone, Debug, Default)]
pub struct SectionUpdate {
    pub general_info: Option<GeneralInfo>,
    pub passport_info: Option<PassportInfo>,
    pub traveler_info: Option<TravelerInfo>,
    pub visa_type_id: Option<String>,
    pub current_step: Option<u8>,
}

impl SectionUpdate {
    /// True when the update carries all three wizard sections.
    pub fn is_complete(&self) -> bool {
        self.general_info.is_some() && self.passport_info.is_some() && self.traveler_info.is_some()
    }
}

/// Status change requested by an administrator.
#[derive(Clone, Debug)]
pub struct StatusChange {
    pub status: ApplicationStatus,
    pub comment: Option<String>,
    pub agent_id: Option<String>,
}

/// Counters shown on the admin dashboard.
#[derive(Clone, Debug, Default, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationStats {
    pub total_applications: i64,
    pub pending_applications: i64,
    pub processing_applications: i64,
    pub approved_applications: i64,
    pub rejected_applications: i64,
    pub total_users: i64,
    pub recent_applications: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_round_trips_through_strings() {
        for status in ApplicationStatus::REVIEWABLE {
            assert_eq!(status.as_str().parse::<ApplicationStatus>(), Ok(status));
        }
        assert!("archived".parse::<ApplicationStatus>().is_err());
    }

    #[test]
    fn only_pending_and_rejected_are_editable() {
        assert!(ApplicationStatus::Pending.is_editable_by_applicant());
        assert!(ApplicationStatus::Rejected.is_editable_by_applicant());
        assert!(!ApplicationStatus::Approved.is_editable_by_applicant());
        assert!(!ApplicationStatus::Draft.is_editable_by_applicant());
    }

    #[test]
    fn select_enums_parse_form_values() {
        assert_eq!(
            "culture-sports".parse::<TravelPurpose>(),
            Ok(TravelPurpose::CultureSports)
        );
        assert_eq!("multiple".parse::<NumberOfEntries>(), Ok(NumberOfEntries::Multiple));
        assert_eq!(PassportType::Diplomatic.to_string(), "diplomatic");
        assert!("sir".parse::<Title>().is_err());
    }

    #[test]
    fn number_of_entries_has_no_single_option() {
        assert_eq!("double".parse::<NumberOfEntries>(), Ok(NumberOfEntries::Double));
        assert!("single".parse::<NumberOfEntries>().is_err());
    }
}
