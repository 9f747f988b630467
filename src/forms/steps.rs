//! Wizard steps and the per-step validation pass.

use std::collections::BTreeSet;
use std::fmt::Display;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::forms::fields::{
    validate_address, validate_arrival_date, validate_birth_date, validate_birth_place,
    validate_description, validate_email, validate_expiry_date, validate_first_name,
    validate_gender, validate_issue_date, validate_last_name, validate_marital_status,
    validate_nationality, validate_occupation, validate_passport_number, validate_phone,
    validate_photo, validate_place_of_issue,
};
use crate::forms::wizard::{FormData, GeneralInfoForm, PassportInfoForm, TravelerInfoForm};
use crate::forms::{ErrorMap, Field};

/// One page of the wizard, numbered 1 to 6.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(try_from = "u8", into = "u8")]
pub enum Step {
    General = 1,
    Passport = 2,
    Traveler = 3,
    Photo = 4,
    Documents = 5,
    Review = 6,
}

/// Steps whose last validation passed.
pub type CompletedSteps = BTreeSet<Step>;

impl Step {
    pub const FIRST: Step = Step::General;
    pub const LAST: Step = Step::Review;

    pub fn number(self) -> u8 {
        self as u8
    }

    /// The following step, saturating at the review page.
    pub fn next(self) -> Step {
        Step::try_from(self.number() + 1).unwrap_or(Step::LAST)
    }

    /// The preceding step, saturating at the first page.
    pub fn previous(self) -> Step {
        Step::try_from(self.number().saturating_sub(1)).unwrap_or(Step::FIRST)
    }

    /// Steps 1 to 3 are saved to the server before the wizard moves on.
    pub fn is_synced(self) -> bool {
        matches!(self, Step::General | Step::Passport | Step::Traveler)
    }
}

impl TryFrom<u8> for Step {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Step::General),
            2 => Ok(Step::Passport),
            3 => Ok(Step::Traveler),
            4 => Ok(Step::Photo),
            5 => Ok(Step::Documents),
            6 => Ok(Step::Review),
            other => Err(format!("step out of range: {other}")),
        }
    }
}

impl From<Step> for u8 {
    fn from(step: Step) -> Self {
        step.number()
    }
}

impl Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.number())
    }
}

pub fn validate_general_info(
    info: &GeneralInfoForm,
    dial_code: Option<&str>,
    today: NaiveDate,
) -> ErrorMap {
    let mut errors = ErrorMap::new();
    errors.check(Field::Email, validate_email(&info.email));
    errors.check(Field::Phone, validate_phone(&info.phone, dial_code));
    errors.check(
        Field::ArrivalDate,
        validate_arrival_date(&info.arrival_date, today),
    );
    errors.check(
        Field::AddressInMauritania,
        validate_address(&info.address_in_mauritania),
    );
    errors.check(
        Field::PurposeDescription,
        validate_description(&info.purpose_description),
    );
    errors
}

pub fn validate_passport_info(info: &PassportInfoForm, today: NaiveDate) -> ErrorMap {
    let mut errors = ErrorMap::new();
    errors.check(
        Field::DocumentNumber,
        validate_passport_number(&info.document_number),
    );
    errors.check(Field::IssueDate, validate_issue_date(&info.issue_date, today));
    errors.check(
        Field::ExpiryDate,
        validate_expiry_date(&info.expiry_date, &info.issue_date, today),
    );
    errors.check(Field::PlaceOfIssue, validate_place_of_issue(&info.place_of_issue));
    errors
}

pub fn validate_traveler_info(info: &TravelerInfoForm, today: NaiveDate) -> ErrorMap {
    let mut errors = ErrorMap::new();
    errors.check(Field::FirstName, validate_first_name(&info.first_name));
    errors.check(Field::LastName, validate_last_name(&info.last_name));
    errors.check(Field::BirthDate, validate_birth_date(&info.birth_date, today));
    errors.check(Field::BirthPlace, validate_birth_place(&info.birth_place));
    errors.check(Field::Nationality, validate_nationality(&info.nationality));
    errors.check(Field::Gender, validate_gender(&info.gender));
    errors.check(
        Field::MaritalStatus,
        validate_marital_status(&info.marital_status),
    );
    errors.check(Field::Occupation, validate_occupation(&info.occupation));
    errors
}

/// Runs every validator that gates `step`. The step may be left when the
/// returned map is empty.
pub fn validate_step(step: Step, form: &FormData, today: NaiveDate) -> ErrorMap {
    match step {
        Step::General => validate_general_info(&form.general, form.dial_code(), today),
        Step::Passport => validate_passport_info(&form.passport, today),
        Step::Traveler => validate_traveler_info(&form.traveler, today),
        Step::Photo => {
            let mut errors = ErrorMap::new();
            errors.check(Field::Photo, validate_photo(form.photo.as_ref()));
            errors
        }
        Step::Documents | Step::Review => ErrorMap::new(),
    }
}
