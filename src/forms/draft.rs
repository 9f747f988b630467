//! JSON request bodies of the applicant API and their conversion into
//! domain values.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::application::{GeneralInfo, PassportInfo, TravelerInfo};
use crate::domain::types::{
    ApplicantEmail, Occupation, PassportNumber, PersonName, PhoneNumber, PlaceName, PublicId,
    PurposeDescription, ShortLabel, phone_dial_code,
};
use crate::forms::FormError;
use crate::forms::fields::parse_date;
use crate::forms::steps::{validate_general_info, validate_passport_info, validate_traveler_info};
use crate::forms::wizard::{GeneralInfoForm, PassportInfoForm, TravelerInfoForm};

/// Body of `POST /api/visa-application/save-draft`.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveGeneralDraft {
    pub general_info: GeneralInfoForm,
    pub step: u8,
    #[serde(default)]
    pub visa_type_id: Option<String>,
    #[serde(default)]
    pub idempotency_key: Option<Uuid>,
}

/// Body of `POST /api/visa-application/save-passport-draft`.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavePassportDraft {
    pub passport_info: PassportInfoForm,
    #[serde(default)]
    pub application_id: Option<String>,
    pub step: u8,
    #[serde(default)]
    pub idempotency_key: Option<Uuid>,
}

/// Body of `POST /api/visa-application/save-traveler-draft`.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveTravelerDraft {
    pub traveler_info: TravelerInfoForm,
    #[serde(default)]
    pub application_id: Option<String>,
    pub step: u8,
    #[serde(default)]
    pub idempotency_key: Option<Uuid>,
}

/// Body of `POST /api/visa-application/create`. When `application_id` names
/// the caller's draft, that draft is submitted instead of a new record.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateApplication {
    #[serde(default)]
    pub application_id: Option<String>,
    pub general_info: GeneralInfoForm,
    pub passport_info: PassportInfoForm,
    pub traveler_info: TravelerInfoForm,
    #[serde(default)]
    pub visa_type_id: Option<String>,
    #[serde(default)]
    pub idempotency_key: Option<Uuid>,
}

/// Body of `PUT /api/visa-application/{id}`; absent sections are left as is.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateApplication {
    #[serde(default)]
    pub general_info: Option<GeneralInfoForm>,
    #[serde(default)]
    pub passport_info: Option<PassportInfoForm>,
    #[serde(default)]
    pub traveler_info: Option<TravelerInfoForm>,
    #[serde(default)]
    pub visa_type_id: Option<String>,
}

/// Parses the draft id a client sent back, treating blank values as missing.
pub fn parse_application_id(value: Option<&str>) -> Result<PublicId, FormError> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or(FormError::InvalidApplicationId)?
        .parse()
        .map_err(|_| FormError::InvalidApplicationId)
}

fn date(value: &str) -> Result<NaiveDate, FormError> {
    parse_date(value).ok_or(FormError::MissingData)
}

impl GeneralInfoForm {
    /// Applies the wizard rules, deriving the dial code from the number
    /// itself, then builds the domain section.
    pub fn to_domain(&self, today: NaiveDate) -> Result<GeneralInfo, FormError> {
        let dial_code = phone_dial_code(&self.phone);
        let errors = validate_general_info(self, dial_code.as_deref(), today);
        if !errors.is_empty() {
            return Err(FormError::Fields(errors));
        }
        Ok(GeneralInfo {
            email: ApplicantEmail::new(self.email.as_str())?,
            phone: PhoneNumber::new(self.phone.as_str())?,
            travel_purpose: self.travel_purpose.parse()?,
            arrival_date: date(&self.arrival_date)?,
            number_of_entries: self.number_of_entries.parse()?,
            address_in_mauritania: PlaceName::new(self.address_in_mauritania.as_str())?,
            purpose_description: PurposeDescription::new(self.purpose_description.as_str())?,
        })
    }
}

impl PassportInfoForm {
    pub fn to_domain(&self, today: NaiveDate) -> Result<PassportInfo, FormError> {
        let errors = validate_passport_info(self, today);
        if !errors.is_empty() {
            return Err(FormError::Fields(errors));
        }
        Ok(PassportInfo {
            document_number: PassportNumber::new(self.document_number.as_str())?,
            document_type: self.document_type.parse()?,
            issue_date: date(&self.issue_date)?,
            expiry_date: date(&self.expiry_date)?,
            place_of_issue: PlaceName::new(self.place_of_issue.as_str())?,
        })
    }
}

impl TravelerInfoForm {
    pub fn to_domain(&self, today: NaiveDate) -> Result<TravelerInfo, FormError> {
        let errors = validate_traveler_info(self, today);
        if !errors.is_empty() {
            return Err(FormError::Fields(errors));
        }
        Ok(TravelerInfo {
            title: self.title.parse()?,
            first_name: PersonName::new(self.first_name.as_str())?,
            last_name: PersonName::new(self.last_name.as_str())?,
            birth_date: date(&self.birth_date)?,
            birth_place: PlaceName::new(self.birth_place.as_str())?,
            nationality: ShortLabel::new(self.nationality.as_str())?,
            gender: ShortLabel::new(self.gender.as_str())?,
            marital_status: ShortLabel::new(self.marital_status.as_str())?,
            occupation: Occupation::new(self.occupation.as_str())?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::application::{NumberOfEntries, Title};
    use crate::forms::Field;
    use crate::forms::fields::{calendar_today, validate_arrival_date};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
    }

    fn general() -> GeneralInfoForm {
        GeneralInfoForm {
            email: "Awa@Example.com".into(),
            phone: "+222 22 12 34 56".into(),
            arrival_date: "2026-12-01".into(),
            number_of_entries: "multiple".into(),
            address_in_mauritania: "Tevragh Zeina, Nouakchott".into(),
            purpose_description: "Visiting family and attending a wedding in Nouakchott.".into(),
            ..GeneralInfoForm::default()
        }
    }

    #[test]
    fn general_info_converts_to_domain() {
        let info = general().to_domain(today()).unwrap();
        assert_eq!(info.email.as_str(), "awa@example.com");
        assert_eq!(info.phone.as_str(), "+22222123456");
        assert_eq!(info.number_of_entries, NumberOfEntries::Multiple);
    }

    #[test]
    fn arrival_on_the_shared_calendar_day_is_accepted() {
        let day = calendar_today();
        let mut form = general();
        form.arrival_date = day.format("%Y-%m-%d").to_string();
        assert_eq!(validate_arrival_date(&form.arrival_date, day), None);
        let info = form.to_domain(day).unwrap();
        assert_eq!(info.arrival_date, day);
    }

    #[test]
    fn invalid_general_info_reports_field_errors() {
        let mut form = general();
        form.purpose_description = "too short".into();
        match form.to_domain(today()) {
            Err(FormError::Fields(errors)) => assert_eq!(
                errors.get(Field::PurposeDescription),
                Some("validation.description_min_length")
            ),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn unknown_select_value_is_rejected() {
        let mut form = general();
        form.travel_purpose = "smuggling".into();
        assert!(matches!(
            form.to_domain(today()),
            Err(FormError::TypeConstraint(_))
        ));
    }

    #[test]
    fn traveler_info_uses_default_title() {
        let form = TravelerInfoForm {
            first_name: "Awa".into(),
            last_name: "Diallo".into(),
            birth_date: "1990-05-20".into(),
            birth_place: "Dakar".into(),
            nationality: "Senegalese".into(),
            marital_status: "single".into(),
            occupation: "Engineer".into(),
            ..TravelerInfoForm::default()
        };
        let info = form.to_domain(today()).unwrap();
        assert_eq!(info.title, Title::Mr);
        assert_eq!(info.gender.as_str(), "male");
    }

    #[test]
    fn application_id_must_be_a_uuid() {
        assert!(matches!(
            parse_application_id(None),
            Err(FormError::InvalidApplicationId)
        ));
        assert!(parse_application_id(Some("  ")).is_err());
        assert!(parse_application_id(Some("67e55044-10b1-426f-9247-bb680e5fe0c8")).is_ok());
    }
}
