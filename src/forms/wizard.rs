//! The application wizard's form record.
//!
//! Values are kept as raw user input; they are checked by [`crate::forms::steps`]
//! and turned into domain types only at the server boundary. The record is
//! persisted as one flat camelCase JSON object, and every field has a default
//! so that a stored draft merges over a fresh form.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::forms::{Field, FormError};

/// Country selected in the phone input.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CountryCode {
    pub code: String,
    pub name: String,
    pub flag: String,
    pub dial_code: String,
}

/// A local file chosen by the applicant. Only metadata is persisted with the
/// draft; the bytes are read from `path` when the file is uploaded.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FileRef {
    pub file_name: String,
    pub mime_type: String,
    pub size_bytes: u64,
    pub path: PathBuf,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct GeneralInfoForm {
    pub email: String,
    pub phone: String,
    pub travel_purpose: String,
    pub arrival_date: String,
    pub number_of_entries: String,
    pub address_in_mauritania: String,
    pub purpose_description: String,
}

impl Default for GeneralInfoForm {
    fn default() -> Self {
        Self {
            email: String::new(),
            phone: String::new(),
            travel_purpose: "tourism".to_string(),
            arrival_date: String::new(),
            number_of_entries: "double".to_string(),
            address_in_mauritania: String::new(),
            purpose_description: String::new(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct PassportInfoForm {
    pub document_number: String,
    pub document_type: String,
    pub issue_date: String,
    pub expiry_date: String,
    pub place_of_issue: String,
}

impl Default for PassportInfoForm {
    fn default() -> Self {
        Self {
            document_number: String::new(),
            document_type: "standard".to_string(),
            issue_date: String::new(),
            expiry_date: String::new(),
            place_of_issue: String::new(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct TravelerInfoForm {
    pub title: String,
    pub first_name: String,
    pub last_name: String,
    pub birth_date: String,
    pub birth_place: String,
    pub nationality: String,
    pub gender: String,
    pub marital_status: String,
    pub occupation: String,
}

impl Default for TravelerInfoForm {
    fn default() -> Self {
        Self {
            title: "mr".to_string(),
            first_name: String::new(),
            last_name: String::new(),
            birth_date: String::new(),
            birth_place: String::new(),
            nationality: String::new(),
            gender: "male".to_string(),
            marital_status: String::new(),
            occupation: String::new(),
        }
    }
}

/// Everything the applicant enters across all six steps.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct FormData {
    #[serde(flatten)]
    pub general: GeneralInfoForm,
    #[serde(flatten)]
    pub passport: PassportInfoForm,
    #[serde(flatten)]
    pub traveler: TravelerInfoForm,
    pub country_code: Option<CountryCode>,
    pub photo: Option<FileRef>,
    pub documents: Vec<FileRef>,
    pub visa_type_id: String,
}

impl FormData {
    /// Dial code of the selected country, if any.
    pub fn dial_code(&self) -> Option<&str> {
        self.country_code.as_ref().map(|c| c.dial_code.as_str())
    }

    /// Current value of a text field. `None` for the country, photo and
    /// document inputs.
    pub fn text(&self, field: Field) -> Option<&str> {
        let value = match field {
            Field::Email => &self.general.email,
            Field::Phone => &self.general.phone,
            Field::TravelPurpose => &self.general.travel_purpose,
            Field::ArrivalDate => &self.general.arrival_date,
            Field::NumberOfEntries => &self.general.number_of_entries,
            Field::AddressInMauritania => &self.general.address_in_mauritania,
            Field::PurposeDescription => &self.general.purpose_description,
            Field::DocumentNumber => &self.passport.document_number,
            Field::DocumentType => &self.passport.document_type,
            Field::IssueDate => &self.passport.issue_date,
            Field::ExpiryDate => &self.passport.expiry_date,
            Field::PlaceOfIssue => &self.passport.place_of_issue,
            Field::Title => &self.traveler.title,
            Field::FirstName => &self.traveler.first_name,
            Field::LastName => &self.traveler.last_name,
            Field::BirthDate => &self.traveler.birth_date,
            Field::BirthPlace => &self.traveler.birth_place,
            Field::Nationality => &self.traveler.nationality,
            Field::Gender => &self.traveler.gender,
            Field::MaritalStatus => &self.traveler.marital_status,
            Field::Occupation => &self.traveler.occupation,
            Field::VisaTypeId => &self.visa_type_id,
            Field::CountryCode | Field::Photo | Field::Documents => return None,
        };
        Some(value.as_str())
    }

    /// Replaces the value of a text field.
    pub fn set_text(&mut self, field: Field, value: impl Into<String>) -> Result<(), FormError> {
        let slot = match field {
            Field::Email => &mut self.general.email,
            Field::Phone => &mut self.general.phone,
            Field::TravelPurpose => &mut self.general.travel_purpose,
            Field::ArrivalDate => &mut self.general.arrival_date,
            Field::NumberOfEntries => &mut self.general.number_of_entries,
            Field::AddressInMauritania => &mut self.general.address_in_mauritania,
            Field::PurposeDescription => &mut self.general.purpose_description,
            Field::DocumentNumber => &mut self.passport.document_number,
            Field::DocumentType => &mut self.passport.document_type,
            Field::IssueDate => &mut self.passport.issue_date,
            Field::ExpiryDate => &mut self.passport.expiry_date,
            Field::PlaceOfIssue => &mut self.passport.place_of_issue,
            Field::Title => &mut self.traveler.title,
            Field::FirstName => &mut self.traveler.first_name,
            Field::LastName => &mut self.traveler.last_name,
            Field::BirthDate => &mut self.traveler.birth_date,
            Field::BirthPlace => &mut self.traveler.birth_place,
            Field::Nationality => &mut self.traveler.nationality,
            Field::Gender => &mut self.traveler.gender,
            Field::MaritalStatus => &mut self.traveler.marital_status,
            Field::Occupation => &mut self.traveler.occupation,
            Field::VisaTypeId => &mut self.visa_type_id,
            Field::CountryCode | Field::Photo | Field::Documents => {
                return Err(FormError::NotATextField(field));
            }
        };
        *slot = value.into();
        Ok(())
    }
}
