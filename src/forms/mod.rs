//! Form definitions shared by the wizard and the JSON API.

use std::collections::BTreeMap;
use std::fmt::Display;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use validator::ValidationErrors;

use crate::domain::types::TypeConstraintError;

pub mod admin;
pub mod draft;
pub mod fields;
pub mod steps;
pub mod upload;
pub mod wizard;

/// Localization key of a validation message, e.g. `validation.email_required`.
pub type MessageKey = &'static str;

#[derive(Debug, Error)]
/// Errors that can occur when processing form data.
pub enum FormError {
    #[error("validation errors: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("field validation failed")]
    Fields(ErrorMap),

    #[error("{0}")]
    TypeConstraint(#[from] TypeConstraintError),

    #[error("invalid application id")]
    InvalidApplicationId,

    #[error("invalid status")]
    InvalidStatus,

    #[error("field `{0}` does not hold text")]
    NotATextField(Field),

    #[error("missing required data")]
    MissingData,
}

/// Every input of the application wizard. The serde name is the key used in
/// error maps and persisted drafts.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    Email,
    Phone,
    CountryCode,
    TravelPurpose,
    ArrivalDate,
    NumberOfEntries,
    AddressInMauritania,
    PurposeDescription,
    DocumentNumber,
    DocumentType,
    IssueDate,
    ExpiryDate,
    PlaceOfIssue,
    Title,
    FirstName,
    LastName,
    BirthDate,
    BirthPlace,
    Nationality,
    Gender,
    MaritalStatus,
    Occupation,
    Photo,
    Documents,
    VisaTypeId,
}

impl Field {
    pub fn as_str(self) -> &'static str {
        match self {
            Field::Email => "email",
            Field::Phone => "phone",
            Field::CountryCode => "countryCode",
            Field::TravelPurpose => "travelPurpose",
            Field::ArrivalDate => "arrivalDate",
            Field::NumberOfEntries => "numberOfEntries",
            Field::AddressInMauritania => "addressInMauritania",
            Field::PurposeDescription => "purposeDescription",
            Field::DocumentNumber => "documentNumber",
            Field::DocumentType => "documentType",
            Field::IssueDate => "issueDate",
            Field::ExpiryDate => "expiryDate",
            Field::PlaceOfIssue => "placeOfIssue",
            Field::Title => "title",
            Field::FirstName => "firstName",
            Field::LastName => "lastName",
            Field::BirthDate => "birthDate",
            Field::BirthPlace => "birthPlace",
            Field::Nationality => "nationality",
            Field::Gender => "gender",
            Field::MaritalStatus => "maritalStatus",
            Field::Occupation => "occupation",
            Field::Photo => "photo",
            Field::Documents => "documents",
            Field::VisaTypeId => "visaTypeId",
        }
    }
}

impl Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Field-to-message mapping produced by one validation pass. A field is
/// valid when it has no entry.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ErrorMap(BTreeMap<Field, MessageKey>);

impl ErrorMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `error` for `field` when a validator reported one.
    pub fn check(&mut self, field: Field, error: Option<MessageKey>) {
        if let Some(key) = error {
            self.0.insert(field, key);
        }
    }

    pub fn insert(&mut self, field: Field, key: MessageKey) {
        self.0.insert(field, key);
    }

    pub fn get(&self, field: Field) -> Option<MessageKey> {
        self.0.get(&field).copied()
    }

    pub fn clear_field(&mut self, field: Field) -> Option<MessageKey> {
        self.0.remove(&field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, MessageKey)> + '_ {
        self.0.iter().map(|(field, key)| (*field, *key))
    }

    /// Owned string form used in JSON error bodies.
    pub fn to_string_map(&self) -> BTreeMap<String, String> {
        self.0
            .iter()
            .map(|(field, key)| (field.as_str().to_string(), (*key).to_string()))
            .collect()
    }
}

impl FromIterator<(Field, MessageKey)> for ErrorMap {
    fn from_iter<I: IntoIterator<Item = (Field, MessageKey)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
