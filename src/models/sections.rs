//! Diesel models for the three per-step sections of an application.

use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;

use crate::domain::application::{
    GeneralInfo as DomainGeneralInfo, PassportInfo as DomainPassportInfo,
    TravelerInfo as DomainTravelerInfo,
};
use crate::domain::types::{
    ApplicantEmail, Occupation, PassportNumber, PersonName, PhoneNumber, PlaceName,
    PurposeDescription, ShortLabel, TypeConstraintError,
};
use crate::models::application::VisaApplication;

#[derive(Debug, Clone, Identifiable, Queryable, Selectable, Associations)]
#[diesel(table_name = crate::schema::general_infos)]
#[diesel(primary_key(application_id))]
#[diesel(belongs_to(VisaApplication, foreign_key = application_id))]
pub struct GeneralInfo {
    pub application_id: i32,
    pub email: String,
    pub phone: String,
    pub travel_purpose: String,
    pub arrival_date: NaiveDate,
    pub number_of_entries: String,
    pub address_in_mauritania: String,
    pub purpose_description: String,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable, AsChangeset)]
#[diesel(table_name = crate::schema::general_infos)]
#[diesel(primary_key(application_id))]
pub struct NewGeneralInfo<'a> {
    pub application_id: i32,
    pub email: &'a str,
    pub phone: &'a str,
    pub travel_purpose: &'a str,
    pub arrival_date: NaiveDate,
    pub number_of_entries: &'a str,
    pub address_in_mauritania: &'a str,
    pub purpose_description: &'a str,
    pub updated_at: NaiveDateTime,
}

impl<'a> NewGeneralInfo<'a> {
    pub fn from_domain(application_id: i32, info: &'a DomainGeneralInfo, now: NaiveDateTime) -> Self {
        Self {
            application_id,
            email: info.email.as_str(),
            phone: info.phone.as_str(),
            travel_purpose: info.travel_purpose.as_str(),
            arrival_date: info.arrival_date,
            number_of_entries: info.number_of_entries.as_str(),
            address_in_mauritania: info.address_in_mauritania.as_str(),
            purpose_description: info.purpose_description.as_str(),
            updated_at: now,
        }
    }
}

impl TryFrom<GeneralInfo> for DomainGeneralInfo {
    type Error = TypeConstraintError;

    fn try_from(row: GeneralInfo) -> Result<Self, Self::Error> {
        Ok(Self {
            email: ApplicantEmail::new(row.email)?,
            phone: PhoneNumber::new(row.phone)?,
            travel_purpose: row.travel_purpose.parse()?,
            arrival_date: row.arrival_date,
            number_of_entries: row.number_of_entries.parse()?,
            address_in_mauritania: PlaceName::new(row.address_in_mauritania)?,
            purpose_description: PurposeDescription::new(row.purpose_description)?,
        })
    }
}

#[derive(Debug, Clone, Identifiable, Queryable, Selectable, Associations)]
#[diesel(table_name = crate::schema::passport_infos)]
#[diesel(primary_key(application_id))]
#[diesel(belongs_to(VisaApplication, foreign_key = application_id))]
pub struct PassportInfo {
    pub application_id: i32,
    pub document_number: String,
    pub document_type: String,
    pub issue_date: NaiveDate,
    pub expiry_date: NaiveDate,
    pub place_of_issue: String,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable, AsChangeset)]
#[diesel(table_name = crate::schema::passport_infos)]
#[diesel(primary_key(application_id))]
pub struct NewPassportInfo<'a> {
    pub application_id: i32,
    pub document_number: &'a str,
    pub document_type: &'a str,
    pub issue_date: NaiveDate,
    pub expiry_date: NaiveDate,
    pub place_of_issue: &'a str,
    pub updated_at: NaiveDateTime,
}

impl<'a> NewPassportInfo<'a> {
    pub fn from_domain(application_id: i32, info: &'a DomainPassportInfo, now: NaiveDateTime) -> Self {
        Self {
            application_id,
            document_number: info.document_number.as_str(),
            document_type: info.document_type.as_str(),
            issue_date: info.issue_date,
            expiry_date: info.expiry_date,
            place_of_issue: info.place_of_issue.as_str(),
            updated_at: now,
        }
    }
}

impl TryFrom<PassportInfo> for DomainPassportInfo {
    type Error = TypeConstraintError;

    fn try_from(row: PassportInfo) -> Result<Self, Self::Error> {
        Ok(Self {
            document_number: PassportNumber::new(row.document_number)?,
            document_type: row.document_type.parse()?,
            issue_date: row.issue_date,
            expiry_date: row.expiry_date,
            place_of_issue: PlaceName::new(row.place_of_issue)?,
        })
    }
}

#[derive(Debug, Clone, Identifiable, Queryable, Selectable, Associations)]
#[diesel(table_name = crate::schema::traveler_infos)]
#[diesel(primary_key(application_id))]
#[diesel(belongs_to(VisaApplication, foreign_key = application_id))]
pub struct TravelerInfo {
    pub application_id: i32,
    pub title: String,
    pub first_name: String,
    pub last_name: String,
    pub birth_date: NaiveDate,
    pub birth_place: String,
    pub nationality: String,
    pub gender: String,
    pub marital_status: String,
    pub occupation: String,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable, AsChangeset)]
#[diesel(table_name = crate::schema::traveler_infos)]
#[diesel(primary_key(application_id))]
pub struct NewTravelerInfo<'a> {
    pub application_id: i32,
    pub title: &'a str,
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub birth_date: NaiveDate,
    pub birth_place: &'a str,
    pub nationality: &'a str,
    pub gender: &'a str,
    pub marital_status: &'a str,
    pub occupation: &'a str,
    pub updated_at: NaiveDateTime,
}

impl<'a> NewTravelerInfo<'a> {
    pub fn from_domain(application_id: i32, info: &'a DomainTravelerInfo, now: NaiveDateTime) -> Self {
        Self {
            application_id,
            title: info.title.as_str(),
            first_name: info.first_name.as_str(),
            last_name: info.last_name.as_str(),
            birth_date: info.birth_date,
            birth_place: info.birth_place.as_str(),
            nationality: info.nationality.as_str(),
            gender: info.gender.as_str(),
            marital_status: info.marital_status.as_str(),
            occupation: info.occupation.as_str(),
            updated_at: now,
        }
    }
}

impl TryFrom<TravelerInfo> for DomainTravelerInfo {
    type Error = TypeConstraintError;

    fn try_from(row: TravelerInfo) -> Result<Self, Self::Error> {
        Ok(Self {
            title: row.title.parse()?,
            first_name: PersonName::new(row.first_name)?,
            last_name: PersonName::new(row.last_name)?,
            birth_date: row.birth_date,
            birth_place: PlaceName::new(row.birth_place)?,
            nationality: ShortLabel::new(row.nationality)?,
            gender: ShortLabel::new(row.gender)?,
            marital_status: ShortLabel::new(row.marital_status)?,
            occupation: Occupation::new(row.occupation)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::application::{PassportType, Title};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    fn now() -> NaiveDateTime {
        date(2026, 9, 1).and_hms_opt(8, 0, 0).expect("valid time")
    }

    #[test]
    fn passport_row_round_trip_keeps_values() {
        let domain = DomainPassportInfo {
            document_number: PassportNumber::new("ab1234567").expect("valid passport"),
            document_type: PassportType::Service,
            issue_date: date(2022, 3, 1),
            expiry_date: date(2032, 3, 1),
            place_of_issue: PlaceName::new("Paris").expect("valid place"),
        };
        let new = NewPassportInfo::from_domain(4, &domain, now());
        assert_eq!(new.document_number, "AB1234567");
        assert_eq!(new.document_type, "service");

        let row = PassportInfo {
            application_id: new.application_id,
            document_number: new.document_number.to_string(),
            document_type: new.document_type.to_string(),
            issue_date: new.issue_date,
            expiry_date: new.expiry_date,
            place_of_issue: new.place_of_issue.to_string(),
            updated_at: new.updated_at,
        };
        assert_eq!(DomainPassportInfo::try_from(row), Ok(domain));
    }

    #[test]
    fn traveler_row_with_unknown_title_is_rejected() {
        let row = TravelerInfo {
            application_id: 1,
            title: "sir".into(),
            first_name: "Awa".into(),
            last_name: "Diallo".into(),
            birth_date: date(1990, 5, 2),
            birth_place: "Dakar".into(),
            nationality: "SN".into(),
            gender: "female".into(),
            marital_status: "single".into(),
            occupation: "Engineer".into(),
            updated_at: now(),
        };
        assert!(DomainTravelerInfo::try_from(row).is_err());
        assert_eq!("mrs".parse::<Title>(), Ok(Title::Mrs));
    }
}
