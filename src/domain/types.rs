//! Value objects carried by visa applications.
//!
//! Constructors trim, normalise and bound their input; a value that exists has
//! already passed those checks.
use std::fmt::{Display, Formatter};
use std::{ops::Deref, str::FromStr};

use phonenumber::{Mode, parse};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;
use validator::ValidateEmail;

/// Why a raw value was refused by a value-object constructor.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeConstraintError {
    #[error("id must be greater than zero")]
    NonPositiveId,
    #[error("invalid email address")]
    InvalidEmail,
    /// Blank after trimming.
    #[error("value cannot be empty")]
    EmptyString,
    /// Character count above the cap.
    #[error("value is longer than {0} characters")]
    TooLong(usize),
    #[error("invalid value: {0}")]
    InvalidValue(String),
    #[error("invalid phone number")]
    InvalidPhone,
    #[error("invalid uuid value")]
    InvalidUuid,
}

fn normalize_email<S: Into<String>>(email: S) -> Result<String, TypeConstraintError> {
    let normalized = email.into().trim().to_lowercase();
    if normalized.validate_email() {
        Ok(normalized)
    } else {
        Err(TypeConstraintError::InvalidEmail)
    }
}

/// Row-id newtypes; ids start at 1.
macro_rules! id_newtype {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
        pub struct $name(i32);

        impl $name {
            /// Refuses zero and negative ids.
            pub fn new(value: i32) -> Result<Self, TypeConstraintError> {
                if value > 0 {
                    Ok(Self(value))
                } else {
                    Err(TypeConstraintError::NonPositiveId)
                }
            }

            pub const fn get(self) -> i32 {
                self.0
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl TryFrom<i32> for $name {
            type Error = TypeConstraintError;

            fn try_from(value: i32) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for i32 {
            fn from(value: $name) -> Self {
                value.0
            }
        }
    };
}

id_newtype!(ApplicationId, "Internal identifier of a visa application row.");
id_newtype!(AttachmentId, "Identifier of an uploaded photo or document record.");
id_newtype!(StatusHistoryId, "Identifier of a status history entry.");

/// Lower-cased and validated email address of an applicant.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct ApplicantEmail(String);

impl ApplicantEmail {
    /// Lower-cases and validates `email`.
    pub fn new<S: Into<String>>(email: S) -> Result<Self, TypeConstraintError> {
        let normalized = normalize_email(email)?;
        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl Display for ApplicantEmail {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for ApplicantEmail {
    type Error = TypeConstraintError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for ApplicantEmail {
    type Error = TypeConstraintError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ApplicantEmail> for String {
    fn from(value: ApplicantEmail) -> Self {
        value.0
    }
}

/// Trimmed text with at least one visible character.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct NonEmptyString(String);

impl NonEmptyString {
    pub fn new<S: Into<String>>(value: S) -> Result<Self, TypeConstraintError> {
        let trimmed = value.into().trim().to_string();
        if trimmed.is_empty() {
            return Err(TypeConstraintError::EmptyString);
        }
        Ok(Self(trimmed))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl Display for NonEmptyString {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Generates a trimmed, non-empty string newtype capped at `$max` characters.
macro_rules! bounded_string_newtype {
    ($name:ident, $max:expr, $doc:expr) => {
        #[doc = $doc]
        #[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(String);

        impl $name {
            /// Maximum number of characters accepted.
            pub const MAX_CHARS: usize = $max;

            /// Constructs a trimmed, non-empty value within the length cap.
            pub fn new<S: Into<String>>(value: S) -> Result<Self, TypeConstraintError> {
                let inner = NonEmptyString::new(value)?;
                if inner.as_str().chars().count() > Self::MAX_CHARS {
                    return Err(TypeConstraintError::TooLong(Self::MAX_CHARS));
                }
                Ok(Self(inner.into_inner()))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl Deref for $name {
            type Target = str;

            fn deref(&self) -> &Self::Target {
                &self.0
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl TryFrom<String> for $name {
            type Error = TypeConstraintError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl TryFrom<&str> for $name {
            type Error = TypeConstraintError;

            fn try_from(value: &str) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }
    };
}

bounded_string_newtype!(PersonName, 50, "First or last name of a traveler.");
bounded_string_newtype!(PlaceName, 50, "Place of birth, place of issue or local address.");
bounded_string_newtype!(Occupation, 100, "Declared occupation of a traveler.");
bounded_string_newtype!(
    ShortLabel,
    64,
    "Short free-form label such as a nationality or marital status."
);

/// Purpose-of-travel narrative, sanitized and bounded to 30..=3000 characters.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct PurposeDescription(String);

impl PurposeDescription {
    pub const MIN_CHARS: usize = 30;
    pub const MAX_CHARS: usize = 3000;

    /// Constructs a sanitized, trimmed value within the length bounds.
    pub fn new<S: Into<String>>(value: S) -> Result<Self, TypeConstraintError> {
        let sanitized = ammonia::clean(&value.into());
        let inner = NonEmptyString::new(sanitized)?;
        let len = inner.as_str().chars().count();
        if len < Self::MIN_CHARS {
            return Err(TypeConstraintError::InvalidValue(format!(
                "description must be at least {} characters",
                Self::MIN_CHARS
            )));
        }
        if len > Self::MAX_CHARS {
            return Err(TypeConstraintError::TooLong(Self::MAX_CHARS));
        }
        Ok(Self(inner.into_inner()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl Display for PurposeDescription {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Upper-cased alphanumeric passport number of at most ten characters.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct PassportNumber(String);

impl PassportNumber {
    pub const MAX_CHARS: usize = 10;

    pub fn new<S: Into<String>>(value: S) -> Result<Self, TypeConstraintError> {
        let inner = NonEmptyString::new(value)?;
        if inner.as_str().len() > Self::MAX_CHARS {
            return Err(TypeConstraintError::TooLong(Self::MAX_CHARS));
        }
        if !inner.as_str().chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(TypeConstraintError::InvalidValue(
                "passport number must be alphanumeric".to_string(),
            ));
        }
        Ok(Self(inner.into_inner().to_ascii_uppercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl Display for PassportNumber {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Parses an internationally written number and formats it as E.164.
pub fn normalize_phone_to_e164(value: &str) -> Result<String, TypeConstraintError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(TypeConstraintError::EmptyString);
    }
    let parsed = parse(None, trimmed).map_err(|_| TypeConstraintError::InvalidPhone)?;
    Ok(parsed.format().mode(Mode::E164).to_string())
}

/// Returns the international dialing prefix (e.g. `+222`) of a phone number
/// written in international form, if it can be parsed.
pub fn phone_dial_code(value: &str) -> Option<String> {
    parse(None, value.trim())
        .ok()
        .map(|parsed| format!("+{}", parsed.code().value()))
}

/// Applicant phone number stored as E.164.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    pub fn new<S: Into<String>>(value: S) -> Result<Self, TypeConstraintError> {
        let normalized = normalize_phone_to_e164(&value.into())?;
        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl Display for PhoneNumber {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for PhoneNumber {
    type Error = TypeConstraintError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Identifier of the authenticated account owning an application.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct UserId(String);

impl UserId {
    pub fn new<S: Into<String>>(value: S) -> Result<Self, TypeConstraintError> {
        Ok(Self(NonEmptyString::new(value)?.into_inner()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for UserId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Human-facing application reference such as `EVS-M3K2J1QZ-4F7A9C`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct ApplicationNumber(String);

impl ApplicationNumber {
    /// Mints a new number from the current time in milliseconds and a random suffix.
    pub fn generate(now_millis: i64) -> Self {
        let stamp = to_base36(now_millis.unsigned_abs());
        let random = to_base36(u64::from(rand::random::<u32>()));
        let padded = format!("{random:0>6}");
        let suffix = &padded[padded.len() - 6..];
        Self(format!("EVS-{stamp}-{suffix}"))
    }

    /// Wraps an existing number read back from storage.
    pub fn new<S: Into<String>>(value: S) -> Result<Self, TypeConstraintError> {
        let value = NonEmptyString::new(value)?.into_inner();
        let mut parts = value.splitn(3, '-');
        let valid = matches!(
            (parts.next(), parts.next(), parts.next()),
            (Some("EVS"), Some(stamp), Some(suffix))
                if is_base36_upper(stamp) && is_base36_upper(suffix)
        );
        if valid {
            Ok(Self(value))
        } else {
            Err(TypeConstraintError::InvalidValue(format!(
                "malformed application number: {value}"
            )))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl Display for ApplicationNumber {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

fn to_base36(mut value: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";
    if value == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while value > 0 {
        out.push(DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    out.reverse();
    String::from_utf8_lossy(&out).into_owned()
}

fn is_base36_upper(value: &str) -> bool {
    !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_digit() || c.is_ascii_uppercase())
}

/// Externally visible application identifier, handed to clients as the
/// draft id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PublicId(Uuid);

impl PublicId {
    /// Random v4 id for a new application.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Reads the 16-byte BLOB stored in SQLite.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, TypeConstraintError> {
        Ok(Self(
            Uuid::from_slice(bytes).map_err(|_| TypeConstraintError::InvalidUuid)?,
        ))
    }

    pub fn as_bytes(&self) -> &[u8; 16] {
        self.0.as_bytes()
    }
}

impl Display for PublicId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for PublicId {
    type Err = TypeConstraintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(
            Uuid::parse_str(s.trim()).map_err(|_| TypeConstraintError::InvalidUuid)?,
        ))
    }
}

impl Default for PublicId {
    fn default() -> Self {
        Self::new()
    }
}
