//! Per-field validation rules of the application wizard.
//!
//! Every validator is a pure function of its inputs and returns the
//! localization key of the first rule the value breaks, or `None` when the
//! value is acceptable. Date rules compare calendar days only; `today` is
//! supplied by the caller so results do not depend on the wall clock.

use std::sync::LazyLock;

use chrono::{Months, NaiveDate, Utc};
use regex::Regex;

use crate::domain::attachment::AttachmentKind;
use crate::forms::MessageKey;
use crate::forms::wizard::FileRef;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$",
    )
    .expect("valid email regex")
});

static PASSPORT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9]+$").expect("valid passport regex")
});

const MAX_EMAIL_CHARS: usize = 254;
const MAX_EMAIL_LOCAL_CHARS: usize = 64;
const MIN_PHONE_DIGITS_AFTER_CODE: usize = 7;
const MAX_PLACE_CHARS: usize = 50;
const MAX_NAME_CHARS: usize = 50;
const MAX_OCCUPATION_CHARS: usize = 100;
const MAX_PASSPORT_CHARS: usize = 10;
const MIN_DESCRIPTION_CHARS: usize = 30;
const MAX_DESCRIPTION_CHARS: usize = 3000;

/// Parses a wizard date value. Accepts `YYYY-MM-DD` and the date part of an
/// RFC 3339 timestamp.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    let date_part = match value.char_indices().nth(10) {
        Some((idx, 'T' | 't' | ' ')) => &value[..idx],
        _ => value,
    };
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}

fn years_before(today: NaiveDate, years: u32) -> NaiveDate {
    today
        .checked_sub_months(Months::new(years * 12))
        .unwrap_or(NaiveDate::MIN)
}

fn years_after(today: NaiveDate, years: u32) -> NaiveDate {
    today
        .checked_add_months(Months::new(years * 12))
        .unwrap_or(NaiveDate::MAX)
}

fn char_len(value: &str) -> usize {
    value.chars().count()
}

/// Shared shape of "required, at most `max` characters" rules.
fn bounded_text(
    value: &str,
    max: usize,
    required: MessageKey,
    too_long: MessageKey,
) -> Option<MessageKey> {
    if value.is_empty() {
        Some(required)
    } else if char_len(value) > max {
        Some(too_long)
    } else {
        None
    }
}

fn required(value: &str, key: MessageKey) -> Option<MessageKey> {
    value.is_empty().then_some(key)
}

/// Calendar day the date rules are checked against. The wizard and the
/// server both read it in UTC so a date accepted on one side is accepted on
/// the other.
pub fn calendar_today() -> NaiveDate {
    Utc::now().date_naive()
}

pub fn validate_email(value: &str) -> Option<MessageKey> {
    if value.is_empty() {
        return Some("validation.email_required");
    }
    if !EMAIL_RE.is_match(value) {
        return Some("validation.email_invalid");
    }
    if char_len(value) > MAX_EMAIL_CHARS {
        return Some("validation.email_too_long");
    }
    let local = value.split('@').next().unwrap_or_default();
    if char_len(local) > MAX_EMAIL_LOCAL_CHARS {
        return Some("validation.email_local_too_long");
    }
    if value.contains("..") {
        return Some("validation.email_consecutive_dots");
    }
    if value.starts_with('.') || value.ends_with('.') {
        return Some("validation.email_dot_edges");
    }
    None
}

/// Strips everything except digits and a leading `+`.
pub fn clean_phone(value: &str) -> String {
    value
        .chars()
        .enumerate()
        .filter(|(idx, c)| c.is_ascii_digit() || (*idx == 0 && *c == '+'))
        .map(|(_, c)| c)
        .collect()
}

/// `dial_code` is the international prefix of the selected country, such as
/// `+222`.
pub fn validate_phone(value: &str, dial_code: Option<&str>) -> Option<MessageKey> {
    if value.is_empty() {
        return Some("validation.phone_required");
    }
    let Some(dial_code) = dial_code.filter(|code| !code.is_empty()) else {
        return Some("validation.phone_international");
    };
    let cleaned = clean_phone(value.trim_start());
    if !cleaned.starts_with(dial_code)
        || cleaned.len() < dial_code.len() + MIN_PHONE_DIGITS_AFTER_CODE
    {
        return Some("validation.phone_invalid");
    }
    None
}

pub fn validate_arrival_date(value: &str, today: NaiveDate) -> Option<MessageKey> {
    if value.is_empty() {
        return Some("validation.arrival_date_required");
    }
    let Some(date) = parse_date(value) else {
        return Some("validation.date_invalid");
    };
    if date < today {
        Some("validation.arrival_date_past")
    } else if date > years_after(today, 1) {
        Some("validation.arrival_date_future")
    } else {
        None
    }
}

pub fn validate_address(value: &str) -> Option<MessageKey> {
    bounded_text(
        value,
        MAX_PLACE_CHARS,
        "validation.address_required",
        "validation.address_too_long",
    )
}

pub fn validate_description(value: &str) -> Option<MessageKey> {
    if value.is_empty() {
        return Some("validation.description_required");
    }
    let len = char_len(value);
    if len < MIN_DESCRIPTION_CHARS {
        Some("validation.description_min_length")
    } else if len > MAX_DESCRIPTION_CHARS {
        Some("validation.description_max_length")
    } else {
        None
    }
}

pub fn validate_passport_number(value: &str) -> Option<MessageKey> {
    if value.is_empty() {
        return Some("validation.passport_number_required");
    }
    if char_len(value) > MAX_PASSPORT_CHARS {
        return Some("validation.passport_number_length");
    }
    if !PASSPORT_RE.is_match(value) {
        return Some("validation.passport_number_invalid");
    }
    None
}

pub fn validate_issue_date(value: &str, today: NaiveDate) -> Option<MessageKey> {
    if value.is_empty() {
        return Some("validation.issue_date_required");
    }
    let Some(date) = parse_date(value) else {
        return Some("validation.date_invalid");
    };
    if date > today {
        Some("validation.issue_date_future")
    } else if date < years_before(today, 10) {
        Some("validation.issue_date_old")
    } else {
        None
    }
}

/// The issue date is only compared when it is present and parses; its own
/// validator reports other problems with it.
pub fn validate_expiry_date(expiry: &str, issue: &str, today: NaiveDate) -> Option<MessageKey> {
    if expiry.is_empty() {
        return Some("validation.expiry_date_required");
    }
    let Some(expiry) = parse_date(expiry) else {
        return Some("validation.date_invalid");
    };
    if expiry < today {
        return Some("validation.expiry_date_past");
    }
    match parse_date(issue) {
        Some(issue) if expiry <= issue => Some("validation.expiry_date_after_issue"),
        _ => None,
    }
}

pub fn validate_place_of_issue(value: &str) -> Option<MessageKey> {
    bounded_text(
        value,
        MAX_PLACE_CHARS,
        "validation.place_of_issue_required",
        "validation.place_of_issue_length",
    )
}

pub fn validate_first_name(value: &str) -> Option<MessageKey> {
    bounded_text(
        value,
        MAX_NAME_CHARS,
        "validation.first_name_required",
        "validation.first_name_length",
    )
}

pub fn validate_last_name(value: &str) -> Option<MessageKey> {
    bounded_text(
        value,
        MAX_NAME_CHARS,
        "validation.last_name_required",
        "validation.last_name_length",
    )
}

pub fn validate_birth_date(value: &str, today: NaiveDate) -> Option<MessageKey> {
    if value.is_empty() {
        return Some("validation.birth_date_required");
    }
    let Some(date) = parse_date(value) else {
        return Some("validation.date_invalid");
    };
    if date > today {
        Some("validation.birth_date_future")
    } else if date < years_before(today, 120) {
        Some("validation.birth_date_old")
    } else {
        None
    }
}

pub fn validate_birth_place(value: &str) -> Option<MessageKey> {
    bounded_text(
        value,
        MAX_PLACE_CHARS,
        "validation.birth_place_required",
        "validation.birth_place_length",
    )
}

pub fn validate_nationality(value: &str) -> Option<MessageKey> {
    required(value, "validation.nationality_required")
}

pub fn validate_gender(value: &str) -> Option<MessageKey> {
    required(value, "validation.gender_required")
}

pub fn validate_marital_status(value: &str) -> Option<MessageKey> {
    required(value, "validation.marital_status_required")
}

pub fn validate_occupation(value: &str) -> Option<MessageKey> {
    bounded_text(
        value,
        MAX_OCCUPATION_CHARS,
        "validation.occupation_required",
        "validation.occupation_length",
    )
}

pub fn validate_photo(photo: Option<&FileRef>) -> Option<MessageKey> {
    match photo {
        None => Some("validation.photo_required"),
        Some(file) => validate_attachment(AttachmentKind::Photo, &file.mime_type, file.size_bytes),
    }
}

/// Size and type limits applied when a file is attached or uploaded.
pub fn validate_attachment(
    kind: AttachmentKind,
    mime_type: &str,
    size_bytes: u64,
) -> Option<MessageKey> {
    let (too_large, bad_type) = match kind {
        AttachmentKind::Photo => ("validation.photo_too_large", "validation.photo_type"),
        AttachmentKind::Document => ("validation.document_too_large", "validation.document_type"),
    };
    if size_bytes > kind.max_bytes() {
        Some(too_large)
    } else if !kind.accepts_mime(mime_type) {
        Some(bad_type)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
    }

    fn fmt(date: NaiveDate) -> String {
        date.format("%Y-%m-%d").to_string()
    }

    #[test]
    fn email_accepts_plain_address() {
        assert_eq!(validate_email("user@example.com"), None);
    }

    #[test]
    fn email_dot_rule_applies_to_whole_address() {
        assert_eq!(validate_email("user.@example.com"), None);
        assert_eq!(
            validate_email(".user@example.com"),
            Some("validation.email_dot_edges")
        );
        assert!(validate_email("user@example.com.").is_some());
    }

    #[test]
    fn email_rejects_malformed_addresses() {
        let long_local = format!("{}@example.com", "a".repeat(65));
        let label = "b".repeat(60);
        let long_total = format!("{}@{label}.{label}.{label}.{label}.com", "a".repeat(60));
        let cases = [
            ("", "validation.email_required"),
            ("user.example.com", "validation.email_invalid"),
            ("user@", "validation.email_invalid"),
            ("user..name@example.com", "validation.email_consecutive_dots"),
            (".user@example.com", "validation.email_dot_edges"),
            (long_local.as_str(), "validation.email_local_too_long"),
            (long_total.as_str(), "validation.email_too_long"),
        ];
        for (input, expected) in cases {
            assert_eq!(validate_email(input), Some(expected), "input: {input}");
        }
    }

    #[test]
    fn phone_requires_dial_code_and_length() {
        assert_eq!(validate_phone("", Some("+222")), Some("validation.phone_required"));
        assert_eq!(
            validate_phone("22123456", None),
            Some("validation.phone_international")
        );
        assert_eq!(
            validate_phone("+33 6 12", Some("+222")),
            Some("validation.phone_invalid")
        );
        assert_eq!(
            validate_phone("+222 123", Some("+222")),
            Some("validation.phone_invalid")
        );
        assert_eq!(validate_phone("+222 22 12 34 56", Some("+222")), None);
        assert_eq!(validate_phone("+222-2212-3456", Some("+222")), None);
    }

    #[test]
    fn arrival_date_window() {
        let today = today();
        assert_eq!(
            validate_arrival_date(&fmt(today - chrono::Days::new(1)), today),
            Some("validation.arrival_date_past")
        );
        assert_eq!(validate_arrival_date(&fmt(today), today), None);
        assert_eq!(
            validate_arrival_date(&fmt(today + chrono::Days::new(30)), today),
            None
        );
        assert_eq!(
            validate_arrival_date(&fmt(today + chrono::Days::new(366)), today),
            Some("validation.arrival_date_future")
        );
        assert_eq!(validate_arrival_date("2027-10-16", today), None);
        assert_eq!(
            validate_arrival_date("tomorrow", today),
            Some("validation.date_invalid")
        );
        assert_eq!(
            validate_arrival_date("2026-11-01T08:30:00Z", today),
            None
        );
    }

    #[test]
    fn expiry_must_follow_issue() {
        let today = today();
        let issue = "2030-01-10";
        assert_eq!(
            validate_expiry_date("2030-01-10", issue, today),
            Some("validation.expiry_date_after_issue")
        );
        assert_eq!(
            validate_expiry_date("2029-12-31", issue, today),
            Some("validation.expiry_date_after_issue")
        );
        assert_eq!(validate_expiry_date("2030-01-11", issue, today), None);
        assert_eq!(validate_expiry_date(&fmt(today), "", today), None);
        assert_eq!(
            validate_expiry_date("2026-10-15", "", today),
            Some("validation.expiry_date_past")
        );
    }

    #[test]
    fn issue_and_birth_date_bounds() {
        let today = today();
        assert_eq!(
            validate_issue_date("2026-10-17", today),
            Some("validation.issue_date_future")
        );
        assert_eq!(validate_issue_date("2016-10-16", today), None);
        assert_eq!(
            validate_issue_date("2016-10-15", today),
            Some("validation.issue_date_old")
        );
        assert_eq!(validate_birth_date("1906-10-16", today), None);
        assert_eq!(
            validate_birth_date("1906-10-15", today),
            Some("validation.birth_date_old")
        );
        assert_eq!(
            validate_birth_date("2026-10-17", today),
            Some("validation.birth_date_future")
        );
    }

    #[test]
    fn description_bounds_are_inclusive() {
        assert_eq!(
            validate_description(&"x".repeat(29)),
            Some("validation.description_min_length")
        );
        assert_eq!(validate_description(&"x".repeat(30)), None);
        assert_eq!(validate_description(&"x".repeat(3000)), None);
        assert_eq!(
            validate_description(&"x".repeat(3001)),
            Some("validation.description_max_length")
        );
    }

    #[test]
    fn passport_number_rules() {
        assert_eq!(
            validate_passport_number(""),
            Some("validation.passport_number_required")
        );
        assert_eq!(
            validate_passport_number("AB12345678X"),
            Some("validation.passport_number_length")
        );
        assert_eq!(
            validate_passport_number("AB-1234"),
            Some("validation.passport_number_invalid")
        );
        assert_eq!(validate_passport_number("ab1234567"), None);
    }

    #[test]
    fn text_limits_count_characters() {
        assert_eq!(validate_first_name(&"é".repeat(50)), None);
        assert_eq!(
            validate_first_name(&"é".repeat(51)),
            Some("validation.first_name_length")
        );
        assert_eq!(
            validate_occupation(&"o".repeat(101)),
            Some("validation.occupation_length")
        );
        assert_eq!(
            validate_marital_status(""),
            Some("validation.marital_status_required")
        );
    }

    #[test]
    fn validators_are_pure() {
        let today = today();
        for _ in 0..2 {
            assert_eq!(validate_email("user@example.com"), None);
            assert_eq!(
                validate_birth_date("2030-01-01", today),
                Some("validation.birth_date_future")
            );
        }
    }

    #[test]
    fn attachment_limits() {
        assert_eq!(
            validate_attachment(AttachmentKind::Photo, "image/png", 6 * 1024 * 1024),
            Some("validation.photo_too_large")
        );
        assert_eq!(
            validate_attachment(AttachmentKind::Photo, "application/pdf", 1024),
            Some("validation.photo_type")
        );
        assert_eq!(
            validate_attachment(AttachmentKind::Document, "application/pdf", 9 * 1024 * 1024),
            None
        );
        assert_eq!(validate_photo(None), Some("validation.photo_required"));
    }
}
