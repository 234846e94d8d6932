//! Field-level validation and normalization of inbound data.
//!
//! Every function here is pure: it either returns a normalized value or a [`ValidationError`]
//! naming the offending field and the constraint it broke. Anything date-relative takes the
//! caller's notion of "today" so results do not depend on the wall clock.

use std::ops::RangeInclusive;
use std::str::FromStr;
use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use thiserror::Error;

use crate::domain::appointment::{AppointmentRequest, AppointmentRequestInput};
use crate::domain::classification::{Classification, RawClassification};
use crate::domain::client::{ClientInfo, ClientInfoInput};
use crate::domain::practice::UnknownVariant;

pub const NAME_LENGTH: RangeInclusive<usize> = 2..=100;
pub const DESCRIPTION_LENGTH: RangeInclusive<usize> = 10..=1000;
pub const CASE_SUMMARY_LENGTH: RangeInclusive<usize> = 1..=2000;
pub const DURATION_MINUTES: RangeInclusive<i64> = 30..=240;
pub const PREFERRED_DATE_COUNT: RangeInclusive<usize> = 1..=5;
pub const MIN_PHONE_DIGITS: usize = 10;
/// Upper bound on the phone number as typed, separators included.
pub const MAX_PHONE_LENGTH: usize = 15;
pub const DEFAULT_DURATION_MINUTES: u32 = 60;
pub const DATE_FORMAT: &str = "%Y-%m-%d";

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("email pattern compiles")
});

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ValidationErrorKind {
    #[error("length must be between {min} and {max} characters (got {actual})")]
    Length { min: usize, max: usize, actual: usize },
    #[error("value does not look like {expected}")]
    Pattern { expected: &'static str },
    #[error("`{value}` is not a valid {kind}")]
    NotAMember { kind: &'static str, value: String },
    #[error("`{0}` is not a YYYY-MM-DD date")]
    UnparsableDate(String),
    #[error("date {0} is in the past")]
    DateInPast(NaiveDate),
    #[error("expected between {min} and {max} entries (got {actual})")]
    Cardinality { min: usize, max: usize, actual: usize },
    #[error("value must be between {min} and {max} (got {actual})")]
    OutOfRange { min: i64, max: i64, actual: i64 },
    #[error("phone number must contain at least {MIN_PHONE_DIGITS} digits (got {0})")]
    TooFewDigits(usize),
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("{field}: {kind}")]
pub struct ValidationError {
    pub field: String,
    pub kind: ValidationErrorKind,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, kind: ValidationErrorKind) -> Self {
        Self { field: field.into(), kind }
    }
}

/// Trims `value` and checks its character count.
pub fn validate_text(
    field: &str,
    value: &str,
    bounds: RangeInclusive<usize>,
) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    let actual = trimmed.chars().count();
    if !bounds.contains(&actual) {
        return Err(ValidationError::new(
            field,
            ValidationErrorKind::Length { min: *bounds.start(), max: *bounds.end(), actual },
        ));
    }
    Ok(trimmed.to_string())
}

/// Strips everything but ASCII digits.
pub fn normalize_phone(value: &str) -> Result<String, ValidationError> {
    let length = value.trim().chars().count();
    if length > MAX_PHONE_LENGTH {
        return Err(ValidationError::new(
            "phone",
            ValidationErrorKind::Length {
                min: MIN_PHONE_DIGITS,
                max: MAX_PHONE_LENGTH,
                actual: length,
            },
        ));
    }
    let digits = value.chars().filter(char::is_ascii_digit).collect::<String>();
    if digits.len() < MIN_PHONE_DIGITS {
        return Err(ValidationError::new("phone", ValidationErrorKind::TooFewDigits(digits.len())));
    }
    Ok(digits)
}

/// Trims and lower-cases an address that matches the accepted email shape.
pub fn validate_email(value: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if !EMAIL_PATTERN.is_match(trimmed) {
        return Err(ValidationError::new(
            "email",
            ValidationErrorKind::Pattern { expected: "an email address" },
        ));
    }
    Ok(trimmed.to_ascii_lowercase())
}

pub fn parse_member<T>(field: &str, value: &str) -> Result<T, ValidationError>
where
    T: FromStr<Err = UnknownVariant>,
{
    value.parse::<T>().map_err(|error| {
        ValidationError::new(
            field,
            ValidationErrorKind::NotAMember { kind: error.kind, value: error.value },
        )
    })
}

pub fn parse_date(field: &str, value: &str) -> Result<NaiveDate, ValidationError> {
    let trimmed = value.trim();
    // chrono accepts unpadded months and days; the accepted lexical form is fixed-width.
    if trimmed.len() != 10 {
        return Err(ValidationError::new(
            field,
            ValidationErrorKind::UnparsableDate(trimmed.to_string()),
        ));
    }
    NaiveDate::parse_from_str(trimmed, DATE_FORMAT).map_err(|_| {
        ValidationError::new(field, ValidationErrorKind::UnparsableDate(trimmed.to_string()))
    })
}

/// Parses one to five dates, none of them before `today`. Order is preserved.
pub fn parse_preferred_dates(
    values: &[String],
    today: NaiveDate,
) -> Result<Vec<NaiveDate>, ValidationError> {
    if !PREFERRED_DATE_COUNT.contains(&values.len()) {
        return Err(ValidationError::new(
            "preferred_dates",
            ValidationErrorKind::Cardinality {
                min: *PREFERRED_DATE_COUNT.start(),
                max: *PREFERRED_DATE_COUNT.end(),
                actual: values.len(),
            },
        ));
    }

    values
        .iter()
        .enumerate()
        .map(|(index, value)| {
            let field = format!("preferred_dates[{index}]");
            let date = parse_date(&field, value)?;
            if date < today {
                return Err(ValidationError::new(field, ValidationErrorKind::DateInPast(date)));
            }
            Ok(date)
        })
        .collect()
}

pub fn validate_duration(field: &str, minutes: i64) -> Result<u32, ValidationError> {
    if !DURATION_MINUTES.contains(&minutes) {
        return Err(ValidationError::new(
            field,
            ValidationErrorKind::OutOfRange {
                min: *DURATION_MINUTES.start(),
                max: *DURATION_MINUTES.end(),
                actual: minutes,
            },
        ));
    }
    // Range check above guarantees the value fits.
    Ok(minutes as u32)
}

/// Free-text inquiry submitted for intake.
pub fn validate_inquiry(message: &str) -> Result<String, ValidationError> {
    validate_text("message", message, DESCRIPTION_LENGTH)
}

pub fn validate_client_info(input: ClientInfoInput) -> Result<ClientInfo, ValidationError> {
    let name = validate_text("name", &input.name, NAME_LENGTH)?;
    let email = validate_email(&input.email)?;
    let phone = normalize_phone(&input.phone)?;
    let company = input
        .company
        .map(|company| company.trim().to_string())
        .filter(|company| !company.is_empty());

    Ok(ClientInfo::from_validated(name, email, phone, company))
}

pub fn validate_appointment_request(
    input: AppointmentRequestInput,
    today: NaiveDate,
) -> Result<AppointmentRequest, ValidationError> {
    let client_info = validate_client_info(input.client_info).map_err(|error| {
        ValidationError::new(format!("client_info.{}", error.field), error.kind)
    })?;

    Ok(AppointmentRequest {
        client_info,
        practice_area: parse_member("practice_area", &input.practice_area)?,
        appointment_type: parse_member("appointment_type", &input.appointment_type)?,
        urgency: parse_member("urgency", &input.urgency)?,
        preferred_dates: parse_preferred_dates(&input.preferred_dates, today)?,
        description: validate_text("description", &input.description, DESCRIPTION_LENGTH)?,
        duration_minutes: validate_duration("duration_minutes", input.duration_minutes)?,
    })
}

/// Applies the same membership and range rules used for direct input to a collaborator's
/// intake record.
pub fn validate_classification(raw: RawClassification) -> Result<Classification, ValidationError> {
    let appointment_type = raw
        .appointment_type
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(|value| parse_member("intake_analysis.appointment_type", value))
        .transpose()?;

    let estimated_duration_minutes = raw
        .estimated_duration
        .map(|minutes| validate_duration("intake_analysis.estimated_duration", minutes))
        .transpose()?;

    let clarifying_questions = raw
        .questions_to_ask
        .into_iter()
        .map(|question| question.trim().to_string())
        .filter(|question| !question.is_empty())
        .collect();

    Ok(Classification {
        practice_area: parse_member("intake_analysis.practice_area", &raw.practice_area)?,
        urgency: parse_member("intake_analysis.urgency", &raw.urgency)?,
        appointment_type,
        case_summary: validate_text(
            "intake_analysis.case_summary",
            &raw.case_summary,
            CASE_SUMMARY_LENGTH,
        )?,
        clarifying_questions,
        estimated_duration_minutes,
    })
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::domain::practice::{AppointmentType, PracticeArea, UrgencyLevel};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 17).expect("valid date")
    }

    fn client_input() -> ClientInfoInput {
        ClientInfoInput {
            name: "John Smith".to_string(),
            email: "john.smith@example.com".to_string(),
            phone: "555-123-4567".to_string(),
            company: Some("Smith & Associates".to_string()),
        }
    }

    fn request_input() -> AppointmentRequestInput {
        AppointmentRequestInput {
            client_info: client_input(),
            practice_area: "corporate".to_string(),
            appointment_type: "consultation".to_string(),
            urgency: "high".to_string(),
            preferred_dates: vec!["2026-10-19".to_string(), "2026-10-20".to_string()],
            description: "Partnership agreement dispute with my co-founder".to_string(),
            duration_minutes: 60,
        }
    }

    #[test]
    fn phone_with_ten_or_more_digits_normalizes_to_digits_only() {
        for raw in ["5551234567", "555-123-4567", "(555) 123 4567", "+44 2079460958"] {
            let normalized = normalize_phone(raw).expect("enough digits");
            assert!(normalized.len() >= MIN_PHONE_DIGITS);
            assert!(normalized.chars().all(|c| c.is_ascii_digit()), "{normalized}");
        }
    }

    #[test]
    fn phone_with_fewer_than_ten_digits_fails() {
        for raw in ["", "555-1234", "phone: 123456789", "(555) 12-34"] {
            let error = normalize_phone(raw).expect_err("too few digits");
            assert_eq!(error.field, "phone");
            assert!(matches!(error.kind, ValidationErrorKind::TooFewDigits(_)));
        }
    }

    #[test]
    fn phone_longer_than_fifteen_characters_fails_before_digit_count() {
        assert!(normalize_phone("+1 555 123 4567").is_ok());

        for raw in ["+1 (555) 123-4567", "+44 20 7946 0958 ext 12", "5551234567890123"] {
            let error = normalize_phone(raw).expect_err("too long");
            assert_eq!(error.field, "phone");
            assert!(matches!(
                error.kind,
                ValidationErrorKind::Length { max: MAX_PHONE_LENGTH, .. }
            ));
        }

        let mut input = client_input();
        input.phone = "555.123.4567 x 89".to_string();
        let error = validate_client_info(input).expect_err("extension pushes past the cap");
        assert_eq!(error.field, "phone");
    }

    #[test]
    fn name_length_is_counted_after_trimming() {
        let mut input = client_input();
        input.name = "  J ".to_string();
        let error = validate_client_info(input).expect_err("one visible character");
        assert_eq!(error.field, "name");
        assert!(matches!(error.kind, ValidationErrorKind::Length { actual: 1, .. }));

        let mut input = client_input();
        input.name = "x".repeat(101);
        assert!(validate_client_info(input).is_err());
    }

    #[test]
    fn email_must_match_pattern() {
        for bad in ["john", "john@", "john@example", "john@example.c", "jo hn@example.com"] {
            let error = validate_email(bad).expect_err(bad);
            assert_eq!(error.field, "email");
        }
        assert_eq!(validate_email(" A.B+c@Mail.Example.org ").as_deref(), Ok("a.b+c@mail.example.org"));
    }

    #[test]
    fn past_dates_fail_and_today_or_later_succeed() {
        let dates = vec!["2026-10-17".to_string(), "2027-01-02".to_string()];
        let parsed = parse_preferred_dates(&dates, today()).expect("today and later are valid");
        assert_eq!(parsed[0], today());

        let error = parse_preferred_dates(&["2026-10-16".to_string()], today())
            .expect_err("yesterday is in the past");
        assert_eq!(error.field, "preferred_dates[0]");
        assert!(matches!(error.kind, ValidationErrorKind::DateInPast(_)));
    }

    #[test]
    fn dates_must_use_fixed_width_iso_format() {
        for bad in ["2026-1-5", "10/19/2026", "2026-13-01", "2026-02-30", "tomorrow"] {
            let error = parse_preferred_dates(&[bad.to_string()], today()).expect_err(bad);
            assert!(matches!(error.kind, ValidationErrorKind::UnparsableDate(_)), "{bad}");
        }
    }

    #[test]
    fn preferred_date_cardinality_is_one_to_five() {
        let error = parse_preferred_dates(&[], today()).expect_err("empty list");
        assert!(matches!(error.kind, ValidationErrorKind::Cardinality { actual: 0, .. }));

        let six = (20..26).map(|day| format!("2026-10-{day}")).collect::<Vec<_>>();
        let error = parse_preferred_dates(&six, today()).expect_err("six dates");
        assert!(matches!(error.kind, ValidationErrorKind::Cardinality { actual: 6, .. }));
    }

    #[test]
    fn appointment_request_validates_every_field() {
        let request = validate_appointment_request(request_input(), today()).expect("valid");
        assert_eq!(request.practice_area, PracticeArea::Corporate);
        assert_eq!(request.appointment_type, AppointmentType::Consultation);
        assert_eq!(request.urgency, UrgencyLevel::High);
        assert_eq!(request.preferred_dates.len(), 2);
        assert_eq!(request.client_info.phone(), "5551234567");

        let mut input = request_input();
        input.practice_area = "tax".to_string();
        let error = validate_appointment_request(input, today()).expect_err("unknown area");
        assert_eq!(error.field, "practice_area");

        let mut input = request_input();
        input.duration_minutes = 300;
        let error = validate_appointment_request(input, today()).expect_err("too long");
        assert_eq!(error.field, "duration_minutes");

        let mut input = request_input();
        input.description = "help".to_string();
        let error = validate_appointment_request(input, today()).expect_err("too short");
        assert_eq!(error.field, "description");

        let mut input = request_input();
        input.client_info.phone = "12345".to_string();
        let error = validate_appointment_request(input, today()).expect_err("short phone");
        assert_eq!(error.field, "client_info.phone");
    }

    #[test]
    fn duration_defaults_to_sixty_when_omitted() {
        let input: AppointmentRequestInput = serde_json::from_value(serde_json::json!({
            "client_info": {"name": "Ana Lima", "email": "ana@example.com", "phone": "5551234567"},
            "practice_area": "family",
            "appointment_type": "follow_up",
            "urgency": "low",
            "preferred_dates": ["2026-10-20"],
            "description": "Custody schedule follow-up"
        }))
        .expect("deserialize");

        let request = validate_appointment_request(input, today()).expect("valid");
        assert_eq!(request.duration_minutes, DEFAULT_DURATION_MINUTES);
    }

    #[test]
    fn collaborator_output_is_checked_like_direct_input() {
        let raw = RawClassification {
            practice_area: "corporate".to_string(),
            urgency: "urgent".to_string(),
            appointment_type: Some("contract_review".to_string()),
            case_summary: "  Dispute over partnership dissolution  ".to_string(),
            questions_to_ask: vec!["Is there a written agreement?".to_string(), " ".to_string()],
            estimated_duration: Some(90),
        };
        let classification = validate_classification(raw.clone()).expect("valid");
        assert_eq!(classification.case_summary, "Dispute over partnership dissolution");
        assert_eq!(classification.clarifying_questions.len(), 1);
        assert_eq!(classification.estimated_duration_minutes, Some(90));

        let mut bad_area = raw.clone();
        bad_area.practice_area = "contract_review".to_string();
        let error = validate_classification(bad_area).expect_err("not a practice area");
        assert_eq!(error.field, "intake_analysis.practice_area");

        let mut bad_duration = raw;
        bad_duration.estimated_duration = Some(15);
        let error = validate_classification(bad_duration).expect_err("below minimum");
        assert_eq!(error.field, "intake_analysis.estimated_duration");
    }

    #[test]
    fn inquiry_text_is_bounded() {
        assert!(validate_inquiry("hi").is_err());
        assert!(validate_inquiry(&"a".repeat(1001)).is_err());
        assert!(validate_inquiry("My business partner is violating our contract").is_ok());
    }
}
