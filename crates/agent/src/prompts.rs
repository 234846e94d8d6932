//! Prompt templates for the intake and notes collaborators.

use lexbook_core::{AppointmentType, BookingConfirmation, PracticeArea, UrgencyLevel};
use serde_json::{json, Value};
use tera::{Context, Tera};
use thiserror::Error;

pub const INTAKE_SYSTEM_PROMPT: &str = "You are an intake specialist for a prestigious law firm. \
Analyze client inquiries and extract the practice area, urgency, appointment type, a short case \
summary, clarifying questions worth asking and an estimated consultation length.";

pub const NOTES_SYSTEM_PROMPT: &str = "Generate helpful preparation notes for a legal \
consultation. Include what documents to bring, questions to prepare, and what to expect.";

pub const EMAIL_SYSTEM_PROMPT: &str = "You are a professional legal assistant. Write a warm, \
professional appointment confirmation email that includes preparation instructions and what to \
bring.";

pub const INTAKE_FUNCTION_NAME: &str = "extract_client_needs";
pub const INTAKE_FUNCTION_DESCRIPTION: &str = "Extract structured information from client inquiry";

const INTAKE_USER_TEMPLATE: &str = "Client inquiry: {{ message }}";

const NOTES_USER_TEMPLATE: &str = "\
Practice area: {{ practice_area }}
Appointment type: {{ appointment_type }}
Case description: {{ case_summary }}";

const EMAIL_USER_TEMPLATE: &str = "\
Client: {{ client_name }}{% if company %} ({{ company }}){% endif %}
Lawyer: {{ lawyer_name }}
Date/Time: {{ appointment_datetime }}
Practice Area: {{ practice_area }}
Type: {{ appointment_type }}
Duration: {{ duration_minutes }} minutes
{% if meeting_link %}Meeting link: {{ meeting_link }}
{% endif %}{% if office_location %}Office: {{ office_location }}
{% endif %}{% if preparation_notes %}
Preparation notes:
{{ preparation_notes }}
{% endif %}";

#[derive(Debug, Error)]
#[error("prompt template `{template}` failed to render: {source}")]
pub struct PromptError {
    pub template: &'static str,
    #[source]
    pub source: tera::Error,
}

fn render(template: &'static str, body: &str, context: &Context) -> Result<String, PromptError> {
    Tera::one_off(body, context, false).map_err(|source| PromptError { template, source })
}

pub fn intake_user_message(message: &str) -> Result<String, PromptError> {
    let mut context = Context::new();
    context.insert("message", message);
    render("intake_user", INTAKE_USER_TEMPLATE, &context)
}

pub fn preparation_notes_message(
    practice_area: PracticeArea,
    appointment_type: AppointmentType,
    case_summary: &str,
) -> Result<String, PromptError> {
    let mut context = Context::new();
    context.insert("practice_area", practice_area.as_str());
    context.insert("appointment_type", appointment_type.as_str());
    context.insert("case_summary", case_summary);
    render("preparation_notes", NOTES_USER_TEMPLATE, &context)
}

pub fn confirmation_email_message(booking: &BookingConfirmation) -> Result<String, PromptError> {
    let mut context = Context::new();
    context.insert("client_name", booking.client_info.name());
    context.insert("company", &booking.client_info.company());
    context.insert("lawyer_name", &booking.lawyer_name);
    context.insert(
        "appointment_datetime",
        &booking.appointment_datetime.format("%A, %B %-d, %Y at %-I:%M %p").to_string(),
    );
    context.insert("practice_area", booking.practice_area.as_str());
    context.insert("appointment_type", booking.appointment_type.as_str());
    context.insert("duration_minutes", &booking.duration_minutes);
    context.insert("meeting_link", &booking.meeting_link);
    context.insert("office_location", &booking.office_location);
    context.insert("preparation_notes", &booking.preparation_notes);
    render("confirmation_email", EMAIL_USER_TEMPLATE, &context)
}

fn allowed<T: Copy>(values: &[T], as_str: fn(&T) -> &'static str) -> Vec<&'static str> {
    values.iter().map(as_str).collect()
}

/// JSON-schema parameters of the forced intake function.
pub fn intake_function_parameters() -> Value {
    json!({
        "type": "object",
        "properties": {
            "practice_area": {
                "type": "string",
                "enum": allowed(PracticeArea::ALL, PracticeArea::as_str),
            },
            "urgency": {
                "type": "string",
                "enum": allowed(UrgencyLevel::ALL, UrgencyLevel::as_str),
            },
            "appointment_type": {
                "type": "string",
                "enum": allowed(AppointmentType::ALL, AppointmentType::as_str),
            },
            "case_summary": { "type": "string" },
            "questions_to_ask": {
                "type": "array",
                "items": { "type": "string" },
            },
            "estimated_duration": {
                "type": "integer",
                "minimum": 30,
                "maximum": 240,
            },
        },
        "required": ["practice_area", "urgency", "case_summary"],
    })
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use lexbook_core::{
        AppointmentType, BookingConfirmation, BookingId, ClientInfo, LawyerId, LocationMode,
        PracticeArea,
    };

    use super::*;

    fn booking() -> BookingConfirmation {
        let client: ClientInfo = serde_json::from_value(serde_json::json!({
            "name": "John Smith",
            "email": "john.smith@example.com",
            "phone": "555-123-4567",
            "company": "Smith Holdings"
        }))
        .expect("valid client");
        let date = NaiveDate::from_ymd_opt(2026, 10, 19).expect("date");
        BookingConfirmation {
            booking_id: BookingId::new("LEG", date, 1).expect("id"),
            client_info: client,
            lawyer_id: LawyerId("lawyer_1".to_owned()),
            lawyer_name: "Sarah Johnson".to_owned(),
            appointment_datetime: date.and_hms_opt(14, 0, 0).expect("time"),
            duration_minutes: 90,
            practice_area: PracticeArea::Corporate,
            appointment_type: AppointmentType::Consultation,
            location: LocationMode::Virtual,
            meeting_link: Some("https://meet.google.com/leg-20261019-0001".to_owned()),
            office_location: None,
            preparation_notes: Some("Bring the partnership agreement.".to_owned()),
        }
    }

    #[test]
    fn intake_message_wraps_inquiry() {
        let rendered = intake_user_message("My partner is <leaving> & taking clients")
            .expect("renders");
        assert_eq!(rendered, "Client inquiry: My partner is <leaving> & taking clients");
    }

    #[test]
    fn notes_message_lists_fields() {
        let rendered = preparation_notes_message(
            PracticeArea::RealEstate,
            AppointmentType::DocumentReview,
            "Closing on a duplex",
        )
        .expect("renders");
        assert!(rendered.contains("Practice area: real_estate"));
        assert!(rendered.contains("Appointment type: document_review"));
        assert!(rendered.contains("Case description: Closing on a duplex"));
    }

    #[test]
    fn email_message_includes_booking_details() {
        let rendered = confirmation_email_message(&booking()).expect("renders");
        assert!(rendered.contains("Client: John Smith (Smith Holdings)"));
        assert!(rendered.contains("Lawyer: Sarah Johnson"));
        assert!(rendered.contains("Monday, October 19, 2026 at 2:00 PM"));
        assert!(rendered.contains("Duration: 90 minutes"));
        assert!(rendered.contains("Meeting link: https://meet.google.com/leg-20261019-0001"));
        assert!(!rendered.contains("Office:"));
        assert!(rendered.contains("Bring the partnership agreement."));
    }

    #[test]
    fn intake_schema_enumerates_fixed_values() {
        let schema = intake_function_parameters();
        let areas = schema["properties"]["practice_area"]["enum"]
            .as_array()
            .expect("enum array");
        assert_eq!(areas.len(), 8);
        assert!(areas.iter().any(|area| area == "intellectual_property"));
        assert_eq!(schema["required"], serde_json::json!(["practice_area", "urgency", "case_summary"]));
    }
}
