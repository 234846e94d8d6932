use chrono::NaiveDate;
use lexbook_core::{AvailabilitySlot, BookingConfirmation, Classification, LawyerId, PracticeArea};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub const NEXT_STEP_CLIENT_SELECTION: &str = "client_selection";

/// Coarse failure category reported alongside an `error` outcome.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorClass {
    Collaborator,
    CollaboratorOutput,
    Persistence,
    Invariant,
    Availability,
}

impl ErrorClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Collaborator => "collaborator",
            Self::CollaboratorOutput => "collaborator_output",
            Self::Persistence => "persistence",
            Self::Invariant => "invariant",
            Self::Availability => "availability",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LawyerOption {
    pub lawyer_id: LawyerId,
    pub name: String,
    pub hourly_rate: Decimal,
    pub practice_areas: Vec<PracticeArea>,
    pub available_slots: Vec<AvailabilitySlot>,
}

/// Result of one pass through the booking pipeline, tagged by `status` on the wire.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BookingOutcome {
    NeedsClientInfo {
        message: String,
        intake_analysis: Classification,
        questions: Vec<String>,
    },
    NoAvailability {
        message: String,
        intake_analysis: Classification,
        searched_dates: Vec<NaiveDate>,
        alternative_dates: bool,
    },
    OptionsAvailable {
        message: String,
        intake_analysis: Classification,
        available_lawyers: Vec<LawyerOption>,
        next_step: String,
    },
    Confirmed {
        message: String,
        booking: BookingConfirmation,
        confirmation_email: Option<String>,
    },
    Error {
        message: String,
        error_class: ErrorClass,
    },
}

impl BookingOutcome {
    pub fn status(&self) -> &'static str {
        match self {
            Self::NeedsClientInfo { .. } => "needs_client_info",
            Self::NoAvailability { .. } => "no_availability",
            Self::OptionsAvailable { .. } => "options_available",
            Self::Confirmed { .. } => "confirmed",
            Self::Error { .. } => "error",
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }

    pub(crate) fn error(detail: impl std::fmt::Display, error_class: ErrorClass) -> Self {
        Self::Error {
            message: format!("An error occurred while processing your request: {detail}"),
            error_class,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{BookingOutcome, ErrorClass};

    #[test]
    fn error_outcome_serializes_with_status_tag() {
        let outcome = BookingOutcome::error("llm request timed out", ErrorClass::Collaborator);
        let json = serde_json::to_value(&outcome).expect("serialize");

        assert_eq!(json["status"], "error");
        assert_eq!(json["error_class"], "collaborator");
        assert_eq!(
            json["message"],
            "An error occurred while processing your request: llm request timed out"
        );
        assert_eq!(outcome.status(), "error");
        assert!(outcome.is_error());
    }

    #[test]
    fn error_class_names_match_wire_form() {
        for class in [
            ErrorClass::Collaborator,
            ErrorClass::CollaboratorOutput,
            ErrorClass::Persistence,
            ErrorClass::Invariant,
            ErrorClass::Availability,
        ] {
            assert_eq!(serde_json::to_value(class).expect("serialize"), class.as_str());
        }
    }
}
