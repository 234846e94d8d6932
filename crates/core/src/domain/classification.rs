use serde::{Deserialize, Serialize};

use crate::domain::practice::{AppointmentType, PracticeArea, UrgencyLevel};
use crate::validation::{self, ValidationError};

/// Intake record as returned by the classification collaborator, before any checks.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawClassification {
    pub practice_area: String,
    pub urgency: String,
    #[serde(default)]
    pub appointment_type: Option<String>,
    pub case_summary: String,
    #[serde(default)]
    pub questions_to_ask: Vec<String>,
    #[serde(default)]
    pub estimated_duration: Option<i64>,
}

/// Intake record whose enum members and duration have been checked.
///
/// Serialized with the collaborator's field names so a caller can hand the value back on the
/// confirmation call; deserializing re-runs validation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawClassification")]
pub struct Classification {
    pub practice_area: PracticeArea,
    pub urgency: UrgencyLevel,
    pub appointment_type: Option<AppointmentType>,
    pub case_summary: String,
    #[serde(rename = "questions_to_ask")]
    pub clarifying_questions: Vec<String>,
    #[serde(rename = "estimated_duration")]
    pub estimated_duration_minutes: Option<u32>,
}

impl Classification {
    pub fn appointment_type_or_default(&self) -> AppointmentType {
        self.appointment_type.unwrap_or_default()
    }
}

impl TryFrom<RawClassification> for Classification {
    type Error = ValidationError;

    fn try_from(raw: RawClassification) -> Result<Self, Self::Error> {
        validation::validate_classification(raw)
    }
}

#[cfg(test)]
mod tests {
    use crate::domain::practice::{AppointmentType, PracticeArea, UrgencyLevel};

    use super::Classification;

    #[test]
    fn serialized_form_deserializes_back() {
        let classification: Classification = serde_json::from_str(
            r#"{
                "practice_area": "corporate",
                "urgency": "high",
                "case_summary": "Partnership dispute ahead of a board meeting",
                "questions_to_ask": ["When was the agreement signed?"],
                "estimated_duration": 90
            }"#,
        )
        .expect("valid classification");

        assert_eq!(classification.practice_area, PracticeArea::Corporate);
        assert_eq!(classification.urgency, UrgencyLevel::High);
        assert_eq!(classification.appointment_type_or_default(), AppointmentType::Consultation);

        let json = serde_json::to_string(&classification).expect("serialize");
        let again: Classification = serde_json::from_str(&json).expect("deserialize again");
        assert_eq!(again, classification);
    }

    #[test]
    fn unknown_practice_area_is_rejected() {
        let error = serde_json::from_str::<Classification>(
            r#"{"practice_area":"maritime","urgency":"low","case_summary":"Boat trouble"}"#,
        )
        .expect_err("maritime is not offered");
        assert!(error.to_string().contains("practice_area"));
    }
}
