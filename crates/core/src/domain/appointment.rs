use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::client::{ClientInfo, ClientInfoInput};
use crate::domain::practice::{AppointmentType, PracticeArea, UrgencyLevel};
use crate::validation::DEFAULT_DURATION_MINUTES;

fn default_duration_minutes() -> i64 {
    i64::from(DEFAULT_DURATION_MINUTES)
}

/// A structured booking request as submitted, with enum fields still in string form so that
/// membership failures can be reported per field.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppointmentRequestInput {
    pub client_info: ClientInfoInput,
    pub practice_area: String,
    pub appointment_type: String,
    pub urgency: String,
    pub preferred_dates: Vec<String>,
    pub description: String,
    #[serde(default = "default_duration_minutes")]
    pub duration_minutes: i64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AppointmentRequest {
    pub client_info: ClientInfo,
    pub practice_area: PracticeArea,
    pub appointment_type: AppointmentType,
    pub urgency: UrgencyLevel,
    pub preferred_dates: Vec<NaiveDate>,
    pub description: String,
    pub duration_minutes: u32,
}
