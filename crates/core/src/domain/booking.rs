use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::client::ClientInfo;
use crate::domain::lawyer::LawyerId;
use crate::domain::practice::{AppointmentType, PracticeArea, UrgencyLevel};
use crate::domain::slot::LocationMode;
use crate::errors::DomainError;

pub const BOOKING_SEQUENCE_MAX: u32 = 9_999;

/// `<prefix>-<YYYYMMDD>-<NNNN>`, where `NNNN` is a per-day sequence number.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookingId(pub String);

impl BookingId {
    pub fn new(prefix: &str, date: NaiveDate, sequence: u32) -> Result<Self, DomainError> {
        if sequence == 0 || sequence > BOOKING_SEQUENCE_MAX {
            return Err(DomainError::BookingSequenceExhausted {
                day_prefix: Self::day_prefix(prefix, date),
            });
        }
        Ok(Self(format!("{}{sequence:04}", Self::day_prefix(prefix, date))))
    }

    /// Everything before the sequence number, including the trailing dash.
    pub fn day_prefix(prefix: &str, date: NaiveDate) -> String {
        format!("{prefix}-{}-", date.format("%Y%m%d"))
    }

    pub fn sequence(&self) -> Option<u32> {
        let (_, suffix) = self.0.rsplit_once('-')?;
        if suffix.len() != 4 {
            return None;
        }
        suffix.parse().ok()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for BookingId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingConfirmation {
    pub booking_id: BookingId,
    pub client_info: ClientInfo,
    pub lawyer_id: LawyerId,
    pub lawyer_name: String,
    pub appointment_datetime: NaiveDateTime,
    pub duration_minutes: u32,
    pub practice_area: PracticeArea,
    pub appointment_type: AppointmentType,
    pub location: LocationMode,
    pub meeting_link: Option<String>,
    pub office_location: Option<String>,
    pub preparation_notes: Option<String>,
}

/// Row shape of a persisted appointment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AppointmentRecord {
    pub id: BookingId,
    pub client: ClientInfo,
    pub lawyer_id: LawyerId,
    pub appointment_datetime: NaiveDateTime,
    pub duration_minutes: u32,
    pub practice_area: PracticeArea,
    pub appointment_type: AppointmentType,
    pub urgency: UrgencyLevel,
    pub case_description: Option<String>,
    pub meeting_link: Option<String>,
    pub office_location: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl AppointmentRecord {
    pub fn from_confirmation(
        booking: &BookingConfirmation,
        urgency: UrgencyLevel,
        case_description: Option<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: booking.booking_id.clone(),
            client: booking.client_info.clone(),
            lawyer_id: booking.lawyer_id.clone(),
            appointment_datetime: booking.appointment_datetime,
            duration_minutes: booking.duration_minutes,
            practice_area: booking.practice_area,
            appointment_type: booking.appointment_type,
            urgency,
            case_description,
            meeting_link: booking.meeting_link.clone(),
            office_location: booking.office_location.clone(),
            created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::BookingId;
    use crate::errors::DomainError;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).expect("valid date")
    }

    #[test]
    fn formats_prefix_date_and_padded_sequence() {
        let id = BookingId::new("LEG", day(), 7).expect("sequence in range");
        assert_eq!(id.as_str(), "LEG-20261019-0007");
        assert_eq!(id.sequence(), Some(7));
    }

    #[test]
    fn rejects_sequence_outside_four_digits() {
        let error = BookingId::new("LEG", day(), 10_000).expect_err("five digits do not fit");
        assert!(matches!(
            error,
            DomainError::BookingSequenceExhausted { ref day_prefix } if day_prefix == "LEG-20261019-"
        ));
        assert!(BookingId::new("LEG", day(), 0).is_err());
    }
}
