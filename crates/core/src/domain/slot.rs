use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Where an appointment takes place.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationMode {
    Office,
    Virtual,
}

impl LocationMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Office => "office",
            Self::Virtual => "virtual",
        }
    }
}

/// A bookable start time. Derived on demand and never persisted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilitySlot {
    /// Firm-local wall-clock time.
    #[serde(rename = "datetime")]
    pub starts_at: NaiveDateTime,
    #[serde(rename = "duration_available")]
    pub duration_ceiling_minutes: u32,
    #[serde(rename = "slot_type")]
    pub location: LocationMode,
}

/// The slot a client picked from an options preview.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotSelection {
    #[serde(rename = "datetime")]
    pub starts_at: NaiveDateTime,
    #[serde(rename = "slot_type")]
    pub location: LocationMode,
}

impl From<&AvailabilitySlot> for SlotSelection {
    fn from(slot: &AvailabilitySlot) -> Self {
        Self { starts_at: slot.starts_at, location: slot.location }
    }
}
