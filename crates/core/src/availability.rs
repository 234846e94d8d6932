//! Candidate slot generation and the provider seam used by the availability resolver.

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::lawyer::Lawyer;
use crate::domain::slot::{AvailabilitySlot, LocationMode};

/// Local start hours offered each day, in generation order.
pub const SLOT_HOURS: [u32; 6] = [9, 10, 11, 14, 15, 16];
pub const MAX_SLOTS: usize = 6;
pub const SLOT_CEILING_MINUTES: u32 = 120;
pub const MIN_BOOKABLE_MINUTES: u32 = 30;
/// Slots starting before this hour are held at the office.
pub const OFFICE_CUTOFF_HOUR: u32 = 12;

#[derive(Debug, Error)]
pub enum AvailabilityError {
    #[error("calendar request for lawyer `{lawyer_id}` failed: {message}")]
    Transport { lawyer_id: String, message: String },
    #[error("calendar returned status {status} for lawyer `{lawyer_id}`")]
    Status { lawyer_id: String, status: u16 },
    #[error("calendar response for lawyer `{lawyer_id}` could not be decoded: {message}")]
    Decode { lawyer_id: String, message: String },
}

#[async_trait]
pub trait AvailabilityProvider: Send + Sync {
    /// Bookable slots for `lawyer` on `dates`, strictly after `now`, at most [`MAX_SLOTS`].
    async fn slots_for(
        &self,
        lawyer: &Lawyer,
        dates: &[NaiveDate],
        now: NaiveDateTime,
    ) -> Result<Vec<AvailabilitySlot>, AvailabilityError>;

    fn name(&self) -> &'static str;
}

/// Deterministic schedule: every lawyer is free at every standard hour.
#[derive(Clone, Copy, Debug, Default)]
pub struct SyntheticAvailability;

#[async_trait]
impl AvailabilityProvider for SyntheticAvailability {
    async fn slots_for(
        &self,
        _lawyer: &Lawyer,
        dates: &[NaiveDate],
        now: NaiveDateTime,
    ) -> Result<Vec<AvailabilitySlot>, AvailabilityError> {
        Ok(synthetic_slots(dates, now))
    }

    fn name(&self) -> &'static str {
        "synthetic"
    }
}

pub fn location_for(starts_at: NaiveDateTime) -> LocationMode {
    if starts_at.hour() < OFFICE_CUTOFF_HOUR {
        LocationMode::Office
    } else {
        LocationMode::Virtual
    }
}

/// Standard start times on `dates` that lie strictly after `now`, date-major and hour-minor.
pub fn candidate_starts(dates: &[NaiveDate], now: NaiveDateTime) -> Vec<NaiveDateTime> {
    dates
        .iter()
        .flat_map(|date| {
            SLOT_HOURS.iter().filter_map(move |hour| {
                NaiveTime::from_hms_opt(*hour, 0, 0).map(|time| date.and_time(time))
            })
        })
        .filter(|starts_at| *starts_at > now)
        .collect()
}

pub fn synthetic_slots(dates: &[NaiveDate], now: NaiveDateTime) -> Vec<AvailabilitySlot> {
    candidate_starts(dates, now)
        .into_iter()
        .take(MAX_SLOTS)
        .map(|starts_at| AvailabilitySlot {
            starts_at,
            duration_ceiling_minutes: SLOT_CEILING_MINUTES,
            location: location_for(starts_at),
        })
        .collect()
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusyInterval {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

/// Drops candidates that start inside a busy interval and bounds each remaining slot by the
/// gap to the next busy interval.
pub fn reconcile_with_busy(
    candidates: &[NaiveDateTime],
    busy: &[BusyInterval],
) -> Vec<AvailabilitySlot> {
    candidates
        .iter()
        .filter(|starts_at| {
            !busy.iter().any(|interval| interval.start <= **starts_at && **starts_at < interval.end)
        })
        .filter_map(|starts_at| {
            let ceiling = busy
                .iter()
                .filter(|interval| interval.start > *starts_at)
                .map(|interval| (interval.start - *starts_at).num_minutes())
                .min()
                .map_or(SLOT_CEILING_MINUTES, |gap| {
                    u32::try_from(gap).unwrap_or(SLOT_CEILING_MINUTES).min(SLOT_CEILING_MINUTES)
                });
            (ceiling >= MIN_BOOKABLE_MINUTES).then_some(AvailabilitySlot {
                starts_at: *starts_at,
                duration_ceiling_minutes: ceiling,
                location: location_for(*starts_at),
            })
        })
        .take(MAX_SLOTS)
        .collect()
}
