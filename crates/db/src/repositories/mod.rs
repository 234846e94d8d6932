use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use thiserror::Error;
use tracing::warn;

use lexbook_core::domain::booking::{AppointmentRecord, BookingId};
use lexbook_core::domain::client::ClientInfo;
use lexbook_core::domain::lawyer::{Lawyer, LawyerId};
use lexbook_core::domain::practice::PracticeArea;

pub mod appointment;
pub mod client;
pub mod lawyer;
pub mod memory;

pub use appointment::SqlAppointmentRepository;
pub use client::SqlClientRepository;
pub use lawyer::SqlLawyerRepository;
pub use memory::{
    InMemoryAppointmentRepository, InMemoryClientRepository, InMemoryLawyerRepository,
};

/// Stored form of `appointment_datetime`.
pub const DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";
/// Format of sqlite's `CURRENT_TIMESTAMP` default.
const SQLITE_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("decode error: {0}")]
    Decode(String),
    #[error("duplicate key: {0}")]
    Conflict(String),
}

/// A lawyer row as stored, with practice areas still in comma-delimited text form.
///
/// Stored text may carry tokens that are not practice areas (the seed data does); those are
/// dropped when the row is decoded into a [`Lawyer`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LawyerRecord {
    pub id: LawyerId,
    pub name: String,
    pub practice_areas: String,
    pub hourly_rate: Decimal,
    pub email: String,
}

impl From<&Lawyer> for LawyerRecord {
    fn from(lawyer: &Lawyer) -> Self {
        Self {
            id: lawyer.id.clone(),
            name: lawyer.name.clone(),
            practice_areas: lawyer
                .practice_areas
                .iter()
                .map(PracticeArea::as_str)
                .collect::<Vec<_>>()
                .join(","),
            hourly_rate: lawyer.hourly_rate,
            email: lawyer.email.clone(),
        }
    }
}

impl LawyerRecord {
    pub fn into_lawyer(self) -> Lawyer {
        let practice_areas = decode_practice_areas(&self.id, &self.practice_areas);
        Lawyer {
            id: self.id,
            name: self.name,
            practice_areas,
            hourly_rate: self.hourly_rate,
            email: self.email,
        }
    }

    /// Whole-token match against the stored comma-delimited list.
    pub fn has_practice_token(&self, area: PracticeArea) -> bool {
        self.practice_areas.split(',').any(|token| token.trim() == area.as_str())
    }
}

pub(crate) fn decode_practice_areas(id: &LawyerId, stored: &str) -> Vec<PracticeArea> {
    stored
        .split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .filter_map(|token| match token.parse::<PracticeArea>() {
            Ok(area) => Some(area),
            Err(_) => {
                warn!(
                    event_name = "db.lawyer.unknown_practice_token",
                    lawyer_id = %id,
                    token,
                    "skipping stored practice-area token that is not a practice area"
                );
                None
            }
        })
        .collect()
}

pub(crate) fn format_datetime(value: NaiveDateTime) -> String {
    value.format(DATETIME_FORMAT).to_string()
}

pub(crate) fn parse_datetime(field: &str, value: &str) -> Result<NaiveDateTime, RepositoryError> {
    NaiveDateTime::parse_from_str(value, DATETIME_FORMAT)
        .map_err(|error| RepositoryError::Decode(format!("{field} `{value}`: {error}")))
}

/// Accepts both RFC 3339 (written by this crate) and sqlite's default timestamp format.
pub(crate) fn parse_timestamp(field: &str, value: &str) -> Result<DateTime<Utc>, RepositoryError> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Ok(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(value, SQLITE_TIMESTAMP_FORMAT)
        .map(|naive| naive.and_utc())
        .map_err(|error| RepositoryError::Decode(format!("{field} `{value}`: {error}")))
}

#[async_trait]
pub trait LawyerRepository: Send + Sync {
    /// Inserts unless a lawyer with the same id exists. Returns whether a row was written.
    async fn insert_if_absent(&self, record: &LawyerRecord) -> Result<bool, RepositoryError>;
    async fn find_by_id(&self, id: &LawyerId) -> Result<Option<Lawyer>, RepositoryError>;
    /// Lawyers whose stored practice areas contain `area` as a whole token, ordered by id.
    async fn find_by_practice_area(
        &self,
        area: PracticeArea,
    ) -> Result<Vec<Lawyer>, RepositoryError>;
    async fn list(&self) -> Result<Vec<LawyerRecord>, RepositoryError>;
}

#[async_trait]
pub trait AppointmentRepository: Send + Sync {
    /// Plain insert; a duplicate booking id is `RepositoryError::Conflict`, never an overwrite.
    async fn insert(&self, record: &AppointmentRecord) -> Result<(), RepositoryError>;
    async fn find_by_id(
        &self,
        id: &BookingId,
    ) -> Result<Option<AppointmentRecord>, RepositoryError>;
    async fn count(&self) -> Result<u64, RepositoryError>;
    /// Highest sequence number already used under `day_prefix`, or 0.
    async fn max_booking_sequence(&self, day_prefix: &str) -> Result<u32, RepositoryError>;
}

#[async_trait]
pub trait ClientRepository: Send + Sync {
    /// Creates or refreshes the client row keyed by email and returns its id.
    async fn upsert(
        &self,
        client: &ClientInfo,
        seen_at: DateTime<Utc>,
    ) -> Result<String, RepositoryError>;
    async fn count(&self) -> Result<u64, RepositoryError>;
}
