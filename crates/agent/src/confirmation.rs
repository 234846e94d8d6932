use std::sync::Arc;

use chrono::Utc;
use lexbook_core::config::BookingConfig;
use lexbook_core::validation::{self, DEFAULT_DURATION_MINUTES};
use lexbook_core::{
    AppointmentRecord, BookingConfirmation, BookingId, Classification, ClientInfo,
    ClientInfoInput, Clock, DomainError, Lawyer, LawyerId, LocationMode, PracticeArea,
    RawClassification, SlotSelection, ValidationError,
};
use lexbook_db::repositories::{
    AppointmentRepository, ClientRepository, LawyerRepository, RepositoryError,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::communication::NotesWriter;
use crate::intake::CollaboratorError;
use crate::outcome::ErrorClass;
use crate::scheduling::{AvailabilityResolver, ResolveError};

/// Inserts tried before a concurrently taken booking id is reported as a conflict.
const MAX_BOOKING_ID_ATTEMPTS: u32 = 5;

/// Confirmation body as submitted, before client and intake fields are checked.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct ConfirmationRequestInput {
    pub client_info: ClientInfoInput,
    pub lawyer_id: String,
    pub slot: SlotSelection,
    pub intake_analysis: RawClassification,
}

/// What a client sends back after picking an option.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmationRequest {
    pub client_info: ClientInfo,
    pub lawyer_id: LawyerId,
    pub slot: SlotSelection,
    #[serde(rename = "intake_analysis")]
    pub classification: Classification,
}

impl ConfirmationRequest {
    pub fn validate(input: ConfirmationRequestInput) -> Result<Self, ValidationError> {
        let client_info = validation::validate_client_info(input.client_info).map_err(|error| {
            ValidationError::new(format!("client_info.{}", error.field), error.kind)
        })?;
        let lawyer_id = validation::validate_text("lawyer_id", &input.lawyer_id, 1..=64)?;

        Ok(Self {
            client_info,
            lawyer_id: LawyerId(lawyer_id),
            slot: input.slot,
            classification: validation::validate_classification(input.intake_analysis)?,
        })
    }
}

#[derive(Debug, Error)]
pub enum ConfirmationError {
    #[error("lawyer `{0}` does not exist")]
    UnknownLawyer(LawyerId),
    #[error("lawyer `{lawyer_id}` does not practice {practice_area}")]
    PracticeAreaMismatch { lawyer_id: LawyerId, practice_area: PracticeArea },
    #[error("slot {starts_at} ({location}) is not offered by lawyer `{lawyer_id}`")]
    SlotNotOffered { lawyer_id: LawyerId, starts_at: String, location: &'static str },
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error(transparent)]
    Resolve(#[from] ResolveError),
    #[error("preparation notes failed: {0}")]
    Collaborator(#[from] CollaboratorError),
    #[error(transparent)]
    Persistence(#[from] RepositoryError),
}

impl ConfirmationError {
    pub fn error_class(&self) -> ErrorClass {
        match self {
            Self::UnknownLawyer(_)
            | Self::PracticeAreaMismatch { .. }
            | Self::SlotNotOffered { .. }
            | Self::Domain(_) => ErrorClass::Invariant,
            Self::Resolve(error) => error.error_class(),
            Self::Collaborator(error) => error.error_class(),
            Self::Persistence(_) => ErrorClass::Persistence,
        }
    }
}

/// A committed booking and the optional confirmation email body.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ComposedBooking {
    pub booking: BookingConfirmation,
    pub confirmation_email: Option<String>,
}

pub struct ConfirmationComposer {
    lawyers: Arc<dyn LawyerRepository>,
    appointments: Arc<dyn AppointmentRepository>,
    clients: Arc<dyn ClientRepository>,
    resolver: Arc<AvailabilityResolver>,
    notes: Arc<dyn NotesWriter>,
    clock: Arc<dyn Clock>,
    settings: BookingConfig,
}

impl ConfirmationComposer {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        lawyers: Arc<dyn LawyerRepository>,
        appointments: Arc<dyn AppointmentRepository>,
        clients: Arc<dyn ClientRepository>,
        resolver: Arc<AvailabilityResolver>,
        notes: Arc<dyn NotesWriter>,
        clock: Arc<dyn Clock>,
        settings: BookingConfig,
    ) -> Self {
        Self { lawyers, appointments, clients, resolver, notes, clock, settings }
    }

    pub async fn compose(
        &self,
        request: &ConfirmationRequest,
        correlation_id: &str,
    ) -> Result<ComposedBooking, ConfirmationError> {
        let classification = &request.classification;
        let lawyer = self.selected_lawyer(&request.lawyer_id, classification.practice_area).await?;

        let offered = self
            .resolver
            .slots_for_lawyer(&lawyer, request.slot.starts_at.date(), self.clock.now())
            .await?;
        let slot = offered
            .iter()
            .find(|slot| {
                slot.starts_at == request.slot.starts_at && slot.location == request.slot.location
            })
            .ok_or_else(|| ConfirmationError::SlotNotOffered {
                lawyer_id: lawyer.id.clone(),
                starts_at: request.slot.starts_at.to_string(),
                location: request.slot.location.as_str(),
            })?;

        let duration_minutes = classification
            .estimated_duration_minutes
            .unwrap_or(DEFAULT_DURATION_MINUTES)
            .min(slot.duration_ceiling_minutes);
        let appointment_type = classification.appointment_type_or_default();

        let preparation_notes = self
            .notes
            .preparation_notes(
                classification.practice_area,
                appointment_type,
                &classification.case_summary,
            )
            .await?;

        let created_at = Utc::now();
        let mut attempt = 1;
        let booking = loop {
            let booking_id = self.next_booking_id().await?;
            let (meeting_link, office_location) = match slot.location {
                LocationMode::Virtual => (
                    Some(format!(
                        "{}/{}",
                        self.settings.meeting_link_base.trim_end_matches('/'),
                        booking_id.as_str().to_lowercase()
                    )),
                    None,
                ),
                LocationMode::Office => (None, Some(self.settings.office_location.clone())),
            };
            let booking = BookingConfirmation {
                booking_id,
                client_info: request.client_info.clone(),
                lawyer_id: lawyer.id.clone(),
                lawyer_name: lawyer.name.clone(),
                appointment_datetime: slot.starts_at,
                duration_minutes,
                practice_area: classification.practice_area,
                appointment_type,
                location: slot.location,
                meeting_link,
                office_location,
                preparation_notes: Some(preparation_notes.clone()),
            };

            let record = AppointmentRecord::from_confirmation(
                &booking,
                classification.urgency,
                Some(classification.case_summary.clone()),
                created_at,
            );
            match self.appointments.insert(&record).await {
                Ok(()) => break booking,
                // Another confirmation took this id between the sequence read and the insert.
                Err(RepositoryError::Conflict(taken)) if attempt < MAX_BOOKING_ID_ATTEMPTS => {
                    warn!(
                        event_name = "booking.id_conflict_retry",
                        correlation_id,
                        booking_id = %taken,
                        attempt,
                        "booking id already taken; allocating the next one"
                    );
                    attempt += 1;
                }
                Err(error) => return Err(error.into()),
            }
        };
        self.clients.upsert(&booking.client_info, created_at).await?;
        info!(
            event_name = "booking.appointment_persisted",
            correlation_id,
            booking_id = %booking.booking_id,
            lawyer_id = %booking.lawyer_id,
            appointment_datetime = %booking.appointment_datetime,
            location = booking.location.as_str(),
            "appointment persisted"
        );

        let confirmation_email = match self.notes.confirmation_email(&booking).await {
            Ok(email) => Some(email),
            Err(error) => {
                warn!(
                    event_name = "booking.confirmation_email_failed",
                    correlation_id,
                    booking_id = %booking.booking_id,
                    error = %error,
                    "confirmation email omitted"
                );
                None
            }
        };

        Ok(ComposedBooking { booking, confirmation_email })
    }

    async fn selected_lawyer(
        &self,
        lawyer_id: &LawyerId,
        practice_area: PracticeArea,
    ) -> Result<Lawyer, ConfirmationError> {
        let lawyer = self
            .lawyers
            .find_by_id(lawyer_id)
            .await?
            .ok_or_else(|| ConfirmationError::UnknownLawyer(lawyer_id.clone()))?;
        if !lawyer.practices(practice_area) {
            return Err(ConfirmationError::PracticeAreaMismatch {
                lawyer_id: lawyer.id,
                practice_area,
            });
        }
        Ok(lawyer)
    }

    async fn next_booking_id(&self) -> Result<BookingId, ConfirmationError> {
        let prefix = &self.settings.booking_id_prefix;
        let today = self.clock.today();
        let day_prefix = BookingId::day_prefix(prefix, today);
        let used = self.appointments.max_booking_sequence(&day_prefix).await?;
        Ok(BookingId::new(prefix, today, used.saturating_add(1))?)
    }
}
