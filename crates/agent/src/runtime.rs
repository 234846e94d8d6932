use std::fmt;
use std::sync::Arc;

use chrono::{Days, NaiveDate};
use lexbook_core::config::{AppConfig, AvailabilityProviderKind, BookingConfig};
use lexbook_core::flows::{
    BookingFlow, FlowEngine, FlowEntry, FlowEvent, FlowState, FlowTransitionError,
};
use lexbook_core::validation::{self, ValidationError};
use lexbook_core::{
    AppointmentRequest, AvailabilityProvider, Classification, ClientInfo, ClientInfoInput, Clock,
    DomainError, SyntheticAvailability, SystemClock,
};
use lexbook_db::repositories::{
    AppointmentRepository, ClientRepository, LawyerRepository, SqlAppointmentRepository,
    SqlClientRepository, SqlLawyerRepository,
};
use lexbook_db::DbPool;
use serde::Deserialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::calendar::CalendarAvailability;
use crate::communication::{LlmNotesWriter, NotesWriter};
use crate::confirmation::{ConfirmationComposer, ConfirmationRequest};
use crate::intake::{IntakeClassifier, LlmIntakeClassifier};
use crate::llm::{LlmClient, LlmError, OpenAiCompatibleClient};
use crate::outcome::{BookingOutcome, ErrorClass, LawyerOption, NEXT_STEP_CLIENT_SELECTION};
use crate::scheduling::{AvailabilityResolver, LawyerAvailability};

const NEEDS_CLIENT_INFO_MESSAGE: &str =
    "Please provide your contact information to proceed with booking.";
const NO_AVAILABILITY_MESSAGE: &str =
    "No lawyers available in the requested practice area and timeframe.";
const OPTIONS_AVAILABLE_MESSAGE: &str = "Found available lawyers for your consultation.";
const CONFIRMED_MESSAGE: &str = "Your consultation has been booked.";

/// Inquiry body as submitted.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct InquiryRequestInput {
    pub message: String,
    #[serde(default)]
    pub client_info: Option<ClientInfoInput>,
    #[serde(default)]
    pub preferred_dates: Option<Vec<String>>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InquiryRequest {
    pub message: String,
    pub client_info: Option<ClientInfo>,
    pub preferred_dates: Option<Vec<NaiveDate>>,
}

impl InquiryRequest {
    /// An empty `preferred_dates` list means the default search window.
    pub fn validate(input: InquiryRequestInput, today: NaiveDate) -> Result<Self, ValidationError> {
        let message = validation::validate_inquiry(&input.message)?;
        let client_info = input
            .client_info
            .map(|client| {
                validation::validate_client_info(client).map_err(|error| {
                    ValidationError::new(format!("client_info.{}", error.field), error.kind)
                })
            })
            .transpose()?;
        let preferred_dates = input
            .preferred_dates
            .filter(|dates| !dates.is_empty())
            .map(|dates| validation::parse_preferred_dates(&dates, today))
            .transpose()?;

        Ok(Self { message, client_info, preferred_dates })
    }
}

#[derive(Debug, Error)]
pub enum RuntimeBuildError {
    #[error(transparent)]
    Llm(#[from] LlmError),
    #[error("calendar client could not be built: {0}")]
    Calendar(#[from] reqwest::Error),
    #[error("availability.calendar_base_url is required for the calendar provider")]
    MissingCalendarUrl,
}

/// Collaborators and stores a runtime is assembled from.
pub struct RuntimeParts {
    pub intake: Arc<dyn IntakeClassifier>,
    pub notes: Arc<dyn NotesWriter>,
    pub provider: Arc<dyn AvailabilityProvider>,
    pub lawyers: Arc<dyn LawyerRepository>,
    pub appointments: Arc<dyn AppointmentRepository>,
    pub clients: Arc<dyn ClientRepository>,
    pub clock: Arc<dyn Clock>,
    pub settings: BookingConfig,
}

/// Runs one request through intake, availability and confirmation. Holds no per-request state.
pub struct BookingRuntime {
    intake: Arc<dyn IntakeClassifier>,
    resolver: Arc<AvailabilityResolver>,
    composer: ConfirmationComposer,
    engine: FlowEngine<BookingFlow>,
    clock: Arc<dyn Clock>,
    settings: BookingConfig,
}

impl BookingRuntime {
    pub fn new(parts: RuntimeParts) -> Self {
        let resolver = Arc::new(AvailabilityResolver::new(parts.lawyers.clone(), parts.provider));
        let composer = ConfirmationComposer::new(
            parts.lawyers,
            parts.appointments,
            parts.clients,
            resolver.clone(),
            parts.notes,
            parts.clock.clone(),
            parts.settings.clone(),
        );

        Self {
            intake: parts.intake,
            resolver,
            composer,
            engine: FlowEngine::default(),
            clock: parts.clock,
            settings: parts.settings,
        }
    }

    /// Wires the LLM collaborators, the configured availability provider and the SQL stores.
    pub fn from_config(config: &AppConfig, pool: DbPool) -> Result<Self, RuntimeBuildError> {
        let llm: Arc<dyn LlmClient> = Arc::new(OpenAiCompatibleClient::new(&config.llm)?);
        let provider: Arc<dyn AvailabilityProvider> = match config.availability.provider {
            AvailabilityProviderKind::Synthetic => Arc::new(SyntheticAvailability),
            AvailabilityProviderKind::Calendar => {
                let base_url = config
                    .availability
                    .calendar_base_url
                    .as_deref()
                    .ok_or(RuntimeBuildError::MissingCalendarUrl)?;
                Arc::new(CalendarAvailability::new(base_url, config.availability.timeout_secs)?)
            }
        };

        Ok(Self::new(RuntimeParts {
            intake: Arc::new(LlmIntakeClassifier::new(llm.clone())),
            notes: Arc::new(LlmNotesWriter::new(llm)),
            provider,
            lawyers: Arc::new(SqlLawyerRepository::new(pool.clone())),
            appointments: Arc::new(SqlAppointmentRepository::new(pool.clone())),
            clients: Arc::new(SqlClientRepository::new(pool)),
            clock: Arc::new(SystemClock),
            settings: config.booking.clone(),
        }))
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    pub fn availability_provider(&self) -> &'static str {
        self.resolver.provider_name()
    }

    /// `booking.search_window_days` consecutive dates starting tomorrow.
    pub fn default_search_window(&self) -> Vec<NaiveDate> {
        let today = self.clock.today();
        (1..=u64::from(self.settings.search_window_days))
            .filter_map(|offset| today.checked_add_days(Days::new(offset)))
            .collect()
    }

    pub async fn process_booking_request(
        &self,
        request: InquiryRequest,
        correlation_id: &str,
    ) -> BookingOutcome {
        let mut flow = FlowCursor::new(&self.engine, FlowEntry::Inquiry, correlation_id);
        match self.run_inquiry(&mut flow, request).await {
            Ok(outcome) => outcome,
            Err(failure) => flow.fail(failure),
        }
    }

    pub async fn search_appointment_request(
        &self,
        request: AppointmentRequest,
        correlation_id: &str,
    ) -> BookingOutcome {
        let mut flow = FlowCursor::new(&self.engine, FlowEntry::StructuredSearch, correlation_id);
        let result = match flow.advance(FlowEvent::StructuredRequestReceived) {
            Ok(()) => {
                let dates = request.preferred_dates.clone();
                self.offer(&mut flow, classification_from_request(&request), dates).await
            }
            Err(failure) => Err(failure),
        };
        result.unwrap_or_else(|failure| flow.fail(failure))
    }

    pub async fn confirm_booking(
        &self,
        request: ConfirmationRequest,
        correlation_id: &str,
    ) -> BookingOutcome {
        let mut flow = FlowCursor::new(&self.engine, FlowEntry::Confirmation, correlation_id);
        let composed = match self.composer.compose(&request, correlation_id).await {
            Ok(composed) => composed,
            Err(error) => {
                let error_class = error.error_class();
                return flow.fail(StageFailure::new(error, error_class));
            }
        };
        if let Err(failure) = flow.advance(FlowEvent::SlotSelected) {
            return flow.fail(failure);
        }

        info!(
            event_name = "booking.confirmed",
            correlation_id,
            booking_id = %composed.booking.booking_id,
            email_attached = composed.confirmation_email.is_some(),
            "booking confirmed"
        );
        BookingOutcome::Confirmed {
            message: CONFIRMED_MESSAGE.to_owned(),
            booking: composed.booking,
            confirmation_email: composed.confirmation_email,
        }
    }

    async fn run_inquiry(
        &self,
        flow: &mut FlowCursor<'_>,
        request: InquiryRequest,
    ) -> Result<BookingOutcome, StageFailure> {
        let raw = self.intake.classify(&request.message).await.map_err(|error| {
            let error_class = error.error_class();
            StageFailure::new(error, error_class)
        })?;
        let classification = Classification::try_from(raw)
            .map_err(|error| StageFailure::new(error, ErrorClass::CollaboratorOutput))?;
        flow.advance(FlowEvent::InquiryClassified)?;
        info!(
            event_name = "agent.intake.classified",
            correlation_id = flow.correlation_id,
            practice_area = classification.practice_area.as_str(),
            urgency = classification.urgency.as_str(),
            "inquiry classified"
        );

        if request.client_info.is_none() {
            flow.advance(FlowEvent::ClientInfoMissing)?;
            let questions = classification.clarifying_questions.clone();
            return Ok(BookingOutcome::NeedsClientInfo {
                message: NEEDS_CLIENT_INFO_MESSAGE.to_owned(),
                intake_analysis: classification,
                questions,
            });
        }

        flow.advance(FlowEvent::ClientInfoProvided)?;
        let dates = request.preferred_dates.unwrap_or_else(|| self.default_search_window());
        self.offer(flow, classification, dates).await
    }

    async fn offer(
        &self,
        flow: &mut FlowCursor<'_>,
        classification: Classification,
        dates: Vec<NaiveDate>,
    ) -> Result<BookingOutcome, StageFailure> {
        let available = self
            .resolver
            .find_available_lawyers(classification.practice_area, &dates, self.clock.now())
            .await
            .map_err(|error| {
                let error_class = error.error_class();
                StageFailure::new(error, error_class)
            })?;

        if available.is_empty() {
            flow.advance(FlowEvent::NoLawyersMatched)?;
            return Ok(BookingOutcome::NoAvailability {
                message: NO_AVAILABILITY_MESSAGE.to_owned(),
                intake_analysis: classification,
                searched_dates: dates,
                alternative_dates: true,
            });
        }

        flow.advance(FlowEvent::LawyersMatched)?;
        let available_lawyers = available
            .into_iter()
            .map(|entry| self.preview(entry))
            .collect::<Vec<_>>();
        info!(
            event_name = "booking.options_presented",
            correlation_id = flow.correlation_id,
            lawyers = available_lawyers.len(),
            "booking options presented"
        );

        Ok(BookingOutcome::OptionsAvailable {
            message: OPTIONS_AVAILABLE_MESSAGE.to_owned(),
            intake_analysis: classification,
            available_lawyers,
            next_step: NEXT_STEP_CLIENT_SELECTION.to_owned(),
        })
    }

    fn preview(&self, entry: LawyerAvailability) -> LawyerOption {
        let LawyerAvailability { lawyer, mut slots } = entry;
        slots.truncate(self.settings.preview_slots);
        LawyerOption {
            lawyer_id: lawyer.id,
            name: lawyer.name,
            hourly_rate: lawyer.hourly_rate,
            practice_areas: lawyer.practice_areas,
            available_slots: slots,
        }
    }
}

/// Intake record equivalent of a structured request, so search results can be confirmed the
/// same way as inquiry results.
fn classification_from_request(request: &AppointmentRequest) -> Classification {
    Classification {
        practice_area: request.practice_area,
        urgency: request.urgency,
        appointment_type: Some(request.appointment_type),
        case_summary: request.description.clone(),
        clarifying_questions: Vec::new(),
        estimated_duration_minutes: Some(request.duration_minutes),
    }
}

struct StageFailure {
    detail: String,
    error_class: ErrorClass,
}

impl StageFailure {
    fn new(detail: impl fmt::Display, error_class: ErrorClass) -> Self {
        Self { detail: detail.to_string(), error_class }
    }
}

impl From<FlowTransitionError> for StageFailure {
    fn from(error: FlowTransitionError) -> Self {
        Self::new(DomainError::from(error), ErrorClass::Invariant)
    }
}

/// Current position of one request in the booking flow.
struct FlowCursor<'a> {
    engine: &'a FlowEngine<BookingFlow>,
    state: FlowState,
    correlation_id: &'a str,
}

impl<'a> FlowCursor<'a> {
    fn new(engine: &'a FlowEngine<BookingFlow>, entry: FlowEntry, correlation_id: &'a str) -> Self {
        Self { engine, state: engine.entry_state(entry), correlation_id }
    }

    fn advance(&mut self, event: FlowEvent) -> Result<(), StageFailure> {
        let outcome = self.engine.apply_traced(&self.state, &event, self.correlation_id)?;
        self.state = outcome.to;
        Ok(())
    }

    fn fail(&mut self, failure: StageFailure) -> BookingOutcome {
        warn!(
            event_name = "booking.stage_failed",
            correlation_id = self.correlation_id,
            state = ?self.state,
            error_class = failure.error_class.as_str(),
            error = %failure.detail,
            "booking request failed"
        );
        if !self.state.is_terminal() {
            if let Ok(outcome) =
                self.engine.apply_traced(&self.state, &FlowEvent::StageFailed, self.correlation_id)
            {
                self.state = outcome.to;
            }
        }
        BookingOutcome::error(failure.detail, failure.error_class)
    }
}
