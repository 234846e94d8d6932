use thiserror::Error;
use tracing::{info, warn};

use crate::flows::states::{
    FlowAction, FlowEntry, FlowEvent, FlowState, TransitionOutcome,
};

pub trait FlowDefinition {
    fn entry_state(&self, entry: FlowEntry) -> FlowState;
    fn transition(
        &self,
        current: &FlowState,
        event: &FlowEvent,
    ) -> Result<TransitionOutcome, FlowTransitionError>;
}

#[derive(Clone, Debug, Default)]
pub struct BookingFlow;

impl FlowDefinition for BookingFlow {
    fn entry_state(&self, entry: FlowEntry) -> FlowState {
        match entry {
            FlowEntry::Inquiry | FlowEntry::StructuredSearch => FlowState::Start,
            FlowEntry::Confirmation => FlowState::Offered,
        }
    }

    fn transition(
        &self,
        current: &FlowState,
        event: &FlowEvent,
    ) -> Result<TransitionOutcome, FlowTransitionError> {
        transition_booking(current, event)
    }
}

#[derive(Clone, Debug)]
pub struct FlowEngine<F> {
    flow: F,
}

impl<F> FlowEngine<F>
where
    F: FlowDefinition,
{
    pub fn new(flow: F) -> Self {
        Self { flow }
    }

    pub fn entry_state(&self, entry: FlowEntry) -> FlowState {
        self.flow.entry_state(entry)
    }

    pub fn apply(
        &self,
        current: &FlowState,
        event: &FlowEvent,
    ) -> Result<TransitionOutcome, FlowTransitionError> {
        self.flow.transition(current, event)
    }

    /// Applies a transition and logs the result under the caller's correlation id.
    pub fn apply_traced(
        &self,
        current: &FlowState,
        event: &FlowEvent,
        correlation_id: &str,
    ) -> Result<TransitionOutcome, FlowTransitionError> {
        let result = self.apply(current, event);
        match &result {
            Ok(outcome) => info!(
                event_name = "flow.transition_applied",
                correlation_id,
                from = ?outcome.from,
                to = ?outcome.to,
                event = ?outcome.event,
                actions = ?outcome.actions,
                "booking flow transition applied"
            ),
            Err(error) => warn!(
                event_name = "flow.transition_rejected",
                correlation_id,
                error = %error,
                "booking flow transition rejected"
            ),
        }
        result
    }
}

impl Default for FlowEngine<BookingFlow> {
    fn default() -> Self {
        Self::new(BookingFlow)
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum FlowTransitionError {
    #[error("invalid transition from {state:?} using event {event:?}")]
    InvalidTransition { state: FlowState, event: FlowEvent },
}

fn transition_booking(
    current: &FlowState,
    event: &FlowEvent,
) -> Result<TransitionOutcome, FlowTransitionError> {
    use FlowAction::{
        ComposeConfirmation, PersistAppointment, PresentOptions, QueryAvailability, ReportError,
        RequestClientInfo, RequestPreparationNotes, SendConfirmationEmail,
    };
    use FlowEvent::{
        ClientInfoMissing, ClientInfoProvided, InquiryClassified, LawyersMatched,
        NoLawyersMatched, SlotSelected, StageFailed, StructuredRequestReceived,
    };
    use FlowState::{
        Classified, Confirmed, Failed, NeedsClientInfo, NoAvailability, Offered, Searched, Start,
    };

    if current.is_terminal() {
        return Err(FlowTransitionError::InvalidTransition {
            state: current.clone(),
            event: event.clone(),
        });
    }

    let (to, actions) = match (current, event) {
        (Start, InquiryClassified) => (Classified, Vec::new()),
        (Start, StructuredRequestReceived) => (Searched, vec![QueryAvailability]),
        (Classified, ClientInfoMissing) => (NeedsClientInfo, vec![RequestClientInfo]),
        (Classified, ClientInfoProvided) => (Searched, vec![QueryAvailability]),
        (Searched, NoLawyersMatched) => (NoAvailability, Vec::new()),
        (Searched, LawyersMatched) => (Offered, vec![PresentOptions]),
        (Offered, SlotSelected) => (
            Confirmed,
            vec![
                ComposeConfirmation,
                RequestPreparationNotes,
                PersistAppointment,
                SendConfirmationEmail,
            ],
        ),
        (_, StageFailed) => (Failed, vec![ReportError]),
        _ => {
            return Err(FlowTransitionError::InvalidTransition {
                state: current.clone(),
                event: event.clone(),
            });
        }
    };

    Ok(TransitionOutcome { from: current.clone(), to, event: event.clone(), actions })
}

#[cfg(test)]
mod tests {
    use crate::flows::engine::{BookingFlow, FlowEngine, FlowTransitionError};
    use crate::flows::states::{FlowAction, FlowEntry, FlowEvent, FlowState};

    #[test]
    fn inquiry_with_client_info_reaches_offered() {
        let engine = FlowEngine::new(BookingFlow);
        let mut state = engine.entry_state(FlowEntry::Inquiry);
        assert_eq!(state, FlowState::Start);

        state = engine
            .apply(&state, &FlowEvent::InquiryClassified)
            .expect("start -> classified")
            .to;
        let searched = engine
            .apply(&state, &FlowEvent::ClientInfoProvided)
            .expect("classified -> searched");
        assert_eq!(searched.actions, vec![FlowAction::QueryAvailability]);

        let offered = engine
            .apply(&searched.to, &FlowEvent::LawyersMatched)
            .expect("searched -> offered");
        assert_eq!(offered.to, FlowState::Offered);
        assert_eq!(offered.actions, vec![FlowAction::PresentOptions]);
    }

    #[test]
    fn inquiry_without_client_info_stops_early() {
        let engine = FlowEngine::default();

        let classified = engine
            .apply(&FlowState::Start, &FlowEvent::InquiryClassified)
            .expect("start -> classified")
            .to;
        let outcome = engine
            .apply(&classified, &FlowEvent::ClientInfoMissing)
            .expect("classified -> needs client info");

        assert_eq!(outcome.to, FlowState::NeedsClientInfo);
        assert!(outcome.to.is_terminal());
        assert_eq!(outcome.actions, vec![FlowAction::RequestClientInfo]);
    }

    #[test]
    fn structured_search_skips_classification() {
        let engine = FlowEngine::default();
        let start = engine.entry_state(FlowEntry::StructuredSearch);

        let searched = engine
            .apply(&start, &FlowEvent::StructuredRequestReceived)
            .expect("start -> searched")
            .to;
        let outcome = engine
            .apply(&searched, &FlowEvent::NoLawyersMatched)
            .expect("searched -> no availability");
        assert_eq!(outcome.to, FlowState::NoAvailability);
    }

    #[test]
    fn confirmation_enters_at_offered() {
        let engine = FlowEngine::default();
        let offered = engine.entry_state(FlowEntry::Confirmation);

        let outcome = engine
            .apply(&offered, &FlowEvent::SlotSelected)
            .expect("offered -> confirmed");
        assert_eq!(outcome.to, FlowState::Confirmed);
        assert_eq!(outcome.actions.first(), Some(&FlowAction::ComposeConfirmation));
        assert!(outcome.actions.contains(&FlowAction::PersistAppointment));
    }

    #[test]
    fn invalid_transition_is_rejected() {
        let engine = FlowEngine::default();
        let error = engine
            .apply(&FlowState::Start, &FlowEvent::SlotSelected)
            .expect_err("cannot select a slot before options exist");

        assert!(matches!(
            error,
            FlowTransitionError::InvalidTransition {
                state: FlowState::Start,
                event: FlowEvent::SlotSelected
            }
        ));
    }

    #[test]
    fn terminal_states_reject_every_event() {
        let engine = FlowEngine::default();
        for state in [
            FlowState::NeedsClientInfo,
            FlowState::NoAvailability,
            FlowState::Confirmed,
            FlowState::Failed,
        ] {
            let error = engine
                .apply(&state, &FlowEvent::StageFailed)
                .expect_err("terminal state");
            assert!(matches!(error, FlowTransitionError::InvalidTransition { .. }));
        }
    }

    #[test]
    fn any_live_stage_can_fail() {
        let engine = FlowEngine::default();
        for state in
            [FlowState::Start, FlowState::Classified, FlowState::Searched, FlowState::Offered]
        {
            let outcome =
                engine.apply(&state, &FlowEvent::StageFailed).expect("live stage can fail");
            assert_eq!(outcome.to, FlowState::Failed);
        }
    }

    #[test]
    fn traced_apply_returns_same_outcome() {
        let engine = FlowEngine::default();
        let plain = engine.apply(&FlowState::Searched, &FlowEvent::LawyersMatched);
        let traced =
            engine.apply_traced(&FlowState::Searched, &FlowEvent::LawyersMatched, "req-42");
        assert_eq!(plain, traced);
    }
}
