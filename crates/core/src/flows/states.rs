use serde::{Deserialize, Serialize};

/// Which entry point a request arrived through. Each call starts a fresh walk of the flow; no
/// state is persisted between calls.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowEntry {
    Inquiry,
    StructuredSearch,
    Confirmation,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowState {
    Start,
    Classified,
    Searched,
    Offered,
    NeedsClientInfo,
    NoAvailability,
    Confirmed,
    Failed,
}

impl FlowState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::NeedsClientInfo | Self::NoAvailability | Self::Confirmed | Self::Failed)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowEvent {
    InquiryClassified,
    StructuredRequestReceived,
    ClientInfoMissing,
    ClientInfoProvided,
    NoLawyersMatched,
    LawyersMatched,
    SlotSelected,
    StageFailed,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowAction {
    RequestClientInfo,
    QueryAvailability,
    PresentOptions,
    ComposeConfirmation,
    RequestPreparationNotes,
    PersistAppointment,
    SendConfirmationEmail,
    ReportError,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionOutcome {
    pub from: FlowState,
    pub to: FlowState,
    pub event: FlowEvent,
    pub actions: Vec<FlowAction>,
}
