use std::sync::Arc;

use async_trait::async_trait;
use lexbook_core::{AppointmentType, BookingConfirmation, PracticeArea};

use crate::intake::CollaboratorError;
use crate::llm::{ChatMessage, Completion, CompletionRequest, LlmClient};
use crate::prompts;

/// Free-text collaborator for the confirmation stage.
#[async_trait]
pub trait NotesWriter: Send + Sync {
    async fn preparation_notes(
        &self,
        practice_area: PracticeArea,
        appointment_type: AppointmentType,
        case_summary: &str,
    ) -> Result<String, CollaboratorError>;

    async fn confirmation_email(
        &self,
        booking: &BookingConfirmation,
    ) -> Result<String, CollaboratorError>;
}

pub struct LlmNotesWriter {
    client: Arc<dyn LlmClient>,
}

impl LlmNotesWriter {
    pub fn new(client: Arc<dyn LlmClient>) -> Self {
        Self { client }
    }

    async fn text(&self, system: &str, user: String) -> Result<String, CollaboratorError> {
        let request =
            CompletionRequest::text(vec![ChatMessage::system(system), ChatMessage::user(user)]);
        match self.client.complete(request).await? {
            Completion::Text(text) => Ok(text.trim().to_owned()),
            Completion::FunctionCall { name, .. } => Err(CollaboratorError::MalformedOutput(
                format!("expected free text, received a call to `{name}`"),
            )),
        }
    }
}

#[async_trait]
impl NotesWriter for LlmNotesWriter {
    async fn preparation_notes(
        &self,
        practice_area: PracticeArea,
        appointment_type: AppointmentType,
        case_summary: &str,
    ) -> Result<String, CollaboratorError> {
        let message =
            prompts::preparation_notes_message(practice_area, appointment_type, case_summary)?;
        self.text(prompts::NOTES_SYSTEM_PROMPT, message).await
    }

    async fn confirmation_email(
        &self,
        booking: &BookingConfirmation,
    ) -> Result<String, CollaboratorError> {
        let message = prompts::confirmation_email_message(booking)?;
        self.text(prompts::EMAIL_SYSTEM_PROMPT, message).await
    }
}
