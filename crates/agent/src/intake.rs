use std::sync::Arc;

use async_trait::async_trait;
use lexbook_core::RawClassification;
use thiserror::Error;
use tracing::debug;

use crate::llm::{ChatMessage, Completion, CompletionRequest, FunctionSpec, LlmClient, LlmError};
use crate::outcome::ErrorClass;
use crate::prompts::{self, PromptError};

/// Failure of an external collaborator call (intake, notes or email).
#[derive(Debug, Error)]
pub enum CollaboratorError {
    #[error(transparent)]
    Llm(#[from] LlmError),
    #[error(transparent)]
    Prompt(#[from] PromptError),
    #[error("collaborator did not call `{expected}`")]
    MissingFunctionCall { expected: String },
    #[error("collaborator output is malformed: {0}")]
    MalformedOutput(String),
}

impl CollaboratorError {
    /// Output that arrived but could not be used, as opposed to a failed call.
    pub fn is_malformed_output(&self) -> bool {
        matches!(self, Self::MalformedOutput(_) | Self::MissingFunctionCall { .. })
    }

    pub fn error_class(&self) -> ErrorClass {
        if self.is_malformed_output() {
            ErrorClass::CollaboratorOutput
        } else {
            ErrorClass::Collaborator
        }
    }
}

#[async_trait]
pub trait IntakeClassifier: Send + Sync {
    /// Turns a free-text inquiry into an unchecked classification record.
    async fn classify(&self, inquiry: &str) -> Result<RawClassification, CollaboratorError>;
}

pub struct LlmIntakeClassifier {
    client: Arc<dyn LlmClient>,
}

impl LlmIntakeClassifier {
    pub fn new(client: Arc<dyn LlmClient>) -> Self {
        Self { client }
    }

    fn function() -> FunctionSpec {
        FunctionSpec {
            name: prompts::INTAKE_FUNCTION_NAME.to_owned(),
            description: prompts::INTAKE_FUNCTION_DESCRIPTION.to_owned(),
            parameters: prompts::intake_function_parameters(),
        }
    }
}

#[async_trait]
impl IntakeClassifier for LlmIntakeClassifier {
    async fn classify(&self, inquiry: &str) -> Result<RawClassification, CollaboratorError> {
        let request = CompletionRequest::forced_call(
            vec![
                ChatMessage::system(prompts::INTAKE_SYSTEM_PROMPT),
                ChatMessage::user(prompts::intake_user_message(inquiry)?),
            ],
            Self::function(),
        );

        match self.client.complete(request).await? {
            Completion::FunctionCall { name, arguments } if name == prompts::INTAKE_FUNCTION_NAME => {
                debug!(event_name = "agent.intake.arguments_received", bytes = arguments.len());
                parse_arguments(&arguments)
            }
            Completion::FunctionCall { .. } | Completion::Text(_) => {
                Err(CollaboratorError::MissingFunctionCall {
                    expected: prompts::INTAKE_FUNCTION_NAME.to_owned(),
                })
            }
        }
    }
}

pub fn parse_arguments(arguments: &str) -> Result<RawClassification, CollaboratorError> {
    serde_json::from_str(arguments)
        .map_err(|error| CollaboratorError::MalformedOutput(error.to_string()))
}
