//! Chat-completions client for OpenAI-compatible endpoints (OpenAI itself and Ollama's `/v1`).

use std::time::Duration;

use async_trait::async_trait;
use lexbook_core::config::LlmConfig;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{debug, warn};

const DEFAULT_BACKOFF: Duration = Duration::from_millis(250);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatRole {
    System,
    User,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: ChatRole::System, content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: ChatRole::User, content: content.into() }
    }
}

/// A function the model is forced to call; `parameters` is a JSON schema.
#[derive(Clone, Debug, PartialEq)]
pub struct FunctionSpec {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CompletionRequest {
    pub messages: Vec<ChatMessage>,
    pub function: Option<FunctionSpec>,
}

impl CompletionRequest {
    pub fn text(messages: Vec<ChatMessage>) -> Self {
        Self { messages, function: None }
    }

    pub fn forced_call(messages: Vec<ChatMessage>, function: FunctionSpec) -> Self {
        Self { messages, function: Some(function) }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Completion {
    Text(String),
    FunctionCall { name: String, arguments: String },
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum LlmError {
    #[error("llm request failed: {0}")]
    Transport(String),
    #[error("llm request timed out after {0} seconds")]
    Timeout(u64),
    #[error("llm endpoint returned HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("llm response could not be decoded: {0}")]
    InvalidResponse(String),
    #[error("llm returned an empty response")]
    EmptyResponse,
    #[error("llm client misconfigured: {0}")]
    Configuration(String),
}

impl LlmError {
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(_) | Self::Timeout(_) => true,
            Self::Status { status, .. } => *status == 429 || *status >= 500,
            Self::InvalidResponse(_) | Self::EmptyResponse | Self::Configuration(_) => false,
        }
    }
}

#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(&self, request: CompletionRequest) -> Result<Completion, LlmError>;
}

pub struct OpenAiCompatibleClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: Option<SecretString>,
    model: String,
    timeout_secs: u64,
    max_retries: u32,
    backoff: Duration,
}

impl OpenAiCompatibleClient {
    pub fn new(config: &LlmConfig) -> Result<Self, LlmError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|error| LlmError::Configuration(error.to_string()))?;

        Ok(Self {
            http,
            endpoint: format!("{}/chat/completions", config.effective_base_url()),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            timeout_secs: config.timeout_secs,
            max_retries: config.max_retries,
            backoff: DEFAULT_BACKOFF,
        })
    }

    /// Base delay before the first retry; doubled on every further attempt.
    pub fn with_backoff(mut self, backoff: Duration) -> Self {
        self.backoff = backoff;
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn request_body(&self, request: &CompletionRequest) -> Value {
        let mut body = json!({
            "model": self.model,
            "messages": request.messages,
        });

        if let Some(function) = &request.function {
            body["tools"] = json!([{
                "type": "function",
                "function": {
                    "name": function.name,
                    "description": function.description,
                    "parameters": function.parameters,
                }
            }]);
            body["tool_choice"] = json!({
                "type": "function",
                "function": { "name": function.name }
            });
        }

        body
    }

    async fn send_once(&self, body: &Value) -> Result<ChatCompletionResponse, LlmError> {
        let mut request = self.http.post(&self.endpoint).json(body);
        if let Some(api_key) = &self.api_key {
            request = request.bearer_auth(api_key.expose_secret());
        }

        let response = request.send().await.map_err(|error| {
            if error.is_timeout() {
                LlmError::Timeout(self.timeout_secs)
            } else {
                LlmError::Transport(error.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Status { status: status.as_u16(), body: truncate(&body, 512) });
        }

        response
            .json::<ChatCompletionResponse>()
            .await
            .map_err(|error| LlmError::InvalidResponse(error.to_string()))
    }
}

#[async_trait]
impl LlmClient for OpenAiCompatibleClient {
    async fn complete(&self, request: CompletionRequest) -> Result<Completion, LlmError> {
        let body = self.request_body(&request);
        let mut attempt = 0;

        let response = loop {
            match self.send_once(&body).await {
                Ok(response) => break response,
                Err(error) if error.is_retryable() && attempt < self.max_retries => {
                    let delay = self.backoff.saturating_mul(2_u32.saturating_pow(attempt));
                    warn!(
                        event_name = "llm.request_retry",
                        attempt = attempt + 1,
                        max_retries = self.max_retries,
                        delay_ms = delay.as_millis() as u64,
                        error = %error,
                        "retrying llm request"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(error) => return Err(error),
            }
        };

        debug!(event_name = "llm.request_completed", attempts = attempt + 1, "llm request completed");
        interpret(response, request.function.as_ref())
    }
}

fn interpret(
    response: ChatCompletionResponse,
    function: Option<&FunctionSpec>,
) -> Result<Completion, LlmError> {
    let message =
        response.choices.into_iter().next().map(|choice| choice.message).ok_or(LlmError::EmptyResponse)?;

    if function.is_some() {
        let call = message
            .tool_calls
            .into_iter()
            .next()
            .map(|tool_call| tool_call.function)
            .or(message.function_call)
            .ok_or(LlmError::EmptyResponse)?;
        let arguments = match call.arguments {
            Value::String(text) => text,
            other => other.to_string(),
        };
        return Ok(Completion::FunctionCall { name: call.name, arguments });
    }

    message
        .content
        .filter(|content| !content.trim().is_empty())
        .map(Completion::Text)
        .ok_or(LlmError::EmptyResponse)
}

fn truncate(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    tool_calls: Vec<ToolCall>,
    #[serde(default)]
    function_call: Option<FunctionCall>,
}

#[derive(Debug, Deserialize)]
struct ToolCall {
    function: FunctionCall,
}

#[derive(Debug, Deserialize)]
struct FunctionCall {
    name: String,
    #[serde(default)]
    arguments: Value,
}
