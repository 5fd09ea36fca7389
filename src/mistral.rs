use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, instrument};

use crate::config::{ApiKey, ServerConfig};
use crate::error::UpstreamError;
use crate::wire::{ConversationMessage, Role};

// Structures matching the /chat/completions endpoint
#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: Vec<UpstreamMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

// Only role and content go upstream; attached files stay client-side.
#[derive(Serialize)]
struct UpstreamMessage<'a> {
    role: Role,
    content: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CompletionMessage {
    #[serde(default)]
    pub role: Option<Role>,
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CompletionChoice {
    #[serde(default)]
    pub index: u32,
    pub message: CompletionMessage,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Completion {
    pub choices: Vec<CompletionChoice>,
}

impl Completion {
    /// Text and finish reason of the first choice.
    pub fn first_reply(&self) -> Result<(&str, Option<&str>), UpstreamError> {
        let choice = self.choices.first().ok_or(UpstreamError::NoChoices)?;
        let content = choice.message.content.as_deref().ok_or_else(|| {
            UpstreamError::MalformedBody("first choice has no message content".into())
        })?;
        Ok((content, choice.finish_reason.as_deref()))
    }
}

/// Pull a human-readable message out of an error body. Accepts
/// `{"error": {"message": ..}}`, `{"error": ".."}` and `{"message": ..}`.
fn upstream_error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    ["/error/message", "/error", "/message"]
        .iter()
        .find_map(|pointer| value.pointer(pointer).and_then(|v| v.as_str()))
        .map(str::to_string)
}

/// Client for the hosted chat-completions API.
#[derive(Clone)]
pub struct MistralClient {
    http: Client,
    api_url: String,
    api_key: ApiKey,
    temperature: f32,
    max_tokens: u32,
}

impl MistralClient {
    pub fn new(config: &ServerConfig) -> Self {
        Self {
            http: Client::new(),
            api_url: config.api_url.clone(),
            api_key: config.api_key.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        }
    }

    #[instrument(skip(self, messages), fields(message_count = messages.len()))]
    pub async fn complete(
        &self,
        model: &str,
        messages: &[ConversationMessage],
    ) -> Result<Completion, UpstreamError> {
        let url = format!("{}/chat/completions", self.api_url);
        let payload = CompletionRequest {
            model,
            messages: messages
                .iter()
                .map(|m| UpstreamMessage {
                    role: m.role,
                    content: &m.content,
                })
                .collect(),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        let response = self
            .http
            .post(&url)
            .bearer_auth(self.api_key.expose())
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            error!(%status, %body, "Chat completion request failed");
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                message: upstream_error_message(&body),
            });
        }

        let completion: Completion = serde_json::from_str(&body)
            .map_err(|e| UpstreamError::MalformedBody(e.to_string()))?;
        if completion.choices.is_empty() {
            return Err(UpstreamError::NoChoices);
        }
        debug!(choices = completion.choices.len(), "Received chat completion");
        Ok(completion)
    }
}
