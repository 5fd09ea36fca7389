// Chat pipeline shared by the web API and the terminal client: plan the
// prompt, call the model, split the reply, advance the consultant phase.

use tracing::{info, instrument};

use crate::config::{ModelConfig, ServerConfig};
use crate::error::ChatError;
use crate::extract::{self, Extraction};
use crate::mistral::MistralClient;
use crate::phase::{self, PlanInput};
use crate::wire::{ChatRequest, ChatResponse, Choice, MessageKind, ReplyMessage, Role};

/// Turn raw reply text into the message returned to the client. A reply
/// carrying a file bundle keeps only its prose in `content`.
pub fn reply_message(reply: &str) -> ReplyMessage {
    match extract::extract(reply) {
        Extraction::Plain { text } => ReplyMessage {
            role: Role::Assistant,
            content: text,
            kind: None,
            files: None,
        },
        Extraction::Structured { leading_text, files } => ReplyMessage {
            role: Role::Assistant,
            content: leading_text,
            kind: Some(MessageKind::Collapsible),
            files: Some(files),
        },
    }
}

#[derive(Clone)]
pub struct ChatService {
    client: MistralClient,
    models: ModelConfig,
}

impl ChatService {
    pub fn new(config: &ServerConfig) -> Self {
        Self {
            client: MistralClient::new(config),
            models: config.models.clone(),
        }
    }

    /// Handle one chat turn. On error nothing is advanced; the caller keeps
    /// its state and may resubmit.
    #[instrument(skip_all, fields(consultant = request.is_consultant_mode, messages = request.messages.len()))]
    pub async fn respond(&self, request: &ChatRequest) -> Result<ChatResponse, ChatError> {
        let last_user = request.last_user_message();
        let plan = phase::plan_prompt(PlanInput {
            is_consultant_mode: request.is_consultant_mode,
            state: request.consultant_state.as_ref(),
            project_id: request.project_id.as_deref(),
            last_user_message: last_user,
        });

        let mut outbound = plan.system_messages;
        outbound.extend(request.messages.iter().cloned());

        let model = self.models.for_mode(request.is_consultant_mode);
        info!(model, phase = ?plan.effective_phase, "Sending chat request");

        let completion = self.client.complete(model, &outbound).await?;
        let (reply, finish_reason) = completion.first_reply()?;

        let consultant_state = if request.is_consultant_mode {
            let current = request.consultant_state.clone().unwrap_or_default();
            Some(phase::advance(&current, reply, last_user))
        } else {
            None
        };

        let message = reply_message(reply);
        info!(
            collapsible = message.kind.is_some(),
            next_phase = ?consultant_state.as_ref().and_then(|s| s.phase),
            "Chat reply ready"
        );

        Ok(ChatResponse {
            choices: vec![Choice {
                message,
                index: 0,
                finish_reason: finish_reason.map(str::to_string),
            }],
            consultant_state,
        })
    }
}
