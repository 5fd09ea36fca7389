use tracing::{debug, warn};

use crate::error::SessionError;
use crate::phase::ConsultantState;
use crate::wire::{ChatRequest, ChatResponse, ConversationMessage, Role};

/// State owned by one chat client: the transcript, the consultant toggle and
/// its state, and a busy flag that blocks overlapping submissions.
#[derive(Debug, Default)]
pub struct ChatSession {
    pub messages: Vec<ConversationMessage>,
    pub consultant_mode: bool,
    pub project_id: String,
    pub consultant_state: ConsultantState,
    pub last_error: Option<String>,
    busy: bool,
}

impl ChatSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    fn reset_state(&mut self) {
        self.consultant_state = if self.consultant_mode {
            ConsultantState::starting()
        } else {
            ConsultantState::inactive()
        };
    }

    pub fn set_consultant_mode(&mut self, enabled: bool) {
        self.consultant_mode = enabled;
        self.reset_state();
        debug!(enabled, "Consultant mode toggled");
    }

    pub fn new_chat(&mut self) {
        self.messages.clear();
        self.last_error = None;
        self.reset_state();
    }

    /// Append the user's message and build the request for it.
    pub fn begin_turn(&mut self, input: &str) -> Result<ChatRequest, SessionError> {
        if self.busy {
            return Err(SessionError::Busy);
        }
        if input.trim().is_empty() {
            return Err(SessionError::EmptyInput);
        }

        self.messages.push(ConversationMessage::user(input));
        self.busy = true;
        self.last_error = None;

        Ok(ChatRequest {
            messages: self.messages.clone(),
            is_consultant_mode: self.consultant_mode,
            project_id: if self.consultant_mode && !self.project_id.is_empty() {
                Some(self.project_id.clone())
            } else {
                None
            },
            consultant_state: Some(self.consultant_state.clone()),
        })
    }

    /// Record a successful reply. Returns the appended assistant message.
    pub fn complete_turn(&mut self, response: ChatResponse) -> Option<&ConversationMessage> {
        self.busy = false;
        let Some(reply) = response.choices.into_iter().next().map(|c| c.message) else {
            self.last_error = Some("Invalid response format".to_string());
            warn!("Chat response carried no choices");
            return None;
        };

        if self.consultant_mode {
            if let Some(next) = response.consultant_state {
                self.consultant_state = next;
            }
        }

        self.messages.push(ConversationMessage {
            role: Role::Assistant,
            content: reply.content,
            files: reply.files,
        });
        self.messages.last()
    }

    /// Record a failed request. State is left as it was before the turn.
    pub fn fail_turn(&mut self, error: impl Into<String>) {
        self.busy = false;
        self.last_error = Some(error.into());
    }
}
