//! Request and response bodies of the chat API, plus the transcript message
//! type shared with the client session.

use serde::{Deserialize, Serialize};

use crate::extract::StructuredFile;
use crate::phase::ConsultantState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationMessage {
    pub role: Role,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub files: Option<Vec<StructuredFile>>,
}

impl ConversationMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            files: None,
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }
}

/// Body of `POST /api/chat`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub messages: Vec<ConversationMessage>,
    #[serde(default)]
    pub is_consultant_mode: bool,
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default)]
    pub consultant_state: Option<ConsultantState>,
}

impl ChatRequest {
    /// Content of the final message, if that message came from the user.
    pub fn last_user_message(&self) -> Option<&str> {
        self.messages
            .last()
            .filter(|m| m.role == Role::User)
            .map(|m| m.content.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    Collapsible,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplyMessage {
    pub role: Role,
    pub content: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<MessageKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub files: Option<Vec<StructuredFile>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Choice {
    pub message: ReplyMessage,
    pub index: u32,
    pub finish_reason: Option<String>,
}

/// Successful body of `POST /api/chat`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub choices: Vec<Choice>,
    /// Next consultant state; present only in consultant mode.
    #[serde(rename = "consultantState", default, skip_serializing_if = "Option::is_none")]
    pub consultant_state: Option<ConsultantState>,
}

impl ChatResponse {
    pub fn first_message(&self) -> Option<&ReplyMessage> {
        self.choices.first().map(|c| &c.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::phase::Phase;

    #[test]
    fn test_request_parses_camel_case_body() {
        let body = r#"{
            "messages": [{"role": "user", "content": "hi"}],
            "isConsultantMode": true,
            "projectId": "acme",
            "consultantState": {"phase": "proposal", "lastProposal": "p"}
        }"#;
        let req: ChatRequest = serde_json::from_str(body).unwrap();
        assert!(req.is_consultant_mode);
        assert_eq!(req.project_id.as_deref(), Some("acme"));
        let state = req.consultant_state.unwrap();
        assert_eq!(state.phase, Some(Phase::Proposal));
        assert_eq!(state.last_proposal.as_deref(), Some("p"));
    }

    #[test]
    fn test_request_defaults_optional_fields() {
        let req: ChatRequest =
            serde_json::from_str(r#"{"messages": [], "consultantState": null}"#).unwrap();
        assert!(!req.is_consultant_mode);
        assert!(req.project_id.is_none());
        assert!(req.consultant_state.is_none());
    }

    #[test]
    fn test_request_without_messages_is_rejected() {
        assert!(serde_json::from_str::<ChatRequest>(r#"{"isConsultantMode": false}"#).is_err());
        assert!(serde_json::from_str::<ChatRequest>(r#"{"messages": "hello"}"#).is_err());
    }

    #[test]
    fn test_last_user_message_ignores_trailing_assistant() {
        let mut req = ChatRequest {
            messages: vec![ConversationMessage::user("yes")],
            is_consultant_mode: true,
            project_id: None,
            consultant_state: None,
        };
        assert_eq!(req.last_user_message(), Some("yes"));
        req.messages.push(ConversationMessage::assistant("ok"));
        assert_eq!(req.last_user_message(), None);
    }

    #[test]
    fn test_plain_reply_omits_optional_fields() {
        let response = ChatResponse {
            choices: vec![Choice {
                message: ReplyMessage {
                    role: Role::Assistant,
                    content: "hello".into(),
                    kind: None,
                    files: None,
                },
                index: 0,
                finish_reason: Some("stop".into()),
            }],
            consultant_state: None,
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "choices": [{
                    "message": {"role": "assistant", "content": "hello"},
                    "index": 0,
                    "finish_reason": "stop"
                }]
            })
        );
    }
}
