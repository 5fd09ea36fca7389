use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::constants;

/// Problems with the startup configuration. Any of these stops the process
/// before a request is served.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("missing API credential: set {} or pass --api-key", constants::API_KEY_ENV)]
    MissingApiKey,
    #[error("invalid API url '{url}': {reason}")]
    InvalidApiUrl { url: String, reason: String },
    #[error("invalid sampling setting: {0}")]
    InvalidSampling(String),
}

/// Failures talking to the hosted chat-completions service.
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("request to chat service failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("chat service returned {status}: {}", message.as_deref().unwrap_or("no error message"))]
    Status { status: u16, message: Option<String> },
    #[error("chat service returned a malformed body: {0}")]
    MalformedBody(String),
    #[error("chat service returned no choices")]
    NoChoices,
}

/// Errors surfaced by the chat API as `{ "error": ... }` bodies.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("{0}")]
    BadRequest(String),
    #[error(transparent)]
    Upstream(#[from] UpstreamError),
}

impl ChatError {
    pub fn status(&self) -> StatusCode {
        match self {
            ChatError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ChatError::Upstream(UpstreamError::Status { status, message }) => match *status {
                401 => StatusCode::UNAUTHORIZED,
                429 => StatusCode::TOO_MANY_REQUESTS,
                _ if message.is_some() => {
                    StatusCode::from_u16(*status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
                }
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            ChatError::Upstream(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The text shown to the caller. Upstream details beyond the provider's
    /// own error message stay in the logs.
    pub fn public_message(&self) -> String {
        match self {
            ChatError::BadRequest(msg) => msg.clone(),
            ChatError::Upstream(UpstreamError::Status { status, message }) => match (*status, message) {
                (401, _) => constants::INVALID_API_KEY.to_string(),
                (429, _) => constants::RATE_LIMITED.to_string(),
                (_, Some(msg)) => msg.clone(),
                (_, None) => constants::UPSTREAM_FAILED.to_string(),
            },
            ChatError::Upstream(_) => constants::UPSTREAM_FAILED.to_string(),
        }
    }
}

impl IntoResponse for ChatError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({ "error": self.public_message() });
        (self.status(), Json(body)).into_response()
    }
}

/// Reasons a client session refuses to start a turn.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("a request is already in flight")]
    Busy,
    #[error("message is empty")]
    EmptyInput,
}
