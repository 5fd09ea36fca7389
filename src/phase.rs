//! Consultant-mode phase tracking.
//!
//! A consultant conversation moves clarification -> proposal -> detailed by
//! swapping the system prompt. The phase is decided twice per turn: before
//! the model call ([`plan_prompt`]) to pick the prompt, and after it
//! ([`advance`]) to compute the state the client stores for the next turn.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::prompts;
use crate::wire::ConversationMessage;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Clarification,
    Proposal,
    Detailed,
}

/// Client-owned consultant state. Replaced wholesale every turn.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsultantState {
    #[serde(default)]
    pub phase: Option<Phase>,
    #[serde(default)]
    pub last_proposal: Option<String>,
}

impl ConsultantState {
    /// State while consultant mode is off.
    pub fn inactive() -> Self {
        Self::default()
    }

    /// State right after consultant mode is switched on or a new chat starts.
    pub fn starting() -> Self {
        Self {
            phase: Some(Phase::Clarification),
            last_proposal: None,
        }
    }

    pub fn current_phase(&self) -> Phase {
        self.phase.unwrap_or(Phase::Clarification)
    }
}

/// Everything the pre-call step decides for one model invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct PromptPlan {
    /// `None` outside consultant mode.
    pub effective_phase: Option<Phase>,
    /// System messages to place ahead of the transcript, in order.
    pub system_messages: Vec<ConversationMessage>,
}

/// Inputs to [`plan_prompt`].
#[derive(Debug, Clone, Copy)]
pub struct PlanInput<'a> {
    pub is_consultant_mode: bool,
    pub state: Option<&'a ConsultantState>,
    pub project_id: Option<&'a str>,
    pub last_user_message: Option<&'a str>,
}

fn asks_for_detail(user_message: &str) -> bool {
    let lowercase = user_message.to_lowercase();
    lowercase.contains("yes") || lowercase.contains("please explain")
}

/// Pick the system prompt(s) for the upcoming call. The stored phase is not
/// changed here; a user accepting a proposal only switches the prompt used
/// for this call.
pub fn plan_prompt(input: PlanInput<'_>) -> PromptPlan {
    if !input.is_consultant_mode {
        return PromptPlan {
            effective_phase: None,
            system_messages: vec![ConversationMessage::system(prompts::DEFAULT_PROMPT)],
        };
    }

    let stored = input.state.map(ConsultantState::current_phase).unwrap_or(Phase::Clarification);
    let wants_detail = input.last_user_message.map(asks_for_detail).unwrap_or(false);
    let effective = if stored == Phase::Proposal && wants_detail {
        Phase::Detailed
    } else {
        stored
    };

    let mut prompt = prompts::for_phase(effective).to_string();
    if let Some(project) = input.project_id.filter(|p| !p.trim().is_empty()) {
        prompt.push_str(&prompts::project_suffix(project));
    }

    let mut system_messages = vec![ConversationMessage::system(prompt)];
    if effective == Phase::Detailed {
        if let Some(proposal) = input.state.and_then(|s| s.last_proposal.as_deref()) {
            system_messages.push(ConversationMessage::system(prompts::proposal_context(proposal)));
        }
    }

    debug!(?stored, ?effective, extra_context = system_messages.len() > 1, "Planned consultant prompt");

    PromptPlan {
        effective_phase: Some(effective),
        system_messages,
    }
}

/// Keyword cues found in an assistant reply. All checks are case-insensitive
/// substring tests; this is the single place to swap in a structured signal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplyCues {
    /// Reply ends with an offer to go deeper, i.e. it is a proposal.
    pub offers_detail: bool,
    /// Reply mentions clarification at all ("please clarify" / "could you provide more details").
    pub mentions_clarification: bool,
    /// Reply explicitly asks for clarification.
    pub requests_clarification: bool,
}

impl ReplyCues {
    pub fn from_reply(reply: &str) -> Self {
        let lowercase = reply.to_lowercase();
        let more_details = lowercase.contains("could you provide more details");
        Self {
            offers_detail: lowercase.contains("would you like a more detailed explanation"),
            mentions_clarification: lowercase.contains("please clarify") || more_details,
            requests_clarification: lowercase.contains("could you please clarify") || more_details,
        }
    }
}

/// Compute the state for the next turn from the reply just received.
pub fn advance(
    state: &ConsultantState,
    reply: &str,
    last_user_message: Option<&str>,
) -> ConsultantState {
    let current = state.current_phase();
    let cues = ReplyCues::from_reply(reply);

    let next = if cues.offers_detail
        || (current == Phase::Clarification && !cues.mentions_clarification)
    {
        ConsultantState {
            phase: Some(Phase::Proposal),
            last_proposal: Some(reply.to_string()),
        }
    } else if cues.requests_clarification {
        ConsultantState {
            phase: Some(Phase::Clarification),
            last_proposal: state.last_proposal.clone(),
        }
    } else if current == Phase::Proposal && last_user_message.map(asks_for_detail).unwrap_or(false) {
        ConsultantState {
            phase: Some(Phase::Detailed),
            last_proposal: state.last_proposal.clone(),
        }
    } else {
        ConsultantState {
            phase: Some(current),
            last_proposal: state.last_proposal.clone(),
        }
    };

    debug!(from = ?current, to = ?next.phase, ?cues, "Advanced consultant phase");
    next
}
