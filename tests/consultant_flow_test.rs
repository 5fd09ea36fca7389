use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use consultant_chat::chat::ChatService;
use consultant_chat::config::{ApiArgs, ServerConfig};
use consultant_chat::phase::{ConsultantState, Phase};
use consultant_chat::prompts;
use consultant_chat::session::ChatSession;

async fn next_reply(upstream: &MockServer, content: &str) {
    upstream.reset().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": content},
                "finish_reason": "stop"
            }]
        })))
        .mount(upstream)
        .await;
}

async fn last_system_prompt(upstream: &MockServer) -> String {
    let requests = upstream.received_requests().await.unwrap();
    let body: Value = requests.last().unwrap().body_json().unwrap();
    body["messages"][0]["content"].as_str().unwrap().to_string()
}

async fn turn(session: &mut ChatSession, service: &ChatService, input: &str) {
    let request = session.begin_turn(input).unwrap();
    let response = service.respond(&request).await.unwrap();
    session.complete_turn(response);
}

#[test_log::test(tokio::test)]
async fn test_full_consultant_conversation() {
    let upstream = MockServer::start().await;
    let config = ServerConfig::from_args(&ApiArgs {
        api_key: Some("k".into()),
        api_url: upstream.uri(),
        ..ApiArgs::default()
    })
    .unwrap();
    let service = ChatService::new(&config);

    let mut session = ChatSession::new();
    session.set_consultant_mode(true);
    session.project_id = "shop".into();

    next_reply(&upstream, "I understand. Could you provide more details about traffic?").await;
    turn(&mut session, &service, "I want an online shop").await;
    assert!(last_system_prompt(&upstream).await.starts_with(prompts::CLARIFICATION_PROMPT));
    assert_eq!(session.consultant_state, ConsultantState::starting());

    let proposal = "Based on your requirements, use a hosted platform.\nWould you like a more detailed explanation of any specific aspect?";
    next_reply(&upstream, proposal).await;
    turn(&mut session, &service, "About 500 orders a day").await;
    assert_eq!(session.consultant_state.phase, Some(Phase::Proposal));
    assert_eq!(session.consultant_state.last_proposal.as_deref(), Some(proposal));

    next_reply(&upstream, "Here is a detailed Analysis of the platform choice.").await;
    turn(&mut session, &service, "Yes, please explain further").await;
    assert_eq!(last_system_prompt(&upstream).await, format!("{} For project: shop.", prompts::DETAILED_PROMPT));
    assert_eq!(session.consultant_state.phase, Some(Phase::Detailed));
    assert_eq!(session.messages.len(), 6);

    // Toggling off and on again starts over.
    session.set_consultant_mode(false);
    session.set_consultant_mode(true);
    assert_eq!(session.consultant_state, ConsultantState::starting());
}

#[tokio::test]
async fn test_failed_turn_keeps_state_for_resubmission() {
    let upstream = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({})))
        .mount(&upstream)
        .await;
    let config = ServerConfig::from_args(&ApiArgs {
        api_key: Some("k".into()),
        api_url: upstream.uri(),
        ..ApiArgs::default()
    })
    .unwrap();
    let service = ChatService::new(&config);

    let mut session = ChatSession::new();
    session.set_consultant_mode(true);
    let before = session.consultant_state.clone();

    let request = session.begin_turn("hello").unwrap();
    let err = service.respond(&request).await.unwrap_err();
    session.fail_turn(err.public_message());

    assert_eq!(session.consultant_state, before);
    assert_eq!(
        session.last_error.as_deref(),
        Some("Rate limit exceeded for Mistral API")
    );
    assert!(!session.is_busy());
}
