//! End-to-end chat turns against a scripted agent transport.

use std::cell::RefCell;

use async_trait::async_trait;
use futures::executor::block_on;
use futures::stream::StreamExt;
use onyx_core::session::ByteStream;
use onyx_core::{
    normalize, AgentTransport, ApiError, ChatId, ChatRegistry, ChatRequest, ChatSession,
    CoreMessage, Role, SessionError,
};

/// Replays canned chunks and remembers what it was asked.
struct ScriptedAgent {
    chunks: Vec<Result<&'static str, ApiError>>,
    open_error: Option<ApiError>,
    requests: RefCell<Vec<ChatRequest>>,
}

impl ScriptedAgent {
    fn replying(chunks: Vec<Result<&'static str, ApiError>>) -> Self {
        Self {
            chunks,
            open_error: None,
            requests: RefCell::new(Vec::new()),
        }
    }

    fn refusing(error: ApiError) -> Self {
        Self {
            chunks: Vec::new(),
            open_error: Some(error),
            requests: RefCell::new(Vec::new()),
        }
    }
}

#[async_trait(?Send)]
impl AgentTransport for ScriptedAgent {
    async fn open_chat_stream(&self, request: &ChatRequest) -> Result<ByteStream, ApiError> {
        self.requests.borrow_mut().push(request.clone());
        if let Some(e) = &self.open_error {
            return Err(e.clone());
        }
        let chunks: Vec<Result<Vec<u8>, ApiError>> = self
            .chunks
            .iter()
            .map(|c| c.clone().map(|s| s.as_bytes().to_vec()))
            .collect();
        Ok(futures::stream::iter(chunks).boxed_local())
    }
}

#[test]
fn balance_question_round_trip() {
    let agent = ScriptedAgent::replying(vec![
        Ok("f:{\"messageId\":\"msg-1\"}\n0:\"Your balance"),
        Ok(" is 1.2 ETH\"\ne:{\"finishReason\":\"stop\"}\n"),
        Ok("d:{\"finishReason\":\"stop\"}\n"),
    ]);
    let mut session = ChatSession::new(ChatId::from("chat-1"), Vec::new());

    block_on(session.run("Check my balance", &agent)).unwrap();

    let messages = session.messages();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].role, Role::User);
    assert_eq!(messages[0].content, "Check my balance");
    assert_eq!(messages[1].role, Role::Assistant);
    assert_eq!(messages[1].content, "Your balance is 1.2 ETH");
    assert!(!session.in_flight());
    assert!(session.last_error().is_none());

    let requests = agent.requests.borrow();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].id.as_str(), "chat-1");
    assert_eq!(requests[0].messages.len(), 1);
}

#[test]
fn user_message_is_visible_before_stream_completes() {
    let mut session = ChatSession::new(ChatId::from("chat-1"), Vec::new());

    session.begin_submit("Check my balance").unwrap();
    assert!(session.in_flight());
    assert_eq!(session.messages().len(), 1);

    session.apply_part(onyx_core::stream::StreamPart::Text(
        "Your balance is 1.2 ETH".to_string(),
    ));
    session.finish();

    assert!(!session.in_flight());
    assert_eq!(session.messages()[1].content, "Your balance is 1.2 ETH");
}

#[test]
fn tool_round_trip_within_one_response() {
    let agent = ScriptedAgent::replying(vec![Ok(concat!(
        "9:{\"toolCallId\":\"c1\",\"toolName\":\"getBalance\",\"args\":{\"chain\":\"bsc\"}}\n",
        "a:{\"toolCallId\":\"c1\",\"result\":{\"balance\":\"1.2\"}}\n",
        "0:\"Your balance is 1.2 ETH\"\n",
    ))]);
    let mut session = ChatSession::new(ChatId::from("chat-2"), Vec::new());

    block_on(session.run("Check my balance", &agent)).unwrap();

    let assistant = &session.messages()[1];
    assert_eq!(assistant.content, "Your balance is 1.2 ETH");
    assert_eq!(assistant.tool_invocations.len(), 1);
    assert_eq!(
        assistant.tool_invocations[0].result(),
        Some(&serde_json::json!({"balance": "1.2"}))
    );
}

#[test]
fn history_seeds_the_request() {
    let history = normalize(&[
        CoreMessage::user("Hello"),
        CoreMessage::assistant("Hi! How can I help?"),
    ]);
    let agent = ScriptedAgent::replying(vec![Ok("0:\"Sure\"\n")]);
    let mut session = ChatSession::new(ChatId::from("chat-3"), history);

    block_on(session.run("Deploy a smart contract", &agent)).unwrap();

    let requests = agent.requests.borrow();
    let roles: Vec<Role> = requests[0].messages.iter().map(|m| m.role).collect();
    assert_eq!(roles, vec![Role::User, Role::Assistant, Role::User]);
    assert_eq!(session.messages().len(), 4);
}

#[test]
fn connection_refused_ends_turn_without_retry() {
    let agent = ScriptedAgent::refusing(ApiError::Status(502));
    let mut session = ChatSession::new(ChatId::from("chat-4"), Vec::new());

    block_on(session.run("Check my balance", &agent)).unwrap();

    assert_eq!(agent.requests.borrow().len(), 1);
    assert!(!session.in_flight());
    assert_eq!(session.messages().len(), 1);
    assert_eq!(session.last_error(), Some(&ApiError::Status(502)));
}

#[test]
fn mid_stream_failure_keeps_partial_reply() {
    let agent = ScriptedAgent::replying(vec![
        Ok("0:\"Your bal\"\n"),
        Err(ApiError::Stream("connection reset".to_string())),
    ]);
    let mut session = ChatSession::new(ChatId::from("chat-5"), Vec::new());

    block_on(session.run("Check my balance", &agent)).unwrap();

    assert!(!session.in_flight());
    assert_eq!(session.messages()[1].content, "Your bal");
    assert!(matches!(session.last_error(), Some(ApiError::Stream(_))));
}

#[test]
fn blank_submission_never_reaches_agent() {
    let agent = ScriptedAgent::replying(vec![]);
    let mut session = ChatSession::new(ChatId::from("chat-6"), Vec::new());

    assert_eq!(
        block_on(session.run("  ", &agent)),
        Err(SessionError::EmptyInput)
    );
    assert!(agent.requests.borrow().is_empty());
}

#[test]
fn finished_turn_titles_new_chat() {
    let mut registry = ChatRegistry::new();
    let chat_id = registry.create_new_chat();
    let agent = ScriptedAgent::replying(vec![Ok("0:\"Done\"\n")]);
    let mut session = ChatSession::new(chat_id.clone(), Vec::new());

    block_on(session.run("Launch a ERC20 token", &agent)).unwrap();
    registry.retitle_from_display(&chat_id, session.messages());

    assert_eq!(registry.chat(&chat_id).unwrap().title, "Launch a ERC20 token");
}
