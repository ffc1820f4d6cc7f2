use dioxus::prelude::{ReadableExt, Signal, WritableExt};
use onyx_core::session::pump;
use onyx_core::{AgentTransport, ChatId, ChatRegistry, ChatRequest, ChatSession, Role};

use crate::api::{delete_chat, AgentClient};

/// Open a chat from the sidebar. Reselecting the open chat keeps its
/// session, including a reply that is still streaming.
pub fn select_chat(
    chat_id: ChatId,
    mut registry: Signal<ChatRegistry>,
    mut session: Signal<ChatSession>,
) {
    if !opens_new_session(&session.peek(), &chat_id) {
        return;
    }
    let history = registry
        .peek()
        .chat(&chat_id)
        .map(|chat| chat.messages.clone())
        .unwrap_or_default();

    registry.write().set_current_chat_id(chat_id.clone());
    session.set(ChatSession::new(chat_id, history));
}

fn opens_new_session(open: &ChatSession, chat_id: &ChatId) -> bool {
    open.chat_id() != chat_id
}

pub fn start_new_chat(mut registry: Signal<ChatRegistry>, mut session: Signal<ChatSession>) {
    let chat_id = registry.write().create_new_chat();
    session.set(ChatSession::new(chat_id, Vec::new()));
}

/// Delete remotely, then locally. Returns whether the delete went through.
///
/// If the open chat was deleted, the pane falls back to a blank
/// conversation that is selected on its first submission.
pub async fn delete_chat_action(
    token: String,
    chat_id: ChatId,
    mut registry: Signal<ChatRegistry>,
    mut session: Signal<ChatSession>,
) -> bool {
    if let Err(e) = delete_chat(&token, &chat_id).await {
        dioxus_logger::tracing::error!("Failed to delete chat {}: {}", chat_id, e);
        return false;
    }

    registry.write().remove_chat(&chat_id);
    if session.peek().chat_id() == &chat_id {
        session.set(ChatSession::new(ChatId::new(), Vec::new()));
    }
    true
}

/// A request on its way to the agent, tagged with the id of the user
/// message that started it.
#[derive(Debug, Clone)]
pub struct Submission {
    pub request: ChatRequest,
    pub tag: String,
}

/// Append the user's message. `None` if the input was rejected.
pub fn begin_submit(
    text: &str,
    mut registry: Signal<ChatRegistry>,
    mut session: Signal<ChatSession>,
) -> Option<Submission> {
    let request = match session.write().begin_submit(text) {
        Ok(request) => request,
        Err(e) => {
            dioxus_logger::tracing::debug!("Submission ignored: {}", e);
            return None;
        }
    };
    let tag = session.peek().submission()?.to_string();

    let mut registry = registry.write();
    if registry.current_chat_id().is_none() {
        registry.set_current_chat_id(request.id.clone());
    }
    if let Some(user_message) = request.messages.last() {
        registry.add_message_to_chat(&request.id, user_message.clone());
    }
    Some(Submission { request, tag })
}

/// Stream the agent's reply into the session.
///
/// If the session is replaced meanwhile, the stream still runs to its end
/// but stops touching the session.
pub async fn stream_reply(
    token: String,
    submission: Submission,
    mut registry: Signal<ChatRegistry>,
    mut session: Signal<ChatSession>,
) {
    let Submission { request, tag } = submission;
    let chat_id = request.id.clone();
    let client = AgentClient::new(token);

    let outcome = match client.open_chat_stream(&request).await {
        Ok(stream) => {
            pump(stream, |part| {
                if is_open(session, &tag) {
                    session.write().apply_part(part);
                }
            })
            .await
        }
        Err(e) => Err(e),
    };

    if !is_open(session, &tag) {
        dioxus_logger::tracing::debug!("Reply for {} finished after switching away", chat_id);
        return;
    }

    match outcome {
        Ok(()) => session.write().finish(),
        Err(e) => {
            dioxus_logger::tracing::error!("Chat stream failed: {}", e);
            session.write().fail(e);
        }
    }

    let settled = session.peek().messages().to_vec();
    let mut registry = registry.write();
    if let Some(reply) = settled.last().filter(|m| m.role == Role::Assistant) {
        registry.add_message_to_chat(&chat_id, reply.clone());
    }
    registry.retitle_from_display(&chat_id, &settled);
}

fn is_open(session: Signal<ChatSession>, tag: &str) -> bool {
    session.peek().is_awaiting(tag)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reselecting_the_streaming_chat_keeps_its_session() {
        let chat_id = ChatId::new();
        let mut open = ChatSession::new(chat_id.clone(), Vec::new());
        open.begin_submit("What's my balance?").unwrap();
        let tag = open.submission().unwrap().to_string();

        assert!(!opens_new_session(&open, &chat_id));
        assert!(open.is_awaiting(&tag));
        assert!(opens_new_session(&open, &ChatId::new()));
    }

    #[test]
    fn a_stale_reply_does_not_own_a_reopened_chat() {
        let chat_id = ChatId::new();
        let mut first = ChatSession::new(chat_id.clone(), Vec::new());
        first.begin_submit("first").unwrap();
        let stale = first.submission().unwrap().to_string();

        let mut reopened = ChatSession::new(chat_id, first.messages().to_vec());
        reopened.begin_submit("second").unwrap();

        assert!(!reopened.is_awaiting(&stale));
        assert!(reopened.is_awaiting(reopened.submission().unwrap()));
    }
}
