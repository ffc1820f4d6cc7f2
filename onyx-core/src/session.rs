//! One conversation's request/stream/finalize cycle with the agent.
//!
//! `ChatSession` is a synchronous state machine: the caller appends the user
//! turn with [`ChatSession::begin_submit`], feeds decoded stream parts through
//! [`ChatSession::apply_part`], then closes the turn with `finish` or `fail`.
//! The web client drives these steps itself so it can re-render between
//! chunks; [`ChatSession::run`] drives a whole exchange over an
//! [`AgentTransport`] for native callers and tests.

use async_trait::async_trait;
use futures::stream::{LocalBoxStream, StreamExt};

use crate::error::{ApiError, SessionError};
use crate::normalize::resolve_tool_result;
use crate::stream::{PartDecoder, StreamPart};
use crate::{ChatId, ChatMessage, ChatRequest, Role, ToolInvocation};

pub type ByteStream = LocalBoxStream<'static, Result<Vec<u8>, ApiError>>;

/// Opens the streamed `POST /chat` exchange.
#[async_trait(?Send)]
pub trait AgentTransport {
    async fn open_chat_stream(&self, request: &ChatRequest) -> Result<ByteStream, ApiError>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChatSession {
    chat_id: ChatId,
    messages: Vec<ChatMessage>,
    streaming: Option<ChatMessage>,
    in_flight: bool,
    /// Id of the user message whose reply is streaming.
    submission: Option<String>,
    settled_turns: u32,
    last_error: Option<ApiError>,
}

impl ChatSession {
    pub fn new(chat_id: ChatId, initial_messages: Vec<ChatMessage>) -> Self {
        Self {
            chat_id,
            messages: initial_messages,
            streaming: None,
            in_flight: false,
            submission: None,
            settled_turns: 0,
            last_error: None,
        }
    }

    pub fn chat_id(&self) -> &ChatId {
        &self.chat_id
    }

    /// Settled messages, oldest first.
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// The assistant message being built from the current stream.
    pub fn streaming_message(&self) -> Option<&ChatMessage> {
        self.streaming.as_ref()
    }

    /// Settled messages followed by the in-progress one, if any.
    pub fn display_messages(&self) -> impl Iterator<Item = &ChatMessage> {
        self.messages.iter().chain(self.streaming.iter())
    }

    pub fn in_flight(&self) -> bool {
        self.in_flight
    }

    /// The submission currently streaming, if any. Identifies the turn so a
    /// reply can tell whether this session is still the one it started in.
    pub fn submission(&self) -> Option<&str> {
        self.submission.as_deref()
    }

    pub fn is_awaiting(&self, submission: &str) -> bool {
        self.submission.as_deref() == Some(submission)
    }

    /// Turns that ended (finished or failed) in this session.
    pub fn settled_turns(&self) -> u32 {
        self.settled_turns
    }

    pub fn last_error(&self) -> Option<&ApiError> {
        self.last_error.as_ref()
    }

    /// Seed an idle, empty session with history loaded after it was opened.
    /// Returns whether anything was adopted.
    pub fn adopt_history(&mut self, history: &[ChatMessage]) -> bool {
        if self.in_flight || !self.messages.is_empty() || history.is_empty() {
            return false;
        }
        self.messages = history.to_vec();
        true
    }

    /// Append the user's message and mark the session busy.
    ///
    /// Returns the request body to send, carrying the full history.
    pub fn begin_submit(&mut self, text: &str) -> Result<ChatRequest, SessionError> {
        if self.in_flight {
            return Err(SessionError::Busy);
        }
        if text.trim().is_empty() {
            return Err(SessionError::EmptyInput);
        }

        let message = ChatMessage::live(Role::User, text);
        self.submission = Some(message.id.clone());
        self.messages.push(message);
        self.in_flight = true;
        self.last_error = None;
        tracing::debug!(chat_id = %self.chat_id, "submitting message");

        Ok(ChatRequest {
            id: self.chat_id.clone(),
            messages: self.messages.clone(),
        })
    }

    pub fn apply_part(&mut self, part: StreamPart) {
        match part {
            StreamPart::Text(delta) => {
                self.streaming_mut().content.push_str(&delta);
            }
            StreamPart::ToolCall {
                tool_call_id,
                tool_name,
                args,
            } => {
                self.streaming_mut()
                    .tool_invocations
                    .push(ToolInvocation::call(tool_call_id, tool_name, args));
            }
            StreamPart::ToolResult {
                tool_call_id,
                result,
            } => {
                let mut resolved = false;
                if let Some(streaming) = self.streaming.as_mut() {
                    resolved =
                        resolve_tool_result(std::slice::from_mut(streaming), &tool_call_id, &result);
                }
                if !resolved {
                    resolved = resolve_tool_result(&mut self.messages, &tool_call_id, &result);
                }
                if !resolved {
                    tracing::debug!(%tool_call_id, "tool result with no pending call");
                }
            }
            StreamPart::Error(message) => {
                tracing::warn!(chat_id = %self.chat_id, "agent reported error: {}", message);
                self.last_error = Some(ApiError::Stream(message));
            }
            StreamPart::StartStep { .. }
            | StreamPart::FinishStep { .. }
            | StreamPart::FinishMessage { .. }
            | StreamPart::Ignored(_) => {}
        }
    }

    /// The stream ended normally: settle the assistant message.
    pub fn finish(&mut self) {
        self.settle_streaming();
        self.end_turn();
        tracing::debug!(chat_id = %self.chat_id, "response complete");
    }

    /// The stream broke. Whatever arrived is kept; nothing is retried.
    pub fn fail(&mut self, error: ApiError) {
        tracing::warn!(chat_id = %self.chat_id, "response failed: {}", error);
        self.settle_streaming();
        self.end_turn();
        self.last_error = Some(error);
    }

    /// Submit `text` and drive the whole response over `transport`.
    ///
    /// Only rejection is reported as an error; transport failures end the
    /// turn through [`fail`](Self::fail) and show up in
    /// [`last_error`](Self::last_error).
    pub async fn run<T: AgentTransport + ?Sized>(
        &mut self,
        text: &str,
        transport: &T,
    ) -> Result<(), SessionError> {
        let request = self.begin_submit(text)?;

        let stream = match transport.open_chat_stream(&request).await {
            Ok(stream) => stream,
            Err(e) => {
                self.fail(e);
                return Ok(());
            }
        };

        match pump(stream, |part| self.apply_part(part)).await {
            Ok(()) => self.finish(),
            Err(e) => self.fail(e),
        }
        Ok(())
    }

    fn end_turn(&mut self) {
        if self.in_flight {
            self.settled_turns += 1;
        }
        self.in_flight = false;
        self.submission = None;
    }

    fn streaming_mut(&mut self) -> &mut ChatMessage {
        self.streaming
            .get_or_insert_with(|| ChatMessage::live(Role::Assistant, ""))
    }

    fn settle_streaming(&mut self) {
        if let Some(message) = self.streaming.take() {
            if !message.content.is_empty() || !message.tool_invocations.is_empty() {
                self.messages.push(message);
            }
        }
    }
}

/// Decode a response body and hand each part to `apply` as it arrives.
pub async fn pump(
    mut stream: ByteStream,
    mut apply: impl FnMut(StreamPart),
) -> Result<(), ApiError> {
    let mut decoder = PartDecoder::new();
    while let Some(chunk) = stream.next().await {
        for part in decoder.push(&chunk?) {
            apply(part);
        }
    }
    if let Some(part) = decoder.finish() {
        apply(part);
    }
    Ok(())
}
