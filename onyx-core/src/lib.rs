//! Shared chat model and client logic for the Onyx chat UI
//!
//! These types are used by both:
//! - The Dioxus web client (WASM)
//! - Native tests and tooling
//!
//! Wire types serialize with serde to the camelCase JSON the agent service
//! speaks, and export TypeScript bindings through ts-rs.

pub mod auth;
pub mod config;
pub mod display;
pub mod error;
pub mod normalize;
pub mod registry;
pub mod session;
pub mod stream;
pub mod title;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

pub use error::{ApiError, SessionError, StreamError};
pub use normalize::{normalize, resolve_tool_result};
pub use registry::ChatRegistry;
pub use session::{AgentTransport, ChatSession};
pub use title::derive_title;

// ============================================================================
// Core Types
// ============================================================================

/// Opaque chat identifier
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord, TS)]
#[ts(export, export_to = "../../bindings/agent.ts")]
pub struct ChatId(pub String);

impl ChatId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ChatId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&str> for ChatId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ChatId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl std::fmt::Display for ChatId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Fresh message identifier (UUIDv4)
pub fn new_message_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export, export_to = "../../bindings/agent.ts")]
pub enum Role {
    User,
    Assistant,
    System,
    Tool,
}

// ============================================================================
// Display Messages
// ============================================================================

/// A requested tool call and, once it arrives, its result.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[serde(tag = "state", rename_all = "lowercase")]
#[ts(export, export_to = "../../bindings/agent.ts")]
pub enum ToolInvocation {
    #[serde(rename_all = "camelCase")]
    Call {
        tool_call_id: String,
        tool_name: String,
        #[ts(type = "unknown")]
        args: serde_json::Value,
    },
    #[serde(rename_all = "camelCase")]
    Result {
        tool_call_id: String,
        tool_name: String,
        #[ts(type = "unknown")]
        args: serde_json::Value,
        #[ts(type = "unknown")]
        result: serde_json::Value,
    },
}

impl ToolInvocation {
    pub fn call(
        tool_call_id: impl Into<String>,
        tool_name: impl Into<String>,
        args: serde_json::Value,
    ) -> Self {
        Self::Call {
            tool_call_id: tool_call_id.into(),
            tool_name: tool_name.into(),
            args,
        }
    }

    pub fn tool_call_id(&self) -> &str {
        match self {
            Self::Call { tool_call_id, .. } | Self::Result { tool_call_id, .. } => tool_call_id,
        }
    }

    pub fn tool_name(&self) -> &str {
        match self {
            Self::Call { tool_name, .. } | Self::Result { tool_name, .. } => tool_name,
        }
    }

    pub fn args(&self) -> &serde_json::Value {
        match self {
            Self::Call { args, .. } | Self::Result { args, .. } => args,
        }
    }

    pub fn result(&self) -> Option<&serde_json::Value> {
        match self {
            Self::Call { .. } => None,
            Self::Result { result, .. } => Some(result),
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Call { .. })
    }

    /// Move a pending call to the result state. Returns false (and leaves
    /// `self` untouched) when the invocation already holds a result.
    pub fn resolve(&mut self, result: serde_json::Value) -> bool {
        let Self::Call {
            tool_call_id,
            tool_name,
            args,
        } = self
        else {
            return false;
        };

        *self = Self::Result {
            tool_call_id: std::mem::take(tool_call_id),
            tool_name: std::mem::take(tool_name),
            args: args.take(),
            result,
        };
        true
    }
}

/// Chat message for UI display
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "../../bindings/agent.ts")]
pub struct ChatMessage {
    pub id: String,
    pub role: Role,
    pub content: String,
    #[serde(default)]
    pub tool_invocations: Vec<ToolInvocation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl ChatMessage {
    /// A message created live in this session, stamped with the current time.
    pub fn live(role: Role, content: impl Into<String>) -> Self {
        Self {
            id: new_message_id(),
            role,
            content: content.into(),
            tool_invocations: Vec::new(),
            created_at: Some(Utc::now()),
        }
    }

    pub fn is_user(&self) -> bool {
        self.role == Role::User
    }
}

/// A titled conversation
#[derive(Debug, Clone, PartialEq)]
pub struct Chat {
    pub id: ChatId,
    pub title: String,
    pub messages: Vec<ChatMessage>,
    /// True once the chat has been seen in the remote store.
    pub persisted: bool,
}

pub const NEW_CHAT_TITLE: &str = "New Chat";
pub const UNTITLED_CHAT_TITLE: &str = "Untitled";

impl Chat {
    pub fn new(id: ChatId) -> Self {
        Self {
            id,
            title: NEW_CHAT_TITLE.to_string(),
            messages: Vec::new(),
            persisted: false,
        }
    }
}

// ============================================================================
// Stored Messages (GET /chats)
// ============================================================================

/// Persisted message as stored by the agent service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum CoreMessage {
    System { content: String },
    User { content: MessageContent },
    Assistant { content: MessageContent },
    Tool { content: Vec<ToolResultPart> },
}

impl CoreMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self::User {
            content: MessageContent::Text(text.into()),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self::Assistant {
            content: MessageContent::Text(text.into()),
        }
    }

    pub fn role(&self) -> Role {
        match self {
            Self::System { .. } => Role::System,
            Self::User { .. } => Role::User,
            Self::Assistant { .. } => Role::Assistant,
            Self::Tool { .. } => Role::Tool,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ContentPart {
    Text {
        text: String,
    },
    #[serde(rename_all = "camelCase")]
    ToolCall {
        tool_call_id: String,
        tool_name: String,
        #[serde(default)]
        args: serde_json::Value,
    },
    /// Images, files, reasoning and anything newer. Not displayed.
    #[serde(other)]
    Unsupported,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ToolResultPart {
    pub tool_call_id: String,
    #[serde(default)]
    pub tool_name: String,
    #[serde(default)]
    pub result: serde_json::Value,
}

/// One entry of the `GET /chats` listing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RemoteChat {
    pub id: ChatId,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub messages: Vec<CoreMessage>,
}

// ============================================================================
// API Types
// ============================================================================

/// Body of `POST /chat`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, TS)]
#[ts(export, export_to = "../../bindings/agent.ts")]
pub struct ChatRequest {
    pub id: ChatId,
    pub messages: Vec<ChatMessage>,
}

/// Body of `GET /prompts-left`
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "../../bindings/agent.ts")]
pub struct PromptsLeft {
    #[serde(default)]
    pub prompts_left: Option<u32>,
}

/// Assumed credit balance when the service omits it.
pub const DEFAULT_PROMPTS_LEFT: u32 = 5;

impl PromptsLeft {
    pub fn remaining(&self) -> u32 {
        self.prompts_left.unwrap_or(DEFAULT_PROMPTS_LEFT)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use ts_rs::Config;

    #[test]
    fn test_chat_id_generation() {
        let id1 = ChatId::new();
        let id2 = ChatId::new();
        assert_ne!(id1, id2);
        assert_eq!(id1.0.len(), 36); // UUID length
    }

    #[test]
    fn test_tool_invocation_wire_shape() {
        let call = ToolInvocation::call("call_1", "getBalance", json!({"chain": "bsc"}));
        let value = serde_json::to_value(&call).unwrap();
        assert_eq!(
            value,
            json!({
                "state": "call",
                "toolCallId": "call_1",
                "toolName": "getBalance",
                "args": {"chain": "bsc"}
            })
        );

        let mut resolved = call.clone();
        assert!(resolved.resolve(json!("1.2 ETH")));
        let value = serde_json::to_value(&resolved).unwrap();
        assert_eq!(value["state"], "result");
        assert_eq!(value["result"], "1.2 ETH");
        assert_eq!(value["args"], json!({"chain": "bsc"}));
    }

    #[test]
    fn test_resolve_is_one_way() {
        let mut inv = ToolInvocation::call("call_1", "getBalance", json!({}));
        assert!(inv.resolve(json!(1)));
        assert!(!inv.resolve(json!(2)));
        assert_eq!(inv.result(), Some(&json!(1)));
        assert!(!inv.is_pending());
    }

    #[test]
    fn test_core_message_parsing() {
        let raw = json!([
            {"role": "system", "content": "be helpful"},
            {"role": "user", "content": "Hello"},
            {"role": "assistant", "content": [
                {"type": "text", "text": "Checking"},
                {"type": "tool-call", "toolCallId": "c1", "toolName": "getBalance", "args": {}},
                {"type": "reasoning", "text": "hidden"}
            ]},
            {"role": "tool", "content": [
                {"type": "tool-result", "toolCallId": "c1", "toolName": "getBalance", "result": "1.2"}
            ]}
        ]);

        let messages: Vec<CoreMessage> = serde_json::from_value(raw).unwrap();
        assert_eq!(messages.len(), 4);
        assert_eq!(messages[0].role(), Role::System);
        assert_eq!(messages[1], CoreMessage::user("Hello"));

        let CoreMessage::Assistant {
            content: MessageContent::Parts(parts),
        } = &messages[2]
        else {
            panic!("expected assistant parts");
        };
        assert_eq!(parts[2], ContentPart::Unsupported);

        let CoreMessage::Tool { content } = &messages[3] else {
            panic!("expected tool message");
        };
        assert_eq!(content[0].tool_call_id, "c1");
    }

    #[test]
    fn test_remote_chat_without_title() {
        let chat: RemoteChat =
            serde_json::from_value(json!({"id": "abc", "messages": []})).unwrap();
        assert_eq!(chat.id.as_str(), "abc");
        assert!(chat.title.is_none());
    }

    #[test]
    fn test_prompts_left_default() {
        let empty: PromptsLeft = serde_json::from_str("{}").unwrap();
        assert_eq!(empty.remaining(), DEFAULT_PROMPTS_LEFT);

        let some: PromptsLeft = serde_json::from_str(r#"{"promptsLeft": 2}"#).unwrap();
        assert_eq!(some.remaining(), 2);
    }

    #[test]
    fn test_chat_request_serialization() {
        let request = ChatRequest {
            id: ChatId::from("chat-1"),
            messages: vec![ChatMessage {
                id: "m1".to_string(),
                role: Role::User,
                content: "Hi".to_string(),
                tool_invocations: vec![],
                created_at: None,
            }],
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            json!({
                "id": "chat-1",
                "messages": [{"id": "m1", "role": "user", "content": "Hi", "toolInvocations": []}]
            })
        );
    }

    #[test]
    fn export_types() {
        // The export_to attribute in each type's #[ts] macro specifies the output file
        let config = Config::default();
        ChatId::export(&config).unwrap();
        Role::export(&config).unwrap();
        ToolInvocation::export(&config).unwrap();
        ChatMessage::export(&config).unwrap();
        ChatRequest::export(&config).unwrap();
        PromptsLeft::export(&config).unwrap();
    }
}
