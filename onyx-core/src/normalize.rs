//! Stored-message normalization.
//!
//! The agent service persists conversations as role/content messages where
//! tool results arrive as separate `tool` messages. The UI wants one flat list
//! with each tool call carrying its own result, so `tool` messages are folded
//! back into whichever earlier message issued the call.

use crate::{new_message_id, ChatMessage, ContentPart, CoreMessage, MessageContent, ToolInvocation};

/// Flatten stored messages into display messages.
///
/// Output length equals the number of non-`tool` inputs. Each emitted message
/// gets a fresh id, so two runs over the same input differ only in ids.
pub fn normalize(messages: &[CoreMessage]) -> Vec<ChatMessage> {
    messages
        .iter()
        .fold(Vec::with_capacity(messages.len()), |mut out, message| {
            match message {
                CoreMessage::Tool { content } => {
                    for part in content {
                        if !resolve_tool_result(&mut out, &part.tool_call_id, &part.result) {
                            tracing::debug!(
                                tool_call_id = %part.tool_call_id,
                                "dropping tool result with no matching call"
                            );
                        }
                    }
                }
                CoreMessage::System { content } => {
                    out.push(display_message(message, content.clone(), Vec::new()));
                }
                CoreMessage::User { content } | CoreMessage::Assistant { content } => {
                    let (text, calls) = flatten_content(content);
                    out.push(display_message(message, text, calls));
                }
            }
            out
        })
}

/// Attach `result` to every pending invocation with `tool_call_id`.
///
/// Returns true if at least one invocation moved to the result state.
pub fn resolve_tool_result(
    messages: &mut [ChatMessage],
    tool_call_id: &str,
    result: &serde_json::Value,
) -> bool {
    let mut resolved = false;
    for invocation in messages
        .iter_mut()
        .flat_map(|m| m.tool_invocations.iter_mut())
        .filter(|inv| inv.is_pending() && inv.tool_call_id() == tool_call_id)
    {
        resolved |= invocation.resolve(result.clone());
    }
    resolved
}

fn flatten_content(content: &MessageContent) -> (String, Vec<ToolInvocation>) {
    match content {
        MessageContent::Text(text) => (text.clone(), Vec::new()),
        MessageContent::Parts(parts) => {
            let mut text = String::new();
            let mut calls = Vec::new();
            for part in parts {
                match part {
                    ContentPart::Text { text: t } => text.push_str(t),
                    ContentPart::ToolCall {
                        tool_call_id,
                        tool_name,
                        args,
                    } => calls.push(ToolInvocation::call(
                        tool_call_id.as_str(),
                        tool_name.as_str(),
                        args.clone(),
                    )),
                    ContentPart::Unsupported => {}
                }
            }
            (text, calls)
        }
    }
}

fn display_message(
    source: &CoreMessage,
    content: String,
    tool_invocations: Vec<ToolInvocation>,
) -> ChatMessage {
    ChatMessage {
        id: new_message_id(),
        role: source.role(),
        content,
        tool_invocations,
        created_at: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Role, ToolResultPart};
    use serde_json::json;

    fn assistant_with_call(text: &str, call_id: &str) -> CoreMessage {
        CoreMessage::Assistant {
            content: MessageContent::Parts(vec![
                ContentPart::Text {
                    text: text.to_string(),
                },
                ContentPart::ToolCall {
                    tool_call_id: call_id.to_string(),
                    tool_name: "getBalance".to_string(),
                    args: json!({"address": "0xabc"}),
                },
            ]),
        }
    }

    fn tool_result(call_id: &str, result: serde_json::Value) -> CoreMessage {
        CoreMessage::Tool {
            content: vec![ToolResultPart {
                tool_call_id: call_id.to_string(),
                tool_name: "getBalance".to_string(),
                result,
            }],
        }
    }

    #[test]
    fn output_skips_tool_messages() {
        let input = vec![
            CoreMessage::user("Check my balance"),
            assistant_with_call("", "c1"),
            tool_result("c1", json!("1.2 ETH")),
            CoreMessage::assistant("Your balance is 1.2 ETH"),
        ];

        let out = normalize(&input);
        let non_tool = input.iter().filter(|m| m.role() != Role::Tool).count();
        assert_eq!(out.len(), non_tool);
        assert_eq!(
            out.iter().map(|m| m.role).collect::<Vec<_>>(),
            vec![Role::User, Role::Assistant, Role::Assistant]
        );
    }

    #[test]
    fn tool_result_resolves_only_matching_call() {
        let input = vec![
            assistant_with_call("first", "c1"),
            assistant_with_call("second", "c2"),
            tool_result("c2", json!({"wei": "1200"})),
        ];

        let out = normalize(&input);
        assert!(out[0].tool_invocations[0].is_pending());
        assert_eq!(
            out[1].tool_invocations[0].result(),
            Some(&json!({"wei": "1200"}))
        );
        assert_eq!(out[1].tool_invocations[0].args(), &json!({"address": "0xabc"}));
    }

    #[test]
    fn unmatched_tool_result_is_dropped() {
        let input = vec![CoreMessage::user("hi"), tool_result("nope", json!(null))];
        let out = normalize(&input);
        assert_eq!(out.len(), 1);
        assert!(out[0].tool_invocations.is_empty());
    }

    #[test]
    fn tool_result_before_call_does_not_attach() {
        let input = vec![tool_result("c1", json!(1)), assistant_with_call("x", "c1")];
        let out = normalize(&input);
        assert!(out[0].tool_invocations[0].is_pending());
    }

    #[test]
    fn text_parts_are_concatenated() {
        let input = vec![CoreMessage::Assistant {
            content: MessageContent::Parts(vec![
                ContentPart::Text {
                    text: "Your balance ".to_string(),
                },
                ContentPart::Unsupported,
                ContentPart::Text {
                    text: "is 1.2 ETH".to_string(),
                },
            ]),
        }];

        let out = normalize(&input);
        assert_eq!(out[0].content, "Your balance is 1.2 ETH");
        assert!(out[0].tool_invocations.is_empty());
    }

    #[test]
    fn repeated_runs_share_shape_not_ids() {
        let input = vec![
            CoreMessage::System {
                content: "rules".to_string(),
            },
            assistant_with_call("a", "c1"),
            tool_result("c1", json!(true)),
        ];

        let first = normalize(&input);
        let second = normalize(&input);
        assert_eq!(first.len(), second.len());
        for (a, b) in first.iter().zip(&second) {
            assert_ne!(a.id, b.id);
            assert_eq!(a.role, b.role);
            assert_eq!(a.content, b.content);
            assert_eq!(a.tool_invocations, b.tool_invocations);
        }
    }

    #[test]
    fn resolve_reports_misses() {
        let mut messages = normalize(&[assistant_with_call("", "c1")]);
        assert!(!resolve_tool_result(&mut messages, "c9", &json!(0)));
        assert!(resolve_tool_result(&mut messages, "c1", &json!(0)));
        // Already resolved, nothing left pending.
        assert!(!resolve_tool_result(&mut messages, "c1", &json!(1)));
        assert_eq!(messages[0].tool_invocations[0].result(), Some(&json!(0)));
    }
}
