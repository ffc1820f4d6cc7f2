use crate::normalize::normalize;
use crate::{CoreMessage, UNTITLED_CHAT_TITLE};

/// Chat label: the first normalized message's text, verbatim.
///
/// Truncation for the sidebar lives in [`crate::display::truncate_title`].
pub fn derive_title(messages: &[CoreMessage]) -> String {
    normalize(messages)
        .into_iter()
        .next()
        .map(|first| first.content)
        .unwrap_or_else(|| UNTITLED_CHAT_TITLE.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ContentPart, MessageContent, ToolResultPart};

    #[test]
    fn empty_history_is_untitled() {
        assert_eq!(derive_title(&[]), "Untitled");
    }

    #[test]
    fn first_user_message_becomes_title() {
        let messages = vec![CoreMessage::user("Hello"), CoreMessage::assistant("Hi!")];
        assert_eq!(derive_title(&messages), "Hello");
    }

    #[test]
    fn leading_tool_message_is_skipped() {
        let messages = vec![
            CoreMessage::Tool {
                content: vec![ToolResultPart {
                    tool_call_id: "c1".to_string(),
                    tool_name: "t".to_string(),
                    result: serde_json::Value::Null,
                }],
            },
            CoreMessage::user("Swap 1 ETH for USDC"),
        ];
        assert_eq!(derive_title(&messages), "Swap 1 ETH for USDC");
    }

    #[test]
    fn long_titles_are_not_truncated() {
        let text = "Deploy a smart contract on the blockchain please";
        let messages = vec![CoreMessage::User {
            content: MessageContent::Parts(vec![ContentPart::Text {
                text: text.to_string(),
            }]),
        }];
        assert_eq!(derive_title(&messages), text);
    }

    #[test]
    fn tool_only_first_message_gives_empty_title() {
        let messages = vec![CoreMessage::Assistant {
            content: MessageContent::Parts(vec![ContentPart::ToolCall {
                tool_call_id: "c1".to_string(),
                tool_name: "getBalance".to_string(),
                args: serde_json::json!({}),
            }]),
        }];
        assert_eq!(derive_title(&messages), "");
    }
}
