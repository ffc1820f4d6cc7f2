use dioxus::prelude::*;
use gloo_timers::future::TimeoutFuture;
use onyx_core::display::{format_timestamp, is_displayable};
use onyx_core::{ChatMessage, ChatRegistry, ChatSession, ToolInvocation};

use crate::interop::scroll_into_view;
use crate::shell::actions;

pub const SUGGESTIONS: [&str; 4] = [
    "Check my balance",
    "Deploy a smart contract",
    "Launch a ERC20 token",
    "Swap 1 ETH for USDC",
];

const MESSAGES_END_ID: &str = "messages-end";
const SCROLL_DELAY_MS: u32 = 100;

#[component]
pub fn ChatView(
    registry: Signal<ChatRegistry>,
    session: Signal<ChatSession>,
    access_token: Signal<Option<String>>,
) -> Element {
    let mut input_text = use_signal(String::new);

    // Keep the newest message in view
    use_effect(move || {
        let _ = session.read().display_messages().count();
        spawn(async move {
            TimeoutFuture::new(SCROLL_DELAY_MS).await;
            scroll_into_view(MESSAGES_END_ID);
        });
    });

    let send_message = use_callback(move |_| {
        let Some(token) = access_token.peek().clone() else {
            dioxus_logger::tracing::warn!("No access token yet, message not sent");
            return;
        };

        let text = input_text.to_string();
        let Some(submission) = actions::begin_submit(&text, registry, session) else {
            return;
        };
        input_text.set(String::new());

        spawn(async move {
            actions::stream_reply(token, submission, registry, session).await;
        });
    });

    let onkeydown = use_callback(move |e: KeyboardEvent| {
        if e.key() == Key::Enter && !e.modifiers().shift() {
            e.prevent_default();
            send_message.call(());
        }
    });

    let onclick = use_callback(move |_| {
        send_message.call(());
    });

    let oninput = use_callback(move |e: FormEvent| {
        input_text.set(e.value());
    });

    let (messages, in_flight, awaiting_text) = {
        let current = session.read();
        let messages: Vec<ChatMessage> = current
            .display_messages()
            .filter(|m| is_displayable(m))
            .cloned()
            .collect();
        let awaiting_text = current
            .streaming_message()
            .map_or(true, |m| m.content.is_empty());
        (messages, current.in_flight(), awaiting_text)
    };

    rsx! {
        style { {CHAT_STYLES} }

        div {
            class: "chat-container",

            div {
                class: "messages-scroll-area",
                div {
                    class: "messages-list",
                    if messages.is_empty() && !in_flight {
                        div {
                            class: "empty-state",
                            div { class: "empty-logo", "◆" }
                            p { "I'm Onyx AI Agent, How can I assist you?" }
                            div {
                                class: "suggestions",
                                for suggestion in SUGGESTIONS {
                                    button {
                                        key: "{suggestion}",
                                        class: "suggestion",
                                        onclick: move |_| input_text.set(suggestion.to_string()),
                                        "{suggestion}"
                                    }
                                }
                            }
                        }
                    } else {
                        for msg in messages.iter() {
                            MessageBubble { key: "{msg.id}", message: msg.clone() }
                        }
                    }
                    if in_flight && awaiting_text {
                        LoadingIndicator {}
                    }
                    div { id: MESSAGES_END_ID }
                }
            }

            div {
                class: "chat-input-area",
                div {
                    class: "input-wrapper",
                    textarea {
                        class: "chat-textarea",
                        placeholder: "Ask Onyx anything...",
                        value: "{input_text}",
                        rows: "1",
                        oninput,
                        onkeydown,
                    }
                    button {
                        class: "send-button",
                        disabled: in_flight || input_text.read().trim().is_empty(),
                        onclick,
                        if in_flight {
                            div {
                                class: "spinner",
                                span { "◐" }
                            }
                        } else {
                            span { "➤" }
                        }
                    }
                }
                div {
                    class: "input-hint",
                    "Press Enter to send, Shift+Enter for new line"
                }
            }
        }
    }
}

#[component]
pub fn MessageBubble(message: ChatMessage) -> Element {
    let is_user = message.is_user();
    let sender_name = if is_user { "You" } else { "Onyx" };
    let sender_initial = if is_user { "Y" } else { "O" };
    let time = message.created_at.map(format_timestamp);

    rsx! {
        div {
            class: if is_user { "message-row user-row" } else { "message-row assistant-row" },

            div {
                class: if is_user { "avatar user-avatar" } else { "avatar assistant-avatar" },
                "{sender_initial}"
            }

            div {
                class: "message-content",

                div {
                    class: "message-header",
                    span { class: "sender-name", "{sender_name}" }
                    if let Some(time) = time {
                        span { class: "message-time", "{time}" }
                    }
                }

                div {
                    class: if is_user { "message-bubble user-bubble" } else { "message-bubble assistant-bubble" },
                    "{message.content}"
                }

                if !message.tool_invocations.is_empty() {
                    div {
                        class: "tool-chips",
                        for invocation in message.tool_invocations.iter() {
                            ToolChip {
                                key: "{invocation.tool_call_id()}",
                                invocation: invocation.clone(),
                            }
                        }
                    }
                }
            }
        }
    }
}

#[component]
fn ToolChip(invocation: ToolInvocation) -> Element {
    let pending = invocation.is_pending();
    rsx! {
        span {
            class: if pending { "tool-chip pending" } else { "tool-chip done" },
            title: "{invocation.args()}",
            if pending { "⋯ " } else { "✓ " }
            "{invocation.tool_name()}"
        }
    }
}

#[component]
pub fn LoadingIndicator() -> Element {
    rsx! {
        div {
            class: "message-row assistant-row",
            div {
                class: "avatar assistant-avatar",
                "O"
            }
            div {
                class: "message-content",
                div {
                    class: "message-header",
                    span { class: "sender-name", "Onyx" }
                }
                div {
                    class: "typing-indicator",
                    span {}
                    span {}
                    span {}
                }
            }
        }
    }
}

const CHAT_STYLES: &str = r#"
.chat-container {
    display: flex;
    flex-direction: column;
    height: 100%;
    background: var(--chat-bg, #0b0b0f);
    overflow: hidden;
}

.messages-scroll-area {
    flex: 1;
    overflow-y: auto;
    overflow-x: hidden;
    padding: 1.5rem 1rem;
    scroll-behavior: smooth;
}

.messages-scroll-area::-webkit-scrollbar {
    width: 6px;
}

.messages-scroll-area::-webkit-scrollbar-thumb {
    background: var(--border-color, #27272a);
    border-radius: 3px;
}

.messages-list {
    display: flex;
    flex-direction: column;
    gap: 1rem;
    max-width: 48rem;
    margin: 0 auto;
}

.empty-state {
    display: flex;
    flex-direction: column;
    align-items: center;
    justify-content: center;
    padding: 4rem 1rem 2rem;
    color: var(--text-muted, #71717a);
    text-align: center;
}

.empty-logo {
    font-size: 2.5rem;
    margin-bottom: 1rem;
    color: var(--accent-bg, #8b5cf6);
}

.empty-state p {
    font-size: 1.125rem;
    font-weight: 500;
    color: var(--text-primary, #fafafa);
    margin: 0 0 1.5rem 0;
}

.suggestions {
    display: grid;
    grid-template-columns: repeat(2, minmax(0, 1fr));
    gap: 0.75rem;
    width: 100%;
    max-width: 32rem;
}

.suggestion {
    padding: 0.875rem 1rem;
    background: var(--bg-secondary, #18181b);
    color: var(--text-secondary, #a1a1aa);
    border: 1px solid var(--border-color, #27272a);
    border-radius: 0.75rem;
    font-size: 0.875rem;
    text-align: left;
    cursor: pointer;
    transition: border-color 0.2s, color 0.2s;
}

.suggestion:hover {
    border-color: var(--accent-bg, #8b5cf6);
    color: var(--text-primary, #fafafa);
}

.message-row {
    display: flex;
    gap: 0.75rem;
    max-width: 100%;
}

.user-row {
    flex-direction: row-reverse;
}

.avatar {
    width: 2rem;
    height: 2rem;
    border-radius: 50%;
    display: flex;
    align-items: center;
    justify-content: center;
    font-size: 0.75rem;
    font-weight: 600;
    flex-shrink: 0;
}

.user-avatar {
    background: var(--accent-bg, #8b5cf6);
    color: white;
}

.assistant-avatar {
    background: var(--bg-secondary, #18181b);
    color: var(--text-secondary, #a1a1aa);
    border: 1px solid var(--border-color, #27272a);
}

.message-content {
    display: flex;
    flex-direction: column;
    gap: 0.25rem;
    max-width: calc(100% - 3rem);
}

.user-row .message-content {
    align-items: flex-end;
}

.message-header {
    display: flex;
    align-items: center;
    gap: 0.5rem;
    font-size: 0.75rem;
}

.user-row .message-header {
    flex-direction: row-reverse;
}

.sender-name {
    font-weight: 500;
    color: var(--text-secondary, #a1a1aa);
}

.message-time {
    color: var(--text-muted, #71717a);
}

.message-bubble {
    padding: 0.75rem 1rem;
    border-radius: 1rem;
    font-size: 0.9375rem;
    line-height: 1.5;
    white-space: pre-wrap;
    word-wrap: break-word;
    max-width: 100%;
}

.user-bubble {
    background: var(--accent-bg, #8b5cf6);
    color: white;
    border-bottom-right-radius: 0.25rem;
}

.assistant-bubble {
    background: var(--bg-secondary, #18181b);
    color: var(--text-primary, #fafafa);
    border: 1px solid var(--border-color, #27272a);
    border-bottom-left-radius: 0.25rem;
}

.tool-chips {
    display: flex;
    flex-wrap: wrap;
    gap: 0.375rem;
}

.tool-chip {
    padding: 0.125rem 0.5rem;
    border-radius: 999px;
    font-size: 0.75rem;
    font-family: ui-monospace, monospace;
    border: 1px solid var(--border-color, #27272a);
}

.tool-chip.pending {
    color: var(--warning-bg, #f59e0b);
}

.tool-chip.done {
    color: var(--success-bg, #10b981);
}

.typing-indicator {
    display: flex;
    gap: 0.25rem;
    padding: 1rem;
    background: var(--bg-secondary, #18181b);
    border: 1px solid var(--border-color, #27272a);
    border-radius: 1rem;
    border-bottom-left-radius: 0.25rem;
    width: fit-content;
}

.typing-indicator span {
    width: 0.5rem;
    height: 0.5rem;
    background: var(--text-muted, #71717a);
    border-radius: 50%;
    animation: typing-bounce 1.4s infinite ease-in-out both;
}

.typing-indicator span:nth-child(1) { animation-delay: -0.32s; }
.typing-indicator span:nth-child(2) { animation-delay: -0.16s; }

@keyframes typing-bounce {
    0%, 80%, 100% { transform: scale(0); }
    40% { transform: scale(1); }
}

.chat-input-area {
    padding: 0.75rem 1rem 1rem;
    border-top: 1px solid var(--border-color, #27272a);
    flex-shrink: 0;
}

.input-wrapper {
    display: flex;
    gap: 0.5rem;
    align-items: flex-end;
    max-width: 48rem;
    margin: 0 auto;
}

.chat-textarea {
    flex: 1;
    padding: 0.75rem 1rem;
    background: var(--input-bg, #18181b);
    color: var(--text-primary, #fafafa);
    border: 1px solid var(--border-color, #27272a);
    border-radius: 1.5rem;
    font-size: 0.9375rem;
    font-family: inherit;
    resize: none;
    outline: none;
    min-height: 2.75rem;
    max-height: 8rem;
    line-height: 1.25;
}

.chat-textarea:focus {
    border-color: var(--accent-bg, #8b5cf6);
}

.send-button {
    width: 2.75rem;
    height: 2.75rem;
    display: flex;
    align-items: center;
    justify-content: center;
    background: var(--accent-bg, #8b5cf6);
    color: white;
    border: none;
    border-radius: 50%;
    cursor: pointer;
    font-size: 1.25rem;
    flex-shrink: 0;
}

.send-button:disabled {
    background: var(--border-color, #27272a);
    color: var(--text-muted, #71717a);
    cursor: not-allowed;
}

.send-button .spinner {
    animation: spin 1s linear infinite;
}

@keyframes spin {
    from { transform: rotate(0deg); }
    to { transform: rotate(360deg); }
}

.input-hint {
    margin-top: 0.5rem;
    font-size: 0.75rem;
    color: var(--text-muted, #71717a);
    text-align: center;
}
"#;
