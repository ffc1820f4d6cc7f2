use dioxus::prelude::*;
use gloo_timers::future::TimeoutFuture;
use onyx_core::auth::{ConnectedAccount, IdentityUser};
use onyx_core::display::{format_wallet_address, truncate_title, CreditGauge};
use onyx_core::{ChatId, ChatRegistry, ChatSession, PromptsLeft};

use crate::api::client_config;
use crate::identity;
use crate::interop::{copy_text_to_clipboard, is_mobile_viewport};
use crate::shell::{actions, effects};

const COPIED_RESET_MS: u32 = 1200;

#[derive(Clone, Copy, PartialEq)]
enum CopyTarget {
    Account,
    EmbeddedWallet,
}

fn copy_with_feedback(text: &str, target: CopyTarget, mut copied: Signal<Option<CopyTarget>>) {
    copy_text_to_clipboard(text);
    copied.set(Some(target));
    spawn(async move {
        TimeoutFuture::new(COPIED_RESET_MS).await;
        if *copied.peek() == Some(target) {
            copied.set(None);
        }
    });
}

fn close_on_mobile(mut open: Signal<bool>) {
    if is_mobile_viewport() {
        open.set(false);
    }
}

#[component]
pub fn Sidebar(
    user: IdentityUser,
    registry: Signal<ChatRegistry>,
    session: Signal<ChatSession>,
    access_token: Signal<Option<String>>,
    history_loaded: Signal<bool>,
    open: Signal<bool>,
    on_refresh: EventHandler<()>,
) -> Element {
    let config = client_config();
    let credits = use_signal(PromptsLeft::default);
    let copied = use_signal(|| None::<CopyTarget>);
    let mut deletes = use_signal(|| 0u32);
    let settled_turns = use_memo(move || session.read().settled_turns());

    // Each finished reply or delete may have spent or freed credits.
    use_effect(move || {
        let _ = (settled_turns(), deletes());
        let Some(token) = access_token() else {
            return;
        };
        spawn(async move {
            effects::load_credits(token, credits).await;
        });
    });

    let (account_label, account_text, account_copy) = match user.connected_account() {
        ConnectedAccount::Email(email) => ("Email", email.clone(), Some(email)),
        ConnectedAccount::Wallet(address) => {
            ("Wallet", format_wallet_address(&address), Some(address))
        }
        ConnectedAccount::None => ("Account", "Not connected".to_string(), None),
    };
    let embedded_wallet = user.embedded_wallet().map(str::to_string);

    let gauge = CreditGauge::new(credits.read().remaining(), config.prompt_quota);

    let chats = registry.read().chats().clone();
    let current_chat_id = registry.read().current_chat_id().cloned();

    let on_select = move |chat_id: ChatId| {
        actions::select_chat(chat_id, registry, session);
        close_on_mobile(open);
    };

    let on_delete = move |chat_id: ChatId| {
        let Some(token) = access_token.peek().clone() else {
            return;
        };
        spawn(async move {
            if actions::delete_chat_action(token, chat_id, registry, session).await {
                *deletes.write() += 1;
                on_refresh.call(());
            }
        });
    };

    rsx! {
        aside {
            class: if open() { "sidebar open" } else { "sidebar" },

            div {
                class: "sidebar-brand",
                span { class: "brand-mark", "◆" }
                span { "Onyx" }
            }

            section {
                class: "sidebar-section",
                h3 { "Connected Account" }
                div {
                    class: "account-row",
                    span { class: "account-label", "{account_label}" }
                    span { class: "account-value", "{account_text}" }
                    if let Some(value) = account_copy {
                        button {
                            class: "icon-button",
                            title: "Copy",
                            onclick: move |_| copy_with_feedback(&value, CopyTarget::Account, copied),
                            if copied() == Some(CopyTarget::Account) { "✓" } else { "⧉" }
                        }
                    }
                }
                if let Some(wallet) = embedded_wallet {
                    div {
                        class: "account-row",
                        span { class: "account-label", "Agent Wallet" }
                        span { class: "account-value", "{format_wallet_address(&wallet)}" }
                        button {
                            class: "icon-button",
                            title: "Copy",
                            onclick: move |_| copy_with_feedback(&wallet, CopyTarget::EmbeddedWallet, copied),
                            if copied() == Some(CopyTarget::EmbeddedWallet) { "✓" } else { "⧉" }
                        }
                    }
                }
                button {
                    class: "logout-button",
                    onclick: move |_| identity::logout(),
                    "Log out"
                }
            }

            section {
                class: "sidebar-section",
                h3 { "Credits" }
                div {
                    class: "credits-row",
                    span { "Prompts left" }
                    span { class: "credits-value", "{gauge.label()}" }
                }
                div {
                    class: "credits-bar",
                    div { class: "credits-fill", style: "width: {gauge.percent()}%" }
                }
                p { class: "credits-hint", "Free credits refill every hour." }
            }

            section {
                class: "sidebar-section history",
                div {
                    class: "history-header",
                    h3 { "Chats" }
                    button {
                        class: "new-chat-button",
                        onclick: move |_| {
                            actions::start_new_chat(registry, session);
                            on_refresh.call(());
                            close_on_mobile(open);
                        },
                        "+ New Chat"
                    }
                }
                if !history_loaded() {
                    div { class: "history-empty", "Loading..." }
                } else if chats.is_empty() {
                    div { class: "history-empty", "No chats yet" }
                } else {
                    for chat in chats.iter() {
                        HistoryItem {
                            key: "{chat.id}",
                            chat_id: chat.id.clone(),
                            title: truncate_title(&chat.title, config.title_display_chars),
                            active: current_chat_id.as_ref() == Some(&chat.id),
                            on_select,
                            on_delete,
                        }
                    }
                }
            }
        }
    }
}

#[component]
fn HistoryItem(
    chat_id: ChatId,
    title: String,
    active: bool,
    on_select: EventHandler<ChatId>,
    on_delete: EventHandler<ChatId>,
) -> Element {
    let delete_id = chat_id.clone();
    rsx! {
        div {
            class: if active { "history-item active" } else { "history-item" },
            onclick: move |_| on_select.call(chat_id.clone()),
            span { class: "history-title", "{title}" }
            button {
                class: "icon-button delete",
                title: "Delete chat",
                onclick: move |e| {
                    e.stop_propagation();
                    on_delete.call(delete_id.clone());
                },
                "✕"
            }
        }
    }
}
