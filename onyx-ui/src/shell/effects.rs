use dioxus::prelude::{ReadableExt, Signal, WritableExt};
use gloo_timers::future::TimeoutFuture;
use onyx_core::auth::{AuthState, WalletDelegation};
use onyx_core::{ChatRegistry, ChatSession, PromptsLeft};

use crate::api::{client_config, fetch_chats, fetch_prompts_left};
use crate::identity;

const IDENTITY_POLL_MS: u32 = 500;

/// Mirror the provider's state into `auth`. Runs for the life of the shell.
pub async fn watch_identity(mut auth: Signal<AuthState>) {
    loop {
        let next = identity::snapshot();
        if *auth.peek() != next {
            dioxus_logger::tracing::debug!("identity state changed");
            auth.set(next);
        }
        TimeoutFuture::new(IDENTITY_POLL_MS).await;
    }
}

pub async fn refresh_access_token(authenticated: bool, mut token: Signal<Option<String>>) {
    if !authenticated {
        token.set(None);
        return;
    }
    match identity::access_token().await {
        Ok(fresh) => token.set(Some(fresh)),
        Err(e) => {
            dioxus_logger::tracing::warn!("Failed to get access token: {}", e);
            token.set(None);
        }
    }
}

/// Hand the embedded wallet to the agent. `wallet_ready` flips back on
/// whether or not the provider accepted.
pub async fn delegate_wallet(delegation: Option<WalletDelegation>, mut wallet_ready: Signal<bool>) {
    if let Some(delegation) = delegation {
        wallet_ready.set(false);
        match identity::delegate_wallet(&delegation).await {
            Ok(()) => dioxus_logger::tracing::debug!("delegated wallet {}", delegation.address),
            Err(e) => dioxus_logger::tracing::error!("Failed to delegate wallet: {}", e),
        }
    }
    wallet_ready.set(true);
}

/// One history fetch. Failures leave the registry as it was.
pub async fn refresh_history(
    token: String,
    mut registry: Signal<ChatRegistry>,
    mut session: Signal<ChatSession>,
    mut history_loaded: Signal<bool>,
) {
    match fetch_chats(&token).await {
        Ok(chats) => {
            registry.write().hydrate(chats);
            sync_session_from_registry(registry, &mut session);
        }
        Err(e) => {
            dioxus_logger::tracing::error!("Failed to fetch chat history: {}", e);
        }
    }
    if !*history_loaded.peek() {
        history_loaded.set(true);
    }
}

pub async fn poll_history(
    token: Signal<Option<String>>,
    registry: Signal<ChatRegistry>,
    session: Signal<ChatSession>,
    history_loaded: Signal<bool>,
) {
    let interval_ms = client_config().history_poll_millis();
    loop {
        TimeoutFuture::new(interval_ms).await;
        let current = token.peek().clone();
        if let Some(token) = current {
            refresh_history(token, registry, session, history_loaded).await;
        }
    }
}

pub async fn load_credits(token: String, mut credits: Signal<PromptsLeft>) {
    match fetch_prompts_left(&token).await {
        Ok(left) => credits.set(left),
        Err(e) => {
            dioxus_logger::tracing::error!("Failed to fetch prompts left: {}", e);
        }
    }
}

/// A freshly opened chat picks up its history once it has been loaded.
fn sync_session_from_registry(registry: Signal<ChatRegistry>, session: &mut Signal<ChatSession>) {
    let chat_id = session.peek().chat_id().clone();
    let history = registry
        .peek()
        .chat(&chat_id)
        .map(|chat| chat.messages.clone())
        .unwrap_or_default();

    if history.is_empty() {
        return;
    }
    let mut candidate = session.peek().clone();
    if candidate.adopt_history(&history) {
        dioxus_logger::tracing::debug!("loaded history into open chat {}", chat_id);
        session.set(candidate);
    }
}
