pub mod actions;
pub mod effects;
pub mod landing;
pub mod sidebar;

use dioxus::prelude::*;
use onyx_core::auth::AuthState;
use onyx_core::{ChatRegistry, ChatSession};

use crate::components::ChatView;
use landing::{Landing, LoadingScreen};
use sidebar::Sidebar;

/// App root: owns the chat registry and the open session and passes both
/// down explicitly.
#[component]
pub fn Shell() -> Element {
    let auth = use_signal(AuthState::default);
    let access_token = use_signal(|| None::<String>);
    let registry = use_signal(ChatRegistry::new);
    let session = use_signal(|| {
        let chat_id = registry.peek().current_chat_id().cloned().unwrap_or_default();
        ChatSession::new(chat_id, Vec::new())
    });
    let history_loaded = use_signal(|| false);
    let mut sidebar_open = use_signal(|| false);
    let wallet_ready = use_signal(|| false);

    use_future(move || async move {
        effects::watch_identity(auth).await;
    });

    // Readiness and user id; the token is re-fetched when either changes.
    let identity_key = use_memo(move || {
        let auth = auth.read();
        (
            !matches!(*auth, AuthState::Loading),
            auth.user_id().map(str::to_string),
        )
    });

    use_effect(move || {
        let (_, user_id) = identity_key();
        spawn(async move {
            effects::refresh_access_token(user_id.is_some(), access_token).await;
        });
    });

    use_effect(move || {
        let (ready, _) = identity_key();
        if !ready {
            return;
        }
        let delegation = auth.peek().user().and_then(|user| user.wallet_delegation());
        spawn(async move {
            effects::delegate_wallet(delegation, wallet_ready).await;
        });
    });

    // First load as soon as there is a token, then the poller takes over.
    use_effect(move || {
        let Some(token) = access_token() else {
            return;
        };
        spawn(async move {
            effects::refresh_history(token, registry, session, history_loaded).await;
        });
    });

    use_future(move || async move {
        effects::poll_history(access_token, registry, session, history_loaded).await;
    });

    let on_refresh = move |_: ()| {
        let Some(token) = access_token.peek().clone() else {
            return;
        };
        spawn(async move {
            effects::refresh_history(token, registry, session, history_loaded).await;
        });
    };

    let state = auth.read().clone();
    let body = match state {
        AuthState::Loading => rsx! {
            LoadingScreen { message: "Loading Onyx AI..." }
        },
        AuthState::Unauthenticated => rsx! {
            Landing {}
        },
        AuthState::Authenticated(user) => rsx! {
            div {
                class: "app-layout",
                Sidebar {
                    user,
                    registry,
                    session,
                    access_token,
                    history_loaded,
                    open: sidebar_open,
                    on_refresh,
                }
                if sidebar_open() {
                    div {
                        class: "sidebar-backdrop",
                        onclick: move |_| sidebar_open.set(false),
                    }
                }
                main {
                    class: "app-main",
                    header {
                        class: "app-header",
                        button {
                            class: "sidebar-toggle",
                            onclick: move |_| sidebar_open.set(!sidebar_open()),
                            "☰"
                        }
                        span { class: "app-title", "Onyx AI Agent" }
                    }
                    if wallet_ready() {
                        ChatView { registry, session, access_token }
                    } else {
                        LoadingScreen { message: "Connecting to wallet..." }
                    }
                }
            }
        },
    };

    rsx! {
        style { {SHELL_STYLES} }
        {body}
    }
}

const SHELL_STYLES: &str = r#"
:root {
    --chat-bg: #0b0b0f;
    --bg-secondary: #18181b;
    --border-color: #27272a;
    --text-primary: #fafafa;
    --text-secondary: #a1a1aa;
    --text-muted: #71717a;
    --accent-bg: #8b5cf6;
    --accent-bg-hover: #7c3aed;
    --success-bg: #10b981;
    --warning-bg: #f59e0b;
}

html, body, #main {
    margin: 0;
    height: 100%;
    background: var(--chat-bg);
    color: var(--text-primary);
    font-family: system-ui, -apple-system, sans-serif;
}

.loading-screen {
    display: flex;
    flex-direction: column;
    align-items: center;
    justify-content: center;
    height: 100vh;
    gap: 1rem;
    color: var(--text-secondary);
}

.loading-spinner {
    width: 2.5rem;
    height: 2.5rem;
    border: 3px solid var(--border-color);
    border-top-color: var(--accent-bg);
    border-radius: 50%;
    animation: spin 1s linear infinite;
}

@keyframes spin {
    from { transform: rotate(0deg); }
    to { transform: rotate(360deg); }
}

.app-layout {
    display: flex;
    height: 100vh;
    overflow: hidden;
}

.app-main {
    flex: 1;
    display: flex;
    flex-direction: column;
    min-width: 0;
}

.app-header {
    display: flex;
    align-items: center;
    gap: 0.75rem;
    padding: 0.75rem 1rem;
    border-bottom: 1px solid var(--border-color);
    font-weight: 600;
}

.app-main .chat-container {
    flex: 1;
    min-height: 0;
}

.sidebar-toggle {
    display: none;
    background: none;
    border: none;
    color: var(--text-primary);
    font-size: 1.25rem;
    cursor: pointer;
}

.sidebar {
    width: 18rem;
    flex-shrink: 0;
    display: flex;
    flex-direction: column;
    gap: 1rem;
    padding: 1rem;
    background: var(--bg-secondary);
    border-right: 1px solid var(--border-color);
    overflow-y: auto;
}

.sidebar-brand {
    display: flex;
    align-items: center;
    gap: 0.5rem;
    font-size: 1.125rem;
    font-weight: 700;
}

.brand-mark {
    color: var(--accent-bg);
}

.sidebar-section h3 {
    margin: 0 0 0.5rem 0;
    font-size: 0.75rem;
    text-transform: uppercase;
    letter-spacing: 0.05em;
    color: var(--text-muted);
}

.account-row, .credits-row, .history-header {
    display: flex;
    align-items: center;
    justify-content: space-between;
    gap: 0.5rem;
    font-size: 0.875rem;
    margin-bottom: 0.5rem;
}

.account-label {
    color: var(--text-secondary);
}

.account-value {
    flex: 1;
    text-align: right;
    overflow: hidden;
    text-overflow: ellipsis;
    white-space: nowrap;
}

.icon-button {
    background: none;
    border: none;
    color: var(--text-secondary);
    cursor: pointer;
    padding: 0.125rem 0.25rem;
}

.icon-button:hover {
    color: var(--text-primary);
}

.logout-button, .new-chat-button {
    padding: 0.375rem 0.75rem;
    background: transparent;
    color: var(--text-primary);
    border: 1px solid var(--border-color);
    border-radius: 0.5rem;
    cursor: pointer;
    font-size: 0.8125rem;
}

.credits-bar {
    height: 0.375rem;
    background: var(--border-color);
    border-radius: 999px;
    overflow: hidden;
}

.credits-fill {
    height: 100%;
    background: var(--accent-bg);
}

.credits-hint {
    margin: 0.5rem 0 0 0;
    font-size: 0.75rem;
    color: var(--text-muted);
}

.history {
    flex: 1;
}

.history-empty {
    font-size: 0.875rem;
    color: var(--text-muted);
}

.history-item {
    display: flex;
    align-items: center;
    justify-content: space-between;
    padding: 0.5rem 0.625rem;
    border-radius: 0.5rem;
    font-size: 0.875rem;
    cursor: pointer;
}

.history-item:hover, .history-item.active {
    background: var(--border-color);
}

.history-item .delete {
    visibility: hidden;
}

.history-item:hover .delete {
    visibility: visible;
}

.landing {
    min-height: 100vh;
    display: flex;
    flex-direction: column;
}

.landing-header {
    display: flex;
    align-items: center;
    justify-content: space-between;
    padding: 1rem 2rem;
}

.landing-hero {
    display: flex;
    flex-direction: column;
    align-items: center;
    text-align: center;
    padding: 5rem 1rem 3rem;
    gap: 1rem;
}

.landing-hero h1 {
    font-size: 2.5rem;
    margin: 0;
}

.landing-hero p {
    max-width: 32rem;
    color: var(--text-secondary);
}

.landing-note {
    font-size: 0.8125rem;
    color: var(--text-muted);
}

.connect-button {
    padding: 0.5rem 1rem;
    background: var(--accent-bg);
    color: white;
    border: none;
    border-radius: 0.5rem;
    cursor: pointer;
    font-weight: 600;
}

.connect-button:hover {
    background: var(--accent-bg-hover);
}

.connect-button.large {
    padding: 0.75rem 1.5rem;
    font-size: 1rem;
}

.landing-features {
    display: grid;
    grid-template-columns: repeat(auto-fit, minmax(14rem, 1fr));
    gap: 1rem;
    max-width: 60rem;
    margin: 0 auto;
    padding: 0 1rem 4rem;
}

.feature-card {
    padding: 1.25rem;
    background: var(--bg-secondary);
    border: 1px solid var(--border-color);
    border-radius: 0.75rem;
}

.feature-card h3 {
    margin: 0 0 0.5rem 0;
    font-size: 1rem;
}

.feature-card p {
    margin: 0;
    font-size: 0.875rem;
    color: var(--text-secondary);
}

.sidebar-backdrop {
    display: none;
}

@media (max-width: 767px) {
    .sidebar-toggle {
        display: block;
    }

    .sidebar {
        position: fixed;
        inset: 0 auto 0 0;
        z-index: 20;
        transform: translateX(-100%);
        transition: transform 0.2s;
    }

    .sidebar.open {
        transform: translateX(0);
    }

    .sidebar-backdrop {
        display: block;
        position: fixed;
        inset: 0;
        z-index: 10;
        background: rgba(0, 0, 0, 0.5);
    }
}
"#;
