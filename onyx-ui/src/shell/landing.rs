use dioxus::prelude::*;

use crate::api::client_config;
use crate::identity;

const FEATURES: [(&str, &str); 3] = [
    (
        "Wallet at your fingertips",
        "Check balances, send tokens and swap assets by asking.",
    ),
    (
        "Deploy without boilerplate",
        "Launch contracts and ERC20 tokens from a single prompt.",
    ),
    (
        "Try it as a guest",
        "Every new account starts with free prompts.",
    ),
];

#[component]
pub fn LoadingScreen(message: String) -> Element {
    rsx! {
        div {
            class: "loading-screen",
            div { class: "loading-spinner" }
            p { "{message}" }
        }
    }
}

#[component]
pub fn Landing() -> Element {
    let free_prompts = client_config().prompt_quota;
    rsx! {
        div {
            class: "landing",
            header {
                class: "landing-header",
                div {
                    class: "sidebar-brand",
                    span { class: "brand-mark", "◆" }
                    span { "Onyx" }
                }
                button {
                    class: "connect-button",
                    onclick: move |_| identity::login(),
                    "Connect Wallet"
                }
            }
            section {
                class: "landing-hero",
                h1 { "Your on-chain assistant" }
                p { "Talk to Onyx AI Agent to manage wallets, deploy contracts and trade tokens." }
                button {
                    class: "connect-button large",
                    onclick: move |_| identity::login(),
                    "Connect Wallet"
                }
                span { class: "landing-note", "{free_prompts} free prompts available in guest mode" }
            }
            section {
                class: "landing-features",
                for (title, body) in FEATURES {
                    div {
                        key: "{title}",
                        class: "feature-card",
                        h3 { "{title}" }
                        p { "{body}" }
                    }
                }
            }
        }
    }
}
