//! Bridge to the external login provider.
//!
//! The host page mounts the provider SDK and exposes a small facade on
//! `window.onyxIdentity`:
//!
//! ```text
//! { ready: bool, authenticated: bool, user: {id, linkedAccounts} | null,
//!   getAccessToken(): Promise<string | null>,
//!   delegateWallet({address, chainType}): Promise<void>, login(), logout() }
//! ```
//!
//! Rust only reads JSON snapshots and awaits the token promise. If the
//! facade is missing the client stays in `Loading`.

use onyx_core::auth::{AuthState, IdentityUser, WalletDelegation};
use serde::Deserialize;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;

#[derive(Debug, Default, Deserialize)]
struct ProviderSnapshot {
    #[serde(default)]
    ready: bool,
    #[serde(default)]
    authenticated: bool,
    #[serde(default)]
    user: Option<IdentityUser>,
}

pub fn parse_snapshot(json: &str) -> AuthState {
    match serde_json::from_str::<ProviderSnapshot>(json) {
        Ok(snapshot) => {
            AuthState::from_provider(snapshot.ready, snapshot.authenticated, snapshot.user)
        }
        Err(e) => {
            log::error!("Unreadable identity snapshot: {e}");
            AuthState::Loading
        }
    }
}

/// Current provider state.
pub fn snapshot() -> AuthState {
    let js = r#"(function() {
        const p = window.onyxIdentity;
        if (!p) { return null; }
        return JSON.stringify({
            ready: !!p.ready,
            authenticated: !!p.authenticated,
            user: p.user || null
        });
    })()"#;

    match js_sys::eval(js) {
        Ok(value) => match value.as_string() {
            Some(json) => parse_snapshot(&json),
            None => AuthState::Loading,
        },
        Err(e) => {
            log::error!("Identity snapshot failed: {e:?}");
            AuthState::Loading
        }
    }
}

/// Bearer token for the agent service.
pub async fn access_token() -> Result<String, String> {
    let js = r#"(async function() {
        const p = window.onyxIdentity;
        if (!p || !p.getAccessToken) { return null; }
        return await p.getAccessToken();
    })()"#;

    let promise = js_sys::eval(js).map_err(|e| format!("{e:?}"))?;
    let promise: js_sys::Promise = promise.dyn_into().map_err(|e| format!("{e:?}"))?;
    let token = JsFuture::from(promise).await.map_err(|e| {
        js_sys::Reflect::get(&e, &JsValue::from_str("message"))
            .ok()
            .and_then(|m| m.as_string())
            .unwrap_or_else(|| format!("{e:?}"))
    })?;

    token
        .as_string()
        .filter(|t| !t.is_empty())
        .ok_or_else(|| "provider returned no access token".to_string())
}

fn delegate_script(delegation: &WalletDelegation) -> Result<String, String> {
    let args = serde_json::to_string(delegation).map_err(|e| e.to_string())?;
    Ok(format!(
        r#"(async function() {{
            const p = window.onyxIdentity;
            if (!p || !p.delegateWallet) {{ return; }}
            await p.delegateWallet({args});
        }})()"#
    ))
}

/// Let the agent sign with the user's embedded wallet.
pub async fn delegate_wallet(delegation: &WalletDelegation) -> Result<(), String> {
    let js = delegate_script(delegation)?;
    let promise = js_sys::eval(&js).map_err(|e| format!("{e:?}"))?;
    let promise: js_sys::Promise = promise.dyn_into().map_err(|e| format!("{e:?}"))?;
    JsFuture::from(promise).await.map_err(|e| {
        js_sys::Reflect::get(&e, &JsValue::from_str("message"))
            .ok()
            .and_then(|m| m.as_string())
            .unwrap_or_else(|| format!("{e:?}"))
    })?;
    Ok(())
}

pub fn login() {
    call_facade("login");
}

pub fn logout() {
    call_facade("logout");
}

fn call_facade(method: &str) {
    let js = format!(
        "(function() {{ const p = window.onyxIdentity; if (p && p.{method}) {{ p.{method}(); }} }})()"
    );
    if let Err(e) = js_sys::eval(&js) {
        log::error!("Identity {method} failed: {e:?}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn authenticated_snapshot() {
        let state = parse_snapshot(
            r#"{"ready":true,"authenticated":true,"user":{"id":"did:privy:abc","linkedAccounts":[{"type":"email","address":"me@onyx.ai"}]}}"#,
        );
        assert_eq!(state.user_id(), Some("did:privy:abc"));
        assert_eq!(
            state.user().and_then(|u| u.email()),
            Some("me@onyx.ai")
        );
    }

    #[test]
    fn logged_out_snapshot() {
        assert_eq!(
            parse_snapshot(r#"{"ready":true,"authenticated":false,"user":null}"#),
            AuthState::Unauthenticated
        );
    }

    #[test]
    fn delegation_arguments_are_json_quoted() {
        let delegation = WalletDelegation {
            address: "0xabc\"); alert(1); (\"".to_string(),
            chain_type: "ethereum".to_string(),
        };
        let js = delegate_script(&delegation).unwrap();
        assert!(js.contains(r#"p.delegateWallet({"address":"0xabc\"); alert(1); (\"","chainType":"ethereum"})"#));
    }

    #[test]
    fn garbage_is_loading() {
        assert_eq!(parse_snapshot("not json"), AuthState::Loading);
        assert_eq!(parse_snapshot("{}"), AuthState::Loading);
    }
}
