use async_trait::async_trait;
use futures_util::stream::{self, StreamExt};
use gloo_net::http::{Request, RequestBuilder, Response};
use js_sys::{Reflect, Uint8Array};
use onyx_core::config::ClientConfig;
use onyx_core::session::ByteStream;
use onyx_core::{AgentTransport, ApiError, ChatId, ChatRequest, PromptsLeft, RemoteChat};
use std::sync::OnceLock;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{ReadableStream, ReadableStreamDefaultReader};

/// Build-time settings, e.g. `ONYX_AGENT_URL=https://agent.example dx build`.
fn build_env(key: &str) -> Option<String> {
    let value = match key {
        "ONYX_AGENT_URL" => option_env!("ONYX_AGENT_URL"),
        "ONYX_HISTORY_POLL_SECS" => option_env!("ONYX_HISTORY_POLL_SECS"),
        "ONYX_PROMPT_QUOTA" => option_env!("ONYX_PROMPT_QUOTA"),
        "ONYX_TITLE_DISPLAY_CHARS" => option_env!("ONYX_TITLE_DISPLAY_CHARS"),
        _ => None,
    };
    value.map(str::to_string)
}

/// Where the agent lives when the build did not say.
/// - In development (localhost): http://localhost:8080
/// - In production: same origin
fn fallback_agent_url() -> String {
    let hostname = web_sys::window()
        .and_then(|w| w.location().hostname().ok())
        .unwrap_or_default();
    default_agent_url_for_host(&hostname)
}

fn default_agent_url_for_host(hostname: &str) -> String {
    if hostname == "localhost" || hostname == "127.0.0.1" {
        "http://localhost:8080".to_string()
    } else {
        String::new()
    }
}

fn load_config() -> ClientConfig {
    let mut config = ClientConfig::from_lookup(build_env).unwrap_or_else(|e| {
        dioxus_logger::tracing::error!("Invalid client config, using defaults: {e:#}");
        ClientConfig::default()
    });
    if config.agent_url.is_empty() {
        config.agent_url = fallback_agent_url();
    }
    config
}

static CONFIG: OnceLock<ClientConfig> = OnceLock::new();

/// Client settings, computed at first use.
pub fn client_config() -> &'static ClientConfig {
    CONFIG.get_or_init(load_config)
}

fn authorized(builder: RequestBuilder, token: &str) -> RequestBuilder {
    builder.header("Authorization", &format!("Bearer {token}"))
}

fn check_status(response: Response) -> Result<Response, ApiError> {
    if response.ok() {
        Ok(response)
    } else {
        Err(ApiError::Status(response.status()))
    }
}

pub async fn fetch_chats(token: &str) -> Result<Vec<RemoteChat>, ApiError> {
    let url = client_config().endpoint("/chats");

    let response = authorized(Request::get(&url), token)
        .send()
        .await
        .map_err(|e| ApiError::Request(e.to_string()))?;

    check_status(response)?
        .json()
        .await
        .map_err(|e| ApiError::Decode(e.to_string()))
}

pub async fn delete_chat(token: &str, chat_id: &ChatId) -> Result<(), ApiError> {
    let url = client_config().endpoint(&format!("/chats/{chat_id}"));

    let response = authorized(Request::delete(&url), token)
        .send()
        .await
        .map_err(|e| ApiError::Request(e.to_string()))?;

    check_status(response)?;
    Ok(())
}

pub async fn fetch_prompts_left(token: &str) -> Result<PromptsLeft, ApiError> {
    let url = client_config().endpoint("/prompts-left");

    let response = authorized(Request::get(&url), token)
        .send()
        .await
        .map_err(|e| ApiError::Request(e.to_string()))?;

    check_status(response)?
        .json()
        .await
        .map_err(|e| ApiError::Decode(e.to_string()))
}

/// `POST /chat` over fetch, yielding the response body as it arrives.
pub struct AgentClient {
    token: String,
}

impl AgentClient {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

#[async_trait(?Send)]
impl AgentTransport for AgentClient {
    async fn open_chat_stream(&self, request: &ChatRequest) -> Result<ByteStream, ApiError> {
        let url = client_config().endpoint("/chat");

        let response = authorized(Request::post(&url), &self.token)
            .json(request)
            .map_err(|e| ApiError::Request(e.to_string()))?
            .send()
            .await
            .map_err(|e| ApiError::Request(e.to_string()))?;

        let body = check_status(response)?.body().ok_or(ApiError::MissingBody)?;
        Ok(body_chunks(body))
    }
}

/// Read a fetch body chunk by chunk. The first read error ends the stream.
fn body_chunks(body: ReadableStream) -> ByteStream {
    let reader: ReadableStreamDefaultReader = body.get_reader().unchecked_into();

    stream::unfold(Some(reader), |reader| async move {
        let reader = reader?;
        let chunk = match JsFuture::from(reader.read()).await {
            Ok(chunk) => chunk,
            Err(e) => return Some((Err(ApiError::Stream(js_error_text(&e))), None)),
        };

        let done = Reflect::get(&chunk, &JsValue::from_str("done"))
            .ok()
            .and_then(|v| v.as_bool())
            .unwrap_or(true);
        if done {
            return None;
        }

        let value = Reflect::get(&chunk, &JsValue::from_str("value")).unwrap_or(JsValue::UNDEFINED);
        Some((Ok(Uint8Array::new(&value).to_vec()), Some(reader)))
    })
    .boxed_local()
}

fn js_error_text(error: &JsValue) -> String {
    error
        .as_string()
        .or_else(|| {
            Reflect::get(error, &JsValue::from_str("message"))
                .ok()
                .and_then(|m| m.as_string())
        })
        .unwrap_or_else(|| format!("{error:?}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn localhost_points_at_dev_agent() {
        assert_eq!(default_agent_url_for_host("localhost"), "http://localhost:8080");
        assert_eq!(default_agent_url_for_host("127.0.0.1"), "http://localhost:8080");
    }

    #[test]
    fn deployed_host_uses_same_origin() {
        assert_eq!(default_agent_url_for_host("app.onyx.ai"), "");
    }

    #[test]
    fn unknown_build_keys_are_unset() {
        assert_eq!(build_env("ONYX_SOMETHING_ELSE"), None);
    }
}
