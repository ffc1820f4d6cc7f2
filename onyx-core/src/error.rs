use thiserror::Error;

/// Failures talking to the agent service.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Request(String),

    #[error("HTTP error: {0}")]
    Status(u16),

    #[error("failed to parse JSON: {0}")]
    Decode(String),

    #[error("response has no body to stream")]
    MissingBody,

    #[error("stream interrupted: {0}")]
    Stream(String),
}

#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("a response is already streaming for this chat")]
    Busy,

    #[error("message is empty")]
    EmptyInput,
}

/// A single malformed line in the agent's response stream.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StreamError {
    #[error("stream line has no type prefix: {0:?}")]
    MissingPrefix(String),

    #[error("invalid payload for stream part {code}: {message}")]
    InvalidPayload { code: char, message: String },
}
