//! Decoder for the agent's streamed chat response.
//!
//! The body is a sequence of newline-terminated `<code>:<json>` parts. Chunk
//! boundaries from the network are arbitrary, so [`LineDecoder`] buffers raw
//! bytes until a full line is available before anything is parsed.

use serde::Deserialize;

use crate::error::StreamError;

#[derive(Debug, Clone, PartialEq)]
pub enum StreamPart {
    /// `0:` text delta for the assistant message.
    Text(String),
    /// `9:` the model called a tool.
    ToolCall {
        tool_call_id: String,
        tool_name: String,
        args: serde_json::Value,
    },
    /// `a:` a tool finished.
    ToolResult {
        tool_call_id: String,
        result: serde_json::Value,
    },
    /// `3:` the agent reported an error and will stop.
    Error(String),
    /// `f:` a new step started.
    StartStep { message_id: Option<String> },
    /// `e:` a step finished.
    FinishStep { finish_reason: Option<String> },
    /// `d:` the whole message finished.
    FinishMessage { finish_reason: Option<String> },
    /// Any part type this client does not render (data, annotations,
    /// reasoning, partial tool-call deltas...).
    Ignored(char),
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ToolCallPayload {
    tool_call_id: String,
    tool_name: String,
    #[serde(default)]
    args: serde_json::Value,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ToolResultPayload {
    tool_call_id: String,
    #[serde(default)]
    result: serde_json::Value,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct StepPayload {
    #[serde(default)]
    message_id: Option<String>,
    #[serde(default)]
    finish_reason: Option<String>,
}

/// Parse one complete line (without its trailing newline).
pub fn parse_part(line: &str) -> Result<StreamPart, StreamError> {
    let line = line.strip_suffix('\r').unwrap_or(line);
    let mut chars = line.chars();
    let (Some(code), Some(':')) = (chars.next(), chars.next()) else {
        return Err(StreamError::MissingPrefix(line.to_string()));
    };
    let payload = chars.as_str();

    let invalid = |e: serde_json::Error| StreamError::InvalidPayload {
        code,
        message: e.to_string(),
    };

    let part = match code {
        '0' => StreamPart::Text(serde_json::from_str(payload).map_err(invalid)?),
        '3' => StreamPart::Error(serde_json::from_str(payload).map_err(invalid)?),
        '9' => {
            let call: ToolCallPayload = serde_json::from_str(payload).map_err(invalid)?;
            StreamPart::ToolCall {
                tool_call_id: call.tool_call_id,
                tool_name: call.tool_name,
                args: call.args,
            }
        }
        'a' => {
            let result: ToolResultPayload = serde_json::from_str(payload).map_err(invalid)?;
            StreamPart::ToolResult {
                tool_call_id: result.tool_call_id,
                result: result.result,
            }
        }
        'f' => {
            let step: StepPayload = serde_json::from_str(payload).map_err(invalid)?;
            StreamPart::StartStep {
                message_id: step.message_id,
            }
        }
        'e' => {
            let step: StepPayload = serde_json::from_str(payload).map_err(invalid)?;
            StreamPart::FinishStep {
                finish_reason: step.finish_reason,
            }
        }
        'd' => {
            let step: StepPayload = serde_json::from_str(payload).map_err(invalid)?;
            StreamPart::FinishMessage {
                finish_reason: step.finish_reason,
            }
        }
        other => StreamPart::Ignored(other),
    };
    Ok(part)
}

/// Splits a byte stream into lines across chunk boundaries.
#[derive(Debug, Default)]
pub struct LineDecoder {
    buf: Vec<u8>,
}

impl LineDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk and return every line it completed.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.buf.extend_from_slice(chunk);

        let mut lines = Vec::new();
        let mut start = 0;
        while let Some(offset) = self.buf[start..].iter().position(|b| *b == b'\n') {
            let end = start + offset;
            let line = &self.buf[start..end];
            if !line.is_empty() {
                lines.push(String::from_utf8_lossy(line).into_owned());
            }
            start = end + 1;
        }
        self.buf.drain(..start);
        lines
    }

    /// Flush a trailing line that never got its newline.
    pub fn finish(&mut self) -> Option<String> {
        if self.buf.is_empty() {
            return None;
        }
        let line = std::mem::take(&mut self.buf);
        Some(String::from_utf8_lossy(&line).into_owned())
    }
}

/// Bytes in, parts out. Malformed lines are logged and skipped.
#[derive(Debug, Default)]
pub struct PartDecoder {
    lines: LineDecoder,
}

impl PartDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, chunk: &[u8]) -> Vec<StreamPart> {
        self.lines
            .push(chunk)
            .iter()
            .filter_map(|line| parse_logged(line))
            .collect()
    }

    pub fn finish(&mut self) -> Option<StreamPart> {
        self.lines.finish().and_then(|line| parse_logged(&line))
    }
}

fn parse_logged(line: &str) -> Option<StreamPart> {
    match parse_part(line) {
        Ok(part) => Some(part),
        Err(e) => {
            tracing::warn!("skipping stream line: {}", e);
            None
        }
    }
}
