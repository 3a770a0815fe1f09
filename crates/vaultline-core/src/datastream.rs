//! The line-oriented data-stream format used for streamed chat replies.
//!
//! Every line is `<code>:<json>\n`. Text deltas are `0:` parts carrying a
//! JSON string; concatenating their payloads in order yields the complete
//! reply. The chat widget's streaming hook speaks this format natively.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::CoreError;
use crate::models::usage::TokenUsage;

/// Response header announcing the data-stream protocol.
pub const PROTOCOL_HEADER: &str = "x-vercel-ai-data-stream";
pub const PROTOCOL_VERSION: &str = "v1";
pub const CONTENT_TYPE: &str = "text/plain; charset=utf-8";

#[derive(Debug, Clone, PartialEq)]
pub enum DataStreamPart {
    /// `f:` opens an assistant message.
    StartStep { message_id: String },
    /// `0:` one text fragment.
    Text(String),
    /// `3:` in-band error after the stream has started.
    Error(String),
    /// `e:` closes a generation step.
    FinishStep {
        finish_reason: String,
        usage: Option<TokenUsage>,
        is_continued: bool,
    },
    /// `d:` closes the whole message.
    FinishMessage {
        finish_reason: String,
        usage: Option<TokenUsage>,
    },
    /// A part code this crate does not interpret.
    Unknown { code: String, payload: Value },
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StartPayload {
    message_id: String,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FinishPayload {
    finish_reason: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    usage: Option<TokenUsage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    is_continued: Option<bool>,
}

impl DataStreamPart {
    /// A start part with a freshly generated message id.
    pub fn start() -> Self {
        DataStreamPart::StartStep {
            message_id: format!("msg-{}", uuid::Uuid::new_v4().simple()),
        }
    }

    pub fn code(&self) -> &str {
        match self {
            DataStreamPart::StartStep { .. } => "f",
            DataStreamPart::Text(_) => "0",
            DataStreamPart::Error(_) => "3",
            DataStreamPart::FinishStep { .. } => "e",
            DataStreamPart::FinishMessage { .. } => "d",
            DataStreamPart::Unknown { code, .. } => code.as_str(),
        }
    }

    /// Render as one newline-terminated line.
    pub fn encode(&self) -> Result<String, CoreError> {
        let payload = match self {
            DataStreamPart::StartStep { message_id } => serde_json::to_string(&StartPayload {
                message_id: message_id.clone(),
            })?,
            DataStreamPart::Text(text) | DataStreamPart::Error(text) => {
                serde_json::to_string(text)?
            }
            DataStreamPart::FinishStep {
                finish_reason,
                usage,
                is_continued,
            } => serde_json::to_string(&FinishPayload {
                finish_reason: finish_reason.clone(),
                usage: *usage,
                is_continued: Some(*is_continued),
            })?,
            DataStreamPart::FinishMessage {
                finish_reason,
                usage,
            } => serde_json::to_string(&FinishPayload {
                finish_reason: finish_reason.clone(),
                usage: *usage,
                is_continued: None,
            })?,
            DataStreamPart::Unknown { payload, .. } => serde_json::to_string(payload)?,
        };
        Ok(format!("{}:{payload}\n", self.code()))
    }

    /// Parse one line, with or without its trailing newline.
    pub fn decode(line: &str) -> Result<Self, CoreError> {
        let line = line.trim_end_matches(['\r', '\n']);
        let (code, payload) = line.split_once(':').ok_or_else(|| {
            CoreError::MalformedStream(format!("line without code: {line}"))
        })?;

        let part = match code {
            "f" => {
                let start: StartPayload = serde_json::from_str(payload)?;
                DataStreamPart::StartStep {
                    message_id: start.message_id,
                }
            }
            "0" => DataStreamPart::Text(serde_json::from_str(payload)?),
            "3" => DataStreamPart::Error(serde_json::from_str(payload)?),
            "e" => {
                let finish: FinishPayload = serde_json::from_str(payload)?;
                DataStreamPart::FinishStep {
                    finish_reason: finish.finish_reason,
                    usage: finish.usage,
                    is_continued: finish.is_continued.unwrap_or(false),
                }
            }
            "d" => {
                let finish: FinishPayload = serde_json::from_str(payload)?;
                DataStreamPart::FinishMessage {
                    finish_reason: finish.finish_reason,
                    usage: finish.usage,
                }
            }
            other => DataStreamPart::Unknown {
                code: other.to_string(),
                payload: serde_json::from_str(payload)?,
            },
        };
        Ok(part)
    }
}

/// Incremental decoder for a chunked data-stream body.
///
/// Chunks may split lines (and multi-byte characters) anywhere; only
/// complete lines are decoded.
#[derive(Debug, Default)]
pub struct DataStreamDecoder {
    buf: Vec<u8>,
}

impl DataStreamDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, chunk: &[u8]) -> Result<Vec<DataStreamPart>, CoreError> {
        self.buf.extend_from_slice(chunk);

        let mut parts = Vec::new();
        while let Some(pos) = self.buf.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.buf.drain(..=pos).collect();
            if let Some(part) = decode_line(&line)? {
                parts.push(part);
            }
        }
        Ok(parts)
    }

    /// Decode whatever remains once the body has ended.
    pub fn finish(mut self) -> Result<Option<DataStreamPart>, CoreError> {
        let rest = std::mem::take(&mut self.buf);
        decode_line(&rest)
    }
}

fn decode_line(line: &[u8]) -> Result<Option<DataStreamPart>, CoreError> {
    let text = std::str::from_utf8(line).map_err(|e| {
        CoreError::MalformedStream(format!("invalid UTF-8: {e}"))
    })?;
    if text.trim().is_empty() {
        return Ok(None);
    }
    DataStreamPart::decode(text).map(Some)
}
