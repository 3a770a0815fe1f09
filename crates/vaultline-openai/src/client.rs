//! OpenAI chat-completions client.
//!
//! Streams are consumed as server-sent events: each `data:` payload is a
//! JSON chunk, `data: [DONE]` ends the stream. With
//! `stream_options.include_usage` the last chunk before `[DONE]` carries
//! token usage and no choices.

use std::collections::VecDeque;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use futures::stream::{self, BoxStream};
use tracing::{debug, info, warn};
use vaultline_core::models::usage::TokenUsage;

use crate::completion::{CompletionEvent, CompletionService, CompletionStream, Generation};
use crate::error::CompletionError;
use crate::request::GenerationRequest;
use crate::sse::SseParser;
use crate::wire::{
    ChatCompletionChunk, ChatCompletionRequest, ChatCompletionResponse, ErrorEnvelope,
};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

const DONE_SENTINEL: &str = "[DONE]";

#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub base_url: String,
    pub model: String,
    pub connect_timeout: Duration,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            connect_timeout: Duration::from_secs(10),
        }
    }
}

#[derive(Debug, Clone)]
pub struct OpenAiClient {
    http: reqwest::Client,
    config: OpenAiConfig,
}

impl OpenAiClient {
    /// No overall request timeout is set: a streamed reply may legitimately
    /// take longer than any fixed bound. Only connecting is bounded.
    pub fn new(config: OpenAiConfig) -> Result<Self, CompletionError> {
        let http = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .build()?;
        Ok(Self { http, config })
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    fn completions_url(&self) -> String {
        format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        )
    }

    async fn send(
        &self,
        credential: &str,
        request: &GenerationRequest,
        stream: bool,
    ) -> Result<reqwest::Response, CompletionError> {
        let body = ChatCompletionRequest::new(&self.config.model, request, stream);

        let response = self
            .http
            .post(self.completions_url())
            .bearer_auth(credential)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        let message = match serde_json::from_str::<ErrorEnvelope>(&text) {
            Ok(envelope) => envelope.error.message,
            Err(_) if text.is_empty() => status.canonical_reason().unwrap_or("").to_string(),
            Err(_) => text,
        };
        warn!(status = status.as_u16(), %message, "completion service rejected request");

        Err(CompletionError::Status {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl CompletionService for OpenAiClient {
    async fn stream_chat(
        &self,
        credential: &str,
        request: &GenerationRequest,
    ) -> Result<CompletionStream, CompletionError> {
        info!(
            model = %self.config.model,
            messages = request.messages.len(),
            "opening completion stream"
        );

        let response = self.send(credential, request, true).await?;
        Ok(event_stream(response.bytes_stream().boxed()))
    }

    async fn generate(
        &self,
        credential: &str,
        request: &GenerationRequest,
    ) -> Result<Generation, CompletionError> {
        debug!(model = %self.config.model, "requesting completion");

        let response = self.send(credential, request, false).await?;
        let bytes = response.bytes().await?;
        let parsed: ChatCompletionResponse = serde_json::from_slice(&bytes)?;

        let choice = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| CompletionError::Decode("response has no choices".to_string()))?;

        Ok(Generation {
            text: choice.message.content.unwrap_or_default(),
            finish_reason: choice.finish_reason,
            usage: parsed.usage.map(TokenUsage::from),
        })
    }
}

struct StreamState {
    body: BoxStream<'static, reqwest::Result<Bytes>>,
    parser: SseParser,
    pending: VecDeque<Result<CompletionEvent, CompletionError>>,
    finish_reason: Option<String>,
    usage: Option<TokenUsage>,
    done: bool,
}

impl StreamState {
    /// Turn one SSE data payload into zero or more queued events.
    fn ingest(&mut self, data: &str) {
        if self.done {
            return;
        }
        if data.trim() == DONE_SENTINEL {
            self.finish();
            return;
        }

        let chunk: ChatCompletionChunk = match serde_json::from_str(data) {
            Ok(chunk) => chunk,
            Err(e) => {
                self.fail(CompletionError::Decode(format!("invalid stream chunk: {e}")));
                return;
            }
        };

        for choice in chunk.choices {
            if let Some(content) = choice.delta.content.filter(|c| !c.is_empty()) {
                self.pending.push_back(Ok(CompletionEvent::TextDelta(content)));
            }
            if let Some(reason) = choice.finish_reason {
                self.finish_reason = Some(reason);
            }
        }
        if let Some(usage) = chunk.usage {
            self.usage = Some(usage.into());
        }
    }

    fn finish(&mut self) {
        self.pending.push_back(Ok(CompletionEvent::Finish {
            finish_reason: self
                .finish_reason
                .take()
                .unwrap_or_else(|| "unknown".to_string()),
            usage: self.usage.take(),
        }));
        self.done = true;
    }

    fn fail(&mut self, error: CompletionError) {
        self.pending.push_back(Err(error));
        self.done = true;
    }
}

/// Adapt a raw SSE body into ordered completion events.
///
/// Events are yielded as soon as their SSE frame is complete; nothing is
/// held back waiting for the rest of the answer.
fn event_stream(body: BoxStream<'static, reqwest::Result<Bytes>>) -> CompletionStream {
    let state = StreamState {
        body,
        parser: SseParser::new(),
        pending: VecDeque::new(),
        finish_reason: None,
        usage: None,
        done: false,
    };

    Box::pin(stream::unfold(state, |mut state| async move {
        loop {
            if let Some(event) = state.pending.pop_front() {
                return Some((event, state));
            }
            if state.done {
                return None;
            }

            match state.body.next().await {
                Some(Ok(chunk)) => {
                    for data in state.parser.push(&chunk) {
                        state.ingest(&data);
                    }
                }
                Some(Err(e)) => state.fail(CompletionError::Transport(e)),
                None => {
                    if let Some(data) = state.parser.finish() {
                        state.ingest(&data);
                    }
                    if !state.done {
                        debug!("completion stream ended without [DONE]");
                        state.finish();
                    }
                }
            }
        }
    }))
}
