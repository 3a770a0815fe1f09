use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use futures::StreamExt;
use futures::future::{AbortHandle, Abortable};
use serde::Deserialize;
use vaultline_core::datastream::{DataStreamDecoder, DataStreamPart};
use vaultline_core::models::message::{ChatRequest, Message};
use vaultline_core::models::usage::TokenUsage;

use crate::error::ClientError;

/// How a submitted turn ended.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    Completed { usage: Option<TokenUsage> },
    /// Consumption was stopped through a [`StopHandle`].
    Stopped,
}

#[derive(Default)]
struct StopState {
    loading: AtomicBool,
    stopped: AtomicBool,
    abort: Mutex<Option<AbortHandle>>,
}

/// Stops consuming the reply currently in flight.
///
/// Cancellation is client-side only: the connection is dropped, no cancel
/// request is sent to the server.
#[derive(Clone, Default)]
pub struct StopHandle {
    state: Arc<StopState>,
}

impl StopHandle {
    pub fn stop(&self) {
        self.state.stopped.store(true, Ordering::SeqCst);
        if let Ok(slot) = self.state.abort.lock()
            && let Some(handle) = slot.as_ref()
        {
            handle.abort();
        }
    }

    pub fn is_loading(&self) -> bool {
        self.state.loading.load(Ordering::SeqCst)
    }

    fn is_stopped(&self) -> bool {
        self.state.stopped.load(Ordering::SeqCst)
    }

    fn begin(&self, handle: AbortHandle) {
        self.state.stopped.store(false, Ordering::SeqCst);
        self.state.loading.store(true, Ordering::SeqCst);
        if let Ok(mut slot) = self.state.abort.lock() {
            *slot = Some(handle);
        }
    }

    fn end(&self) {
        self.state.loading.store(false, Ordering::SeqCst);
        if let Ok(mut slot) = self.state.abort.lock() {
            *slot = None;
        }
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
    #[serde(default)]
    details: Option<String>,
}

/// A conversation with the chat endpoint.
///
/// The message list is append-only. Each turn appends the user message,
/// then the assistant reply (complete, or whatever arrived before a stop or
/// a stream error).
pub struct ChatSession {
    http: reqwest::Client,
    endpoint: String,
    messages: Vec<Message>,
    last_error: Option<String>,
    stop: StopHandle,
}

impl ChatSession {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), endpoint)
    }

    pub fn with_client(http: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            http,
            endpoint: endpoint.into(),
            messages: Vec::new(),
            last_error: None,
            stop: StopHandle::default(),
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn is_loading(&self) -> bool {
        self.stop.is_loading()
    }

    /// Text of the last failure, as it would be shown inline.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    /// Send `content` as the next user turn and stream the reply.
    ///
    /// `on_delta` is called with every fragment as it arrives.
    pub async fn submit(
        &mut self,
        content: &str,
        mut on_delta: impl FnMut(&str),
    ) -> Result<SubmitOutcome, ClientError> {
        let content = content.trim();
        if content.is_empty() {
            return Err(ClientError::EmptyMessage);
        }

        self.messages.push(Message::user(content));
        self.last_error = None;

        let (handle, registration) = AbortHandle::new_pair();
        self.stop.begin(handle);

        let mut reply = String::new();
        let result = Abortable::new(self.consume(&mut reply, &mut on_delta), registration).await;
        self.stop.end();

        if !reply.is_empty() {
            self.messages.push(Message::assistant(reply));
        }

        match result {
            Err(_aborted) => {
                tracing::debug!("reply stream stopped by caller");
                Ok(SubmitOutcome::Stopped)
            }
            Ok(Ok(_)) if self.stop.is_stopped() => Ok(SubmitOutcome::Stopped),
            Ok(Ok(usage)) => Ok(SubmitOutcome::Completed { usage }),
            Ok(Err(e)) => {
                self.last_error = Some(match &e {
                    ClientError::Api {
                        error,
                        details: Some(details),
                        ..
                    } => format!("{error}: {details}"),
                    other => other.to_string(),
                });
                Err(e)
            }
        }
    }

    async fn consume(
        &self,
        reply: &mut String,
        on_delta: &mut impl FnMut(&str),
    ) -> Result<Option<TokenUsage>, ClientError> {
        let request = ChatRequest {
            messages: self.messages.clone(),
        };
        let response = self.http.post(&self.endpoint).json(&request).send().await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let (error, details) = match serde_json::from_str::<ErrorBody>(&text) {
                Ok(body) => (body.error, body.details),
                Err(_) => (format!("chat endpoint returned {status}"), None),
            };
            return Err(ClientError::Api {
                status: status.as_u16(),
                error,
                details,
            });
        }

        let mut usage = None;
        let mut decoder = DataStreamDecoder::new();
        let mut body = response.bytes_stream();

        while let Some(chunk) = body.next().await {
            for part in decoder.push(&chunk?)? {
                apply(part, reply, on_delta, &mut usage)?;
                if self.stop.is_stopped() {
                    return Ok(usage);
                }
            }
        }
        if let Some(part) = decoder.finish()? {
            apply(part, reply, on_delta, &mut usage)?;
        }

        Ok(usage)
    }
}

fn apply(
    part: DataStreamPart,
    reply: &mut String,
    on_delta: &mut impl FnMut(&str),
    usage: &mut Option<TokenUsage>,
) -> Result<(), ClientError> {
    match part {
        DataStreamPart::Text(text) => {
            on_delta(&text);
            reply.push_str(&text);
        }
        DataStreamPart::Error(message) => return Err(ClientError::Stream(message)),
        DataStreamPart::FinishMessage { usage: u, .. } => *usage = u,
        _ => {}
    }
    Ok(())
}
