use std::pin::Pin;

use async_trait::async_trait;
use futures::{Stream, StreamExt};
use vaultline_core::models::usage::TokenUsage;

use crate::error::CompletionError;
use crate::request::GenerationRequest;

/// One item of a streamed generation, in upstream order.
#[derive(Debug, Clone, PartialEq)]
pub enum CompletionEvent {
    TextDelta(String),
    Finish {
        finish_reason: String,
        usage: Option<TokenUsage>,
    },
}

pub type CompletionStream =
    Pin<Box<dyn Stream<Item = Result<CompletionEvent, CompletionError>> + Send>>;

/// A complete, non-streamed generation.
#[derive(Debug, Clone, PartialEq)]
pub struct Generation {
    pub text: String,
    pub finish_reason: Option<String>,
    pub usage: Option<TokenUsage>,
}

/// The external completion service.
///
/// The credential is passed per call; implementations never read it from
/// the environment themselves.
#[async_trait]
pub trait CompletionService: Send + Sync {
    /// Open a streamed generation.
    ///
    /// Resolves once the upstream stream is established. A failure to
    /// establish it (including a non-success upstream status) is an `Err`
    /// here, before any event is produced.
    async fn stream_chat(
        &self,
        credential: &str,
        request: &GenerationRequest,
    ) -> Result<CompletionStream, CompletionError>;

    /// Run a generation to completion without streaming.
    async fn generate(
        &self,
        credential: &str,
        request: &GenerationRequest,
    ) -> Result<Generation, CompletionError>;
}

/// Drain a stream into the generation it describes.
pub async fn collect_stream(mut stream: CompletionStream) -> Result<Generation, CompletionError> {
    let mut generation = Generation {
        text: String::new(),
        finish_reason: None,
        usage: None,
    };

    while let Some(event) = stream.next().await {
        match event? {
            CompletionEvent::TextDelta(delta) => generation.text.push_str(&delta),
            CompletionEvent::Finish {
                finish_reason,
                usage,
            } => {
                generation.finish_reason = Some(finish_reason);
                generation.usage = usage;
            }
        }
    }

    Ok(generation)
}
