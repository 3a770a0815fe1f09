//! vaultline-openai
//!
//! The completion-service seam: the [`completion::CompletionService`] trait
//! the proxy is written against, and its OpenAI chat-completions
//! implementation.

pub mod client;
pub mod completion;
pub mod error;
pub mod request;
pub mod sse;
mod wire;
