//! vaultline-client
//!
//! Consumer side of the chat endpoint: keeps a conversation, submits it,
//! and decodes the streamed reply fragment by fragment.

pub mod error;
pub mod session;
