use thiserror::Error;
use vaultline_core::error::CoreError;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("message is empty")]
    EmptyMessage,

    #[error("request to chat endpoint failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The endpoint refused the request before streaming.
    #[error("{error}")]
    Api {
        status: u16,
        error: String,
        details: Option<String>,
    },

    /// The endpoint reported a failure inside the stream.
    #[error("{0}")]
    Stream(String),

    #[error("could not decode reply stream: {0}")]
    Decode(#[from] CoreError),
}
