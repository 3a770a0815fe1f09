use thiserror::Error;

#[derive(Debug, Error)]
pub enum CompletionError {
    /// The completion service answered with a non-success status. The
    /// rendered message always carries the numeric status code.
    #[error("completion service returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("request to completion service failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("could not decode completion response: {0}")]
    Decode(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
