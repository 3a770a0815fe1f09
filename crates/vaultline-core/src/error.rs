use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid messages format: {0}")]
    InvalidRequestFormat(String),

    #[error("malformed data stream: {0}")]
    MalformedStream(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Every failure the proxy can report to a caller.
///
/// The serialized form is the `type` field of error bodies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ProxyErrorKind {
    MissingConfiguration,
    InvalidRequestFormat,
    UpstreamAuthError,
    UpstreamQuotaExceeded,
    UpstreamForbidden,
    UpstreamOther,
    MidStreamFailure,
}

impl ProxyErrorKind {
    pub fn type_name(self) -> &'static str {
        match self {
            ProxyErrorKind::MissingConfiguration => "MissingConfiguration",
            ProxyErrorKind::InvalidRequestFormat => "InvalidRequestFormat",
            ProxyErrorKind::UpstreamAuthError => "UpstreamAuthError",
            ProxyErrorKind::UpstreamQuotaExceeded => "UpstreamQuotaExceeded",
            ProxyErrorKind::UpstreamForbidden => "UpstreamForbidden",
            ProxyErrorKind::UpstreamOther => "UpstreamOther",
            ProxyErrorKind::MidStreamFailure => "MidStreamFailure",
        }
    }
}

impl std::fmt::Display for ProxyErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.type_name())
    }
}
