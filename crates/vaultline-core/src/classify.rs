//! Classification of errors surfaced by the completion service.
//!
//! The upstream client only hands us error text, so classification is a
//! substring match on the status codes we care about. Text that does not
//! mention one of them falls through to [`UpstreamErrorKind::Other`].

use crate::error::ProxyErrorKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpstreamErrorKind {
    /// "401": the credential was rejected.
    Auth,
    /// "429": quota or rate limit exceeded.
    QuotaExceeded,
    /// "403": the credential cannot use the requested model.
    Forbidden,
    Other,
}

impl UpstreamErrorKind {
    /// Checked in order: 401, then 429, then 403.
    pub fn classify(message: &str) -> Self {
        if message.contains("401") {
            UpstreamErrorKind::Auth
        } else if message.contains("429") {
            UpstreamErrorKind::QuotaExceeded
        } else if message.contains("403") {
            UpstreamErrorKind::Forbidden
        } else {
            UpstreamErrorKind::Other
        }
    }

    pub fn proxy_kind(self) -> ProxyErrorKind {
        match self {
            UpstreamErrorKind::Auth => ProxyErrorKind::UpstreamAuthError,
            UpstreamErrorKind::QuotaExceeded => ProxyErrorKind::UpstreamQuotaExceeded,
            UpstreamErrorKind::Forbidden => ProxyErrorKind::UpstreamForbidden,
            UpstreamErrorKind::Other => ProxyErrorKind::UpstreamOther,
        }
    }

    /// Remediation hint shown to chat users.
    pub fn chat_details(self, raw: &str) -> String {
        match self {
            UpstreamErrorKind::Auth => {
                "Invalid OpenAI API key. Please check your key in the OpenAI dashboard.".to_string()
            }
            UpstreamErrorKind::QuotaExceeded => {
                "OpenAI API quota exceeded. Check your billing and usage.".to_string()
            }
            UpstreamErrorKind::Forbidden => {
                "Access forbidden. Your API key may not have access to this model.".to_string()
            }
            UpstreamErrorKind::Other => raw.to_string(),
        }
    }

    /// Error text reported by the diagnostic probe.
    pub fn diagnostic_error(self, raw: &str) -> String {
        match self {
            UpstreamErrorKind::Auth => "Invalid API key - 401 Unauthorized".to_string(),
            UpstreamErrorKind::QuotaExceeded => {
                "Rate limit exceeded - 429 Too Many Requests".to_string()
            }
            UpstreamErrorKind::Forbidden => "Forbidden - 403".to_string(),
            UpstreamErrorKind::Other => raw.to_string(),
        }
    }
}

/// Shorthand for [`UpstreamErrorKind::classify`].
pub fn classify_upstream_error(message: &str) -> UpstreamErrorKind {
    UpstreamErrorKind::classify(message)
}
