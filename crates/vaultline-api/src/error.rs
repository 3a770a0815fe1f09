use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use vaultline_core::classify::UpstreamErrorKind;
use vaultline_core::credential::CREDENTIAL_VAR;
use vaultline_core::error::{CoreError, ProxyErrorKind};
use vaultline_openai::error::CompletionError;

pub const INVALID_MESSAGES: &str = "Invalid messages format";

/// Failures of the chat endpoint that happen before streaming begins.
#[derive(Debug)]
pub enum ApiError {
    /// The completion-service credential is not configured.
    MissingConfiguration,
    /// The body is not JSON, or `messages` is missing or malformed.
    InvalidRequest(String),
    /// The completion service failed to open the stream.
    Upstream(CompletionError),
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    details: String,
    #[serde(rename = "type")]
    kind: ProxyErrorKind,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::MissingConfiguration => {
                tracing::error!("missing {CREDENTIAL_VAR} environment variable");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody {
                        error: "OpenAI API key not configured".to_string(),
                        details: format!("Please add {CREDENTIAL_VAR} to your .env.local file"),
                        kind: ProxyErrorKind::MissingConfiguration,
                    },
                )
            }
            ApiError::InvalidRequest(details) => {
                tracing::warn!(%details, "rejected chat request");
                (
                    StatusCode::BAD_REQUEST,
                    ErrorBody {
                        error: INVALID_MESSAGES.to_string(),
                        details,
                        kind: ProxyErrorKind::InvalidRequestFormat,
                    },
                )
            }
            ApiError::Upstream(e) => {
                let raw = e.to_string();
                let kind = UpstreamErrorKind::classify(&raw);
                tracing::error!(error = %raw, kind = %kind.proxy_kind(), "chat API error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody {
                        error: "Chat API failed".to_string(),
                        details: kind.chat_details(&raw),
                        kind: kind.proxy_kind(),
                    },
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<CoreError> for ApiError {
    fn from(e: CoreError) -> Self {
        ApiError::InvalidRequest(e.to_string())
    }
}

impl From<CompletionError> for ApiError {
    fn from(e: CompletionError) -> Self {
        ApiError::Upstream(e)
    }
}
