use axum::extract::State;
use axum::extract::rejection::BytesRejection;
use axum::response::Response;
use bytes::Bytes;
use serde_json::Value;
use vaultline_core::models::message::ChatRequest;
use vaultline_openai::request::GenerationRequest;

use crate::error::ApiError;
use crate::state::AppState;
use crate::stream::data_stream_response;

/// Forward one conversation to the completion service and stream the reply.
///
/// The credential and the body are both checked before any outbound call.
/// Once the reply has started streaming, failures are reported in-band.
///
/// A body over the default limit is reported like any other malformed body,
/// after the credential check.
pub async fn chat(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Response, ApiError> {
    let credential = state
        .credentials
        .credential()
        .ok_or(ApiError::MissingConfiguration)?;

    let body = body.map_err(|e| ApiError::InvalidRequest(e.body_text()))?;

    let body: Value = serde_json::from_slice(&body)
        .map_err(|e| ApiError::InvalidRequest(format!("body is not valid JSON: {e}")))?;
    let request = ChatRequest::from_json(&body)?;
    tracing::info!(messages = request.messages.len(), "chat request received");

    let generation = GenerationRequest::chat(request.messages);
    let events = state
        .completions
        .stream_chat(&credential, &generation)
        .await?;

    tracing::debug!("completion stream established");
    Ok(data_stream_response(events))
}
