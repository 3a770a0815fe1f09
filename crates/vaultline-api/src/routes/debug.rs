use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use vaultline_core::credential::mask_credential;
use vaultline_core::models::diagnostic::DiagnosticResult;
use vaultline_openai::request::GenerationRequest;

use crate::state::AppState;

/// Probe the completion service with one short, non-streamed request.
///
/// A missing credential is a normal diagnostic answer (200). Only a failed
/// probe call is a 500. No retries.
pub async fn debug_probe(State(state): State<AppState>) -> (StatusCode, Json<DiagnosticResult>) {
    let Some(credential) = state.credentials.credential() else {
        tracing::warn!(credential_present = false, "diagnostic probe skipped");
        return (StatusCode::OK, Json(DiagnosticResult::missing_credential()));
    };

    tracing::info!(
        credential_present = true,
        credential = %mask_credential(&credential),
        "running diagnostic probe"
    );

    match state
        .completions
        .generate(&credential, &GenerationRequest::probe())
        .await
    {
        Ok(generation) => {
            tracing::info!(response = %generation.text, "diagnostic probe succeeded");
            (
                StatusCode::OK,
                Json(DiagnosticResult::working(generation.text, generation.usage)),
            )
        }
        Err(e) => {
            tracing::error!(error = %e, "diagnostic probe failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(DiagnosticResult::probe_failed(&e.to_string())),
            )
        }
    }
}
