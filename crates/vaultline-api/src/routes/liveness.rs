use axum::Json;
use axum::extract::State;
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
pub struct LivenessResponse {
    pub message: String,
    pub timestamp: jiff::Timestamp,
    pub env: LivenessEnv,
}

/// Configuration facts safe to expose: booleans and names, never values.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LivenessEnv {
    #[serde(rename = "hasOpenAIKey")]
    pub has_openai_key: bool,
    pub node_env: String,
}

/// Verify the API routes are up. Makes no outbound call.
pub async fn api_test(State(state): State<AppState>) -> Json<LivenessResponse> {
    Json(LivenessResponse {
        message: "API routes are working".to_string(),
        timestamp: jiff::Timestamp::now(),
        env: LivenessEnv {
            has_openai_key: state.credentials.is_configured(),
            node_env: state.environment.clone(),
        },
    })
}
