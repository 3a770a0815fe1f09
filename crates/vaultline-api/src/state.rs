use std::sync::Arc;

use vaultline_core::credential::CredentialSource;
use vaultline_openai::completion::CompletionService;

/// Shared application state, injected into all route handlers via Axum state.
///
/// Everything here is read-only; requests share no mutable state.
#[derive(Clone)]
pub struct AppState {
    pub completions: Arc<dyn CompletionService>,
    pub credentials: Arc<dyn CredentialSource>,
    /// Deployment environment name reported by the liveness check.
    pub environment: String,
}

impl AppState {
    pub fn new(
        completions: impl CompletionService + 'static,
        credentials: impl CredentialSource + 'static,
        environment: impl Into<String>,
    ) -> Self {
        Self {
            completions: Arc::new(completions),
            credentials: Arc::new(credentials),
            environment: environment.into(),
        }
    }
}
