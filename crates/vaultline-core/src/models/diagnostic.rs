use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::classify::UpstreamErrorKind;
use crate::credential::CREDENTIAL_VAR;
use crate::models::usage::TokenUsage;

/// Outcome of a single diagnostic probe against the completion service.
///
/// Created fresh for every probe; never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct DiagnosticResult {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub test_response: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub usage: Option<TokenUsage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub error: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub error_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub suggestions: Option<Vec<String>>,
}

impl DiagnosticResult {
    /// The credential is absent. A normal diagnostic answer, not a failure of
    /// the probe itself.
    pub fn missing_credential() -> Self {
        Self {
            success: false,
            error: Some(format!("{CREDENTIAL_VAR} environment variable not found")),
            suggestions: Some(vec![
                "Create a .env.local file in your project root".to_string(),
                format!("Add: {CREDENTIAL_VAR}=your_key_here"),
                "Restart your development server".to_string(),
            ]),
            ..Self::empty()
        }
    }

    pub fn working(test_response: String, usage: Option<TokenUsage>) -> Self {
        Self {
            success: true,
            message: Some("OpenAI API key is working correctly".to_string()),
            test_response: Some(test_response),
            usage,
            ..Self::empty()
        }
    }

    /// The probe call itself failed; `raw` is the upstream error text.
    pub fn probe_failed(raw: &str) -> Self {
        let kind = UpstreamErrorKind::classify(raw);
        Self {
            success: false,
            error: Some(kind.diagnostic_error(raw)),
            error_type: Some(kind.proxy_kind().type_name().to_string()),
            ..Self::empty()
        }
    }

    fn empty() -> Self {
        Self {
            success: false,
            message: None,
            test_response: None,
            usage: None,
            error: None,
            error_type: None,
            suggestions: None,
        }
    }
}
