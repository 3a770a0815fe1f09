//! Access to the completion-service credential.
//!
//! The credential is read at request time through a [`CredentialSource`]
//! rather than a process-wide singleton, so tests can substitute a value
//! without touching the process environment.

use std::fmt::Debug;

/// Environment variable holding the completion-service credential.
pub const CREDENTIAL_VAR: &str = "OPENAI_API_KEY";

pub trait CredentialSource: Debug + Send + Sync {
    /// Current credential, or `None` when unset or blank.
    fn credential(&self) -> Option<String>;

    fn is_configured(&self) -> bool {
        self.credential().is_some()
    }
}

/// Reads the credential from an environment variable on every call.
#[derive(Debug, Clone)]
pub struct EnvCredential {
    var: String,
}

impl EnvCredential {
    pub fn new(var: impl Into<String>) -> Self {
        Self { var: var.into() }
    }
}

impl Default for EnvCredential {
    fn default() -> Self {
        Self::new(CREDENTIAL_VAR)
    }
}

impl CredentialSource for EnvCredential {
    fn credential(&self) -> Option<String> {
        std::env::var(&self.var)
            .ok()
            .filter(|value| !value.trim().is_empty())
    }
}

/// A fixed credential.
#[derive(Clone)]
pub struct StaticCredential(Option<String>);

impl StaticCredential {
    pub fn new(credential: impl Into<String>) -> Self {
        Self(Some(credential.into()))
    }

    pub fn missing() -> Self {
        Self(None)
    }
}

impl Debug for StaticCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let shown = self.0.as_deref().map(mask_credential);
        f.debug_tuple("StaticCredential").field(&shown).finish()
    }
}

impl CredentialSource for StaticCredential {
    fn credential(&self) -> Option<String> {
        self.0.clone().filter(|value| !value.trim().is_empty())
    }
}

/// Render a credential for logs: the first 7 and last 4 characters.
///
/// Values too short to keep a hidden middle are fully masked.
pub fn mask_credential(credential: &str) -> String {
    let chars: Vec<char> = credential.chars().collect();
    if chars.len() <= 16 {
        return "***".to_string();
    }
    let head: String = chars[..7].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}...{tail}")
}
