use std::time::Duration;

use eyre::WrapErr;
use vaultline_openai::client::{DEFAULT_BASE_URL, DEFAULT_MODEL, OpenAiConfig};

/// Output format of the tracing subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
}

/// Process configuration, read once at startup.
///
/// The completion-service credential is not part of it; it is read per
/// request through a `CredentialSource`.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub openai: OpenAiConfig,
    pub environment: String,
    pub log_format: LogFormat,
}

impl ServerConfig {
    pub fn from_env() -> eyre::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> eyre::Result<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port = match get("PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .wrap_err_with(|| format!("PORT must be a port number, got {raw:?}"))?,
            None => 3000,
        };

        let connect_timeout = match get("OPENAI_CONNECT_TIMEOUT_SECS") {
            Some(raw) => Duration::from_secs(raw.parse::<u64>().wrap_err_with(|| {
                format!("OPENAI_CONNECT_TIMEOUT_SECS must be whole seconds, got {raw:?}")
            })?),
            None => Duration::from_secs(10),
        };

        let log_format = match get("LOG_FORMAT").as_deref() {
            None | Some("json") => LogFormat::Json,
            Some("pretty") => LogFormat::Pretty,
            Some(other) => eyre::bail!("LOG_FORMAT must be `json` or `pretty`, got {other:?}"),
        };

        Ok(Self {
            host: get("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port,
            openai: OpenAiConfig {
                base_url: get("OPENAI_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
                model: get("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
                connect_timeout,
            },
            environment: get("APP_ENV")
                .or_else(|| get("NODE_ENV"))
                .unwrap_or_else(|| "development".to_string()),
            log_format,
        })
    }
}
