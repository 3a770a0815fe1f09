use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;
use vaultline_api::config::{LogFormat, ServerConfig};
use vaultline_api::state::AppState;
use vaultline_core::credential::{CREDENTIAL_VAR, CredentialSource, EnvCredential};
use vaultline_openai::client::OpenAiClient;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    // Local overrides first; dotenv never replaces variables already set.
    dotenv::from_filename(".env.local").ok();
    dotenv::dotenv().ok();

    let config = ServerConfig::from_env()?;
    init_tracing(config.log_format);

    let credentials = EnvCredential::default();
    if !credentials.is_configured() {
        tracing::warn!(
            var = CREDENTIAL_VAR,
            "completion credential not set; chat requests will be rejected"
        );
    }

    let client = OpenAiClient::new(config.openai.clone())?;
    tracing::info!(
        model = client.model(),
        base_url = %config.openai.base_url,
        "completion client ready"
    );

    let state = AppState::new(client, credentials, config.environment.clone());
    let app = vaultline_api::router(state);

    let listener = TcpListener::bind((config.host.as_str(), config.port)).await?;
    tracing::info!(addr = %listener.local_addr()?, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match format {
        LogFormat::Json => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init(),
        LogFormat::Pretty => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("received Ctrl+C, shutting down");
}
