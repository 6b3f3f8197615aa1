use anyhow::Context;
use connector::{create_router, AppState, ConnectorConfig};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    // Initialize tracing
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    tracing::info!("Starting Connector service");

    let config = ConnectorConfig::load().context("failed to load connector configuration")?;
    if config.security.outbound_hmac.shared_secret.trim().is_empty()
        && config.security.outbound_hmac.source_secrets.is_empty()
    {
        tracing::warn!("No outbound HMAC secrets configured; forwarding will fail");
    }

    let state = AppState::from_config(&config).context("failed to build cloud forwarder")?;
    let app = create_router(state);

    let listener = TcpListener::bind(config.connector.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.connector.bind))?;

    tracing::info!(
        addr = %config.connector.bind,
        cloud_api = %config.connector.cloud_api_base_url,
        "Listening"
    );
    axum::serve(listener, app).await?;

    Ok(())
}
