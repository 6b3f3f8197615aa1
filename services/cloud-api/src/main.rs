use anyhow::Context;
use cloud_api::{create_router, AppState, CloudApiConfig};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    // Initialize tracing
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    tracing::info!("Starting Cloud API service");

    let config = CloudApiConfig::load().context("failed to load cloud-api configuration")?;
    if config.security.hmac.secrets.shared_secret.trim().is_empty()
        && config.security.hmac.secrets.source_secrets.is_empty()
    {
        tracing::warn!("No HMAC secrets configured; every snapshot submission will be rejected");
    }

    // Initialize application state
    let state = AppState::from_config(&config)
        .await
        .context("failed to open snapshot history")?;

    // Create router
    let app = create_router(state);

    // Bind and serve
    let listener = TcpListener::bind(config.server.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.server.bind))?;

    tracing::info!(
        addr = %config.server.bind,
        persistence = config.persistence.enabled,
        "Listening"
    );
    axum::serve(listener, app).await?;

    Ok(())
}
