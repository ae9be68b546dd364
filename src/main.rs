use anyhow::Context;
use tracing_subscriber::EnvFilter;

use instalar_api::config;
use instalar_api::provider::ProviderConfig;
use instalar_api::routes;
use instalar_api::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up SUPABASE_URL etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "instalar_api=debug,tower_http=info".into()),
        )
        .init();

    let config = config::config();
    tracing::info!("Starting InstaLar API in {:?} mode", config.environment);

    let provider = ProviderConfig::from_env().context("provider configuration")?;
    let state = AppState::from_provider(&provider).context("provider client setup")?;

    let app = routes::app(state);

    let bind_addr = format!("0.0.0.0:{}", config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("InstaLar API listening on http://{}", bind_addr);

    axum::serve(listener, app).await.context("server")?;
    Ok(())
}
