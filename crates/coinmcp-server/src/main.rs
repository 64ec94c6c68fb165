mod configuration;
mod error;
mod routes;
mod state;

use anyhow::Context;
use coinmcp::{
    auth::ApiKeyAuth,
    coingecko::CoinGeckoClient,
    extract::{llm::LlmExtractor, Extractor},
    providers::factory,
    router::ToolRouter,
    store::InMemoryStore,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let settings = configuration::Settings::new()?;
    if settings.uses_default_api_key() {
        warn!(
            "Using the default API key; set {} before exposing this server",
            error::to_env_var("auth.api_key")
        );
    }

    let addr = settings
        .server
        .socket_addr()
        .context("Invalid server host/port")?;

    let auth = ApiKeyAuth::new(settings.auth.api_key);
    info!("API key authentication enabled: {}", auth.masked_key());

    let market = CoinGeckoClient::new(settings.coingecko.into_config())?;
    let provider = factory::get_provider(settings.provider.into_config()?)?;

    let state = state::AppState::new(
        auth,
        ToolRouter::new(Arc::new(market)),
        Extractor::new(LlmExtractor::new(provider)),
        Arc::new(InMemoryStore::new()),
    );

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = routes::configure(state).layer(cors);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Starting MCP server on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}
