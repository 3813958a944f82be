mod articles;
mod config;
mod db;
mod delivery;
mod errors;
mod generation;
mod llm_client;
mod models;
mod render;
mod routes;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use std::sync::Arc;

use crate::articles::fetcher::PgArticleSource;
use crate::config::Config;
use crate::db::create_pool;
use crate::delivery::discord::DiscordWebhook;
use crate::llm_client::OllamaClient;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Sarjan v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url).await?;
    let articles = Arc::new(PgArticleSource::new(db));

    // Initialize LLM client
    let llm = Arc::new(OllamaClient::new(&config.ollama_url));
    info!(
        "LLM client initialized (endpoint: {}, model: {})",
        llm.endpoint(),
        config.ollama_model
    );

    // Outbound HTTP for enrichment and delivery
    let http = reqwest::Client::new();
    let webhook = config
        .discord_webhook_url
        .as_deref()
        .map(|url| DiscordWebhook::new(http.clone(), url));
    if webhook.is_none() {
        info!("DISCORD_WEBHOOK_URL not set; reports will only be written to {}", config.output_dir);
    }

    // Build app state
    let state = AppState {
        articles,
        llm,
        http,
        webhook,
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
