use std::sync::Arc;

use crate::articles::fetcher::ArticleSource;
use crate::config::Config;
use crate::delivery::discord::DiscordWebhook;
use crate::llm_client::TextGenerator;

/// Shared application state injected into all route handlers via Axum extractors.
/// Holds only read-only handles; each request runs the digest pipeline independently.
#[derive(Clone)]
pub struct AppState {
    /// Article source. Default: `PgArticleSource` over the shared `PgPool`.
    pub articles: Arc<dyn ArticleSource>,
    /// Text generation backend. Default: `OllamaClient`.
    pub llm: Arc<dyn TextGenerator>,
    /// Plain HTTP client for article enrichment.
    pub http: reqwest::Client,
    /// `None` when `DISCORD_WEBHOOK_URL` is unset.
    pub webhook: Option<DiscordWebhook>,
    pub config: Config,
}
