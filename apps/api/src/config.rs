use anyhow::{Context, Result};

use crate::generation::prompts::ContentStyle;

const DEFAULT_MODEL: &str = "llama3";

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub ollama_url: String,
    pub ollama_model: String,
    /// Delivery is skipped entirely when no webhook is configured.
    pub discord_webhook_url: Option<String>,
    pub generation_temperature: f32,
    pub article_limit: i64,
    pub content_style: ContentStyle,
    pub brand_name: String,
    pub enrich_article_content: bool,
    pub enrich_max_chars: usize,
    /// Per-page fetch timeout for enrichment, in seconds.
    pub enrich_timeout_secs: u64,
    pub output_dir: String,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let ollama_model = optional_env("OLLAMA_MODEL")
            .or_else(|| optional_env("LLM_MODEL"))
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            ollama_url: require_env("OLLAMA_URL")?,
            ollama_model,
            discord_webhook_url: optional_env("DISCORD_WEBHOOK_URL"),
            generation_temperature: parse_env("GENERATION_TEMPERATURE", 0.7)?,
            article_limit: parse_env("ARTICLE_LIMIT", 10)?,
            content_style: match optional_env("CONTENT_STYLE") {
                Some(raw) => raw
                    .parse::<ContentStyle>()
                    .map_err(anyhow::Error::msg)
                    .context("CONTENT_STYLE must be one of: savage, professional, educational")?,
                None => ContentStyle::default(),
            },
            brand_name: optional_env("BRAND_NAME").unwrap_or_else(|| "pwnspectrum".to_string()),
            enrich_article_content: parse_env("ENRICH_ARTICLE_CONTENT", false)?,
            enrich_max_chars: parse_env("ENRICH_MAX_CHARS", 4000)?,
            enrich_timeout_secs: parse_env("ENRICH_TIMEOUT_SECS", 15)?,
            output_dir: optional_env("OUTPUT_DIR").unwrap_or_else(|| "output".to_string()),
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

/// Returns the variable when set to a non-blank value.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional_env(key) {
        Some(raw) => raw
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has an invalid value: {raw}")),
        None => Ok(default),
    }
}
