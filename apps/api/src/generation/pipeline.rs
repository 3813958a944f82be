//! Digest pipeline: Fetch → (Enrich) → Score → Generate → Render → Deliver.
//!
//! Stateless per run. Only the generation step degrades; every other failure
//! ends the run and is returned to the caller.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::Local;
use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use tracing::{info, warn};

use crate::articles::enrich::enrich_articles;
use crate::delivery::discord::DEFAULT_CAPTION;
use crate::errors::AppError;
use crate::generation::content::generate_content_ideas;
use crate::generation::prompts::{ContentStyle, ContentTemplate};
use crate::generation::scorer::judge_articles;
use crate::llm_client::GenerationOptions;
use crate::models::article::JudgedArticle;
use crate::models::content::ContentIdeas;
use crate::render::write_report;
use crate::state::AppState;

/// Per-run overrides. Every field falls back to `Config` when absent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DigestRequest {
    pub limit: Option<i64>,
    pub style: Option<ContentStyle>,
    /// Set to `false` to skip the webhook even when one is configured.
    pub deliver: Option<bool>,
    /// Time budget, in seconds, shared by the scoring and generation calls.
    pub deadline_secs: Option<u64>,
}

#[derive(Debug, Serialize)]
pub struct DigestReport {
    /// Articles in scored order, best first.
    pub articles: Vec<JudgedArticle>,
    pub ideas: ContentIdeas,
    /// True when content generation failed and the report was rendered empty.
    pub degraded: bool,
    pub generation_error: Option<String>,
    pub pdf_path: PathBuf,
    pub delivered: bool,
}

/// Runs the whole pipeline once.
pub async fn run_digest(state: &AppState, request: &DigestRequest) -> Result<DigestReport, AppError> {
    let config = &state.config;
    let limit = request.limit.unwrap_or(config.article_limit);
    let deadline = match request.deadline_secs {
        Some(secs) => Some(
            Instant::now()
                .checked_add(Duration::from_secs(secs))
                .ok_or_else(|| {
                    AppError::Validation(format!("deadline_secs {secs} is out of range"))
                })?,
        ),
        None => None,
    };

    // 1. Fetch
    let mut articles = state.articles.fetch_top_ranked(limit).await?;
    if articles.is_empty() {
        return Err(AppError::NotFound(
            "No ranked articles available".to_string(),
        ));
    }

    // 2. Enrich (optional)
    if config.enrich_article_content {
        articles = enrich_articles(
            &state.http,
            articles,
            config.enrich_max_chars,
            Duration::from_secs(config.enrich_timeout_secs),
        )
        .await;
    }

    // 3. Score
    let score_options = GenerationOptions::new(&config.ollama_model).with_deadline(deadline);
    let judged = judge_articles(articles, state.llm.as_ref(), &score_options, &config.brand_name).await?;

    // 4. Generate, degrading to empty ideas on failure
    let template = ContentTemplate {
        style: request.style.unwrap_or(config.content_style),
        brand: config.brand_name.clone(),
    };
    let content_options = score_options.with_temperature(config.generation_temperature);
    let (ideas, generation_error) =
        match generate_content_ideas(&judged, state.llm.as_ref(), &content_options, &template).await {
            Ok(ideas) => (ideas, None),
            Err(e) => {
                warn!("Content generation failed, rendering an empty report: {e}");
                (ContentIdeas::default(), Some(e.to_string()))
            }
        };

    // 5. Render
    let pdf_path = write_report(
        &ideas,
        &config.brand_name,
        Path::new(&config.output_dir),
        &Local::now(),
    )
    .await?;

    // 6. Deliver
    let delivered = match (&state.webhook, request.deliver.unwrap_or(true)) {
        (Some(webhook), true) => {
            webhook.send_report(&pdf_path, DEFAULT_CAPTION).await?;
            true
        }
        (None, true) => {
            info!("No Discord webhook configured; skipping delivery");
            false
        }
        (_, false) => false,
    };

    info!(
        "Digest complete: {} articles, degraded={}, delivered={delivered}",
        judged.len(),
        generation_error.is_some()
    );

    Ok(DigestReport {
        articles: judged,
        ideas,
        degraded: generation_error.is_some(),
        generation_error,
        pdf_path,
        delivered,
    })
}
