//! Comparative Scorer — one model call scores every candidate article at once.
//!
//! Flow: build_scoring_prompt → TextGenerator::complete → decode_score_map →
//!       merge by positional key → stable sort descending.
//!
//! All-or-nothing: any model or decode failure propagates unchanged.

use tracing::{debug, info};

use crate::errors::AppError;
use crate::generation::prompts::build_scoring_prompt;
use crate::llm_client::repair::{decode_score_map, ScoreMap};
use crate::llm_client::{GenerationOptions, TextGenerator};
use crate::models::article::{Article, JudgedArticle};

/// Scores `articles` relative to each other and returns them best-first.
///
/// Ties keep their fetch order. Articles the model left out score 0.
pub async fn judge_articles(
    articles: Vec<Article>,
    llm: &dyn TextGenerator,
    options: &GenerationOptions,
    brand: &str,
) -> Result<Vec<JudgedArticle>, AppError> {
    if articles.is_empty() {
        return Err(AppError::Validation(
            "At least one article is required for scoring".to_string(),
        ));
    }

    let prompt = build_scoring_prompt(&articles, brand)?;
    info!("Scoring {} articles comparatively", articles.len());

    let completion = llm.complete(&prompt, options).await?;
    let scores = decode_score_map(&completion)?;

    let judged = merge_scores(articles, &scores);
    debug!(
        "Scores after merge: {:?}",
        judged
            .iter()
            .map(|j| (j.article.id, j.score))
            .collect::<Vec<_>>()
    );

    Ok(sort_by_score(judged))
}

/// Positional key the model uses for the article at `index` (0-based).
pub fn article_key(index: usize) -> String {
    format!("Article {}", index + 1)
}

/// Assigns `round(score)` from `"Article {i}"` to the i-th article; missing keys stay 0.
pub fn merge_scores(articles: Vec<Article>, scores: &ScoreMap) -> Vec<JudgedArticle> {
    articles
        .into_iter()
        .enumerate()
        .map(|(idx, article)| {
            let key = article_key(idx);
            let mut judged = JudgedArticle::unscored(article);
            match scores.get(&key) {
                Some(score) => judged.score = score.round() as i32,
                None => debug!("No score for '{key}' (id {}); defaulting to 0", judged.article.id),
            }
            judged
        })
        .collect()
}

/// Stable sort, highest score first.
pub fn sort_by_score(mut judged: Vec<JudgedArticle>) -> Vec<JudgedArticle> {
    judged.sort_by(|a, b| b.score.cmp(&a.score));
    judged
}
