//! Content Generator — turns the scored articles into per-platform content ideas.

use tracing::{info, warn};

use crate::errors::AppError;
use crate::generation::prompts::{build_content_prompt, ContentTemplate};
use crate::llm_client::repair::decode_content_ideas;
use crate::llm_client::{GenerationOptions, TextGenerator};
use crate::models::article::JudgedArticle;
use crate::models::content::ContentIdeas;

/// Builds the content prompt, calls the model once and decodes `ContentIdeas`.
///
/// Errors are returned as-is; whether to continue with empty ideas is the caller's call.
pub async fn generate_content_ideas(
    articles: &[JudgedArticle],
    llm: &dyn TextGenerator,
    options: &GenerationOptions,
    template: &ContentTemplate,
) -> Result<ContentIdeas, AppError> {
    let prompt = build_content_prompt(articles.iter().map(|j| &j.article), template);
    info!(
        "Generating {} content ideas from {} articles",
        template.style,
        articles.len()
    );

    let completion = llm.complete(&prompt, options).await?;
    let ideas = decode_content_ideas(&completion)?;

    if ideas.is_empty() {
        warn!("Model returned a content object with every platform empty");
    }

    Ok(ideas)
}
