//! Article Enricher — swaps the feed description for the article page's visible text.
//!
//! Best effort: a page that cannot be fetched leaves the article untouched.

use std::time::Duration;

use scraper::{Html, Node};
use tracing::{info, warn};

use crate::models::article::Article;

const SKIPPED_ELEMENTS: [&str; 5] = ["script", "style", "noscript", "template", "svg"];

/// Fetches each article's page and replaces `body` with its visible text,
/// truncated to `max_chars`. Runs sequentially, one request per article;
/// each fetch gives up after `timeout`.
pub async fn enrich_articles(
    http: &reqwest::Client,
    mut articles: Vec<Article>,
    max_chars: usize,
    timeout: Duration,
) -> Vec<Article> {
    for article in &mut articles {
        if article.url.trim().is_empty() {
            info!("Skipping enrichment for '{}': no URL", article.title);
            continue;
        }

        match fetch_page(http, &article.url, timeout).await {
            Ok(html) => {
                let text = clean_html_text(&html);
                if text.is_empty() {
                    warn!("Page for '{}' had no visible text; keeping description", article.title);
                    continue;
                }
                article.body = truncate_chars(&text, max_chars);
            }
            Err(e) => {
                warn!("Failed to fetch full content for '{}': {e}", article.title);
            }
        }
    }
    articles
}

async fn fetch_page(
    http: &reqwest::Client,
    url: &str,
    timeout: Duration,
) -> Result<String, reqwest::Error> {
    http.get(url)
        .timeout(timeout)
        .send()
        .await?
        .error_for_status()?
        .text()
        .await
}

/// Visible text of an HTML document with whitespace collapsed to single spaces.
pub fn clean_html_text(html: &str) -> String {
    let document = Html::parse_document(html);

    let words: Vec<&str> = document
        .root_element()
        .descendants()
        .filter_map(|node| match node.value() {
            Node::Text(text) => {
                let hidden = node.ancestors().any(|ancestor| {
                    ancestor
                        .value()
                        .as_element()
                        .is_some_and(|el| SKIPPED_ELEMENTS.contains(&el.name()))
                });
                (!hidden).then_some(&**text)
            }
            _ => None,
        })
        .flat_map(str::split_whitespace)
        .collect();

    words.join(" ")
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}
