use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A news article as selected from the `articles` table.
///
/// `body` starts as the feed description and may be replaced by the page text
/// when enrichment is enabled. Serialized as `content` in model prompts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Article {
    pub id: i64,
    pub title: String,
    #[serde(rename = "content")]
    pub body: String,
    pub url: String,
}

/// An article after comparative scoring.
///
/// `score` is the model's 1-10 judgement, or 0 when the model left the article out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JudgedArticle {
    #[serde(flatten)]
    pub article: Article,
    pub score: i32,
}

impl JudgedArticle {
    pub fn unscored(article: Article) -> Self {
        Self { article, score: 0 }
    }
}
