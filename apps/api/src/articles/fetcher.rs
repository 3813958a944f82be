//! Article Fetcher — supplies the ordered candidate set for scoring.

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::info;

use crate::errors::AppError;
use crate::models::article::Article;

/// Source of ranked candidate articles.
///
/// Carried in `AppState` as `Arc<dyn ArticleSource>`; the pipeline only needs an
/// ordered, finite list and does not care how ranking was computed.
#[async_trait]
pub trait ArticleSource: Send + Sync {
    async fn fetch_top_ranked(&self, limit: i64) -> Result<Vec<Article>, AppError>;
}

/// Reads from the `articles` table populated by the news ingester.
pub struct PgArticleSource {
    pool: PgPool,
}

impl PgArticleSource {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Articles sharing the table's highest `llm_score`, oldest id first.
const TOP_RANKED_QUERY: &str = r#"
    SELECT id::BIGINT AS id,
           COALESCE(title, '') AS title,
           COALESCE(description, '') AS body,
           COALESCE(link, '') AS url
    FROM articles
    WHERE llm_score = (SELECT MAX(llm_score) FROM articles)
    ORDER BY id
    LIMIT $1
"#;

#[async_trait]
impl ArticleSource for PgArticleSource {
    async fn fetch_top_ranked(&self, limit: i64) -> Result<Vec<Article>, AppError> {
        let articles = sqlx::query_as::<_, Article>(TOP_RANKED_QUERY)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        info!("Fetched {} top-ranked articles (limit {limit})", articles.len());
        Ok(articles)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    /// Fixed in-memory article list; honours `limit` like the SQL query does.
    pub struct StaticArticleSource(pub Vec<Article>);

    #[async_trait]
    impl ArticleSource for StaticArticleSource {
        async fn fetch_top_ranked(&self, limit: i64) -> Result<Vec<Article>, AppError> {
            Ok(self.0.iter().take(limit.max(0) as usize).cloned().collect())
        }
    }
}
