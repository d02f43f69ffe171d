use anyhow::{Context, Result};
use std::path::Path;

use crate::models::Article;

/// Loads the article catalogue. A missing or broken file is logged and yields no articles.
pub async fn load_articles(path: &Path) -> Vec<Article> {
    match read_articles(path).await {
        Ok(articles) => {
            log::debug!("📚 Loaded {} articles from {}", articles.len(), path.display());
            articles
        }
        Err(e) => {
            log::error!("❌ Error loading articles: {:#}", e);
            Vec::new()
        }
    }
}

async fn read_articles(path: &Path) -> Result<Vec<Article>> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Article file not found at {}", path.display()))?;
    let articles: Option<Vec<Article>> = serde_yaml::from_str(&raw)
        .with_context(|| format!("Invalid article file {}", path.display()))?;
    Ok(articles.unwrap_or_default())
}
