//! Per-resource API methods

use serde_json::Value;
use tracing::debug;

use super::{ApiClient, ApiError, RequestOptions};
use crate::data::{normalize_article, normalize_articles, normalize_campaigns, normalize_categories};
use crate::data::{Article, Campaign, Category};

/// Article list endpoint; also the eviction pattern for every article key
pub const ARTICLES: &str = "/articles";
pub const CATEGORIES: &str = "/categories";
pub const CAMPAIGNS: &str = "/campaigns";

/// Extracts the payload from a `{ data, message, status }` envelope
///
/// Bare payloads pass through unchanged, and a paginated `data` object
/// (`{ data: { data: [...] } }`) is unwrapped one more level.
pub fn unwrap_envelope(value: Value) -> Value {
    let Value::Object(mut envelope) = value else {
        return value;
    };
    let Some(data) = envelope.remove("data") else {
        return Value::Object(envelope);
    };
    match data {
        Value::Object(mut page) if page.get("data").is_some_and(Value::is_array) => {
            page.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    }
}

impl ApiClient {
    /// Fetches and normalizes the article list
    pub async fn articles(&self) -> Result<Vec<Article>, ApiError> {
        let payload = unwrap_envelope(self.get(ARTICLES, true).await?);
        let articles = normalize_articles(&payload, self.storage_base_url());
        debug!(count = articles.len(), "fetched articles");
        Ok(articles)
    }

    /// Fetches a single article
    pub async fn article(&self, id: u64) -> Result<Article, ApiError> {
        let payload = unwrap_envelope(self.get(&format!("{}/{}", ARTICLES, id), true).await?);
        normalize_article(&payload, self.storage_base_url())
            .map_err(|err| ApiError::Decode(err.to_string()))
    }

    pub async fn categories(&self) -> Result<Vec<Category>, ApiError> {
        let payload = unwrap_envelope(self.get(CATEGORIES, true).await?);
        Ok(normalize_categories(&payload))
    }

    pub async fn campaigns(&self) -> Result<Vec<Campaign>, ApiError> {
        let payload = unwrap_envelope(self.get(CAMPAIGNS, true).await?);
        Ok(normalize_campaigns(&payload, self.storage_base_url()))
    }

    /// Records a view of an article. Never cached.
    pub async fn track_view(&self, id: u64) -> Result<(), ApiError> {
        self.request(&format!("{}/{}/view", ARTICLES, id), RequestOptions::post(None), false)
            .await?;
        Ok(())
    }
}
