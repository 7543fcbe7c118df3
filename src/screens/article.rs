//! Article detail, resolved from the article list

use async_trait::async_trait;
use tracing::debug;

use super::{fetch_articles, local_list};
use super::{Resolution, Screen, ScreenContext, ViewTracker, ARTICLES_KEY};
use crate::api::ApiError;
use crate::cache::LocalCache;
use crate::data::{related_articles, resolve_article, Article};

/// Related articles shown alongside an article
pub const RELATED_LIMIT: usize = 4;

#[derive(Debug, Clone, PartialEq)]
pub struct ArticleModel {
    pub article: Article,
    pub related: Vec<Article>,
}

impl ArticleModel {
    fn build(article: Article, all: &[Article]) -> Self {
        let related = related_articles(all, &article, RELATED_LIMIT)
            .into_iter()
            .cloned()
            .collect();
        Self { article, related }
    }
}

/// Screen for `/article/{id-or-slug}`
///
/// Resolves its article from the list rather than fetching it alone. The
/// single-article endpoint is only used when the list entry has no body, or
/// when a numeric id is missing from the list.
#[derive(Debug, Clone)]
pub struct ArticleDetail {
    pub ident: String,
    tracker: ViewTracker,
}

impl ArticleDetail {
    pub fn new(ident: impl Into<String>, tracker: ViewTracker) -> Self {
        Self {
            ident: ident.into(),
            tracker,
        }
    }
}

#[async_trait]
impl Screen for ArticleDetail {
    type Model = ArticleModel;

    fn name(&self) -> String {
        format!("article:{}", self.ident)
    }

    fn from_local(&self, local: &LocalCache) -> Option<ArticleModel> {
        let articles: Vec<Article> = local_list(local, ARTICLES_KEY)?;
        let article = resolve_article(&articles, &self.ident)?.clone();
        Some(ArticleModel::build(article, &articles))
    }

    async fn revalidate(&self, ctx: &ScreenContext) -> Result<Resolution<ArticleModel>, ApiError> {
        let articles = fetch_articles(ctx).await?;

        let article = match resolve_article(&articles, &self.ident) {
            Some(article) if article.content.is_empty() => match ctx.api.article(article.id).await {
                Ok(full) => full,
                Err(err) => {
                    debug!(article = article.id, error = %err, "no full body, using list entry");
                    article.clone()
                }
            },
            Some(article) => article.clone(),
            None => match self.ident.trim().parse::<u64>() {
                Ok(id) => match ctx.api.article(id).await {
                    Ok(article) => article,
                    Err(err) if err.status() == Some(404) => return Ok(Resolution::NotFound),
                    Err(err) => return Err(err),
                },
                Err(_) => return Ok(Resolution::NotFound),
            },
        };

        Ok(Resolution::Found(ArticleModel::build(article, &articles)))
    }

    fn on_resolved(&self, model: &ArticleModel, ctx: &ScreenContext) {
        self.tracker.track(&ctx.api, model.article.id);
    }
}
