//! Category feed: one category and its published articles

use async_trait::async_trait;

use super::{fetch_articles, fetch_categories, local_list};
use super::{Resolution, Screen, ScreenContext, ARTICLES_KEY, CATEGORIES_KEY};
use crate::api::ApiError;
use crate::cache::LocalCache;
use crate::data::{find_category, Article, Category};

#[derive(Debug, Clone, PartialEq)]
pub struct CategoryModel {
    pub category: Category,
    /// Published articles in the category, newest first
    pub articles: Vec<Article>,
}

impl CategoryModel {
    fn build(categories: &[Category], articles: &[Article], slug: &str) -> Option<Self> {
        let category = find_category(categories, slug)?.clone();
        let mut articles: Vec<Article> = articles
            .iter()
            .filter(|article| article.is_published() && article.in_category(&category))
            .cloned()
            .collect();
        articles.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Some(Self { category, articles })
    }
}

/// Screen for `/category/{slug}`
#[derive(Debug, Clone)]
pub struct CategoryFeed {
    pub slug: String,
}

impl CategoryFeed {
    pub fn new(slug: impl Into<String>) -> Self {
        Self { slug: slug.into() }
    }
}

#[async_trait]
impl Screen for CategoryFeed {
    type Model = CategoryModel;

    fn name(&self) -> String {
        format!("category:{}", self.slug)
    }

    fn from_local(&self, local: &LocalCache) -> Option<CategoryModel> {
        let categories: Vec<Category> = local_list(local, CATEGORIES_KEY)?;
        let articles: Vec<Article> = local_list(local, ARTICLES_KEY)?;
        CategoryModel::build(&categories, &articles, &self.slug)
    }

    async fn revalidate(&self, ctx: &ScreenContext) -> Result<Resolution<CategoryModel>, ApiError> {
        let (articles, categories) = futures::try_join!(fetch_articles(ctx), fetch_categories(ctx))?;
        Ok(match CategoryModel::build(&categories, &articles, &self.slug) {
            Some(model) => Resolution::Found(model),
            None => Resolution::NotFound,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::screens::fixtures::{context, serve_all};

    #[tokio::test]
    async fn test_resolves_category_and_filters_articles() {
        let (ctx, transport, _dir) = context();
        serve_all(&transport);

        let result = CategoryFeed::new("news").revalidate(&ctx).await.unwrap();

        let Resolution::Found(model) = result else {
            panic!("news should resolve");
        };
        assert_eq!(model.category.name, "News");
        let ids: Vec<u64> = model.articles.iter().map(|a| a.id).collect();
        assert_eq!(ids, vec![1, 3], "Newest first, draft excluded");
    }

    #[tokio::test]
    async fn test_generated_slug_resolves() {
        let (ctx, transport, _dir) = context();
        serve_all(&transport);

        let result = CategoryFeed::new("business").revalidate(&ctx).await.unwrap();

        let Resolution::Found(model) = result else {
            panic!("business should resolve");
        };
        assert_eq!(model.articles.len(), 1);
    }

    #[tokio::test]
    async fn test_unknown_slug_is_not_found() {
        let (ctx, transport, _dir) = context();
        serve_all(&transport);

        let result = CategoryFeed::new("sports").revalidate(&ctx).await.unwrap();

        assert_eq!(result, Resolution::NotFound);
    }

    #[tokio::test]
    async fn test_from_local_after_revalidate() {
        let (ctx, transport, _dir) = context();
        serve_all(&transport);
        let feed = CategoryFeed::new("news");
        assert!(feed.from_local(&ctx.local).is_none());

        feed.revalidate(&ctx).await.unwrap();

        assert_eq!(feed.from_local(&ctx.local).map(|m| m.articles.len()), Some(2));
    }
}
