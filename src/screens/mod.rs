//! Screen data hooks with a stale-while-revalidate policy
//!
//! A [`Screen`] knows how to resolve its model from the persistent cache and
//! how to revalidate it against the API. [`ScreenHandle::mount`] drives the
//! policy: paint from disk when possible, then revalidate after a short delay
//! and on a fixed interval for as long as the handle lives.

mod article;
mod category;
mod handle;
mod home;
mod tracker;

pub use article::{ArticleDetail, ArticleModel, RELATED_LIMIT};
pub use category::{CategoryFeed, CategoryModel};
pub use handle::{RevalidatePolicy, ScreenHandle, ScreenState};
pub use home::{HomeFeed, HomeModel};
pub use tracker::ViewTracker;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use crate::api::{ApiClient, ApiError, ARTICLES, CAMPAIGNS, CATEGORIES};
use crate::cache::LocalCache;
use crate::data::{Article, Campaign, Category};

/// Persistent cache keys, one per resource
pub const ARTICLES_KEY: &str = "articles";
pub const CATEGORIES_KEY: &str = "categories";
pub const CAMPAIGNS_KEY: &str = "campaigns";

/// Outcome of resolving a screen's model
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution<M> {
    Found(M),
    NotFound,
}

/// Whether the reader believes it has network access
///
/// Timer-driven revalidation passes are skipped while offline.
#[derive(Debug, Clone)]
pub struct Connectivity(Arc<AtomicBool>);

impl Connectivity {
    pub fn new(online: bool) -> Self {
        Self(Arc::new(AtomicBool::new(online)))
    }

    pub fn is_online(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    pub fn set_online(&self, online: bool) {
        self.0.store(online, Ordering::SeqCst);
    }
}

impl Default for Connectivity {
    fn default() -> Self {
        Self::new(true)
    }
}

/// Everything a screen needs to load data
#[derive(Debug, Clone)]
pub struct ScreenContext {
    pub api: ApiClient,
    pub local: LocalCache,
    pub connectivity: Connectivity,
}

impl ScreenContext {
    pub fn new(api: ApiClient, local: LocalCache) -> Self {
        Self {
            api,
            local,
            connectivity: Connectivity::default(),
        }
    }
}

/// A data-backed screen
#[async_trait]
pub trait Screen: Send + Sync + 'static {
    type Model: Clone + Send + Sync + 'static;

    /// Short name used in logs
    fn name(&self) -> String;

    /// Resolves the model from the persistent cache, without network access
    fn from_local(&self, local: &LocalCache) -> Option<Self::Model>;

    /// One revalidation pass: evict the request cache, fetch, normalize,
    /// persist, and resolve the model.
    async fn revalidate(&self, ctx: &ScreenContext) -> Result<Resolution<Self::Model>, ApiError>;

    /// Called each time a model is applied to the screen state
    fn on_resolved(&self, _model: &Self::Model, _ctx: &ScreenContext) {}
}

fn local_list<T: serde::de::DeserializeOwned>(local: &LocalCache, key: &str) -> Option<Vec<T>> {
    local.get::<Vec<T>>(key).map(|record| record.data)
}

/// Fresh article list, persisted on success
async fn fetch_articles(ctx: &ScreenContext) -> Result<Vec<Article>, ApiError> {
    ctx.api.clear_cache(Some(ARTICLES.trim_start_matches('/')));
    let articles = ctx.api.articles().await?;
    ctx.local.set(ARTICLES_KEY, &articles);
    Ok(articles)
}

/// Fresh category list, persisted on success
async fn fetch_categories(ctx: &ScreenContext) -> Result<Vec<Category>, ApiError> {
    ctx.api.clear_cache(Some(CATEGORIES.trim_start_matches('/')));
    let categories = ctx.api.categories().await?;
    ctx.local.set(CATEGORIES_KEY, &categories);
    Ok(categories)
}

/// Fresh campaign list, persisted on success
async fn fetch_campaigns(ctx: &ScreenContext) -> Result<Vec<Campaign>, ApiError> {
    ctx.api.clear_cache(Some(CAMPAIGNS.trim_start_matches('/')));
    let campaigns = ctx.api.campaigns().await?;
    ctx.local.set(CAMPAIGNS_KEY, &campaigns);
    Ok(campaigns)
}
