//! Home feed: every article plus the category and campaign lists

use async_trait::async_trait;
use tracing::warn;

use super::{fetch_articles, fetch_campaigns, fetch_categories, local_list};
use super::{Resolution, Screen, ScreenContext, ARTICLES_KEY, CAMPAIGNS_KEY, CATEGORIES_KEY};
use crate::api::ApiError;
use crate::cache::LocalCache;
use crate::data::{Article, Campaign, Category};

/// Maximum number of headline stories shown at the top of the feed
pub const HEADLINE_LIMIT: usize = 5;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct HomeModel {
    pub articles: Vec<Article>,
    pub categories: Vec<Category>,
    pub campaigns: Vec<Campaign>,
}

impl HomeModel {
    /// Published articles, newest first
    pub fn latest(&self) -> Vec<&Article> {
        let mut latest: Vec<&Article> = self.articles.iter().filter(|a| a.is_published()).collect();
        latest.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        latest
    }

    pub fn headlines(&self) -> Vec<&Article> {
        self.latest()
            .into_iter()
            .filter(|a| a.is_headline)
            .take(HEADLINE_LIMIT)
            .collect()
    }

    pub fn prime(&self) -> Vec<&Article> {
        self.latest().into_iter().filter(|a| a.is_prime).collect()
    }

    pub fn active_campaigns(&self) -> Vec<&Campaign> {
        self.campaigns.iter().filter(|c| c.active).collect()
    }
}

/// The landing screen
#[derive(Debug, Clone, Default)]
pub struct HomeFeed;

#[async_trait]
impl Screen for HomeFeed {
    type Model = HomeModel;

    fn name(&self) -> String {
        "home".to_string()
    }

    fn from_local(&self, local: &LocalCache) -> Option<HomeModel> {
        Some(HomeModel {
            articles: local_list(local, ARTICLES_KEY)?,
            categories: local_list(local, CATEGORIES_KEY).unwrap_or_default(),
            campaigns: local_list(local, CAMPAIGNS_KEY).unwrap_or_default(),
        })
    }

    async fn revalidate(&self, ctx: &ScreenContext) -> Result<Resolution<HomeModel>, ApiError> {
        let (articles, categories) = futures::try_join!(fetch_articles(ctx), fetch_categories(ctx))?;

        // Ads are optional; fall back to whatever was persisted last.
        let campaigns = match fetch_campaigns(ctx).await {
            Ok(campaigns) => campaigns,
            Err(err) => {
                warn!(error = %err, "failed to refresh campaigns");
                local_list(&ctx.local, CAMPAIGNS_KEY).unwrap_or_default()
            }
        };

        Ok(Resolution::Found(HomeModel {
            articles,
            categories,
            campaigns,
        }))
    }
}
