//! Article model and normalization

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use super::fields::{count, field, flag, id, resolve_media_url, text, timestamp};
use super::{Category, NormalizeError};

/// Words read per minute when estimating a read-time label
const WORDS_PER_MINUTE: usize = 200;

/// Publication status of an article
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArticleStatus {
    #[default]
    Published,
    Draft,
    Archived,
}

impl ArticleStatus {
    /// Parses a status string; anything unrecognised counts as a draft
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "published" | "publish" | "live" | "active" => ArticleStatus::Published,
            "archived" => ArticleStatus::Archived,
            _ => ArticleStatus::Draft,
        }
    }
}

/// A news article as the reader consumes it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub id: u64,
    pub slug: Option<String>,
    pub title: String,
    pub excerpt: String,
    pub content: String,
    /// Absolute image URL
    pub image: Option<String>,
    /// Primary category name
    pub category: Option<String>,
    pub category_id: Option<u64>,
    /// Every category the article is filed under, primary first
    pub categories: Vec<String>,
    pub author: String,
    pub created_at: Option<DateTime<Utc>>,
    /// Display date, always present
    pub date: String,
    pub read_time: String,
    pub is_prime: bool,
    pub is_headline: bool,
    pub status: ArticleStatus,
    pub views: u64,
    pub clicks: u64,
}

impl Article {
    /// The article's slug, or one generated from its title
    pub fn slug_or_generated(&self) -> String {
        match &self.slug {
            Some(slug) => slug.clone(),
            None => slug::slugify(&self.title),
        }
    }

    pub fn is_published(&self) -> bool {
        self.status == ArticleStatus::Published
    }

    /// Whether the article is filed under `category`
    pub fn in_category(&self, category: &Category) -> bool {
        if let (Some(id), Some(category_id)) = (self.category_id, category.id) {
            if id == category_id {
                return true;
            }
        }
        self.categories
            .iter()
            .chain(self.category.iter())
            .any(|name| name.eq_ignore_ascii_case(&category.name) || slug::slugify(name) == category.slug)
    }

    fn shares_category(&self, other: &Article) -> bool {
        if let (Some(a), Some(b)) = (self.category_id, other.category_id) {
            return a == b;
        }
        match (&self.category, &other.category) {
            (Some(a), Some(b)) => a.eq_ignore_ascii_case(b),
            _ => false,
        }
    }
}

/// Normalizes one upstream article record
///
/// Requires an id and a title. Flags accept camelCase or snake_case names,
/// and `date` falls back to a formatted `created_at`.
pub fn normalize_article(record: &Value, storage_base: &str) -> Result<Article, NormalizeError> {
    if !record.is_object() {
        return Err(NormalizeError::NotAnObject("article"));
    }
    let id = id(record, &["id"]).ok_or(NormalizeError::MissingField("article", "id"))?;
    let title = text(record, &["title"]).ok_or(NormalizeError::MissingField("article", "title"))?;

    let content = text(record, &["content", "body"]).unwrap_or_default();
    let excerpt = text(record, &["excerpt", "summary"]).unwrap_or_default();

    let (category, category_id) = primary_category(record);
    let mut categories = category_list(record);
    if let Some(primary) = &category {
        if !categories.iter().any(|name| name.eq_ignore_ascii_case(primary)) {
            categories.insert(0, primary.clone());
        }
    }

    let raw_created = text(record, &["created_at", "createdAt", "published_at", "publishedAt"]);
    let created_at = raw_created.as_deref().and_then(timestamp);
    let date = text(record, &["date"])
        .or_else(|| created_at.map(|at| at.format("%B %-d, %Y").to_string()))
        .or(raw_created)
        .unwrap_or_else(|| "Recently".to_string());

    let read_time = text(record, &["readTime", "read_time"])
        .unwrap_or_else(|| estimate_read_time(&content, &excerpt));

    let author = match field(record, &["author", "author_name", "authorName"]) {
        Some(Value::Object(_)) => field(record, &["author"])
            .and_then(|author| text(author, &["name", "username"])),
        _ => text(record, &["author", "author_name", "authorName"]),
    }
    .unwrap_or_else(|| "The Bold East Africa".to_string());

    let image = text(record, &["image", "image_url", "imageUrl", "featured_image"])
        .map(|path| resolve_media_url(storage_base, &path));

    let status = text(record, &["status"])
        .map(|raw| ArticleStatus::parse(&raw))
        .unwrap_or_default();

    Ok(Article {
        id,
        slug: text(record, &["slug"]),
        title,
        excerpt,
        content,
        image,
        category,
        category_id,
        categories,
        author,
        created_at,
        date,
        read_time,
        is_prime: flag(record, &["isPrime", "is_prime"]),
        is_headline: flag(record, &["isHeadline", "is_headline"]),
        status,
        views: count(record, &["views", "view_count", "viewCount"]),
        clicks: count(record, &["clicks", "click_count", "clickCount"]),
    })
}

/// Normalizes a list payload, skipping malformed records
pub fn normalize_articles(payload: &Value, storage_base: &str) -> Vec<Article> {
    let Some(records) = payload.as_array() else {
        warn!("expected an article list, got {}", kind(payload));
        return Vec::new();
    };

    records
        .iter()
        .filter_map(|record| match normalize_article(record, storage_base) {
            Ok(article) => Some(article),
            Err(err) => {
                warn!(error = %err, "skipping malformed article");
                None
            }
        })
        .collect()
}

/// Up to `limit` published articles sharing `current`'s category
pub fn related_articles<'a>(all: &'a [Article], current: &Article, limit: usize) -> Vec<&'a Article> {
    all.iter()
        .filter(|article| article.id != current.id)
        .filter(|article| article.is_published())
        .filter(|article| article.shares_category(current))
        .take(limit)
        .collect()
}

/// Finds an article by numeric id, slug, or a slug generated from its title
pub fn resolve_article<'a>(articles: &'a [Article], ident: &str) -> Option<&'a Article> {
    let ident = ident.trim();
    if let Ok(id) = ident.parse::<u64>() {
        return articles.iter().find(|article| article.id == id);
    }
    articles
        .iter()
        .find(|article| article.slug.as_deref() == Some(ident))
        .or_else(|| {
            articles
                .iter()
                .find(|article| slug::slugify(&article.title) == ident)
        })
}

fn primary_category(record: &Value) -> (Option<String>, Option<u64>) {
    let category_id = id(record, &["category_id", "categoryId"]);
    match field(record, &["category"]) {
        Some(Value::String(name)) if !name.trim().is_empty() => {
            (Some(name.trim().to_string()), category_id)
        }
        Some(object @ Value::Object(_)) => (
            text(object, &["name", "title"]),
            category_id.or_else(|| id(object, &["id"])),
        ),
        _ => (text(record, &["category_name", "categoryName"]), category_id),
    }
}

fn category_list(record: &Value) -> Vec<String> {
    let Some(Value::Array(items)) = field(record, &["categories"]) else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|item| match item {
            Value::String(name) if !name.trim().is_empty() => Some(name.trim().to_string()),
            Value::Object(_) => text(item, &["name", "title"]),
            _ => None,
        })
        .collect()
}

fn estimate_read_time(content: &str, excerpt: &str) -> String {
    let source = if content.is_empty() { excerpt } else { content };
    let words = source.split_whitespace().count();
    format!("{} min read", (words / WORDS_PER_MINUTE).max(1))
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const STORAGE: &str = "https://api.example.com/storage";

    fn article(id: u64, title: &str, category: &str) -> Article {
        normalize_article(
            &json!({"id": id, "title": title, "category": category}),
            STORAGE,
        )
        .unwrap()
    }

    #[test]
    fn test_normalize_coerces_flags_and_derives_date() {
        let record = json!({
            "id": 1,
            "title": "Budget passes",
            "is_prime": true,
            "isHeadline": null,
            "created_at": "2024-01-01T00:00:00Z"
        });

        let article = normalize_article(&record, STORAGE).unwrap();

        assert!(article.is_prime);
        assert!(!article.is_headline);
        assert_eq!(article.date, "January 1, 2024");
    }

    #[test]
    fn test_normalize_prefers_camel_case_flags() {
        let record = json!({"id": 2, "title": "T", "isHeadline": 1, "is_headline": 0});
        let article = normalize_article(&record, STORAGE).unwrap();
        assert!(article.is_headline);
    }

    #[test]
    fn test_normalize_keeps_explicit_date() {
        let record = json!({"id": 3, "title": "T", "date": "Today", "created_at": "2024-01-01"});
        let article = normalize_article(&record, STORAGE).unwrap();
        assert_eq!(article.date, "Today");
    }

    #[test]
    fn test_normalize_unparseable_created_at_used_verbatim() {
        let record = json!({"id": 3, "title": "T", "created_at": "last week"});
        let article = normalize_article(&record, STORAGE).unwrap();
        assert_eq!(article.date, "last week");
        assert!(article.created_at.is_none());
    }

    #[test]
    fn test_normalize_always_has_date() {
        let article = normalize_article(&json!({"id": 4, "title": "T"}), STORAGE).unwrap();
        assert!(!article.date.is_empty());
    }

    #[test]
    fn test_normalize_requires_id_and_title() {
        assert_eq!(
            normalize_article(&json!({"title": "T"}), STORAGE),
            Err(NormalizeError::MissingField("article", "id"))
        );
        assert_eq!(
            normalize_article(&json!({"id": 9}), STORAGE),
            Err(NormalizeError::MissingField("article", "title"))
        );
        assert_eq!(
            normalize_article(&json!("nope"), STORAGE),
            Err(NormalizeError::NotAnObject("article"))
        );
    }

    #[test]
    fn test_normalize_category_object_and_list() {
        let record = json!({
            "id": 5,
            "title": "T",
            "category": {"id": 8, "name": "Politics"},
            "categories": [{"name": "Kenya"}, "Politics"]
        });

        let article = normalize_article(&record, STORAGE).unwrap();

        assert_eq!(article.category.as_deref(), Some("Politics"));
        assert_eq!(article.category_id, Some(8));
        assert_eq!(article.categories, vec!["Kenya", "Politics"]);
    }

    #[test]
    fn test_normalize_resolves_relative_image() {
        let record = json!({"id": 6, "title": "T", "image": "articles/a.jpg"});
        let article = normalize_article(&record, STORAGE).unwrap();
        assert_eq!(
            article.image.as_deref(),
            Some("https://api.example.com/storage/articles/a.jpg")
        );
    }

    #[test]
    fn test_read_time_estimate() {
        let words = vec!["word"; 450].join(" ");
        let record = json!({"id": 7, "title": "T", "content": words});
        let article = normalize_article(&record, STORAGE).unwrap();
        assert_eq!(article.read_time, "2 min read");

        let short = normalize_article(&json!({"id": 8, "title": "T"}), STORAGE).unwrap();
        assert_eq!(short.read_time, "1 min read");
    }

    #[test]
    fn test_status_parsing() {
        let draft = normalize_article(&json!({"id": 1, "title": "T", "status": "draft"}), STORAGE)
            .unwrap();
        assert_eq!(draft.status, ArticleStatus::Draft);
        assert!(!draft.is_published());
    }

    #[test]
    fn test_normalize_articles_skips_malformed() {
        let payload = json!([{"id": 1, "title": "Good"}, {"title": "No id"}, 42]);
        let articles = normalize_articles(&payload, STORAGE);
        assert_eq!(articles.len(), 1);
        assert_eq!(articles[0].title, "Good");
    }

    #[test]
    fn test_normalize_articles_non_array_is_empty() {
        assert!(normalize_articles(&json!({"id": 1}), STORAGE).is_empty());
    }

    #[test]
    fn test_resolve_article_by_id_slug_and_title() {
        let mut with_slug = article(2, "Second story", "News");
        with_slug.slug = Some("custom-slug".to_string());
        let articles = vec![article(1, "Rains Hit Nairobi", "News"), with_slug];

        assert_eq!(resolve_article(&articles, "2").map(|a| a.id), Some(2));
        assert_eq!(resolve_article(&articles, "custom-slug").map(|a| a.id), Some(2));
        assert_eq!(resolve_article(&articles, "rains-hit-nairobi").map(|a| a.id), Some(1));
        assert!(resolve_article(&articles, "99").is_none());
        assert!(resolve_article(&articles, "missing").is_none());
    }

    #[test]
    fn test_related_articles_same_category_capped() {
        let current = article(1, "Current", "Sports");
        let mut all = vec![current.clone()];
        for id in 2..8 {
            all.push(article(id, "Sports story", "Sports"));
        }
        all.push(article(20, "Business story", "Business"));

        let related = related_articles(&all, &current, 4);

        assert_eq!(related.len(), 4);
        assert!(related.iter().all(|a| a.id != 1));
        assert!(related.iter().all(|a| a.category.as_deref() == Some("Sports")));
    }

    #[test]
    fn test_in_category_by_name_or_slug() {
        let story = article(1, "T", "East Africa");
        let category = Category {
            id: None,
            name: "Regional".to_string(),
            slug: "east-africa".to_string(),
            description: None,
        };
        assert!(story.in_category(&category));
    }
}
