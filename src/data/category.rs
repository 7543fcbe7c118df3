//! Category model

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use super::fields::{id, text};
use super::NormalizeError;

/// A section of the site (Politics, Business, ...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: Option<u64>,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
}

/// Normalizes one category record, generating a slug from the name if needed
pub fn normalize_category(record: &Value) -> Result<Category, NormalizeError> {
    if !record.is_object() {
        return Err(NormalizeError::NotAnObject("category"));
    }
    let name = text(record, &["name", "title"]).ok_or(NormalizeError::MissingField("category", "name"))?;
    let slug = text(record, &["slug"]).unwrap_or_else(|| slug::slugify(&name));

    Ok(Category {
        id: id(record, &["id"]),
        name,
        slug,
        description: text(record, &["description"]),
    })
}

pub fn normalize_categories(payload: &Value) -> Vec<Category> {
    let Some(records) = payload.as_array() else {
        warn!("expected a category list");
        return Vec::new();
    };
    records
        .iter()
        .filter_map(|record| {
            normalize_category(record)
                .map_err(|err| warn!(error = %err, "skipping malformed category"))
                .ok()
        })
        .collect()
}

/// Finds a category by slug, case-insensitively
pub fn find_category<'a>(categories: &'a [Category], slug: &str) -> Option<&'a Category> {
    let slug = slug.trim();
    categories
        .iter()
        .find(|category| category.slug.eq_ignore_ascii_case(slug))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_normalize_generates_slug() {
        let category = normalize_category(&json!({"id": 3, "name": "East Africa"})).unwrap();
        assert_eq!(category.slug, "east-africa");
        assert_eq!(category.id, Some(3));
    }

    #[test]
    fn test_normalize_requires_name() {
        assert_eq!(
            normalize_category(&json!({"id": 3})),
            Err(NormalizeError::MissingField("category", "name"))
        );
    }

    #[test]
    fn test_find_category_case_insensitive() {
        let categories = normalize_categories(&json!([
            {"name": "Politics", "slug": "politics"},
            {"name": "Business"}
        ]));
        assert_eq!(find_category(&categories, "Business").map(|c| c.name.as_str()), Some("Business"));
        assert!(find_category(&categories, "sports").is_none());
    }
}
