//! Resource models consumed by the reader
//!
//! The API's records are loosely shaped; every record passes through an
//! explicit normalizer that either yields a well-formed model or a
//! [`NormalizeError`]. Normalized models are what the persistent cache stores.

mod article;
mod campaign;
mod category;
mod fields;

pub use article::{
    normalize_article, normalize_articles, related_articles, resolve_article, Article,
    ArticleStatus,
};
pub use campaign::{normalize_campaign, normalize_campaigns, Campaign};
pub use category::{find_category, normalize_categories, normalize_category, Category};
pub use fields::resolve_media_url;

use thiserror::Error;

/// A malformed upstream record
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NormalizeError {
    /// The record was not a JSON object
    #[error("{0} record is not an object")]
    NotAnObject(&'static str),

    /// A required field was absent or unusable
    #[error("{0} record is missing required field '{1}'")]
    MissingField(&'static str, &'static str),
}
