//! Advertising campaign model

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use super::fields::{field, flag, id, resolve_media_url, text};
use super::NormalizeError;

/// An ad campaign shown in a sponsored slot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Campaign {
    pub id: u64,
    pub title: String,
    pub image: Option<String>,
    pub link: Option<String>,
    /// Slot the campaign targets (`sidebar`, `header`, `in-article`, ...)
    pub placement: String,
    pub active: bool,
}

pub fn normalize_campaign(record: &Value, storage_base: &str) -> Result<Campaign, NormalizeError> {
    if !record.is_object() {
        return Err(NormalizeError::NotAnObject("campaign"));
    }
    let id = id(record, &["id"]).ok_or(NormalizeError::MissingField("campaign", "id"))?;
    let title = text(record, &["title", "name"]).ok_or(NormalizeError::MissingField("campaign", "title"))?;

    // An explicit status wins over the flag; no information means active.
    let active = match text(record, &["status"]) {
        Some(status) => status.eq_ignore_ascii_case("active"),
        None if field(record, &["isActive", "is_active", "active"]).is_some() => {
            flag(record, &["isActive", "is_active", "active"])
        }
        None => true,
    };

    Ok(Campaign {
        id,
        title,
        image: text(record, &["image", "image_url", "imageUrl", "banner"])
            .map(|path| resolve_media_url(storage_base, &path)),
        link: text(record, &["link", "url", "target_url", "targetUrl"]),
        placement: text(record, &["placement", "position", "slot"])
            .unwrap_or_else(|| "sidebar".to_string()),
        active,
    })
}

pub fn normalize_campaigns(payload: &Value, storage_base: &str) -> Vec<Campaign> {
    let Some(records) = payload.as_array() else {
        warn!("expected a campaign list");
        return Vec::new();
    };
    records
        .iter()
        .filter_map(|record| {
            normalize_campaign(record, storage_base)
                .map_err(|err| warn!(error = %err, "skipping malformed campaign"))
                .ok()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const STORAGE: &str = "https://cdn.example.com";

    #[test]
    fn test_status_overrides_flag() {
        let record = json!({"id": 1, "name": "Safari", "status": "paused", "is_active": true});
        assert!(!normalize_campaign(&record, STORAGE).unwrap().active);
    }

    #[test]
    fn test_defaults() {
        let campaign = normalize_campaign(&json!({"id": 1, "title": "Safari"}), STORAGE).unwrap();
        assert!(campaign.active);
        assert_eq!(campaign.placement, "sidebar");
        assert!(campaign.image.is_none());
    }

    #[test]
    fn test_flag_only() {
        let record = json!({"id": 1, "title": "Safari", "isActive": 0, "image": "ads/a.png"});
        let campaign = normalize_campaign(&record, STORAGE).unwrap();
        assert!(!campaign.active);
        assert_eq!(campaign.image.as_deref(), Some("https://cdn.example.com/ads/a.png"));
    }
}
