//! Lenient field readers for upstream JSON records
//!
//! The API is not consistent about naming (`isPrime` vs `is_prime`) or
//! encoding (`true`, `1`, `"1"`). These helpers look a field up under
//! several names and coerce it into one Rust type.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::Value;

/// First non-null value among `names`
pub(crate) fn field<'a>(record: &'a Value, names: &[&str]) -> Option<&'a Value> {
    names
        .iter()
        .filter_map(|name| record.get(*name))
        .find(|value| !value.is_null())
}

/// Non-empty trimmed string; numbers are rendered as text
pub(crate) fn text(record: &Value, names: &[&str]) -> Option<String> {
    let value = field(record, names)?;
    let text = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    (!text.is_empty()).then_some(text)
}

/// Boolean flag accepting bools, numbers and common string spellings
///
/// Missing or unrecognised values are `false`.
pub(crate) fn flag(record: &Value, names: &[&str]) -> bool {
    match field(record, names) {
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|n| n != 0.0),
        Some(Value::String(s)) => matches!(
            s.trim().to_ascii_lowercase().as_str(),
            "true" | "1" | "yes" | "on"
        ),
        _ => false,
    }
}

/// Positive integer id from a number or numeric string
pub(crate) fn id(record: &Value, names: &[&str]) -> Option<u64> {
    match field(record, names)? {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Counter value, defaulting to zero
pub(crate) fn count(record: &Value, names: &[&str]) -> u64 {
    id(record, names).unwrap_or(0)
}

/// Parses the timestamp formats the API has been seen to emit
pub(crate) fn timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(parsed.and_utc());
    }
    if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(parsed.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Resolves a media path against the storage base URL
///
/// Absolute URLs pass through untouched; relative paths are joined onto
/// `storage_base`.
pub fn resolve_media_url(storage_base: &str, path: &str) -> String {
    let path = path.trim();
    if path.starts_with("http://") || path.starts_with("https://") || path.starts_with("data:") {
        return path.to_string();
    }
    let path = path.trim_start_matches('/');
    let path = path.strip_prefix("storage/").unwrap_or(path);
    format!("{}/{}", storage_base.trim_end_matches('/'), path)
}
