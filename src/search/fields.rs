// src/search/fields.rs
//! Ordered alias lists for the provider's loosely-shaped items.
//!
//! Each logical attribute is read from the first alias holding a non-empty
//! value. Nothing outside this module inspects raw provider JSON.

use serde_json::Value;

pub const URL_FIELDS: &[&str] = &["url", "postUrl", "linkedinUrl"];
pub const TEXT_FIELDS: &[&str] = &["text", "content", "description"];
pub const CREATED_AT_FIELDS: &[&str] = &["createdAt", "date", "publishedAt"];
pub const KEYWORD_FIELDS: &[&str] = &["searchQuery", "keyword"];
pub const AUTHOR_NAME_FIELDS: &[&str] = &["name", "authorName"];
pub const AUTHOR_PROFILE_FIELDS: &[&str] = &["linkedinUrl", "url"];
pub const LOCATION_FIELDS: &[&str] = &["location", "country", "info"];

/// Nested object that some actor versions wrap the scraped payload in.
pub const RAW_PAYLOAD_FIELD: &str = "rawData";
pub const AUTHOR_FIELD: &str = "author";

/// Scalar as text; strings are trimmed, numbers stringified, empties dropped.
fn scalar_text(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => {
            let t = s.trim();
            (!t.is_empty()).then(|| t.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// First non-empty value among `aliases` on `obj`.
pub fn first_text(obj: &Value, aliases: &[&str]) -> Option<String> {
    aliases
        .iter()
        .filter_map(|k| obj.get(*k))
        .find_map(scalar_text)
}

/// Author name and profile URL. A plain string author is the name.
pub fn author(item: &Value) -> (Option<String>, Option<String>) {
    match item.get(AUTHOR_FIELD) {
        Some(name @ Value::String(_)) => (scalar_text(name), None),
        Some(obj @ Value::Object(_)) => (
            first_text(obj, AUTHOR_NAME_FIELDS),
            first_text(obj, AUTHOR_PROFILE_FIELDS),
        ),
        _ => (None, None),
    }
}

/// Location text in priority order: `author.*`, then `rawData.author.*`.
pub fn location(item: &Value) -> Option<String> {
    let direct = item.get(AUTHOR_FIELD);
    let nested = item
        .get(RAW_PAYLOAD_FIELD)
        .and_then(|raw| raw.get(AUTHOR_FIELD));
    [direct, nested]
        .into_iter()
        .flatten()
        .filter(|a| a.is_object())
        .find_map(|a| first_text(a, LOCATION_FIELDS))
}
