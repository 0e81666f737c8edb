//! Direct-logo extraction from entity metadata
//!
//! Many entity records already carry a logo reference under one of several
//! field names; probing them is free and always happens before any cache or
//! network access. Probes are an ordered strategy list so new metadata shapes
//! slot in without touching the resolution flow.

use serde_json::Value;
use url::Url;

use crate::config::TmdbConfig;

/// Top-level fields probed first, in priority order
const DIRECT_FIELDS: &[&str] = &[
    "direct_logo_url",
    "logo",
    "logo_path",
    "clearlogo",
    "clear_logo",
    "img_logo",
    "image_logo",
];

/// Fields probed inside a nested `images` object
const NESTED_IMAGE_FIELDS: &[&str] = &["logo", "clearlogo", "clear_logo"];

/// Fields an object-shaped candidate is unwrapped through
const OBJECT_URL_FIELDS: &[&str] = &["url", "file_path", "logo", "path"];

/// Probe an entity record for an embedded logo reference.
///
/// Pure function, no I/O. Returns the first probed value that normalizes to a
/// usable URL, or `None`.
pub fn extract_direct(entity: &Value, tmdb: &TmdbConfig) -> Option<String> {
    probes(entity).find_map(|value| normalize(value, tmdb))
}

/// Candidate values in probe order: top-level fields, then the nested
/// `images` object, then generic `logos` arrays
fn probes(entity: &Value) -> impl Iterator<Item = &Value> {
    let top_level = DIRECT_FIELDS
        .iter()
        .filter_map(move |field| entity.get(field));

    let images = entity.get("images");
    let nested = NESTED_IMAGE_FIELDS
        .iter()
        .filter_map(move |field| images.and_then(|i| i.get(field)));
    let nested_array = images
        .and_then(|i| i.get("logos"))
        .and_then(Value::as_array)
        .and_then(|logos| logos.first());

    let top_array = entity
        .get("logos")
        .and_then(Value::as_array)
        .and_then(|logos| logos.first());

    top_level
        .chain(nested)
        .chain(nested_array)
        .chain(top_array)
}

/// Turn one probed value into a displayable URL, or reject it.
///
/// Absolute `http(s)` URLs and inline image data pass through unchanged;
/// CDN-relative paths (leading `/`) are expanded with the embedded size
/// segment; everything else is rejected.
fn normalize(value: &Value, tmdb: &TmdbConfig) -> Option<String> {
    let raw = match value {
        Value::String(s) => s.as_str(),
        Value::Object(_) => OBJECT_URL_FIELDS
            .iter()
            .find_map(|field| value.get(field).and_then(Value::as_str))?,
        _ => return None,
    };

    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if raw.starts_with("data:image") {
        return Some(raw.to_string());
    }
    if let Ok(parsed) = Url::parse(raw) {
        return match parsed.scheme() {
            "http" | "https" => Some(raw.to_string()),
            _ => None,
        };
    }
    if raw.starts_with('/') {
        return Some(tmdb.embedded_url(raw));
    }
    None
}
