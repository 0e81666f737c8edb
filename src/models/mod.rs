//! Data model for logo resolution
//!
//! The types here are deliberately small: a request triple that doubles as
//! the cache and coalescing key, the candidate shape returned by the images
//! endpoint, and the typed outcome/cache-value pair that replaces ad hoc
//! `url | ""` strings.

use std::fmt;

use serde::Deserialize;

/// Sentinel stored when a resolution confirmed that no logo exists.
///
/// Distinct from "never looked up": a cached sentinel short-circuits future
/// requests for the same key without a network call.
pub const ABSENT_SENTINEL: &str = "none";

/// Version segment baked into storage keys. Entries are never invalidated at
/// runtime; bumping this rekeys the whole cache instead.
const CACHE_KEY_VERSION: &str = "v1";

/// Kind of catalog entity a logo is resolved for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Movie,
    Series,
}

impl EntityKind {
    /// Path segment used by the metadata API for this kind
    pub fn api_path(&self) -> &'static str {
        match self {
            EntityKind::Movie => "movie",
            EntityKind::Series => "tv",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.api_path())
    }
}

/// One resolution unit. The `(kind, id, language)` triple is both the cache
/// key and the in-flight coalescing key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LogoRequest {
    pub kind: EntityKind,
    /// Opaque catalog identifier (numeric ids are rendered to strings)
    pub id: String,
    /// ISO-639-1-like preference tag
    pub language: String,
}

impl LogoRequest {
    pub fn new(kind: EntityKind, id: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            kind,
            id: id.into(),
            language: language.into(),
        }
    }

    /// Key under which the resolution outcome is cached
    pub fn storage_key(&self) -> String {
        format!(
            "logo:{}:{}:{}:{}",
            CACHE_KEY_VERSION, self.kind, self.id, self.language
        )
    }

    /// Language-independent token identifying the entity, used by callers to
    /// discard results that arrive after navigation
    pub fn entity_key(&self) -> String {
        format!("{}:{}", self.kind, self.id)
    }
}

/// Image format inferred from a candidate's file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogoFormat {
    Raster,
    Vector,
}

/// One logo option returned by the images endpoint
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LogoCandidate {
    /// Opaque asset reference, e.g. `/abc123.png`
    pub file_path: String,
    /// Language tag, `None` for untagged entries
    #[serde(default)]
    pub iso_639_1: Option<String>,
    /// Optional quality signal
    #[serde(default)]
    pub vote_average: Option<f64>,
    #[serde(default)]
    pub aspect_ratio: Option<f64>,
}

impl LogoCandidate {
    pub fn format(&self) -> LogoFormat {
        if self.file_path.to_ascii_lowercase().ends_with(".svg") {
            LogoFormat::Vector
        } else {
            LogoFormat::Raster
        }
    }

    /// Asset path with the vector extension substituted for a raster one.
    /// The image CDN rasterizes `.svg` assets when requested as `.png`.
    pub fn rasterized_path(&self) -> String {
        if self.format() == LogoFormat::Vector {
            let stem = &self.file_path[..self.file_path.len() - 4];
            format!("{stem}.png")
        } else {
            self.file_path.clone()
        }
    }
}

/// Body of the images-lookup response; a missing array decodes as empty
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImagesResponse {
    #[serde(default)]
    pub logos: Vec<LogoCandidate>,
}

/// Outcome of a resolution, delivered to every waiter of a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolvedLogo {
    /// Displayable absolute URL (or inline image data)
    Found(String),
    /// Resolution completed and confirmed no logo is available
    Missing,
}

impl ResolvedLogo {
    pub fn url(&self) -> Option<&str> {
        match self {
            ResolvedLogo::Found(url) => Some(url),
            ResolvedLogo::Missing => None,
        }
    }

    pub fn into_url(self) -> Option<String> {
        match self {
            ResolvedLogo::Found(url) => Some(url),
            ResolvedLogo::Missing => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, ResolvedLogo::Missing)
    }
}

impl From<Option<String>> for ResolvedLogo {
    fn from(value: Option<String>) -> Self {
        match value {
            Some(url) => ResolvedLogo::Found(url),
            None => ResolvedLogo::Missing,
        }
    }
}

/// Persisted resolution outcome, as written to the cache tiers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheValue {
    Url(String),
    /// Confirmed absence, encoded as [`ABSENT_SENTINEL`]
    Absent,
}

impl CacheValue {
    pub fn encode(&self) -> String {
        match self {
            CacheValue::Url(url) => url.clone(),
            CacheValue::Absent => ABSENT_SENTINEL.to_string(),
        }
    }

    pub fn decode(raw: &str) -> Self {
        if raw == ABSENT_SENTINEL || raw.is_empty() {
            CacheValue::Absent
        } else {
            CacheValue::Url(raw.to_string())
        }
    }

    pub fn from_outcome(outcome: &ResolvedLogo) -> Self {
        match outcome {
            ResolvedLogo::Found(url) => CacheValue::Url(url.clone()),
            ResolvedLogo::Missing => CacheValue::Absent,
        }
    }

    pub fn into_outcome(self) -> ResolvedLogo {
        match self {
            CacheValue::Url(url) => ResolvedLogo::Found(url),
            CacheValue::Absent => ResolvedLogo::Missing,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_key_carries_version_and_triple() {
        let request = LogoRequest::new(EntityKind::Series, "1399", "en");
        assert_eq!(request.storage_key(), "logo:v1:tv:1399:en");
        assert_eq!(request.entity_key(), "tv:1399");
    }

    #[test]
    fn format_detection_is_case_insensitive() {
        let svg = LogoCandidate {
            file_path: "/logo.SVG".to_string(),
            iso_639_1: None,
            vote_average: None,
            aspect_ratio: None,
        };
        assert_eq!(svg.format(), LogoFormat::Vector);
        assert_eq!(svg.rasterized_path(), "/logo.png");

        let png = LogoCandidate {
            file_path: "/logo.png".to_string(),
            iso_639_1: None,
            vote_average: None,
            aspect_ratio: None,
        };
        assert_eq!(png.format(), LogoFormat::Raster);
        assert_eq!(png.rasterized_path(), "/logo.png");
    }

    #[test]
    fn cache_value_round_trips_sentinel() {
        assert_eq!(CacheValue::Absent.encode(), "none");
        assert_eq!(CacheValue::decode("none"), CacheValue::Absent);
        assert_eq!(
            CacheValue::decode("https://img.example/a.png"),
            CacheValue::Url("https://img.example/a.png".to_string())
        );
        assert!(CacheValue::Absent.into_outcome().is_missing());
    }

    #[test]
    fn images_response_tolerates_missing_logos_array() {
        let parsed: ImagesResponse = serde_json::from_str("{}").unwrap();
        assert!(parsed.logos.is_empty());

        let parsed: ImagesResponse = serde_json::from_str(
            r#"{"logos":[{"file_path":"/a.png","iso_639_1":"en","vote_average":5.2}]}"#,
        )
        .unwrap();
        assert_eq!(parsed.logos.len(), 1);
        assert_eq!(parsed.logos[0].iso_639_1.as_deref(), Some("en"));
    }
}
