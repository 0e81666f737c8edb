//! Configuration for the logo resolution engine
//!
//! All sections carry serde defaults so an empty file (or no file at all)
//! yields a working configuration; only `tmdb.api_key` has no usable default.

use anyhow::Result;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub mod duration_serde;

use crate::fetch::retry::RetryConfig;
use crate::models::EntityKind;

/// Top-level engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolverConfig {
    /// Language used when neither the request nor the stored preferences
    /// provide one
    #[serde(default = "default_language")]
    pub default_language: String,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub queue: QueueConfig,
    #[serde(default)]
    pub tmdb: TmdbConfig,
}

/// Cache tier configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// When false the durable tier is bypassed entirely and outcomes only
    /// live for the current session
    #[serde(default = "default_durable_enabled")]
    pub durable_enabled: bool,
}

/// Fetch queue configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueConfig {
    /// Pause between consecutive jobs, bounding the request rate against the
    /// metadata provider
    #[serde(default = "default_cooldown", with = "duration_serde::duration")]
    pub cooldown: Duration,
    /// Whether a fetch that failed every retry is cached as confirmed
    /// absence. Trades precision (an outage looks like "no logo" until the
    /// cache is rekeyed) for not hammering the provider from grid scans.
    #[serde(default = "default_cache_network_failures")]
    pub cache_network_failures: bool,
    #[serde(default)]
    pub retry: RetryConfig,
}

/// Metadata provider endpoints and asset sizing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TmdbConfig {
    #[serde(default = "default_api_base")]
    pub api_base: String,
    #[serde(default = "default_image_base")]
    pub image_base: String,
    /// Empty means "no metadata client available"; the resolver fails soft
    /// instead of queueing requests
    #[serde(default)]
    pub api_key: String,
    /// Size segment for logos fetched through the images endpoint
    #[serde(default = "default_logo_size")]
    pub logo_size: String,
    /// Size segment applied when expanding logo paths already embedded in an
    /// entity record
    #[serde(default = "default_embedded_logo_size")]
    pub embedded_logo_size: String,
    #[serde(
        default = "default_request_timeout",
        with = "duration_serde::duration"
    )]
    pub request_timeout: Duration,
}

fn default_language() -> String {
    "en".to_string()
}
fn default_durable_enabled() -> bool {
    true
}
fn default_cooldown() -> Duration {
    Duration::from_millis(120)
}
fn default_cache_network_failures() -> bool {
    true
}
fn default_api_base() -> String {
    "https://api.themoviedb.org/3".to_string()
}
fn default_image_base() -> String {
    "https://image.tmdb.org".to_string()
}
fn default_logo_size() -> String {
    "original".to_string()
}
fn default_embedded_logo_size() -> String {
    "w500".to_string()
}
fn default_request_timeout() -> Duration {
    Duration::from_secs(10)
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            default_language: default_language(),
            cache: CacheConfig::default(),
            queue: QueueConfig::default(),
            tmdb: TmdbConfig::default(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            durable_enabled: default_durable_enabled(),
        }
    }
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            cooldown: default_cooldown(),
            cache_network_failures: default_cache_network_failures(),
            retry: RetryConfig::default(),
        }
    }
}

impl Default for TmdbConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            image_base: default_image_base(),
            api_key: String::new(),
            logo_size: default_logo_size(),
            embedded_logo_size: default_embedded_logo_size(),
            request_timeout: default_request_timeout(),
        }
    }
}

impl ResolverConfig {
    /// Load configuration from defaults, an optional TOML file, and
    /// `CLEARLOGO_`-prefixed environment variables (highest precedence,
    /// `__` as the section separator)
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(ResolverConfig::default()));
        if let Some(path) = path {
            figment = figment.merge(Toml::file(path));
        }
        let config = figment
            .merge(Env::prefixed("CLEARLOGO_").split("__"))
            .extract()?;
        Ok(config)
    }
}

impl TmdbConfig {
    /// Whether enough is configured to issue images lookups
    pub fn is_configured(&self) -> bool {
        !self.api_key.trim().is_empty()
    }

    /// URL of the images-lookup endpoint for one entity
    pub fn images_url(&self, kind: EntityKind, id: &str, include_languages: &str) -> String {
        format!(
            "{}/{}/{}/images?api_key={}&include_image_language={}",
            sanitize_base(&self.api_base),
            kind.api_path(),
            id,
            self.api_key,
            include_languages
        )
    }

    /// Same endpoint without credentials, safe for logs and error messages
    pub fn images_endpoint(&self, kind: EntityKind, id: &str) -> String {
        format!(
            "{}/{}/{}/images",
            sanitize_base(&self.api_base),
            kind.api_path(),
            id
        )
    }

    /// Absolute asset URL at the configured logo size
    pub fn logo_url(&self, file_path: &str) -> String {
        self.image_url(&self.logo_size, file_path)
    }

    /// Absolute asset URL for a path found embedded in an entity record
    pub fn embedded_url(&self, file_path: &str) -> String {
        self.image_url(&self.embedded_logo_size, file_path)
    }

    fn image_url(&self, size: &str, file_path: &str) -> String {
        format!("{}/t/p/{}{}", sanitize_base(&self.image_base), size, file_path)
    }
}

/// Trim trailing slashes so base and path concatenate cleanly
fn sanitize_base(base: &str) -> &str {
    base.trim().trim_end_matches('/')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_usable_without_a_file() {
        let config = ResolverConfig::default();
        assert_eq!(config.default_language, "en");
        assert!(config.cache.durable_enabled);
        assert_eq!(config.queue.cooldown, Duration::from_millis(120));
        assert!(config.queue.cache_network_failures);
        assert!(!config.tmdb.is_configured());
    }

    #[test]
    fn toml_overrides_merge_over_defaults() {
        let config: ResolverConfig = Figment::from(Serialized::defaults(ResolverConfig::default()))
            .merge(Toml::string(
                r#"
                default_language = "uk"

                [queue]
                cooldown = "250ms"

                [tmdb]
                api_key = "secret"
                "#,
            ))
            .extract()
            .unwrap();

        assert_eq!(config.default_language, "uk");
        assert_eq!(config.queue.cooldown, Duration::from_millis(250));
        assert!(config.tmdb.is_configured());
        // untouched sections keep their defaults
        assert_eq!(config.tmdb.logo_size, "original");
    }

    #[test]
    fn url_builders_sanitize_bases() {
        let config = TmdbConfig {
            api_base: "https://api.example.com/3/".to_string(),
            image_base: "https://img.example.com/".to_string(),
            api_key: "k".to_string(),
            ..TmdbConfig::default()
        };

        assert_eq!(
            config.images_url(EntityKind::Movie, "603", "en,null"),
            "https://api.example.com/3/movie/603/images?api_key=k&include_image_language=en,null"
        );
        assert_eq!(
            config.images_endpoint(EntityKind::Series, "1399"),
            "https://api.example.com/3/tv/1399/images"
        );
        assert_eq!(
            config.logo_url("/a.png"),
            "https://img.example.com/t/p/original/a.png"
        );
        assert_eq!(
            config.embedded_url("/a.png"),
            "https://img.example.com/t/p/w500/a.png"
        );
    }
}
