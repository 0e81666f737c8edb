//! Resolution facade
//!
//! [`LogoResolver`] ties the pieces together: direct extraction from the
//! entity record, the two-tier cache, and the serialized fetch queue. Every
//! path fails soft; callers always get a [`ResolvedLogo`], never an error,
//! because a missing logo must not break rendering.

use std::path::PathBuf;
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};

use crate::api::{ImagesApi, TmdbClient};
use crate::cache::{CacheLookup, CacheStore, JsonFileStore, KeyValueStore};
use crate::config::ResolverConfig;
use crate::errors::{ApiResult, LogoError};
use crate::extract;
use crate::fetch::FetchQueue;
use crate::models::{EntityKind, LogoRequest, ResolvedLogo};

/// Preference key for an explicit logo language override
const LOGO_LANGUAGE_KEY: &str = "logo_lang";
/// Preference key for the host UI language
const UI_LANGUAGE_KEY: &str = "language";

/// Per-entity logo resolver
pub struct LogoResolver {
    api: Arc<dyn ImagesApi>,
    cache: Arc<CacheStore>,
    queue: FetchQueue,
    /// Host preference store, also reused as the durable cache tier
    prefs: Option<Arc<dyn KeyValueStore>>,
    config: ResolverConfig,
}

impl LogoResolver {
    /// Build a resolver over an arbitrary images API and optional durable
    /// store. The store doubles as the durable cache tier (subject to
    /// `cache.durable_enabled`) and as the language preference source.
    pub fn new(
        api: Arc<dyn ImagesApi>,
        durable: Option<Arc<dyn KeyValueStore>>,
        config: ResolverConfig,
    ) -> Self {
        let durable_tier = if config.cache.durable_enabled {
            durable.clone()
        } else {
            None
        };
        let cache = Arc::new(CacheStore::new(durable_tier));
        let queue = FetchQueue::new(api.clone(), cache.clone(), config.queue.clone());

        Self {
            api,
            cache,
            queue,
            prefs: durable,
            config,
        }
    }

    /// Resolver over the production TMDB client
    pub fn with_tmdb(
        config: ResolverConfig,
        durable: Option<Arc<dyn KeyValueStore>>,
    ) -> ApiResult<Self> {
        let api = Arc::new(TmdbClient::new(config.tmdb.clone())?);
        Ok(Self::new(api, durable, config))
    }

    /// Resolver over the TMDB client with a JSON file as the durable store
    pub async fn from_config(
        config: ResolverConfig,
        cache_path: Option<PathBuf>,
    ) -> Result<Self, LogoError> {
        let durable: Option<Arc<dyn KeyValueStore>> = match cache_path {
            Some(path) => Some(Arc::new(JsonFileStore::open(path).await?)),
            None => None,
        };
        Ok(Self::with_tmdb(config, durable)?)
    }

    /// Resolve a logo for an entity record, consulting the cache first
    pub async fn resolve(&self, entity: &Value) -> ResolvedLogo {
        self.resolve_inner(entity, None, true).await
    }

    /// Resolve with an explicit language preference, bypassing the stored
    /// preferences (but not the cache)
    pub async fn resolve_with_language(&self, entity: &Value, language: &str) -> ResolvedLogo {
        self.resolve_inner(entity, Some(language), true).await
    }

    /// Re-resolve over the network even when a cached outcome exists. The
    /// fresh outcome overwrites the cached one.
    pub async fn refresh(&self, entity: &Value) -> ResolvedLogo {
        self.resolve_inner(entity, None, false).await
    }

    /// Logo reference embedded in the record itself, if any. No I/O.
    pub fn direct(&self, entity: &Value) -> Option<String> {
        extract::extract_direct(entity, &self.config.tmdb)
    }

    /// Language-independent token identifying the entity, e.g. `tv:1399`.
    /// Callers compare it across navigation to discard stale outcomes.
    pub fn entity_key(entity: &Value) -> Option<String> {
        let id = entity_id(entity)?;
        Some(format!("{}:{}", entity_kind(entity), id))
    }

    async fn resolve_inner(
        &self,
        entity: &Value,
        language_override: Option<&str>,
        use_cache: bool,
    ) -> ResolvedLogo {
        let Some(id) = entity_id(entity) else {
            debug!("entity record has no usable id, skipping resolution");
            return ResolvedLogo::Missing;
        };

        if !self.api.is_available() {
            debug!("images API unavailable, reporting missing");
            return ResolvedLogo::Missing;
        }

        if let Some(url) = self.direct(entity) {
            return ResolvedLogo::Found(url);
        }

        let language = match language_override {
            Some(language) => language.to_string(),
            None => self.effective_language().await,
        };
        let request = LogoRequest::new(entity_kind(entity), id, language);

        if use_cache {
            match self.cache.get(&request.storage_key()).await {
                CacheLookup::Hit(url) => return ResolvedLogo::Found(url),
                CacheLookup::Absent => return ResolvedLogo::Missing,
                CacheLookup::Miss => {}
            }
        }

        let rx = self.queue.submit(request.clone()).await;
        match rx.await {
            Ok(outcome) => outcome,
            Err(_) => {
                warn!(key = %request.storage_key(), "fetch queue dropped the request");
                ResolvedLogo::Missing
            }
        }
    }

    /// Preferred language: explicit logo preference, then the host UI
    /// language, then the configured default
    async fn effective_language(&self) -> String {
        if let Some(prefs) = &self.prefs {
            for key in [LOGO_LANGUAGE_KEY, UI_LANGUAGE_KEY] {
                match prefs.get(key).await {
                    Ok(Some(value)) if !value.trim().is_empty() => {
                        return value.trim().to_string();
                    }
                    Ok(_) => {}
                    Err(e) => {
                        debug!(key, error = %e, "preference read failed");
                    }
                }
            }
        }
        self.config.default_language.clone()
    }
}

/// Entity id, from a numeric or non-empty string `id` field
fn entity_id(entity: &Value) -> Option<String> {
    match entity.get("id") {
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim().to_string()),
        _ => None,
    }
}

/// Series records carry `name`, movie records carry `title`
fn entity_kind(entity: &Value) -> EntityKind {
    if entity.get("name").is_some() {
        EntityKind::Series
    } else {
        EntityKind::Movie
    }
}
