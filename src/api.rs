//! Metadata provider boundary
//!
//! [`ImagesApi`] is the seam the fetch queue and resolver talk through;
//! [`TmdbClient`] is the production implementation against the TMDB images
//! endpoint. Tests substitute their own implementations to script failures
//! and count calls.

use async_trait::async_trait;
use tracing::debug;

use crate::config::TmdbConfig;
use crate::errors::{ApiError, ApiResult};
use crate::models::{EntityKind, ImagesResponse, LogoCandidate};

/// Images lookup against a metadata provider
#[async_trait]
pub trait ImagesApi: Send + Sync {
    /// Fetch the logo candidates for one entity.
    ///
    /// `include_languages` is the comma-separated language filter passed to
    /// the provider, e.g. `uk,en,null`.
    async fn logo_candidates(
        &self,
        kind: EntityKind,
        id: &str,
        include_languages: &str,
    ) -> ApiResult<Vec<LogoCandidate>>;

    /// Displayable absolute URL for a candidate's asset path
    fn logo_url(&self, file_path: &str) -> String;

    /// Whether lookups can be issued at all. When false the resolver skips
    /// queueing and reports absence immediately.
    fn is_available(&self) -> bool {
        true
    }
}

/// TMDB-backed images client
pub struct TmdbClient {
    http: reqwest::Client,
    config: TmdbConfig,
}

impl TmdbClient {
    pub fn new(config: TmdbConfig) -> ApiResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(Self { http, config })
    }
}

#[async_trait]
impl ImagesApi for TmdbClient {
    async fn logo_candidates(
        &self,
        kind: EntityKind,
        id: &str,
        include_languages: &str,
    ) -> ApiResult<Vec<LogoCandidate>> {
        if !self.config.is_configured() {
            return Err(ApiError::not_configured("tmdb.api_key is empty"));
        }

        let url = self.config.images_url(kind, id, include_languages);
        let response = self.http.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(ApiError::Status {
                status: response.status().as_u16(),
                endpoint: self.config.images_endpoint(kind, id),
            });
        }

        let bytes = response.bytes().await?;
        let parsed: ImagesResponse = serde_json::from_slice(&bytes)?;
        debug!(
            entity = %format!("{kind}:{id}"),
            candidates = parsed.logos.len(),
            "images lookup completed"
        );
        Ok(parsed.logos)
    }

    fn logo_url(&self, file_path: &str) -> String {
        self.config.logo_url(file_path)
    }

    fn is_available(&self) -> bool {
        self.config.is_configured()
    }
}
