//! clearlogo — per-entity logo resolution for media catalogs
//!
//! Resolves a displayable logo URL for movie and series records: probes the
//! record itself for an embedded reference, falls back to a two-tier cache,
//! and only then queries the metadata provider through a serialized,
//! rate-limited fetch queue with in-flight coalescing. Confirmed absence is
//! cached too, so grids full of logo-less titles do not re-query the provider
//! on every render.
//!
//! ```no_run
//! use clearlogo::{LogoResolver, ResolvedLogo};
//! use clearlogo::config::ResolverConfig;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = ResolverConfig::load(None)?;
//! let resolver = LogoResolver::from_config(config, None).await?;
//!
//! let entity = serde_json::json!({ "id": 603, "title": "The Matrix" });
//! match resolver.resolve(&entity).await {
//!     ResolvedLogo::Found(url) => println!("logo: {url}"),
//!     ResolvedLogo::Missing => println!("no logo"),
//! }
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod cache;
pub mod config;
pub mod errors;
pub mod extract;
pub mod fetch;
pub mod models;
pub mod ranker;
pub mod resolver;
pub mod utils;

pub use models::ResolvedLogo;
pub use resolver::LogoResolver;
