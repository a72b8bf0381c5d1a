//! Fallback chain from a source string to a displayable image.

use std::sync::Arc;

use futures::future::join_all;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::client::{UnsplashClient, UnsplashPhoto};
use super::manifest::{Manifest, ManifestEntry};
use super::source::{parse_source, PhotoId, UnsplashRef};
use super::PhotoSource;
use crate::cache::{connect_remote, CacheTier, TieredCache};
use crate::config::ResolvedConfig;

/// Errors from [`Resolver::resolve`]
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("Not an Unsplash photo URL or ID: {0}")]
    UnrecognizedSource(String),

    #[error("Photo {id} is not available: {reason}")]
    Unavailable { id: String, reason: String },
}

/// Where a resolved image came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageOrigin {
    /// Local asset listed in the manifest
    Local,

    /// Earlier API response held in memory or the remote store
    Cache,

    /// Fresh API response
    Remote,

    /// Source string passed through unchanged
    Fallback,
}

impl std::fmt::Display for ImageOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ImageOrigin::Local => "local",
            ImageOrigin::Cache => "cache",
            ImageOrigin::Remote => "remote",
            ImageOrigin::Fallback => "fallback",
        };
        f.pad(name)
    }
}

/// Photographer credit
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Attribution {
    pub name: String,
    pub url: Option<String>,
}

/// An image ready for rendering
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedImage {
    /// Photo ID or CDN key; the raw input for fallbacks
    pub key: String,
    pub src: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub alt: Option<String>,
    pub color: Option<String>,
    pub blur_hash: Option<String>,
    pub attribution: Option<Attribution>,
    pub origin: ImageOrigin,
}

impl ResolvedImage {
    fn from_manifest(key: &str, entry: &ManifestEntry) -> Self {
        Self {
            key: key.to_string(),
            src: entry.local_path.clone(),
            width: entry.width,
            height: entry.height,
            alt: entry.alt.clone(),
            color: entry.color.clone(),
            blur_hash: entry.blur_hash.clone(),
            attribution: entry.photographer.as_ref().map(|name| Attribution {
                name: name.clone(),
                url: entry.photographer_url.clone(),
            }),
            origin: ImageOrigin::Local,
        }
    }

    fn from_photo(photo: &UnsplashPhoto, origin: ImageOrigin) -> Self {
        Self {
            key: photo.id.clone(),
            src: photo.urls.regular.clone(),
            width: Some(photo.width),
            height: Some(photo.height),
            alt: photo.alt().map(String::from),
            color: photo.color.clone(),
            blur_hash: photo.blur_hash.clone(),
            attribution: Some(Attribution {
                name: photo.user.name.clone(),
                url: photo.user.links.as_ref().map(|l| l.html.clone()),
            }),
            origin,
        }
    }

    /// Pass the source through untouched
    pub fn fallback(source: &str) -> Self {
        Self {
            key: source.to_string(),
            src: source.to_string(),
            width: None,
            height: None,
            alt: None,
            color: None,
            blur_hash: None,
            attribution: None,
            origin: ImageOrigin::Fallback,
        }
    }
}

/// Resolves Unsplash sources through manifest, cache, and API
pub struct Resolver {
    manifest: Manifest,
    cache: TieredCache<UnsplashPhoto>,
    source: Option<Arc<dyn PhotoSource>>,
}

impl Resolver {
    /// Resolver without an API source
    pub fn new(manifest: Manifest, cache: TieredCache<UnsplashPhoto>) -> Self {
        Self {
            manifest,
            cache,
            source: None,
        }
    }

    /// Enable API lookups
    pub fn with_source(mut self, source: Arc<dyn PhotoSource>) -> Self {
        self.source = Some(source);
        self
    }

    /// Build from configuration.
    ///
    /// Missing pieces degrade instead of failing: no manifest means an empty
    /// one, an unreachable Redis means memory-only caching, and no access key
    /// (or `offline`) means no API tier.
    pub async fn from_config(config: &ResolvedConfig, offline: bool) -> Self {
        let manifest = Manifest::load_or_empty(&config.manifest).await;
        info!(photos = manifest.len(), "Loaded Unsplash manifest");

        let mut cache = TieredCache::new(config.cache.ttl, config.cache.key_prefix.clone());
        if let Some(store) = connect_remote(&config.cache).await {
            cache = cache.with_remote(store);
        }

        let resolver = Self::new(manifest, cache);
        if offline {
            return resolver;
        }

        match UnsplashClient::new(&config.unsplash) {
            Ok(client) => resolver.with_source(Arc::new(client)),
            Err(e) => {
                warn!("Unsplash API lookups disabled: {:#}", e);
                resolver
            }
        }
    }

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    /// Resolve a source, stopping at the first tier that answers
    pub async fn resolve(&self, input: &str) -> Result<ResolvedImage, ResolveError> {
        let reference = parse_source(input)
            .ok_or_else(|| ResolveError::UnrecognizedSource(input.to_string()))?;

        if let Some(entry) = self.manifest.lookup(reference.key()) {
            debug!(key = reference.key(), "Resolved from manifest");
            return Ok(ResolvedImage::from_manifest(reference.key(), entry));
        }

        match reference {
            // CDN URLs are already displayable and have no API lookup
            UnsplashRef::Image(key) => {
                debug!(%key, "CDN image not in manifest, using source URL");
                let mut image = ResolvedImage::fallback(input.trim());
                image.key = key;
                Ok(image)
            }
            UnsplashRef::Photo(id) => self.resolve_photo(&id).await,
        }
    }

    /// Resolve a source, falling back to the input itself on any error
    pub async fn resolve_or_fallback(&self, input: &str) -> ResolvedImage {
        match self.resolve(input).await {
            Ok(image) => image,
            Err(e) => {
                warn!("{}; using source as-is", e);
                ResolvedImage::fallback(input.trim())
            }
        }
    }

    /// Resolve several sources concurrently, preserving input order
    pub async fn resolve_many<S: AsRef<str>>(&self, inputs: &[S]) -> Vec<ResolvedImage> {
        join_all(
            inputs
                .iter()
                .map(|input| self.resolve_or_fallback(input.as_ref())),
        )
        .await
    }

    async fn resolve_photo(&self, id: &PhotoId) -> Result<ResolvedImage, ResolveError> {
        let cache_key = format!("unsplash:photo:{}", id);
        let source = self.source.clone();

        let cached = self
            .cache
            .get_or_fetch(&cache_key, || async move {
                match source {
                    Some(source) => source.fetch_photo(id).await,
                    None => anyhow::bail!("no photo source configured"),
                }
            })
            .await
            .map_err(|e| ResolveError::Unavailable {
                id: id.to_string(),
                reason: format!("{:#}", e),
            })?;

        let origin = match cached.tier {
            CacheTier::Memory | CacheTier::Remote => ImageOrigin::Cache,
            CacheTier::Fresh => ImageOrigin::Remote,
        };
        debug!(%id, %origin, "Resolved photo");

        Ok(ResolvedImage::from_photo(&cached.value, origin))
    }
}
