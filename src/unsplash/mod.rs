//! Unsplash image resolution.
//!
//! A source string (photo page URL, CDN URL, or bare ID) is turned into a
//! displayable image by walking a fallback chain:
//!
//! 1. Local manifest (assets downloaded at build time)
//! 2. Tiered cache of earlier API responses
//! 3. Unsplash API
//! 4. The source URL itself
//!
//! # Modules
//!
//! - `source`: ID extraction from URLs
//! - `manifest`: generated JSON index of local assets
//! - `client`: Unsplash REST client
//! - `resolver`: the fallback chain

pub mod client;
pub mod manifest;
pub mod resolver;
pub mod source;

use anyhow::Result;
use async_trait::async_trait;

pub use client::{UnsplashClient, UnsplashPhoto};
pub use manifest::{Manifest, ManifestEntry};
pub use resolver::{Attribution, ImageOrigin, ResolveError, ResolvedImage, Resolver};
pub use source::{parse_source, PhotoId, UnsplashRef};

/// Anything that can look up photo metadata by ID
#[async_trait]
pub trait PhotoSource: Send + Sync {
    /// Human-readable source name
    fn name(&self) -> &str;

    /// Fetch a single photo
    async fn fetch_photo(&self, id: &PhotoId) -> Result<UnsplashPhoto>;
}
