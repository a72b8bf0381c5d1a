//! folio - content and image plumbing for a personal site
//!
//! Loads MDX notes and projects from disk and resolves Unsplash photo
//! references into displayable images.
//!
//! # Architecture
//!
//! - Content is plain files with YAML frontmatter, looked up by slug
//! - Images resolve through a fallback chain: local manifest, cache, API,
//!   and finally the source URL itself
//! - Caching is two-tier: an in-process TTL map plus optional Redis
//!
//! # Modules
//!
//! - `content`: Frontmatter parsing and the directory loader
//! - `unsplash`: Photo ID extraction, manifest, API client, resolver
//! - `cache`: TTL map, remote store, tiered read-through cache
//! - `views`: Page view counters
//! - `cli`: Command-line interface
//!
//! # Usage
//!
//! ```bash
//! # List the newest notes
//! folio list notes --limit 5
//!
//! # Resolve a cover image
//! folio resolve https://unsplash.com/photos/green-trees-near-lake-Tx3f2s8Bq4A
//! ```

pub mod cache;
pub mod cli;
pub mod config;
pub mod content;
pub mod unsplash;
pub mod views;

// Re-export main types at crate root for convenience
pub use cache::{CacheTier, RemoteStore, TieredCache, TtlCache};
pub use content::{ContentEntry, ContentError, ContentKind, ContentLoader, Frontmatter, ListOptions};
pub use unsplash::{ImageOrigin, Manifest, ResolveError, ResolvedImage, Resolver};
pub use views::ViewCounter;
