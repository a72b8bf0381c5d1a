//! MDX/Markdown content for notes and projects.
//!
//! # Storage Layout
//!
//! ```text
//! content/
//! ├── notes/
//! │   ├── hello-world.mdx      # slug: hello-world
//! │   └── rust-tips.md         # slug: rust-tips
//! └── projects/
//!     └── folio.mdx
//! ```
//!
//! Each file starts with a YAML frontmatter block fenced by `---` lines,
//! followed by the body.

pub mod frontmatter;
pub mod loader;

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use frontmatter::{parse_document, Frontmatter};
pub use loader::{slug_from_path, validate_slug, ContentEntry, ContentLoader, ListOptions};

/// Errors that can occur while loading content
#[derive(Debug, Error)]
pub enum ContentError {
    #[error("No {kind} entry with slug '{slug}'")]
    NotFound { kind: ContentKind, slug: String },

    #[error("Invalid slug: {0:?}")]
    InvalidSlug(String),

    #[error("Document has no frontmatter block")]
    MissingFrontmatter,

    #[error("Frontmatter block is not closed with '---'")]
    UnterminatedFrontmatter,

    #[error("Invalid frontmatter: {0}")]
    InvalidFrontmatter(String),

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl From<serde_yaml::Error> for ContentError {
    fn from(e: serde_yaml::Error) -> Self {
        ContentError::InvalidFrontmatter(e.to_string())
    }
}

/// Kind of content collection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    /// Short-form writing
    Note,

    /// Project write-ups
    Project,
}

impl ContentKind {
    /// All known kinds
    pub const ALL: [ContentKind; 2] = [ContentKind::Note, ContentKind::Project];

    /// Default subdirectory under the content root
    pub fn default_dir(self) -> &'static str {
        match self {
            ContentKind::Note => "notes",
            ContentKind::Project => "projects",
        }
    }
}

impl std::fmt::Display for ContentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.default_dir())
    }
}

impl std::str::FromStr for ContentKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.to_lowercase().as_str() {
            "note" | "notes" => Ok(ContentKind::Note),
            "project" | "projects" => Ok(ContentKind::Project),
            _ => anyhow::bail!("Unknown content kind: {}", s),
        }
    }
}
