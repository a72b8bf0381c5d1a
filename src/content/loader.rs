//! Directory-backed content loader.
//!
//! Lookups go straight to `<dir>/<slug>.mdx` (then `.md`); listings scan the
//! whole directory and sort newest first.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Serialize;
use sha2::{Digest, Sha256};
use tokio::fs;
use tracing::{debug, warn};

use super::frontmatter::{parse_document, Frontmatter};
use super::{ContentError, ContentKind};

/// Extensions recognised as content, in lookup priority order
const EXTENSIONS: [&str; 2] = ["mdx", "md"];

const WORDS_PER_MINUTE: usize = 200;

/// A parsed content file
#[derive(Debug, Clone, Serialize)]
pub struct ContentEntry {
    pub kind: ContentKind,

    /// File stem, used for routing and lookup
    pub slug: String,

    pub frontmatter: Frontmatter,

    /// Raw MDX/Markdown after the frontmatter block
    pub body: String,

    /// Source file on disk
    pub path: PathBuf,

    pub word_count: usize,

    /// Estimated reading time, at least one minute
    pub reading_minutes: usize,

    /// SHA256(file)[0:16]
    pub digest: String,
}

impl ContentEntry {
    /// Build an entry from a file's raw contents
    pub fn from_raw(
        kind: ContentKind,
        slug: impl Into<String>,
        path: impl Into<PathBuf>,
        raw: &str,
    ) -> Result<Self, ContentError> {
        let (frontmatter, body) = parse_document(raw)?;

        let word_count = body.split_whitespace().count();
        let reading_minutes = word_count.div_ceil(WORDS_PER_MINUTE).max(1);

        let mut hasher = Sha256::new();
        hasher.update(raw.as_bytes());
        let digest = hex::encode(&hasher.finalize()[..8]);

        Ok(Self {
            kind,
            slug: slug.into(),
            frontmatter,
            body,
            path: path.into(),
            word_count,
            reading_minutes,
            digest,
        })
    }

    /// Whether the entry carries the tag (case-insensitive)
    pub fn has_tag(&self, tag: &str) -> bool {
        self.frontmatter
            .tags
            .iter()
            .any(|t| t.eq_ignore_ascii_case(tag))
    }
}

/// Options for [`ContentLoader::list`]
#[derive(Debug, Clone, Default)]
pub struct ListOptions {
    /// Include entries marked `draft: true`
    pub include_drafts: bool,

    /// Only entries carrying this tag
    pub tag: Option<String>,

    /// Maximum number of entries, applied after sorting
    pub limit: Option<usize>,
}

/// Derive a slug from a content file path.
///
/// Returns `None` for files that are not `.mdx` or `.md`.
pub fn slug_from_path(path: &Path) -> Option<String> {
    let ext = path.extension()?.to_str()?;
    if !EXTENSIONS.contains(&ext) {
        return None;
    }
    let stem = path.file_stem()?.to_str()?;
    if stem.is_empty() {
        return None;
    }
    Some(stem.to_string())
}

/// Reject slugs that could escape the content directory
pub fn validate_slug(slug: &str) -> Result<(), ContentError> {
    if slug.is_empty()
        || slug.starts_with('.')
        || slug.contains('/')
        || slug.contains('\\')
        || slug.contains("..")
    {
        return Err(ContentError::InvalidSlug(slug.to_string()));
    }
    Ok(())
}

/// Loads notes and projects from a content root
#[derive(Debug, Clone)]
pub struct ContentLoader {
    root: PathBuf,
    kind_dirs: HashMap<ContentKind, PathBuf>,
}

impl ContentLoader {
    /// Create a loader using the default subdirectory for each kind
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            kind_dirs: HashMap::new(),
        }
    }

    /// Create a loader from resolved configuration
    pub fn from_config(config: &crate::config::ResolvedConfig) -> Self {
        config
            .kinds
            .iter()
            .fold(Self::new(&config.content), |loader, (kind, dir)| {
                loader.with_kind_dir(*kind, dir)
            })
    }

    /// Override the directory for a kind (relative paths resolve against the root)
    pub fn with_kind_dir(mut self, kind: ContentKind, dir: impl Into<PathBuf>) -> Self {
        self.kind_dirs.insert(kind, dir.into());
        self
    }

    /// Content root
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding entries of a kind
    pub fn dir(&self, kind: ContentKind) -> PathBuf {
        match self.kind_dirs.get(&kind) {
            Some(dir) => self.root.join(dir),
            None => self.root.join(kind.default_dir()),
        }
    }

    /// Look up a single entry by slug. Drafts are returned.
    pub async fn get(&self, kind: ContentKind, slug: &str) -> Result<ContentEntry, ContentError> {
        validate_slug(slug)?;
        let dir = self.dir(kind);

        for ext in EXTENSIONS {
            let path = dir.join(format!("{}.{}", slug, ext));
            match fs::read_to_string(&path).await {
                Ok(raw) => {
                    debug!(%kind, slug, path = %path.display(), "Loaded content entry");
                    return ContentEntry::from_raw(kind, slug, path, &raw);
                }
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(source) => return Err(ContentError::Io { path, source }),
            }
        }

        Err(ContentError::NotFound {
            kind,
            slug: slug.to_string(),
        })
    }

    /// List entries newest first (ties by slug ascending).
    ///
    /// A missing directory yields an empty list; files that fail to parse are
    /// skipped with a warning.
    pub async fn list(
        &self,
        kind: ContentKind,
        options: &ListOptions,
    ) -> Result<Vec<ContentEntry>, ContentError> {
        let dir = self.dir(kind);
        let files = match self.scan(&dir).await {
            Ok(files) => files,
            Err(ContentError::Io { source, .. }) if source.kind() == std::io::ErrorKind::NotFound => {
                debug!(%kind, dir = %dir.display(), "Content directory does not exist");
                return Ok(Vec::new());
            }
            Err(e) => return Err(e),
        };

        let mut entries = Vec::with_capacity(files.len());
        for (slug, path) in files {
            let raw = match fs::read_to_string(&path).await {
                Ok(raw) => raw,
                Err(e) => {
                    warn!("Failed to read {}: {}", path.display(), e);
                    continue;
                }
            };

            match ContentEntry::from_raw(kind, slug, &path, &raw) {
                Ok(entry) => entries.push(entry),
                Err(e) => warn!("Skipping {}: {}", path.display(), e),
            }
        }

        entries.retain(|entry| {
            (options.include_drafts || !entry.frontmatter.draft)
                && options.tag.as_deref().map_or(true, |tag| entry.has_tag(tag))
        });

        entries.sort_by(|a, b| {
            b.frontmatter
                .date
                .cmp(&a.frontmatter.date)
                .then_with(|| a.slug.cmp(&b.slug))
        });

        if let Some(limit) = options.limit {
            entries.truncate(limit);
        }

        Ok(entries)
    }

    /// Tag counts over published entries, most used first
    pub async fn tags(&self, kind: ContentKind) -> Result<Vec<(String, usize)>, ContentError> {
        let entries = self.list(kind, &ListOptions::default()).await?;

        let mut counts: HashMap<String, usize> = HashMap::new();
        for entry in &entries {
            for tag in &entry.frontmatter.tags {
                *counts.entry(tag.to_lowercase()).or_default() += 1;
            }
        }

        let mut tags: Vec<_> = counts.into_iter().collect();
        tags.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        Ok(tags)
    }

    /// Neighbours of a published entry in listing order: (newer, older)
    pub async fn adjacent(
        &self,
        kind: ContentKind,
        slug: &str,
    ) -> Result<(Option<ContentEntry>, Option<ContentEntry>), ContentError> {
        validate_slug(slug)?;
        let mut entries = self.list(kind, &ListOptions::default()).await?;

        let pos = entries
            .iter()
            .position(|e| e.slug == slug)
            .ok_or_else(|| ContentError::NotFound {
                kind,
                slug: slug.to_string(),
            })?;

        let older = (pos + 1 < entries.len()).then(|| entries.remove(pos + 1));
        let newer = (pos > 0).then(|| entries.swap_remove(pos - 1));

        Ok((newer, older))
    }

    /// Map slug -> file, preferring `.mdx` over `.md`
    async fn scan(&self, dir: &Path) -> Result<HashMap<String, PathBuf>, ContentError> {
        let io_err = |source: std::io::Error| ContentError::Io {
            path: dir.to_path_buf(),
            source,
        };

        let mut files: HashMap<String, PathBuf> = HashMap::new();
        let mut entries = fs::read_dir(dir).await.map_err(io_err)?;

        while let Some(entry) = entries.next_entry().await.map_err(io_err)? {
            let path = entry.path();
            let Some(slug) = slug_from_path(&path) else {
                continue;
            };
            // Follows symlinks, matching what `get` opens
            match fs::metadata(&path).await {
                Ok(meta) if meta.is_file() => {}
                Ok(_) => continue,
                Err(e) => {
                    warn!("Skipping unreadable entry {}: {}", path.display(), e);
                    continue;
                }
            }

            let is_mdx = path.extension().is_some_and(|e| e == "mdx");
            match files.get(&slug) {
                Some(existing) if existing.extension().is_some_and(|e| e == "mdx") && !is_mdx => {}
                _ => {
                    files.insert(slug, path);
                }
            }
        }

        Ok(files)
    }
}
