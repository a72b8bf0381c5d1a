//! Generated manifest of locally downloaded Unsplash photos.
//!
//! The download tooling writes `manifest.json` next to the images; this
//! module only reads it.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::fs;

/// Index of photos available as local assets, keyed by photo ID or CDN key
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    #[serde(default)]
    pub version: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub photos: BTreeMap<String, ManifestEntry>,
}

/// A single locally cached photo
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestEntry {
    /// Public path of the asset, e.g. `/images/unsplash/<id>.jpg`
    pub local_path: String,

    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default)]
    pub alt: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub blur_hash: Option<String>,
    #[serde(default)]
    pub photographer: Option<String>,
    #[serde(default)]
    pub photographer_url: Option<String>,
    #[serde(default)]
    pub source_url: Option<String>,
}

impl Manifest {
    /// Load a manifest. A missing file is an empty manifest.
    pub async fn load(path: &Path) -> Result<Self> {
        let content = match fs::read_to_string(path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("No manifest at {}", path.display());
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("Failed to read manifest: {}", path.display()))
            }
        };

        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse manifest: {}", path.display()))
    }

    /// Load a manifest, logging and falling back to empty on any error
    pub async fn load_or_empty(path: &Path) -> Self {
        match Self::load(path).await {
            Ok(manifest) => manifest,
            Err(e) => {
                tracing::warn!("Ignoring manifest: {:#}", e);
                Self::default()
            }
        }
    }

    pub fn lookup(&self, key: &str) -> Option<&ManifestEntry> {
        self.photos.get(key)
    }

    pub fn len(&self) -> usize {
        self.photos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.photos.is_empty()
    }
}
