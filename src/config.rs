//! Configuration for folio.
//!
//! Configuration sources (highest priority first):
//! 1. Environment variables (FOLIO_CONTENT, FOLIO_MANIFEST, UNSPLASH_ACCESS_KEY, REDIS_URL)
//! 2. Config file (.folio/config.yaml)
//! 3. Defaults (./content, ./public/images/unsplash/manifest.json)
//!
//! Config file discovery:
//! - Searches current directory and parents for .folio/config.yaml
//! - Paths in config file are relative to the project root (parent of .folio/)

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::content::ContentKind;

/// Global cached configuration (stores Result to handle init errors)
static CONFIG: OnceLock<Result<ResolvedConfig, String>> = OnceLock::new();

pub const DEFAULT_CONTENT_DIR: &str = "content";
pub const DEFAULT_MANIFEST_PATH: &str = "public/images/unsplash/manifest.json";
pub const DEFAULT_API_BASE: &str = "https://api.unsplash.com";
pub const DEFAULT_TTL_SECONDS: u64 = 3600;
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 10;
pub const DEFAULT_KEY_PREFIX: &str = "folio";

/// Raw config file schema (matches YAML structure)
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigFile {
    pub version: String,
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub unsplash: Option<UnsplashConfig>,
    #[serde(default)]
    pub cache: Option<CacheConfig>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PathsConfig {
    /// Content root (relative to project root)
    pub content: Option<String>,
    /// Unsplash manifest JSON (relative to project root)
    pub manifest: Option<String>,
    /// Content kind to subdirectory mapping
    #[serde(default)]
    pub kinds: HashMap<String, String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UnsplashConfig {
    pub access_key: Option<String>,
    pub api_base: Option<String>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    pub ttl_seconds: Option<u64>,
    pub redis_url: Option<String>,
    pub key_prefix: Option<String>,
}

/// Resolved configuration with absolute paths
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// Content root
    pub content: PathBuf,
    /// Content kind to subdirectory mapping
    pub kinds: HashMap<ContentKind, String>,
    /// Unsplash manifest path
    pub manifest: PathBuf,
    /// Path to config file (if found)
    pub config_file: Option<PathBuf>,
    pub unsplash: UnsplashSettings,
    pub cache: CacheSettings,
}

#[derive(Debug, Clone)]
pub struct UnsplashSettings {
    pub access_key: Option<String>,
    pub api_base: String,
    pub timeout: Duration,
}

impl Default for UnsplashSettings {
    fn default() -> Self {
        Self {
            access_key: None,
            api_base: DEFAULT_API_BASE.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECONDS),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CacheSettings {
    pub ttl: Duration,
    pub redis_url: Option<String>,
    pub key_prefix: String,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(DEFAULT_TTL_SECONDS),
            redis_url: None,
            key_prefix: DEFAULT_KEY_PREFIX.to_string(),
        }
    }
}

/// Find config file by searching a directory and its parents
fn find_config_file(start: &Path) -> Option<PathBuf> {
    let mut current = start.to_path_buf();

    loop {
        let config_path = current.join(".folio").join("config.yaml");
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            break;
        }
    }

    None
}

/// Load and parse config file
fn load_config_file(path: &Path) -> Result<ConfigFile> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    serde_yaml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

/// Resolve a path that may be relative to the project root or start with `~/`
fn resolve_path(base: &Path, path_str: &str) -> PathBuf {
    if let Some(rest) = path_str.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }

    let path = PathBuf::from(path_str);
    if path.is_absolute() {
        path
    } else {
        base.join(path)
    }
}

/// Keep only mapping keys that name a known content kind
fn parse_kinds(raw: &HashMap<String, String>) -> HashMap<ContentKind, String> {
    raw.iter()
        .filter_map(|(key, dir)| match key.parse::<ContentKind>() {
            Ok(kind) => Some((kind, dir.clone())),
            Err(_) => {
                tracing::warn!("Ignoring unknown content kind in config: {}", key);
                None
            }
        })
        .collect()
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Resolve configuration from an optional config file plus environment lookups
fn resolve(
    cwd: &Path,
    config_file: Option<PathBuf>,
    env: impl Fn(&str) -> Option<String>,
) -> Result<ResolvedConfig> {
    let file = config_file.as_deref().map(load_config_file).transpose()?;

    // Base directory is the parent of .folio/ (i.e., grandparent of config.yaml)
    let base_dir = config_file
        .as_deref()
        .and_then(|p| p.parent())
        .and_then(|p| p.parent())
        .unwrap_or(cwd)
        .to_path_buf();

    let paths = file.as_ref().map(|f| f.paths.clone()).unwrap_or_default();
    let unsplash = file.as_ref().and_then(|f| f.unsplash.clone());
    let cache = file.as_ref().and_then(|f| f.cache.clone());

    let content = match env("FOLIO_CONTENT") {
        Some(dir) => PathBuf::from(dir),
        None => resolve_path(
            &base_dir,
            paths.content.as_deref().unwrap_or(DEFAULT_CONTENT_DIR),
        ),
    };

    let manifest = match env("FOLIO_MANIFEST") {
        Some(path) => PathBuf::from(path),
        None => resolve_path(
            &base_dir,
            paths.manifest.as_deref().unwrap_or(DEFAULT_MANIFEST_PATH),
        ),
    };

    let unsplash = UnsplashSettings {
        access_key: non_empty(env("UNSPLASH_ACCESS_KEY"))
            .or_else(|| non_empty(unsplash.as_ref().and_then(|u| u.access_key.clone()))),
        api_base: unsplash
            .as_ref()
            .and_then(|u| u.api_base.clone())
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
        timeout: Duration::from_secs(
            unsplash
                .as_ref()
                .and_then(|u| u.timeout_seconds)
                .unwrap_or(DEFAULT_TIMEOUT_SECONDS),
        ),
    };

    let cache = CacheSettings {
        ttl: Duration::from_secs(
            cache
                .as_ref()
                .and_then(|c| c.ttl_seconds)
                .unwrap_or(DEFAULT_TTL_SECONDS),
        ),
        redis_url: non_empty(env("REDIS_URL"))
            .or_else(|| non_empty(cache.as_ref().and_then(|c| c.redis_url.clone()))),
        key_prefix: cache
            .as_ref()
            .and_then(|c| c.key_prefix.clone())
            .unwrap_or_else(|| DEFAULT_KEY_PREFIX.to_string()),
    };

    Ok(ResolvedConfig {
        content,
        kinds: parse_kinds(&paths.kinds),
        manifest,
        config_file,
        unsplash,
        cache,
    })
}

/// Load configuration from all sources
fn load_config() -> Result<ResolvedConfig> {
    let cwd = std::env::current_dir().context("Failed to determine current directory")?;
    let config_file = find_config_file(&cwd);
    resolve(&cwd, config_file, |key| std::env::var(key).ok())
}

/// Get the global configuration (loads once, then cached)
pub fn config() -> Result<&'static ResolvedConfig> {
    let result = CONFIG.get_or_init(|| load_config().map_err(|e| e.to_string()));

    match result {
        Ok(config) => Ok(config),
        Err(e) => anyhow::bail!("{}", e),
    }
}

/// Force reload configuration (useful for testing)
pub fn reload_config() -> Result<ResolvedConfig> {
    load_config()
}
