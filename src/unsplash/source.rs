//! Recognising Unsplash photo references in URLs and bare IDs.

use std::sync::LazyLock;

use regex::Regex;
use reqwest::Url;
use serde::{Deserialize, Serialize};

/// Exactly one photo ID
static PHOTO_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]{11}$").expect("valid photo id regex"));

/// Photo page segment: `<id>` or `<words>-<id>`
static PHOTO_SEGMENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:.*-)?([A-Za-z0-9_-]{11})$").expect("valid photo segment regex")
});

/// CDN asset key such as `photo-1506744038136-46273834b3fb`
static IMAGE_KEY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:premium_)?photo-[0-9]+-[0-9a-f]+$").expect("valid image key regex")
});

const PHOTO_HOSTS: [&str; 2] = ["unsplash.com", "www.unsplash.com"];
const IMAGE_HOSTS: [&str; 2] = ["images.unsplash.com", "plus.unsplash.com"];

/// Path segments that introduce a photo page, including localised ones
const PHOTO_SEGMENTS: [&str; 2] = ["photos", "fotos"];

/// Unsplash photo identifier (11 characters of `[A-Za-z0-9_-]`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PhotoId(String);

impl PhotoId {
    pub fn parse(s: &str) -> Option<Self> {
        PHOTO_ID_RE.is_match(s).then(|| Self(s.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for PhotoId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// What an input string refers to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnsplashRef {
    /// A photo page or bare ID, resolvable through the API
    Photo(PhotoId),

    /// A direct CDN asset key, which has no API lookup
    Image(String),
}

impl UnsplashRef {
    /// Key used for manifest and cache lookups
    pub fn key(&self) -> &str {
        match self {
            UnsplashRef::Photo(id) => id.as_str(),
            UnsplashRef::Image(key) => key,
        }
    }
}

/// Extract an Unsplash reference from a URL or bare photo ID
pub fn parse_source(input: &str) -> Option<UnsplashRef> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    if let Some(id) = PhotoId::parse(input) {
        return Some(UnsplashRef::Photo(id));
    }

    let url = parse_url(input)?;
    let host = url.host_str()?.to_ascii_lowercase();
    let mut segments = url.path_segments()?.filter(|s| !s.is_empty());

    if PHOTO_HOSTS.contains(&host.as_str()) {
        // Optional locale prefix, e.g. /de/fotos/<slug>
        let segment = segments
            .skip_while(|s| !PHOTO_SEGMENTS.contains(s))
            .nth(1)?;
        let id = PHOTO_SEGMENT_RE.captures(segment)?.get(1)?.as_str();
        return PhotoId::parse(id).map(UnsplashRef::Photo);
    }

    if IMAGE_HOSTS.contains(&host.as_str()) {
        let key = segments.next()?;
        return IMAGE_KEY_RE
            .is_match(key)
            .then(|| UnsplashRef::Image(key.to_string()));
    }

    None
}

/// Parse with or without a scheme
fn parse_url(input: &str) -> Option<Url> {
    match Url::parse(input) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Some(url),
        Ok(_) => None,
        Err(_) => Url::parse(&format!("https://{}", input)).ok(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn photo(id: &str) -> Option<UnsplashRef> {
        Some(UnsplashRef::Photo(PhotoId(id.to_string())))
    }

    #[test]
    fn test_bare_id() {
        assert_eq!(parse_source("Tx3f2s8Bq4A"), photo("Tx3f2s8Bq4A"));
        assert_eq!(parse_source("  abc_DEF-123 "), photo("abc_DEF-123"));
        assert_eq!(parse_source("tooshort"), None);
    }

    #[test]
    fn test_photo_page_urls() {
        assert_eq!(
            parse_source("https://unsplash.com/photos/green-trees-near-lake-Tx3f2s8Bq4A"),
            photo("Tx3f2s8Bq4A")
        );
        assert_eq!(
            parse_source("https://unsplash.com/photos/Tx3f2s8Bq4A"),
            photo("Tx3f2s8Bq4A")
        );
        assert_eq!(
            parse_source("https://www.unsplash.com/photos/lake-abc_DEF-123/download?force=true"),
            photo("abc_DEF-123")
        );
        assert_eq!(
            parse_source("unsplash.com/photos/mountain-Tx3f2s8Bq4A#info"),
            photo("Tx3f2s8Bq4A")
        );
    }

    #[test]
    fn test_localised_photo_page() {
        assert_eq!(
            parse_source("https://unsplash.com/de/fotos/ein-see-Tx3f2s8Bq4A"),
            photo("Tx3f2s8Bq4A")
        );
    }

    #[test]
    fn test_cdn_urls() {
        assert_eq!(
            parse_source(
                "https://images.unsplash.com/photo-1506744038136-46273834b3fb?w=1200&q=80"
            ),
            Some(UnsplashRef::Image(
                "photo-1506744038136-46273834b3fb".to_string()
            ))
        );
        assert_eq!(
            parse_source("https://plus.unsplash.com/premium_photo-1661963952208-2db3512ef3de"),
            Some(UnsplashRef::Image(
                "premium_photo-1661963952208-2db3512ef3de".to_string()
            ))
        );
        assert_eq!(
            parse_source("https://images.unsplash.com/profile-1234"),
            None
        );
    }

    #[test]
    fn test_unrecognised_sources() {
        assert_eq!(parse_source(""), None);
        assert_eq!(parse_source("https://example.com/photos/Tx3f2s8Bq4A"), None);
        assert_eq!(parse_source("https://unsplash.com/@someone"), None);
        assert_eq!(parse_source("https://unsplash.com/photos/"), None);
        assert_eq!(parse_source("ftp://unsplash.com/photos/Tx3f2s8Bq4A"), None);
        assert_eq!(parse_source("/images/local.jpg"), None);
    }

    #[test]
    fn test_ref_key() {
        let r = parse_source("Tx3f2s8Bq4A").unwrap();
        assert_eq!(r.key(), "Tx3f2s8Bq4A");
    }
}
