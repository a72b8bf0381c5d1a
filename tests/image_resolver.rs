//! Image Resolver Integration Tests
//!
//! Tests for the manifest -> cache -> API -> fallback chain.

mod common;

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use common::{FailingStore, FakeUnsplash, MemoryStore};
use folio::cache::TieredCache;
use folio::unsplash::{ImageOrigin, Manifest, ManifestEntry, ResolveError, Resolver};

const PHOTO_URL: &str = "https://unsplash.com/photos/green-trees-near-lake-Tx3f2s8Bq4A";
const LOCAL_ID: &str = "LocalPhoto1";
const CDN_URL: &str = "https://images.unsplash.com/photo-1506744038136-46273834b3fb?w=1200";

fn manifest() -> Manifest {
    let mut photos = BTreeMap::new();
    photos.insert(
        LOCAL_ID.to_string(),
        ManifestEntry {
            local_path: format!("/images/unsplash/{}.jpg", LOCAL_ID),
            width: Some(1600),
            height: Some(900),
            alt: Some("desk setup".to_string()),
            color: None,
            blur_hash: None,
            photographer: Some("Sam Roe".to_string()),
            photographer_url: Some("https://unsplash.com/@sam".to_string()),
            source_url: None,
        },
    );
    Manifest {
        version: 1,
        generated_at: None,
        photos,
    }
}

fn cache() -> TieredCache<folio::unsplash::UnsplashPhoto> {
    TieredCache::new(Duration::from_secs(3600), "folio")
}

#[tokio::test]
async fn test_manifest_hit_skips_api() {
    let api = Arc::new(FakeUnsplash::default());
    let resolver = Resolver::new(manifest(), cache()).with_source(api.clone());

    let image = resolver
        .resolve(&format!("https://unsplash.com/photos/desk-{}", LOCAL_ID))
        .await
        .unwrap();

    assert_eq!(image.origin, ImageOrigin::Local);
    assert_eq!(image.src, "/images/unsplash/LocalPhoto1.jpg");
    assert_eq!(image.width, Some(1600));
    assert_eq!(image.attribution.unwrap().name, "Sam Roe");
    assert_eq!(api.calls(), 0);
}

#[tokio::test]
async fn test_api_result_is_cached() {
    let api = Arc::new(FakeUnsplash::default());
    let resolver = Resolver::new(manifest(), cache()).with_source(api.clone());

    let first = resolver.resolve(PHOTO_URL).await.unwrap();
    assert_eq!(first.origin, ImageOrigin::Remote);
    assert_eq!(first.key, "Tx3f2s8Bq4A");
    assert_eq!(first.src, "https://images.unsplash.com/Tx3f2s8Bq4A?w=1080");
    assert_eq!(first.alt.as_deref(), Some("green trees near lake"));

    // Same photo through a different URL form
    let second = resolver.resolve("Tx3f2s8Bq4A").await.unwrap();
    assert_eq!(second.origin, ImageOrigin::Cache);
    assert_eq!(second.src, first.src);

    assert_eq!(api.calls(), 1);
}

#[tokio::test]
async fn test_remote_tier_shared_between_resolvers() {
    let store = Arc::new(MemoryStore::default());

    let api = Arc::new(FakeUnsplash::default());
    let resolver = Resolver::new(manifest(), cache().with_remote(store.clone()))
        .with_source(api.clone());
    resolver.resolve(PHOTO_URL).await.unwrap();

    let key = "folio:unsplash:photo:Tx3f2s8Bq4A";
    assert!(store.value(key).is_some());
    assert_eq!(
        store.ttls.lock().unwrap().get(key),
        Some(&Duration::from_secs(3600))
    );

    // A fresh process with an empty memory tier reads from the remote store
    let other_api = Arc::new(FakeUnsplash::default());
    let other = Resolver::new(manifest(), cache().with_remote(store.clone()))
        .with_source(other_api.clone());
    let image = other.resolve(PHOTO_URL).await.unwrap();

    assert_eq!(image.origin, ImageOrigin::Cache);
    assert_eq!(other_api.calls(), 0);
}

#[tokio::test]
async fn test_failing_remote_store_does_not_break_resolution() {
    let api = Arc::new(FakeUnsplash::default());
    let resolver = Resolver::new(manifest(), cache().with_remote(Arc::new(FailingStore)))
        .with_source(api.clone());

    let image = resolver.resolve(PHOTO_URL).await.unwrap();
    assert_eq!(image.origin, ImageOrigin::Remote);

    // Memory tier still works
    let again = resolver.resolve(PHOTO_URL).await.unwrap();
    assert_eq!(again.origin, ImageOrigin::Cache);
    assert_eq!(api.calls(), 1);
}

#[tokio::test]
async fn test_api_failure_is_not_cached() {
    let api = Arc::new(FakeUnsplash::failing());
    let resolver = Resolver::new(manifest(), cache()).with_source(api.clone());

    let err = resolver.resolve(PHOTO_URL).await.unwrap_err();
    assert!(matches!(err, ResolveError::Unavailable { ref id, .. } if id == "Tx3f2s8Bq4A"));
    assert!(err.to_string().contains("503"));

    let fallback = resolver.resolve_or_fallback(PHOTO_URL).await;
    assert_eq!(fallback.origin, ImageOrigin::Fallback);
    assert_eq!(fallback.src, PHOTO_URL);

    assert_eq!(api.calls(), 2);
}

#[tokio::test]
async fn test_no_source_is_unavailable() {
    let resolver = Resolver::new(manifest(), cache());

    assert!(matches!(
        resolver.resolve(PHOTO_URL).await,
        Err(ResolveError::Unavailable { .. })
    ));

    // Local photos still resolve offline
    let local = resolver.resolve(LOCAL_ID).await.unwrap();
    assert_eq!(local.origin, ImageOrigin::Local);
}

#[tokio::test]
async fn test_unrecognized_source() {
    let resolver = Resolver::new(manifest(), cache());

    assert!(matches!(
        resolver.resolve("https://example.com/cat.jpg").await,
        Err(ResolveError::UnrecognizedSource(_))
    ));

    let image = resolver
        .resolve_or_fallback("  https://example.com/cat.jpg ")
        .await;
    assert_eq!(image.origin, ImageOrigin::Fallback);
    assert_eq!(image.src, "https://example.com/cat.jpg");
}

#[tokio::test]
async fn test_cdn_url_passes_through_or_hits_manifest() {
    let api = Arc::new(FakeUnsplash::default());
    let resolver = Resolver::new(manifest(), cache()).with_source(api.clone());

    let image = resolver.resolve(CDN_URL).await.unwrap();
    assert_eq!(image.origin, ImageOrigin::Fallback);
    assert_eq!(image.key, "photo-1506744038136-46273834b3fb");
    assert_eq!(image.src, CDN_URL);
    assert_eq!(api.calls(), 0);

    let mut with_local = manifest();
    with_local.photos.insert(
        "photo-1506744038136-46273834b3fb".to_string(),
        ManifestEntry {
            local_path: "/images/unsplash/mountains.jpg".to_string(),
            width: None,
            height: None,
            alt: None,
            color: None,
            blur_hash: None,
            photographer: None,
            photographer_url: None,
            source_url: Some(CDN_URL.to_string()),
        },
    );
    let resolver = Resolver::new(with_local, cache());
    let image = resolver.resolve(CDN_URL).await.unwrap();
    assert_eq!(image.origin, ImageOrigin::Local);
    assert_eq!(image.src, "/images/unsplash/mountains.jpg");
    assert!(image.attribution.is_none());
}

#[tokio::test]
async fn test_resolve_many_preserves_order() {
    let api = Arc::new(FakeUnsplash::default());
    let resolver = Resolver::new(manifest(), cache()).with_source(api.clone());

    let images = resolver
        .resolve_many(&[PHOTO_URL, "not a photo", LOCAL_ID])
        .await;

    let origins: Vec<_> = images.iter().map(|i| i.origin).collect();
    assert_eq!(
        origins,
        vec![ImageOrigin::Remote, ImageOrigin::Fallback, ImageOrigin::Local]
    );
}

#[tokio::test]
async fn test_manifest_loaded_from_disk() {
    let temp = tempfile::TempDir::new().unwrap();
    let path = temp.path().join("manifest.json");
    std::fs::write(
        &path,
        r#"{"photos":{"Tx3f2s8Bq4A":{"localPath":"/images/unsplash/lake.jpg"}}}"#,
    )
    .unwrap();

    let manifest = Manifest::load(&path).await.unwrap();
    let resolver = Resolver::new(manifest, cache());

    let image = resolver.resolve(PHOTO_URL).await.unwrap();
    assert_eq!(image.origin, ImageOrigin::Local);
    assert_eq!(image.src, "/images/unsplash/lake.jpg");
}
