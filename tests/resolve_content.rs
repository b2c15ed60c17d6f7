use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use bytes::Bytes;

use asset_resolver::implementations::mock::{MockCache, MockOrigin};
use asset_resolver::{
    AssetCatalog, AssetDto, AssetId, AssetSnapshot, ContentOrigin, ContentResolver,
    DefaultRecordFactory, HandleRegistry, LocalContent, MetadataResolver, RecordField,
    ResolveError,
};

struct Harness {
    registry: Arc<HandleRegistry>,
    catalog: Arc<AssetCatalog>,
    origin: Arc<MockOrigin>,
    cache: Arc<MockCache>,
    resolver: ContentResolver,
}

fn harness() -> Harness {
    let registry = HandleRegistry::new();
    let catalog = Arc::new(AssetCatalog::with_factory(Arc::new(
        DefaultRecordFactory::new(Arc::clone(&registry)),
    )));
    let origin = Arc::new(MockOrigin::new());
    let cache = Arc::new(MockCache::new());
    let metadata = Arc::new(MetadataResolver::new(Arc::clone(&catalog), origin.clone()));
    let resolver = ContentResolver::builder()
        .catalog(Arc::clone(&catalog))
        .metadata_resolver(metadata)
        .content_origin(origin.clone())
        .cache(cache.clone())
        .build();

    Harness {
        registry,
        catalog,
        origin,
        cache,
        resolver,
    }
}

fn id(s: &str) -> AssetId {
    AssetId::from_string(s)
}

#[tokio::test]
async fn test_cache_miss_fetches_remote_and_writes_through() {
    let h = harness();
    h.origin
        .insert_asset(AssetDto::new("x").with_filename("x.glb"), &b"B"[..]);

    let content_ref = h.resolver.resolve_content(&id("x")).await.unwrap();

    assert_eq!(content_ref.bytes(), &Bytes::from_static(b"B"));
    assert_eq!(h.origin.content_calls(), 1);
    assert_eq!(h.cache.put_calls(), 1);
    let put = &h.cache.puts()[0];
    assert_eq!(put.id, id("x"));
    assert_eq!(put.bytes, Bytes::from_static(b"B"));
    assert_eq!(put.content_type, "model/gltf-binary");
    assert!(h.catalog.get(&id("x")).unwrap().has_local_content);
}

#[tokio::test]
async fn test_cache_hit_skips_remote() {
    let h = harness();
    h.origin
        .insert_asset(AssetDto::new("y").with_filename("y.png"), &b"remote"[..]);
    h.cache.insert("y", &b"C"[..], "image/png");

    let content_ref = h.resolver.resolve_content(&id("y")).await.unwrap();

    assert_eq!(content_ref.bytes(), &Bytes::from_static(b"C"));
    assert_eq!(content_ref.filename(), "y.png");
    assert_eq!(content_ref.content_type(), "image/png");
    assert_eq!(h.origin.content_calls(), 0);
    assert_eq!(h.origin.metadata_calls(), 1);
    assert_eq!(h.cache.put_calls(), 0);
    assert_eq!(h.registry.lookup(&content_ref.url), Some(content_ref.content.clone()));
}

#[tokio::test]
async fn test_local_content_touches_neither_cache_nor_network() {
    let h = harness();
    h.catalog.get_or_create(&id("z"));
    h.catalog.update(&id("z"), |record| {
        record.set_local_content(LocalContent::new(&b"local"[..], "z.txt", "text/plain"))
    });

    let content_ref = h.resolver.resolve_content(&id("z")).await.unwrap();

    assert_eq!(content_ref.bytes(), &Bytes::from_static(b"local"));
    assert_eq!(h.cache.get_calls(), 0);
    assert_eq!(h.cache.put_calls(), 0);
    assert_eq!(h.origin.metadata_calls(), 0);
    assert_eq!(h.origin.content_calls(), 0);
}

#[tokio::test]
async fn test_cache_bypass_never_reads_cache() {
    let h = harness();
    h.origin.insert_asset(AssetDto::new("x"), &b"remote"[..]);
    h.cache.insert("x", &b"cached"[..], "x/y");

    let content_ref = h.resolver.resolve_content_with(&id("x"), false).await.unwrap();

    assert_eq!(content_ref.bytes(), &Bytes::from_static(b"remote"));
    assert_eq!(h.cache.get_calls(), 0);
    assert_eq!(h.origin.content_calls(), 1);
    // write-through still happens on a bypassed read
    assert_eq!(h.cache.put_calls(), 1);
}

#[tokio::test]
async fn test_cache_error_falls_back_to_remote() {
    let h = harness();
    h.origin.insert_asset(AssetDto::new("x"), &b"remote"[..]);
    h.cache.insert("x", &b"cached"[..], "x/y");
    h.cache.fail_get("disk on fire");

    let content_ref = h.resolver.resolve_content(&id("x")).await.unwrap();

    assert_eq!(content_ref.bytes(), &Bytes::from_static(b"remote"));
    assert_eq!(h.cache.get_calls(), 1);
    assert_eq!(h.origin.content_calls(), 1);
}

#[tokio::test]
async fn test_write_through_failure_is_swallowed() {
    let h = harness();
    h.origin.insert_asset(AssetDto::new("x"), &b"remote"[..]);
    h.cache.fail_put("quota exceeded");

    let content_ref = h.resolver.resolve_content(&id("x")).await.unwrap();

    assert_eq!(content_ref.bytes(), &Bytes::from_static(b"remote"));
    assert_eq!(h.cache.put_calls(), 1);
    assert!(!h.cache.contains(&id("x")));
    let snapshot = h.catalog.get(&id("x")).unwrap();
    assert!(snapshot.has_local_content);
    assert!(snapshot.last_fetch_error.is_none());
}

#[tokio::test]
async fn test_fetch_failure_is_recorded_and_propagated() {
    let h = harness();
    h.origin.insert_asset(AssetDto::new("x"), &b"remote"[..]);
    h.origin.fail_content("503 service unavailable");

    let err = h.resolver.resolve_content(&id("x")).await.unwrap_err();
    assert!(matches!(err, ResolveError::ContentFetch { .. }));
    assert!(err.to_string().contains("503 service unavailable"));

    let snapshot = h.catalog.get(&id("x")).unwrap();
    assert!(!snapshot.is_fetching_content);
    assert!(!snapshot.has_local_content);
    assert_eq!(
        snapshot.last_fetch_error.map(|e| e.message),
        Some("503 service unavailable".to_string())
    );
    assert_eq!(h.cache.put_calls(), 0);

    h.origin.recover_content();
    h.resolver.resolve_content(&id("x")).await.unwrap();
    let snapshot = h.catalog.get(&id("x")).unwrap();
    assert!(snapshot.last_fetch_error.is_none());
    assert!(snapshot.has_local_content);
}

#[tokio::test]
async fn test_failed_fetch_event_sequence() {
    let h = harness();
    h.origin.insert_asset(AssetDto::new("x"), &b"remote"[..]);
    h.catalog.ingest(&AssetDto::new("x").with_remote_locator("mem://x"));
    h.origin.fail_content("timeout");
    let mut rx = h.catalog.subscribe_record(&id("x")).unwrap();

    h.resolver.resolve_content(&id("x")).await.unwrap_err();
    let mut fields = Vec::new();
    while let Ok(event) = rx.try_recv() {
        fields.push(event.field);
    }
    assert_eq!(
        fields,
        vec![
            RecordField::FetchingContent,
            RecordField::FetchError,
            RecordField::FetchingContent
        ]
    );
}

#[tokio::test]
async fn test_successful_fetch_event_sequence() {
    let h = harness();
    h.origin.insert_asset(AssetDto::new("x"), &b"remote"[..]);
    h.catalog.ingest(&AssetDto::new("x").with_remote_locator("mem://x"));
    let mut rx = h.catalog.subscribe_record(&id("x")).unwrap();

    h.resolver.resolve_content(&id("x")).await.unwrap();

    let mut fields = Vec::new();
    while let Ok(event) = rx.try_recv() {
        fields.push(event.field);
    }
    assert_eq!(
        fields,
        vec![
            RecordField::FetchingContent,
            RecordField::LocalContent,
            RecordField::FetchingContent
        ]
    );
}

#[tokio::test]
async fn test_metadata_failure_creates_no_record() {
    let h = harness();
    h.origin.fail_metadata("unauthorized");

    let err = h.resolver.resolve_content(&id("x")).await.unwrap_err();

    assert!(matches!(err, ResolveError::MetadataFetch { .. }));
    assert!(!h.catalog.has(&id("x")));
    assert_eq!(h.origin.content_calls(), 0);
}

/// Concurrent resolutions of the same id are not coalesced: both reach the
/// origin and the second result replaces the first handle.
#[tokio::test]
async fn test_concurrent_same_id_fetches_twice() {
    let h = harness();
    h.origin.insert_asset(AssetDto::new("x"), &b"remote"[..]);
    h.origin.yield_before_reply(true);

    let (id_a, id_b) = (id("x"), id("x"));
    let (first, second) = tokio::join!(
        h.resolver.resolve_content(&id_a),
        h.resolver.resolve_content(&id_b)
    );
    let first = first.unwrap();
    let second = second.unwrap();

    assert_eq!(h.origin.content_calls(), 2);
    assert_eq!(h.cache.put_calls(), 2);
    assert_ne!(first.url, second.url);
    assert_eq!(h.registry.live_count(), 1);
    assert_eq!(h.registry.release_count(), 1);
    assert_eq!(h.catalog.len(), 1);
}

#[tokio::test]
async fn test_different_ids_resolve_independently() {
    let h = harness();
    h.origin.insert_asset(AssetDto::new("a"), &b"A"[..]);
    h.origin.insert_asset(AssetDto::new("c"), &b"C"[..]);
    h.origin.yield_before_reply(true);

    let results = h
        .resolver
        .resolve_many(&[id("a"), id("missing"), id("c")], true)
        .await;

    assert_eq!(results.len(), 3);
    assert_eq!(results[0].0, id("a"));
    assert_eq!(results[0].1.as_ref().unwrap().bytes(), &Bytes::from_static(b"A"));
    assert!(matches!(results[1].1, Err(ResolveError::MetadataFetch { .. })));
    assert_eq!(results[2].1.as_ref().unwrap().bytes(), &Bytes::from_static(b"C"));
}

#[tokio::test]
async fn test_resolve_linked_textures() {
    let h = harness();
    let locator = |s: &str| format!("mem://{}", s);
    h.origin.insert_metadata(
        AssetDto::new("model")
            .with_link(
                "texture",
                AssetDto::new("albedo")
                    .with_filename("albedo.png")
                    .with_remote_locator(locator("albedo")),
            )
            .with_link(
                "texture",
                AssetDto::new("normal")
                    .with_filename("normal.png")
                    .with_remote_locator(locator("normal")),
            )
            .with_link("sound", AssetDto::new("creak")),
    );
    h.origin.insert_content(locator("albedo"), &b"A"[..]);
    h.origin.insert_content(locator("normal"), &b"N"[..]);

    let results = h
        .resolver
        .resolve_linked(&id("model"), "texture", true)
        .await
        .unwrap();

    let ids: Vec<&str> = results.iter().map(|(id, _)| id.as_str()).collect();
    assert_eq!(ids, vec!["albedo", "normal"]);
    assert!(results.iter().all(|(_, r)| r.is_ok()));
    assert_eq!(h.origin.metadata_calls(), 1);
    assert_eq!(h.origin.content_calls(), 2);
}

/// Origin that removes the record from the catalog while "on the network"
struct EvictingOrigin {
    catalog: Arc<AssetCatalog>,
}

#[async_trait]
impl ContentOrigin for EvictingOrigin {
    async fn fetch_content(&self, asset: &AssetSnapshot) -> Result<Bytes> {
        self.catalog.remove(&asset.id);
        Ok(Bytes::from_static(b"late"))
    }
}

#[tokio::test]
async fn test_record_removed_during_fetch() {
    let catalog = Arc::new(AssetCatalog::new());
    catalog.ingest(&AssetDto::new("x"));
    let metadata_origin = Arc::new(MockOrigin::new());
    let metadata = Arc::new(MetadataResolver::new(Arc::clone(&catalog), metadata_origin));
    let cache = Arc::new(MockCache::new());
    let resolver = ContentResolver::builder()
        .catalog(Arc::clone(&catalog))
        .metadata_resolver(metadata)
        .content_origin(Arc::new(EvictingOrigin {
            catalog: Arc::clone(&catalog),
        }))
        .cache(cache.clone())
        .build();

    let err = resolver.resolve_content(&id("x")).await.unwrap_err();

    assert!(matches!(err, ResolveError::RecordEvicted(_)));
    assert!(!catalog.has(&id("x")));
    assert_eq!(cache.put_calls(), 0);
}

#[tokio::test]
async fn test_removing_record_releases_handle() {
    let h = harness();
    h.origin.insert_asset(AssetDto::new("x"), &b"remote"[..]);
    let content_ref = h.resolver.resolve_content(&id("x")).await.unwrap();
    assert_eq!(h.registry.live_count(), 1);

    assert!(h.catalog.remove(&id("x")));

    assert!(h.registry.lookup(&content_ref.url).is_none());
    assert_eq!(h.registry.release_count(), 1);
}
