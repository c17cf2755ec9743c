//! Fetch pipeline resolution against a live origin and a temp cache.

use tempfile::TempDir;

use caching_proxy::cache::{CacheKey, CacheStore, FetchPipeline, Resolution};
use caching_proxy::config::OriginConfig;
use caching_proxy::origin::OriginClient;

mod common;
use common::{dead_origin, MockOrigin};

fn pipeline(origin: &str, cache: &TempDir) -> FetchPipeline {
    let client = OriginClient::new(&OriginConfig {
        base_url: origin.to_string(),
        timeout_secs: 5,
    })
    .unwrap();
    FetchPipeline::new(CacheStore::new(cache.path()), client)
}

#[tokio::test]
async fn miss_fetches_and_stores_then_hits() {
    let origin = MockOrigin::start(&[("/a.txt", 200, "hello")]).await;
    let cache = TempDir::new().unwrap();
    let pipeline = pipeline(&origin.url(), &cache);

    let first = pipeline.fetch("/a.txt").await;
    assert_eq!(first, Resolution::Fetched("hello".into()));
    assert!(!first.is_hit());

    let second = pipeline.fetch("/a.txt").await;
    assert!(second.is_hit());
    assert_eq!(second.into_body().unwrap(), "hello");
    assert_eq!(origin.hits("/a.txt"), 1);
}

#[tokio::test]
async fn hit_does_not_need_origin() {
    let cache = TempDir::new().unwrap();
    let pipeline = pipeline(&dead_origin(), &cache);
    let key = CacheKey::from_request_path("/kept.txt").unwrap();
    pipeline.store().put(&key, b"kept").await.unwrap();

    assert_eq!(pipeline.fetch("/kept.txt").await, Resolution::Cached("kept".into()));
    assert_eq!(pipeline.fetch("/other.txt").await, Resolution::NotFound);
}

#[tokio::test]
async fn origin_not_found_leaves_no_entry() {
    let origin = MockOrigin::start(&[]).await;
    let cache = TempDir::new().unwrap();
    let pipeline = pipeline(&origin.url(), &cache);

    assert_eq!(pipeline.fetch("/nope").await, Resolution::NotFound);
    let key = CacheKey::from_request_path("/nope").unwrap();
    assert!(pipeline.store().get(&key).await.unwrap().is_none());
}

#[tokio::test]
async fn clear_then_fetch_goes_back_to_origin() {
    let origin = MockOrigin::start(&[("/a.txt", 200, "v1")]).await;
    let cache = TempDir::new().unwrap();
    let pipeline = pipeline(&origin.url(), &cache);

    pipeline.fetch("/a.txt").await;
    pipeline.store().clear_all().await.unwrap();

    let after = pipeline.fetch("/a.txt").await;
    assert!(!after.is_hit());
    assert_eq!(origin.hits("/a.txt"), 2);
}

#[tokio::test]
async fn root_path_is_fetched_but_never_stored() {
    let origin = MockOrigin::start(&[("/", 200, "index")]).await;
    let cache = TempDir::new().unwrap();
    let pipeline = pipeline(&origin.url(), &cache);

    assert_eq!(pipeline.fetch("/").await, Resolution::Fetched("index".into()));
    assert_eq!(pipeline.fetch("/").await, Resolution::Fetched("index".into()));
    assert_eq!(origin.hits("/"), 2);
    assert_eq!(std::fs::read_dir(cache.path()).unwrap().count(), 0);
}
