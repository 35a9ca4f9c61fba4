//! Redirect lookup tests
//!
//! short code → target URL, the hot path. Covers the cache-aside behaviour,
//! expiry and click counting under concurrency.

use std::sync::Arc;

use chrono::{Duration, Utc};
use tempfile::TempDir;

use linktally::analytics::{ClickRecorder, RecorderConfig, Visit};
use linktally::cache::{MokaUrlCache, UrlCache};
use linktally::config::{DatabaseConfig, LinksConfig};
use linktally::errors::LinktallyError;
use linktally::services::{CreateLinkRequest, GeoIpProvider, LinkResolver, LinkService};
use linktally::storage::{LinkStore, MemoryStore, SeaOrmStorage, ShortLink};

// =============================================================================
// Test Setup
// =============================================================================

struct Env {
    store: Arc<dyn LinkStore>,
    cache: Arc<MokaUrlCache>,
    recorder: Arc<ClickRecorder>,
    links: LinkService,
    resolver: Arc<LinkResolver>,
}

fn env_with(store: Arc<dyn LinkStore>) -> Env {
    let cache = Arc::new(MokaUrlCache::new(10_000));
    let recorder = Arc::new(ClickRecorder::spawn(
        store.clone(),
        GeoIpProvider::disabled(),
        RecorderConfig::default(),
    ));
    Env {
        links: LinkService::new(store.clone(), cache.clone(), &LinksConfig::default(), 300),
        resolver: Arc::new(LinkResolver::new(
            store.clone(),
            cache.clone(),
            recorder.clone(),
            300,
        )),
        store,
        cache,
        recorder,
    }
}

fn memory_env() -> Env {
    env_with(Arc::new(MemoryStore::new()))
}

async fn sqlite_env() -> (Env, TempDir) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_url = format!(
        "sqlite://{}?mode=rwc",
        temp_dir.path().join("resolver_test.db").display()
    );
    let storage = SeaOrmStorage::new(&db_url, "sqlite", &DatabaseConfig::default())
        .await
        .expect("Failed to create storage");
    (env_with(Arc::new(storage)), temp_dir)
}

fn request(url: &str) -> CreateLinkRequest {
    CreateLinkRequest {
        original_url: url.to_string(),
        ..Default::default()
    }
}

// =============================================================================
// create → resolve
// =============================================================================

#[tokio::test]
async fn test_round_trip_returns_original_url() {
    let env = memory_env();
    let link = env
        .links
        .create_link(request("https://www.rust-lang.org/learn"))
        .await
        .unwrap();

    let resolved = env
        .resolver
        .resolve(&link.code, Visit::default())
        .await
        .unwrap();
    assert_eq!(resolved.original_url, "https://www.rust-lang.org/learn");
    assert_eq!(resolved.link.code, link.code);

    env.recorder.shutdown().await;
}

#[tokio::test]
async fn test_round_trip_sqlite() {
    let (env, _dir) = sqlite_env().await;
    let link = env
        .links
        .create_link(request("https://docs.rs"))
        .await
        .unwrap();

    for _ in 0..3 {
        let resolved = env
            .resolver
            .resolve(&link.code, Visit::default())
            .await
            .unwrap();
        assert_eq!(resolved.original_url, "https://docs.rs/");
    }
    env.recorder.flush().await;

    let stored = env.store.find_by_code(&link.code).await.unwrap().unwrap();
    assert_eq!(stored.total_clicks, 3);
    assert_eq!(stored.clicks.len(), 3);

    env.recorder.shutdown().await;
}

// =============================================================================
// 错误路径
// =============================================================================

#[tokio::test]
async fn test_unknown_code_is_not_found() {
    let env = memory_env();
    let err = env
        .resolver
        .resolve("nope42", Visit::default())
        .await
        .unwrap_err();
    assert!(matches!(err, LinktallyError::NotFound(_)));
    env.recorder.shutdown().await;
}

#[tokio::test]
async fn test_expired_link_is_gone_even_when_cached() {
    let env = memory_env();
    let now = Utc::now();
    let link = ShortLink::new(
        "stale",
        "https://example.com/old",
        true,
        now - Duration::hours(2),
        Some(now - Duration::seconds(1)),
    );
    env.store.insert(&link).await.unwrap();
    env.cache
        .set_with_ttl("stale", "https://example.com/old", 300)
        .await
        .unwrap();

    let err = env
        .resolver
        .resolve("stale", Visit::default())
        .await
        .unwrap_err();
    assert!(matches!(err, LinktallyError::Expired(_)));

    env.recorder.flush().await;
    let stored = env.store.find_summary("stale").await.unwrap().unwrap();
    assert_eq!(stored.total_clicks, 0);

    env.recorder.shutdown().await;
}

#[tokio::test]
async fn test_not_yet_expired_link_resolves() {
    let env = memory_env();
    let link = env
        .links
        .create_link(CreateLinkRequest {
            original_url: "https://example.com/soon".to_string(),
            custom_alias: Some("soon".to_string()),
            ttl_seconds: Some(60),
        })
        .await
        .unwrap();

    let resolved = env
        .resolver
        .resolve(&link.code, Visit::default())
        .await
        .unwrap();
    assert_eq!(resolved.original_url, "https://example.com/soon");
    env.recorder.shutdown().await;
}

// =============================================================================
// 并发
// =============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_resolves_count_every_click() {
    let env = memory_env();
    let link = env
        .links
        .create_link(request("https://example.com/popular"))
        .await
        .unwrap();

    const N: u64 = 200;
    let mut handles = Vec::new();
    for i in 0..N {
        let resolver = Arc::clone(&env.resolver);
        let code = link.code.clone();
        handles.push(tokio::spawn(async move {
            let visit = Visit {
                ip_address: Some(format!("10.0.0.{}", i % 250)),
                ..Default::default()
            };
            resolver.resolve(&code, visit).await
        }));
    }
    for handle in handles {
        let resolved = handle.await.unwrap().unwrap();
        assert_eq!(resolved.original_url, "https://example.com/popular");
    }
    env.recorder.flush().await;

    let stored = env.store.find_by_code(&link.code).await.unwrap().unwrap();
    assert_eq!(stored.total_clicks, N);
    assert_eq!(stored.clicks.len() as u64, N);
    assert_eq!(env.recorder.dropped_count(), 0);

    env.recorder.shutdown().await;
}

#[tokio::test]
async fn test_shutdown_drains_pending_clicks() {
    let env = memory_env();
    let link = env
        .links
        .create_link(request("https://example.com/drain"))
        .await
        .unwrap();

    for _ in 0..25 {
        env.resolver
            .resolve(&link.code, Visit::default())
            .await
            .unwrap();
    }
    env.recorder.shutdown().await;

    let stored = env.store.find_summary(&link.code).await.unwrap().unwrap();
    assert_eq!(stored.total_clicks, 25);
}
