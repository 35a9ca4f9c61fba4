use std::time::{Duration, Instant};

use async_trait::async_trait;
use moka::future::Cache;
use moka::policy::Expiry;
use tracing::debug;

use super::UrlCache;
use crate::errors::Result;

#[derive(Clone)]
struct CachedUrl {
    url: String,
    ttl: Duration,
}

/// 每个条目按写入时给定的 TTL 过期
struct PerEntryExpiry;

impl Expiry<String, CachedUrl> for PerEntryExpiry {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &CachedUrl,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &CachedUrl,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

/// In-process cache bounded by entry count
pub struct MokaUrlCache {
    inner: Cache<String, CachedUrl>,
}

impl MokaUrlCache {
    pub fn new(max_capacity: u64) -> Self {
        let inner = Cache::builder()
            .max_capacity(max_capacity)
            .expire_after(PerEntryExpiry)
            .build();
        debug!("MokaUrlCache initialized with max capacity {}", max_capacity);
        Self { inner }
    }
}

#[async_trait]
impl UrlCache for MokaUrlCache {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.inner.get(key).await.map(|entry| entry.url))
    }

    async fn set_with_ttl(&self, key: &str, value: &str, ttl_secs: u64) -> Result<()> {
        let entry = CachedUrl {
            url: value.to_string(),
            ttl: Duration::from_secs(ttl_secs.max(1)),
        };
        self.inner.insert(key.to_string(), entry).await;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
