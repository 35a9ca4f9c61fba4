use async_trait::async_trait;

use crate::errors::Result;

/// Advisory code → original URL cache
///
/// Both operations may fail with `CacheUnavailable`; callers log and carry on
/// against the durable store.
#[async_trait]
pub trait UrlCache: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;

    async fn set_with_ttl(&self, key: &str, value: &str, ttl_secs: u64) -> Result<()>;

    /// 用于日志
    fn name(&self) -> &'static str;
}
