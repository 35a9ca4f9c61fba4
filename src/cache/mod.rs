//! code → URL 缓存层
//!
//! 缓存只是加速手段：任何失败都退化为直接读存储

mod moka;
mod null;
mod redis;
mod traits;

use std::sync::Arc;

use tracing::{info, warn};

pub use self::moka::MokaUrlCache;
pub use self::null::NullUrlCache;
pub use self::redis::RedisUrlCache;
pub use self::traits::UrlCache;
use crate::config::{CacheConfig, CacheType};

/// Build the configured cache
///
/// An unreachable Redis is logged and replaced by no cache, so the service
/// still starts.
pub async fn create_cache(config: &CacheConfig) -> Arc<dyn UrlCache> {
    let cache: Arc<dyn UrlCache> = match config.cache_type {
        CacheType::Memory => Arc::new(MokaUrlCache::new(config.memory.max_capacity)),
        CacheType::Redis => match RedisUrlCache::connect(&config.redis).await {
            Ok(cache) => Arc::new(cache),
            Err(e) => {
                warn!(
                    "Redis cache unavailable at {}: {}; continuing without cache",
                    config.redis.url, e
                );
                Arc::new(NullUrlCache)
            }
        },
        CacheType::None => Arc::new(NullUrlCache),
    };

    info!(
        "URL cache: {} (ttl {}s)",
        cache.name(),
        config.default_ttl
    );
    cache
}
