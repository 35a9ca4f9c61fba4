use async_trait::async_trait;
use redis::AsyncCommands;
use redis::aio::MultiplexedConnection;
use tokio::sync::RwLock;
use tracing::{debug, trace, warn};

use super::UrlCache;
use crate::config::RedisConfig;
use crate::errors::{LinktallyError, Result};

/// Redis-backed cache; keys are `key_prefix + code`
///
/// One multiplexed connection is shared and re-established lazily after an
/// error.
pub struct RedisUrlCache {
    client: redis::Client,
    connection: RwLock<Option<MultiplexedConnection>>,
    key_prefix: String,
}

impl RedisUrlCache {
    /// Open a client and check the server answers `PING`
    pub async fn connect(config: &RedisConfig) -> Result<Self> {
        let client = redis::Client::open(config.url.as_str())?;
        let cache = Self {
            client,
            connection: RwLock::new(None),
            key_prefix: config.key_prefix.clone(),
        };

        let mut conn = cache.get_connection().await?;
        let pong: String = redis::cmd("PING").query_async(&mut conn).await?;
        debug!("Redis connection test successful: {}", pong);
        Ok(cache)
    }

    async fn get_connection(&self) -> Result<MultiplexedConnection> {
        if let Some(conn) = self.connection.read().await.as_ref() {
            return Ok(conn.clone());
        }

        let mut guard = self.connection.write().await;
        // 双重检查
        if let Some(conn) = guard.as_ref() {
            return Ok(conn.clone());
        }
        let conn = self.client.get_multiplexed_async_connection().await?;
        *guard = Some(conn.clone());
        debug!("Redis connection established");
        Ok(conn)
    }

    async fn reset_connection(&self) {
        *self.connection.write().await = None;
        debug!("Redis connection reset after error");
    }

    fn make_key(&self, key: &str) -> String {
        format!("{}{}", self.key_prefix, key)
    }

    async fn on_error(&self, op: &str, key: &str, e: redis::RedisError) -> LinktallyError {
        warn!("Redis {} '{}' failed: {}", op, key, e);
        self.reset_connection().await;
        LinktallyError::from(e)
    }
}

#[async_trait]
impl UrlCache for RedisUrlCache {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut conn = self.get_connection().await?;
        let result: redis::RedisResult<Option<String>> = conn.get(self.make_key(key)).await;
        match result {
            Ok(value) => {
                trace!("Redis GET {}: hit={}", key, value.is_some());
                Ok(value)
            }
            Err(e) => Err(self.on_error("GET", key, e).await),
        }
    }

    async fn set_with_ttl(&self, key: &str, value: &str, ttl_secs: u64) -> Result<()> {
        let mut conn = self.get_connection().await?;
        match conn
            .set_ex::<String, &str, ()>(self.make_key(key), value, ttl_secs.max(1))
            .await
        {
            Ok(()) => Ok(()),
            Err(e) => Err(self.on_error("SETEX", key, e).await),
        }
    }

    fn name(&self) -> &'static str {
        "redis"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_connect_to_closed_port_fails() {
        let config = RedisConfig {
            url: "redis://127.0.0.1:1/".to_string(),
            key_prefix: "url:".to_string(),
        };
        let err = RedisUrlCache::connect(&config).await.err().unwrap();
        assert!(matches!(err, LinktallyError::CacheUnavailable(_)));
    }

    #[test]
    fn test_invalid_url_is_rejected() {
        let err = redis::Client::open("not-a-redis-url").err();
        assert!(err.is_some());
    }
}
