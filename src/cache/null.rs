use async_trait::async_trait;

use super::UrlCache;
use crate::errors::Result;

/// 缓存关闭时使用：永远未命中
pub struct NullUrlCache;

#[async_trait]
impl UrlCache for NullUrlCache {
    async fn get(&self, _key: &str) -> Result<Option<String>> {
        Ok(None)
    }

    async fn set_with_ttl(&self, _key: &str, _value: &str, _ttl_secs: u64) -> Result<()> {
        Ok(())
    }

    fn name(&self) -> &'static str {
        "none"
    }
}
