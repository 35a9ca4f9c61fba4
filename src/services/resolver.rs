//! Redirect-path lookup
//!
//! Cache first, then the store. The store is always consulted so an expired
//! link is never served from a stale cache entry. Click recording is queued
//! and never awaited.

use std::sync::Arc;

use tracing::{debug, instrument, warn};

use crate::analytics::{ClickRecorder, Visit};
use crate::cache::UrlCache;
use crate::errors::{LinktallyError, Result};
use crate::storage::{LinkStore, LinkSummary};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedLink {
    /// Redirect target
    pub original_url: String,
    pub link: LinkSummary,
}

pub struct LinkResolver {
    store: Arc<dyn LinkStore>,
    cache: Arc<dyn UrlCache>,
    recorder: Arc<ClickRecorder>,
    cache_ttl: u64,
}

impl LinkResolver {
    pub fn new(
        store: Arc<dyn LinkStore>,
        cache: Arc<dyn UrlCache>,
        recorder: Arc<ClickRecorder>,
        cache_ttl: u64,
    ) -> Self {
        Self {
            store,
            cache,
            recorder,
            cache_ttl,
        }
    }

    #[instrument(skip(self, visit))]
    pub async fn resolve(&self, code: &str, visit: Visit) -> Result<ResolvedLink> {
        let cached = match self.cache.get(code).await {
            Ok(cached) => cached,
            Err(e) => {
                warn!("Cache read failed for '{}': {}", code, e);
                None
            }
        };

        let link = self
            .store
            .find_summary(code)
            .await?
            .ok_or_else(|| LinktallyError::not_found(format!("Short URL '{}' not found", code)))?;

        if link.is_expired() {
            debug!("Short URL '{}' expired at {:?}", code, link.expires_at);
            return Err(LinktallyError::expired(format!(
                "Short URL '{}' has expired",
                code
            )));
        }

        let original_url = match cached {
            Some(url) => url,
            None => {
                debug!("Cache miss for '{}'", code);
                self.warm_cache(code, &link.original_url);
                link.original_url.clone()
            }
        };

        self.recorder.record(code, visit);
        Ok(ResolvedLink { original_url, link })
    }

    fn warm_cache(&self, code: &str, original_url: &str) {
        let cache = Arc::clone(&self.cache);
        let code = code.to_string();
        let original_url = original_url.to_string();
        let ttl = self.cache_ttl;
        tokio::spawn(async move {
            if let Err(e) = cache.set_with_ttl(&code, &original_url, ttl).await {
                warn!("Failed to cache '{}': {}", code, e);
            }
        });
    }
}
