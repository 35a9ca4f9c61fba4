use std::sync::Arc;
use std::time::Instant;

use crate::analytics::ClickRecorder;
use crate::cache::UrlCache;
use crate::config::AppConfig;
use crate::services::{AnalyticsService, LinkResolver, LinkService};
use crate::storage::LinkStore;

/// Shared handler state, built once at startup
pub struct AppState {
    pub links: LinkService,
    pub resolver: LinkResolver,
    pub analytics: AnalyticsService,
    pub store: Arc<dyn LinkStore>,
    pub cache: Arc<dyn UrlCache>,
    pub base_url: String,
    pub trusted_proxies: Vec<String>,
    pub permanent_redirect: bool,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(
        config: &AppConfig,
        store: Arc<dyn LinkStore>,
        cache: Arc<dyn UrlCache>,
        recorder: Arc<ClickRecorder>,
    ) -> Self {
        let ttl = config.cache.default_ttl;
        Self {
            links: LinkService::new(store.clone(), cache.clone(), &config.links, ttl),
            resolver: LinkResolver::new(store.clone(), cache.clone(), recorder, ttl),
            analytics: AnalyticsService::new(store.clone(), config.analytics.recent_limit),
            store,
            cache,
            base_url: config.server.base_url.clone(),
            trusted_proxies: config.server.trusted_proxies.clone(),
            permanent_redirect: config.server.permanent_redirect,
            started_at: Instant::now(),
        }
    }
}
