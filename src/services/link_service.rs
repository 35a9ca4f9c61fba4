//! Link creation and listing
//!
//! Shared by the HTTP handlers and the CLI.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info, warn};

use super::code_generator::generate_code;
use crate::cache::UrlCache;
use crate::config::LinksConfig;
use crate::errors::{LinktallyError, Result};
use crate::storage::{LinkPage, LinkStore, ListQuery, ShortLink};
use crate::utils::url_validator::validate_url;
use crate::utils::{ALIAS_MAX_LEN, ALIAS_MIN_LEN, is_valid_alias};

/// Request to create a new link
#[derive(Debug, Clone, Default)]
pub struct CreateLinkRequest {
    /// Absolute http(s) URL
    pub original_url: String,
    /// Empty string is the same as `None`
    pub custom_alias: Option<String>,
    /// Lifetime in seconds; `None` or 0 never expires
    pub ttl_seconds: Option<u64>,
}

pub struct LinkService {
    store: Arc<dyn LinkStore>,
    cache: Arc<dyn UrlCache>,
    code_length: usize,
    max_attempts: u32,
    cache_ttl: u64,
}

impl LinkService {
    pub fn new(
        store: Arc<dyn LinkStore>,
        cache: Arc<dyn UrlCache>,
        links: &LinksConfig,
        cache_ttl: u64,
    ) -> Self {
        Self {
            store,
            cache,
            code_length: links.code_length.max(1),
            max_attempts: links.max_generation_attempts.max(1),
            cache_ttl,
        }
    }

    /// Create a short link under a custom alias or a fresh random code
    ///
    /// The stored record is the one returned. A cache warm is scheduled but
    /// never awaited.
    pub async fn create_link(&self, req: CreateLinkRequest) -> Result<ShortLink> {
        // 存 Url 的序列化形式，可直接作为 Location 头
        let target = validate_url(&req.original_url)
            .map_err(|e| LinktallyError::invalid_url_format(e.to_string()))?
            .to_string();

        let now = Utc::now();
        let expires_at = expiry_from_ttl(now, req.ttl_seconds)?;

        let link = match req.custom_alias.filter(|alias| !alias.is_empty()) {
            Some(alias) => {
                self.insert_alias(alias, &target, now, expires_at)
                    .await?
            }
            None => self.insert_generated(&target, now, expires_at).await?,
        };

        self.warm_cache(&link.code, &link.original_url);
        info!(
            "LinkService: created link '{}' -> '{}'{}",
            link.code,
            link.original_url,
            if link.is_custom_alias { " (alias)" } else { "" }
        );
        Ok(link)
    }

    async fn insert_alias(
        &self,
        alias: String,
        original_url: &str,
        now: DateTime<Utc>,
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<ShortLink> {
        if !is_valid_alias(&alias) {
            return Err(LinktallyError::invalid_alias_format(format!(
                "Invalid alias '{}'. Use {}-{} characters from A-Z, a-z, 0-9, '-' and '_'",
                alias, ALIAS_MIN_LEN, ALIAS_MAX_LEN
            )));
        }
        if self.store.exists(&alias).await? {
            return Err(LinktallyError::alias_in_use(format!(
                "Alias '{}' is already in use",
                alias
            )));
        }

        let link = ShortLink::new(alias, original_url, true, now, expires_at);
        match self.store.insert(&link).await {
            Ok(()) => Ok(link),
            // lost the race against a concurrent create
            Err(LinktallyError::DuplicateCode(_)) => Err(LinktallyError::alias_in_use(format!(
                "Alias '{}' is already in use",
                link.code
            ))),
            Err(e) => Err(e),
        }
    }

    async fn insert_generated(
        &self,
        original_url: &str,
        now: DateTime<Utc>,
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<ShortLink> {
        for attempt in 1..=self.max_attempts {
            let code = generate_code(self.code_length);
            if self.store.exists(&code).await? {
                debug!("Code collision on attempt {}: {}", attempt, code);
                continue;
            }

            let link = ShortLink::new(code, original_url, false, now, expires_at);
            match self.store.insert(&link).await {
                Ok(()) => return Ok(link),
                Err(LinktallyError::DuplicateCode(_)) => {
                    debug!("Code taken during insert on attempt {}: {}", attempt, link.code);
                }
                Err(e) => return Err(e),
            }
        }

        warn!(
            "Gave up generating a {}-character code after {} attempts",
            self.code_length, self.max_attempts
        );
        Err(LinktallyError::code_space_exhausted(format!(
            "No free short code found after {} attempts",
            self.max_attempts
        )))
    }

    /// One page of links, without click history
    pub async fn list_links(&self, query: &ListQuery) -> Result<LinkPage> {
        self.store.list(query).await
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

fn expiry_from_ttl(now: DateTime<Utc>, ttl_seconds: Option<u64>) -> Result<Option<DateTime<Utc>>> {
    let Some(ttl) = ttl_seconds.filter(|&ttl| ttl > 0) else {
        return Ok(None);
    };

    i64::try_from(ttl)
        .ok()
        .and_then(Duration::try_seconds)
        .and_then(|ttl| now.checked_add_signed(ttl))
        .map(Some)
        .ok_or_else(|| LinktallyError::validation(format!("expiresIn {} is too large", ttl)))
}
