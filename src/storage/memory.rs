//! In-process `LinkStore` on top of `DashMap`
//!
//! Every mutation of a link happens under its shard write lock, which is what
//! makes `append_click` atomic with respect to concurrent appends and reads.

use std::cmp::Ordering;
use std::collections::VecDeque;

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tracing::debug;

use super::models::{ClickEvent, LinkPage, LinkSummary, ListQuery, ShortLink, SortField, SortOrder};
use super::LinkStore;
use crate::analytics::ClickRollup;
use crate::errors::{LinktallyError, Result};

struct StoredLink {
    summary: LinkSummary,
    clicks: VecDeque<ClickEvent>,
    archived: ClickRollup,
}

impl StoredLink {
    fn to_link(&self) -> ShortLink {
        let s = &self.summary;
        ShortLink {
            code: s.code.clone(),
            original_url: s.original_url.clone(),
            is_custom_alias: s.is_custom_alias,
            created_at: s.created_at,
            expires_at: s.expires_at,
            last_accessed: s.last_accessed,
            total_clicks: s.total_clicks,
            clicks: self.clicks.iter().cloned().collect(),
            archived: self.archived.clone(),
        }
    }
}

#[derive(Default)]
pub struct MemoryStore {
    links: DashMap<String, StoredLink>,
    max_retained_clicks: Option<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep at most `max` raw events per link; `None` keeps all
    pub fn with_retention(mut self, max: Option<usize>) -> Self {
        self.max_retained_clicks = max;
        self
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}

fn compare(a: &LinkSummary, b: &LinkSummary, field: SortField) -> Ordering {
    match field {
        SortField::CreatedAt => a.created_at.cmp(&b.created_at),
        SortField::TotalClicks => a.total_clicks.cmp(&b.total_clicks),
        SortField::LastAccessed => a.last_accessed.cmp(&b.last_accessed),
        SortField::ShortCode => a.code.cmp(&b.code),
        SortField::ExpiresAt => a.expires_at.cmp(&b.expires_at),
    }
}

#[async_trait]
impl LinkStore for MemoryStore {
    async fn find_by_code(&self, code: &str) -> Result<Option<ShortLink>> {
        Ok(self.links.get(code).map(|entry| entry.to_link()))
    }

    async fn find_summary(&self, code: &str) -> Result<Option<LinkSummary>> {
        Ok(self.links.get(code).map(|entry| entry.summary.clone()))
    }

    async fn exists(&self, code: &str) -> Result<bool> {
        Ok(self.links.contains_key(code))
    }

    async fn insert(&self, link: &ShortLink) -> Result<()> {
        match self.links.entry(link.code.clone()) {
            Entry::Occupied(_) => Err(LinktallyError::duplicate_code(format!(
                "Short code '{}' already exists",
                link.code
            ))),
            Entry::Vacant(slot) => {
                slot.insert(StoredLink {
                    summary: link.summary(),
                    clicks: link.clicks.iter().cloned().collect(),
                    archived: link.archived.clone(),
                });
                Ok(())
            }
        }
    }

    async fn append_click(&self, code: &str, event: &ClickEvent) -> Result<()> {
        let mut entry = self
            .links
            .get_mut(code)
            .ok_or_else(|| LinktallyError::not_found(format!("Short URL '{}' not found", code)))?;

        entry.summary.total_clicks += 1;
        entry.summary.last_accessed = Some(event.timestamp);
        entry.clicks.push_back(event.clone());

        if let Some(max) = self.max_retained_clicks {
            while entry.clicks.len() > max {
                let Some(evicted) = entry.clicks.pop_front() else {
                    break;
                };
                entry.archived.record(&evicted);
            }
        }
        debug!("Recorded click for {} (total {})", code, entry.summary.total_clicks);
        Ok(())
    }

    async fn list(&self, query: &ListQuery) -> Result<LinkPage> {
        let mut links: Vec<LinkSummary> = self
            .links
            .iter()
            .map(|entry| entry.summary.clone())
            .collect();

        links.sort_by(|a, b| {
            let ord = compare(a, b, query.sort_field);
            let ord = match query.sort_order {
                SortOrder::Asc => ord,
                SortOrder::Desc => ord.reverse(),
            };
            ord.then_with(|| a.code.cmp(&b.code))
        });

        let total = links.len() as u64;
        let links = links
            .into_iter()
            .skip(query.offset() as usize)
            .take(query.page_size as usize)
            .collect();

        Ok(LinkPage { links, total })
    }

    fn backend_name(&self) -> &str {
        "memory"
    }
}
