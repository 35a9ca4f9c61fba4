use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::analytics::ClickRollup;
use crate::errors::LinktallyError;

/// One resolution of a short code
///
/// `country` and `city` are derived from `ip_address` when the event is
/// written, so later GeoIP database updates never rewrite history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClickEvent {
    pub timestamp: DateTime<Utc>,
    pub ip_address: Option<String>,
    pub country: Option<String>,
    pub city: Option<String>,
    pub user_agent: Option<String>,
    pub referer: Option<String>,
}

/// Durable record for one shortening
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShortLink {
    pub code: String,
    pub original_url: String,
    pub is_custom_alias: bool,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    pub last_accessed: Option<DateTime<Utc>>,
    pub total_clicks: u64,
    /// Retained events, oldest first
    #[serde(default)]
    pub clicks: Vec<ClickEvent>,
    /// Counters for events evicted from `clicks` by the retention cap
    #[serde(default)]
    pub archived: ClickRollup,
}

impl ShortLink {
    /// A fresh record with no click history
    pub fn new(
        code: impl Into<String>,
        original_url: impl Into<String>,
        is_custom_alias: bool,
        created_at: DateTime<Utc>,
        expires_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            code: code.into(),
            original_url: original_url.into(),
            is_custom_alias,
            created_at,
            expires_at,
            last_accessed: None,
            total_clicks: 0,
            clicks: Vec::new(),
            archived: ClickRollup::default(),
        }
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expires_at| expires_at <= now)
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// The record without its click history
    pub fn summary(&self) -> LinkSummary {
        LinkSummary {
            code: self.code.clone(),
            original_url: self.original_url.clone(),
            is_custom_alias: self.is_custom_alias,
            created_at: self.created_at,
            expires_at: self.expires_at,
            last_accessed: self.last_accessed,
            total_clicks: self.total_clicks,
        }
    }
}

/// A `ShortLink` minus `clicks`, used for listing and the redirect path
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkSummary {
    pub code: String,
    pub original_url: String,
    pub is_custom_alias: bool,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    pub last_accessed: Option<DateTime<Utc>>,
    pub total_clicks: u64,
}

impl LinkSummary {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expires_at| expires_at <= now)
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }
}

/// 列表排序字段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortField {
    #[default]
    CreatedAt,
    TotalClicks,
    LastAccessed,
    ShortCode,
    ExpiresAt,
}

impl FromStr for SortField {
    type Err = LinktallyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "createdAt" | "created_at" => Ok(Self::CreatedAt),
            "totalClicks" | "total_clicks" => Ok(Self::TotalClicks),
            "lastAccessed" | "last_accessed" => Ok(Self::LastAccessed),
            "shortCode" | "short_code" | "code" => Ok(Self::ShortCode),
            "expiresAt" | "expires_at" => Ok(Self::ExpiresAt),
            _ => Err(LinktallyError::validation(format!(
                "Invalid sort field: '{}'. Valid: createdAt, totalClicks, lastAccessed, shortCode, expiresAt",
                s
            ))),
        }
    }
}

impl fmt::Display for SortField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CreatedAt => write!(f, "createdAt"),
            Self::TotalClicks => write!(f, "totalClicks"),
            Self::LastAccessed => write!(f, "lastAccessed"),
            Self::ShortCode => write!(f, "shortCode"),
            Self::ExpiresAt => write!(f, "expiresAt"),
        }
    }
}

/// 列表排序方向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl FromStr for SortOrder {
    type Err = LinktallyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            _ => Err(LinktallyError::validation(format!(
                "Invalid sort order: '{}'. Valid: asc, desc",
                s
            ))),
        }
    }
}

/// Pagination + ordering for `LinkStore::list`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListQuery {
    /// 1-based
    pub page: u64,
    pub page_size: u64,
    pub sort_field: SortField,
    pub sort_order: SortOrder,
}

impl ListQuery {
    pub const MAX_PAGE_SIZE: u64 = 100;

    pub fn new(page: u64, page_size: u64, sort_field: SortField, sort_order: SortOrder) -> Self {
        Self {
            page: page.max(1),
            page_size: page_size.clamp(1, Self::MAX_PAGE_SIZE),
            sort_field,
            sort_order,
        }
    }

    /// Number of rows skipped before this page
    pub fn offset(&self) -> u64 {
        (self.page - 1).saturating_mul(self.page_size)
    }
}

impl Default for ListQuery {
    fn default() -> Self {
        Self::new(1, 10, SortField::default(), SortOrder::default())
    }
}

/// One page of links plus the total across all pages
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkPage {
    pub links: Vec<LinkSummary>,
    pub total: u64,
}

impl LinkPage {
    pub fn total_pages(&self, page_size: u64) -> u64 {
        if page_size == 0 {
            return 0;
        }
        self.total.div_ceil(page_size)
    }
}
