//! Request and response bodies
//!
//! Every success body is `{ success: true, data }`, every failure
//! `{ success: false, error }`.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::analytics::RecentClick;
use crate::services::LinkStats;
use crate::storage::{LinkSummary, ShortLink};

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
        }
    }
}

/// `POST /api/shorten`
#[derive(Deserialize, Clone, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct ShortenRequest {
    #[serde(default)]
    pub url: String,
    pub custom_alias: Option<String>,
    /// Seconds until the link expires
    pub expires_in: Option<u64>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ShortenData {
    pub original_url: String,
    pub short_url: String,
    pub short_code: String,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl ShortenData {
    pub fn from_link(link: &ShortLink, base_url: &str) -> Self {
        Self {
            original_url: link.original_url.clone(),
            short_url: short_url(base_url, &link.code),
            short_code: link.code.clone(),
            created_at: link.created_at,
            expires_at: link.expires_at,
        }
    }
}

/// `GET /api/urls`
#[derive(Deserialize, Clone, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct ListUrlsQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub sort_by: Option<String>,
    pub order: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct UrlItem {
    pub short_code: String,
    pub original_url: String,
    pub short_url: String,
    pub total_clicks: u64,
    pub created_at: DateTime<Utc>,
    pub last_accessed: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl UrlItem {
    pub fn from_summary(link: &LinkSummary, base_url: &str) -> Self {
        Self {
            short_code: link.code.clone(),
            original_url: link.original_url.clone(),
            short_url: short_url(base_url, &link.code),
            total_clicks: link.total_clicks,
            created_at: link.created_at,
            last_accessed: link.last_accessed,
            expires_at: link.expires_at,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PaginationInfo {
    pub current_page: u64,
    pub total_pages: u64,
    pub total_urls: u64,
    pub per_page: u64,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct UrlsData {
    pub urls: Vec<UrlItem>,
    pub pagination: PaginationInfo,
}

/// `GET /api/stats/{code}`
#[derive(Serialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct StatsData {
    pub short_code: String,
    pub original_url: String,
    pub total_clicks: u64,
    pub created_at: DateTime<Utc>,
    pub last_accessed: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    pub clicks_by_country: BTreeMap<String, u64>,
    pub clicks_by_city: BTreeMap<String, u64>,
    pub clicks_by_date: BTreeMap<String, u64>,
    pub recent_clicks: Vec<RecentClick>,
}

impl From<LinkStats> for StatsData {
    fn from(stats: LinkStats) -> Self {
        let LinkStats { link, analytics } = stats;
        Self {
            short_code: link.code,
            original_url: link.original_url,
            total_clicks: link.total_clicks,
            created_at: link.created_at,
            last_accessed: link.last_accessed,
            expires_at: link.expires_at,
            clicks_by_country: analytics.by_country,
            clicks_by_city: analytics.by_city,
            clicks_by_date: analytics.by_date,
            recent_clicks: analytics.recent,
        }
    }
}

/// `{base_url}/{code}` without a doubled slash
pub fn short_url(base_url: &str, code: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_url_trims_trailing_slash() {
        assert_eq!(short_url("http://sho.rt/", "abc"), "http://sho.rt/abc");
        assert_eq!(short_url("http://sho.rt", "abc"), "http://sho.rt/abc");
    }

    #[test]
    fn test_shorten_request_uses_camel_case() {
        let req: ShortenRequest = serde_json::from_str(
            r#"{"url":"https://example.com","customAlias":"docs","expiresIn":60}"#,
        )
        .unwrap();
        assert_eq!(req.custom_alias.as_deref(), Some("docs"));
        assert_eq!(req.expires_in, Some(60));

        let req: ShortenRequest = serde_json::from_str("{}").unwrap();
        assert!(req.url.is_empty());
    }

    #[test]
    fn test_expires_at_omitted_when_absent() {
        let link = ShortLink::new("abc", "https://example.com", false, Utc::now(), None);
        let json = serde_json::to_value(ShortenData::from_link(&link, "http://sho.rt")).unwrap();
        assert!(json.get("expiresAt").is_none());
        assert_eq!(json["shortUrl"], "http://sho.rt/abc");
    }
}
