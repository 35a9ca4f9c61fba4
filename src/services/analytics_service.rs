//! Per-link statistics

use std::sync::Arc;

use serde::Serialize;

use crate::analytics::{LinkAnalytics, aggregate_with_limit};
use crate::errors::{LinktallyError, Result};
use crate::storage::{LinkStore, LinkSummary};

/// A link's metadata together with its aggregated click history
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkStats {
    pub link: LinkSummary,
    pub analytics: LinkAnalytics,
}

pub struct AnalyticsService {
    store: Arc<dyn LinkStore>,
    recent_limit: usize,
}

impl AnalyticsService {
    pub fn new(store: Arc<dyn LinkStore>, recent_limit: usize) -> Self {
        Self {
            store,
            recent_limit,
        }
    }

    /// Expired links still report their history
    pub async fn link_analytics(&self, code: &str) -> Result<LinkStats> {
        let link = self
            .store
            .find_by_code(code)
            .await?
            .ok_or_else(|| LinktallyError::not_found(format!("Short URL '{}' not found", code)))?;

        let analytics = aggregate_with_limit(&link, self.recent_limit);
        Ok(LinkStats {
            link: link.summary(),
            analytics,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{ClickEvent, MemoryStore, ShortLink};
    use chrono::{Duration, Utc};

    #[tokio::test]
    async fn test_link_analytics() {
        let store = Arc::new(MemoryStore::new());
        let now = Utc::now();
        store
            .insert(&ShortLink::new(
                "gone",
                "https://example.com",
                false,
                now - Duration::days(2),
                Some(now - Duration::days(1)),
            ))
            .await
            .unwrap();
        for country in ["US", "US", "FR"] {
            let event = ClickEvent {
                timestamp: now - Duration::days(1) - Duration::hours(1),
                ip_address: None,
                country: Some(country.to_string()),
                city: None,
                user_agent: None,
                referer: None,
            };
            store.append_click("gone", &event).await.unwrap();
        }

        let service = AnalyticsService::new(store, 2);
        let stats = service.link_analytics("gone").await.unwrap();
        assert_eq!(stats.link.total_clicks, 3);
        assert_eq!(stats.analytics.by_country["US"], 2);
        assert_eq!(stats.analytics.by_city["Unknown"], 3);
        assert_eq!(stats.analytics.recent.len(), 2);

        let err = service.link_analytics("missing").await.unwrap_err();
        assert!(matches!(err, LinktallyError::NotFound(_)));
    }
}
