//! On-demand click analytics for a single link

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::storage::{ClickEvent, ShortLink};

/// Number of events returned in `recent` unless configured otherwise
pub const DEFAULT_RECENT_LIMIT: usize = 10;

/// Projection of a click event for the recent-activity list
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentClick {
    pub timestamp: DateTime<Utc>,
    pub country: Option<String>,
    pub city: Option<String>,
    pub referer: Option<String>,
}

impl From<&ClickEvent> for RecentClick {
    fn from(event: &ClickEvent) -> Self {
        Self {
            timestamp: event.timestamp,
            country: event.country.clone(),
            city: event.city.clone(),
            referer: event.referer.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkAnalytics {
    pub by_country: BTreeMap<String, u64>,
    pub by_city: BTreeMap<String, u64>,
    /// Keyed by UTC date, `YYYY-MM-DD`
    pub by_date: BTreeMap<String, u64>,
    /// Newest first
    pub recent: Vec<RecentClick>,
}

/// Grouped counts and the ten most recent clicks of `link`
pub fn aggregate(link: &ShortLink) -> LinkAnalytics {
    aggregate_with_limit(link, DEFAULT_RECENT_LIMIT)
}

/// Same as [`aggregate`] with a custom size for `recent`.
///
/// Grouped counts cover the full history: the archived counters of evicted
/// events plus a replay of the retained ones. `recent` only sees retained
/// events. Pure and O(n) in the retained click count.
pub fn aggregate_with_limit(link: &ShortLink, recent_limit: usize) -> LinkAnalytics {
    let mut rollup = link.archived.clone();
    for event in &link.clicks {
        rollup.record(event);
    }

    let recent = link
        .clicks
        .iter()
        .rev()
        .take(recent_limit)
        .map(RecentClick::from)
        .collect();

    LinkAnalytics {
        by_country: rollup.by_country,
        by_city: rollup.by_city,
        by_date: rollup.by_date,
        recent,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::ClickRollup;
    use chrono::{Duration, TimeZone};

    fn click(minutes: i64, country: &str, city: &str, referer: Option<&str>) -> ClickEvent {
        ClickEvent {
            timestamp: Utc.with_ymd_and_hms(2026, 5, 1, 12, 0, 0).unwrap()
                + Duration::minutes(minutes),
            ip_address: Some("203.0.113.9".to_string()),
            country: Some(country.to_string()),
            city: Some(city.to_string()),
            user_agent: Some("curl/8.0".to_string()),
            referer: referer.map(String::from),
        }
    }

    fn link_with(clicks: Vec<ClickEvent>) -> ShortLink {
        let mut link = ShortLink::new(
            "abc123",
            "https://example.com",
            false,
            Utc.with_ymd_and_hms(2026, 4, 30, 0, 0, 0).unwrap(),
            None,
        );
        link.total_clicks = clicks.len() as u64;
        link.clicks = clicks;
        link
    }

    #[test]
    fn test_three_city_scenario() {
        let link = link_with(vec![
            click(0, "US", "New York", None),
            click(1, "US", "Boston", Some("https://news.example")),
            click(2, "FR", "Paris", None),
        ]);

        let analytics = aggregate(&link);

        assert_eq!(analytics.by_country.len(), 2);
        assert_eq!(analytics.by_country["US"], 2);
        assert_eq!(analytics.by_country["FR"], 1);
        assert_eq!(analytics.by_city["New York"], 1);
        assert_eq!(analytics.by_city["Boston"], 1);
        assert_eq!(analytics.by_city["Paris"], 1);
        assert_eq!(analytics.by_date["2026-05-01"], 3);

        let cities: Vec<_> = analytics
            .recent
            .iter()
            .map(|c| c.city.as_deref().unwrap())
            .collect();
        assert_eq!(cities, ["Paris", "Boston", "New York"]);
        assert_eq!(
            analytics.recent[1].referer.as_deref(),
            Some("https://news.example")
        );
    }

    #[test]
    fn test_recent_is_capped_at_ten_newest() {
        let clicks = (0..25).map(|i| click(i, "DE", "Berlin", None)).collect();
        let link = link_with(clicks);

        let analytics = aggregate(&link);

        assert_eq!(analytics.recent.len(), 10);
        assert_eq!(analytics.recent[0].timestamp, link.clicks[24].timestamp);
        assert_eq!(analytics.recent[9].timestamp, link.clicks[15].timestamp);
        assert_eq!(analytics.by_country["DE"], 25);
    }

    #[test]
    fn test_dates_are_bucketed_in_utc() {
        let late = click(11 * 60 + 59, "JP", "Tokyo", None);
        let next_day = click(12 * 60, "JP", "Tokyo", None);
        let analytics = aggregate(&link_with(vec![late, next_day]));

        assert_eq!(analytics.by_date["2026-05-01"], 1);
        assert_eq!(analytics.by_date["2026-05-02"], 1);
    }

    #[test]
    fn test_archived_counts_are_included() {
        let evicted = vec![click(0, "US", "Boston", None), click(1, "FR", "Paris", None)];
        let mut link = link_with(vec![click(2, "US", "Boston", None)]);
        link.archived = ClickRollup::from_events(&evicted);
        link.total_clicks = 3;

        let analytics = aggregate(&link);

        assert_eq!(analytics.by_country["US"], 2);
        assert_eq!(analytics.by_country["FR"], 1);
        assert_eq!(analytics.by_city["Boston"], 2);
        assert_eq!(analytics.recent.len(), 1);
    }

    #[test]
    fn test_empty_history() {
        let analytics = aggregate(&link_with(Vec::new()));
        assert_eq!(analytics, LinkAnalytics::default());
    }

    #[test]
    fn test_aggregate_does_not_mutate() {
        let link = link_with(vec![click(0, "US", "Boston", None)]);
        let before = link.clone();
        let _ = aggregate(&link);
        assert_eq!(link, before);
    }
}
