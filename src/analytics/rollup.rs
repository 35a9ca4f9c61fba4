//! Running per-dimension click counters
//!
//! Used two ways: the aggregator replays retained events into one, and the
//! stores fold events evicted by the retention cap into one so grouped counts
//! stay exact over the whole history.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::storage::ClickEvent;

/// Bucket used when an event has no country or city
pub const UNKNOWN_BUCKET: &str = "Unknown";

/// 汇总维度
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RollupDimension {
    Country,
    City,
    Date,
}

impl RollupDimension {
    pub const ALL: [RollupDimension; 3] = [
        RollupDimension::Country,
        RollupDimension::City,
        RollupDimension::Date,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RollupDimension::Country => "country",
            RollupDimension::City => "city",
            RollupDimension::Date => "date",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "country" => Some(RollupDimension::Country),
            "city" => Some(RollupDimension::City),
            "date" => Some(RollupDimension::Date),
            _ => None,
        }
    }

    /// The bucket `event` falls into along this dimension
    pub fn bucket_of(&self, event: &ClickEvent) -> String {
        match self {
            RollupDimension::Country => event
                .country
                .clone()
                .unwrap_or_else(|| UNKNOWN_BUCKET.to_string()),
            RollupDimension::City => event
                .city
                .clone()
                .unwrap_or_else(|| UNKNOWN_BUCKET.to_string()),
            RollupDimension::Date => date_bucket(event.timestamp),
        }
    }
}

/// UTC calendar date, `YYYY-MM-DD`
pub fn date_bucket(timestamp: DateTime<Utc>) -> String {
    timestamp.format("%Y-%m-%d").to_string()
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClickRollup {
    pub total: u64,
    pub by_country: BTreeMap<String, u64>,
    pub by_city: BTreeMap<String, u64>,
    pub by_date: BTreeMap<String, u64>,
}

impl ClickRollup {
    pub fn from_events<'a, I>(events: I) -> Self
    where
        I: IntoIterator<Item = &'a ClickEvent>,
    {
        let mut rollup = Self::default();
        for event in events {
            rollup.record(event);
        }
        rollup
    }

    pub fn record(&mut self, event: &ClickEvent) {
        self.total += 1;
        for dimension in RollupDimension::ALL {
            *self
                .counts_mut(dimension)
                .entry(dimension.bucket_of(event))
                .or_insert(0) += 1;
        }
    }

    /// Add a pre-aggregated count, e.g. a row loaded from the store
    pub fn add(&mut self, dimension: RollupDimension, bucket: impl Into<String>, count: u64) {
        *self.counts_mut(dimension).entry(bucket.into()).or_insert(0) += count;
    }

    pub fn merge(&mut self, other: &ClickRollup) {
        self.total += other.total;
        for dimension in RollupDimension::ALL {
            for (bucket, count) in other.counts(dimension) {
                self.add(dimension, bucket.clone(), *count);
            }
        }
    }

    pub fn counts(&self, dimension: RollupDimension) -> &BTreeMap<String, u64> {
        match dimension {
            RollupDimension::Country => &self.by_country,
            RollupDimension::City => &self.by_city,
            RollupDimension::Date => &self.by_date,
        }
    }

    fn counts_mut(&mut self, dimension: RollupDimension) -> &mut BTreeMap<String, u64> {
        match dimension {
            RollupDimension::Country => &mut self.by_country,
            RollupDimension::City => &mut self.by_city,
            RollupDimension::Date => &mut self.by_date,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }
}
