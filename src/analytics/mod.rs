//! Click analytics
//!
//! - `recorder`: asynchronous click capture off the redirect path
//! - `aggregator`: grouped counts and recent activity for one link
//! - `rollup`: running counters shared by both and by the stores

pub mod aggregator;
pub mod recorder;
pub mod rollup;

pub use aggregator::{DEFAULT_RECENT_LIMIT, LinkAnalytics, RecentClick, aggregate, aggregate_with_limit};
pub use recorder::{ClickRecorder, RecorderConfig, Visit};
pub use rollup::{ClickRollup, RollupDimension, UNKNOWN_BUCKET, date_bucket};
