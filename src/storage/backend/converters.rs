use sea_orm::ActiveValue::{NotSet, Set};

use crate::analytics::{ClickRollup, RollupDimension};
use crate::storage::{ClickEvent, LinkSummary, ShortLink};
use migration::entities::{click_log, click_rollup, short_link};

pub fn model_to_summary(model: short_link::Model) -> LinkSummary {
    LinkSummary {
        code: model.short_code,
        original_url: model.original_url,
        is_custom_alias: model.is_custom_alias,
        created_at: model.created_at,
        expires_at: model.expires_at,
        last_accessed: model.last_accessed,
        total_clicks: model.total_clicks.max(0) as u64,
    }
}

pub fn assemble_link(
    model: short_link::Model,
    clicks: Vec<click_log::Model>,
    rollups: Vec<click_rollup::Model>,
) -> ShortLink {
    let summary = model_to_summary(model);
    ShortLink {
        code: summary.code,
        original_url: summary.original_url,
        is_custom_alias: summary.is_custom_alias,
        created_at: summary.created_at,
        expires_at: summary.expires_at,
        last_accessed: summary.last_accessed,
        total_clicks: summary.total_clicks,
        clicks: clicks.into_iter().map(click_log_to_event).collect(),
        archived: rollup_from_rows(rollups),
    }
}

/// 新链接的 ActiveModel；计数从 0 开始
pub fn new_link_active_model(link: &ShortLink) -> short_link::ActiveModel {
    short_link::ActiveModel {
        short_code: Set(link.code.clone()),
        original_url: Set(link.original_url.clone()),
        is_custom_alias: Set(link.is_custom_alias),
        created_at: Set(link.created_at),
        expires_at: Set(link.expires_at),
        last_accessed: Set(None),
        total_clicks: Set(0),
    }
}

pub fn click_log_to_event(model: click_log::Model) -> ClickEvent {
    ClickEvent {
        timestamp: model.clicked_at,
        ip_address: model.ip_address,
        country: model.country,
        city: model.city,
        user_agent: model.user_agent,
        referer: model.referer,
    }
}

pub fn event_to_active_model(code: &str, event: &ClickEvent) -> click_log::ActiveModel {
    click_log::ActiveModel {
        id: NotSet,
        short_code: Set(code.to_string()),
        clicked_at: Set(event.timestamp),
        ip_address: Set(event.ip_address.clone()),
        country: Set(event.country.clone()),
        city: Set(event.city.clone()),
        user_agent: Set(event.user_agent.clone()),
        referer: Set(event.referer.clone()),
    }
}

/// Rows with an unknown dimension are skipped. Every archived event has
/// exactly one date bucket, so the date counts add up to the total.
pub fn rollup_from_rows(rows: Vec<click_rollup::Model>) -> ClickRollup {
    let mut rollup = ClickRollup::default();
    for row in rows {
        let Some(dimension) = RollupDimension::parse(&row.dimension) else {
            continue;
        };
        let count = row.click_count.max(0) as u64;
        if dimension == RollupDimension::Date {
            rollup.total += count;
        }
        rollup.add(dimension, row.bucket, count);
    }
    rollup
}

pub fn rollup_to_active_models(code: &str, rollup: &ClickRollup) -> Vec<click_rollup::ActiveModel> {
    RollupDimension::ALL
        .iter()
        .flat_map(|dimension| {
            rollup
                .counts(*dimension)
                .iter()
                .map(move |(bucket, count)| click_rollup::ActiveModel {
                    short_code: Set(code.to_string()),
                    dimension: Set(dimension.as_str().to_string()),
                    bucket: Set(bucket.clone()),
                    click_count: Set(*count as i64),
                })
        })
        .collect()
}
