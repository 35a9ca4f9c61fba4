//! Write paths for SeaOrmStorage

use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseBackend, DatabaseTransaction, DbErr, EntityTrait,
    ExprTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, SqlErr, TransactionTrait,
};
use tracing::{debug, error};

use super::converters::{
    click_log_to_event, event_to_active_model, new_link_active_model, rollup_to_active_models,
};
use super::{SeaOrmStorage, retry};
use crate::analytics::ClickRollup;
use crate::errors::{LinktallyError, Result};
use crate::storage::{ClickEvent, ShortLink};

use migration::entities::{click_log, click_rollup, short_link};

impl SeaOrmStorage {
    pub(super) async fn insert_link(&self, link: &ShortLink) -> Result<()> {
        let db = &self.db;
        let op = format!("insert({})", link.code);

        let result = retry::with_retry(&op, self.retry_config, || async {
            short_link::Entity::insert(new_link_active_model(link))
                .exec(db)
                .await
        })
        .await;

        match result {
            Ok(_) => {
                debug!("Inserted short link {}", link.code);
                Ok(())
            }
            Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                Err(LinktallyError::duplicate_code(format!(
                    "Short code '{}' already exists",
                    link.code
                )))
            }
            Err(e) => {
                error!("{} failed after retries: {}", op, e);
                Err(LinktallyError::store_unavailable(format!("{} failed: {}", op, e)))
            }
        }
    }

    /// Counter bump, click-log insert and retention trim in one transaction
    pub(super) async fn record_click(&self, code: &str, event: &ClickEvent) -> Result<()> {
        let db = &self.db;
        let op = format!("append_click({})", code);
        let retention = self.max_retained_clicks;

        let found = retry::with_retry(&op, self.retry_config, || async {
            let txn = db.begin().await?;

            let updated = short_link::Entity::update_many()
                .col_expr(
                    short_link::Column::TotalClicks,
                    Expr::col(short_link::Column::TotalClicks).add(Expr::val(1i64)),
                )
                .col_expr(short_link::Column::LastAccessed, Expr::val(event.timestamp))
                .filter(short_link::Column::ShortCode.eq(code))
                .exec(&txn)
                .await?;
            if updated.rows_affected == 0 {
                return Ok(false);
            }

            click_log::Entity::insert(event_to_active_model(code, event))
                .exec(&txn)
                .await?;

            if let Some(max) = retention {
                trim_history(&txn, code, max).await?;
            }

            txn.commit().await?;
            Ok(true)
        })
        .await
        .map_err(|e| {
            error!("{} failed after retries: {}", op, e);
            LinktallyError::store_unavailable(format!("{} failed: {}", op, e))
        })?;

        if found {
            Ok(())
        } else {
            Err(LinktallyError::not_found(format!("Short URL '{}' not found", code)))
        }
    }
}

/// Fold the oldest rows beyond `max` into `click_rollups` and delete them
async fn trim_history(
    txn: &DatabaseTransaction,
    code: &str,
    max: usize,
) -> std::result::Result<(), DbErr> {
    let retained = click_log::Entity::find()
        .filter(click_log::Column::ShortCode.eq(code))
        .count(txn)
        .await?;
    let excess = retained.saturating_sub(max as u64);
    if excess == 0 {
        return Ok(());
    }

    let evicted = click_log::Entity::find()
        .filter(click_log::Column::ShortCode.eq(code))
        .order_by_asc(click_log::Column::Id)
        .limit(excess)
        .all(txn)
        .await?;
    let ids: Vec<i64> = evicted.iter().map(|m| m.id).collect();
    let events: Vec<ClickEvent> = evicted.into_iter().map(click_log_to_event).collect();
    let rollup = ClickRollup::from_events(&events);

    let backend = txn.get_database_backend();
    click_rollup::Entity::insert_many(rollup_to_active_models(code, &rollup))
        .on_conflict(rollup_upsert(backend))
        .exec(txn)
        .await?;

    click_log::Entity::delete_many()
        .filter(click_log::Column::Id.is_in(ids))
        .exec(txn)
        .await?;

    debug!("Archived {} click events for {}", excess, code);
    Ok(())
}

/// `ON CONFLICT` clause adding the incoming count to an existing rollup row
///
/// The left operand must be table-qualified: PostgreSQL sees both
/// `click_rollups` and `excluded` in scope and rejects a bare `click_count`.
fn rollup_upsert(backend: DatabaseBackend) -> OnConflict {
    let increment = match backend {
        DatabaseBackend::MySql => Expr::cust("VALUES(click_count)"),
        _ => Expr::cust("excluded.click_count"),
    };
    OnConflict::columns([
        click_rollup::Column::ShortCode,
        click_rollup::Column::Dimension,
        click_rollup::Column::Bucket,
    ])
    .value(
        click_rollup::Column::ClickCount,
        Expr::col((click_rollup::Entity, click_rollup::Column::ClickCount)).add(increment),
    )
    .to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{QueryTrait, Set};

    fn upsert_sql(backend: DatabaseBackend) -> String {
        let row = click_rollup::ActiveModel {
            short_code: Set("abc".to_string()),
            dimension: Set("country".to_string()),
            bucket: Set("US".to_string()),
            click_count: Set(3),
        };
        click_rollup::Entity::insert(row)
            .on_conflict(rollup_upsert(backend))
            .build(backend)
            .to_string()
    }

    #[test]
    fn test_rollup_upsert_postgres_qualifies_counter() {
        let sql = upsert_sql(DatabaseBackend::Postgres);
        assert!(
            sql.contains(r#""click_count" = "click_rollups"."click_count" + excluded.click_count"#),
            "{sql}"
        );
    }

    #[test]
    fn test_rollup_upsert_sqlite() {
        let sql = upsert_sql(DatabaseBackend::Sqlite);
        assert!(sql.contains("ON CONFLICT"), "{sql}");
        assert!(
            sql.contains(r#""click_rollups"."click_count" + excluded.click_count"#),
            "{sql}"
        );
    }

    #[test]
    fn test_rollup_upsert_mysql() {
        let sql = upsert_sql(DatabaseBackend::MySql);
        assert!(sql.contains("ON DUPLICATE KEY UPDATE"), "{sql}");
        assert!(
            sql.contains("`click_rollups`.`click_count` + VALUES(click_count)"),
            "{sql}"
        );
    }
}
