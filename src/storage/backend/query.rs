//! Read paths for SeaOrmStorage

use sea_orm::{
    ColumnTrait, EntityTrait, Order, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect,
    TransactionTrait,
};
use tracing::error;

use super::converters::{assemble_link, model_to_summary};
use super::{SeaOrmStorage, retry};
use crate::errors::{LinktallyError, Result};
use crate::storage::{LinkPage, LinkSummary, ListQuery, ShortLink, SortField, SortOrder};

use migration::entities::{click_log, click_rollup, short_link};

fn sort_column(field: SortField) -> short_link::Column {
    match field {
        SortField::CreatedAt => short_link::Column::CreatedAt,
        SortField::TotalClicks => short_link::Column::TotalClicks,
        SortField::LastAccessed => short_link::Column::LastAccessed,
        SortField::ShortCode => short_link::Column::ShortCode,
        SortField::ExpiresAt => short_link::Column::ExpiresAt,
    }
}

fn sort_direction(order: SortOrder) -> Order {
    match order {
        SortOrder::Asc => Order::Asc,
        SortOrder::Desc => Order::Desc,
    }
}

fn store_error(operation: &str, e: sea_orm::DbErr) -> LinktallyError {
    error!("{} failed after retries: {}", operation, e);
    LinktallyError::store_unavailable(format!("{} failed: {}", operation, e))
}

impl SeaOrmStorage {
    /// Link row, click history and archived counters read in one transaction
    pub(super) async fn load_link(&self, code: &str) -> Result<Option<ShortLink>> {
        let db = &self.db;
        let op = format!("find_by_code({})", code);

        let loaded = retry::with_retry(&op, self.retry_config, || async {
            let txn = db.begin().await?;
            let Some(model) = short_link::Entity::find_by_id(code).one(&txn).await? else {
                txn.commit().await?;
                return Ok(None);
            };
            let clicks = click_log::Entity::find()
                .filter(click_log::Column::ShortCode.eq(code))
                .order_by_asc(click_log::Column::Id)
                .all(&txn)
                .await?;
            let rollups = click_rollup::Entity::find()
                .filter(click_rollup::Column::ShortCode.eq(code))
                .all(&txn)
                .await?;
            txn.commit().await?;
            Ok(Some((model, clicks, rollups)))
        })
        .await
        .map_err(|e| store_error(&op, e))?;

        Ok(loaded.map(|(model, clicks, rollups)| assemble_link(model, clicks, rollups)))
    }

    pub(super) async fn load_summary(&self, code: &str) -> Result<Option<LinkSummary>> {
        let db = &self.db;
        let op = format!("find_summary({})", code);

        let model = retry::with_retry(&op, self.retry_config, || async {
            short_link::Entity::find_by_id(code).one(db).await
        })
        .await
        .map_err(|e| store_error(&op, e))?;

        Ok(model.map(model_to_summary))
    }

    pub(super) async fn code_exists(&self, code: &str) -> Result<bool> {
        let db = &self.db;
        let op = format!("exists({})", code);

        let count = retry::with_retry(&op, self.retry_config, || async {
            short_link::Entity::find_by_id(code).count(db).await
        })
        .await
        .map_err(|e| store_error(&op, e))?;

        Ok(count > 0)
    }

    /// One page of summaries; ties are broken by code so pages are stable
    pub(super) async fn load_page(&self, query: &ListQuery) -> Result<LinkPage> {
        let db = &self.db;

        let total = retry::with_retry("list(count)", self.retry_config, || async {
            short_link::Entity::find().count(db).await
        })
        .await
        .map_err(|e| store_error("list(count)", e))?;

        let column = sort_column(query.sort_field);
        let direction = sort_direction(query.sort_order);
        let models = retry::with_retry("list(data)", self.retry_config, || async {
            let mut select = short_link::Entity::find().order_by(column, direction.clone());
            if query.sort_field != SortField::ShortCode {
                select = select.order_by_asc(short_link::Column::ShortCode);
            }
            select
                .offset(query.offset())
                .limit(query.page_size)
                .all(db)
                .await
        })
        .await
        .map_err(|e| store_error("list(data)", e))?;

        Ok(LinkPage {
            links: models.into_iter().map(model_to_summary).collect(),
            total,
        })
    }
}
