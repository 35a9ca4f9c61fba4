//! SeaORM storage backend
//!
//! SQLite, MySQL/MariaDB and PostgreSQL through sqlx. Schema lives in the
//! `migration` crate and is applied on startup.

mod connection;
mod converters;
mod mutations;
mod query;
pub mod retry;

use async_trait::async_trait;
use sea_orm::DatabaseConnection;
use tracing::info;

use crate::config::DatabaseConfig;
use crate::errors::{LinktallyError, Result};
use crate::storage::{ClickEvent, LinkPage, LinkStore, LinkSummary, ListQuery, ShortLink};
use crate::utils::retry::RetryPolicy;

pub use connection::{connect_generic, connect_sqlite, run_migrations};

#[derive(Clone)]
pub struct SeaOrmStorage {
    db: DatabaseConnection,
    backend_name: String,
    retry_config: RetryPolicy,
    max_retained_clicks: Option<usize>,
}

impl SeaOrmStorage {
    pub async fn new(database_url: &str, backend_name: &str, config: &DatabaseConfig) -> Result<Self> {
        if database_url.is_empty() {
            return Err(LinktallyError::database_config("database_url is empty"));
        }

        let db = if backend_name == "sqlite" {
            connect_sqlite(database_url).await?
        } else {
            connect_generic(database_url, backend_name, config.pool_size).await?
        };
        run_migrations(&db).await?;

        info!("{} storage initialized", backend_name.to_uppercase());
        Ok(Self {
            db,
            backend_name: backend_name.to_string(),
            retry_config: RetryPolicy {
                max_retries: config.retry_count,
                base_delay_ms: config.retry_base_delay_ms,
                max_delay_ms: config.retry_max_delay_ms,
            },
            max_retained_clicks: None,
        })
    }

    /// Keep at most `max` rows per link in `click_logs`; `None` keeps all
    pub fn with_retention(mut self, max: Option<usize>) -> Self {
        self.max_retained_clicks = max;
        self
    }
}

#[async_trait]
impl LinkStore for SeaOrmStorage {
    async fn find_by_code(&self, code: &str) -> Result<Option<ShortLink>> {
        self.load_link(code).await
    }

    async fn find_summary(&self, code: &str) -> Result<Option<LinkSummary>> {
        self.load_summary(code).await
    }

    async fn exists(&self, code: &str) -> Result<bool> {
        self.code_exists(code).await
    }

    async fn insert(&self, link: &ShortLink) -> Result<()> {
        self.insert_link(link).await
    }

    async fn append_click(&self, code: &str, event: &ClickEvent) -> Result<()> {
        self.record_click(code, event).await
    }

    async fn list(&self, query: &ListQuery) -> Result<LinkPage> {
        self.load_page(query).await
    }

    fn backend_name(&self) -> &str {
        &self.backend_name
    }
}
