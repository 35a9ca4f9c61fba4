//! Durable link store
//!
//! `LinkStore` is the only persistence seam: the SeaORM backend serves
//! SQLite/MySQL/PostgreSQL, `MemoryStore` serves `memory://` and tests.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use crate::config::DatabaseConfig;
use crate::errors::{LinktallyError, Result};

pub mod backend;
pub mod memory;
pub mod models;

pub use backend::SeaOrmStorage;
pub use memory::MemoryStore;
pub use models::{
    ClickEvent, LinkPage, LinkSummary, ListQuery, ShortLink, SortField, SortOrder,
};

#[async_trait]
pub trait LinkStore: Send + Sync {
    /// Full record including retained click history and archived counters
    async fn find_by_code(&self, code: &str) -> Result<Option<ShortLink>>;

    /// Record without click history; the redirect path uses this
    async fn find_summary(&self, code: &str) -> Result<Option<LinkSummary>>;

    async fn exists(&self, code: &str) -> Result<bool>;

    /// Fails with `DuplicateCode` if the code is already taken
    async fn insert(&self, link: &ShortLink) -> Result<()>;

    /// Append `event`, bump `total_clicks` and set `last_accessed` as one
    /// atomic step. Fails with `NotFound` for an unknown code.
    async fn append_click(&self, code: &str, event: &ClickEvent) -> Result<()>;

    async fn list(&self, query: &ListQuery) -> Result<LinkPage>;

    fn backend_name(&self) -> &str;
}

/// 从数据库 URL 推断存储类型
pub fn infer_backend_from_url(database_url: &str) -> Result<&'static str> {
    let url = database_url.trim();
    if url.starts_with("memory://") {
        Ok("memory")
    } else if url.starts_with("sqlite:") || url.ends_with(".db") || url.ends_with(".sqlite") {
        Ok("sqlite")
    } else if url.starts_with("mysql://") || url.starts_with("mariadb://") {
        Ok("mysql")
    } else if url.starts_with("postgres://") || url.starts_with("postgresql://") {
        Ok("postgres")
    } else {
        Err(LinktallyError::database_config(format!(
            "Cannot infer database type from URL: {}. Supported: memory://, sqlite://, *.db, mysql://, mariadb://, postgres://",
            database_url
        )))
    }
}

pub struct StorageFactory;

impl StorageFactory {
    /// Build the store selected by `database.database_url`
    ///
    /// `max_retained_clicks` caps the raw click history kept per link;
    /// `None` keeps everything.
    pub async fn create(
        database: &DatabaseConfig,
        max_retained_clicks: Option<usize>,
    ) -> Result<Arc<dyn LinkStore>> {
        let url = database.database_url.trim();
        let store: Arc<dyn LinkStore> = match infer_backend_from_url(url)? {
            "memory" => Arc::new(MemoryStore::new().with_retention(max_retained_clicks)),
            backend => Arc::new(
                SeaOrmStorage::new(url, backend, database)
                    .await?
                    .with_retention(max_retained_clicks),
            ),
        };

        info!(
            "Storage backend: {} (click retention: {})",
            store.backend_name(),
            max_retained_clicks.map_or_else(|| "unbounded".to_string(), |n| n.to_string())
        );
        Ok(store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_infer_backend_from_url() {
        assert_eq!(infer_backend_from_url("memory://").unwrap(), "memory");
        assert_eq!(infer_backend_from_url("linktally.db").unwrap(), "sqlite");
        assert_eq!(infer_backend_from_url("sqlite://data/links.db").unwrap(), "sqlite");
        assert_eq!(infer_backend_from_url("sqlite::memory:").unwrap(), "sqlite");
        assert_eq!(infer_backend_from_url("mysql://u:p@host/db").unwrap(), "mysql");
        assert_eq!(infer_backend_from_url("mariadb://u:p@host/db").unwrap(), "mysql");
        assert_eq!(infer_backend_from_url("postgresql://host/db").unwrap(), "postgres");
        assert!(matches!(
            infer_backend_from_url("redis://localhost"),
            Err(LinktallyError::DatabaseConfig(_))
        ));
    }

    #[tokio::test]
    async fn test_factory_builds_memory_store() {
        let config = DatabaseConfig {
            database_url: "memory://".to_string(),
            ..Default::default()
        };
        let store = StorageFactory::create(&config, Some(5)).await.unwrap();
        assert_eq!(store.backend_name(), "memory");
    }
}
