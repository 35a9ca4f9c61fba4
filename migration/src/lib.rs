pub use sea_orm_migration::prelude::*;

pub mod entities;
mod m20260301_000001_short_links;
mod m20260301_000002_click_logs;
mod m20260302_000001_click_rollups;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260301_000001_short_links::Migration),
            Box::new(m20260301_000002_click_logs::Migration),
            Box::new(m20260302_000001_click_rollups::Migration),
        ]
    }
}
