//! click_rollups: counters for events trimmed out of click_logs by the retention cap

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ClickRollups::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ClickRollups::ShortCode)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ClickRollups::Dimension)
                            .string_len(16)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ClickRollups::Bucket)
                            .string_len(128)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ClickRollups::ClickCount)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .primary_key(
                        Index::create()
                            .col(ClickRollups::ShortCode)
                            .col(ClickRollups::Dimension)
                            .col(ClickRollups::Bucket),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ClickRollups::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum ClickRollups {
    Table,
    ShortCode,
    Dimension,
    Bucket,
    ClickCount,
}
