//! click_logs: append-only visit history, insertion order == chronological order

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ClickLogs::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ClickLogs::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ClickLogs::ShortCode)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ClickLogs::ClickedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ClickLogs::IpAddress).string_len(45).null())
                    .col(ColumnDef::new(ClickLogs::Country).string_len(64).null())
                    .col(ColumnDef::new(ClickLogs::City).string_len(128).null())
                    .col(ColumnDef::new(ClickLogs::UserAgent).text().null())
                    .col(ColumnDef::new(ClickLogs::Referer).text().null())
                    .to_owned(),
            )
            .await?;

        // 单链接按 id 顺序读取历史
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_click_logs_code_id")
                    .table(ClickLogs::Table)
                    .col(ClickLogs::ShortCode)
                    .col(ClickLogs::Id)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_click_logs_code_id").to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(ClickLogs::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum ClickLogs {
    Table,
    Id,
    ShortCode,
    ClickedAt,
    IpAddress,
    Country,
    City,
    UserAgent,
    Referer,
}
