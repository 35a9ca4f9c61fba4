use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // short_code 主键即唯一约束，生成码与自定义别名共用同一命名空间
        manager
            .create_table(
                Table::create()
                    .table(ShortLinks::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ShortLinks::ShortCode)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ShortLinks::OriginalUrl).text().not_null())
                    .col(
                        ColumnDef::new(ShortLinks::IsCustomAlias)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(ShortLinks::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ShortLinks::ExpiresAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(ShortLinks::LastAccessed)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(ShortLinks::TotalClicks)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_short_links_created_at")
                    .table(ShortLinks::Table)
                    .col(ShortLinks::CreatedAt)
                    .to_owned(),
            )
            .await?;

        // 列表页按点击数排序
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_short_links_clicks_created")
                    .table(ShortLinks::Table)
                    .col(ShortLinks::TotalClicks)
                    .col(ShortLinks::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_short_links_clicks_created").to_owned())
            .await?;

        manager
            .drop_index(Index::drop().name("idx_short_links_created_at").to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(ShortLinks::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum ShortLinks {
    Table,
    ShortCode,
    OriginalUrl,
    IsCustomAlias,
    CreatedAt,
    ExpiresAt,
    LastAccessed,
    TotalClicks,
}
