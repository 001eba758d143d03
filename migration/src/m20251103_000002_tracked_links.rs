//! Tracked links table
//!
//! Creates tracked_links with a unique slug index. The slug is the public
//! identity of a link; uniqueness is enforced here, not in application code.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(TrackedLinks::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(TrackedLinks::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(TrackedLinks::PartnerId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TrackedLinks::ProductId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TrackedLinks::Slug)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TrackedLinks::DestinationUrl)
                            .text()
                            .not_null(),
                    )
                    .col(ColumnDef::new(TrackedLinks::UtmSource).string_len(255).null())
                    .col(ColumnDef::new(TrackedLinks::UtmMedium).string_len(255).null())
                    .col(
                        ColumnDef::new(TrackedLinks::UtmCampaign)
                            .string_len(255)
                            .null(),
                    )
                    .col(
                        ColumnDef::new(TrackedLinks::Status)
                            .string_len(20)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(TrackedLinks::LastUsedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(TrackedLinks::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_tracked_links_slug")
                    .table(TrackedLinks::Table)
                    .col(TrackedLinks::Slug)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_tracked_links_partner_id")
                    .table(TrackedLinks::Table)
                    .col(TrackedLinks::PartnerId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_tracked_links_product_id")
                    .table(TrackedLinks::Table)
                    .col(TrackedLinks::ProductId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_tracked_links_product_id").to_owned())
            .await?;

        manager
            .drop_index(Index::drop().name("idx_tracked_links_partner_id").to_owned())
            .await?;

        manager
            .drop_index(Index::drop().name("idx_tracked_links_slug").to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(TrackedLinks::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum TrackedLinks {
    #[sea_orm(iden = "tracked_links")]
    Table,
    Id,
    PartnerId,
    ProductId,
    Slug,
    DestinationUrl,
    UtmSource,
    UtmMedium,
    UtmCampaign,
    Status,
    LastUsedAt,
    CreatedAt,
}
