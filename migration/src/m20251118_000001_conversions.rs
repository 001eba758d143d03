//! Conversions ledger table
//!
//! Rows carry a product name/category snapshot and an optimistic lock
//! version so concurrent confirm/reverse races resolve to one winner.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Conversions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Conversions::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Conversions::LinkId).big_integer().not_null())
                    .col(
                        ColumnDef::new(Conversions::PartnerId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Conversions::ProductId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Conversions::ProductName)
                            .string_len(255)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Conversions::ProductCategory)
                            .string_len(100)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Conversions::AmountMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Conversions::Currency).string_len(3).not_null())
                    .col(ColumnDef::new(Conversions::Status).string_len(20).not_null())
                    .col(ColumnDef::new(Conversions::Notes).text().null())
                    .col(
                        ColumnDef::new(Conversions::Version)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Conversions::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Conversions::ConfirmedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Conversions::ReversedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_conversions_link_id")
                    .table(Conversions::Table)
                    .col(Conversions::LinkId)
                    .to_owned(),
            )
            .await?;

        // Payout reconciliation scans a partner over a created_at window
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_conversions_partner_time")
                    .table(Conversions::Table)
                    .col(Conversions::PartnerId)
                    .col(Conversions::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_conversions_status")
                    .table(Conversions::Table)
                    .col(Conversions::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_conversions_created_at")
                    .table(Conversions::Table)
                    .col(Conversions::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_conversions_created_at").to_owned())
            .await?;

        manager
            .drop_index(Index::drop().name("idx_conversions_status").to_owned())
            .await?;

        manager
            .drop_index(Index::drop().name("idx_conversions_partner_time").to_owned())
            .await?;

        manager
            .drop_index(Index::drop().name("idx_conversions_link_id").to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Conversions::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Conversions {
    #[sea_orm(iden = "conversions")]
    Table,
    Id,
    LinkId,
    PartnerId,
    ProductId,
    ProductName,
    ProductCategory,
    AmountMinor,
    Currency,
    Status,
    Notes,
    Version,
    CreatedAt,
    ConfirmedAt,
    ReversedAt,
}
