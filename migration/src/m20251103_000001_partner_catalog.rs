//! Partner catalog tables
//!
//! Creates the partners and products tables. Products belong to a partner
//! but are not FK-constrained: conversions keep their own name/category
//! snapshot, so catalog rows may be deleted at any time.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Partners::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Partners::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Partners::Name).string_len(255).not_null())
                    .col(
                        ColumnDef::new(Partners::Category)
                            .string_len(100)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Partners::CommissionRateBps)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Partners::CommissionTerms).text().not_null())
                    .col(ColumnDef::new(Partners::DestinationUrl).text().not_null())
                    .col(ColumnDef::new(Partners::Status).string_len(20).not_null())
                    .col(
                        ColumnDef::new(Partners::CreatedAt)
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
                    .name("idx_partners_status")
                    .table(Partners::Table)
                    .col(Partners::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Products::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Products::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Products::PartnerId).big_integer().not_null())
                    .col(ColumnDef::new(Products::Name).string_len(255).not_null())
                    .col(
                        ColumnDef::new(Products::Category)
                            .string_len(100)
                            .not_null(),
                    )
                    .col(ColumnDef::new(Products::CommissionText).text().not_null())
                    .col(ColumnDef::new(Products::Slug).string_len(255).not_null())
                    .col(ColumnDef::new(Products::Featured).boolean().not_null())
                    .col(ColumnDef::new(Products::Status).string_len(20).not_null())
                    .col(
                        ColumnDef::new(Products::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // Partner page listing
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_products_partner_id")
                    .table(Products::Table)
                    .col(Products::PartnerId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_products_partner_id").to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Products::Table).to_owned())
            .await?;

        manager
            .drop_index(Index::drop().name("idx_partners_status").to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Partners::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Partners {
    #[sea_orm(iden = "partners")]
    Table,
    Id,
    Name,
    Category,
    CommissionRateBps,
    CommissionTerms,
    DestinationUrl,
    Status,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Products {
    #[sea_orm(iden = "products")]
    Table,
    Id,
    PartnerId,
    Name,
    Category,
    CommissionText,
    Slug,
    Featured,
    Status,
    CreatedAt,
}
