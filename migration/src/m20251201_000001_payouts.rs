//! Payouts table
//!
//! No unique constraint on (partner_id, period): rebuilding a period after
//! late reversals inserts a fresh draft and leaves prior rows untouched.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Payouts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Payouts::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Payouts::PartnerId).big_integer().not_null())
                    .col(ColumnDef::new(Payouts::Period).string_len(7).not_null())
                    .col(ColumnDef::new(Payouts::Clicks).big_integer().not_null())
                    .col(ColumnDef::new(Payouts::Conversions).big_integer().not_null())
                    .col(
                        ColumnDef::new(Payouts::RevenueMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Payouts::CommissionMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Payouts::Status).string_len(20).not_null())
                    .col(
                        ColumnDef::new(Payouts::TransactionRef)
                            .string_len(255)
                            .null(),
                    )
                    .col(ColumnDef::new(Payouts::Notes).text().null())
                    .col(
                        ColumnDef::new(Payouts::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Payouts::SettledAt)
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
                    .name("idx_payouts_partner_period")
                    .table(Payouts::Table)
                    .col(Payouts::PartnerId)
                    .col(Payouts::Period)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_payouts_status")
                    .table(Payouts::Table)
                    .col(Payouts::Status)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_payouts_status").to_owned())
            .await?;

        manager
            .drop_index(Index::drop().name("idx_payouts_partner_period").to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Payouts::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Payouts {
    #[sea_orm(iden = "payouts")]
    Table,
    Id,
    PartnerId,
    Period,
    Clicks,
    Conversions,
    RevenueMinor,
    CommissionMinor,
    Status,
    TransactionRef,
    Notes,
    CreatedAt,
    SettledAt,
}
