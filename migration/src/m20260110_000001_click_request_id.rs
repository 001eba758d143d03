//! Click idempotency key
//!
//! Adds a nullable request_id column to click_events with a unique index.
//! Callers that retry a delivery reuse the same key and land on the
//! original row instead of inserting a duplicate.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .alter_table(
                Table::alter()
                    .table(ClickEvents::Table)
                    .add_column(ColumnDef::new(ClickEvents::RequestId).string_len(64).null())
                    .to_owned(),
            )
            .await?;

        // SQLite, MySQL and PostgreSQL all treat NULLs as distinct in a
        // unique index, so rows without a key are unaffected.
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_click_events_request_id")
                    .table(ClickEvents::Table)
                    .col(ClickEvents::RequestId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_click_events_request_id").to_owned())
            .await?;

        manager
            .alter_table(
                Table::alter()
                    .table(ClickEvents::Table)
                    .drop_column(ClickEvents::RequestId)
                    .to_owned(),
            )
            .await
    }
}

#[derive(DeriveIden)]
enum ClickEvents {
    #[sea_orm(iden = "click_events")]
    Table,
    RequestId,
}
