pub use sea_orm_migration::prelude::*;

pub mod entities;
mod m20251103_000001_partner_catalog;
mod m20251103_000002_tracked_links;
mod m20251110_000001_click_events;
mod m20251118_000001_conversions;
mod m20251201_000001_payouts;
mod m20260110_000001_click_request_id;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20251103_000001_partner_catalog::Migration),
            Box::new(m20251103_000002_tracked_links::Migration),
            Box::new(m20251110_000001_click_events::Migration),
            Box::new(m20251118_000001_conversions::Migration),
            Box::new(m20251201_000001_payouts::Migration),
            Box::new(m20260110_000001_click_request_id::Migration),
        ]
    }
}
