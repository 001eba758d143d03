//! Payout entity: a frozen reconciliation snapshot for one partner and period

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "payouts")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub partner_id: i64,
    /// Calendar month in "YYYY-MM" form
    pub period: String,
    pub clicks: i64,
    pub conversions: i64,
    /// Confirmed revenue in the period, minor units
    pub revenue_minor: i64,
    /// Commission owed, computed once at build time
    pub commission_minor: i64,
    pub status: String,
    pub transaction_ref: Option<String>,
    #[sea_orm(column_type = "Text", nullable)]
    pub notes: Option<String>,
    pub created_at: DateTimeUtc,
    pub settled_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
