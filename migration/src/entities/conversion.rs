//! Conversion entity: a ledger row with a pending -> confirmed | reversed lifecycle

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "conversions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub link_id: i64,
    pub partner_id: i64,
    pub product_id: i64,
    /// Snapshot taken at creation so the row survives product deletion
    pub product_name: String,
    pub product_category: String,
    /// Order value in minor currency units (cents)
    pub amount_minor: i64,
    pub currency: String,
    pub status: String,
    #[sea_orm(column_type = "Text", nullable)]
    pub notes: Option<String>,
    /// Optimistic lock counter, bumped on every state change
    pub version: i32,
    pub created_at: DateTimeUtc,
    pub confirmed_at: Option<DateTimeUtc>,
    pub reversed_at: Option<DateTimeUtc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
