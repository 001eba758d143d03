//! Partner entity: an affiliate program the engine tracks links for

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "partners")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub name: String,
    pub category: String,
    /// Commission rate in basis points (850 = 8.5%)
    pub commission_rate_bps: i32,
    #[sea_orm(column_type = "Text")]
    pub commission_terms: String,
    #[sea_orm(column_type = "Text")]
    pub destination_url: String,
    pub status: String,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
