//! Request and response types for the management API

use serde::{Deserialize, Serialize};

use crate::errors::{LedgerError, Result};
use crate::storage::{ConversionStatus, LinkStatus, PartnerStatus, PayoutStatus, ProductStatus};

pub(super) fn parse_rfc3339(raw: &str) -> Result<chrono::DateTime<chrono::Utc>> {
    chrono::DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&chrono::Utc))
        .map_err(|_| LedgerError::date_parse(format!("Expected RFC3339 timestamp, got: {}", raw)))
}

// ============ Links ============

#[derive(Deserialize, Clone, Debug)]
pub struct PostLink {
    pub partner_id: i64,
    pub product_id: i64,
    pub slug: Option<String>,
    pub destination_url: String,
    pub utm_source: Option<String>,
    pub utm_medium: Option<String>,
    pub utm_campaign: Option<String>,
    pub status: Option<LinkStatus>,
}

/// Omitted fields stay as they are; an empty UTM string clears the field
#[derive(Deserialize, Clone, Debug)]
pub struct PutLink {
    pub destination_url: Option<String>,
    pub utm_source: Option<String>,
    pub utm_medium: Option<String>,
    pub utm_campaign: Option<String>,
    pub status: Option<LinkStatus>,
}

#[derive(Deserialize, Clone, Debug)]
pub struct GetLinksQuery {
    pub page: Option<u64>,
    pub page_size: Option<u64>,
    pub search: Option<String>,
    pub partner_id: Option<i64>,
    pub product_id: Option<i64>,
    pub status: Option<LinkStatus>,
    pub created_after: Option<String>,
    pub created_before: Option<String>,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct PaginationInfo {
    pub page: u64,
    pub page_size: u64,
    pub total: u64,
    pub total_pages: u64,
}

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct PaginatedLinks<T> {
    pub items: Vec<T>,
    pub pagination: PaginationInfo,
}

// ============ Partners and products ============

#[derive(Deserialize, Clone, Debug)]
pub struct PostPartner {
    pub name: String,
    pub category: String,
    pub commission_rate_bps: i32,
    pub commission_terms: Option<String>,
    pub destination_url: String,
    pub status: Option<PartnerStatus>,
}

#[derive(Deserialize, Clone, Debug)]
pub struct PutPartner {
    pub name: Option<String>,
    pub category: Option<String>,
    pub commission_rate_bps: Option<i32>,
    pub commission_terms: Option<String>,
    pub destination_url: Option<String>,
    pub status: Option<PartnerStatus>,
}

#[derive(Deserialize, Clone, Debug)]
pub struct GetPartnersQuery {
    pub status: Option<PartnerStatus>,
}

#[derive(Deserialize, Clone, Debug)]
pub struct PostProduct {
    pub partner_id: i64,
    pub name: String,
    pub category: String,
    pub commission_text: Option<String>,
    pub slug: String,
    pub featured: Option<bool>,
    pub status: Option<ProductStatus>,
}

#[derive(Deserialize, Clone, Debug)]
pub struct PutProduct {
    pub name: Option<String>,
    pub category: Option<String>,
    pub commission_text: Option<String>,
    pub slug: Option<String>,
    pub featured: Option<bool>,
    pub status: Option<ProductStatus>,
}

// ============ Conversions ============

#[derive(Deserialize, Clone, Debug)]
pub struct PostConversion {
    pub link_id: i64,
    pub amount_minor: i64,
    pub currency: String,
    pub notes: Option<String>,
}

#[derive(Deserialize, Clone, Debug)]
pub struct GetConversionsQuery {
    pub link_id: Option<i64>,
    pub partner_id: Option<i64>,
    pub status: Option<ConversionStatus>,
    pub created_after: Option<String>,
    pub created_before: Option<String>,
    pub limit: Option<u64>,
}

// ============ Analytics ============

/// Explicit start/end win over `days`; all absent means the configured
/// trailing default. `link_id` and `partner_id` are mutually exclusive.
#[derive(Deserialize, Clone, Debug)]
pub struct AnalyticsQuery {
    pub start: Option<String>,
    pub end: Option<String>,
    pub days: Option<i64>,
    pub link_id: Option<i64>,
    pub partner_id: Option<i64>,
}

// ============ Payouts ============

#[derive(Deserialize, Clone, Debug)]
pub struct PostPayout {
    pub partner_id: i64,
    pub period: String,
}

#[derive(Deserialize, Clone, Debug)]
pub struct PutPayout {
    pub transaction_ref: Option<String>,
    pub notes: Option<String>,
}

#[derive(Deserialize, Clone, Debug)]
pub struct PostPayoutStatus {
    pub status: PayoutStatus,
}

#[derive(Deserialize, Clone, Debug)]
pub struct GetPayoutsQuery {
    pub partner_id: Option<i64>,
    pub status: Option<PayoutStatus>,
    pub period: Option<String>,
}

// ============ Export ============

#[derive(Deserialize, Clone, Debug)]
pub struct ExportQuery {
    pub start: Option<String>,
    pub end: Option<String>,
    pub days: Option<i64>,
    pub link_id: Option<i64>,
    pub partner_id: Option<i64>,
    pub status: Option<PayoutStatus>,
    pub period: Option<String>,
    pub limit: Option<u64>,
}
