//! Domain models shared between the storage backend and the services
//!
//! Status enums are persisted as lowercase strings; the state machines
//! for conversions and payouts live here so they can be tested without
//! a database.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

// ============ Status enums ============

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PartnerStatus {
    Active,
    Paused,
    Archived,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ProductStatus {
    Active,
    Draft,
    Archived,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LinkStatus {
    Active,
    Paused,
    Archived,
    Testing,
}

impl LinkStatus {
    /// Whether a link in this status may serve a redirect.
    /// Testing links resolve only when preview mode is on.
    pub fn resolvable(self, preview_mode: bool) -> bool {
        match self {
            LinkStatus::Active => true,
            LinkStatus::Testing => preview_mode,
            LinkStatus::Paused | LinkStatus::Archived => false,
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ConversionStatus {
    Pending,
    Confirmed,
    Reversed,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PayoutStatus {
    Pending,
    Paid,
    Cancelled,
}

/// What a requested state change amounts to, given the current state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionOutcome {
    /// Legal transition, apply it
    Apply,
    /// Already in the target state, succeed without writing
    NoOp,
    /// Illegal transition, reject
    Conflict,
}

impl ConversionStatus {
    /// Pending may confirm or reverse; a confirmed conversion may still be
    /// reversed (charge-back), but a reversal is final. Re-requesting the
    /// state a row is already in is a no-op, not an error.
    pub fn transition_to(self, target: ConversionStatus) -> TransitionOutcome {
        use ConversionStatus::*;
        match (self, target) {
            (Pending, Confirmed) | (Pending, Reversed) | (Confirmed, Reversed) => {
                TransitionOutcome::Apply
            }
            (Confirmed, Confirmed) | (Reversed, Reversed) => TransitionOutcome::NoOp,
            _ => TransitionOutcome::Conflict,
        }
    }
}

impl PayoutStatus {
    /// Paid and cancelled are terminal; a pending payout may go to either.
    pub fn transition_to(self, target: PayoutStatus) -> TransitionOutcome {
        use PayoutStatus::*;
        match (self, target) {
            (Pending, Paid) | (Pending, Cancelled) => TransitionOutcome::Apply,
            (Paid, Paid) | (Cancelled, Cancelled) => TransitionOutcome::NoOp,
            _ => TransitionOutcome::Conflict,
        }
    }
}

// ============ Domain records ============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Partner {
    pub id: i64,
    pub name: String,
    pub category: String,
    pub commission_rate_bps: i32,
    pub commission_terms: String,
    pub destination_url: String,
    pub status: PartnerStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub partner_id: i64,
    pub name: String,
    pub category: String,
    pub commission_text: String,
    pub slug: String,
    pub featured: bool,
    pub status: ProductStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackedLink {
    pub id: i64,
    pub partner_id: i64,
    pub product_id: i64,
    pub slug: String,
    pub destination_url: String,
    pub utm_source: Option<String>,
    pub utm_medium: Option<String>,
    pub utm_campaign: Option<String>,
    pub status: LinkStatus,
    pub last_used_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClickEvent {
    pub id: i64,
    pub link_id: i64,
    pub clicked_at: DateTime<Utc>,
    pub referrer: Option<String>,
    pub is_conversion: bool,
    pub conversion_value_minor: Option<i64>,
    pub request_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversion {
    pub id: i64,
    pub link_id: i64,
    pub partner_id: i64,
    pub product_id: i64,
    pub product_name: String,
    pub product_category: String,
    pub amount_minor: i64,
    pub currency: String,
    pub status: ConversionStatus,
    pub notes: Option<String>,
    pub version: i32,
    pub created_at: DateTime<Utc>,
    pub confirmed_at: Option<DateTime<Utc>>,
    pub reversed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payout {
    pub id: i64,
    pub partner_id: i64,
    pub period: String,
    pub clicks: i64,
    pub conversions: i64,
    pub revenue_minor: i64,
    pub commission_minor: i64,
    pub status: PayoutStatus,
    pub transaction_ref: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub settled_at: Option<DateTime<Utc>>,
}

// ============ Insert payloads ============

#[derive(Debug, Clone)]
pub struct NewPartner {
    pub name: String,
    pub category: String,
    pub commission_rate_bps: i32,
    pub commission_terms: String,
    pub destination_url: String,
    pub status: PartnerStatus,
}

#[derive(Debug, Clone)]
pub struct NewProduct {
    pub partner_id: i64,
    pub name: String,
    pub category: String,
    pub commission_text: String,
    pub slug: String,
    pub featured: bool,
    pub status: ProductStatus,
}

#[derive(Debug, Clone)]
pub struct NewLink {
    pub partner_id: i64,
    pub product_id: i64,
    pub slug: String,
    pub destination_url: String,
    pub utm_source: Option<String>,
    pub utm_medium: Option<String>,
    pub utm_campaign: Option<String>,
    pub status: LinkStatus,
}

#[derive(Debug, Clone)]
pub struct NewClick {
    pub link_id: i64,
    pub clicked_at: DateTime<Utc>,
    pub referrer: Option<String>,
    pub conversion_value_minor: Option<i64>,
    pub request_id: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewConversion {
    pub link_id: i64,
    pub partner_id: i64,
    pub product_id: i64,
    pub product_name: String,
    pub product_category: String,
    pub amount_minor: i64,
    pub currency: String,
    pub notes: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewPayout {
    pub partner_id: i64,
    pub period: String,
    pub clicks: i64,
    pub conversions: i64,
    pub revenue_minor: i64,
    pub commission_minor: i64,
    pub notes: Option<String>,
}
