//! Read-side analytics rollups
//!
//! Every snapshot is recomputed from the click and conversion tables on
//! demand. Nothing here writes, and no counter is persisted, so the
//! numbers can never drift from the ledger.
//!
//! Window semantics: half-open [start, end), keyed off `created_at` for
//! conversions — including confirmed revenue — and `clicked_at` for
//! clicks. Using creation time for revenue keeps `total_conversions`
//! and `total_revenue_minor` answers about the same population.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{LedgerError, Result};
use crate::storage::{ConversionStatus, SeaOrmStorage};

/// Half-open query window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalyticsWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl AnalyticsWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self> {
        if start >= end {
            return Err(LedgerError::validation(format!(
                "Window start {} must precede end {}",
                start, end
            )));
        }
        Ok(Self { start, end })
    }

    /// Trailing window ending now, the default when a query gives no dates
    pub fn trailing_days(days: i64) -> Self {
        let end = Utc::now();
        Self {
            start: end - Duration::days(days.max(1)),
            end,
        }
    }
}

/// Restrict a snapshot to one link or one partner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalyticsScope {
    Link(i64),
    Partner(i64),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkTotals {
    pub link_id: i64,
    pub clicks: i64,
    pub conversions: i64,
    pub conversion_rate: f64,
    pub revenue_minor: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartnerTotals {
    pub partner_id: i64,
    pub clicks: i64,
    pub conversions: i64,
    pub conversion_rate: f64,
    pub revenue_minor: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsSnapshot {
    pub window_start: DateTime<Utc>,
    pub window_end: DateTime<Utc>,
    pub total_clicks: i64,
    pub total_conversions: i64,
    pub conversion_rate: f64,
    /// Confirmed conversions only; pending and reversed never count
    pub total_revenue_minor: i64,
    /// Ordered by link id
    pub links: Vec<LinkTotals>,
    /// Ordered by partner id
    pub partners: Vec<PartnerTotals>,
}

/// conversions / clicks, clamped into [0, 1]. Zero clicks is a rate of
/// zero, never a division error. Manually entered conversions can
/// outnumber recorded clicks, hence the upper clamp.
fn rate(conversions: i64, clicks: i64) -> f64 {
    if clicks <= 0 {
        return 0.0;
    }
    (conversions as f64 / clicks as f64).clamp(0.0, 1.0)
}

#[derive(Default, Clone, Copy)]
struct Bucket {
    clicks: i64,
    conversions: i64,
    revenue_minor: i64,
}

pub struct AnalyticsService {
    storage: Arc<SeaOrmStorage>,
}

impl AnalyticsService {
    pub fn new(storage: Arc<SeaOrmStorage>) -> Self {
        Self { storage }
    }

    /// Compute a snapshot for the window, optionally scoped to one link
    /// or one partner.
    pub async fn snapshot(
        &self,
        window: AnalyticsWindow,
        scope: Option<AnalyticsScope>,
    ) -> Result<AnalyticsSnapshot> {
        let click_counts = self
            .storage
            .clicks_by_link(window.start, window.end)
            .await?;
        let conversions = self
            .storage
            .conversions_in_window(window.start, window.end)
            .await?;
        let partner_of: BTreeMap<i64, i64> =
            self.storage.link_partner_pairs().await?.into_iter().collect();

        let in_scope_link = |link_id: i64| match scope {
            None => true,
            Some(AnalyticsScope::Link(id)) => link_id == id,
            Some(AnalyticsScope::Partner(id)) => partner_of.get(&link_id) == Some(&id),
        };

        // BTreeMap keeps both breakdowns id-ordered, so two snapshots of
        // the same data serialize identically.
        let mut by_link: BTreeMap<i64, Bucket> = BTreeMap::new();
        let mut by_partner: BTreeMap<i64, Bucket> = BTreeMap::new();

        for (link_id, clicks) in click_counts {
            if !in_scope_link(link_id) {
                continue;
            }
            by_link.entry(link_id).or_default().clicks += clicks;
            if let Some(&partner_id) = partner_of.get(&link_id) {
                by_partner.entry(partner_id).or_default().clicks += clicks;
            }
        }

        for conversion in &conversions {
            let in_scope = match scope {
                None => true,
                Some(AnalyticsScope::Link(id)) => conversion.link_id == id,
                Some(AnalyticsScope::Partner(id)) => conversion.partner_id == id,
            };
            if !in_scope {
                continue;
            }
            let confirmed_minor = if conversion.status == ConversionStatus::Confirmed {
                conversion.amount_minor
            } else {
                0
            };

            let link_bucket = by_link.entry(conversion.link_id).or_default();
            link_bucket.conversions += 1;
            link_bucket.revenue_minor += confirmed_minor;

            let partner_bucket = by_partner.entry(conversion.partner_id).or_default();
            partner_bucket.conversions += 1;
            partner_bucket.revenue_minor += confirmed_minor;
        }

        let mut total = Bucket::default();
        for bucket in by_link.values() {
            total.clicks += bucket.clicks;
        }
        // Conversion totals come from the partner rollup, which every
        // conversion reaches via its own partner_id.
        for bucket in by_partner.values() {
            total.conversions += bucket.conversions;
            total.revenue_minor += bucket.revenue_minor;
        }

        Ok(AnalyticsSnapshot {
            window_start: window.start,
            window_end: window.end,
            total_clicks: total.clicks,
            total_conversions: total.conversions,
            conversion_rate: rate(total.conversions, total.clicks),
            total_revenue_minor: total.revenue_minor,
            links: by_link
                .into_iter()
                .map(|(link_id, b)| LinkTotals {
                    link_id,
                    clicks: b.clicks,
                    conversions: b.conversions,
                    conversion_rate: rate(b.conversions, b.clicks),
                    revenue_minor: b.revenue_minor,
                })
                .collect(),
            partners: by_partner
                .into_iter()
                .map(|(partner_id, b)| PartnerTotals {
                    partner_id,
                    clicks: b.clicks,
                    conversions: b.conversions,
                    conversion_rate: rate(b.conversions, b.clicks),
                    revenue_minor: b.revenue_minor,
                })
                .collect(),
        })
    }
}
