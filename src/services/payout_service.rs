//! Payout reconciliation
//!
//! Turns a partner's confirmed conversions for a calendar month into a
//! draft payout. Building reads a consistent snapshot and writes one new
//! row; it never touches conversions and never overwrites an earlier
//! payout for the same period, finalized or not.

use std::sync::Arc;

use tracing::info;

use crate::errors::Result;
use crate::storage::backend::PayoutFilter;
use crate::storage::{NewPayout, Payout, PayoutStatus, SeaOrmStorage};
use crate::utils::money::commission_minor;
use crate::utils::period::month_window;

pub struct PayoutService {
    storage: Arc<SeaOrmStorage>,
}

impl PayoutService {
    pub fn new(storage: Arc<SeaOrmStorage>) -> Self {
        Self { storage }
    }

    /// Build a draft payout for one partner and one "YYYY-MM" period.
    ///
    /// Clicks, conversion count, and confirmed revenue are read inside a
    /// single transaction, then the partner's commission rate (basis
    /// points, rounded half-up) prices the draft. Rebuilding the same
    /// period inserts a fresh draft next to any existing payout.
    pub async fn build(&self, partner_id: i64, period: &str) -> Result<Payout> {
        let partner = self
            .storage
            .get_partner(partner_id)
            .await?
            .ok_or_else(|| {
                crate::errors::LedgerError::not_found(format!("Partner not found: {}", partner_id))
            })?;

        let (start, end) = month_window(period)?;
        let totals = self
            .storage
            .reconciliation_totals(partner_id, start, end)
            .await?;

        let commission = commission_minor(totals.revenue_minor, partner.commission_rate_bps);
        info!(
            "PayoutService: partner {} period {}: {} clicks, {} conversions, revenue {} -> commission {}",
            partner_id, period, totals.clicks, totals.conversions, totals.revenue_minor, commission
        );

        self.storage
            .insert_payout(NewPayout {
                partner_id,
                period: period.to_string(),
                clicks: totals.clicks,
                conversions: totals.conversions,
                revenue_minor: totals.revenue_minor,
                commission_minor: commission,
                notes: None,
            })
            .await
    }

    pub async fn get(&self, id: i64) -> Result<Payout> {
        self.storage.get_payout(id).await?.ok_or_else(|| {
            crate::errors::LedgerError::not_found(format!("Payout not found: {}", id))
        })
    }

    pub async fn list(&self, filter: &PayoutFilter) -> Result<Vec<Payout>> {
        self.storage.list_payouts(filter).await
    }

    /// Mark a pending draft paid or cancelled; both are terminal.
    pub async fn set_status(&self, id: i64, target: PayoutStatus) -> Result<Payout> {
        self.storage
            .set_payout_status(id, target, chrono::Utc::now())
            .await
    }

    /// Edit the manual override fields on a pending draft.
    pub async fn edit_details(
        &self,
        id: i64,
        transaction_ref: Option<String>,
        notes: Option<String>,
    ) -> Result<Payout> {
        self.storage
            .update_payout_details(id, transaction_ref, notes)
            .await
    }
}
