//! Payout storage operations
//!
//! A payout row is a point-in-time reconciliation snapshot. The numbers
//! are computed inside one transaction so clicks and conversions come
//! from the same read boundary, then frozen: nothing recomputes a payout
//! after insert.

use chrono::{DateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, QueryFilter, QueryOrder,
    TransactionTrait,
};
use tracing::{debug, info};

use super::converters::{model_to_payout, payout_to_active_model};
use super::{PayoutFilter, SeaOrmStorage, clicks, conversions, links, retry};
use crate::errors::{LedgerError, Result};
use crate::storage::models::{ConversionStatus, NewPayout, Payout, PayoutStatus, TransitionOutcome};

use migration::entities::payout;

/// Aggregates read for one partner and window, all from one transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconciliationTotals {
    pub clicks: i64,
    pub conversions: i64,
    pub revenue_minor: i64,
}

impl SeaOrmStorage {
    /// Count a partner's clicks and conversions and sum confirmed revenue
    /// for a window, inside a single transaction. Writes landing after
    /// the transaction began are excluded wholesale, never half-applied.
    pub async fn reconciliation_totals(
        &self,
        partner_id: i64,
        after: DateTime<Utc>,
        before: DateTime<Utc>,
    ) -> Result<ReconciliationTotals> {
        let db = &self.db;

        let totals = retry::with_read_retry(
            &format!("reconciliation_totals({})", partner_id),
            self.read_retry,
            self.op_timeout_ms,
            || async {
                let txn = db.begin().await?;

                let link_ids = links::link_ids_for_partner(&txn, partner_id).await?;
                let click_count =
                    clicks::count_clicks_for_links(&txn, &link_ids, after, before).await?;
                let rows =
                    conversions::conversions_for_partner(&txn, partner_id, after, before).await?;

                txn.commit().await?;

                let revenue_minor: i64 = rows
                    .iter()
                    .filter(|row| row.status == ConversionStatus::Confirmed.to_string())
                    .map(|row| row.amount_minor)
                    .sum();

                Ok(ReconciliationTotals {
                    clicks: click_count as i64,
                    conversions: rows.len() as i64,
                    revenue_minor,
                })
            },
        )
        .await
        .map_err(|e| {
            LedgerError::store_unavailable(format!(
                "Failed to reconcile partner {}: {}",
                partner_id, e
            ))
        })?;

        Ok(totals)
    }

    /// Always inserts a new draft row; an existing payout for the same
    /// partner and period is left untouched, finalized or not.
    pub async fn insert_payout(&self, new: NewPayout) -> Result<Payout> {
        let db = &self.db;
        let now = chrono::Utc::now();

        let model = retry::with_write_timeout("insert_payout", self.op_timeout_ms, || async {
            payout_to_active_model(&new, now).insert(db).await
        })
        .await
        .map_err(|e| LedgerError::store_unavailable(format!("Failed to insert payout: {}", e)))?;

        info!(
            "Payout draft created: id={} partner={} period={} commission={}",
            model.id, model.partner_id, model.period, model.commission_minor
        );
        model_to_payout(model)
    }

    pub async fn get_payout(&self, id: i64) -> Result<Option<Payout>> {
        let db = &self.db;

        let model = retry::with_read_retry(
            &format!("get_payout({})", id),
            self.read_retry,
            self.op_timeout_ms,
            || async { payout::Entity::find_by_id(id).one(db).await },
        )
        .await
        .map_err(|e| LedgerError::store_unavailable(format!("Failed to load payout: {}", e)))?;

        model.map(model_to_payout).transpose()
    }

    pub async fn list_payouts(&self, filter: &PayoutFilter) -> Result<Vec<Payout>> {
        let db = &self.db;

        let mut condition = Condition::all();
        if let Some(partner_id) = filter.partner_id {
            condition = condition.add(payout::Column::PartnerId.eq(partner_id));
        }
        if let Some(status) = filter.status {
            condition = condition.add(payout::Column::Status.eq(status.to_string()));
        }
        if let Some(period) = &filter.period {
            condition = condition.add(payout::Column::Period.eq(period.clone()));
        }

        let models = retry::with_read_retry(
            "list_payouts",
            self.read_retry,
            self.op_timeout_ms,
            || async {
                payout::Entity::find()
                    .filter(condition.clone())
                    .order_by_asc(payout::Column::Id)
                    .all(db)
                    .await
            },
        )
        .await
        .map_err(|e| LedgerError::store_unavailable(format!("Failed to list payouts: {}", e)))?;

        models.into_iter().map(model_to_payout).collect()
    }

    /// Mark a payout paid or cancelled. The UPDATE is guarded by the
    /// current status, so two operators settling the same draft resolve
    /// to one winner; the loser sees an idempotent success or a
    /// concurrent-modification error.
    pub async fn set_payout_status(
        &self,
        id: i64,
        target: PayoutStatus,
        at: DateTime<Utc>,
    ) -> Result<Payout> {
        let db = &self.db;

        let current = self
            .get_payout(id)
            .await?
            .ok_or_else(|| LedgerError::not_found(format!("Payout not found: {}", id)))?;

        match current.status.transition_to(target) {
            TransitionOutcome::NoOp => {
                debug!("Payout {} already {}, no-op", id, target);
                return Ok(current);
            }
            TransitionOutcome::Conflict => {
                return Err(LedgerError::invalid_transition(format!(
                    "Payout {} cannot move from {} to {}",
                    id, current.status, target
                )));
            }
            TransitionOutcome::Apply => {}
        }

        let result = retry::with_write_timeout(
            &format!("set_payout_status({}, {})", id, target),
            self.op_timeout_ms,
            || async {
                payout::Entity::update_many()
                    .col_expr(payout::Column::Status, Expr::value(target.to_string()))
                    .col_expr(payout::Column::SettledAt, Expr::value(Some(at)))
                    .filter(payout::Column::Id.eq(id))
                    .filter(payout::Column::Status.eq(current.status.to_string()))
                    .exec(db)
                    .await
            },
        )
        .await
        .map_err(|e| {
            LedgerError::store_unavailable(format!("Failed to update payout {}: {}", id, e))
        })?;

        let latest = self
            .get_payout(id)
            .await?
            .ok_or_else(|| LedgerError::not_found(format!("Payout not found: {}", id)))?;

        if result.rows_affected == 0 {
            if latest.status == target {
                return Ok(latest);
            }
            return Err(LedgerError::concurrent_modification(format!(
                "Payout {} changed concurrently (now {}), retry",
                id, latest.status
            )));
        }

        info!("Payout {} -> {}", id, target);
        Ok(latest)
    }

    /// Operator edits to the manual override fields, allowed only while
    /// the payout is still a pending draft.
    pub async fn update_payout_details(
        &self,
        id: i64,
        transaction_ref: Option<String>,
        notes: Option<String>,
    ) -> Result<Payout> {
        let db = &self.db;

        let result = retry::with_write_timeout(
            &format!("update_payout_details({})", id),
            self.op_timeout_ms,
            || async {
                payout::Entity::update_many()
                    .col_expr(
                        payout::Column::TransactionRef,
                        Expr::value(transaction_ref.clone()),
                    )
                    .col_expr(payout::Column::Notes, Expr::value(notes.clone()))
                    .filter(payout::Column::Id.eq(id))
                    .filter(payout::Column::Status.eq(PayoutStatus::Pending.to_string()))
                    .exec(db)
                    .await
            },
        )
        .await
        .map_err(|e| {
            LedgerError::store_unavailable(format!("Failed to update payout {}: {}", id, e))
        })?;

        if result.rows_affected == 0 {
            let existing = self
                .get_payout(id)
                .await?
                .ok_or_else(|| LedgerError::not_found(format!("Payout not found: {}", id)))?;
            return Err(LedgerError::invalid_transition(format!(
                "Payout {} is {}, only pending drafts can be edited",
                id, existing.status
            )));
        }

        self.get_payout(id)
            .await?
            .ok_or_else(|| LedgerError::not_found(format!("Payout not found: {}", id)))
    }
}
