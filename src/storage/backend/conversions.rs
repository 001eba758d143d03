//! Conversion ledger storage operations
//!
//! Rows are inserted as pending and only ever change through
//! `transition_conversion`, which takes an optimistic version lock.
//! There is no delete path: a wrong conversion is reversed, keeping the
//! audit trail intact for payout reconciliation.

use chrono::{DateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, QueryFilter,
    QueryOrder, QuerySelect,
};
use tracing::{debug, info};

use super::converters::{conversion_to_active_model, model_to_conversion};
use super::{ConversionFilter, SeaOrmStorage, retry};
use crate::errors::{LedgerError, Result};
use crate::storage::models::{Conversion, ConversionStatus, NewConversion, TransitionOutcome};

use migration::entities::conversion;

fn conversion_condition(filter: &ConversionFilter) -> Condition {
    let mut condition = Condition::all();
    if let Some(link_id) = filter.link_id {
        condition = condition.add(conversion::Column::LinkId.eq(link_id));
    }
    if let Some(partner_id) = filter.partner_id {
        condition = condition.add(conversion::Column::PartnerId.eq(partner_id));
    }
    if let Some(status) = filter.status {
        condition = condition.add(conversion::Column::Status.eq(status.to_string()));
    }
    if let Some(after) = filter.created_after {
        condition = condition.add(conversion::Column::CreatedAt.gte(after));
    }
    if let Some(before) = filter.created_before {
        condition = condition.add(conversion::Column::CreatedAt.lt(before));
    }
    condition
}

/// A partner's conversions created inside a window, usable inside a
/// transaction. The payout builder folds counts and revenue from these
/// rows so everything comes from one consistent read.
pub(super) async fn conversions_for_partner<C: ConnectionTrait>(
    conn: &C,
    partner_id: i64,
    after: DateTime<Utc>,
    before: DateTime<Utc>,
) -> std::result::Result<Vec<conversion::Model>, sea_orm::DbErr> {
    conversion::Entity::find()
        .filter(conversion::Column::PartnerId.eq(partner_id))
        .filter(conversion::Column::CreatedAt.gte(after))
        .filter(conversion::Column::CreatedAt.lt(before))
        .order_by_asc(conversion::Column::Id)
        .all(conn)
        .await
}

impl SeaOrmStorage {
    pub async fn insert_conversion(&self, new: NewConversion) -> Result<Conversion> {
        let db = &self.db;
        let now = chrono::Utc::now();

        let model =
            retry::with_write_timeout("insert_conversion", self.op_timeout_ms, || async {
                conversion_to_active_model(&new, now).insert(db).await
            })
            .await
            .map_err(|e| {
                LedgerError::store_unavailable(format!("Failed to insert conversion: {}", e))
            })?;

        info!(
            "Conversion recorded: id={} link={} amount={} {}",
            model.id, model.link_id, model.amount_minor, model.currency
        );
        model_to_conversion(model)
    }

    pub async fn get_conversion(&self, id: i64) -> Result<Option<Conversion>> {
        let db = &self.db;

        let model = retry::with_read_retry(
            &format!("get_conversion({})", id),
            self.read_retry,
            self.op_timeout_ms,
            || async { conversion::Entity::find_by_id(id).one(db).await },
        )
        .await
        .map_err(|e| LedgerError::store_unavailable(format!("Failed to load conversion: {}", e)))?;

        model.map(model_to_conversion).transpose()
    }

    pub async fn list_conversions(
        &self,
        filter: &ConversionFilter,
        limit: u64,
    ) -> Result<Vec<Conversion>> {
        let db = &self.db;
        let condition = conversion_condition(filter);

        let models = retry::with_read_retry(
            "list_conversions",
            self.read_retry,
            self.op_timeout_ms,
            || async {
                conversion::Entity::find()
                    .filter(condition.clone())
                    .order_by_asc(conversion::Column::CreatedAt)
                    .order_by_asc(conversion::Column::Id)
                    .limit(limit)
                    .all(db)
                    .await
            },
        )
        .await
        .map_err(|e| {
            LedgerError::store_unavailable(format!("Failed to list conversions: {}", e))
        })?;

        models.into_iter().map(model_to_conversion).collect()
    }

    /// Move a conversion toward `target`, serialized per row by the
    /// version column.
    ///
    /// The UPDATE only matches the version this call read; zero affected
    /// rows means another writer got there first, and the outcome is
    /// decided by re-reading: the row already being in `target` is an
    /// idempotent success, anything else is a concurrent-modification
    /// error for the caller to retry.
    pub async fn transition_conversion(
        &self,
        id: i64,
        target: ConversionStatus,
        at: DateTime<Utc>,
    ) -> Result<Conversion> {
        let db = &self.db;

        let current = self
            .get_conversion(id)
            .await?
            .ok_or_else(|| LedgerError::not_found(format!("Conversion not found: {}", id)))?;

        match current.status.transition_to(target) {
            TransitionOutcome::NoOp => {
                debug!("Conversion {} already {}, no-op", id, target);
                return Ok(current);
            }
            TransitionOutcome::Conflict => {
                return Err(LedgerError::invalid_transition(format!(
                    "Conversion {} cannot move from {} to {}",
                    id, current.status, target
                )));
            }
            TransitionOutcome::Apply => {}
        }

        let mut update = conversion::Entity::update_many()
            .col_expr(conversion::Column::Status, Expr::value(target.to_string()))
            .col_expr(
                conversion::Column::Version,
                Expr::value(current.version + 1),
            );
        update = match target {
            ConversionStatus::Confirmed => {
                update.col_expr(conversion::Column::ConfirmedAt, Expr::value(Some(at)))
            }
            ConversionStatus::Reversed => {
                update.col_expr(conversion::Column::ReversedAt, Expr::value(Some(at)))
            }
            ConversionStatus::Pending => unreachable!("pending is never a transition target"),
        };

        let result = retry::with_write_timeout(
            &format!("transition_conversion({}, {})", id, target),
            self.op_timeout_ms,
            || async {
                update
                    .filter(conversion::Column::Id.eq(id))
                    .filter(conversion::Column::Version.eq(current.version))
                    .exec(db)
                    .await
            },
        )
        .await
        .map_err(|e| {
            LedgerError::store_unavailable(format!("Failed to update conversion {}: {}", id, e))
        })?;

        let latest = self
            .get_conversion(id)
            .await?
            .ok_or_else(|| LedgerError::not_found(format!("Conversion not found: {}", id)))?;

        if result.rows_affected == 0 {
            if latest.status == target {
                debug!("Conversion {} raced to {} by another writer", id, target);
                return Ok(latest);
            }
            return Err(LedgerError::concurrent_modification(format!(
                "Conversion {} changed concurrently (now {}), retry",
                id, latest.status
            )));
        }

        info!("Conversion {} -> {}", id, target);
        Ok(latest)
    }

    /// Conversions created inside a window, every status, ordered by id.
    /// The analytics service folds counts and confirmed revenue from
    /// these rows.
    pub async fn conversions_in_window(
        &self,
        after: DateTime<Utc>,
        before: DateTime<Utc>,
    ) -> Result<Vec<Conversion>> {
        let db = &self.db;

        let models = retry::with_read_retry(
            "conversions_in_window",
            self.read_retry,
            self.op_timeout_ms,
            || async {
                conversion::Entity::find()
                    .filter(conversion::Column::CreatedAt.gte(after))
                    .filter(conversion::Column::CreatedAt.lt(before))
                    .order_by_asc(conversion::Column::Id)
                    .all(db)
                    .await
            },
        )
        .await
        .map_err(|e| {
            LedgerError::store_unavailable(format!("Failed to scan conversions: {}", e))
        })?;

        models.into_iter().map(model_to_conversion).collect()
    }
}
