//! Click event storage operations
//!
//! Click rows are append-only: there is no update or delete path. The
//! optional request id doubles as an idempotency key, so a retried
//! delivery lands on the original row instead of inserting a duplicate.

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, SqlErr,
};
use tracing::debug;

use super::converters::{click_to_active_model, model_to_click};
use super::{ClickFilter, SeaOrmStorage, retry};
use crate::errors::{LedgerError, Result};
use crate::storage::models::{ClickEvent, NewClick};

use migration::entities::click_event;

fn click_condition(filter: &ClickFilter) -> Condition {
    let mut condition = Condition::all();
    if let Some(link_id) = filter.link_id {
        condition = condition.add(click_event::Column::LinkId.eq(link_id));
    }
    if let Some(after) = filter.clicked_after {
        condition = condition.add(click_event::Column::ClickedAt.gte(after));
    }
    if let Some(before) = filter.clicked_before {
        condition = condition.add(click_event::Column::ClickedAt.lt(before));
    }
    condition
}

/// Clicks per link inside a window, usable inside a transaction.
/// Returns (link_id, count) pairs; links without clicks are absent.
pub(super) async fn clicks_by_link<C: ConnectionTrait>(
    conn: &C,
    after: DateTime<Utc>,
    before: DateTime<Utc>,
) -> std::result::Result<Vec<(i64, i64)>, sea_orm::DbErr> {
    click_event::Entity::find()
        .select_only()
        .column(click_event::Column::LinkId)
        .column_as(click_event::Column::Id.count(), "clicks")
        .filter(click_event::Column::ClickedAt.gte(after))
        .filter(click_event::Column::ClickedAt.lt(before))
        .group_by(click_event::Column::LinkId)
        .order_by_asc(click_event::Column::LinkId)
        .into_tuple()
        .all(conn)
        .await
}

/// Click count for a set of links inside a window, usable inside a
/// transaction. An empty id set short-circuits to zero.
pub(super) async fn count_clicks_for_links<C: ConnectionTrait>(
    conn: &C,
    link_ids: &[i64],
    after: DateTime<Utc>,
    before: DateTime<Utc>,
) -> std::result::Result<u64, sea_orm::DbErr> {
    if link_ids.is_empty() {
        return Ok(0);
    }
    click_event::Entity::find()
        .filter(click_event::Column::LinkId.is_in(link_ids.iter().copied()))
        .filter(click_event::Column::ClickedAt.gte(after))
        .filter(click_event::Column::ClickedAt.lt(before))
        .count(conn)
        .await
}

impl SeaOrmStorage {
    /// Append one click event. A duplicate request id resolves to the
    /// already-recorded row, so one delivery never produces two events.
    pub async fn insert_click(&self, new: NewClick) -> Result<ClickEvent> {
        let db = &self.db;

        let result = retry::with_write_timeout("insert_click", self.op_timeout_ms, || async {
            click_to_active_model(&new).insert(db).await
        })
        .await;

        match result {
            Ok(model) => Ok(model_to_click(model)),
            Err(e) => {
                if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
                    if let Some(request_id) = &new.request_id {
                        debug!("Duplicate click request {}, returning original", request_id);
                        return self
                            .get_click_by_request_id(request_id)
                            .await?
                            .ok_or_else(|| {
                                LedgerError::store_unavailable(format!(
                                    "Duplicate click request {} but original row missing",
                                    request_id
                                ))
                            });
                    }
                }
                Err(LedgerError::store_unavailable(format!(
                    "Failed to insert click: {}",
                    e
                )))
            }
        }
    }

    pub async fn get_click_by_request_id(&self, request_id: &str) -> Result<Option<ClickEvent>> {
        let db = &self.db;

        let model = retry::with_read_retry(
            &format!("get_click_by_request_id({})", request_id),
            self.read_retry,
            self.op_timeout_ms,
            || async {
                click_event::Entity::find()
                    .filter(click_event::Column::RequestId.eq(request_id))
                    .one(db)
                    .await
            },
        )
        .await
        .map_err(|e| LedgerError::store_unavailable(format!("Failed to load click: {}", e)))?;

        Ok(model.map(model_to_click))
    }

    pub async fn count_clicks(&self, filter: &ClickFilter) -> Result<u64> {
        let db = &self.db;
        let condition = click_condition(filter);

        retry::with_read_retry(
            "count_clicks",
            self.read_retry,
            self.op_timeout_ms,
            || async {
                click_event::Entity::find()
                    .filter(condition.clone())
                    .count(db)
                    .await
            },
        )
        .await
        .map_err(|e| LedgerError::store_unavailable(format!("Failed to count clicks: {}", e)))
    }

    /// Ordered by timestamp then id so an export of the same data is
    /// always row-for-row identical.
    pub async fn list_clicks(&self, filter: &ClickFilter, limit: u64) -> Result<Vec<ClickEvent>> {
        let db = &self.db;
        let condition = click_condition(filter);

        let models = retry::with_read_retry(
            "list_clicks",
            self.read_retry,
            self.op_timeout_ms,
            || async {
                click_event::Entity::find()
                    .filter(condition.clone())
                    .order_by_asc(click_event::Column::ClickedAt)
                    .order_by_asc(click_event::Column::Id)
                    .limit(limit)
                    .all(db)
                    .await
            },
        )
        .await
        .map_err(|e| LedgerError::store_unavailable(format!("Failed to list clicks: {}", e)))?;

        Ok(models.into_iter().map(model_to_click).collect())
    }

    /// Per-link click counts inside a window.
    pub async fn clicks_by_link(
        &self,
        after: DateTime<Utc>,
        before: DateTime<Utc>,
    ) -> Result<Vec<(i64, i64)>> {
        let db = &self.db;

        retry::with_read_retry(
            "clicks_by_link",
            self.read_retry,
            self.op_timeout_ms,
            || async { clicks_by_link(db, after, before).await },
        )
        .await
        .map_err(|e| LedgerError::store_unavailable(format!("Failed to group clicks: {}", e)))
    }
}
