//! Tracked link storage operations

use chrono::{DateTime, Utc};
use sea_orm::ActiveValue::{NotSet, Set};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, SqlErr,
};
use tracing::{debug, info};

use super::converters::{link_to_active_model, model_to_link};
use super::{LinkFilter, SeaOrmStorage, retry};
use crate::errors::{LedgerError, Result};
use crate::storage::models::{NewLink, TrackedLink};

use migration::entities::tracked_link;

/// Ids of every link owned by a partner, usable inside a transaction.
pub(super) async fn link_ids_for_partner<C: ConnectionTrait>(
    conn: &C,
    partner_id: i64,
) -> std::result::Result<Vec<i64>, sea_orm::DbErr> {
    tracked_link::Entity::find()
        .select_only()
        .column(tracked_link::Column::Id)
        .filter(tracked_link::Column::PartnerId.eq(partner_id))
        .into_tuple()
        .all(conn)
        .await
}

impl SeaOrmStorage {
    pub async fn insert_link(&self, new: NewLink) -> Result<TrackedLink> {
        let db = &self.db;
        let now = chrono::Utc::now();

        let result = retry::with_write_timeout("insert_link", self.op_timeout_ms, || async {
            link_to_active_model(&new, now).insert(db).await
        })
        .await;

        match result {
            Ok(model) => {
                info!("Link created: {} -> {}", model.slug, model.destination_url);
                model_to_link(model)
            }
            Err(e) => {
                if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
                    Err(LedgerError::validation(format!(
                        "Slug already in use: {}",
                        new.slug
                    )))
                } else {
                    Err(LedgerError::store_unavailable(format!(
                        "Failed to insert link: {}",
                        e
                    )))
                }
            }
        }
    }

    pub async fn get_link(&self, id: i64) -> Result<Option<TrackedLink>> {
        let db = &self.db;

        let model = retry::with_read_retry(
            &format!("get_link({})", id),
            self.read_retry,
            self.op_timeout_ms,
            || async { tracked_link::Entity::find_by_id(id).one(db).await },
        )
        .await
        .map_err(|e| LedgerError::store_unavailable(format!("Failed to load link: {}", e)))?;

        model.map(model_to_link).transpose()
    }

    pub async fn get_link_by_slug(&self, slug: &str) -> Result<Option<TrackedLink>> {
        let db = &self.db;

        let model = retry::with_read_retry(
            &format!("get_link_by_slug({})", slug),
            self.read_retry,
            self.op_timeout_ms,
            || async {
                tracked_link::Entity::find()
                    .filter(tracked_link::Column::Slug.eq(slug))
                    .one(db)
                    .await
            },
        )
        .await
        .map_err(|e| LedgerError::store_unavailable(format!("Failed to load link: {}", e)))?;

        model.map(model_to_link).transpose()
    }

    /// Paginated listing; returns the page plus the total match count.
    /// `page` is 1-based.
    pub async fn list_links(
        &self,
        filter: &LinkFilter,
        page: u64,
        page_size: u64,
    ) -> Result<(Vec<TrackedLink>, u64)> {
        let db = &self.db;

        let mut condition = Condition::all();
        if let Some(search) = &filter.search {
            let pattern = format!("%{}%", search);
            condition = condition.add(
                Condition::any()
                    .add(tracked_link::Column::Slug.like(&pattern))
                    .add(tracked_link::Column::DestinationUrl.like(&pattern)),
            );
        }
        if let Some(partner_id) = filter.partner_id {
            condition = condition.add(tracked_link::Column::PartnerId.eq(partner_id));
        }
        if let Some(product_id) = filter.product_id {
            condition = condition.add(tracked_link::Column::ProductId.eq(product_id));
        }
        if let Some(status) = filter.status {
            condition = condition.add(tracked_link::Column::Status.eq(status.to_string()));
        }
        if let Some(after) = filter.created_after {
            condition = condition.add(tracked_link::Column::CreatedAt.gte(after));
        }
        if let Some(before) = filter.created_before {
            condition = condition.add(tracked_link::Column::CreatedAt.lt(before));
        }

        let (models, total) = retry::with_read_retry(
            "list_links",
            self.read_retry,
            self.op_timeout_ms,
            || async {
                let paginator = tracked_link::Entity::find()
                    .filter(condition.clone())
                    .order_by_desc(tracked_link::Column::CreatedAt)
                    .order_by_desc(tracked_link::Column::Id)
                    .paginate(db, page_size);
                let total = paginator.num_items().await?;
                let models = paginator.fetch_page(page.saturating_sub(1)).await?;
                Ok((models, total))
            },
        )
        .await
        .map_err(|e| LedgerError::store_unavailable(format!("Failed to list links: {}", e)))?;

        let links = models
            .into_iter()
            .map(model_to_link)
            .collect::<Result<Vec<_>>>()?;
        Ok((links, total))
    }

    /// Full-row update of the mutable fields. The slug is fixed at creation
    /// so attribution history stays addressable.
    pub async fn update_link(&self, updated: &TrackedLink) -> Result<TrackedLink> {
        let db = &self.db;

        let active = tracked_link::ActiveModel {
            id: Set(updated.id),
            partner_id: NotSet,
            product_id: NotSet,
            slug: NotSet,
            destination_url: Set(updated.destination_url.clone()),
            utm_source: Set(updated.utm_source.clone()),
            utm_medium: Set(updated.utm_medium.clone()),
            utm_campaign: Set(updated.utm_campaign.clone()),
            status: Set(updated.status.to_string()),
            last_used_at: NotSet,
            created_at: NotSet,
        };

        let result = retry::with_write_timeout(
            &format!("update_link({})", updated.id),
            self.op_timeout_ms,
            || async {
                tracked_link::Entity::update_many()
                    .set(active)
                    .filter(tracked_link::Column::Id.eq(updated.id))
                    .exec(db)
                    .await
            },
        )
        .await
        .map_err(|e| LedgerError::store_unavailable(format!("Failed to update link: {}", e)))?;

        if result.rows_affected == 0 {
            return Err(LedgerError::not_found(format!(
                "Link not found: {}",
                updated.id
            )));
        }

        self.get_link(updated.id)
            .await?
            .ok_or_else(|| LedgerError::not_found(format!("Link not found: {}", updated.id)))
    }

    /// Advances `last_used_at`, never rewinds it. The condition makes the
    /// update a no-op when a later click already landed, so out-of-order
    /// recording keeps the column monotonic.
    pub async fn touch_last_used(&self, link_id: i64, at: DateTime<Utc>) -> Result<()> {
        let db = &self.db;

        let result = retry::with_write_timeout(
            &format!("touch_last_used({})", link_id),
            self.op_timeout_ms,
            || async {
                tracked_link::Entity::update_many()
                    .col_expr(tracked_link::Column::LastUsedAt, Expr::value(at))
                    .filter(tracked_link::Column::Id.eq(link_id))
                    .filter(
                        Condition::any()
                            .add(tracked_link::Column::LastUsedAt.is_null())
                            .add(tracked_link::Column::LastUsedAt.lt(at)),
                    )
                    .exec(db)
                    .await
            },
        )
        .await
        .map_err(|e| {
            LedgerError::store_unavailable(format!("Failed to touch link {}: {}", link_id, e))
        })?;

        if result.rows_affected == 0 {
            debug!("last_used_at already newer for link {}", link_id);
        }
        Ok(())
    }

    /// (link id, partner id) pairs for every link, used to roll click
    /// counts up to partners without a join per query.
    pub async fn link_partner_pairs(&self) -> Result<Vec<(i64, i64)>> {
        let db = &self.db;

        retry::with_read_retry(
            "link_partner_pairs",
            self.read_retry,
            self.op_timeout_ms,
            || async {
                tracked_link::Entity::find()
                    .select_only()
                    .column(tracked_link::Column::Id)
                    .column(tracked_link::Column::PartnerId)
                    .order_by_asc(tracked_link::Column::Id)
                    .into_tuple()
                    .all(db)
                    .await
            },
        )
        .await
        .map_err(|e| LedgerError::store_unavailable(format!("Failed to map links: {}", e)))
    }

    pub async fn link_ids_for_partner(&self, partner_id: i64) -> Result<Vec<i64>> {
        let db = &self.db;

        retry::with_read_retry(
            &format!("link_ids_for_partner({})", partner_id),
            self.read_retry,
            self.op_timeout_ms,
            || async { link_ids_for_partner(db, partner_id).await },
        )
        .await
        .map_err(|e| LedgerError::store_unavailable(format!("Failed to list link ids: {}", e)))
    }
}
