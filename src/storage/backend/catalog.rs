//! Partner and product storage operations

use sea_orm::ActiveValue::{NotSet, Set};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder};
use tracing::info;

use super::converters::{
    model_to_partner, model_to_product, partner_to_active_model, product_to_active_model,
};
use super::{SeaOrmStorage, retry};
use crate::errors::{LedgerError, Result};
use crate::storage::models::{NewPartner, NewProduct, Partner, PartnerStatus, Product};

use migration::entities::{partner, product};

impl SeaOrmStorage {
    // ============ Partners ============

    pub async fn insert_partner(&self, new: NewPartner) -> Result<Partner> {
        let db = &self.db;
        let now = chrono::Utc::now();

        let model = retry::with_write_timeout("insert_partner", self.op_timeout_ms, || async {
            partner_to_active_model(&new, now).insert(db).await
        })
        .await
        .map_err(|e| LedgerError::store_unavailable(format!("Failed to insert partner: {}", e)))?;

        info!("Partner created: {} ({})", model.name, model.id);
        model_to_partner(model)
    }

    pub async fn get_partner(&self, id: i64) -> Result<Option<Partner>> {
        let db = &self.db;

        let model = retry::with_read_retry(
            &format!("get_partner({})", id),
            self.read_retry,
            self.op_timeout_ms,
            || async { partner::Entity::find_by_id(id).one(db).await },
        )
        .await
        .map_err(|e| LedgerError::store_unavailable(format!("Failed to load partner: {}", e)))?;

        model.map(model_to_partner).transpose()
    }

    pub async fn list_partners(&self, status: Option<PartnerStatus>) -> Result<Vec<Partner>> {
        let db = &self.db;

        let models = retry::with_read_retry(
            "list_partners",
            self.read_retry,
            self.op_timeout_ms,
            || async {
                let mut query = partner::Entity::find().order_by_asc(partner::Column::Id);
                if let Some(status) = status {
                    query = query.filter(partner::Column::Status.eq(status.to_string()));
                }
                query.all(db).await
            },
        )
        .await
        .map_err(|e| LedgerError::store_unavailable(format!("Failed to list partners: {}", e)))?;

        models.into_iter().map(model_to_partner).collect()
    }

    /// Full-row update; the service layer decides which fields changed.
    pub async fn update_partner(&self, updated: &Partner) -> Result<Partner> {
        let db = &self.db;

        let active = partner::ActiveModel {
            id: Set(updated.id),
            name: Set(updated.name.clone()),
            category: Set(updated.category.clone()),
            commission_rate_bps: Set(updated.commission_rate_bps),
            commission_terms: Set(updated.commission_terms.clone()),
            destination_url: Set(updated.destination_url.clone()),
            status: Set(updated.status.to_string()),
            created_at: NotSet,
        };

        let result = retry::with_write_timeout(
            &format!("update_partner({})", updated.id),
            self.op_timeout_ms,
            || async {
                partner::Entity::update_many()
                    .set(active)
                    .filter(partner::Column::Id.eq(updated.id))
                    .exec(db)
                    .await
            },
        )
        .await
        .map_err(|e| LedgerError::store_unavailable(format!("Failed to update partner: {}", e)))?;

        if result.rows_affected == 0 {
            return Err(LedgerError::not_found(format!(
                "Partner not found: {}",
                updated.id
            )));
        }

        self.get_partner(updated.id).await?.ok_or_else(|| {
            LedgerError::not_found(format!("Partner not found: {}", updated.id))
        })
    }

    // ============ Products ============

    pub async fn insert_product(&self, new: NewProduct) -> Result<Product> {
        let db = &self.db;
        let now = chrono::Utc::now();

        let model = retry::with_write_timeout("insert_product", self.op_timeout_ms, || async {
            product_to_active_model(&new, now).insert(db).await
        })
        .await
        .map_err(|e| LedgerError::store_unavailable(format!("Failed to insert product: {}", e)))?;

        info!("Product created: {} ({})", model.name, model.id);
        model_to_product(model)
    }

    pub async fn get_product(&self, id: i64) -> Result<Option<Product>> {
        let db = &self.db;

        let model = retry::with_read_retry(
            &format!("get_product({})", id),
            self.read_retry,
            self.op_timeout_ms,
            || async { product::Entity::find_by_id(id).one(db).await },
        )
        .await
        .map_err(|e| LedgerError::store_unavailable(format!("Failed to load product: {}", e)))?;

        model.map(model_to_product).transpose()
    }

    pub async fn list_products(&self, partner_id: Option<i64>) -> Result<Vec<Product>> {
        let db = &self.db;

        let models = retry::with_read_retry(
            "list_products",
            self.read_retry,
            self.op_timeout_ms,
            || async {
                let mut query = product::Entity::find().order_by_asc(product::Column::Id);
                if let Some(partner_id) = partner_id {
                    query = query.filter(product::Column::PartnerId.eq(partner_id));
                }
                query.all(db).await
            },
        )
        .await
        .map_err(|e| LedgerError::store_unavailable(format!("Failed to list products: {}", e)))?;

        models.into_iter().map(model_to_product).collect()
    }

    pub async fn update_product(&self, updated: &Product) -> Result<Product> {
        let db = &self.db;

        let active = product::ActiveModel {
            id: Set(updated.id),
            partner_id: NotSet,
            name: Set(updated.name.clone()),
            category: Set(updated.category.clone()),
            commission_text: Set(updated.commission_text.clone()),
            slug: Set(updated.slug.clone()),
            featured: Set(updated.featured),
            status: Set(updated.status.to_string()),
            created_at: NotSet,
        };

        let result = retry::with_write_timeout(
            &format!("update_product({})", updated.id),
            self.op_timeout_ms,
            || async {
                product::Entity::update_many()
                    .set(active)
                    .filter(product::Column::Id.eq(updated.id))
                    .exec(db)
                    .await
            },
        )
        .await
        .map_err(|e| LedgerError::store_unavailable(format!("Failed to update product: {}", e)))?;

        if result.rows_affected == 0 {
            return Err(LedgerError::not_found(format!(
                "Product not found: {}",
                updated.id
            )));
        }

        self.get_product(updated.id).await?.ok_or_else(|| {
            LedgerError::not_found(format!("Product not found: {}", updated.id))
        })
    }

    /// Deleting a product leaves its conversions intact; they carry their
    /// own name/category snapshot.
    pub async fn delete_product(&self, id: i64) -> Result<()> {
        let db = &self.db;

        let result = retry::with_write_timeout(
            &format!("delete_product({})", id),
            self.op_timeout_ms,
            || async { product::Entity::delete_by_id(id).exec(db).await },
        )
        .await
        .map_err(|e| LedgerError::store_unavailable(format!("Failed to delete product: {}", e)))?;

        if result.rows_affected == 0 {
            return Err(LedgerError::not_found(format!("Product not found: {}", id)));
        }

        info!("Product deleted: {}", id);
        Ok(())
    }
}
