//! Partner and product console management
//!
//! Partners are never deleted, only archived, because conversions and
//! payouts reference them forever. Products may be deleted; historical
//! conversions keep their own name/category snapshot.

use std::sync::Arc;

use tracing::info;

use crate::errors::{LedgerError, Result};
use crate::storage::{
    NewPartner, NewProduct, Partner, PartnerStatus, Product, ProductStatus, SeaOrmStorage,
};
use crate::utils::is_valid_slug;
use crate::utils::url_check::validate_destination;

#[derive(Debug, Clone)]
pub struct PartnerDraft {
    pub name: String,
    pub category: String,
    pub commission_rate_bps: i32,
    pub commission_terms: String,
    pub destination_url: String,
    pub status: PartnerStatus,
}

#[derive(Debug, Clone)]
pub struct ProductDraft {
    pub partner_id: i64,
    pub name: String,
    pub category: String,
    pub commission_text: String,
    pub slug: String,
    pub featured: bool,
    pub status: ProductStatus,
}

pub struct CatalogService {
    storage: Arc<SeaOrmStorage>,
}

impl CatalogService {
    pub fn new(storage: Arc<SeaOrmStorage>) -> Self {
        Self { storage }
    }

    // ============ Partners ============

    pub async fn create_partner(&self, draft: PartnerDraft) -> Result<Partner> {
        if draft.name.trim().is_empty() {
            return Err(LedgerError::validation("Partner name cannot be empty"));
        }
        if !(0..=10_000).contains(&draft.commission_rate_bps) {
            return Err(LedgerError::validation(format!(
                "Commission rate must be 0..=10000 bps, got {}",
                draft.commission_rate_bps
            )));
        }
        validate_destination(&draft.destination_url)?;

        self.storage
            .insert_partner(NewPartner {
                name: draft.name,
                category: draft.category,
                commission_rate_bps: draft.commission_rate_bps,
                commission_terms: draft.commission_terms,
                destination_url: draft.destination_url,
                status: draft.status,
            })
            .await
    }

    pub async fn get_partner(&self, id: i64) -> Result<Partner> {
        self.storage
            .get_partner(id)
            .await?
            .ok_or_else(|| LedgerError::not_found(format!("Partner not found: {}", id)))
    }

    pub async fn list_partners(&self, status: Option<PartnerStatus>) -> Result<Vec<Partner>> {
        self.storage.list_partners(status).await
    }

    pub async fn update_partner(&self, updated: Partner) -> Result<Partner> {
        if !(0..=10_000).contains(&updated.commission_rate_bps) {
            return Err(LedgerError::validation(format!(
                "Commission rate must be 0..=10000 bps, got {}",
                updated.commission_rate_bps
            )));
        }
        validate_destination(&updated.destination_url)?;
        self.storage.update_partner(&updated).await
    }

    /// Deactivation instead of deletion keeps every historical payout
    /// and conversion resolvable.
    pub async fn archive_partner(&self, id: i64) -> Result<Partner> {
        let mut partner = self.get_partner(id).await?;
        partner.status = PartnerStatus::Archived;
        let partner = self.storage.update_partner(&partner).await?;
        info!("CatalogService: partner {} archived", id);
        Ok(partner)
    }

    // ============ Products ============

    pub async fn create_product(&self, draft: ProductDraft) -> Result<Product> {
        if draft.name.trim().is_empty() {
            return Err(LedgerError::validation("Product name cannot be empty"));
        }
        if !is_valid_slug(&draft.slug) {
            return Err(LedgerError::validation(format!(
                "Invalid product slug: {:?}",
                draft.slug
            )));
        }
        self.get_partner(draft.partner_id).await?;

        self.storage
            .insert_product(NewProduct {
                partner_id: draft.partner_id,
                name: draft.name,
                category: draft.category,
                commission_text: draft.commission_text,
                slug: draft.slug,
                featured: draft.featured,
                status: draft.status,
            })
            .await
    }

    pub async fn get_product(&self, id: i64) -> Result<Product> {
        self.storage
            .get_product(id)
            .await?
            .ok_or_else(|| LedgerError::not_found(format!("Product not found: {}", id)))
    }

    pub async fn list_products(&self, partner_id: Option<i64>) -> Result<Vec<Product>> {
        self.storage.list_products(partner_id).await
    }

    pub async fn update_product(&self, updated: Product) -> Result<Product> {
        if !is_valid_slug(&updated.slug) {
            return Err(LedgerError::validation(format!(
                "Invalid product slug: {:?}",
                updated.slug
            )));
        }
        self.storage.update_product(&updated).await
    }

    /// Chosen deletion policy: allowed at any time. Conversions recorded
    /// against the product are untouched because they denormalized the
    /// product name and category at creation.
    pub async fn delete_product(&self, id: i64) -> Result<()> {
        self.storage.delete_product(id).await
    }
}
