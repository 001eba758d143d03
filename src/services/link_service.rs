//! Tracked link management and slug resolution

use std::sync::Arc;

use tracing::{debug, info};

use crate::errors::{LedgerError, Result};
use crate::storage::backend::LinkFilter;
use crate::storage::{LinkStatus, NewLink, SeaOrmStorage, TrackedLink};
use crate::utils::url_check::validate_destination;
use crate::utils::{generate_random_slug, is_valid_slug};

/// Creation payload from the console. A missing slug gets a random one.
#[derive(Debug, Clone)]
pub struct LinkDraft {
    pub partner_id: i64,
    pub product_id: i64,
    pub slug: Option<String>,
    pub destination_url: String,
    pub utm_source: Option<String>,
    pub utm_medium: Option<String>,
    pub utm_campaign: Option<String>,
    pub status: LinkStatus,
}

/// Editable fields; the slug and ownership are fixed at creation
#[derive(Debug, Clone)]
pub struct LinkUpdate {
    pub destination_url: Option<String>,
    pub utm_source: Option<Option<String>>,
    pub utm_medium: Option<Option<String>>,
    pub utm_campaign: Option<Option<String>>,
    pub status: Option<LinkStatus>,
}

pub struct LinkService {
    storage: Arc<SeaOrmStorage>,
}

impl LinkService {
    pub fn new(storage: Arc<SeaOrmStorage>) -> Self {
        Self { storage }
    }

    /// Create a tracked link after validating slug, destination, and that
    /// the product actually belongs to the named partner. Slug collisions
    /// surface as a validation error from the unique index.
    pub async fn create_link(&self, draft: LinkDraft) -> Result<TrackedLink> {
        validate_destination(&draft.destination_url)?;

        let slug = match draft.slug {
            Some(slug) => {
                if !is_valid_slug(&slug) {
                    return Err(LedgerError::validation(format!(
                        "Invalid slug: {:?} (letters, digits, - and _ only)",
                        slug
                    )));
                }
                slug
            }
            None => {
                let length = crate::config::get_config().engine.default_slug_length;
                let slug = generate_random_slug(length);
                debug!("Generated slug: {}", slug);
                slug
            }
        };

        let product = self
            .storage
            .get_product(draft.product_id)
            .await?
            .ok_or_else(|| {
                LedgerError::not_found(format!("Product not found: {}", draft.product_id))
            })?;
        if product.partner_id != draft.partner_id {
            return Err(LedgerError::validation(format!(
                "Product {} belongs to partner {}, not {}",
                product.id, product.partner_id, draft.partner_id
            )));
        }

        let link = self
            .storage
            .insert_link(NewLink {
                partner_id: draft.partner_id,
                product_id: draft.product_id,
                slug,
                destination_url: draft.destination_url,
                utm_source: draft.utm_source,
                utm_medium: draft.utm_medium,
                utm_campaign: draft.utm_campaign,
                status: draft.status,
            })
            .await?;

        info!("LinkService: created link {} ({})", link.slug, link.id);
        Ok(link)
    }

    /// Resolve a public slug to its link, honoring status rules.
    ///
    /// Active links always resolve; testing links resolve only when
    /// preview mode is enabled; everything else is reported inactive.
    /// Lookup alone has no side effects.
    pub async fn resolve(&self, slug: &str) -> Result<TrackedLink> {
        let link = self
            .storage
            .get_link_by_slug(slug)
            .await?
            .ok_or_else(|| LedgerError::not_found(format!("No link for slug: {}", slug)))?;

        let preview_mode = crate::config::get_config().engine.preview_mode;
        if !link.status.resolvable(preview_mode) {
            debug!("Slug {} found but link is {}", slug, link.status);
            return Err(LedgerError::link_inactive(format!(
                "Link {} is {}",
                slug, link.status
            )));
        }

        Ok(link)
    }

    pub async fn get_link(&self, id: i64) -> Result<TrackedLink> {
        self.storage
            .get_link(id)
            .await?
            .ok_or_else(|| LedgerError::not_found(format!("Link not found: {}", id)))
    }

    pub async fn list_links(
        &self,
        filter: &LinkFilter,
        page: u64,
        page_size: u64,
    ) -> Result<(Vec<TrackedLink>, u64)> {
        let engine = &crate::config::get_config().engine;
        let page = page.max(1);
        let page_size = page_size.clamp(1, engine.max_page_size);
        self.storage.list_links(filter, page, page_size).await
    }

    pub async fn update_link(&self, id: i64, update: LinkUpdate) -> Result<TrackedLink> {
        let mut link = self.get_link(id).await?;

        if let Some(destination_url) = update.destination_url {
            validate_destination(&destination_url)?;
            link.destination_url = destination_url;
        }
        if let Some(utm_source) = update.utm_source {
            link.utm_source = utm_source;
        }
        if let Some(utm_medium) = update.utm_medium {
            link.utm_medium = utm_medium;
        }
        if let Some(utm_campaign) = update.utm_campaign {
            link.utm_campaign = utm_campaign;
        }
        if let Some(status) = update.status {
            link.status = status;
        }

        self.storage.update_link(&link).await
    }
}
