#![allow(dead_code)]

use std::sync::Arc;

use tempfile::TempDir;

use linkledger::config::init_config;
use linkledger::storage::{
    LinkStatus, NewLink, NewPartner, NewProduct, Partner, PartnerStatus, Product, ProductStatus,
    SeaOrmStorage, TrackedLink,
};

/// Fresh SQLite-backed storage in a temp directory, migrations applied.
/// Keep the returned TempDir alive for the test's duration, or the
/// database file disappears under the pool.
pub async fn temp_storage() -> (Arc<SeaOrmStorage>, TempDir) {
    init_config();
    let dir = TempDir::new().expect("create temp dir");
    let db_path = dir.path().join("ledger.db");
    let url = format!("sqlite://{}", db_path.display());
    let storage = SeaOrmStorage::new(&url, "sqlite")
        .await
        .expect("open sqlite storage");
    (Arc::new(storage), dir)
}

pub async fn seed_partner(storage: &SeaOrmStorage, name: &str, rate_bps: i32) -> Partner {
    storage
        .insert_partner(NewPartner {
            name: name.to_string(),
            category: "outdoor".to_string(),
            commission_rate_bps: rate_bps,
            commission_terms: format!("{}bps on confirmed sales", rate_bps),
            destination_url: "https://shop.example.com".to_string(),
            status: PartnerStatus::Active,
        })
        .await
        .expect("insert partner")
}

pub async fn seed_product(storage: &SeaOrmStorage, partner_id: i64, name: &str) -> Product {
    storage
        .insert_product(NewProduct {
            partner_id,
            name: name.to_string(),
            category: "tents".to_string(),
            commission_text: "standard rate".to_string(),
            slug: name.to_lowercase().replace(' ', "-"),
            featured: false,
            status: ProductStatus::Active,
        })
        .await
        .expect("insert product")
}

pub async fn seed_link(
    storage: &SeaOrmStorage,
    partner_id: i64,
    product_id: i64,
    slug: &str,
) -> TrackedLink {
    storage
        .insert_link(NewLink {
            partner_id,
            product_id,
            slug: slug.to_string(),
            destination_url: "https://shop.example.com/deals".to_string(),
            utm_source: None,
            utm_medium: None,
            utm_campaign: None,
            status: LinkStatus::Active,
        })
        .await
        .expect("insert link")
}

/// Partner, product, and link in one call for tests that only need a
/// click or conversion target.
pub async fn seed_funnel(storage: &SeaOrmStorage, slug: &str) -> (Partner, Product, TrackedLink) {
    let partner = seed_partner(storage, "Trailhead Gear", 1_500).await;
    let product = seed_product(storage, partner.id, "Ridge Tent").await;
    let link = seed_link(storage, partner.id, product.id, slug).await;
    (partner, product, link)
}

/// "YYYY-MM" key for the current UTC month, so rows inserted "now" land
/// inside the reconciled window.
pub fn current_period() -> String {
    chrono::Utc::now().format("%Y-%m").to_string()
}
