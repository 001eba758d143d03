//! Route table
//!
//! Public surface: the redirect endpoint and /api/health. Everything
//! else under /api requires the bearer token.

use actix_web::middleware::from_fn;
use actix_web::web;

use super::{analytics, catalog, conversions, export, health, links, middleware, payouts, redirect};

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/health", web::get().to(health::health_check))
            .service(
                web::scope("")
                    .wrap(from_fn(middleware::admin_auth))
                    // tracked links
                    .route("/links", web::get().to(links::list_links))
                    .route("/links", web::post().to(links::create_link))
                    .route("/links/{id}", web::get().to(links::get_link))
                    .route("/links/{id}", web::put().to(links::update_link))
                    // partners and products
                    .route("/partners", web::get().to(catalog::list_partners))
                    .route("/partners", web::post().to(catalog::create_partner))
                    .route("/partners/{id}", web::get().to(catalog::get_partner))
                    .route("/partners/{id}", web::put().to(catalog::update_partner))
                    .route(
                        "/partners/{id}/archive",
                        web::post().to(catalog::archive_partner),
                    )
                    .route(
                        "/partners/{id}/products",
                        web::get().to(catalog::list_partner_products),
                    )
                    .route("/products", web::post().to(catalog::create_product))
                    .route("/products/{id}", web::get().to(catalog::get_product))
                    .route("/products/{id}", web::put().to(catalog::update_product))
                    .route("/products/{id}", web::delete().to(catalog::delete_product))
                    // conversion ledger
                    .route(
                        "/conversions",
                        web::get().to(conversions::list_conversions),
                    )
                    .route(
                        "/conversions",
                        web::post().to(conversions::record_conversion),
                    )
                    .route(
                        "/conversions/{id}",
                        web::get().to(conversions::get_conversion),
                    )
                    .route(
                        "/conversions/{id}/confirm",
                        web::post().to(conversions::confirm_conversion),
                    )
                    .route(
                        "/conversions/{id}/reverse",
                        web::post().to(conversions::reverse_conversion),
                    )
                    // analytics
                    .route("/analytics", web::get().to(analytics::get_analytics))
                    // payouts
                    .route("/payouts", web::get().to(payouts::list_payouts))
                    .route("/payouts", web::post().to(payouts::build_payout))
                    .route("/payouts/{id}", web::get().to(payouts::get_payout))
                    .route("/payouts/{id}", web::put().to(payouts::update_payout))
                    .route(
                        "/payouts/{id}/status",
                        web::post().to(payouts::set_payout_status),
                    )
                    // exports
                    .route("/export/{kind}.csv", web::get().to(export::export_csv))
                    .route("/export/{kind}.json", web::get().to(export::export_json)),
            ),
    )
    .route("/t/{slug}", web::get().to(redirect::handle_redirect))
    .route("/t/{slug}", web::head().to(redirect::handle_redirect));
}
