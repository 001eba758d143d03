//! HTTP surface tests: auth, redirect, and the management envelope.

mod common;

use std::sync::{Arc, Once};

use actix_web::{App, test, web};
use serde_json::Value;

use linkledger::api::routes;
use linkledger::services::{
    AnalyticsService, CatalogService, ClickRecorder, ConversionLedger, HealthService, LinkService,
    PayoutService,
};
use linkledger::storage::backend::ClickFilter;
use linkledger::storage::{LinkStatus, NewLink, SeaOrmStorage};

const TEST_TOKEN: &str = "test-token";

/// The token must be in the environment before the global config loads.
fn ensure_api_token() {
    static INIT: Once = Once::new();
    INIT.call_once(|| unsafe {
        std::env::set_var("LL__SERVER__API_TOKEN", TEST_TOKEN);
    });
}

/// Full application wired like the real server, minus CORS.
macro_rules! test_app {
    ($storage:expr) => {{
        let storage: Arc<SeaOrmStorage> = $storage;
        test::init_service(
            App::new()
                .app_data(web::Data::new(Arc::clone(&storage)))
                .app_data(web::Data::new(LinkService::new(Arc::clone(&storage))))
                .app_data(web::Data::new(ClickRecorder::new(Arc::clone(&storage))))
                .app_data(web::Data::new(ConversionLedger::new(Arc::clone(&storage))))
                .app_data(web::Data::new(CatalogService::new(Arc::clone(&storage))))
                .app_data(web::Data::new(AnalyticsService::new(Arc::clone(&storage))))
                .app_data(web::Data::new(PayoutService::new(Arc::clone(&storage))))
                .app_data(web::Data::new(HealthService::new(Arc::clone(&storage))))
                .configure(routes::configure),
        )
        .await
    }};
}

fn bearer(req: test::TestRequest) -> test::TestRequest {
    req.insert_header(("Authorization", format!("Bearer {}", TEST_TOKEN)))
}

#[actix_web::test]
async fn health_endpoint_is_public() {
    ensure_api_token();
    let (storage, _dir) = common::temp_storage().await;
    let app = test_app!(storage);

    let resp = test::call_service(&app, test::TestRequest::get().uri("/api/health").to_request())
        .await;
    assert!(resp.status().is_success());

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["code"], 0);
    assert_eq!(body["data"]["backend"], "sqlite");
    assert_eq!(body["data"]["storage_ok"], true);
}

#[actix_web::test]
async fn management_api_requires_bearer_token() {
    ensure_api_token();
    let (storage, _dir) = common::temp_storage().await;
    let app = test_app!(storage);

    let resp = test::call_service(&app, test::TestRequest::get().uri("/api/links").to_request())
        .await;
    assert_eq!(resp.status().as_u16(), 401);

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/links")
            .insert_header(("Authorization", "Bearer wrong-token"))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status().as_u16(), 401);

    let resp = test::call_service(
        &app,
        bearer(test::TestRequest::get().uri("/api/links")).to_request(),
    )
    .await;
    assert!(resp.status().is_success());

    // CORS preflight passes without a token
    let resp = test::call_service(
        &app,
        test::TestRequest::with_uri("/api/links")
            .method(actix_web::http::Method::OPTIONS)
            .to_request(),
    )
    .await;
    assert_eq!(resp.status().as_u16(), 204);
}

#[actix_web::test]
async fn link_crud_round_trips_through_the_api() {
    ensure_api_token();
    let (storage, _dir) = common::temp_storage().await;
    let partner = common::seed_partner(&storage, "Trailhead Gear", 1_500).await;
    let product = common::seed_product(&storage, partner.id, "Ridge Tent").await;
    let app = test_app!(storage);

    let resp = test::call_service(
        &app,
        bearer(test::TestRequest::post().uri("/api/links").set_json(serde_json::json!({
            "partner_id": partner.id,
            "product_id": product.id,
            "slug": "tent-deal",
            "destination_url": "https://shop.example.com/deals",
            "utm_source": "newsletter"
        })))
        .to_request(),
    )
    .await;
    assert!(resp.status().is_success());
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["code"], 0);
    let link_id = body["data"]["id"].as_i64().unwrap();
    assert_eq!(body["data"]["slug"], "tent-deal");

    // duplicate slug
    let resp = test::call_service(
        &app,
        bearer(test::TestRequest::post().uri("/api/links").set_json(serde_json::json!({
            "partner_id": partner.id,
            "product_id": product.id,
            "slug": "tent-deal",
            "destination_url": "https://shop.example.com/deals"
        })))
        .to_request(),
    )
    .await;
    assert_eq!(resp.status().as_u16(), 400);

    let resp = test::call_service(
        &app,
        bearer(test::TestRequest::get().uri(&format!("/api/links/{}", link_id))).to_request(),
    )
    .await;
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["utm_source"], "newsletter");

    // empty string clears a UTM field, omitted fields stay
    let resp = test::call_service(
        &app,
        bearer(
            test::TestRequest::put()
                .uri(&format!("/api/links/{}", link_id))
                .set_json(serde_json::json!({ "utm_source": "", "status": "paused" })),
        )
        .to_request(),
    )
    .await;
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["utm_source"], Value::Null);
    assert_eq!(body["data"]["status"], "paused");

    let resp = test::call_service(
        &app,
        bearer(test::TestRequest::get().uri("/api/links?page=1&page_size=10")).to_request(),
    )
    .await;
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["pagination"]["total"], 1);

    let resp = test::call_service(
        &app,
        bearer(test::TestRequest::get().uri("/api/links/99999")).to_request(),
    )
    .await;
    assert_eq!(resp.status().as_u16(), 404);
}

#[actix_web::test]
async fn redirect_records_click_and_appends_utm() {
    ensure_api_token();
    let (storage, _dir) = common::temp_storage().await;
    let partner = common::seed_partner(&storage, "Trailhead Gear", 1_500).await;
    let product = common::seed_product(&storage, partner.id, "Ridge Tent").await;
    let link = storage
        .insert_link(NewLink {
            partner_id: partner.id,
            product_id: product.id,
            slug: "promo".to_string(),
            destination_url: "https://shop.example.com/deals".to_string(),
            utm_source: Some("newsletter".to_string()),
            utm_medium: Some("email".to_string()),
            utm_campaign: None,
            status: LinkStatus::Active,
        })
        .await
        .unwrap();
    let app = test_app!(storage.clone());

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/t/promo")
            .insert_header(("Referer", "https://news.example.org/review"))
            .insert_header(("X-Request-Id", "req-1"))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status().as_u16(), 307);
    let location = resp.headers().get("Location").unwrap().to_str().unwrap();
    assert_eq!(
        location,
        "https://shop.example.com/deals?utm_source=newsletter&utm_medium=email"
    );

    let filter = ClickFilter {
        link_id: Some(link.id),
        ..Default::default()
    };
    assert_eq!(storage.count_clicks(&filter).await.unwrap(), 1);
    let events = storage.list_clicks(&filter, 10).await.unwrap();
    assert_eq!(
        events[0].referrer.as_deref(),
        Some("https://news.example.org/review")
    );

    // a retried request with the same id does not double-count
    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/t/promo")
            .insert_header(("X-Request-Id", "req-1"))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status().as_u16(), 307);
    assert_eq!(storage.count_clicks(&filter).await.unwrap(), 1);

    // without a request id every visit counts
    let resp = test::call_service(&app, test::TestRequest::get().uri("/t/promo").to_request())
        .await;
    assert_eq!(resp.status().as_u16(), 307);
    assert_eq!(storage.count_clicks(&filter).await.unwrap(), 2);
}

#[actix_web::test]
async fn redirect_misses_return_not_found() {
    ensure_api_token();
    let (storage, _dir) = common::temp_storage().await;
    let partner = common::seed_partner(&storage, "Trailhead Gear", 1_500).await;
    let product = common::seed_product(&storage, partner.id, "Ridge Tent").await;
    storage
        .insert_link(NewLink {
            partner_id: partner.id,
            product_id: product.id,
            slug: "paused".to_string(),
            destination_url: "https://shop.example.com/deals".to_string(),
            utm_source: None,
            utm_medium: None,
            utm_campaign: None,
            status: LinkStatus::Paused,
        })
        .await
        .unwrap();
    let app = test_app!(storage.clone());

    for slug in ["missing", "paused"] {
        let resp = test::call_service(
            &app,
            test::TestRequest::get()
                .uri(&format!("/t/{}", slug))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status().as_u16(), 404, "slug {}", slug);
    }

    // a paused link's miss never records a click
    assert_eq!(
        storage.count_clicks(&ClickFilter::default()).await.unwrap(),
        0
    );
}

#[actix_web::test]
async fn conversion_lifecycle_over_http() {
    ensure_api_token();
    let (storage, _dir) = common::temp_storage().await;
    let (_, _, link) = common::seed_funnel(&storage, "promo").await;
    let app = test_app!(storage);

    let resp = test::call_service(
        &app,
        bearer(
            test::TestRequest::post()
                .uri("/api/conversions")
                .set_json(serde_json::json!({
                    "link_id": link.id,
                    "amount_minor": 10_000,
                    "currency": "usd"
                })),
        )
        .to_request(),
    )
    .await;
    assert!(resp.status().is_success());
    let body: Value = test::read_body_json(resp).await;
    let conversion_id = body["data"]["id"].as_i64().unwrap();
    assert_eq!(body["data"]["status"], "pending");
    assert_eq!(body["data"]["currency"], "USD");

    let resp = test::call_service(
        &app,
        bearer(test::TestRequest::post().uri(&format!(
            "/api/conversions/{}/confirm",
            conversion_id
        )))
        .to_request(),
    )
    .await;
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["status"], "confirmed");

    // charge-back
    let resp = test::call_service(
        &app,
        bearer(test::TestRequest::post().uri(&format!(
            "/api/conversions/{}/reverse",
            conversion_id
        )))
        .to_request(),
    )
    .await;
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["status"], "reversed");

    // reversal is terminal: confirming again conflicts
    let resp = test::call_service(
        &app,
        bearer(test::TestRequest::post().uri(&format!(
            "/api/conversions/{}/confirm",
            conversion_id
        )))
        .to_request(),
    )
    .await;
    assert_eq!(resp.status().as_u16(), 409);
}

#[actix_web::test]
async fn payout_build_and_export_over_http() {
    ensure_api_token();
    let (storage, _dir) = common::temp_storage().await;
    let ledger = ConversionLedger::new(storage.clone());
    let (partner, _, link) = common::seed_funnel(&storage, "promo").await;
    let c = ledger.record(link.id, 50_000, "USD", None).await.unwrap();
    ledger.confirm(c.id).await.unwrap();
    let app = test_app!(storage);

    let resp = test::call_service(
        &app,
        bearer(
            test::TestRequest::post()
                .uri("/api/payouts")
                .set_json(serde_json::json!({
                    "partner_id": partner.id,
                    "period": common::current_period()
                })),
        )
        .to_request(),
    )
    .await;
    assert!(resp.status().is_success());
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["revenue_minor"], 50_000);
    assert_eq!(body["data"]["commission_minor"], 7_500);
    assert_eq!(body["data"]["status"], "pending");

    let resp = test::call_service(
        &app,
        bearer(test::TestRequest::get().uri("/api/export/payouts.csv")).to_request(),
    )
    .await;
    assert!(resp.status().is_success());
    let content_type = resp
        .headers()
        .get("Content-Type")
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(content_type.starts_with("text/csv"));
    let body = test::read_body(resp).await;
    let text = String::from_utf8(body.to_vec()).unwrap();
    assert!(text.starts_with("id,partner_id,period"));
    assert!(text.contains("500.00,75.00,pending"));

    // unknown export kind
    let resp = test::call_service(
        &app,
        bearer(test::TestRequest::get().uri("/api/export/everything.csv")).to_request(),
    )
    .await;
    assert_eq!(resp.status().as_u16(), 400);
}

#[actix_web::test]
async fn analytics_query_validation_over_http() {
    ensure_api_token();
    let (storage, _dir) = common::temp_storage().await;
    common::seed_funnel(&storage, "promo").await;
    let app = test_app!(storage);

    // defaults to the trailing window
    let resp = test::call_service(
        &app,
        bearer(test::TestRequest::get().uri("/api/analytics")).to_request(),
    )
    .await;
    assert!(resp.status().is_success());

    // start without end is rejected
    let resp = test::call_service(
        &app,
        bearer(test::TestRequest::get().uri("/api/analytics?start=2025-06-01T00:00:00Z"))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status().as_u16(), 400);

    // link and partner scopes are mutually exclusive
    let resp = test::call_service(
        &app,
        bearer(test::TestRequest::get().uri("/api/analytics?link_id=1&partner_id=1")).to_request(),
    )
    .await;
    assert_eq!(resp.status().as_u16(), 400);
}
