use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{App, HttpServer, web};
use tracing::info;

use linkledger::api::routes;
use linkledger::config::{get_config, init_config};
use linkledger::logging::init_logging;
use linkledger::services::{
    AnalyticsService, CatalogService, ClickRecorder, ConversionLedger, HealthService, LinkService,
    PayoutService,
};
use linkledger::storage::StorageFactory;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    init_config();
    let config = get_config();
    let _log_guard = init_logging(&config);

    let storage = match StorageFactory::create().await {
        Ok(storage) => storage,
        Err(e) => {
            eprintln!("{}", e.format_colored());
            std::process::exit(1);
        }
    };
    info!("Storage backend: {}", storage.backend_name());

    if config.server.api_token.is_empty() {
        info!("Management API is disabled (server.api_token not set)");
    } else {
        info!("Management API available under /api");
    }
    if config.engine.preview_mode {
        info!("Preview mode is ON: testing links resolve publicly");
    }

    let link_service = web::Data::new(LinkService::new(Arc::clone(&storage)));
    let click_recorder = web::Data::new(ClickRecorder::new(Arc::clone(&storage)));
    let conversion_ledger = web::Data::new(ConversionLedger::new(Arc::clone(&storage)));
    let catalog_service = web::Data::new(CatalogService::new(Arc::clone(&storage)));
    let analytics_service = web::Data::new(AnalyticsService::new(Arc::clone(&storage)));
    let payout_service = web::Data::new(PayoutService::new(Arc::clone(&storage)));
    let health_service = web::Data::new(HealthService::new(Arc::clone(&storage)));

    let bind_address = format!("{}:{}", config.server.host, config.server.port);
    info!("Starting server at http://{}", bind_address);

    let cors_origins = config.server.cors_allowed_origins.clone();
    let workers = config.server.cpu_count;

    HttpServer::new(move || {
        let mut cors = Cors::default()
            .allowed_methods(["GET", "POST", "PUT", "DELETE", "HEAD", "OPTIONS"])
            .allow_any_header()
            .max_age(3600);
        for origin in &cors_origins {
            cors = cors.allowed_origin(origin);
        }

        App::new()
            .wrap(cors)
            .app_data(web::Data::new(Arc::clone(&storage)))
            .app_data(link_service.clone())
            .app_data(click_recorder.clone())
            .app_data(conversion_ledger.clone())
            .app_data(catalog_service.clone())
            .app_data(analytics_service.clone())
            .app_data(payout_service.clone())
            .app_data(health_service.clone())
            .configure(routes::configure)
    })
    .workers(workers)
    .bind(bind_address)?
    .run()
    .await
}
