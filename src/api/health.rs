//! Health endpoint

use actix_web::{HttpResponse, web};

use super::helpers::success_response;
use crate::services::HealthService;

pub async fn health_check(health: web::Data<HealthService>) -> HttpResponse {
    let report = health.check().await;
    if report.storage_ok {
        success_response(report)
    } else {
        HttpResponse::ServiceUnavailable()
            .append_header(("Content-Type", "application/json; charset=utf-8"))
            .json(super::helpers::ApiResponse {
                code: super::error_code::ErrorCode::ServiceUnavailable as i32,
                message: "Storage unreachable".to_string(),
                data: Some(report),
            })
    }
}
