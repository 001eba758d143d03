//! Bearer token guard for the management API
//!
//! An empty configured token disables the API entirely: the routes
//! respond 404 as if they did not exist. Token comparison is constant
//! time.

use actix_web::middleware::Next;
use actix_web::{
    Error, HttpResponse,
    body::BoxBody,
    dev::{ServiceRequest, ServiceResponse},
    http::StatusCode,
};
use subtle::ConstantTimeEq;
use tracing::{debug, info};

use super::error_code::ErrorCode;
use super::helpers::error_response;

pub async fn admin_auth(
    req: ServiceRequest,
    next: Next<BoxBody>,
) -> Result<ServiceResponse<BoxBody>, Error> {
    if req.method() == actix_web::http::Method::OPTIONS {
        return Ok(req.into_response(HttpResponse::NoContent().finish()));
    }

    let api_token = crate::config::get_config().server.api_token.clone();
    if api_token.is_empty() {
        return Ok(req.into_response(
            HttpResponse::NotFound()
                .insert_header(("Content-Type", "text/plain; charset=utf-8"))
                .body("Not Found"),
        ));
    }

    if let Some(auth_header) = req.headers().get("Authorization") {
        if let Some(presented) = auth_header.as_bytes().strip_prefix(b"Bearer ") {
            if presented.ct_eq(api_token.as_bytes()).into() {
                debug!("Management API authentication succeeded");
                return next.call(req).await;
            }
        }
    }

    info!("Management API authentication failed: missing or invalid token");
    Ok(req.into_response(error_response(
        StatusCode::UNAUTHORIZED,
        ErrorCode::Unauthorized,
        "Unauthorized: Invalid or missing token",
    )))
}
