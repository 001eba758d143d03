//! Public redirect endpoint
//!
//! Resolve the slug, record the click, send the visitor on with the
//! link's UTM parameters appended. A failed click write fails the
//! request rather than dropping the click silently.

use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse, Responder, web};
use tracing::{debug, error};

use crate::errors::LedgerError;
use crate::services::{ClickRecorder, LinkService};
use crate::utils::url_check::append_utm;

fn not_found() -> HttpResponse {
    HttpResponse::build(StatusCode::NOT_FOUND)
        .insert_header(("Content-Type", "text/html; charset=utf-8"))
        .insert_header(("Cache-Control", "public, max-age=60"))
        .body("Not Found")
}

fn header_value(req: &HttpRequest, name: &str) -> Option<String> {
    req.headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
}

pub async fn handle_redirect(
    path: web::Path<String>,
    req: HttpRequest,
    links: web::Data<LinkService>,
    clicks: web::Data<ClickRecorder>,
) -> impl Responder {
    let slug = path.into_inner();

    let link = match links.resolve(&slug).await {
        Ok(link) => link,
        Err(LedgerError::NotFound(_)) | Err(LedgerError::LinkInactive(_)) => {
            debug!("Redirect miss for slug: {}", slug);
            return not_found();
        }
        Err(e) => {
            error!("Redirect lookup failed for {}: {}", slug, e);
            return HttpResponse::ServiceUnavailable().finish();
        }
    };

    let referrer = header_value(&req, "Referer");
    let request_id = header_value(&req, "X-Request-Id");
    if let Err(e) = clicks.record(link.id, referrer, request_id).await {
        error!("Click recording failed for link {}: {}", link.id, e);
        return HttpResponse::ServiceUnavailable().finish();
    }

    let destination = append_utm(
        &link.destination_url,
        link.utm_source.as_deref(),
        link.utm_medium.as_deref(),
        link.utm_campaign.as_deref(),
    );

    HttpResponse::build(StatusCode::TEMPORARY_REDIRECT)
        .insert_header(("Location", destination))
        .finish()
}
