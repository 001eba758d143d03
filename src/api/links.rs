//! Tracked link CRUD endpoints

use actix_web::{HttpResponse, Responder, web};
use tracing::trace;

use super::helpers::{api_result, error_from_ledger, success_response};
use super::types::{GetLinksQuery, PaginatedLinks, PaginationInfo, PostLink, PutLink};
use crate::services::{LinkDraft, LinkService, LinkUpdate};
use crate::storage::LinkStatus;
use crate::storage::backend::LinkFilter;

pub async fn list_links(
    query: web::Query<GetLinksQuery>,
    links: web::Data<LinkService>,
) -> impl Responder {
    trace!("API: list links: {:?}", query);

    let mut filter = LinkFilter {
        search: query.search.clone(),
        partner_id: query.partner_id,
        product_id: query.product_id,
        status: query.status,
        ..Default::default()
    };
    if let Some(raw) = &query.created_after {
        match super::types::parse_rfc3339(raw) {
            Ok(t) => filter.created_after = Some(t),
            Err(e) => return error_from_ledger(&e),
        }
    }
    if let Some(raw) = &query.created_before {
        match super::types::parse_rfc3339(raw) {
            Ok(t) => filter.created_before = Some(t),
            Err(e) => return error_from_ledger(&e),
        }
    }

    let engine = &crate::config::get_config().engine;
    let page = query.page.unwrap_or(1).max(1);
    let page_size = query
        .page_size
        .unwrap_or(engine.default_page_size)
        .clamp(1, engine.max_page_size);

    match links.list_links(&filter, page, page_size).await {
        Ok((items, total)) => {
            let total_pages = total.div_ceil(page_size);
            success_response(PaginatedLinks {
                items,
                pagination: PaginationInfo {
                    page,
                    page_size,
                    total,
                    total_pages,
                },
            })
        }
        Err(e) => error_from_ledger(&e),
    }
}

pub async fn create_link(
    payload: web::Json<PostLink>,
    links: web::Data<LinkService>,
) -> impl Responder {
    let payload = payload.into_inner();
    let draft = LinkDraft {
        partner_id: payload.partner_id,
        product_id: payload.product_id,
        slug: payload.slug,
        destination_url: payload.destination_url,
        utm_source: payload.utm_source,
        utm_medium: payload.utm_medium,
        utm_campaign: payload.utm_campaign,
        status: payload.status.unwrap_or(LinkStatus::Active),
    };
    api_result(links.create_link(draft).await)
}

pub async fn get_link(path: web::Path<i64>, links: web::Data<LinkService>) -> impl Responder {
    api_result(links.get_link(path.into_inner()).await)
}

/// An empty UTM string in the payload clears the field; omitted fields
/// are left untouched.
pub async fn update_link(
    path: web::Path<i64>,
    payload: web::Json<PutLink>,
    links: web::Data<LinkService>,
) -> HttpResponse {
    let payload = payload.into_inner();
    let clear_or_set = |v: Option<String>| v.map(|s| if s.is_empty() { None } else { Some(s) });

    let update = LinkUpdate {
        destination_url: payload.destination_url,
        utm_source: clear_or_set(payload.utm_source),
        utm_medium: clear_or_set(payload.utm_medium),
        utm_campaign: clear_or_set(payload.utm_campaign),
        status: payload.status,
    };
    api_result(links.update_link(path.into_inner(), update).await)
}
