//! Conversion ledger endpoints
//!
//! There is deliberately no delete route; corrections go through
//! `reverse` so reconciliation history stays intact.

use actix_web::{HttpResponse, Responder, web};

use super::helpers::{api_result, error_from_ledger};
use super::types::{GetConversionsQuery, PostConversion};
use crate::services::ConversionLedger;
use crate::storage::backend::ConversionFilter;

const DEFAULT_LIST_LIMIT: u64 = 500;
const MAX_LIST_LIMIT: u64 = 10_000;

pub async fn record_conversion(
    payload: web::Json<PostConversion>,
    ledger: web::Data<ConversionLedger>,
) -> impl Responder {
    let payload = payload.into_inner();
    api_result(
        ledger
            .record(
                payload.link_id,
                payload.amount_minor,
                &payload.currency,
                payload.notes,
            )
            .await,
    )
}

pub async fn get_conversion(
    path: web::Path<i64>,
    ledger: web::Data<ConversionLedger>,
) -> impl Responder {
    api_result(ledger.get(path.into_inner()).await)
}

pub async fn confirm_conversion(
    path: web::Path<i64>,
    ledger: web::Data<ConversionLedger>,
) -> impl Responder {
    api_result(ledger.confirm(path.into_inner()).await)
}

pub async fn reverse_conversion(
    path: web::Path<i64>,
    ledger: web::Data<ConversionLedger>,
) -> impl Responder {
    api_result(ledger.reverse(path.into_inner()).await)
}

pub async fn list_conversions(
    query: web::Query<GetConversionsQuery>,
    ledger: web::Data<ConversionLedger>,
) -> HttpResponse {
    let mut filter = ConversionFilter {
        link_id: query.link_id,
        partner_id: query.partner_id,
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
    let limit = query
        .limit
        .unwrap_or(DEFAULT_LIST_LIMIT)
        .clamp(1, MAX_LIST_LIMIT);

    api_result(ledger.list(&filter, limit).await)
}
