//! Export endpoints
//!
//! `GET /api/export/{kind}.csv` and `.json` for kind in
//! {analytics, clicks, payouts}. Reads only; the formatter guarantees
//! identical bytes for identical data.

use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, web};

use super::analytics::{scope_from_query, window_from_query};
use super::error_code::ErrorCode;
use super::helpers::{error_from_ledger, error_response};
use super::types::ExportQuery;
use crate::errors::Result;
use crate::services::{AnalyticsService, ExportFormatter, ExportKind, PayoutService};
use crate::storage::SeaOrmStorage;
use crate::storage::backend::{ClickFilter, PayoutFilter};

const DEFAULT_CLICK_LIMIT: u64 = 10_000;
const MAX_CLICK_LIMIT: u64 = 100_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ExportFormat {
    Csv,
    Json,
}

fn parse_kind(raw: &str) -> std::result::Result<ExportKind, HttpResponse> {
    raw.parse::<ExportKind>().map_err(|_| {
        error_response(
            StatusCode::BAD_REQUEST,
            ErrorCode::BadRequest,
            &format!("Unknown export kind: {}", raw),
        )
    })
}

async fn render(
    kind: ExportKind,
    format: ExportFormat,
    query: &ExportQuery,
    storage: &Arc<SeaOrmStorage>,
    analytics: &AnalyticsService,
    payouts: &PayoutService,
) -> Result<String> {
    let generated_at = chrono::Utc::now();

    match kind {
        ExportKind::Analytics => {
            let window = window_from_query(&query.start, &query.end, query.days)?;
            let scope = scope_from_query(query.link_id, query.partner_id)?;
            let snapshot = analytics.snapshot(window, scope).await?;
            match format {
                ExportFormat::Csv => ExportFormatter::analytics_csv(&snapshot),
                ExportFormat::Json => ExportFormatter::analytics_json(&snapshot, generated_at),
            }
        }
        ExportKind::Clicks => {
            let mut filter = ClickFilter {
                link_id: query.link_id,
                ..Default::default()
            };
            if query.start.is_some() || query.end.is_some() {
                let window = window_from_query(&query.start, &query.end, query.days)?;
                filter.clicked_after = Some(window.start);
                filter.clicked_before = Some(window.end);
            }
            let limit = query
                .limit
                .unwrap_or(DEFAULT_CLICK_LIMIT)
                .clamp(1, MAX_CLICK_LIMIT);
            let events = storage.list_clicks(&filter, limit).await?;
            match format {
                ExportFormat::Csv => ExportFormatter::clicks_csv(&events),
                ExportFormat::Json => ExportFormatter::clicks_json(&events, generated_at),
            }
        }
        ExportKind::Payouts => {
            let filter = PayoutFilter {
                partner_id: query.partner_id,
                status: query.status,
                period: query.period.clone(),
            };
            let rows = payouts.list(&filter).await?;
            match format {
                ExportFormat::Csv => ExportFormatter::payouts_csv(&rows),
                ExportFormat::Json => ExportFormatter::payouts_json(&rows, generated_at),
            }
        }
    }
}

#[allow(clippy::too_many_arguments)]
async fn export(
    kind_raw: String,
    format: ExportFormat,
    query: ExportQuery,
    storage: web::Data<Arc<SeaOrmStorage>>,
    analytics: web::Data<AnalyticsService>,
    payouts: web::Data<PayoutService>,
) -> HttpResponse {
    let kind = match parse_kind(&kind_raw) {
        Ok(kind) => kind,
        Err(response) => return response,
    };

    match render(kind, format, &query, &storage, &analytics, &payouts).await {
        Ok(body) => {
            let (content_type, extension) = match format {
                ExportFormat::Csv => ("text/csv; charset=utf-8", "csv"),
                ExportFormat::Json => ("application/json; charset=utf-8", "json"),
            };
            HttpResponse::Ok()
                .insert_header(("Content-Type", content_type))
                .insert_header((
                    "Content-Disposition",
                    format!("attachment; filename=\"{}.{}\"", kind, extension),
                ))
                .body(body)
        }
        Err(e) => error_from_ledger(&e),
    }
}

pub async fn export_csv(
    path: web::Path<String>,
    query: web::Query<ExportQuery>,
    storage: web::Data<Arc<SeaOrmStorage>>,
    analytics: web::Data<AnalyticsService>,
    payouts: web::Data<PayoutService>,
) -> HttpResponse {
    export(
        path.into_inner(),
        ExportFormat::Csv,
        query.into_inner(),
        storage,
        analytics,
        payouts,
    )
    .await
}

pub async fn export_json(
    path: web::Path<String>,
    query: web::Query<ExportQuery>,
    storage: web::Data<Arc<SeaOrmStorage>>,
    analytics: web::Data<AnalyticsService>,
    payouts: web::Data<PayoutService>,
) -> HttpResponse {
    export(
        path.into_inner(),
        ExportFormat::Json,
        query.into_inner(),
        storage,
        analytics,
        payouts,
    )
    .await
}
