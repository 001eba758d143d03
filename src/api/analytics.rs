//! Analytics snapshot endpoint

use actix_web::{HttpResponse, web};

use super::helpers::{api_result, error_from_ledger};
use super::types::{AnalyticsQuery, parse_rfc3339};
use crate::errors::{LedgerError, Result};
use crate::services::{AnalyticsScope, AnalyticsService, AnalyticsWindow};

pub(super) fn window_from_query(
    start: &Option<String>,
    end: &Option<String>,
    days: Option<i64>,
) -> Result<AnalyticsWindow> {
    match (start, end) {
        (Some(start), Some(end)) => {
            AnalyticsWindow::new(parse_rfc3339(start)?, parse_rfc3339(end)?)
        }
        (None, None) => {
            let days =
                days.unwrap_or_else(|| crate::config::get_config().engine.analytics_default_days);
            if days <= 0 {
                return Err(LedgerError::validation(format!(
                    "Window days must be positive, got {}",
                    days
                )));
            }
            Ok(AnalyticsWindow::trailing_days(days))
        }
        _ => Err(LedgerError::validation(
            "Provide both start and end, or neither",
        )),
    }
}

pub(super) fn scope_from_query(
    link_id: Option<i64>,
    partner_id: Option<i64>,
) -> Result<Option<AnalyticsScope>> {
    match (link_id, partner_id) {
        (Some(_), Some(_)) => Err(LedgerError::validation(
            "link_id and partner_id are mutually exclusive",
        )),
        (Some(id), None) => Ok(Some(AnalyticsScope::Link(id))),
        (None, Some(id)) => Ok(Some(AnalyticsScope::Partner(id))),
        (None, None) => Ok(None),
    }
}

pub async fn get_analytics(
    query: web::Query<AnalyticsQuery>,
    analytics: web::Data<AnalyticsService>,
) -> HttpResponse {
    let window = match window_from_query(&query.start, &query.end, query.days) {
        Ok(window) => window,
        Err(e) => return error_from_ledger(&e),
    };
    let scope = match scope_from_query(query.link_id, query.partner_id) {
        Ok(scope) => scope,
        Err(e) => return error_from_ledger(&e),
    };

    api_result(analytics.snapshot(window, scope).await)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn init() {
        crate::config::init_config();
    }

    #[test]
    fn window_requires_both_bounds_or_neither() {
        init();
        assert!(window_from_query(&Some("2024-08-01T00:00:00Z".into()), &None, None).is_err());
        assert!(window_from_query(&None, &Some("2024-08-01T00:00:00Z".into()), None).is_err());
        assert!(
            window_from_query(
                &Some("2024-08-01T00:00:00Z".into()),
                &Some("2024-09-01T00:00:00Z".into()),
                None,
            )
            .is_ok()
        );
        assert!(window_from_query(&None, &None, Some(7)).is_ok());
        assert!(window_from_query(&None, &None, Some(0)).is_err());
    }

    #[test]
    fn scope_is_exclusive() {
        assert!(scope_from_query(Some(1), Some(2)).is_err());
        assert_eq!(
            scope_from_query(Some(1), None).unwrap(),
            Some(AnalyticsScope::Link(1))
        );
        assert_eq!(scope_from_query(None, None).unwrap(), None);
    }
}
