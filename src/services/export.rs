//! Deterministic export rendering
//!
//! Pure formatting: nothing here reads or writes the store. Given the
//! same rows, every function returns byte-identical output, so exports
//! are diffable and safe to regenerate.
//!
//! CSV column orders are fixed:
//! - analytics: scope, id, clicks, conversions, conversion_rate, revenue
//! - clicks: id, link_id, clicked_at, referrer, is_conversion,
//!   conversion_value, request_id
//! - payouts: id, partner_id, period, clicks, conversions, revenue,
//!   commission, status, transaction_ref, notes, created_at, settled_at
//!
//! Currency renders with two decimals from minor units; rates with four.
//! JSON documents carry a `format_version` and a caller-supplied
//! `generated_at` kept apart from the data rows.

use chrono::{DateTime, Utc};
use serde::Serialize;
use strum::{Display, EnumString};

use super::analytics_service::AnalyticsSnapshot;
use crate::errors::{LedgerError, Result};
use crate::storage::{ClickEvent, Payout};
use crate::utils::money::format_minor;

/// Bumped when a field is renamed or reordered in the JSON document
pub const EXPORT_FORMAT_VERSION: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum ExportKind {
    Analytics,
    Clicks,
    Payouts,
}

#[derive(Serialize)]
struct ExportDocument<'a, T: Serialize> {
    format_version: u32,
    kind: &'a str,
    /// Stamped by the caller; the only non-deterministic field
    generated_at: DateTime<Utc>,
    rows: &'a T,
}

fn json_document<T: Serialize>(
    kind: ExportKind,
    generated_at: DateTime<Utc>,
    rows: &T,
) -> Result<String> {
    let kind = kind.to_string();
    let doc = ExportDocument {
        format_version: EXPORT_FORMAT_VERSION,
        kind: &kind,
        generated_at,
        rows,
    };
    Ok(serde_json::to_string_pretty(&doc)?)
}

fn finish_csv(writer: csv::Writer<Vec<u8>>) -> Result<String> {
    let bytes = writer
        .into_inner()
        .map_err(|e| LedgerError::serialization(format!("CSV flush failed: {}", e)))?;
    String::from_utf8(bytes).map_err(|e| LedgerError::serialization(e.to_string()))
}

fn opt_str(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("")
}

fn opt_time(value: &Option<DateTime<Utc>>) -> String {
    value.map(|t| t.to_rfc3339()).unwrap_or_default()
}

pub struct ExportFormatter;

impl ExportFormatter {
    /// Summary row first, then per-link rows, then per-partner rows,
    /// each already id-ordered by the aggregator.
    pub fn analytics_csv(snapshot: &AnalyticsSnapshot) -> Result<String> {
        let mut writer = csv::Writer::from_writer(vec![]);
        writer.write_record([
            "scope",
            "id",
            "clicks",
            "conversions",
            "conversion_rate",
            "revenue",
        ])?;
        writer.write_record([
            "total".to_string(),
            String::new(),
            snapshot.total_clicks.to_string(),
            snapshot.total_conversions.to_string(),
            format!("{:.4}", snapshot.conversion_rate),
            format_minor(snapshot.total_revenue_minor),
        ])?;
        for link in &snapshot.links {
            writer.write_record([
                "link".to_string(),
                link.link_id.to_string(),
                link.clicks.to_string(),
                link.conversions.to_string(),
                format!("{:.4}", link.conversion_rate),
                format_minor(link.revenue_minor),
            ])?;
        }
        for partner in &snapshot.partners {
            writer.write_record([
                "partner".to_string(),
                partner.partner_id.to_string(),
                partner.clicks.to_string(),
                partner.conversions.to_string(),
                format!("{:.4}", partner.conversion_rate),
                format_minor(partner.revenue_minor),
            ])?;
        }
        finish_csv(writer)
    }

    pub fn clicks_csv(events: &[ClickEvent]) -> Result<String> {
        let mut writer = csv::Writer::from_writer(vec![]);
        writer.write_record([
            "id",
            "link_id",
            "clicked_at",
            "referrer",
            "is_conversion",
            "conversion_value",
            "request_id",
        ])?;
        for event in events {
            writer.write_record([
                event.id.to_string(),
                event.link_id.to_string(),
                event.clicked_at.to_rfc3339(),
                opt_str(&event.referrer).to_string(),
                event.is_conversion.to_string(),
                event
                    .conversion_value_minor
                    .map(format_minor)
                    .unwrap_or_default(),
                opt_str(&event.request_id).to_string(),
            ])?;
        }
        finish_csv(writer)
    }

    pub fn payouts_csv(payouts: &[Payout]) -> Result<String> {
        let mut writer = csv::Writer::from_writer(vec![]);
        writer.write_record([
            "id",
            "partner_id",
            "period",
            "clicks",
            "conversions",
            "revenue",
            "commission",
            "status",
            "transaction_ref",
            "notes",
            "created_at",
            "settled_at",
        ])?;
        for payout in payouts {
            writer.write_record([
                payout.id.to_string(),
                payout.partner_id.to_string(),
                payout.period.clone(),
                payout.clicks.to_string(),
                payout.conversions.to_string(),
                format_minor(payout.revenue_minor),
                format_minor(payout.commission_minor),
                payout.status.to_string(),
                opt_str(&payout.transaction_ref).to_string(),
                opt_str(&payout.notes).to_string(),
                payout.created_at.to_rfc3339(),
                opt_time(&payout.settled_at),
            ])?;
        }
        finish_csv(writer)
    }

    pub fn analytics_json(
        snapshot: &AnalyticsSnapshot,
        generated_at: DateTime<Utc>,
    ) -> Result<String> {
        json_document(ExportKind::Analytics, generated_at, snapshot)
    }

    pub fn clicks_json(events: &[ClickEvent], generated_at: DateTime<Utc>) -> Result<String> {
        json_document(ExportKind::Clicks, generated_at, &events)
    }

    pub fn payouts_json(payouts: &[Payout], generated_at: DateTime<Utc>) -> Result<String> {
        json_document(ExportKind::Payouts, generated_at, &payouts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::analytics_service::{LinkTotals, PartnerTotals};
    use crate::storage::PayoutStatus;
    use chrono::TimeZone;

    fn sample_snapshot() -> AnalyticsSnapshot {
        let start = Utc.with_ymd_and_hms(2024, 8, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 9, 1, 0, 0, 0).unwrap();
        AnalyticsSnapshot {
            window_start: start,
            window_end: end,
            total_clicks: 100,
            total_conversions: 5,
            conversion_rate: 0.05,
            total_revenue_minor: 50_000,
            links: vec![LinkTotals {
                link_id: 1,
                clicks: 100,
                conversions: 5,
                conversion_rate: 0.05,
                revenue_minor: 50_000,
            }],
            partners: vec![PartnerTotals {
                partner_id: 9,
                clicks: 100,
                conversions: 5,
                conversion_rate: 0.05,
                revenue_minor: 50_000,
            }],
        }
    }

    #[test]
    fn analytics_csv_layout_is_fixed() {
        let csv = ExportFormatter::analytics_csv(&sample_snapshot()).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(
            lines[0],
            "scope,id,clicks,conversions,conversion_rate,revenue"
        );
        assert_eq!(lines[1], "total,,100,5,0.0500,500.00");
        assert_eq!(lines[2], "link,1,100,5,0.0500,500.00");
        assert_eq!(lines[3], "partner,9,100,5,0.0500,500.00");
        assert_eq!(lines.len(), 4);
    }

    #[test]
    fn repeated_renders_are_byte_identical() {
        let snapshot = sample_snapshot();
        let first = ExportFormatter::analytics_csv(&snapshot).unwrap();
        let second = ExportFormatter::analytics_csv(&snapshot).unwrap();
        assert_eq!(first, second);

        let stamp = Utc.with_ymd_and_hms(2024, 9, 2, 12, 0, 0).unwrap();
        let first = ExportFormatter::analytics_json(&snapshot, stamp).unwrap();
        let second = ExportFormatter::analytics_json(&snapshot, stamp).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn click_rows_escape_embedded_delimiters() {
        let events = vec![ClickEvent {
            id: 1,
            link_id: 2,
            clicked_at: Utc.with_ymd_and_hms(2024, 8, 15, 10, 30, 0).unwrap(),
            referrer: Some("https://news.example.com/article?a=1,2 \"quoted\"".to_string()),
            is_conversion: false,
            conversion_value_minor: None,
            request_id: None,
        }];
        let csv = ExportFormatter::clicks_csv(&events).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(
            lines[0],
            "id,link_id,clicked_at,referrer,is_conversion,conversion_value,request_id"
        );
        // embedded comma and quotes force quoting with doubled quotes
        assert!(lines[1].contains("\"https://news.example.com/article?a=1,2 \"\"quoted\"\"\""));
    }

    #[test]
    fn payout_rows_render_money_with_two_decimals() {
        let payouts = vec![Payout {
            id: 3,
            partner_id: 9,
            period: "2024-08".to_string(),
            clicks: 100,
            conversions: 5,
            revenue_minor: 50_000,
            commission_minor: 7_500,
            status: PayoutStatus::Pending,
            transaction_ref: None,
            notes: None,
            created_at: Utc.with_ymd_and_hms(2024, 9, 1, 8, 0, 0).unwrap(),
            settled_at: None,
        }];
        let csv = ExportFormatter::payouts_csv(&payouts).unwrap();
        assert!(csv.lines().nth(1).unwrap().contains("500.00,75.00,pending"));
    }

    #[test]
    fn json_document_carries_version_and_kind() {
        let stamp = Utc.with_ymd_and_hms(2024, 9, 2, 12, 0, 0).unwrap();
        let json = ExportFormatter::payouts_json(&[], stamp).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["format_version"], 1);
        assert_eq!(value["kind"], "payouts");
        assert!(value["generated_at"].is_string());
        assert!(value["rows"].as_array().unwrap().is_empty());
    }

    #[test]
    fn export_kind_parses_from_path_segment() {
        assert_eq!(
            "analytics".parse::<ExportKind>().ok(),
            Some(ExportKind::Analytics)
        );
        assert_eq!("clicks".parse::<ExportKind>().ok(), Some(ExportKind::Clicks));
        assert!("everything".parse::<ExportKind>().is_err());
    }
}
