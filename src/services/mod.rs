//! Service layer for the attribution engine
//!
//! Each service is an explicit struct constructed with its storage
//! dependency injected, so tests run against throwaway SQLite stores.

mod analytics_service;
mod catalog_service;
mod click_service;
mod conversion_service;
mod export;
mod health;
mod link_service;
mod payout_service;

pub use analytics_service::{
    AnalyticsScope, AnalyticsService, AnalyticsSnapshot, AnalyticsWindow, LinkTotals, PartnerTotals,
};
pub use catalog_service::{CatalogService, PartnerDraft, ProductDraft};
pub use click_service::ClickRecorder;
pub use conversion_service::ConversionLedger;
pub use export::{EXPORT_FORMAT_VERSION, ExportFormatter, ExportKind};
pub use health::{HealthReport, HealthService};
pub use link_service::{LinkDraft, LinkService, LinkUpdate};
pub use payout_service::PayoutService;
