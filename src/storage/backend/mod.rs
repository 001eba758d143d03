//! SeaORM storage backend
//!
//! Single durable store behind the engine, supporting SQLite,
//! MySQL/MariaDB, and PostgreSQL. Reads retry on transient errors;
//! writes get one timeout-guarded attempt so side effects are never
//! duplicated by the storage layer itself.

mod catalog;
mod clicks;
mod connection;
mod conversions;
mod converters;
mod links;
mod payouts;
pub mod retry;

use chrono::{DateTime, Utc};
use sea_orm::DatabaseConnection;
use tracing::warn;

use crate::errors::{LedgerError, Result};
use crate::storage::models::{ConversionStatus, LinkStatus, PayoutStatus};

pub use connection::{connect_generic, connect_sqlite, run_migrations};
pub use payouts::ReconciliationTotals;

/// Infer the database backend from the connection URL
pub fn infer_backend_from_url(database_url: &str) -> Result<String> {
    if database_url.starts_with("sqlite://")
        || database_url.ends_with(".db")
        || database_url.ends_with(".sqlite")
        || database_url == ":memory:"
    {
        Ok("sqlite".to_string())
    } else if database_url.starts_with("mysql://") || database_url.starts_with("mariadb://") {
        Ok("mysql".to_string())
    } else if database_url.starts_with("postgres://") || database_url.starts_with("postgresql://") {
        Ok("postgres".to_string())
    } else {
        Err(LedgerError::database_config(format!(
            "Cannot infer database backend from URL: {}. Supported URL schemes: sqlite://, mysql://, mariadb://, postgres://",
            database_url
        )))
    }
}

/// Tracked link listing filter
#[derive(Default, Clone, Debug)]
pub struct LinkFilter {
    /// Substring match on slug or destination URL
    pub search: Option<String>,
    pub partner_id: Option<i64>,
    pub product_id: Option<i64>,
    pub status: Option<LinkStatus>,
    pub created_after: Option<DateTime<Utc>>,
    pub created_before: Option<DateTime<Utc>>,
}

/// Conversion listing filter
#[derive(Default, Clone, Debug)]
pub struct ConversionFilter {
    pub link_id: Option<i64>,
    pub partner_id: Option<i64>,
    pub status: Option<ConversionStatus>,
    pub created_after: Option<DateTime<Utc>>,
    pub created_before: Option<DateTime<Utc>>,
}

/// Click export filter
#[derive(Default, Clone, Debug)]
pub struct ClickFilter {
    pub link_id: Option<i64>,
    pub clicked_after: Option<DateTime<Utc>>,
    pub clicked_before: Option<DateTime<Utc>>,
}

/// Payout listing filter
#[derive(Default, Clone, Debug)]
pub struct PayoutFilter {
    pub partner_id: Option<i64>,
    pub status: Option<PayoutStatus>,
    pub period: Option<String>,
}

/// SeaORM-based storage backend
#[derive(Clone)]
pub struct SeaOrmStorage {
    db: DatabaseConnection,
    backend_name: String,
    /// Retry policy for read queries
    read_retry: retry::RetryConfig,
    /// Per-statement timeout; expiry surfaces as store-unavailable
    op_timeout_ms: u64,
}

impl SeaOrmStorage {
    pub async fn new(database_url: &str, backend_name: &str) -> Result<Self> {
        if database_url.is_empty() {
            return Err(LedgerError::database_config(
                "database_url is not set".to_string(),
            ));
        }

        let config = crate::config::get_config();
        let read_retry = retry::RetryConfig {
            max_retries: config.database.retry_count,
            base_delay_ms: config.database.retry_base_delay_ms,
            max_delay_ms: config.database.retry_max_delay_ms,
        };

        let db = if backend_name == "sqlite" {
            connect_sqlite(database_url).await?
        } else {
            connect_generic(database_url, backend_name).await?
        };

        let storage = SeaOrmStorage {
            db,
            backend_name: backend_name.to_string(),
            read_retry,
            op_timeout_ms: config.database.op_timeout_ms,
        };

        run_migrations(&storage.db).await?;

        warn!(
            "{} storage initialized.",
            storage.backend_name.to_uppercase()
        );
        Ok(storage)
    }

    pub fn backend_name(&self) -> &str {
        &self.backend_name
    }

    /// Raw connection handle, used by health checks
    pub fn get_db(&self) -> &DatabaseConnection {
        &self.db
    }
}
