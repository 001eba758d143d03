//! Click recording
//!
//! The only mutation outside the conversion ledger: append one event row
//! and advance the link's last-used marker. Safe to call concurrently
//! for the same link; the marker update is a monotonic max in SQL.

use std::sync::Arc;

use tracing::debug;

use crate::errors::{LedgerError, Result};
use crate::storage::{ClickEvent, NewClick, SeaOrmStorage};

pub struct ClickRecorder {
    storage: Arc<SeaOrmStorage>,
}

impl ClickRecorder {
    pub fn new(storage: Arc<SeaOrmStorage>) -> Self {
        Self { storage }
    }

    /// Record one click against a resolved link.
    ///
    /// Exactly one durable event per call: a repeated `request_id`
    /// resolves to the already-recorded event instead of inserting a
    /// second row. The link's `last_used_at` is advanced to the event
    /// timestamp unless a later click already moved it.
    pub async fn record(
        &self,
        link_id: i64,
        referrer: Option<String>,
        request_id: Option<String>,
    ) -> Result<ClickEvent> {
        self.storage
            .get_link(link_id)
            .await?
            .ok_or_else(|| LedgerError::not_found(format!("Link not found: {}", link_id)))?;

        let referrer = referrer.filter(|r| !r.trim().is_empty());
        let request_id = request_id.filter(|r| !r.trim().is_empty());

        let event = self
            .storage
            .insert_click(NewClick {
                link_id,
                clicked_at: chrono::Utc::now(),
                referrer,
                conversion_value_minor: None,
                request_id,
            })
            .await?;

        self.storage
            .touch_last_used(link_id, event.clicked_at)
            .await?;

        debug!("Click {} recorded for link {}", event.id, link_id);
        Ok(event)
    }
}
