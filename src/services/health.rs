//! Storage reachability check for the health endpoint

use std::sync::Arc;

use serde::Serialize;
use tracing::warn;

use crate::storage::SeaOrmStorage;

#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub status: &'static str,
    pub backend: String,
    pub storage_ok: bool,
}

pub struct HealthService {
    storage: Arc<SeaOrmStorage>,
}

impl HealthService {
    pub fn new(storage: Arc<SeaOrmStorage>) -> Self {
        Self { storage }
    }

    pub async fn check(&self) -> HealthReport {
        let storage_ok = match self.storage.get_db().ping().await {
            Ok(()) => true,
            Err(e) => {
                warn!("Health check: storage ping failed: {}", e);
                false
            }
        };

        HealthReport {
            status: if storage_ok { "ok" } else { "degraded" },
            backend: self.storage.backend_name().to_string(),
            storage_ok,
        }
    }
}
