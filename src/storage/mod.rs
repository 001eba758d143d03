use std::sync::Arc;

use crate::errors::Result;

pub mod backend;
pub mod models;

pub use backend::{
    ClickFilter, ConversionFilter, LinkFilter, PayoutFilter, ReconciliationTotals, SeaOrmStorage,
};
pub use models::{
    ClickEvent, Conversion, ConversionStatus, LinkStatus, NewClick, NewConversion, NewLink,
    NewPartner, NewPayout, NewProduct, Partner, PartnerStatus, Payout, PayoutStatus, Product,
    ProductStatus, TrackedLink, TransitionOutcome,
};

pub struct StorageFactory;

impl StorageFactory {
    /// Build the storage from global configuration, inferring the backend
    /// from the database URL and running pending migrations.
    pub async fn create() -> Result<Arc<SeaOrmStorage>> {
        let config = crate::config::get_config();
        let database_url = &config.database.database_url;

        let backend_type = backend::infer_backend_from_url(database_url)?;

        let storage = backend::SeaOrmStorage::new(database_url, &backend_type).await?;
        Ok(Arc::new(storage))
    }
}
