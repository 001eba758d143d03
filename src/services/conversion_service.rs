//! Conversion ledger
//!
//! Records conversions against a link and walks them through the
//! pending -> confirmed | reversed lifecycle. Attribution is fixed at
//! creation: partner, product, and the product name/category snapshot
//! are copied from the link so later catalog edits never rewrite
//! history.

use std::sync::Arc;

use tracing::info;

use crate::errors::{LedgerError, Result};
use crate::storage::backend::ConversionFilter;
use crate::storage::{Conversion, ConversionStatus, NewConversion, SeaOrmStorage};

pub struct ConversionLedger {
    storage: Arc<SeaOrmStorage>,
}

impl ConversionLedger {
    pub fn new(storage: Arc<SeaOrmStorage>) -> Self {
        Self { storage }
    }

    /// Record a new pending conversion attributed to `link_id`.
    pub async fn record(
        &self,
        link_id: i64,
        amount_minor: i64,
        currency: &str,
        notes: Option<String>,
    ) -> Result<Conversion> {
        if amount_minor <= 0 {
            return Err(LedgerError::validation(format!(
                "Conversion amount must be positive, got {}",
                amount_minor
            )));
        }
        let currency = currency.trim().to_uppercase();
        if currency.len() != 3 || !currency.bytes().all(|b| b.is_ascii_alphabetic()) {
            return Err(LedgerError::validation(format!(
                "Currency must be a 3-letter code, got {:?}",
                currency
            )));
        }

        let link = self
            .storage
            .get_link(link_id)
            .await?
            .ok_or_else(|| LedgerError::not_found(format!("Link not found: {}", link_id)))?;

        // Snapshot the product so the conversion survives its deletion
        let product = self
            .storage
            .get_product(link.product_id)
            .await?
            .ok_or_else(|| {
                LedgerError::not_found(format!("Product not found: {}", link.product_id))
            })?;

        self.storage
            .insert_conversion(NewConversion {
                link_id,
                partner_id: link.partner_id,
                product_id: link.product_id,
                product_name: product.name,
                product_category: product.category,
                amount_minor,
                currency,
                notes,
            })
            .await
    }

    /// pending -> confirmed; no-op when already confirmed, rejected when
    /// reversed.
    pub async fn confirm(&self, id: i64) -> Result<Conversion> {
        let conversion = self
            .storage
            .transition_conversion(id, ConversionStatus::Confirmed, chrono::Utc::now())
            .await?;
        info!("ConversionLedger: conversion {} confirmed", id);
        Ok(conversion)
    }

    /// pending -> reversed, or confirmed -> reversed (charge-back);
    /// no-op when already reversed.
    pub async fn reverse(&self, id: i64) -> Result<Conversion> {
        let conversion = self
            .storage
            .transition_conversion(id, ConversionStatus::Reversed, chrono::Utc::now())
            .await?;
        info!("ConversionLedger: conversion {} reversed", id);
        Ok(conversion)
    }

    pub async fn get(&self, id: i64) -> Result<Conversion> {
        self.storage
            .get_conversion(id)
            .await?
            .ok_or_else(|| LedgerError::not_found(format!("Conversion not found: {}", id)))
    }

    pub async fn list(&self, filter: &ConversionFilter, limit: u64) -> Result<Vec<Conversion>> {
        self.storage.list_conversions(filter, limit).await
    }
}
