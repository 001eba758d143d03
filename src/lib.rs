//! LinkLedger - affiliate attribution and payout reconciliation engine
//!
//! Turns raw clicks on tracked partner links into attributed revenue:
//! resolves public slugs, records click events, walks conversions
//! through their lifecycle, computes on-demand analytics rollups, and
//! reconciles confirmed revenue into partner payouts with deterministic
//! CSV/JSON exports.
//!
//! # Architecture
//! - `storage`: SeaORM entity store (SQLite/MySQL/PostgreSQL)
//! - `services`: attribution engine business logic
//! - `api`: actix-web HTTP surface for the console and redirects
//! - `config`: static configuration from file and environment
//! - `utils`: slugs, money arithmetic, payout periods, URL handling

pub mod api;
pub mod config;
pub mod errors;
pub mod logging;
pub mod services;
pub mod storage;
pub mod utils;
