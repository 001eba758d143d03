//! HTTP surface for the console and the public redirect endpoint
//!
//! JSON envelope is `{code, message, data}` with numeric error codes;
//! everything under /api except /api/health sits behind the bearer
//! token middleware.

mod analytics;
mod catalog;
mod conversions;
mod error_code;
mod export;
mod health;
mod helpers;
mod links;
mod middleware;
mod payouts;
mod redirect;
pub mod routes;
mod types;

pub use error_code::ErrorCode;
pub use helpers::ApiResponse;
pub use types::*;
