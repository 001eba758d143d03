//! Response envelope and error mapping helpers

use actix_web::HttpResponse;
use actix_web::http::StatusCode;
use serde::{Deserialize, Serialize};

use super::error_code::ErrorCode;
use crate::errors::LedgerError;

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ApiResponse<T> {
    pub code: i32,
    pub message: String,
    pub data: Option<T>,
}

pub fn json_response<T: Serialize>(
    status: StatusCode,
    code: ErrorCode,
    message: impl Into<String>,
    data: Option<T>,
) -> HttpResponse {
    HttpResponse::build(status)
        .append_header(("Content-Type", "application/json; charset=utf-8"))
        .json(ApiResponse {
            code: code as i32,
            message: message.into(),
            data,
        })
}

pub fn success_response<T: Serialize>(data: T) -> HttpResponse {
    json_response(StatusCode::OK, ErrorCode::Success, "OK", Some(data))
}

pub fn error_response(status: StatusCode, code: ErrorCode, message: &str) -> HttpResponse {
    json_response::<()>(status, code, message, None)
}

fn http_status(err: &LedgerError) -> StatusCode {
    match err {
        LedgerError::Validation(_) | LedgerError::DateParse(_) => StatusCode::BAD_REQUEST,
        LedgerError::NotFound(_) | LedgerError::LinkInactive(_) => StatusCode::NOT_FOUND,
        LedgerError::InvalidTransition(_) | LedgerError::ConcurrentModification(_) => {
            StatusCode::CONFLICT
        }
        LedgerError::StoreUnavailable(_) | LedgerError::DatabaseConnection(_) => {
            StatusCode::SERVICE_UNAVAILABLE
        }
        LedgerError::Serialization(_) | LedgerError::DatabaseConfig(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

pub fn error_from_ledger(err: &LedgerError) -> HttpResponse {
    error_response(http_status(err), ErrorCode::from(err), err.message())
}

/// Result -> envelope: 200 + data on success, mapped status otherwise
pub fn api_result<T: Serialize>(result: crate::errors::Result<T>) -> HttpResponse {
    match result {
        Ok(data) => success_response(data),
        Err(err) => error_from_ledger(&err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transition_errors_map_to_conflict() {
        assert_eq!(
            http_status(&LedgerError::invalid_transition("x")),
            StatusCode::CONFLICT
        );
        assert_eq!(
            http_status(&LedgerError::concurrent_modification("x")),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn store_errors_map_to_service_unavailable() {
        assert_eq!(
            http_status(&LedgerError::store_unavailable("x")),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }
}
