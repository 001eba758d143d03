//! API error codes
//!
//! Serialized as numbers via serde_repr. Grouped by thousand:
//! - 0: success
//! - 1000-1099: generic errors
//! - 3000-3099: link and attribution errors
//! - 4000-4099: export errors

use serde_repr::{Deserialize_repr, Serialize_repr};

use crate::errors::LedgerError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize_repr, Deserialize_repr)]
#[repr(i32)]
pub enum ErrorCode {
    Success = 0,

    // Generic 1000-1099
    BadRequest = 1000,
    Unauthorized = 1001,
    NotFound = 1004,
    InternalServerError = 1005,
    InvalidDateFormat = 1012,
    ServiceUnavailable = 1030,

    // Links and attribution 3000-3099
    SlugAlreadyExists = 3001,
    LinkInactive = 3010,
    InvalidTransition = 3020,
    ConcurrentModification = 3021,

    // Exports 4000-4099
    ExportFailed = 4001,
}

impl From<&LedgerError> for ErrorCode {
    fn from(err: &LedgerError) -> Self {
        match err {
            LedgerError::Validation(msg) if msg.contains("Slug already in use") => {
                ErrorCode::SlugAlreadyExists
            }
            LedgerError::Validation(_) => ErrorCode::BadRequest,
            LedgerError::NotFound(_) => ErrorCode::NotFound,
            LedgerError::LinkInactive(_) => ErrorCode::LinkInactive,
            LedgerError::InvalidTransition(_) => ErrorCode::InvalidTransition,
            LedgerError::ConcurrentModification(_) => ErrorCode::ConcurrentModification,
            LedgerError::Serialization(_) => ErrorCode::ExportFailed,
            LedgerError::DateParse(_) => ErrorCode::InvalidDateFormat,
            LedgerError::StoreUnavailable(_) | LedgerError::DatabaseConnection(_) => {
                ErrorCode::ServiceUnavailable
            }
            LedgerError::DatabaseConfig(_) => ErrorCode::InternalServerError,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_follow_error_taxonomy() {
        assert_eq!(
            ErrorCode::from(&LedgerError::not_found("x")),
            ErrorCode::NotFound
        );
        assert_eq!(
            ErrorCode::from(&LedgerError::validation("Slug already in use: a")),
            ErrorCode::SlugAlreadyExists
        );
        assert_eq!(
            ErrorCode::from(&LedgerError::concurrent_modification("x")),
            ErrorCode::ConcurrentModification
        );
        assert_eq!(
            ErrorCode::from(&LedgerError::store_unavailable("x")),
            ErrorCode::ServiceUnavailable
        );
    }

    #[test]
    fn codes_serialize_as_numbers() {
        let json = serde_json::to_string(&ErrorCode::InvalidTransition).unwrap();
        assert_eq!(json, "3020");
    }
}
