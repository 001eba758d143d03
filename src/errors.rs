use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    DatabaseConfig(String),
    DatabaseConnection(String),
    StoreUnavailable(String),
    Validation(String),
    NotFound(String),
    LinkInactive(String),
    InvalidTransition(String),
    ConcurrentModification(String),
    Serialization(String),
    DateParse(String),
}

impl LedgerError {
    /// Stable error code, used in logs and API payloads
    pub fn code(&self) -> &'static str {
        match self {
            LedgerError::DatabaseConfig(_) => "E001",
            LedgerError::DatabaseConnection(_) => "E002",
            LedgerError::StoreUnavailable(_) => "E003",
            LedgerError::Validation(_) => "E004",
            LedgerError::NotFound(_) => "E005",
            LedgerError::LinkInactive(_) => "E006",
            LedgerError::InvalidTransition(_) => "E007",
            LedgerError::ConcurrentModification(_) => "E008",
            LedgerError::Serialization(_) => "E009",
            LedgerError::DateParse(_) => "E010",
        }
    }

    /// Human readable error category
    pub fn error_type(&self) -> &'static str {
        match self {
            LedgerError::DatabaseConfig(_) => "Database Configuration Error",
            LedgerError::DatabaseConnection(_) => "Database Connection Error",
            LedgerError::StoreUnavailable(_) => "Store Unavailable",
            LedgerError::Validation(_) => "Validation Error",
            LedgerError::NotFound(_) => "Resource Not Found",
            LedgerError::LinkInactive(_) => "Link Inactive",
            LedgerError::InvalidTransition(_) => "Invalid State Transition",
            LedgerError::ConcurrentModification(_) => "Concurrent Modification",
            LedgerError::Serialization(_) => "Serialization Error",
            LedgerError::DateParse(_) => "Date Parse Error",
        }
    }

    /// Error detail message
    pub fn message(&self) -> &str {
        match self {
            LedgerError::DatabaseConfig(msg) => msg,
            LedgerError::DatabaseConnection(msg) => msg,
            LedgerError::StoreUnavailable(msg) => msg,
            LedgerError::Validation(msg) => msg,
            LedgerError::NotFound(msg) => msg,
            LedgerError::LinkInactive(msg) => msg,
            LedgerError::InvalidTransition(msg) => msg,
            LedgerError::ConcurrentModification(msg) => msg,
            LedgerError::Serialization(msg) => msg,
            LedgerError::DateParse(msg) => msg,
        }
    }

    /// Whether the caller may retry the same call and expect it to succeed
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            LedgerError::StoreUnavailable(_) | LedgerError::ConcurrentModification(_)
        )
    }

    /// Colored output for server startup errors
    pub fn format_colored(&self) -> String {
        use colored::Colorize;
        format!(
            "{} {} {}\n  {}",
            "[ERROR]".red().bold(),
            self.code().yellow(),
            self.error_type().red(),
            self.message().white()
        )
    }

    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }
}

impl fmt::Display for LedgerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for LedgerError {}

// Convenience constructors
impl LedgerError {
    pub fn database_config<T: Into<String>>(msg: T) -> Self {
        LedgerError::DatabaseConfig(msg.into())
    }

    pub fn database_connection<T: Into<String>>(msg: T) -> Self {
        LedgerError::DatabaseConnection(msg.into())
    }

    pub fn store_unavailable<T: Into<String>>(msg: T) -> Self {
        LedgerError::StoreUnavailable(msg.into())
    }

    pub fn validation<T: Into<String>>(msg: T) -> Self {
        LedgerError::Validation(msg.into())
    }

    pub fn not_found<T: Into<String>>(msg: T) -> Self {
        LedgerError::NotFound(msg.into())
    }

    pub fn link_inactive<T: Into<String>>(msg: T) -> Self {
        LedgerError::LinkInactive(msg.into())
    }

    pub fn invalid_transition<T: Into<String>>(msg: T) -> Self {
        LedgerError::InvalidTransition(msg.into())
    }

    pub fn concurrent_modification<T: Into<String>>(msg: T) -> Self {
        LedgerError::ConcurrentModification(msg.into())
    }

    pub fn serialization<T: Into<String>>(msg: T) -> Self {
        LedgerError::Serialization(msg.into())
    }

    pub fn date_parse<T: Into<String>>(msg: T) -> Self {
        LedgerError::DateParse(msg.into())
    }
}

impl From<sea_orm::DbErr> for LedgerError {
    fn from(err: sea_orm::DbErr) -> Self {
        LedgerError::StoreUnavailable(err.to_string())
    }
}

impl From<serde_json::Error> for LedgerError {
    fn from(err: serde_json::Error) -> Self {
        LedgerError::Serialization(err.to_string())
    }
}

impl From<csv::Error> for LedgerError {
    fn from(err: csv::Error) -> Self {
        LedgerError::Serialization(err.to_string())
    }
}

impl From<chrono::ParseError> for LedgerError {
    fn from(err: chrono::ParseError) -> Self {
        LedgerError::DateParse(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, LedgerError>;
