use thiserror::Error;

/// Reasons a country lookup can fail.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    #[error("lookup service unreachable: {0}")]
    Unreachable(String),
    #[error("lookup timed out")]
    Timeout,
    #[error("lookup service answered with status {0}")]
    Status(u16),
    #[error("malformed lookup response: {0}")]
    Malformed(String),
    #[error("lookup response carries no usable country code")]
    MissingCountry,
    #[error("lookup transport error: {0}")]
    Transport(String),
}

#[derive(Error, Debug)]
pub enum CardCostError {
    #[error("Invalid card number")]
    InvalidInput,
    #[error("Country lookup failed: {0}")]
    LookupFailure(#[from] LookupError),
    #[error("Request limit exceeded, wait a few minutes and try again")]
    NotAdmitted,
    #[error("Clearing cost not found: {0}")]
    RecordNotFound(String),
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Internal error: {0}")]
    InternalError(Box<dyn std::error::Error + Send + Sync>),
    #[cfg(feature = "storage-rocksdb")]
    #[error("Storage error: {0}")]
    StorageError(#[from] rocksdb::Error),
}

/// Tag identifying which part of the taxonomy an error belongs to.
///
/// Boundary layers map these to their own status vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidInput,
    LookupFailure,
    NotAdmitted,
    RecordNotFound,
    Validation,
    Internal,
}

impl CardCostError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidInput => ErrorKind::InvalidInput,
            Self::LookupFailure(_) => ErrorKind::LookupFailure,
            Self::NotAdmitted => ErrorKind::NotAdmitted,
            Self::RecordNotFound(_) => ErrorKind::RecordNotFound,
            Self::ValidationError(_) => ErrorKind::Validation,
            _ => ErrorKind::Internal,
        }
    }
}

pub type Result<T> = std::result::Result<T, CardCostError>;
