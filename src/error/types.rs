//! Error types
//!
//! Domain-specific error types for each layer of the locker server. Handlers
//! return `ServiceError`; lower layers return the narrower enums below and
//! convert with `?`.

use std::io;
use thiserror::Error;

/// Session and credential failures
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("missing session token")]
    MissingToken,

    #[error("invalid session token")]
    InvalidToken,

    #[error("session expired")]
    Expired,

    #[error("username/password incorrect")]
    InvalidCredentials,
}

/// Rejections raised before any mutation touches storage
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("name cannot be longer than {max} characters")]
    NameTooLong { max: usize },

    #[error("user storage exceeded: {used} + {added} bytes is over the {quota} byte quota")]
    QuotaExceeded { used: u64, added: u64, quota: u64 },

    #[error("too many nested directories in path, at most {max} allowed")]
    NestingTooDeep { max: usize },

    #[error("too many sub-directories in this directory, at most {max} allowed")]
    TooManySubdirectories { max: usize },

    #[error("weak password: {0}")]
    WeakPassword(String),

    #[error("invalid username: {0}")]
    InvalidUsername(String),

    #[error("database full, cannot sign up new users")]
    DatabaseFull,

    #[error("cannot remove root directory")]
    RootRemoval,
}

/// Underlying filesystem, database, or disk-usage failures
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("disk usage query failed: {0}")]
    DiskUsage(String),
}

/// Record store errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record already exists: {0}")]
    Duplicate(String),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
}

/// Every failure a request handler can report
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("authentication failed: {0}")]
    Authentication(#[from] AuthError),

    #[error("not authorized: {0}")]
    Authorization(String),

    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

impl From<StoreError> for ServiceError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::Duplicate(key) => ServiceError::Conflict(key),
            StoreError::Database(e) => ServiceError::Storage(StorageError::Database(e)),
        }
    }
}

impl From<io::Error> for ServiceError {
    fn from(error: io::Error) -> Self {
        ServiceError::Storage(StorageError::Io(error))
    }
}

/// Result alias used by request handlers
pub type ServiceResult<T> = Result<T, ServiceError>;
