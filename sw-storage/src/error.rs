use thiserror::Error;

/// Errors raised by the persistence layer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StorageError {
    #[error("no row with id {0}")]
    NotFound(u64),
    #[error("a row with id {0} already exists")]
    Duplicate(u64),
    #[error("referential integrity violation: {0}")]
    Integrity(String),
}

pub type StorageResult<T> = Result<T, StorageError>;
