//! Mode error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModeError {
    #[error("Invalid mode payload: {0}")]
    Validation(String),

    #[error("Invalid domain: {0:?}")]
    InvalidDomain(String),

    #[error("Storage error: {0}")]
    Storage(#[from] veil_storage::StorageError),
}
