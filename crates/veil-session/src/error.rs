//! Session error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Invalid domain: {0:?}")]
    InvalidDomain(String),

    #[error("Storage error: {0}")]
    Storage(#[from] veil_storage::StorageError),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}
