//! Core error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Storage error: {0}")]
    Storage(#[from] veil_storage::StorageError),

    #[error("Session error: {0}")]
    Session(#[from] veil_session::SessionError),

    #[error("Mode error: {0}")]
    Mode(#[from] veil_mode::ModeError),

    #[error("Download error: {0}")]
    Download(#[from] veil_download::DownloadError),

    #[error("Configuration error: {0}")]
    Config(String),
}
