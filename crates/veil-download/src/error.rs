//! Download error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DownloadError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Session error: {0}")]
    Session(#[from] veil_session::SessionError),

    #[error("HTTP client error: {0}")]
    Client(#[from] reqwest::Error),

    #[error("Download task dropped before delivering a result")]
    Dropped,
}

/// Why a fetch produced no payload
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// Resolution, connection, TLS or body read failure
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("HTTP {0}")]
    Status(u16),

    /// A 3xx answer; the gate decides whether the target may be fetched
    #[error("HTTP {status} redirect to {location}")]
    Redirect { status: u16, location: String },
}
