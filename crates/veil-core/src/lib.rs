//! Veil Core
//!
//! Process-wide wiring of the session registry, content modes and the gated
//! download pipeline. One `Client` owns one set of stores.

mod client;
mod config;
mod error;

pub use client::Client;
pub use config::Config;
pub use error::CoreError;

// Re-export core components
pub use veil_download::{
    DownloadError, DownloadGate, DownloadOutcome, DownloadRequest, FetchError, FetchRequest,
    FetchResponse, Fetcher, HttpFetcher, WarningPolicy,
};
pub use veil_mode::{Category, ModeCheck, ModeError, ModeMatrix, ModePayload, ModeStore};
pub use veil_session::{
    DomainFilter, Envelope, QueryService, SessionError, SessionQuery, SessionRecord, SessionStore,
};
pub use veil_storage::{Database, StorageError};

pub type Result<T> = std::result::Result<T, CoreError>;

/// Initialize logging
pub fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt().with_env_filter(filter).with_target(true).init();
}
