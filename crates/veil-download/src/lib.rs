//! Veil Download Pipeline
//!
//! - Every download is checked against the mode of its domain first
//! - Redirect targets are checked against their own domain's mode
//! - Domains without a saved mode are not restricted
//! - A failed fetch raises the warning level of the domain's session
//! - No retries: one call, one attempt, one result

mod error;
mod fetcher;
mod gate;
mod request;

pub use error::{DownloadError, FetchError};
pub use fetcher::{FetchRequest, FetchResponse, Fetcher, HttpFetcher};
pub use gate::{DownloadGate, DownloadOutcome, WarningPolicy, MAX_REDIRECTS};
pub use request::DownloadRequest;

pub type Result<T> = std::result::Result<T, DownloadError>;
