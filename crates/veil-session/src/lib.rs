//! Veil Session Registry
//!
//! - Exactly one session record per visited domain
//! - Records are created lazily on first reference and never duplicated
//! - A record carries the domain's tabs, warning level and agent string
//! - Queries are read-only projections wrapped in `{type, data}` envelopes

mod error;
mod query;
mod record;
mod store;

pub use error::SessionError;
pub use query::{DomainFilter, Envelope, QueryService, SessionQuery};
pub use record::{normalize_domain, SessionRecord};
pub use store::SessionStore;

pub type Result<T> = std::result::Result<T, SessionError>;
