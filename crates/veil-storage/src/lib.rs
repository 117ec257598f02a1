//! Veil Storage Layer
//!
//! SQLite-backed persistence for session and mode state.
//! Every store writes through to the database while holding its own lock.

mod database;
mod domain;
mod error;
mod migrations;

pub use database::Database;
pub use domain::domain_key;
pub use error::StorageError;

pub type Result<T> = std::result::Result<T, StorageError>;
