//! Veil Content Modes
//!
//! A mode is a per-domain matrix deciding which content categories may be
//! fetched:
//! | Category | Examples                      |
//! | text     | html, css, js, json, txt      |
//! | image    | png, jpg, gif, webp, svg      |
//! | audio    | mp3, ogg, wav, flac           |
//! | video    | mp4, webm, mkv, mov           |
//! | other    | pdf, zip, fonts, binaries     |
//!
//! Modes are opt-in restrictions: a domain without a saved mode is not
//! restricted at all.

mod category;
mod error;
mod matrix;
mod store;

pub use category::Category;
pub use error::ModeError;
pub use matrix::{ModeMatrix, ModePayload};
pub use store::{ModeCheck, ModeStore};

pub type Result<T> = std::result::Result<T, ModeError>;
