//! Core type definitions for slugsync.
//!
//! This crate defines the small, host-agnostic types shared by every layer
//! of the slug engine:
//! - Entry and locale identifiers
//! - Calendar date parts and the [`DateSource`] used by date tokens
//!
//! Entry content, configuration and slug logic live in the crates above
//! this one.

mod date;
mod ids;

pub use date::{DateParts, DateSource, FixedDate, SystemDate};
pub use ids::{EntryId, LocaleCode};

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in type operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid entry id: {0:?}")]
    InvalidEntryId(String),

    #[error("invalid locale code: {0:?}")]
    InvalidLocale(String),

    #[error("invalid date: {0}")]
    InvalidDate(String),
}
