//! Entry model and configuration for slugsync.
//!
//! Defines the data the slug engine reads but never owns:
//! - [`Entry`]: a live entry, with system metadata and per-locale field values
//! - [`EntrySys`]: the version state used by the publish lock
//! - [`AppConfig`]: the installation parameters authored on the settings screen
//!
//! Everything here is plain data that the host hands over at call time.

mod config;
mod entry;

pub use config::{AppConfig, ContentModelConfig, InstanceConfig};
pub use entry::{Entry, EntryField, EntrySys, PublicationState, link_target};

/// Result type for model operations.
pub type ModelResult<T> = Result<T, ModelError>;

/// Errors that can occur while loading model data.
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
