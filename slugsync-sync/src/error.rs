//! Error types for the sync layer.

use thiserror::Error;

/// Result type for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors that can occur at the host boundary.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Fetching a referenced entry failed. Treated as transient.
    #[error("fetch failed: {0}")]
    Fetch(String),

    /// The host rejected a write.
    #[error("host error: {0}")]
    Host(String),

    /// The controller task has already shut down.
    #[error("controller channel closed")]
    ChannelClosed,
}
