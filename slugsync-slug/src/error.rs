//! Error types for the slug engine.

use thiserror::Error;

/// Result type for pattern operations.
pub type SlugResult<T> = Result<T, PatternError>;

/// Errors raised while parsing a slug pattern.
///
/// Callers treat any of these as "slug not configured", not as a failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    /// The pattern has no resolvable segment.
    #[error("pattern {pattern:?} has no resolvable segments")]
    Empty { pattern: String },

    /// No pattern is configured for the content type in the locale or its
    /// default-locale fallback.
    #[error("no slug pattern configured for content type {content_type:?} in {locale}")]
    Missing { content_type: String, locale: String },
}
