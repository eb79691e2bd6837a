//! Pure slug engine for slugsync.
//!
//! Everything in this crate is synchronous and side-effect free:
//!
//! - **Pattern**: parses `[field:title]/[year]/[id]` style strings into an
//!   ordered sequence of [`PatternToken`]s
//! - **Normalize**: turns raw text into slug-safe text under a
//!   [`NormalizationPolicy`]
//! - **Assemble**: joins resolved token texts into the final slug
//! - **Lock**: decides whether an automatic recompute may overwrite the slug
//!   of a published entry
//!
//! Resolving tokens against live entry data is the job of `slugsync-sync`.
//!
//! # Example
//!
//! ```
//! use slugsync_slug::{NormalizationPolicy, Pattern, PatternToken, assemble};
//!
//! let pattern = Pattern::parse("[field:title]/[locale]").unwrap();
//! let texts = pattern.tokens().iter().map(|token| match token {
//!     PatternToken::OwnField(_) => "Hello World!".to_string(),
//!     PatternToken::LocalePath => "de".to_string(),
//!     _ => String::new(),
//! });
//! let slug = assemble(pattern.tokens().iter().zip(texts), &NormalizationPolicy::default());
//! assert_eq!(slug, "hello-world/de");
//! ```

mod assemble;
mod error;
mod lock;
mod normalize;
mod pattern;

pub use assemble::{PATH_SEPARATOR, assemble};
pub use error::{PatternError, SlugResult};
pub use lock::is_locked;
pub use normalize::{NormalizationPolicy, normalize, normalize_manual};
pub use pattern::{Pattern, PatternCache, PatternToken, classify, parse};
