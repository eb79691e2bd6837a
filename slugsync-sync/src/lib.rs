//! Reactive slug synchronization for slugsync.
//!
//! Keeps a slug field consistent with the entry fields its pattern reads.
//!
//! # Architecture
//!
//! The pure pieces (pattern parsing, normalization, the publish lock) live in
//! `slugsync-slug`. This crate adds everything that touches a live editor:
//!
//! - **Host**: traits for reading the entry, subscribing to field changes,
//!   writing the slug and fetching referenced entries
//! - **Resolver**: turns pattern tokens into text, fetching references
//! - **Timer**: the single-slot debounce window
//! - **Controller**: the task tying it together
//!
//! ## Recompute cycle
//!
//! 1. **Change**: a source field changes in some locale
//! 2. **Debounce**: the affected locales are queued and the window restarts
//! 3. **Lock check**: published entries are skipped when locking is on
//! 4. **Resolve**: each queued locale is resolved concurrently
//! 5. **Write**: slugs are normalized, assembled and written back
//!
//! # Example
//!
//! ```
//! use slugsync_sync::{SyncConfig, SlugFieldContext};
//! use slugsync_types::LocaleCode;
//!
//! let field = SlugFieldContext::new("slug", LocaleCode::from("en-US"))
//!     .localized([LocaleCode::from("de-DE")]);
//! let config = SyncConfig {
//!     debounce_ms: 250,
//!     ..Default::default()
//! };
//!
//! assert_eq!(field.target_locales().len(), 2);
//! assert_eq!(config.load_grace_ms, 1_000);
//! ```

mod controller;
mod error;
pub mod host;
pub mod resolver;
pub mod state;
pub mod timer;

pub use controller::{ControllerHandle, RecomputeOutcome, SlugController, SlugFieldContext, SyncConfig};
pub use error::{SyncError, SyncResult};
pub use host::{ChangeSender, EntryHost, FieldChange, ReferenceFetcher, Subscription};
pub use resolver::{ResolutionGap, ResolveContext, Resolved, Resolver, SlugOutcome};
pub use state::{ControllerState, FieldView, LoadPhase};
pub use timer::DebounceTimer;
