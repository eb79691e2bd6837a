//! Host boundary.
//!
//! The controller never owns the entry it edits. It reads snapshots, listens
//! for per-field change notifications and writes the slug back through an
//! [`EntryHost`]. Referenced entries are looked up through a
//! [`ReferenceFetcher`]. Both are traits so the controller can run against a
//! real editor bridge, the CLI's static files, or the in-memory mocks below.

use crate::error::SyncResult;
use async_trait::async_trait;
use serde_json::Value;
use slugsync_model::Entry;
use slugsync_types::{EntryId, LocaleCode};
use tokio::sync::mpsc;

/// A change notification for one field in one locale.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldChange {
    /// Field whose value changed.
    pub field_id: String,
    /// Locale the change happened in.
    pub locale: LocaleCode,
    /// New value, `None` when the value was removed.
    pub value: Option<Value>,
}

/// Sender half handed to the host when subscribing.
pub type ChangeSender = mpsc::UnboundedSender<FieldChange>;

/// Handle to an active host subscription.
///
/// Disposing runs the host's teardown exactly once. Dropping an undisposed
/// subscription disposes it.
pub struct Subscription {
    dispose: Option<Box<dyn FnOnce() + Send>>,
}

impl Subscription {
    /// Wraps a host-specific teardown callback.
    pub fn new(dispose: impl FnOnce() + Send + 'static) -> Self {
        Self {
            dispose: Some(Box::new(dispose)),
        }
    }

    /// A subscription with nothing to tear down.
    pub fn noop() -> Self {
        Self { dispose: None }
    }

    /// Tears the subscription down.
    pub fn dispose(mut self) {
        self.run_dispose();
    }

    fn run_dispose(&mut self) {
        if let Some(dispose) = self.dispose.take() {
            dispose();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.run_dispose();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.dispose.is_some())
            .finish()
    }
}

/// The editor hosting the slug field.
#[async_trait]
pub trait EntryHost: Send + Sync {
    /// Current snapshot of the entry being edited.
    fn entry(&self) -> Entry;

    /// Subscribes to value changes of one field in one locale.
    ///
    /// Every change, including the controller's own writes, is delivered to
    /// `sender` until the returned subscription is disposed.
    fn subscribe(&self, field_id: &str, locale: &LocaleCode, sender: ChangeSender) -> Subscription;

    /// Writes a field value. `None` removes the value.
    async fn write(&self, field_id: &str, locale: &LocaleCode, value: Option<String>) -> SyncResult<()>;
}

/// Looks up entries referenced through link fields.
#[async_trait]
pub trait ReferenceFetcher: Send + Sync {
    /// Fetches an entry by id. `Ok(None)` means the entry does not exist.
    async fn fetch_entry(&self, id: &EntryId) -> SyncResult<Option<Entry>>;
}

/// In-memory host and fetcher for testing.
pub mod mock {
    use super::*;
    use crate::error::SyncError;
    use slugsync_model::EntryField;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    /// A write recorded by [`MockEntryHost`].
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct RecordedWrite {
        pub field_id: String,
        pub locale: LocaleCode,
        pub value: Option<String>,
    }

    struct Listener {
        field_id: String,
        locale: LocaleCode,
        sender: ChangeSender,
    }

    struct HostState {
        entry: Entry,
        listeners: HashMap<u64, Listener>,
        next_listener: u64,
        writes: Vec<RecordedWrite>,
        reject_writes: bool,
    }

    impl HostState {
        fn notify(&self, field_id: &str, locale: &LocaleCode, value: Option<Value>) {
            for listener in self.listeners.values() {
                if listener.field_id == field_id && &listener.locale == locale {
                    let _ = listener.sender.send(FieldChange {
                        field_id: field_id.to_string(),
                        locale: locale.clone(),
                        value: value.clone(),
                    });
                }
            }
        }
    }

    fn put_value(entry: &mut Entry, field_id: &str, locale: &LocaleCode, value: Value) {
        entry
            .fields
            .entry(field_id.to_string())
            .or_insert_with(|| EntryField::new([locale.clone()]))
            .set_value(locale.clone(), value);
    }

    /// An editor that keeps the entry in memory.
    #[derive(Clone)]
    pub struct MockEntryHost {
        state: Arc<Mutex<HostState>>,
    }

    impl MockEntryHost {
        /// Creates a host editing `entry`.
        pub fn new(entry: Entry) -> Self {
            Self {
                state: Arc::new(Mutex::new(HostState {
                    entry,
                    listeners: HashMap::new(),
                    next_listener: 0,
                    writes: Vec::new(),
                    reject_writes: false,
                })),
            }
        }

        /// Simulates the user editing a field; notifies subscribers.
        pub fn set_value(&self, field_id: &str, locale: &LocaleCode, value: impl Into<Value>) {
            let value = value.into();
            let mut state = self.state.lock().unwrap();
            put_value(&mut state.entry, field_id, locale, value.clone());
            state.notify(field_id, locale, Some(value));
        }

        /// Simulates the user clearing a field; notifies subscribers.
        pub fn clear_value(&self, field_id: &str, locale: &LocaleCode) {
            let mut state = self.state.lock().unwrap();
            if let Some(field) = state.entry.field_mut(field_id) {
                field.remove_value(locale);
            }
            state.notify(field_id, locale, None);
        }

        /// Moves the entry's version counters, e.g. to simulate publishing.
        pub fn set_versions(&self, version: u64, published_version: Option<u64>) {
            let mut state = self.state.lock().unwrap();
            state.entry.sys.version = version;
            state.entry.sys.published_version = published_version;
        }

        /// Makes every following write fail with [`SyncError::Host`].
        pub fn reject_writes(&self, reject: bool) {
            self.state.lock().unwrap().reject_writes = reject;
        }

        /// All accepted writes, oldest first.
        pub fn writes(&self) -> Vec<RecordedWrite> {
            self.state.lock().unwrap().writes.clone()
        }

        /// Accepted writes to one field.
        pub fn writes_to(&self, field_id: &str) -> Vec<RecordedWrite> {
            self.writes()
                .into_iter()
                .filter(|w| w.field_id == field_id)
                .collect()
        }

        /// Number of subscriptions not yet disposed.
        pub fn active_subscriptions(&self) -> usize {
            self.state.lock().unwrap().listeners.len()
        }

        /// Current value of a field as a string.
        pub fn string_value(&self, field_id: &str, locale: &LocaleCode) -> Option<String> {
            let state = self.state.lock().unwrap();
            state
                .entry
                .field(field_id)?
                .get(locale)?
                .as_str()
                .map(str::to_string)
        }
    }

    #[async_trait]
    impl EntryHost for MockEntryHost {
        fn entry(&self) -> Entry {
            self.state.lock().unwrap().entry.clone()
        }

        fn subscribe(&self, field_id: &str, locale: &LocaleCode, sender: ChangeSender) -> Subscription {
            let mut state = self.state.lock().unwrap();
            let id = state.next_listener;
            state.next_listener += 1;
            state.listeners.insert(
                id,
                Listener {
                    field_id: field_id.to_string(),
                    locale: locale.clone(),
                    sender,
                },
            );

            let shared = Arc::clone(&self.state);
            Subscription::new(move || {
                if let Ok(mut state) = shared.lock() {
                    state.listeners.remove(&id);
                }
            })
        }

        async fn write(&self, field_id: &str, locale: &LocaleCode, value: Option<String>) -> SyncResult<()> {
            let mut state = self.state.lock().unwrap();
            if state.reject_writes {
                return Err(SyncError::Host(format!("write to {field_id} rejected")));
            }

            match &value {
                Some(v) => put_value(&mut state.entry, field_id, locale, Value::String(v.clone())),
                None => {
                    if let Some(field) = state.entry.field_mut(field_id) {
                        field.remove_value(locale);
                    }
                }
            }

            state.writes.push(RecordedWrite {
                field_id: field_id.to_string(),
                locale: locale.clone(),
                value: value.clone(),
            });
            state.notify(field_id, locale, value.map(Value::String));
            Ok(())
        }
    }

    /// A reference store with failure injection and call counting.
    #[derive(Default)]
    pub struct MockFetcher {
        entries: Mutex<HashMap<EntryId, Entry>>,
        failures: AtomicU32,
        calls: AtomicUsize,
        delay: Mutex<Option<Duration>>,
    }

    impl MockFetcher {
        pub fn new() -> Self {
            Self::default()
        }

        /// Adds an entry that can be fetched by its id.
        pub fn with_entry(self, entry: Entry) -> Self {
            self.insert(entry);
            self
        }

        pub fn insert(&self, entry: Entry) {
            self.entries
                .lock()
                .unwrap()
                .insert(entry.id().clone(), entry);
        }

        /// Makes the next `count` fetches fail.
        pub fn fail_next(&self, count: u32) {
            self.failures.store(count, Ordering::SeqCst);
        }

        /// Delays every fetch by `delay`.
        pub fn set_delay(&self, delay: Duration) {
            *self.delay.lock().unwrap() = Some(delay);
        }

        /// Number of fetches attempted so far.
        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ReferenceFetcher for MockFetcher {
        async fn fetch_entry(&self, id: &EntryId) -> SyncResult<Option<Entry>> {
            self.calls.fetch_add(1, Ordering::SeqCst);

            let delay = *self.delay.lock().unwrap();
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }

            let failing = self
                .failures
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok();
            if failing {
                return Err(SyncError::Fetch(format!("entry {id} unavailable")));
            }

            Ok(self.entries.lock().unwrap().get(id).cloned())
        }
    }
}
