//! Slug controller: keeps one slug field in sync with the fields its pattern
//! reads.
//!
//! The controller runs as a task that owns all mutable state. It listens to
//! three sources: commands from its [`ControllerHandle`], change
//! notifications for the pattern's source fields, and notifications for the
//! slug field itself (edits made elsewhere). Source changes open a debounce
//! window; when it elapses, every affected locale is recomputed concurrently
//! and the results are written back one at a time.

use crate::error::{SyncError, SyncResult};
use crate::host::{EntryHost, FieldChange, ReferenceFetcher, Subscription};
use crate::resolver::{ResolveContext, Resolver, SlugOutcome};
use crate::state::{ControllerState, FieldView, LoadPhase};
use crate::timer::DebounceTimer;
use futures::future::join_all;
use serde_json::Value;
use slugsync_model::{AppConfig, Entry};
use slugsync_slug::{NormalizationPolicy, Pattern, PatternCache, PatternError, is_locked, normalize_manual};
use slugsync_types::{DateSource, LocaleCode, SystemDate};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::{RwLock, mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep_until};
use tracing::{debug, info, warn};

/// Runtime knobs for the controller.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Quiet period after the last source change before recomputing (ms).
    pub debounce_ms: u64,
    /// Grace period after construction during which debounced recomputes
    /// and external refreshes are ignored (ms).
    pub load_grace_ms: u64,
    /// Extra attempts when fetching a referenced entry fails.
    pub fetch_retries: u32,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 500,
            load_grace_ms: 1_000,
            fetch_retries: 0,
        }
    }
}

impl SyncConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn load_grace(&self) -> Duration {
        Duration::from_millis(self.load_grace_ms)
    }
}

/// The slug field being managed and the editor's locale setup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlugFieldContext {
    /// Id of the field that stores the slug.
    pub field_id: String,
    /// Locale the editor is showing. Decides whether the field is configured.
    pub active_locale: LocaleCode,
    pub default_locale: LocaleCode,
    /// Locales the slug field is enabled for.
    pub locales: Vec<LocaleCode>,
    /// Whether the slug field holds a value per locale.
    pub localized: bool,
}

impl SlugFieldContext {
    /// A non-localized slug field edited in the default locale.
    pub fn new(field_id: impl Into<String>, default_locale: LocaleCode) -> Self {
        Self {
            field_id: field_id.into(),
            active_locale: default_locale.clone(),
            locales: vec![default_locale.clone()],
            default_locale,
            localized: false,
        }
    }

    /// Makes the field localized across `locales`. The default locale is
    /// always included.
    #[must_use]
    pub fn localized(mut self, locales: impl IntoIterator<Item = LocaleCode>) -> Self {
        let mut all = vec![self.default_locale.clone()];
        for locale in locales {
            if !all.contains(&locale) {
                all.push(locale);
            }
        }
        self.locales = all;
        self.localized = true;
        self
    }

    #[must_use]
    pub fn with_active_locale(mut self, locale: LocaleCode) -> Self {
        self.active_locale = locale;
        self
    }

    /// Locales whose slug the controller writes.
    pub fn target_locales(&self) -> Vec<LocaleCode> {
        if self.localized {
            self.locales.clone()
        } else {
            vec![self.default_locale.clone()]
        }
    }
}

/// What a recomputation did for one locale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecomputeOutcome {
    /// A slug was derived and written. An empty slug clears the field.
    Written(SlugOutcome),
    /// The entry is published and locking is on. Nothing was written.
    Locked,
    /// No usable pattern for the locale.
    Unconfigured,
    /// The controller was destroyed before the write.
    Inactive,
}

impl RecomputeOutcome {
    /// The slug that was written, if any.
    pub fn slug(&self) -> Option<&str> {
        match self {
            Self::Written(outcome) => Some(&outcome.slug),
            _ => None,
        }
    }
}

enum Command {
    Reset {
        locale: LocaleCode,
        reply: oneshot::Sender<SyncResult<RecomputeOutcome>>,
    },
    ManualEdit {
        locale: LocaleCode,
        text: String,
        reply: oneshot::Sender<SyncResult<Option<String>>>,
    },
    Shutdown,
}

/// Builder for a running controller.
pub struct SlugController {
    host: Arc<dyn EntryHost>,
    fetcher: Arc<dyn ReferenceFetcher>,
    config: AppConfig,
    field: SlugFieldContext,
    sync: SyncConfig,
    dates: Arc<dyn DateSource>,
}

impl SlugController {
    pub fn new(
        host: Arc<dyn EntryHost>,
        fetcher: Arc<dyn ReferenceFetcher>,
        config: AppConfig,
        field: SlugFieldContext,
    ) -> Self {
        Self {
            host,
            fetcher,
            config,
            field,
            sync: SyncConfig::default(),
            dates: Arc::new(SystemDate),
        }
    }

    #[must_use]
    pub fn with_sync_config(mut self, sync: SyncConfig) -> Self {
        self.sync = sync;
        self
    }

    /// Replaces the clock used by date tokens.
    #[must_use]
    pub fn with_date_source(mut self, dates: Arc<dyn DateSource>) -> Self {
        self.dates = dates;
        self
    }

    /// Subscribes to the host and starts the controller task.
    ///
    /// Must be called from within a Tokio runtime. A missing or unparsable
    /// pattern for the active locale leaves the controller
    /// [`ControllerState::Unconfigured`]: it then only handles manual edits.
    pub fn spawn(self) -> ControllerHandle {
        let entry = self.host.entry();
        let content_type = entry.content_type().to_string();
        let targets = self.field.target_locales();

        let mut cache = PatternCache::new();
        let config_error = self.active_pattern(&mut cache, &content_type).err();
        let patterns = match config_error {
            Some(ref e) => {
                info!("Slug field {} is not configured: {}", self.field.field_id, e);
                BTreeMap::new()
            }
            None => self.target_patterns(&mut cache, &content_type, &targets),
        };

        let (change_tx, change_rx) = mpsc::unbounded_channel();
        let (external_tx, external_rx) = mpsc::unbounded_channel();
        let mut subscriptions = Vec::new();

        let sources: BTreeSet<String> = patterns
            .values()
            .flat_map(|p| p.source_fields())
            .map(str::to_string)
            .collect();
        for source in &sources {
            let Some(source_field) = entry.field(source) else {
                debug!("Pattern field {} does not exist on {}", source, entry.id());
                continue;
            };
            for locale in source_field.locales() {
                subscriptions.push(self.host.subscribe(source, locale, change_tx.clone()));
            }
        }
        let source_subscriptions = subscriptions.len();

        for locale in &targets {
            subscriptions.push(
                self.host
                    .subscribe(&self.field.field_id, locale, external_tx.clone()),
            );
        }
        drop(change_tx);
        drop(external_tx);

        info!(
            "Slug controller for {}.{} listening on {} source field locales",
            content_type, self.field.field_id, source_subscriptions
        );

        let view = Arc::new(RwLock::new(initial_view(
            &entry,
            &self.field.field_id,
            &targets,
            config_error.as_ref(),
        )));
        let active = Arc::new(AtomicBool::new(true));
        let (command_tx, command_rx) = mpsc::unbounded_channel();

        let resolver = Resolver::new(self.fetcher).with_retries(self.sync.fetch_retries);
        let policy = NormalizationPolicy::from_config(&self.config);
        let actor = Actor {
            pipeline: Pipeline {
                host: self.host,
                resolver,
                policy,
                config: self.config,
                field: self.field,
                patterns,
                dates: self.dates,
                active: Arc::clone(&active),
                view: Arc::clone(&view),
            },
            timer: DebounceTimer::new(),
            debounce: self.sync.debounce(),
            pending: BTreeSet::new(),
            phase: LoadPhase::Loading,
            grace_deadline: Instant::now() + self.sync.load_grace(),
            subscriptions,
            commands: command_rx,
            changes: change_rx,
            external: external_rx,
        };

        ControllerHandle {
            commands: command_tx,
            view,
            active,
            task: Some(tokio::spawn(actor.run())),
        }
    }

    fn active_pattern(&self, cache: &mut PatternCache, content_type: &str) -> Result<Arc<Pattern>, PatternError> {
        let source = self
            .config
            .pattern_for(content_type, &self.field.active_locale, &self.field.default_locale)
            .ok_or_else(|| PatternError::Missing {
                content_type: content_type.to_string(),
                locale: self.field.active_locale.to_string(),
            })?;
        cache.get_or_parse(source)
    }

    fn target_patterns(
        &self,
        cache: &mut PatternCache,
        content_type: &str,
        targets: &[LocaleCode],
    ) -> BTreeMap<LocaleCode, Arc<Pattern>> {
        let mut patterns = BTreeMap::new();
        for locale in targets {
            let Some(source) = self
                .config
                .pattern_for(content_type, locale, &self.field.default_locale)
            else {
                continue;
            };
            match cache.get_or_parse(source) {
                Ok(pattern) => {
                    patterns.insert(locale.clone(), pattern);
                }
                Err(e) => debug!("Skipping {} for {}: {}", locale, self.field.field_id, e),
            }
        }
        patterns
    }
}

fn initial_view(
    entry: &Entry,
    field_id: &str,
    targets: &[LocaleCode],
    config_error: Option<&PatternError>,
) -> FieldView {
    let mut view = FieldView::default();
    if let Some(slug_field) = entry.field(field_id) {
        for locale in targets {
            if let Some(text) = slug_field.get(locale).and_then(Value::as_str) {
                view.values.insert(locale.clone(), text.to_string());
            }
        }
    }
    if let Some(e) = config_error {
        view.state = ControllerState::Unconfigured;
        view.config_error = Some(e.to_string());
    }
    view
}

/// Handle to a running controller.
///
/// Dropping the handle stops the controller; [`destroy`](Self::destroy)
/// additionally waits for teardown to finish.
pub struct ControllerHandle {
    commands: mpsc::UnboundedSender<Command>,
    view: Arc<RwLock<FieldView>>,
    active: Arc<AtomicBool>,
    task: Option<JoinHandle<()>>,
}

impl ControllerHandle {
    /// Snapshot of the rendered field.
    pub async fn view(&self) -> FieldView {
        self.view.read().await.clone()
    }

    pub async fn state(&self) -> ControllerState {
        self.view.read().await.state
    }

    pub async fn phase(&self) -> LoadPhase {
        self.view.read().await.phase
    }

    /// Displayed slug for `locale`.
    pub async fn value(&self, locale: &LocaleCode) -> Option<String> {
        self.view.read().await.value(locale).map(str::to_string)
    }

    /// Whether the last derived slug for `locale` had resolution gaps.
    pub async fn is_partial(&self, locale: &LocaleCode) -> bool {
        self.view.read().await.is_partial(locale)
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Recomputes `locale` now, ignoring the publish lock and the debounce
    /// window.
    pub async fn reset(&self, locale: &LocaleCode) -> SyncResult<RecomputeOutcome> {
        let (reply, response) = oneshot::channel();
        self.send(Command::Reset {
            locale: locale.clone(),
            reply,
        })?;
        response.await.map_err(|_| SyncError::ChannelClosed)?
    }

    /// Applies text typed into the slug input. Returns the stored value;
    /// `None` means the field was cleared.
    pub async fn manual_edit(&self, locale: &LocaleCode, text: impl Into<String>) -> SyncResult<Option<String>> {
        let (reply, response) = oneshot::channel();
        self.send(Command::ManualEdit {
            locale: locale.clone(),
            text: text.into(),
            reply,
        })?;
        response.await.map_err(|_| SyncError::ChannelClosed)?
    }

    /// Stops the controller and waits until every subscription is released.
    pub async fn destroy(mut self) {
        self.stop();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                warn!("Slug controller task ended abnormally: {}", e);
            }
        }
    }

    fn send(&self, command: Command) -> SyncResult<()> {
        self.commands.send(command).map_err(|_| SyncError::ChannelClosed)
    }

    fn stop(&self) {
        self.active.store(false, Ordering::SeqCst);
        let _ = self.commands.send(Command::Shutdown);
    }
}

impl Drop for ControllerHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Result of deriving a slug before it is written.
enum Derived {
    Slug(SlugOutcome),
    Locked,
    Unconfigured,
}

/// The read-only half of the controller, shared by concurrent
/// recomputations.
struct Pipeline {
    host: Arc<dyn EntryHost>,
    resolver: Resolver,
    config: AppConfig,
    policy: NormalizationPolicy,
    field: SlugFieldContext,
    patterns: BTreeMap<LocaleCode, Arc<Pattern>>,
    dates: Arc<dyn DateSource>,
    active: Arc<AtomicBool>,
    view: Arc<RwLock<FieldView>>,
}

impl Pipeline {
    /// Target locales a change to a source field affects.
    ///
    /// A localized source only affects the locale it changed in, which may
    /// not be a target at all. A shared source affects every target.
    fn affected_locales(&self, entry: &Entry, change: &FieldChange) -> Vec<LocaleCode> {
        let targets = self.field.target_locales();
        let source_localized = entry
            .field(&change.field_id)
            .is_some_and(|f| f.is_localized(&self.field.default_locale));
        if source_localized {
            targets.into_iter().filter(|l| l == &change.locale).collect()
        } else {
            targets
        }
    }

    async fn derive(&self, locale: &LocaleCode, force: bool) -> Derived {
        let Some(pattern) = self.patterns.get(locale) else {
            return Derived::Unconfigured;
        };

        let entry = self.host.entry();
        if is_locked(&entry.sys, self.config.lock_when_published, force) {
            debug!("{} is published, keeping slug for {}", entry.id(), locale);
            return Derived::Locked;
        }

        self.view.write().await.recomputes += 1;
        let cx = ResolveContext {
            entry: &entry,
            locale,
            default_locale: &self.field.default_locale,
            config: &self.config,
            today: self.dates.today(),
        };
        Derived::Slug(self.resolver.compose(pattern, &cx, &self.policy).await)
    }

    async fn recompute(&self, locale: &LocaleCode, force: bool) -> SyncResult<RecomputeOutcome> {
        match self.derive(locale, force).await {
            Derived::Slug(outcome) => self.commit(locale, outcome).await,
            Derived::Locked => Ok(RecomputeOutcome::Locked),
            Derived::Unconfigured => Ok(RecomputeOutcome::Unconfigured),
        }
    }

    async fn commit(&self, locale: &LocaleCode, outcome: SlugOutcome) -> SyncResult<RecomputeOutcome> {
        let value = (!outcome.slug.is_empty()).then(|| outcome.slug.clone());
        if !self.write(locale, value).await? {
            return Ok(RecomputeOutcome::Inactive);
        }
        self.view.write().await.set_partial(locale, outcome.is_partial());
        Ok(RecomputeOutcome::Written(outcome))
    }

    async fn manual_edit(&self, locale: &LocaleCode, text: &str) -> SyncResult<Option<String>> {
        let value = normalize_manual(text, &self.policy);
        if self.write(locale, value.clone()).await? {
            self.view.write().await.set_partial(locale, false);
        }
        Ok(value)
    }

    /// Writes the slug unless the controller has been stopped. Returns
    /// whether the write happened.
    async fn write(&self, locale: &LocaleCode, value: Option<String>) -> SyncResult<bool> {
        if !self.active.load(Ordering::SeqCst) {
            debug!("Controller stopped, dropping slug write for {}", locale);
            return Ok(false);
        }
        self.host
            .write(&self.field.field_id, locale, value.clone())
            .await?;
        match &value {
            Some(slug) => info!("Slug for {} set to {:?}", locale, slug),
            None => info!("Slug for {} cleared", locale),
        }
        self.view.write().await.set_value(locale, value);
        Ok(true)
    }

    async fn set_state(&self, state: ControllerState) {
        let mut view = self.view.write().await;
        if !matches!(view.state, ControllerState::Unconfigured | ControllerState::Stopped) {
            view.state = state;
        }
    }
}

/// The task that owns the controller's mutable state.
struct Actor {
    pipeline: Pipeline,
    timer: DebounceTimer,
    debounce: Duration,
    pending: BTreeSet<LocaleCode>,
    phase: LoadPhase,
    grace_deadline: Instant,
    subscriptions: Vec<Subscription>,
    commands: mpsc::UnboundedReceiver<Command>,
    changes: mpsc::UnboundedReceiver<FieldChange>,
    external: mpsc::UnboundedReceiver<FieldChange>,
}

impl Actor {
    async fn run(mut self) {
        loop {
            tokio::select! {
                command = self.commands.recv() => match command {
                    Some(Command::Reset { locale, reply }) => {
                        let outcome = self.pipeline.recompute(&locale, true).await;
                        let _ = reply.send(outcome);
                    }
                    Some(Command::ManualEdit { locale, text, reply }) => {
                        let stored = self.pipeline.manual_edit(&locale, &text).await;
                        let _ = reply.send(stored);
                    }
                    Some(Command::Shutdown) | None => break,
                },
                Some(change) = self.changes.recv() => self.on_source_change(change).await,
                Some(change) = self.external.recv() => self.on_external_change(change).await,
                () = self.timer.fired() => self.on_debounce_elapsed().await,
                () = sleep_until(self.grace_deadline), if self.phase == LoadPhase::Loading => {
                    self.on_loaded().await;
                }
            }
        }
        self.teardown().await;
    }

    async fn on_source_change(&mut self, change: FieldChange) {
        let entry = self.pipeline.host.entry();
        let locales = self.pipeline.affected_locales(&entry, &change);
        if locales.is_empty() {
            return;
        }
        debug!(
            "{}[{}] changed, recomputing {:?} in {:?}",
            change.field_id, change.locale, locales, self.debounce
        );
        self.pending.extend(locales);
        self.timer.arm(self.debounce);
        self.pipeline.set_state(ControllerState::Debouncing).await;
    }

    async fn on_debounce_elapsed(&mut self) {
        let locales: Vec<LocaleCode> = std::mem::take(&mut self.pending).into_iter().collect();
        if self.phase == LoadPhase::Loading {
            debug!("Ignoring recompute of {:?} during initial load", locales);
            self.pipeline.set_state(ControllerState::Idle).await;
            return;
        }

        self.pipeline.set_state(ControllerState::Recomputing).await;
        let pipeline = &self.pipeline;
        let derived = join_all(locales.iter().map(|locale| pipeline.derive(locale, false))).await;
        for (locale, derived) in locales.iter().zip(derived) {
            if let Derived::Slug(outcome) = derived {
                if let Err(e) = pipeline.commit(locale, outcome).await {
                    warn!("Failed to write slug for {}: {}", locale, e);
                }
            }
        }
        self.pipeline.set_state(ControllerState::Idle).await;
    }

    async fn on_external_change(&mut self, change: FieldChange) {
        if self.phase == LoadPhase::Loading {
            return;
        }
        let text = change
            .value
            .as_ref()
            .and_then(Value::as_str)
            .map(str::to_string);
        self.pipeline.view.write().await.set_value(&change.locale, text);
    }

    async fn on_loaded(&mut self) {
        self.phase = LoadPhase::Ready;
        self.pipeline.view.write().await.phase = LoadPhase::Ready;
        debug!("Slug field {} ready", self.pipeline.field.field_id);
    }

    async fn teardown(&mut self) {
        self.pipeline.active.store(false, Ordering::SeqCst);
        self.timer.cancel();
        self.pending.clear();

        let released = self.subscriptions.len();
        for subscription in self.subscriptions.drain(..) {
            subscription.dispose();
        }
        self.pipeline.view.write().await.state = ControllerState::Stopped;
        debug!("Slug controller stopped, released {} subscriptions", released);
    }
}
