//! Library half of the `slugsync` command line tool.
//!
//! Loads an installation config, an entry and its referenced entries from
//! JSON files and runs the same resolution pipeline the live controller
//! uses, once, without subscriptions or debouncing.

use anyhow::{Context, Result};
use async_trait::async_trait;
use slugsync_model::{AppConfig, Entry, InstanceConfig};
use slugsync_slug::{NormalizationPolicy, Pattern, PatternError, is_locked, normalize_manual};
use slugsync_sync::{ReferenceFetcher, ResolveContext, Resolver, SlugOutcome, SyncResult};
use slugsync_types::{DateSource, EntryId, LocaleCode};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Referenced entries loaded up front.
#[derive(Debug, Clone, Default)]
pub struct StaticFetcher {
    entries: HashMap<EntryId, Entry>,
}

impl StaticFetcher {
    pub fn new(entries: impl IntoIterator<Item = Entry>) -> Self {
        Self {
            entries: entries.into_iter().map(|e| (e.id().clone(), e)).collect(),
        }
    }

    /// Parses a JSON array of entries.
    pub fn from_json(json: &str) -> Result<Self> {
        let entries: Vec<Entry> = serde_json::from_str(json).context("Invalid references JSON")?;
        Ok(Self::new(entries))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl ReferenceFetcher for StaticFetcher {
    async fn fetch_entry(&self, id: &EntryId) -> SyncResult<Option<Entry>> {
        Ok(self.entries.get(id).cloned())
    }
}

/// Result of previewing one entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preview {
    pub outcome: SlugOutcome,
    /// Whether the live controller would currently refuse to update the slug.
    pub locked: bool,
    /// Full preview URL, when a path prefix is configured.
    pub url: Option<String>,
}

pub fn load_config(path: &Path) -> Result<AppConfig> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    AppConfig::from_json(&json).with_context(|| format!("Invalid config {}", path.display()))
}

pub fn load_entry(path: &Path) -> Result<Entry> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read entry {}", path.display()))?;
    serde_json::from_str(&json).with_context(|| format!("Invalid entry {}", path.display()))
}

pub fn load_references(path: &Path) -> Result<StaticFetcher> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read references {}", path.display()))?;
    StaticFetcher::from_json(&json)
}

/// Derives the slug `entry` would get in `locale`.
pub async fn preview(
    config: &AppConfig,
    entry: &Entry,
    references: Arc<dyn ReferenceFetcher>,
    locale: &LocaleCode,
    default_locale: &LocaleCode,
    dates: &dyn DateSource,
) -> Result<Preview> {
    let content_type = entry.content_type();
    let source = config
        .pattern_for(content_type, locale, default_locale)
        .ok_or_else(|| PatternError::Missing {
            content_type: content_type.to_string(),
            locale: locale.to_string(),
        })?;
    let pattern = Pattern::parse(source)?;
    debug!("Using pattern {:?} for {} in {}", pattern.source(), entry.id(), locale);

    let cx = ResolveContext {
        entry,
        locale,
        default_locale,
        config,
        today: dates.today(),
    };
    let policy = NormalizationPolicy::from_config(config);
    let outcome = Resolver::new(references).compose(&pattern, &cx, &policy).await;

    Ok(Preview {
        locked: is_locked(&entry.sys, config.lock_when_published, false),
        url: config.preview_url(&outcome.slug, &InstanceConfig::default()),
        outcome,
    })
}

/// Normalizes text the way a manual edit of the slug input is normalized.
pub fn normalize_text(config: &AppConfig, text: &str) -> Option<String> {
    normalize_manual(text, &NormalizationPolicy::from_config(config))
}
