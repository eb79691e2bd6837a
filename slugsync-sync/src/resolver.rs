//! Token resolution against a live entry.
//!
//! Each [`PatternToken`] resolves to plain text. Missing data never fails the
//! pipeline: the token resolves to empty text and carries a
//! [`ResolutionGap`] so callers can flag the slug as partial.

use crate::error::{SyncError, SyncResult};
use crate::host::ReferenceFetcher;
use serde::Serialize;
use serde_json::Value;
use slugsync_model::{AppConfig, Entry, link_target};
use slugsync_slug::{NormalizationPolicy, Pattern, PatternToken, assemble};
use slugsync_types::{DateParts, EntryId, LocaleCode};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// Why a token resolved to empty text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResolutionGap {
    /// The entry has no such field.
    MissingField { field: String },
    /// The field holds no usable value in the locale or the default locale.
    MissingValue { field: String },
    /// A link field's value does not point at an entry.
    InvalidLink { field: String },
    /// The linked entry does not exist.
    MissingReferencedEntry { entry_id: EntryId },
    /// The linked entry has no such field or value.
    MissingReferencedField { entry_id: EntryId, field: String },
    /// Fetching the linked entry failed.
    FetchFailed { entry_id: EntryId, reason: String },
    /// No path segment is configured for the locale.
    MissingLocalePath { locale: LocaleCode },
}

/// Text produced for one token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub text: String,
    pub gap: Option<ResolutionGap>,
}

impl Resolved {
    fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            gap: None,
        }
    }

    fn gap(gap: ResolutionGap) -> Self {
        Self {
            text: String::new(),
            gap: Some(gap),
        }
    }
}

/// A slug composed for one locale.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SlugOutcome {
    pub slug: String,
    pub gaps: Vec<ResolutionGap>,
}

impl SlugOutcome {
    /// True when at least one token resolved to empty text.
    pub fn is_partial(&self) -> bool {
        !self.gaps.is_empty()
    }
}

/// Everything a token may read besides referenced entries.
#[derive(Debug, Clone, Copy)]
pub struct ResolveContext<'a> {
    pub entry: &'a Entry,
    pub locale: &'a LocaleCode,
    pub default_locale: &'a LocaleCode,
    pub config: &'a AppConfig,
    pub today: DateParts,
}

/// Resolves tokens, fetching referenced entries on demand.
#[derive(Clone)]
pub struct Resolver {
    fetcher: Arc<dyn ReferenceFetcher>,
    fetch_retries: u32,
}

/// Referenced entries already fetched while composing one slug.
type FetchMemo = HashMap<EntryId, Result<Option<Entry>, String>>;

impl Resolver {
    pub fn new(fetcher: Arc<dyn ReferenceFetcher>) -> Self {
        Self {
            fetcher,
            fetch_retries: 0,
        }
    }

    /// Extra fetch attempts after a failed one.
    #[must_use]
    pub fn with_retries(mut self, retries: u32) -> Self {
        self.fetch_retries = retries;
        self
    }

    /// Resolves a single token.
    pub async fn resolve(&self, token: &PatternToken, cx: &ResolveContext<'_>) -> Resolved {
        self.resolve_with(token, cx, &mut FetchMemo::new()).await
    }

    /// Resolves every token of `pattern` and assembles the slug.
    ///
    /// A referenced entry used by several tokens is fetched once.
    pub async fn compose(
        &self,
        pattern: &Pattern,
        cx: &ResolveContext<'_>,
        policy: &NormalizationPolicy,
    ) -> SlugOutcome {
        let mut memo = FetchMemo::new();
        let mut texts = Vec::with_capacity(pattern.tokens().len());
        let mut gaps = Vec::new();

        for token in pattern.tokens() {
            let resolved = self.resolve_with(token, cx, &mut memo).await;
            if let Some(gap) = resolved.gap {
                debug!("{} resolved empty in {}: {:?}", pattern.source(), cx.locale, gap);
                gaps.push(gap);
            }
            texts.push(resolved.text);
        }

        let slug = assemble(pattern.tokens().iter().zip(texts.iter()), policy);
        SlugOutcome { slug, gaps }
    }

    async fn resolve_with(
        &self,
        token: &PatternToken,
        cx: &ResolveContext<'_>,
        memo: &mut FetchMemo,
    ) -> Resolved {
        match token {
            PatternToken::Literal(text) => Resolved::text(text.as_str()),
            PatternToken::OwnField(field) => own_field(field, cx),
            PatternToken::ReferenceField { link, target } => {
                self.reference_field(link, target, cx, memo).await
            }
            PatternToken::LocalePath => match cx.config.locale_path(cx.locale, cx.default_locale) {
                Some(path) => Resolved::text(path),
                None => Resolved::gap(ResolutionGap::MissingLocalePath {
                    locale: cx.locale.clone(),
                }),
            },
            PatternToken::Year => Resolved::text(cx.today.year_segment()),
            PatternToken::Month => Resolved::text(cx.today.month_segment()),
            PatternToken::Day => Resolved::text(cx.today.day_segment()),
            PatternToken::EntryId => Resolved::text(cx.entry.id().as_str()),
        }
    }

    async fn reference_field(
        &self,
        link: &str,
        target: &str,
        cx: &ResolveContext<'_>,
        memo: &mut FetchMemo,
    ) -> Resolved {
        let Some(field) = cx.entry.field(link) else {
            return Resolved::gap(ResolutionGap::MissingField { field: link.to_string() });
        };
        let Some(value) = field.value_for(cx.locale, cx.default_locale) else {
            return Resolved::gap(ResolutionGap::MissingValue { field: link.to_string() });
        };
        let Some(entry_id) = link_target(value) else {
            return Resolved::gap(ResolutionGap::InvalidLink { field: link.to_string() });
        };

        if !memo.contains_key(&entry_id) {
            let fetched = self.fetch(&entry_id).await.map_err(|e| e.to_string());
            memo.insert(entry_id.clone(), fetched);
        }

        match memo.get(&entry_id) {
            Some(Ok(Some(referenced))) => referenced
                .value(target, cx.locale, cx.default_locale)
                .and_then(scalar_text)
                .map(Resolved::text)
                .unwrap_or_else(|| {
                    Resolved::gap(ResolutionGap::MissingReferencedField {
                        entry_id,
                        field: target.to_string(),
                    })
                }),
            Some(Err(reason)) => Resolved::gap(ResolutionGap::FetchFailed {
                entry_id,
                reason: reason.clone(),
            }),
            Some(Ok(None)) | None => Resolved::gap(ResolutionGap::MissingReferencedEntry { entry_id }),
        }
    }

    async fn fetch(&self, id: &EntryId) -> SyncResult<Option<Entry>> {
        let mut attempt = 0;
        loop {
            match self.fetcher.fetch_entry(id).await {
                Ok(found) => return Ok(found),
                Err(e) if attempt < self.fetch_retries => {
                    attempt += 1;
                    debug!("Retrying fetch of {} (attempt {}): {}", id, attempt + 1, e);
                }
                Err(e) => {
                    warn!("Failed to fetch referenced entry {}: {}", id, e);
                    return Err(match e {
                        SyncError::Fetch(_) => e,
                        other => SyncError::Fetch(other.to_string()),
                    });
                }
            }
        }
    }
}

fn own_field(field_id: &str, cx: &ResolveContext<'_>) -> Resolved {
    let Some(field) = cx.entry.field(field_id) else {
        return Resolved::gap(ResolutionGap::MissingField {
            field: field_id.to_string(),
        });
    };
    field
        .value_for(cx.locale, cx.default_locale)
        .and_then(scalar_text)
        .map(Resolved::text)
        .unwrap_or_else(|| {
            Resolved::gap(ResolutionGap::MissingValue {
                field: field_id.to_string(),
            })
        })
}

/// Text form of a scalar field value. Arrays and objects have none.
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
