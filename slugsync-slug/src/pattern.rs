//! Slug pattern parsing.
//!
//! A pattern is a `/`-separated list of parts. Bracketed keywords become
//! placeholders, anything else is kept as literal text:
//!
//! | Part | Token |
//! |---|---|
//! | `[field:title]` | [`PatternToken::OwnField`] |
//! | `[field:author:name]` | [`PatternToken::ReferenceField`] |
//! | `[locale]` | [`PatternToken::LocalePath`] |
//! | `[year]`, `[month]`, `[day]` | date tokens |
//! | `[id]` | [`PatternToken::EntryId`] |
//! | `blog` | [`PatternToken::Literal`] |

use crate::error::{PatternError, SlugResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

const FIELD_PREFIX: &str = "field:";

/// One classified unit of a slug pattern.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum PatternToken {
    /// Text copied into the slug as-is.
    Literal(String),
    /// A field on the entry being edited.
    OwnField(String),
    /// `target` read from the entry linked through `link`.
    ReferenceField { link: String, target: String },
    /// Configured path segment of the active locale.
    LocalePath,
    Year,
    Month,
    Day,
    /// The entry's system id.
    EntryId,
}

impl PatternToken {
    pub fn literal(text: impl Into<String>) -> Self {
        Self::Literal(text.into())
    }

    /// Field and reference tokens carry user content and get normalized;
    /// all other tokens are structural.
    pub fn is_field(&self) -> bool {
        matches!(self, Self::OwnField(_) | Self::ReferenceField { .. })
    }

    /// The field on the current entry whose edits affect this token.
    pub fn source_field(&self) -> Option<&str> {
        match self {
            Self::OwnField(field) => Some(field),
            Self::ReferenceField { link, .. } => Some(link),
            _ => None,
        }
    }
}

/// Classifies a single pattern part. Returns `None` for a part that is
/// empty once brackets and whitespace are stripped.
pub fn classify(raw: &str) -> Option<PatternToken> {
    let part = strip_brackets(raw);
    if part.is_empty() {
        return None;
    }

    if let Some(rest) = part.strip_prefix(FIELD_PREFIX) {
        let segments: Vec<&str> = rest.split(':').map(str::trim).collect();
        let token = match segments.as_slice() {
            [field] if !field.is_empty() => Some(PatternToken::OwnField((*field).to_string())),
            [link, target, ..] if !link.is_empty() && !target.is_empty() => {
                Some(PatternToken::ReferenceField {
                    link: (*link).to_string(),
                    target: (*target).to_string(),
                })
            }
            _ => None,
        };
        return Some(token.unwrap_or_else(|| PatternToken::literal(part)));
    }

    let token = match part {
        "locale" => PatternToken::LocalePath,
        "year" => PatternToken::Year,
        "month" => PatternToken::Month,
        "day" => PatternToken::Day,
        "id" => PatternToken::EntryId,
        _ => PatternToken::literal(part),
    };
    Some(token)
}

fn strip_brackets(raw: &str) -> &str {
    let part = raw.trim();
    let part = part.strip_prefix('[').unwrap_or(part);
    let part = part.strip_suffix(']').unwrap_or(part);
    part.trim()
}

/// Parses a pattern string into its ordered token sequence.
pub fn parse(pattern: &str) -> SlugResult<Vec<PatternToken>> {
    let tokens: Vec<PatternToken> = pattern.split('/').filter_map(classify).collect();
    if tokens.is_empty() {
        return Err(PatternError::Empty {
            pattern: pattern.to_string(),
        });
    }
    Ok(tokens)
}

/// A parsed pattern together with its source string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    source: String,
    tokens: Vec<PatternToken>,
}

impl Pattern {
    pub fn parse(source: &str) -> SlugResult<Self> {
        Ok(Self {
            source: source.to_string(),
            tokens: parse(source)?,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn tokens(&self) -> &[PatternToken] {
        &self.tokens
    }

    /// Distinct fields of the current entry this pattern depends on, in
    /// order of first appearance.
    pub fn source_fields(&self) -> Vec<&str> {
        let mut fields: Vec<&str> = Vec::new();
        for field in self.tokens.iter().filter_map(PatternToken::source_field) {
            if !fields.contains(&field) {
                fields.push(field);
            }
        }
        fields
    }
}

/// Memoizes parsed patterns by source string.
#[derive(Debug, Default)]
pub struct PatternCache {
    parsed: HashMap<String, Arc<Pattern>>,
}

impl PatternCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached parse of `source`, parsing it on first use.
    /// Failed parses are not cached.
    pub fn get_or_parse(&mut self, source: &str) -> SlugResult<Arc<Pattern>> {
        if let Some(pattern) = self.parsed.get(source) {
            return Ok(Arc::clone(pattern));
        }
        let pattern = Arc::new(Pattern::parse(source)?);
        self.parsed.insert(source.to_string(), Arc::clone(&pattern));
        Ok(pattern)
    }

    pub fn len(&self) -> usize {
        self.parsed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parsed.is_empty()
    }
}
