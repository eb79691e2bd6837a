//! Slug normalization.
//!
//! Text is reduced to ASCII letters, digits and `-`, plus any characters the
//! policy preserves. Non-ASCII characters are transliterated first
//! (`"Grüße"` becomes `"grusse"`), camel-case words are split
//! (`"fooBar"` becomes `"foo-bar"`), and every run of other characters
//! collapses to a single separator.

use crate::assemble::PATH_SEPARATOR;
use serde::{Deserialize, Serialize};
use slugsync_model::AppConfig;
use std::collections::BTreeSet;

const SEPARATOR: char = '-';

/// Replacements applied before any custom ones. A custom replacement with
/// the same match text overrides the built-in value.
const BUILTIN_REPLACEMENTS: &[(&str, &str)] = &[
    ("&", " and "),
    ("\u{1F984}", " unicorn "),
    ("\u{2665}", " love "),
];

/// How raw text becomes slug text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NormalizationPolicy {
    pub lowercase: bool,
    pub preserve_leading_underscore: bool,
    pub preserve_characters: BTreeSet<char>,
    /// `(match, replacement)` pairs; earlier pairs win on overlapping text.
    pub custom_replacements: Vec<(String, String)>,
}

impl Default for NormalizationPolicy {
    fn default() -> Self {
        Self {
            lowercase: true,
            preserve_leading_underscore: false,
            preserve_characters: BTreeSet::new(),
            custom_replacements: Vec::new(),
        }
    }
}

impl NormalizationPolicy {
    /// Derives the policy from the installation parameters.
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            lowercase: !config.maintain_case,
            preserve_leading_underscore: config.preserve_leading_underscore,
            preserve_characters: config
                .preserve_characters
                .iter()
                .flat_map(|s| s.chars())
                .collect(),
            custom_replacements: config.custom_replacements.clone(),
        }
    }

    #[must_use]
    pub fn with_lowercase(mut self, lowercase: bool) -> Self {
        self.lowercase = lowercase;
        self
    }

    #[must_use]
    pub fn with_leading_underscore(mut self, preserve: bool) -> Self {
        self.preserve_leading_underscore = preserve;
        self
    }

    #[must_use]
    pub fn preserving(mut self, chars: impl IntoIterator<Item = char>) -> Self {
        self.preserve_characters.extend(chars);
        self
    }

    #[must_use]
    pub fn with_replacement(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.custom_replacements.push((from.into(), to.into()));
        self
    }

    /// Whether `ch` passes through untouched. When lowercasing, the
    /// lowercase form of a preserved letter is preserved too.
    pub fn preserves(&self, ch: char) -> bool {
        self.preserve_characters.contains(&ch)
            || (self.lowercase
                && self
                    .preserve_characters
                    .iter()
                    .any(|p| p.to_lowercase().eq(ch.to_lowercase())))
    }

    /// This policy with `/` preserved, used for text that forms a slug path.
    #[must_use]
    pub fn path_policy(&self) -> Self {
        self.clone().preserving([PATH_SEPARATOR])
    }

    fn custom_value(&self, key: &str) -> Option<&str> {
        self.custom_replacements
            .iter()
            .find(|(from, _)| from.as_str() == key)
            .map(|(_, to)| to.as_str())
    }

    /// Built-ins first (with custom overrides applied), then the remaining
    /// custom replacements in declared order.
    fn replacements(&self) -> Vec<(&str, &str)> {
        let mut ordered: Vec<(&str, &str)> = BUILTIN_REPLACEMENTS
            .iter()
            .map(|&(from, to)| (from, self.custom_value(from).unwrap_or(to)))
            .collect();
        for (from, to) in &self.custom_replacements {
            if !ordered.iter().any(|&(seen, _)| seen == from.as_str()) {
                ordered.push((from.as_str(), to.as_str()));
            }
        }
        ordered
    }
}

/// Normalizes raw text into slug text.
pub fn normalize(raw: &str, policy: &NormalizationPolicy) -> String {
    let mut text = raw.to_string();
    for (from, to) in policy.replacements() {
        if !from.is_empty() {
            text = text.replace(from, to);
        }
    }

    let mut slug = SlugWriter::new(policy);
    for glyph in decamelize(transliterate(&text, policy)) {
        match glyph {
            Glyph::Char(ch) => slug.push(ch),
            Glyph::Break => slug.separate(),
        }
    }

    let mut out = slug.finish();
    if policy.preserve_leading_underscore && raw.starts_with('_') && !out.starts_with('_') {
        out.insert(0, '_');
    }
    out
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Glyph {
    Char(char),
    /// Forced word boundary.
    Break,
}

impl Glyph {
    fn is_upper(self) -> bool {
        matches!(self, Glyph::Char(c) if c.is_ascii_uppercase())
    }

    fn is_lower_or_digit(self) -> bool {
        matches!(self, Glyph::Char(c) if c.is_ascii_lowercase() || c.is_ascii_digit())
    }

    fn is_digit(self) -> bool {
        matches!(self, Glyph::Char(c) if c.is_ascii_digit())
    }

    /// Lowercase letters other than `s` (so `APIs` stays one word), or digits.
    fn continues_word(self) -> bool {
        matches!(self, Glyph::Char(c) if (c.is_ascii_lowercase() && c != 's') || c.is_ascii_digit())
    }
}

/// Transliterates everything the policy does not preserve to ASCII.
fn transliterate(text: &str, policy: &NormalizationPolicy) -> Vec<Glyph> {
    let mut glyphs = Vec::with_capacity(text.len());
    for ch in text.chars() {
        if ch.is_ascii() || policy.preserves(ch) {
            glyphs.push(Glyph::Char(ch));
        } else {
            match deunicode::deunicode_char(ch) {
                Some(ascii) => glyphs.extend(ascii.chars().map(Glyph::Char)),
                None => glyphs.push(Glyph::Break),
            }
        }
    }
    glyphs
}

/// Splits camel-case words: `fooBar` → `foo Bar`, `XMLHttp` → `XML Http`,
/// `ABC123` → `ABC 123`.
fn decamelize(glyphs: Vec<Glyph>) -> Vec<Glyph> {
    let mut out = Vec::with_capacity(glyphs.len());
    let mut upper_run = 0usize;
    for (i, &glyph) in glyphs.iter().enumerate() {
        if let Some(&prev) = i.checked_sub(1).and_then(|p| glyphs.get(p)) {
            let next = glyphs.get(i + 1).copied();
            let split = (prev.is_lower_or_digit() && glyph.is_upper())
                || (upper_run >= 2 && glyph.is_digit())
                || (prev.is_upper() && glyph.is_upper() && next.is_some_and(Glyph::continues_word));
            if split {
                out.push(Glyph::Break);
            }
        }
        upper_run = if glyph.is_upper() { upper_run + 1 } else { 0 };
        out.push(glyph);
    }
    out
}

/// Normalizes text typed directly into the slug field.
///
/// Each `-`-delimited part is normalized on its own and the parts are joined
/// back with `-`, so a separator the user is in the middle of typing is kept.
/// Path separators survive, as they do in derived slugs. Returns `None` when
/// nothing is left, meaning the field should be cleared.
pub fn normalize_manual(typed: &str, policy: &NormalizationPolicy) -> Option<String> {
    let policy = policy.path_policy();
    let joined = typed
        .split(SEPARATOR)
        .map(|part| normalize(part, &policy))
        .collect::<Vec<_>>()
        .join(&SEPARATOR.to_string());
    (!joined.is_empty()).then_some(joined)
}

/// Accumulates slug characters, collapsing separator runs and dropping
/// leading and trailing separators.
struct SlugWriter<'a> {
    policy: &'a NormalizationPolicy,
    out: String,
    pending_separator: bool,
}

impl<'a> SlugWriter<'a> {
    fn new(policy: &'a NormalizationPolicy) -> Self {
        Self {
            policy,
            out: String::new(),
            pending_separator: false,
        }
    }

    fn separate(&mut self) {
        self.pending_separator = true;
    }

    fn flush_separator(&mut self) {
        if self.pending_separator && !self.out.is_empty() {
            self.out.push(SEPARATOR);
        }
        self.pending_separator = false;
    }

    fn push(&mut self, ch: char) {
        if self.policy.preserves(ch) {
            self.flush_separator();
            if self.policy.lowercase {
                self.out.extend(ch.to_lowercase());
            } else {
                self.out.push(ch);
            }
        } else if ch.is_ascii_alphanumeric() {
            self.flush_separator();
            self.out
                .push(if self.policy.lowercase { ch.to_ascii_lowercase() } else { ch });
        } else {
            self.separate();
        }
    }

    fn finish(self) -> String {
        self.out
    }
}
