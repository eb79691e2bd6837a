use crate::ModelResult;
use serde::{Deserialize, Serialize};
use slugsync_types::LocaleCode;
use std::collections::BTreeMap;

/// Installation parameters authored on the settings screen.
///
/// Keys missing from the stored JSON take the defaults the field editor
/// assumes, which differ from [`AppConfig::initial`] in `lock_when_published`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppConfig {
    /// Website base URL shown in front of the slug.
    pub path_prefix: String,
    pub show_path_prefix: bool,
    /// `[match, replacement]` pairs applied before transliteration, in order.
    pub custom_replacements: Vec<(String, String)>,
    pub lock_when_published: bool,
    pub maintain_case: bool,
    pub preserve_leading_underscore: bool,
    pub show_copy_button: bool,
    pub show_preview_link: bool,
    pub preserve_characters: Vec<String>,
    /// Locale -> path segment used by the `[locale]` token.
    pub paths: BTreeMap<LocaleCode, String>,
    /// Content type id -> slug configuration.
    pub models: BTreeMap<String, ContentModelConfig>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            path_prefix: String::new(),
            show_path_prefix: true,
            custom_replacements: Vec::new(),
            lock_when_published: false,
            maintain_case: false,
            preserve_leading_underscore: false,
            show_copy_button: false,
            show_preview_link: true,
            preserve_characters: Vec::new(),
            paths: BTreeMap::new(),
            models: BTreeMap::new(),
        }
    }
}

impl AppConfig {
    /// Parameters a fresh installation is seeded with.
    pub fn initial() -> Self {
        Self {
            lock_when_published: true,
            ..Self::default()
        }
    }

    pub fn from_json(json: &str) -> ModelResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> ModelResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Slug pattern for a content type in `locale`, falling back to the
    /// default locale's pattern. Blank patterns count as absent.
    pub fn pattern_for(
        &self,
        content_type: &str,
        locale: &LocaleCode,
        default_locale: &LocaleCode,
    ) -> Option<&str> {
        let model = self.models.get(content_type)?;
        non_blank(model.patterns.get(locale)).or_else(|| non_blank(model.patterns.get(default_locale)))
    }

    /// Path segment for `locale`, falling back to the default locale's.
    pub fn locale_path(&self, locale: &LocaleCode, default_locale: &LocaleCode) -> Option<&str> {
        non_blank(self.paths.get(locale)).or_else(|| non_blank(self.paths.get(default_locale)))
    }

    /// Id of the field that stores the slug for a content type.
    pub fn slug_field(&self, content_type: &str) -> Option<&str> {
        self.models.get(content_type)?.slug_field.as_deref()
    }

    /// Whether the path prefix is shown in front of the input.
    pub fn shows_prefix(&self, instance: &InstanceConfig) -> bool {
        (self.show_path_prefix || instance.show_website_url) && !self.path_prefix.is_empty()
    }

    /// Full preview URL for a slug, when previews are enabled.
    pub fn preview_url(&self, value: &str, instance: &InstanceConfig) -> Option<String> {
        let enabled = self.show_preview_link || instance.show_preview_url;
        if !enabled || self.path_prefix.is_empty() || value.is_empty() {
            return None;
        }
        Some(self.copy_text(value))
    }

    /// Text placed on the clipboard by the copy button.
    pub fn copy_text(&self, value: &str) -> String {
        format!("{}/{}", self.path_prefix, value)
    }
}

fn non_blank(value: Option<&String>) -> Option<&str> {
    value.map(String::as_str).filter(|s| !s.trim().is_empty())
}

/// Slug configuration of one content type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentModelConfig {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug_field: Option<String>,
    /// Locale -> pattern string.
    #[serde(default)]
    pub patterns: BTreeMap<LocaleCode, String>,
}

impl ContentModelConfig {
    pub fn new(id: impl Into<String>, slug_field: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            slug_field: Some(slug_field.into()),
            patterns: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_pattern(mut self, locale: LocaleCode, pattern: impl Into<String>) -> Self {
        self.patterns.insert(locale, pattern.into());
        self
    }
}

/// Per-field-instance toggles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InstanceConfig {
    pub show_website_url: bool,
    pub show_preview_url: bool,
}

impl Default for InstanceConfig {
    fn default() -> Self {
        Self {
            show_website_url: true,
            show_preview_url: true,
        }
    }
}
