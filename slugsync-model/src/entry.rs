use serde::{Deserialize, Serialize};
use serde_json::Value;
use slugsync_types::{EntryId, LocaleCode};
use std::collections::BTreeMap;

/// A live entry as seen by the editing surface.
///
/// `fields` maps a field id to its per-locale values. Referenced entries
/// fetched from the content store use the same shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    pub sys: EntrySys,
    #[serde(default)]
    pub fields: BTreeMap<String, EntryField>,
}

impl Entry {
    /// Creates an entry with no fields.
    pub fn new(id: EntryId, content_type: impl Into<String>) -> Self {
        Self {
            sys: EntrySys::draft(id, content_type),
            fields: BTreeMap::new(),
        }
    }

    /// Adds (or replaces) a field.
    #[must_use]
    pub fn with_field(mut self, field_id: impl Into<String>, field: EntryField) -> Self {
        self.fields.insert(field_id.into(), field);
        self
    }

    /// Sets the version state.
    #[must_use]
    pub fn with_versions(mut self, version: u64, published_version: Option<u64>) -> Self {
        self.sys.version = version;
        self.sys.published_version = published_version;
        self
    }

    pub fn id(&self) -> &EntryId {
        &self.sys.id
    }

    pub fn content_type(&self) -> &str {
        &self.sys.content_type
    }

    pub fn field(&self, field_id: &str) -> Option<&EntryField> {
        self.fields.get(field_id)
    }

    pub fn field_mut(&mut self, field_id: &str) -> Option<&mut EntryField> {
        self.fields.get_mut(field_id)
    }

    /// Value of a field for `locale`, falling back to `default_locale`.
    pub fn value(&self, field_id: &str, locale: &LocaleCode, default_locale: &LocaleCode) -> Option<&Value> {
        self.field(field_id)?.value_for(locale, default_locale)
    }
}

/// System metadata of an entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntrySys {
    pub id: EntryId,
    #[serde(default)]
    pub content_type: String,
    #[serde(default = "initial_version")]
    pub version: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_version: Option<u64>,
}

fn initial_version() -> u64 {
    1
}

impl EntrySys {
    /// Metadata of a never-published entry.
    pub fn draft(id: EntryId, content_type: impl Into<String>) -> Self {
        Self {
            id,
            content_type: content_type.into(),
            version: initial_version(),
            published_version: None,
        }
    }

    /// Classifies the entry by how far it has moved past its last publish.
    ///
    /// The host bumps `version` once when publishing, so `version ==
    /// published + 1` means "published with no edits since".
    pub fn publication_state(&self) -> PublicationState {
        match self.published_version.filter(|p| *p > 0) {
            Some(published) if self.version == published + 1 => PublicationState::PublishedClean,
            Some(published) if self.version >= published + 2 => PublicationState::PublishedDirty,
            _ => PublicationState::Unpublished,
        }
    }
}

/// Publish status derived from [`EntrySys`] versions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PublicationState {
    /// Never published, or version numbers that do not follow a publish.
    Unpublished,
    /// Published and untouched since.
    PublishedClean,
    /// Published and edited at least once since.
    PublishedDirty,
}

impl PublicationState {
    pub fn is_published(self) -> bool {
        !matches!(self, Self::Unpublished)
    }
}

/// One field of an entry: the locales it is enabled for and its values.
///
/// A non-localized field is enabled only for the default locale. Serialized
/// as a plain `locale -> value` map; deserialized fields are enabled for
/// exactly the locales that carry a value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<LocaleCode, Value>", into = "BTreeMap<LocaleCode, Value>")]
pub struct EntryField {
    locales: Vec<LocaleCode>,
    values: BTreeMap<LocaleCode, Value>,
}

impl EntryField {
    /// A field enabled for the given locales, with no values yet.
    pub fn new(locales: impl IntoIterator<Item = LocaleCode>) -> Self {
        let mut field = Self::default();
        for locale in locales {
            if !field.locales.contains(&locale) {
                field.locales.push(locale);
            }
        }
        field
    }

    /// A non-localized field holding one value under the default locale.
    pub fn shared(default_locale: &LocaleCode, value: impl Into<Value>) -> Self {
        Self::new([default_locale.clone()]).with_value(default_locale.clone(), value)
    }

    /// Sets a value, enabling the locale if needed.
    #[must_use]
    pub fn with_value(mut self, locale: LocaleCode, value: impl Into<Value>) -> Self {
        self.set_value(locale, value);
        self
    }

    pub fn set_value(&mut self, locale: LocaleCode, value: impl Into<Value>) {
        if !self.locales.contains(&locale) {
            self.locales.push(locale.clone());
        }
        self.values.insert(locale, value.into());
    }

    pub fn remove_value(&mut self, locale: &LocaleCode) -> Option<Value> {
        self.values.remove(locale)
    }

    /// Locales this field is enabled for.
    pub fn locales(&self) -> &[LocaleCode] {
        &self.locales
    }

    pub fn has_locale(&self, locale: &LocaleCode) -> bool {
        self.locales.contains(locale)
    }

    /// True when the field is enabled for any locale besides the default.
    pub fn is_localized(&self, default_locale: &LocaleCode) -> bool {
        self.locales.iter().any(|l| l != default_locale)
    }

    /// Raw value stored for exactly `locale`.
    pub fn get(&self, locale: &LocaleCode) -> Option<&Value> {
        self.values.get(locale).filter(|v| !v.is_null())
    }

    /// Value for `locale`, falling back to the default locale when the field
    /// is not enabled for `locale` or holds nothing there.
    pub fn value_for(&self, locale: &LocaleCode, default_locale: &LocaleCode) -> Option<&Value> {
        let effective = if self.has_locale(locale) { locale } else { default_locale };
        self.get(effective).or_else(|| self.get(default_locale))
    }
}

impl From<BTreeMap<LocaleCode, Value>> for EntryField {
    fn from(values: BTreeMap<LocaleCode, Value>) -> Self {
        Self {
            locales: values.keys().cloned().collect(),
            values,
        }
    }
}

impl From<EntryField> for BTreeMap<LocaleCode, Value> {
    fn from(field: EntryField) -> Self {
        field.values
    }
}

/// Extracts the target id of an entry link value
/// (`{"sys": {"type": "Link", "linkType": "Entry", "id": "..."}}`).
pub fn link_target(value: &Value) -> Option<EntryId> {
    let id = value.pointer("/sys/id")?.as_str()?;
    EntryId::parse(id).ok()
}
