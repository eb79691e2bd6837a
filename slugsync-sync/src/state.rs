//! Observable controller state.

use serde::Serialize;
use slugsync_types::LocaleCode;
use std::collections::{BTreeMap, BTreeSet};

/// What the controller is doing right now.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ControllerState {
    /// No usable pattern for the active locale. Only manual edits work.
    Unconfigured,
    /// Waiting for changes.
    #[default]
    Idle,
    /// A change arrived; the debounce window is open.
    Debouncing,
    /// Resolving and writing.
    Recomputing,
    /// Torn down. Nothing is written any more.
    Stopped,
}

/// Whether the initial load grace period has passed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadPhase {
    /// Debounced recomputes and external refreshes are ignored.
    #[default]
    Loading,
    Ready,
}

/// Snapshot of what a slug field editor would render.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FieldView {
    pub state: ControllerState,
    pub phase: LoadPhase,
    /// Displayed slug per target locale.
    pub values: BTreeMap<LocaleCode, String>,
    /// Locales whose last derived slug had resolution gaps.
    pub partial: BTreeSet<LocaleCode>,
    /// Number of per-locale recomputations that reached the resolver.
    pub recomputes: u64,
    /// Why the field is unconfigured, if it is.
    pub config_error: Option<String>,
}

impl FieldView {
    pub fn value(&self, locale: &LocaleCode) -> Option<&str> {
        self.values.get(locale).map(String::as_str)
    }

    pub fn is_partial(&self, locale: &LocaleCode) -> bool {
        self.partial.contains(locale)
    }

    pub(crate) fn set_value(&mut self, locale: &LocaleCode, value: Option<String>) {
        match value {
            Some(v) => {
                self.values.insert(locale.clone(), v);
            }
            None => {
                self.values.remove(locale);
            }
        }
    }

    pub(crate) fn set_partial(&mut self, locale: &LocaleCode, partial: bool) {
        if partial {
            self.partial.insert(locale.clone());
        } else {
            self.partial.remove(locale);
        }
    }
}
