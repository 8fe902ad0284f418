//! Locale patch planning
//!
//! Compares the mapping with a locale's existing entries. Pure: nothing here
//! touches storage.

use regex::Regex;
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::sync::LazyLock;

use crate::constants::nls;
use crate::mapping::ScopeMapping;

static DESCRIPTION_KEY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^configuration\.properties\.colors\..+\.description$").expect("valid description key pattern")
});

/// Is `key` a per-color description key (the sentinel excluded)?
pub fn is_color_description_key(key: &str) -> bool {
    key != nls::SENTINEL_KEY && DESCRIPTION_KEY.is_match(key)
}

/// A localization key with the value it should hold
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocaleEntry {
    pub key: String,
    pub value: String,
}

impl LocaleEntry {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self { key: key.into(), value: value.into() }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocalePlan {
    /// Keys missing from the locale, valued with their scope
    pub new: Vec<LocaleEntry>,
    /// Keys whose stored value differs from their scope
    pub changed: Vec<LocaleEntry>,
    /// Description keys no mapping entry derives
    pub obsolete: Vec<String>,
}

impl LocalePlan {
    pub fn is_empty(&self) -> bool {
        self.new.is_empty() && self.changed.is_empty() && self.obsolete.is_empty()
    }
}

/// Classify every mapping key against `existing`
pub fn plan_locale(mappings: &[ScopeMapping], existing: &Map<String, Value>) -> LocalePlan {
    let mut plan = LocalePlan::default();
    let mut derived = HashSet::new();

    for mapping in mappings {
        let key = nls::description_key(&mapping.config_key);
        if !derived.insert(key.clone()) {
            continue;
        }
        match existing.get(&key) {
            None => plan.new.push(LocaleEntry::new(key, mapping.scope.as_str())),
            Some(Value::String(value)) if *value == mapping.scope => {}
            Some(_) => plan.changed.push(LocaleEntry::new(key, mapping.scope.as_str())),
        }
    }

    plan.obsolete = existing
        .keys()
        .filter(|k| is_color_description_key(k) && !derived.contains(k.as_str()))
        .cloned()
        .collect();

    plan
}
