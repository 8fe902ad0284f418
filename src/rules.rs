//! TextMate rule extraction
//!
//! Reads the rule source and flattens it into a scope → color map.

use anyhow::{Context, Result};
use serde::Deserialize;
use serde::de::IgnoredAny;
use std::collections::BTreeMap;
use tracing::debug;

use crate::constants::rules::{CUSTOMIZATIONS_KEY, TEXTMATE_RULES_KEY};

/// Scope → foreground color, ordered by scope
pub type ScopeColorMap = BTreeMap<String, String>;

#[derive(Debug, Default, Deserialize)]
struct RulesFile {
    #[serde(rename = "editor.tokenColorCustomizations", default)]
    customizations: Customizations,
}

#[derive(Debug, Default, Deserialize)]
struct Customizations {
    #[serde(rename = "textMateRules", default)]
    textmate_rules: Vec<Lenient<Rule>>,
}

/// A value of the expected shape, or anything else (ignored)
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Lenient<T> {
    Valid(T),
    Invalid(IgnoredAny),
}

impl<T: Default> Default for Lenient<T> {
    fn default() -> Self {
        Lenient::Valid(T::default())
    }
}

impl<T> Lenient<T> {
    fn valid(&self) -> Option<&T> {
        match self {
            Lenient::Valid(value) => Some(value),
            Lenient::Invalid(_) => None,
        }
    }

    fn into_valid(self) -> Option<T> {
        match self {
            Lenient::Valid(value) => Some(value),
            Lenient::Invalid(_) => None,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct Rule {
    #[serde(default)]
    scope: ScopeSelector,
    #[serde(default)]
    settings: Lenient<RuleSettings>,
}

impl Rule {
    fn foreground(&self) -> Option<&str> {
        self.settings
            .valid()
            .and_then(|s| s.foreground.as_deref())
            .filter(|c| !c.is_empty())
    }
}

/// Rule scope: a single scope, a list of scopes, or anything else (ignored).
/// Non-string list elements are skipped.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ScopeSelector {
    One(String),
    Many(Vec<Lenient<String>>),
    Unsupported(IgnoredAny),
}

impl Default for ScopeSelector {
    fn default() -> Self {
        ScopeSelector::Many(Vec::new())
    }
}

impl ScopeSelector {
    fn scopes(&self) -> Vec<&str> {
        match self {
            ScopeSelector::One(scope) => vec![scope.as_str()],
            ScopeSelector::Many(scopes) => scopes.iter().filter_map(Lenient::valid).map(String::as_str).collect(),
            ScopeSelector::Unsupported(_) => Vec::new(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct RuleSettings {
    #[serde(default, deserialize_with = "deserialize_color")]
    foreground: Option<String>,
}

/// Accept a color string; any other JSON value counts as no color
fn deserialize_color<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum MaybeColor {
        Color(String),
        Other(IgnoredAny),
    }

    match MaybeColor::deserialize(deserializer)? {
        MaybeColor::Color(color) => Ok(Some(color)),
        MaybeColor::Other(_) => Ok(None),
    }
}

/// Parse the rule source text
pub fn parse_rules(contents: &str) -> Result<Vec<Rule>> {
    let file: RulesFile = serde_json::from_str(contents).with_context(|| {
        format!("Failed to parse rules (expected \"{CUSTOMIZATIONS_KEY}\".{TEXTMATE_RULES_KEY})")
    })?;
    let total = file.customizations.textmate_rules.len();
    let rules: Vec<Rule> = file.customizations.textmate_rules.into_iter().filter_map(Lenient::into_valid).collect();
    if rules.len() < total {
        debug!(skipped = total - rules.len(), "Ignored malformed rules");
    }
    Ok(rules)
}

/// Flatten rules into a scope → color map. Later rules override earlier
/// ones; rules without a foreground color contribute nothing.
pub fn extract_scope_colors(rules: &[Rule]) -> ScopeColorMap {
    let mut map = ScopeColorMap::new();
    for rule in rules {
        let Some(color) = rule.foreground() else {
            continue;
        };
        for scope in rule.scope.scopes() {
            map.insert(scope.to_string(), color.to_string());
        }
    }
    debug!(rules = rules.len(), scopes = map.len(), "Extracted scope colors");
    map
}

#[cfg(test)]
mod tests {
    use super::*;

    fn colors(json: &str) -> ScopeColorMap {
        extract_scope_colors(&parse_rules(json).unwrap())
    }

    #[test]
    fn test_single_and_list_scopes() {
        let map = colors(
            r##"{
  "editor.tokenColorCustomizations": {
    "textMateRules": [
      { "scope": "comment.line.config", "settings": { "foreground": "#888888" } },
      { "scope": ["entity.name.tag.interface", "constant.numeric.hex"], "settings": { "foreground": "#569CD6" } }
    ]
  }
}"##,
        );
        assert_eq!(map.len(), 3);
        assert_eq!(map["comment.line.config"], "#888888");
        assert_eq!(map["entity.name.tag.interface"], "#569CD6");
        assert_eq!(map["constant.numeric.hex"], "#569CD6");
    }

    #[test]
    fn test_later_rule_overrides_earlier() {
        let map = colors(
            r##"{ "editor.tokenColorCustomizations": { "textMateRules": [
  { "scope": "keyword.other.vrf", "settings": { "foreground": "#111111" } },
  { "scope": ["keyword.other.vrf"], "settings": { "foreground": "#222222" } }
] } }"##,
        );
        assert_eq!(map["keyword.other.vrf"], "#222222");
    }

    #[test]
    fn test_rules_without_foreground_are_skipped() {
        let map = colors(
            r##"{ "editor.tokenColorCustomizations": { "textMateRules": [
  { "scope": "a.b", "settings": { "fontStyle": "bold" } },
  { "scope": "c.d", "settings": { "foreground": "" } },
  { "scope": "e.f" },
  { "scope": "g.h", "settings": { "foreground": "#123456" } },
  { "scope": "g.h", "settings": { "fontStyle": "italic" } }
] } }"##,
        );
        assert_eq!(map.len(), 1);
        assert_eq!(map["g.h"], "#123456");
    }

    #[test]
    fn test_malformed_rules_are_tolerated() {
        let map = colors(
            r##"{ "editor.tokenColorCustomizations": { "textMateRules": [
  { "settings": { "foreground": "#000000" } },
  { "scope": 42, "settings": { "foreground": "#000000" } },
  { "scope": "x.y", "settings": { "foreground": 7 } },
  { "scope": "ok.scope", "settings": { "foreground": "#ABCDEF" } }
] } }"##,
        );
        assert_eq!(map.len(), 1);
        assert_eq!(map["ok.scope"], "#ABCDEF");
    }

    #[test]
    fn test_non_object_settings_are_skipped() {
        let map = colors(
            r##"{ "editor.tokenColorCustomizations": { "textMateRules": [
  { "scope": "x.y", "settings": "oops" },
  { "scope": "ok.scope", "settings": { "foreground": "#ABCDEF" } }
] } }"##,
        );
        assert_eq!(map.len(), 1);
        assert_eq!(map["ok.scope"], "#ABCDEF");
    }

    #[test]
    fn test_non_object_rules_are_skipped() {
        let map = colors(
            r##"{ "editor.tokenColorCustomizations": { "textMateRules": [
  null,
  "comment.line",
  [1, 2],
  { "scope": "ok.scope", "settings": { "foreground": "#ABCDEF" } }
] } }"##,
        );
        assert_eq!(map.len(), 1);
        assert_eq!(map["ok.scope"], "#ABCDEF");
    }

    #[test]
    fn test_scope_list_keeps_string_elements() {
        let map = colors(
            r##"{ "editor.tokenColorCustomizations": { "textMateRules": [
  { "scope": ["ok.scope", 5, null, "other.scope"], "settings": { "foreground": "#ABCDEF" } }
] } }"##,
        );
        assert_eq!(map.len(), 2);
        assert_eq!(map["ok.scope"], "#ABCDEF");
        assert_eq!(map["other.scope"], "#ABCDEF");
    }

    #[test]
    fn test_missing_customizations_is_empty() {
        assert!(colors("{}").is_empty());
        assert!(colors(r#"{ "editor.tokenColorCustomizations": {} }"#).is_empty());
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        assert!(parse_rules("{ not json").is_err());
    }
}
