//! Scope mapping reconciliation
//!
//! Merges freshly extracted scopes with the previous mapping file into the
//! canonical mapping, sorted by scope.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, warn};

use crate::keys::{derive_config_key, resolve_config_key};
use crate::rules::ScopeColorMap;
use crate::store::FileStore;

/// One entry of `scopeMappings.json`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScopeMapping {
    #[serde(rename = "configKey")]
    pub config_key: String,
    pub scope: String,
}

impl ScopeMapping {
    pub fn new(config_key: impl Into<String>, scope: impl Into<String>) -> Self {
        Self { config_key: config_key.into(), scope: scope.into() }
    }
}

/// Load the previous mapping. A missing or unreadable file is an empty mapping.
pub fn load_previous(store: &dyn FileStore, path: &Path) -> Vec<ScopeMapping> {
    let contents = match store.read(path) {
        Ok(Some(contents)) => contents,
        Ok(None) => {
            debug!(path = %path.display(), "No previous scope mapping");
            return Vec::new();
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Failed to read previous scope mapping, starting empty");
            return Vec::new();
        }
    };
    parse_mappings(&contents).unwrap_or_else(|e| {
        warn!(path = %path.display(), error = %e, "Failed to parse previous scope mapping, starting empty");
        Vec::new()
    })
}

pub fn parse_mappings(contents: &str) -> Result<Vec<ScopeMapping>> {
    serde_json::from_str(contents).context("Failed to parse scope mappings")
}

/// Serialize the mapping the way it is stored on disk
pub fn render_mappings(mappings: &[ScopeMapping]) -> Result<String> {
    let mut out = serde_json::to_string_pretty(mappings).context("Failed to serialize scope mappings")?;
    out.push('\n');
    Ok(out)
}

/// Build the canonical mapping with the built-in key derivation
pub fn reconcile(scope_colors: &ScopeColorMap, previous: &[ScopeMapping]) -> Vec<ScopeMapping> {
    reconcile_with(scope_colors, previous, derive_config_key)
}

/// Build the canonical mapping: one entry per extracted scope, keys pinned by
/// `previous` where present, sorted ascending by scope. Scopes missing from
/// `scope_colors` are dropped.
pub fn reconcile_with<F>(scope_colors: &ScopeColorMap, previous: &[ScopeMapping], derive: F) -> Vec<ScopeMapping>
where
    F: Fn(&str) -> String,
{
    let pinned: HashMap<String, String> = previous
        .iter()
        .map(|m| (m.scope.clone(), m.config_key.clone()))
        .collect();

    let mut mappings: Vec<ScopeMapping> = scope_colors
        .keys()
        .map(|scope| ScopeMapping::new(resolve_config_key(scope, &pinned, &derive), scope.clone()))
        .collect();
    mappings.sort_by(|a, b| a.scope.cmp(&b.scope));

    let dropped = previous.iter().filter(|m| !scope_colors.contains_key(&m.scope)).count();
    debug!(entries = mappings.len(), dropped, "Reconciled scope mappings");
    mappings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::{KeyRule, Rewrite, derive_with};
    use crate::store::MemoryStore;

    fn scope_colors(scopes: &[&str]) -> ScopeColorMap {
        scopes.iter().map(|s| (s.to_string(), "#FFFFFF".to_string())).collect()
    }

    #[test]
    fn test_reconcile_round_trip_example() {
        let colors = ScopeColorMap::from([
            ("entity.name.tag.interface".to_string(), "#569CD6".to_string()),
            ("comment.line.config".to_string(), "#888888".to_string()),
        ]);
        let mappings = reconcile(&colors, &[]);
        assert_eq!(
            mappings,
            vec![
                ScopeMapping::new("comment.line", "comment.line.config"),
                ScopeMapping::new("interface", "entity.name.tag.interface"),
            ]
        );
    }

    #[test]
    fn test_reconcile_sorted_by_scope() {
        let colors = scope_colors(&["punctuation.separator", "constant.numeric.hex", "comment.block.banner"]);
        let scopes: Vec<String> = reconcile(&colors, &[]).into_iter().map(|m| m.scope).collect();
        assert_eq!(scopes, vec!["comment.block.banner", "constant.numeric.hex", "punctuation.separator"]);
    }

    #[test]
    fn test_reconcile_drops_stale_and_keeps_pinned() {
        let previous = vec![
            ScopeMapping::new("legacy.hex", "constant.numeric.hex"),
            ScopeMapping::new("gone", "keyword.other.gone"),
        ];
        let colors = scope_colors(&["constant.numeric.hex", "constant.numeric.integer"]);
        assert_eq!(
            reconcile(&colors, &previous),
            vec![
                ScopeMapping::new("legacy.hex", "constant.numeric.hex"),
                ScopeMapping::new("numeric.integer", "constant.numeric.integer"),
            ]
        );
    }

    #[test]
    fn test_key_stability_with_altered_derivation() {
        const ALTERED: &[KeyRule] = &[KeyRule { prefix: "constant.", rewrite: Rewrite::Replace("c.") }];
        let colors = scope_colors(&["constant.numeric.hex", "constant.numeric.new"]);
        let previous = reconcile(&colors, &[]);

        let rerun = reconcile_with(&colors, &previous, |s| derive_with(ALTERED, s));
        assert_eq!(rerun, previous);

        let fresh = reconcile_with(&scope_colors(&["constant.numeric.other"]), &previous, |s| derive_with(ALTERED, s));
        assert_eq!(fresh, vec![ScopeMapping::new("c.numeric.other", "constant.numeric.other")]);
    }

    #[test]
    fn test_load_previous_tolerates_missing_and_invalid() {
        let mut store = MemoryStore::new();
        assert!(load_previous(&store, Path::new("config/scopeMappings.json")).is_empty());

        store.insert("config/scopeMappings.json", "{ \"oops\": true }");
        assert!(load_previous(&store, Path::new("config/scopeMappings.json")).is_empty());
    }

    #[test]
    fn test_render_uses_config_key_field() {
        let rendered = render_mappings(&[ScopeMapping::new("comment.line", "comment.line.config")]).unwrap();
        assert_eq!(
            rendered,
            "[\n  {\n    \"configKey\": \"comment.line\",\n    \"scope\": \"comment.line.config\"\n  }\n]\n"
        );
        assert_eq!(parse_mappings(&rendered).unwrap()[0].config_key, "comment.line");
    }
}
