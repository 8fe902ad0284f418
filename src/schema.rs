//! Settings schema synchronization
//!
//! Keeps the color properties of the extension manifest in step with the
//! mapping: one stub per config key, nothing else, sorted by key.

use anyhow::{Context, Result};
use serde_json::{Map, Value, json};
use std::collections::BTreeSet;
use tracing::{info, warn};

use crate::constants::{manifest, nls};
use crate::mapping::ScopeMapping;

/// Result of a schema sync
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaOutcome {
    Synced { added: Vec<String>, removed: Vec<String> },
    /// `contributes.configuration[0].properties[<section>]` does not exist;
    /// the document was left untouched.
    MissingContainer,
}

impl SchemaOutcome {
    pub fn is_synced(&self) -> bool {
        matches!(self, SchemaOutcome::Synced { .. })
    }
}

/// Property stub for a new config key
fn property_stub(config_key: &str) -> Value {
    json!({
        "type": manifest::PROPERTY_TYPE,
        "format": manifest::PROPERTY_FORMAT,
        "markdownDescription": format!("%{}%", nls::description_key(config_key)),
    })
}

fn section_mut<'a>(doc: &'a mut Value, section: &str) -> Option<&'a mut Map<String, Value>> {
    doc.get_mut("contributes")?
        .get_mut("configuration")?
        .get_mut(0)?
        .get_mut("properties")?
        .get_mut(section)?
        .as_object_mut()
}

/// Add missing properties, drop stale ones and sort by key.
/// Existing properties are never modified.
pub fn sync_schema(doc: &mut Value, section: &str, mappings: &[ScopeMapping]) -> SchemaOutcome {
    let Some(section_obj) = section_mut(doc, section) else {
        warn!(section, "Manifest has no color settings container, schema left unchanged");
        return SchemaOutcome::MissingContainer;
    };

    if !section_obj.get("properties").is_some_and(Value::is_object) {
        section_obj.insert("properties".to_string(), Value::Object(Map::new()));
    }
    let Some(properties) = section_obj.get_mut("properties").and_then(Value::as_object_mut) else {
        return SchemaOutcome::MissingContainer;
    };

    let keys: BTreeSet<&str> = mappings.iter().map(|m| m.config_key.as_str()).collect();

    let mut added = Vec::new();
    for key in &keys {
        if !properties.contains_key(*key) {
            properties.insert(key.to_string(), property_stub(key));
            added.push(key.to_string());
        }
    }

    let removed: Vec<String> = properties
        .keys()
        .filter(|k| !keys.contains(k.as_str()))
        .cloned()
        .collect();
    for key in &removed {
        properties.remove(key);
    }

    let mut sorted: Vec<(String, Value)> = std::mem::take(properties).into_iter().collect();
    sorted.sort_by(|a, b| a.0.cmp(&b.0));
    properties.extend(sorted);

    info!(section, added = added.len(), removed = removed.len(), total = properties.len(), "Synced schema properties");
    SchemaOutcome::Synced { added, removed }
}

pub fn parse_manifest(contents: &str) -> Result<Value> {
    serde_json::from_str(contents).context("Failed to parse manifest")
}

/// Serialize the manifest with two-space indentation and a trailing newline
pub fn render_manifest(doc: &Value) -> Result<String> {
    let mut out = serde_json::to_string_pretty(doc).context("Failed to serialize manifest")?;
    out.push('\n');
    Ok(out)
}
