//! Localized description files
//!
//! - **planner**: classifies description keys as new / changed / obsolete
//! - **category**: groups new keys into labelled sections
//! - **patch**: applies the plan to the raw file text

pub mod category;
pub mod patch;
pub mod planner;

use anyhow::{Context, Result};
use serde_json::{Map, Value};

pub use patch::{LineBuffer, PatchOp};
pub use planner::{LocalePlan, plan_locale};

/// Parse a locale file into its key → value table (file order kept)
pub fn parse_locale(contents: &str) -> Result<Map<String, Value>> {
    serde_json::from_str(contents).context("Failed to parse locale file")
}

/// Operations realizing `plan`: removals, then updates, then one insertion
/// per category in priority order
pub fn patch_ops(plan: &LocalePlan) -> Vec<PatchOp> {
    let removals = plan.obsolete.iter().map(|key| PatchOp::Remove { key: key.clone() });
    let updates = plan
        .changed
        .iter()
        .map(|e| PatchOp::Update { key: e.key.clone(), value: e.value.clone() });
    let inserts = category::group_by_category(&plan.new)
        .into_iter()
        .map(|(section, entries)| PatchOp::InsertSection { marker: section.marker, label: section.label, entries });

    removals.chain(updates).chain(inserts).collect()
}

/// Apply `plan` to the locale text, returning the patched text
pub fn patch_locale(contents: &str, plan: &LocalePlan) -> String {
    let mut buffer = LineBuffer::parse(contents);
    buffer.apply_all(&patch_ops(plan));
    buffer.render()
}
