//! Locale file sections
//!
//! New description keys are grouped by the first segment of their config key
//! and inserted under a labelled section marker.

use crate::constants::{nls, section};

use super::planner::LocaleEntry;

/// Bucket for config keys whose first segment has no section of its own
pub const OTHER: &str = "other";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionSpec {
    pub category: &'static str,
    pub marker: &'static str,
    pub label: &'static str,
}

const fn row(category: &'static str, marker: &'static str, label: &'static str) -> SectionSpec {
    SectionSpec { category, marker, label }
}

/// Known categories in insertion priority order
pub const SECTIONS: &[SectionSpec] = &[
    row("command-disable", "_comment_colors_command_disable", "Command Disable"),
    row("comment", "_comment_colors_comments", "Comments"),
    row("interface", "_comment_colors_interfaces", "Interfaces"),
    row("vrf", "_comment_colors_vrf", "VRF"),
    row("string", "_comment_colors_strings", "Strings"),
    row("config-string", "_comment_colors_config_strings", "Config Strings"),
    row("group", "_comment_colors_groups", "Groups"),
    row("acl", "_comment_colors_acl", "ACL"),
    row("crypto", "_comment_colors_crypto", "Crypto"),
    row("address", "_comment_colors_addresses", "Addresses"),
    row("arp-insp-val", "_comment_colors_arp", "ARP"),
    row("command_hostname", "_comment_colors_command", "Command Hostname"),
    row("numeric", "_comment_colors_numeric", "Numeric"),
    row("separator", "_comment_colors_separator", "Separator"),
    row("bgp", "_comment_colors_bgp", "BGP"),
    row("keyword", "_comment_colors_keywords", "Keywords"),
];

const GROUPS_EXTENDED: SectionSpec = row("group", "_comment_colors_groups_extended", "Groups Extended");

/// Resolved marker and label for a batch of new keys
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub marker: String,
    pub label: String,
}

impl From<&SectionSpec> for Section {
    fn from(spec: &SectionSpec) -> Self {
        Section { marker: spec.marker.to_string(), label: spec.label.to_string() }
    }
}

/// Category of a localization key: the config key's first segment if it is
/// a known category, otherwise [`OTHER`]
pub fn category_of(nls_key: &str) -> &'static str {
    nls_key
        .strip_prefix(nls::KEY_PREFIX)
        .and_then(|rest| rest.split_once('.'))
        .and_then(|(first, _)| SECTIONS.iter().find(|s| s.category == first))
        .map_or(OTHER, |s| s.category)
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// Marker and label derived from the category name alone
pub fn generic_section(category: &str) -> Section {
    Section {
        marker: format!("{}{}", section::MARKER_PREFIX, category.replace('_', "-")),
        label: category.split('-').map(capitalize).collect::<Vec<_>>().join(" "),
    }
}

/// Section for a category batch. `first_key` picks the extended groups
/// section for QoS groups.
pub fn section_for(category: &str, first_key: &str) -> Section {
    if category == GROUPS_EXTENDED.category && first_key.contains(".group.qos.") {
        return Section::from(&GROUPS_EXTENDED);
    }
    SECTIONS
        .iter()
        .find(|s| s.category == category)
        .map_or_else(|| generic_section(category), Section::from)
}

/// Group new entries by category, in priority order with [`OTHER`] last.
/// Entries keep their relative order inside a group.
pub fn group_by_category(entries: &[LocaleEntry]) -> Vec<(Section, Vec<LocaleEntry>)> {
    let order = SECTIONS.iter().map(|s| s.category).chain(std::iter::once(OTHER));
    order
        .filter_map(|category| {
            let batch: Vec<LocaleEntry> = entries
                .iter()
                .filter(|e| category_of(&e.key) == category)
                .cloned()
                .collect();
            let first = batch.first()?;
            Some((section_for(category, &first.key), batch))
        })
        .collect()
}
