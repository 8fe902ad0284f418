//! Config key inference
//!
//! Derives a short settings key from a TextMate scope. Derivation is only a
//! fallback: a key already pinned for the scope in the previous mapping
//! always wins, so renaming a rule below never renames a published setting.

use std::collections::HashMap;

/// How a matched scope prefix is rewritten
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rewrite {
    /// Replace the matched prefix with another (possibly empty) prefix
    Replace(&'static str),
    /// Strip this shorter prefix instead of the matched one
    StripOnly(&'static str),
    /// Comment scopes: fold `comment.block.` and `comment.line.config`
    Comment,
}

#[derive(Debug, Clone, Copy)]
pub struct KeyRule {
    pub prefix: &'static str,
    pub rewrite: Rewrite,
}

const fn rule(prefix: &'static str, rewrite: Rewrite) -> KeyRule {
    KeyRule { prefix, rewrite }
}

/// Derivation table, first match wins
pub const KEY_RULES: &[KeyRule] = &[
    rule("entity.name.tag.", Rewrite::Replace("")),
    rule("entity.name.class.", Rewrite::Replace("")),
    rule("entity.other.", Rewrite::Replace("")),
    rule("keyword.other.config-keyword.", Rewrite::Replace("keyword.")),
    rule("keyword.other.group.", Rewrite::Replace("group.")),
    // keeps address variants such as address.ipv6.condensed
    rule("keyword.other.address.", Rewrite::StripOnly("keyword.other.")),
    rule("keyword.other.", Rewrite::Replace("")),
    rule("meta.function-call.", Rewrite::Replace("")),
    rule("string.other.", Rewrite::Replace("string.")),
    rule("constant.", Rewrite::Replace("")),
    rule("comment.", Rewrite::Comment),
    rule("punctuation.", Rewrite::Replace("")),
];

/// Derive a config key from a scope using `rules`
pub fn derive_with(rules: &[KeyRule], scope: &str) -> String {
    let Some(matched) = rules.iter().find(|r| scope.starts_with(r.prefix)) else {
        return scope.to_string();
    };
    let rest = &scope[matched.prefix.len()..];
    match matched.rewrite {
        Rewrite::Replace(with) => format!("{with}{rest}"),
        Rewrite::StripOnly(prefix) => scope.strip_prefix(prefix).unwrap_or(scope).to_string(),
        Rewrite::Comment => scope
            .replace("comment.block.", "comment.")
            .replace("comment.line.config", "comment.line"),
    }
}

/// Derive a config key from a scope using the built-in table
pub fn derive_config_key(scope: &str) -> String {
    derive_with(KEY_RULES, scope)
}

/// Resolve the config key for a scope: the pinned key if the previous
/// mapping has a non-empty one, otherwise `derive(scope)`.
pub fn resolve_config_key<F>(scope: &str, pinned: &HashMap<String, String>, derive: F) -> String
where
    F: Fn(&str) -> String,
{
    match pinned.get(scope).filter(|k| !k.is_empty()) {
        Some(key) => key.clone(),
        None => derive(scope),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derivation_table() {
        let cases = [
            ("entity.name.tag.crypto.crypto-map.name", "crypto.crypto-map.name"),
            ("entity.name.tag.interface", "interface"),
            ("entity.name.class.interface.vlan", "interface.vlan"),
            ("entity.other.bgp.asn", "bgp.asn"),
            ("keyword.other.config-keyword.shutdown", "keyword.shutdown"),
            ("keyword.other.group.object-group", "group.object-group"),
            ("keyword.other.address.ipv6.condensed", "address.ipv6.condensed"),
            ("keyword.other.acl.protocol", "acl.protocol"),
            ("meta.function-call.command_hostname", "command_hostname"),
            ("string.other.description", "string.description"),
            ("constant.numeric.ipv4-AD", "numeric.ipv4-AD"),
            ("comment.block.banner", "comment.banner"),
            ("comment.line.config", "comment.line"),
            ("comment.line.number-sign", "comment.line.number-sign"),
            ("punctuation.separator.colon", "separator.colon"),
            ("markup.heading", "markup.heading"),
        ];
        for (scope, expected) in cases {
            assert_eq!(derive_config_key(scope), expected, "scope {scope}");
        }
    }

    #[test]
    fn test_specific_prefix_beats_generic() {
        // keyword.other. alone would give "config-keyword.x"
        assert_eq!(derive_config_key("keyword.other.config-keyword.x"), "keyword.x");
        assert_eq!(derive_config_key("keyword.other.vrf"), "vrf");
    }

    #[test]
    fn test_prefix_must_include_dot() {
        assert_eq!(derive_config_key("constant"), "constant");
        assert_eq!(derive_config_key("constantly.odd"), "constantly.odd");
    }

    #[test]
    fn test_pinned_key_wins() {
        let pinned = HashMap::from([("entity.name.tag.interface".to_string(), "legacy.iface".to_string())]);
        assert_eq!(
            resolve_config_key("entity.name.tag.interface", &pinned, derive_config_key),
            "legacy.iface"
        );
        assert_eq!(resolve_config_key("constant.numeric.hex", &pinned, derive_config_key), "numeric.hex");
    }

    #[test]
    fn test_empty_pinned_key_falls_back() {
        let pinned = HashMap::from([("constant.numeric.hex".to_string(), String::new())]);
        assert_eq!(resolve_config_key("constant.numeric.hex", &pinned, derive_config_key), "numeric.hex");
    }

    #[test]
    fn test_pinned_key_survives_altered_table() {
        const ALTERED: &[KeyRule] = &[rule("constant.", Rewrite::Replace("const."))];
        let pinned = HashMap::from([("constant.numeric.hex".to_string(), "numeric.hex".to_string())]);

        let key = resolve_config_key("constant.numeric.hex", &pinned, |s| derive_with(ALTERED, s));
        assert_eq!(key, "numeric.hex");
        assert_eq!(derive_with(ALTERED, "constant.numeric.hex"), "const.numeric.hex");
    }
}
