//! Application-wide constants
//!
//! Key shapes, file locations and section markers shared by the
//! extractor, the schema synchronizer and the locale patcher.

/// Rule source layout
pub mod rules {
    /// Top-level object holding the token color customizations
    pub const CUSTOMIZATIONS_KEY: &str = "editor.tokenColorCustomizations";

    /// Array of TextMate rules inside the customizations object
    pub const TEXTMATE_RULES_KEY: &str = "textMateRules";
}

/// Localization key shapes
pub mod nls {
    /// Prefix shared by every color description key
    pub const KEY_PREFIX: &str = "configuration.properties.colors.";

    /// Suffix shared by every color description key
    pub const KEY_SUFFIX: &str = ".description";

    /// Description of the colors section itself, never added or removed
    pub const SENTINEL_KEY: &str = "configuration.properties.colors.description";

    /// Build the localization key for a config key
    pub fn description_key(config_key: &str) -> String {
        format!("{KEY_PREFIX}{config_key}{KEY_SUFFIX}")
    }
}

/// Locale file section markers
pub mod section {
    /// Every section marker key starts with this
    pub const MARKER_PREFIX: &str = "_comment_colors_";

    /// Line prefix that ends the previous section
    pub const MARKER_LINE_PREFIX: &str = "\"_comment";

    /// Marker value prefix, followed by the section label
    pub const LABEL_PREFIX: &str = "Token Colors - ";

    /// Indentation used when nothing in the file suggests another one
    pub const DEFAULT_INDENT: &str = "  ";
}

/// Extension manifest layout
pub mod manifest {
    /// JSON type written into new color properties
    pub const PROPERTY_TYPE: &str = "string";

    /// JSON schema format written into new color properties
    pub const PROPERTY_FORMAT: &str = "color";
}

/// Default file locations (relative to the repository root)
pub mod paths {
    pub const RULES: &str = "syntaxes/textMateRules.json";
    pub const MAPPINGS: &str = "config/scopeMappings.json";
    pub const MANIFEST: &str = "package.json";
    pub const PRIMARY_LOCALE: &str = "package.nls.json";
    pub const SECONDARY_LOCALE: &str = "package.nls.ja.json";

    /// Optional config file looked up in the repository root
    pub const CONFIG_FILENAME: &str = "token-sync.toml";

    /// Settings section holding the color properties
    pub const SCHEMA_SECTION: &str = "cisco-config-highlight.colors";
}

/// Dry-run report limits
pub mod report {
    /// Number of mappings printed as a sample
    pub const SAMPLE_SIZE: usize = 5;
}
