//! Sync configuration
//!
//! Names the files the pipeline reads and writes. Every path is relative to
//! the repository root; [`SyncConfig::resolve`] joins them. Loaded from an
//! optional TOML file, falling back to the extension's standard layout.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::constants::paths;
use crate::store::FileStore;

/// A localized description file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocaleTarget {
    pub path: PathBuf,

    /// The primary locale gets the detailed dry-run report
    #[serde(default)]
    pub primary: bool,
}

impl LocaleTarget {
    pub fn new(path: impl Into<PathBuf>, primary: bool) -> Self {
        Self { path: path.into(), primary }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// TextMate rules, the source of truth
    pub rules: PathBuf,

    /// Generated scope → config key mapping
    pub mappings: PathBuf,

    /// Extension manifest holding the settings schema
    pub manifest: PathBuf,

    /// Settings section whose `properties` hold one entry per config key
    pub schema_section: String,

    pub locales: Vec<LocaleTarget>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            rules: PathBuf::from(paths::RULES),
            mappings: PathBuf::from(paths::MAPPINGS),
            manifest: PathBuf::from(paths::MANIFEST),
            schema_section: paths::SCHEMA_SECTION.to_string(),
            locales: default_locales(),
        }
    }
}

fn default_locales() -> Vec<LocaleTarget> {
    vec![
        LocaleTarget::new(paths::PRIMARY_LOCALE, true),
        LocaleTarget::new(paths::SECONDARY_LOCALE, false),
    ]
}

impl SyncConfig {
    /// Load config from `explicit` if given, otherwise from
    /// `<root>/token-sync.toml` if present, otherwise defaults.
    /// An explicit path that does not exist is an error.
    pub fn load(store: &dyn FileStore, root: &Path, explicit: Option<&Path>) -> Result<Self> {
        let (path, contents) = match explicit {
            Some(path) => (path.to_path_buf(), Some(store.read_required(path)?)),
            None => {
                let path = root.join(paths::CONFIG_FILENAME);
                let contents = store.read(&path)?;
                (path, contents)
            }
        };

        let mut config = match contents {
            Some(contents) => {
                let config = toml::from_str::<SyncConfig>(&contents)
                    .with_context(|| format!("Failed to parse config file {}", path.display()))?;
                info!(path = %path.display(), "Loaded sync config");
                config
            }
            None => Self::default(),
        };

        config.validate();
        Ok(config)
    }

    /// Fix up the locale list so exactly one primary locale exists
    fn validate(&mut self) {
        if self.locales.is_empty() {
            warn!("No locale files configured, using defaults");
            self.locales = default_locales();
            return;
        }

        let primaries = self.locales.iter().filter(|l| l.primary).count();
        if primaries == 0 {
            warn!(path = %self.locales[0].path.display(), "No primary locale configured, promoting first locale");
            self.locales[0].primary = true;
        } else if primaries > 1 {
            let mut seen = false;
            for locale in &mut self.locales {
                if locale.primary && seen {
                    warn!(path = %locale.path.display(), "Multiple primary locales configured, demoting");
                    locale.primary = false;
                }
                seen |= locale.primary;
            }
        }
    }

    /// Join a configured path onto the repository root
    pub fn resolve(&self, root: &Path, path: &Path) -> PathBuf {
        root.join(path)
    }
}
