//! Sync pipeline
//!
//! Rules → mapping → {schema, locale plans → locale patches}. Everything is
//! computed in memory first; writes happen only in [`Mode::Apply`].

use anyhow::{Context, Result};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::config::SyncConfig;
use crate::constants::report::SAMPLE_SIZE;
use crate::locale::{self, LocalePlan};
use crate::mapping::{self, ScopeMapping};
use crate::rules;
use crate::schema::{self, SchemaOutcome};
use crate::store::FileStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Compute and report the plan, write nothing
    DryRun,
    /// Write every regenerated or patched file
    Apply,
}

#[derive(Debug, Clone)]
pub struct LocaleReport {
    pub path: PathBuf,
    pub primary: bool,
    pub plan: LocalePlan,
}

/// What a run computed (and, in apply mode, wrote)
#[derive(Debug, Clone)]
pub struct SyncReport {
    pub mode: Mode,
    pub mappings: Vec<ScopeMapping>,
    pub mappings_path: PathBuf,
    pub manifest_path: PathBuf,
    pub schema_section: String,
    pub schema: SchemaOutcome,
    pub locales: Vec<LocaleReport>,
}

/// Run the whole pipeline against `store`
pub fn run(store: &mut dyn FileStore, root: &Path, config: &SyncConfig, mode: Mode) -> Result<SyncReport> {
    let rules_path = config.resolve(root, &config.rules);
    let rules_text = store.read_required(&rules_path)?;
    let rules = rules::parse_rules(&rules_text).with_context(|| format!("Invalid rules file {}", rules_path.display()))?;
    let scope_colors = rules::extract_scope_colors(&rules);

    let mappings_path = config.resolve(root, &config.mappings);
    let previous = mapping::load_previous(&*store, &mappings_path);
    let mappings = mapping::reconcile(&scope_colors, &previous);
    info!(scopes = scope_colors.len(), mappings = mappings.len(), "Generated scope mappings");

    let manifest_path = config.resolve(root, &config.manifest);
    let manifest_text = store.read_required(&manifest_path)?;
    let mut manifest = schema::parse_manifest(&manifest_text)
        .with_context(|| format!("Invalid manifest {}", manifest_path.display()))?;
    let schema_outcome = schema::sync_schema(&mut manifest, &config.schema_section, &mappings);

    let mut locales = Vec::with_capacity(config.locales.len());
    let mut locale_texts = Vec::with_capacity(config.locales.len());
    for target in &config.locales {
        let path = config.resolve(root, &target.path);
        let text = store.read_required(&path)?;
        let table = locale::parse_locale(&text).with_context(|| format!("Invalid locale file {}", path.display()))?;
        let plan = locale::plan_locale(&mappings, &table);
        debug!(
            path = %path.display(),
            new = plan.new.len(),
            changed = plan.changed.len(),
            obsolete = plan.obsolete.len(),
            "Planned locale patch"
        );
        locales.push(LocaleReport { path: target.path.clone(), primary: target.primary, plan });
        locale_texts.push((path, text));
    }

    if mode == Mode::Apply {
        store.write(&mappings_path, &mapping::render_mappings(&mappings)?)?;
        if schema_outcome.is_synced() {
            store.write(&manifest_path, &schema::render_manifest(&manifest)?)?;
        }
        for (report, (path, text)) in locales.iter().zip(&locale_texts) {
            if report.plan.is_empty() {
                continue;
            }
            store.write(path, &locale::patch_locale(text, &report.plan))?;
            info!(path = %path.display(), "Patched locale file");
        }
    }

    Ok(SyncReport {
        mode,
        mappings,
        mappings_path: config.mappings.clone(),
        manifest_path: config.manifest.clone(),
        schema_section: config.schema_section.clone(),
        schema: schema_outcome,
        locales,
    })
}

impl SyncReport {
    fn fmt_dry_run(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "[dry-run] Would update {} scope mappings", self.mappings.len())?;
        writeln!(f)?;
        writeln!(f, "Generated mappings:")?;
        for m in self.mappings.iter().take(SAMPLE_SIZE) {
            writeln!(f, "  {} -> {}", m.config_key, m.scope)?;
        }
        if self.mappings.len() > SAMPLE_SIZE {
            writeln!(f, "  ... and {} more", self.mappings.len() - SAMPLE_SIZE)?;
        }
        writeln!(f)?;

        match &self.schema {
            SchemaOutcome::Synced { added, removed } => writeln!(
                f,
                "Would add {} and remove {} schema properties in {}",
                added.len(),
                removed.len(),
                self.manifest_path.display()
            )?,
            SchemaOutcome::MissingContainer => self.fmt_missing_container(f)?,
        }

        for locale in &self.locales {
            let path = locale.path.display();
            let plan = &locale.plan;
            writeln!(f, "Would add {} new keys to {path}", plan.new.len())?;
            if !plan.changed.is_empty() {
                writeln!(f, "Would update {} scope values in {path}", plan.changed.len())?;
            }
            if !plan.obsolete.is_empty() {
                if locale.primary {
                    writeln!(f, "Would remove {} obsolete keys from {path}:", plan.obsolete.len())?;
                    for key in &plan.obsolete {
                        writeln!(f, "  - {key}")?;
                    }
                } else {
                    writeln!(f, "Would remove {} obsolete keys from {path}", plan.obsolete.len())?;
                }
            }
        }

        writeln!(f)?;
        writeln!(f, "Would update:")?;
        writeln!(f, "  - {}", self.mappings_path.display())?;
        if self.schema.is_synced() {
            writeln!(f, "  - {}", self.manifest_path.display())?;
        }
        for locale in self.locales.iter().filter(|l| !l.plan.is_empty()) {
            writeln!(f, "  - {}", locale.path.display())?;
        }
        Ok(())
    }

    fn fmt_applied(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Updated {} scope mappings", self.mappings.len())?;
        writeln!(f, "  - {}", self.mappings_path.display())?;
        match &self.schema {
            SchemaOutcome::Synced { added, removed } => writeln!(
                f,
                "  - {} (added {}, removed {})",
                self.manifest_path.display(),
                added.len(),
                removed.len()
            )?,
            SchemaOutcome::MissingContainer => self.fmt_missing_container(f)?,
        }
        for locale in self.locales.iter().filter(|l| !l.plan.is_empty()) {
            writeln!(
                f,
                "  - {} (added {}, updated {}, removed {})",
                locale.path.display(),
                locale.plan.new.len(),
                locale.plan.changed.len(),
                locale.plan.obsolete.len()
            )?;
        }
        Ok(())
    }

    fn fmt_missing_container(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Warning: {} has no \"{}\" settings container, schema left unchanged",
            self.manifest_path.display(),
            self.schema_section
        )
    }
}

impl fmt::Display for SyncReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.mode {
            Mode::DryRun => self.fmt_dry_run(f),
            Mode::Apply => self.fmt_applied(f),
        }
    }
}
