use anyhow::{Context, Result};
use chrono::Utc;
use std::collections::HashSet;
use std::path::PathBuf;

use crate::config::{Ensure, Manifest, PropsSetting};
use crate::paths::{PathResolver, PlatformKey};
use crate::platform::FactSource;
use crate::report::{compute_content_hash, Change, ChangeKind, Report};

mod document;
mod ini_file;

pub use ini_file::IniFile;

/// One setting as it currently exists in an INI file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IniEntry {
    pub section: String,
    pub setting: String,
    pub value: String,
}

/// Generic section/setting storage that a provider converges
///
/// The empty section name addresses settings outside any stanza.
pub trait IniSettings {
    fn get(&self, section: &str, setting: &str) -> Option<String>;

    fn set(&mut self, section: &str, setting: &str, value: &str);

    /// Remove a setting, returning whether it existed
    fn remove(&mut self, section: &str, setting: &str) -> bool;

    fn entries(&self) -> Vec<IniEntry>;

    /// Serialize the current in-memory state
    fn render(&self) -> Result<String>;

    /// Persist the current in-memory state
    fn flush(&mut self) -> Result<()>;
}

/// The `splunkforwarder_props` provider
///
/// Settings management is generic; the only thing specific to this
/// resource type is where the file lives, which comes from `R` given the
/// OS family reported by `F`.
pub struct PropsProvider<R, F> {
    resolver: R,
    facts: F,
}

impl<R: PathResolver, F: FactSource> PropsProvider<R, F> {
    pub fn new(resolver: R, facts: F) -> Self {
        Self { resolver, facts }
    }

    /// The props.conf this provider manages on this host
    pub fn file_path(&self) -> PathBuf {
        self.target().1
    }

    fn target(&self) -> (String, PathBuf) {
        let os_family = self.facts.os_family();
        let path = self.resolver.resolve(&os_family);
        tracing::debug!(
            "OS family '{}' ({}) resolves to {}",
            os_family,
            PlatformKey::from_os_family(&os_family).as_str(),
            path.display()
        );
        (os_family, path)
    }

    /// All settings currently present in the managed file
    pub fn instances(&self) -> Result<Vec<PropsSetting>> {
        let path = self.file_path();
        let file = IniFile::open(&path)?;

        Ok(file
            .entries()
            .into_iter()
            .map(|e| PropsSetting::present(&e.section, &e.setting, &e.value))
            .collect())
    }

    /// Bring the managed file in line with `manifest`
    ///
    /// The file is written at most once, and only if something changed and
    /// this is not a dry run.
    pub fn apply(&self, manifest: &Manifest, dry_run: bool) -> Result<Report> {
        let started_at = Utc::now();
        let (os_family, path) = self.target();
        tracing::info!("Managing {}", path.display());

        let mut file = IniFile::open(&path)?;
        let checksum_before = file.original().map(|c| compute_content_hash(c.as_bytes()));

        let changes = converge(&mut file, manifest);

        if changes.is_empty() {
            tracing::info!("No changes needed");
        } else if dry_run {
            tracing::info!("{} change(s) pending (dry run)", changes.len());
        } else {
            file.flush()
                .with_context(|| format!("Failed to update {}", path.display()))?;
            tracing::info!("Applied {} change(s)", changes.len());
        }

        let checksum_after = compute_content_hash(file.render()?.as_bytes());

        Ok(Report {
            platform: PlatformKey::from_os_family(&os_family),
            path,
            os_family,
            dry_run,
            started_at,
            checksum_before,
            checksum_after,
            changes,
        })
    }
}

/// Apply `manifest` to `store` in memory and describe what changed
pub fn converge<S: IniSettings>(store: &mut S, manifest: &Manifest) -> Vec<Change> {
    let mut changes = Vec::new();

    for resource in &manifest.settings {
        let current = store.get(&resource.section, &resource.setting);

        match (resource.ensure, &resource.value, current) {
            (Ensure::Present, Some(desired), None) => {
                tracing::debug!("Creating {}", resource.title());
                store.set(&resource.section, &resource.setting, desired);
                changes.push(change(resource, ChangeKind::Created, None, Some(desired.clone())));
            }
            (Ensure::Present, Some(desired), Some(actual)) if *desired != actual => {
                tracing::debug!("Updating {}", resource.title());
                store.set(&resource.section, &resource.setting, desired);
                changes.push(change(resource, ChangeKind::Updated, Some(actual), Some(desired.clone())));
            }
            (Ensure::Absent, _, Some(actual)) => {
                tracing::debug!("Removing {}", resource.title());
                if store.remove(&resource.section, &resource.setting) {
                    changes.push(change(resource, ChangeKind::Removed, Some(actual), None));
                }
            }
            _ => {}
        }
    }

    if manifest.purge {
        let declared: HashSet<(&str, &str)> = manifest
            .settings
            .iter()
            .map(|s| (s.section.as_str(), s.setting.as_str()))
            .collect();

        for entry in store.entries() {
            if declared.contains(&(entry.section.as_str(), entry.setting.as_str())) {
                continue;
            }

            if !store.remove(&entry.section, &entry.setting) {
                continue;
            }

            tracing::debug!("Purged unmanaged {}/{}", entry.section, entry.setting);
            changes.push(Change {
                section: entry.section,
                setting: entry.setting,
                kind: ChangeKind::Purged,
                from: Some(entry.value),
                to: None,
            });
        }
    }

    changes
}

fn change(
    resource: &PropsSetting,
    kind: ChangeKind,
    from: Option<String>,
    to: Option<String>,
) -> Change {
    Change {
        section: resource.section.clone(),
        setting: resource.setting.clone(),
        kind,
        from,
        to,
    }
}
