use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::path::Path;

/// Desired props.conf contents
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    /// Remove settings from the file that are not declared below
    #[serde(default)]
    pub purge: bool,

    #[serde(default)]
    pub settings: Vec<PropsSetting>,
}

/// Whether a setting should exist in the file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Ensure {
    #[default]
    Present,
    Absent,
}

/// A single `splunkforwarder_props` resource: one setting within one stanza
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PropsSetting {
    /// Stanza name, without brackets. Empty means the global area.
    #[serde(default)]
    pub section: String,
    pub setting: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default)]
    pub ensure: Ensure,
}

impl PropsSetting {
    pub fn present(section: &str, setting: &str, value: &str) -> Self {
        Self {
            section: section.to_string(),
            setting: setting.to_string(),
            value: Some(value.to_string()),
            ensure: Ensure::Present,
        }
    }

    pub fn absent(section: &str, setting: &str) -> Self {
        Self {
            section: section.to_string(),
            setting: setting.to_string(),
            value: None,
            ensure: Ensure::Absent,
        }
    }

    /// Resource title, `section/setting`
    pub fn title(&self) -> String {
        format!("{}/{}", self.section, self.setting)
    }
}

impl fmt::Display for PropsSetting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Some(value) => write!(f, "[{}] {} = {}", self.section, self.setting, value),
            None => write!(f, "[{}] {}", self.section, self.setting),
        }
    }
}

/// Load a manifest from a YAML file
pub fn load_manifest(path: &Path) -> Result<Manifest> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read manifest file: {}", path.display()))?;

    let manifest = parse_manifest(&content)
        .with_context(|| format!("Invalid manifest file: {}", path.display()))?;

    Ok(manifest)
}

/// Parse and validate a manifest from YAML text
pub fn parse_manifest(content: &str) -> Result<Manifest> {
    let manifest: Manifest =
        serde_yaml::from_str(content).context("Failed to parse YAML manifest")?;

    validate_manifest(&manifest)?;

    Ok(manifest)
}

/// Validate a manifest
pub fn validate_manifest(manifest: &Manifest) -> Result<()> {
    // A manifest that neither declares nor purges anything is almost certainly a mistake
    if manifest.settings.is_empty() && !manifest.purge {
        anyhow::bail!("Manifest must declare at least one setting or enable purge");
    }

    let mut seen = HashSet::new();
    for setting in &manifest.settings {
        validate_setting(setting)
            .with_context(|| format!("Invalid setting '{}'", setting.title()))?;

        if !seen.insert((setting.section.as_str(), setting.setting.as_str())) {
            anyhow::bail!("Duplicate declaration of setting '{}'", setting.title());
        }
    }

    Ok(())
}

/// Validate a single setting
fn validate_setting(setting: &PropsSetting) -> Result<()> {
    let name = setting.setting.trim();
    if name.is_empty() {
        anyhow::bail!("Setting name must not be empty");
    }
    if name != setting.setting {
        anyhow::bail!("Setting name must not have leading or trailing whitespace");
    }
    if name.contains('=') {
        anyhow::bail!("Setting name must not contain '='");
    }
    if name.starts_with('[') || name.starts_with('#') || name.starts_with(';') {
        anyhow::bail!("Setting name must not start with '[', '#' or ';'");
    }
    if has_line_break(name) {
        anyhow::bail!("Setting name must not contain line breaks");
    }

    if setting.section.contains(']') || has_line_break(&setting.section) {
        anyhow::bail!("Section name must not contain ']' or line breaks");
    }

    match (setting.ensure, &setting.value) {
        (Ensure::Present, None) => {
            anyhow::bail!("A value is required when ensure is present");
        }
        (_, Some(value)) if has_line_break(value) => {
            anyhow::bail!("Value must not contain line breaks");
        }
        _ => {}
    }

    Ok(())
}

fn has_line_break(s: &str) -> bool {
    s.contains('\n') || s.contains('\r')
}
