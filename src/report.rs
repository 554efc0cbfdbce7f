use chrono::{DateTime, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fmt;
use std::path::PathBuf;

use crate::paths::PlatformKey;

/// What happened to a single setting during an apply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Created,
    Updated,
    Removed,
    Purged,
}

impl ChangeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeKind::Created => "created",
            ChangeKind::Updated => "updated",
            ChangeKind::Removed => "removed",
            ChangeKind::Purged => "purged",
        }
    }
}

/// A change to one setting
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Change {
    pub section: String,
    pub setting: String,
    pub kind: ChangeKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
}

impl fmt::Display for Change {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}] {}", self.kind.as_str(), self.section, self.setting)?;
        match (&self.from, &self.to) {
            (Some(from), Some(to)) => write!(f, ": '{}' -> '{}'", from, to),
            (None, Some(to)) => write!(f, ": '{}'", to),
            (Some(from), None) => write!(f, " (was '{}')", from),
            (None, None) => Ok(()),
        }
    }
}

/// Outcome of converging props.conf against a manifest
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub path: PathBuf,
    pub os_family: String,
    pub platform: PlatformKey,
    pub dry_run: bool,
    pub started_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checksum_before: Option<String>,
    pub checksum_after: String,
    pub changes: Vec<Change>,
}

impl Report {
    pub fn changed(&self) -> bool {
        !self.changes.is_empty()
    }

    /// Print a human-readable summary to stdout
    pub fn print_summary(&self) {
        if self.dry_run {
            println!("DRY RUN MODE - No changes will be made");
        }

        println!("Target: {} (os family '{}')", self.path.display(), self.os_family);

        if !self.changed() {
            println!("✓ No changes detected - props.conf matches the manifest");
            return;
        }

        for change in &self.changes {
            if self.dry_run {
                println!("  [DRY RUN] Would have {}", change);
            } else {
                println!("  {}", change);
            }
        }

        println!();
        if self.dry_run {
            println!("{} change(s) pending", self.changes.len());
        } else {
            println!("✓ {} change(s) applied", self.changes.len());
        }
    }
}

/// Compute a checksum of file content for change reporting
pub fn compute_content_hash(content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content);
    let result = hasher.finalize();

    format!("sha256:{}", hex::encode(&result))
}

// Helper module for hex encoding
mod hex {
    pub fn encode(bytes: &[u8]) -> String {
        bytes.iter().map(|b| format!("{:02x}", b)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compute_content_hash_returns_sha256_prefixed_hash() {
        let hash = compute_content_hash(b"[syslog]\nTZ=UTC\n");
        assert!(hash.starts_with("sha256:"));
        // "sha256:" (7 chars) + 64 hex chars
        assert_eq!(hash.len(), 71);
    }

    #[test]
    fn compute_content_hash_of_empty_input() {
        assert_eq!(
            compute_content_hash(b""),
            "sha256:e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn compute_content_hash_differs_for_different_content() {
        assert_ne!(compute_content_hash(b"a"), compute_content_hash(b"b"));
    }

    #[test]
    fn change_display_shows_transition() {
        let change = Change {
            section: "syslog".to_string(),
            setting: "TZ".to_string(),
            kind: ChangeKind::Updated,
            from: Some("UTC".to_string()),
            to: Some("GMT".to_string()),
        };
        assert_eq!(change.to_string(), "updated [syslog] TZ: 'UTC' -> 'GMT'");
    }

    #[test]
    fn change_serializes_kind_lowercase() {
        let change = Change {
            section: "syslog".to_string(),
            setting: "TZ".to_string(),
            kind: ChangeKind::Purged,
            from: Some("UTC".to_string()),
            to: None,
        };
        let json = serde_json::to_value(&change).unwrap();
        assert_eq!(json["kind"], "purged");
        assert!(json.get("to").is_none());
    }
}
