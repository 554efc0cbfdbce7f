use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use super::document::Document;
use super::{IniEntry, IniSettings};

/// An INI file on disk, held in memory until flushed
///
/// A missing file behaves like an empty one; it is only created when
/// `flush` is called. Writes touch only the lines of changed settings.
pub struct IniFile {
    path: PathBuf,
    document: Document,
    original: Option<String>,
}

impl IniFile {
    /// Read and parse the file at `path`
    pub fn open(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("{} does not exist yet, starting from an empty document", path.display());
            return Ok(Self {
                path: path.to_path_buf(),
                document: Document::new(),
                original: None,
            });
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read INI file: {}", path.display()))?;

        Ok(Self::parse(path, &content))
    }

    /// Treat `content` as the current contents of `path`
    pub fn parse(path: &Path, content: &str) -> Self {
        Self {
            path: path.to_path_buf(),
            document: Document::parse(content),
            original: Some(content.to_string()),
        }
    }

    /// Content as it was when the file was opened, `None` if it didn't exist
    pub fn original(&self) -> Option<&str> {
        self.original.as_deref()
    }
}

impl IniSettings for IniFile {
    fn get(&self, section: &str, setting: &str) -> Option<String> {
        self.document.get(section, setting)
    }

    fn set(&mut self, section: &str, setting: &str, value: &str) {
        self.document.set(section, setting, value);
    }

    fn remove(&mut self, section: &str, setting: &str) -> bool {
        self.document.remove(section, setting)
    }

    fn entries(&self) -> Vec<IniEntry> {
        self.document.entries()
    }

    fn render(&self) -> Result<String> {
        Ok(self.document.render())
    }

    fn flush(&mut self) -> Result<()> {
        let content = self.document.render();

        crate::platform::common::atomic_write(&self.path, content.as_bytes())
            .with_context(|| format!("Failed to write INI file: {}", self.path.display()))?;

        tracing::debug!("Wrote {} bytes to {}", content.len(), self.path.display());
        self.original = Some(content);

        Ok(())
    }
}
