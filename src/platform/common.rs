use anyhow::{Context, Result};
use std::ffi::OsString;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Mode given to props.conf files we create from scratch
#[cfg(unix)]
const NEW_FILE_MODE: u32 = 0o644;

/// Atomically write content to a file
///
/// This function writes to a temporary file in the same directory,
/// syncs to disk, then renames to the target path. This ensures
/// the write is atomic on Unix and NTFS filesystems. Permissions of
/// an existing target are carried over to the replacement.
pub fn atomic_write(path: &Path, content: &[u8]) -> Result<()> {
    // Create parent directory if it doesn't exist
    if let Some(parent) = path.parent() {
        ensure_directory_exists(parent)?;
    }

    let existing_permissions = std::fs::metadata(path).ok().map(|m| m.permissions());

    let temp_path = temp_path_for(path);

    let result = write_and_rename(&temp_path, path, content, existing_permissions);

    // Don't leave a half-written sibling behind
    if result.is_err() && temp_path.exists() {
        let _ = std::fs::remove_file(&temp_path);
    }

    result
}

fn write_and_rename(
    temp_path: &Path,
    path: &Path,
    content: &[u8],
    existing_permissions: Option<std::fs::Permissions>,
) -> Result<()> {
    {
        let mut file = File::create(temp_path).with_context(|| {
            format!("Failed to create temporary file: {}", temp_path.display())
        })?;

        file.write_all(content)
            .context("Failed to write to temporary file")?;

        file.sync_all().context("Failed to sync file to disk")?;
    }

    match existing_permissions {
        Some(permissions) => std::fs::set_permissions(temp_path, permissions)
            .with_context(|| format!("Failed to set permissions for: {}", temp_path.display()))?,
        None => set_new_file_permissions(temp_path)?,
    }

    // Rename to target path (atomic operation)
    std::fs::rename(temp_path, path).with_context(|| {
        format!(
            "Failed to rename {} to {}",
            temp_path.display(),
            path.display()
        )
    })?;

    Ok(())
}

/// Ensure a directory exists, creating it and all parents if needed
pub fn ensure_directory_exists(path: &Path) -> Result<()> {
    if path.as_os_str().is_empty() || path.exists() {
        return Ok(());
    }

    std::fs::create_dir_all(path)
        .with_context(|| format!("Failed to create directory: {}", path.display()))?;

    Ok(())
}

/// Sibling of `path` with a `.tmp` suffix appended to the full file name
fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| OsString::from("props.conf"));
    name.push(".tmp");
    path.with_file_name(name)
}

fn set_new_file_permissions(path: &Path) -> Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;

        let permissions = std::fs::Permissions::from_mode(NEW_FILE_MODE);
        std::fs::set_permissions(path, permissions)
            .with_context(|| format!("Failed to set permissions for: {}", path.display()))?;
    }

    #[cfg(windows)]
    {
        // Files inherit the directory ACL; just make sure it's not read-only
        let metadata = std::fs::metadata(path)
            .with_context(|| format!("Failed to get metadata for: {}", path.display()))?;

        let mut permissions = metadata.permissions();
        permissions.set_readonly(false);

        std::fs::set_permissions(path, permissions)
            .with_context(|| format!("Failed to set permissions for: {}", path.display()))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_atomic_write() {
        let temp_dir = tempdir().unwrap();
        let test_file = temp_dir.path().join("props.conf");

        atomic_write(&test_file, b"[default]\n").unwrap();

        assert_eq!(std::fs::read(&test_file).unwrap(), b"[default]\n");
        assert!(!temp_dir.path().join("props.conf.tmp").exists());
    }

    #[test]
    fn test_atomic_write_nested_path() {
        let temp_dir = tempdir().unwrap();
        let test_file = temp_dir.path().join("etc").join("system").join("local").join("props.conf");

        atomic_write(&test_file, b"nested content").unwrap();

        assert_eq!(std::fs::read(&test_file).unwrap(), b"nested content");
    }

    #[test]
    fn test_atomic_write_replaces_existing_content() {
        let temp_dir = tempdir().unwrap();
        let test_file = temp_dir.path().join("props.conf");

        atomic_write(&test_file, b"first").unwrap();
        atomic_write(&test_file, b"second").unwrap();

        assert_eq!(std::fs::read_to_string(&test_file).unwrap(), "second");
    }

    #[cfg(unix)]
    #[test]
    fn test_atomic_write_preserves_existing_mode() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = tempdir().unwrap();
        let test_file = temp_dir.path().join("props.conf");
        std::fs::write(&test_file, "old").unwrap();
        std::fs::set_permissions(&test_file, std::fs::Permissions::from_mode(0o600)).unwrap();

        atomic_write(&test_file, b"new").unwrap();

        let mode = std::fs::metadata(&test_file).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[cfg(unix)]
    #[test]
    fn test_atomic_write_new_file_mode() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = tempdir().unwrap();
        let test_file = temp_dir.path().join("props.conf");

        atomic_write(&test_file, b"new").unwrap();

        let mode = std::fs::metadata(&test_file).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o644);
    }

    #[cfg(unix)]
    #[test]
    fn test_atomic_write_failure_removes_temp_file() {
        let temp_dir = tempdir().unwrap();
        // A non-empty directory in the way makes the final rename fail
        let blocked = temp_dir.path().join("props.conf");
        std::fs::create_dir(&blocked).unwrap();
        std::fs::write(blocked.join("keep"), "x").unwrap();

        assert!(atomic_write(&blocked, b"content").is_err());
        assert!(!temp_dir.path().join("props.conf.tmp").exists());
        assert!(blocked.join("keep").exists());
    }

    #[test]
    fn test_ensure_directory_exists_idempotent() {
        let temp_dir = tempdir().unwrap();
        let test_dir = temp_dir.path().join("idempotent_test");

        ensure_directory_exists(&test_dir).unwrap();
        assert!(test_dir.is_dir());

        ensure_directory_exists(&test_dir).unwrap();
        assert!(test_dir.is_dir());
    }

    #[test]
    fn test_temp_path_keeps_extension() {
        let temp = temp_path_for(Path::new("/opt/splunkforwarder/etc/system/local/props.conf"));
        assert_eq!(
            temp,
            PathBuf::from("/opt/splunkforwarder/etc/system/local/props.conf.tmp")
        );
    }
}
