//! Filesystem utilities.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use walkdir::WalkDir;

/// Remove a directory and all its contents, if it exists.
pub fn remove_dir_all_if_exists(path: &Path) -> Result<()> {
    if path.exists() {
        fs::remove_dir_all(path)
            .with_context(|| format!("failed to remove directory: {}", path.display()))?;
    }
    Ok(())
}

/// Ensure a directory exists, creating it if necessary.
pub fn ensure_dir(path: &Path) -> Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)
            .with_context(|| format!("failed to create directory: {}", path.display()))?;
    }
    Ok(())
}

/// Write a string to a file, creating parent directories if needed.
pub fn write_string(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }
    fs::write(path, contents).with_context(|| format!("failed to write file: {}", path.display()))
}

/// Remove everything inside a directory, keeping the directory itself.
///
/// Returns the number of top-level entries removed. Missing directories
/// count as already empty.
pub fn empty_dir(path: &Path) -> Result<usize> {
    if !path.exists() {
        return Ok(0);
    }

    let mut removed = 0;
    for entry in
        fs::read_dir(path).with_context(|| format!("failed to read directory: {}", path.display()))?
    {
        let entry = entry?;
        let entry_path = entry.path();
        let ty = entry.file_type()?;

        if ty.is_dir() {
            fs::remove_dir_all(&entry_path)
                .with_context(|| format!("failed to remove directory: {}", entry_path.display()))?;
        } else {
            fs::remove_file(&entry_path)
                .with_context(|| format!("failed to remove file: {}", entry_path.display()))?;
        }
        removed += 1;
    }

    Ok(removed)
}

/// Truncate a file to zero bytes in place.
///
/// Opens the existing file rather than recreating it, so the inode and
/// any open handles other processes hold on it survive.
pub fn truncate_file(path: &Path) -> Result<()> {
    fs::OpenOptions::new()
        .write(true)
        .truncate(true)
        .open(path)
        .with_context(|| format!("failed to truncate file: {}", path.display()))?;
    Ok(())
}

/// Find all `*.log` files under a directory, recursively.
pub fn find_log_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let mut logs = Vec::new();
    for entry in WalkDir::new(dir).into_iter().filter_map(|e| e.ok()) {
        let path = entry.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "log") {
            logs.push(path.to_path_buf());
        }
    }

    logs.sort();
    Ok(logs)
}

/// Create a symlink.
pub fn symlink(src: &Path, dst: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(src, dst)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::os::unix::fs::MetadataExt;
    use tempfile::TempDir;

    #[test]
    fn test_empty_dir_removes_contents_keeps_dir() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("a.txt"), "a").unwrap();
        fs::create_dir_all(tmp.path().join("nested/deep")).unwrap();
        fs::write(tmp.path().join("nested/deep/b.txt"), "b").unwrap();

        let removed = empty_dir(tmp.path()).unwrap();

        assert_eq!(removed, 2);
        assert!(tmp.path().exists());
        assert_eq!(fs::read_dir(tmp.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_empty_dir_missing_is_noop() {
        let tmp = TempDir::new().unwrap();
        let removed = empty_dir(&tmp.path().join("missing")).unwrap();
        assert_eq!(removed, 0);
    }

    #[test]
    fn test_truncate_file_preserves_inode() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("app.log");
        fs::write(&path, "lots of log output\n").unwrap();
        let inode_before = fs::metadata(&path).unwrap().ino();

        truncate_file(&path).unwrap();

        let meta = fs::metadata(&path).unwrap();
        assert_eq!(meta.len(), 0);
        assert_eq!(meta.ino(), inode_before);
    }

    #[test]
    fn test_truncate_missing_file_errors() {
        let tmp = TempDir::new().unwrap();
        assert!(truncate_file(&tmp.path().join("missing.log")).is_err());
    }

    #[test]
    fn test_find_log_files_recurses_and_filters() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir_all(tmp.path().join("apt")).unwrap();
        fs::write(tmp.path().join("syslog.log"), "").unwrap();
        fs::write(tmp.path().join("apt/history.log"), "").unwrap();
        fs::write(tmp.path().join("notes.txt"), "").unwrap();

        let logs = find_log_files(tmp.path()).unwrap();

        assert_eq!(logs.len(), 2);
        assert!(logs.iter().all(|p| p.extension().unwrap() == "log"));
    }

    #[test]
    fn test_find_log_files_missing_dir() {
        let tmp = TempDir::new().unwrap();
        let logs = find_log_files(&tmp.path().join("missing")).unwrap();
        assert!(logs.is_empty());
    }
}
