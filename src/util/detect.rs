//! Idempotency predicates for installable components.
//!
//! Every step that can cheaply tell whether its component is already on
//! the host goes through one of these checks. The same checks back the
//! `status` report.

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

/// Locate a binary on PATH.
pub fn binary_on_path(name: &str) -> Option<PathBuf> {
    which::which(name).ok()
}

/// True when `path` is a regular file with an execute bit set.
pub fn executable_at(path: &Path) -> bool {
    match std::fs::metadata(path) {
        Ok(meta) => meta.is_file() && meta.permissions().mode() & 0o111 != 0,
        Err(_) => false,
    }
}
