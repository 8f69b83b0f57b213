//! Wrappers over the system package manager.
//!
//! Every mutating invocation pins non-interactive mode and keeps existing
//! conffiles, so an upgrade can never stall a run waiting for a prompt.

use anyhow::{Context, Result};

use crate::util::process::ProcessBuilder;

const APT_GET: &str = "apt-get";
const CONFFILE_POLICY: &str = "Dpkg::Options::=--force-confold";

fn apt_get() -> ProcessBuilder {
    ProcessBuilder::new(APT_GET).env("DEBIAN_FRONTEND", "noninteractive")
}

/// Refresh the package index.
pub fn update() -> Result<()> {
    apt_get()
        .arg("update")
        .run()
        .context("package index update failed")
}

/// Upgrade all installed packages.
pub fn upgrade() -> Result<()> {
    apt_get()
        .args(["upgrade", "-y", "-o", CONFFILE_POLICY])
        .run()
        .context("package upgrade failed")
}

/// Install the given packages. A no-op for an empty list.
pub fn install(packages: &[String]) -> Result<()> {
    if packages.is_empty() {
        return Ok(());
    }

    apt_get()
        .args(["install", "-y", "-o", CONFFILE_POLICY])
        .args(packages)
        .run()
        .with_context(|| format!("package install failed for: {}", packages.join(" ")))
}

/// Purge the local archive of downloaded package files.
pub fn clean() -> Result<()> {
    apt_get()
        .arg("clean")
        .run()
        .context("package cache purge failed")
}

/// Remove packages that were installed as dependencies and are no
/// longer needed.
pub fn autoremove() -> Result<()> {
    apt_get()
        .args(["autoremove", "-y"])
        .run()
        .context("package autoremove failed")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_install_empty_list_is_noop() {
        // Must not touch apt-get at all.
        assert!(install(&[]).is_ok());
    }

    #[test]
    fn test_apt_get_command_shape() {
        let pb = apt_get().args(["install", "-y", "-o", CONFFILE_POLICY, "curl"]);
        assert_eq!(
            pb.display_command(),
            "apt-get install -y -o Dpkg::Options::=--force-confold curl"
        );
    }
}
