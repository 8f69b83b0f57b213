//! Archive download and extraction.
//!
//! Downloads go through the system `curl` so they honor the proxy
//! variables the active [`ProxyScope`](crate::util::proxy::ProxyScope)
//! exports; extraction shells out to `tar`, which handles every archive
//! flavor the steps fetch (`.tar.gz`, `.tar.xz`).

use std::path::Path;

use anyhow::{Context, Result};

use crate::core::step::StepContext;
use crate::util::process::ProcessBuilder;
use crate::util::shell::Status;
use crate::util::{fs, hash};

/// Download `url` to `dest`, creating the parent directory.
pub fn download(ctx: &StepContext, url: &str, dest: &Path) -> Result<()> {
    if let Some(parent) = dest.parent() {
        fs::ensure_dir(parent)?;
    }

    ctx.shell.status(Status::Fetching, url);
    let _spinner = ctx.shell.spinner(format!("downloading {url}"));

    // Captured rather than streamed: curl is silenced, so the only
    // output worth keeping is the error text on failure.
    ProcessBuilder::new("curl")
        .args(["-fsSL", "-o"])
        .arg(dest)
        .arg(url)
        .exec_and_check()
        .with_context(|| format!("download failed: {url}"))?;

    Ok(())
}

/// Download `url` to `dest` and verify it against `expected` when a
/// digest is configured.
pub fn download_verified(
    ctx: &StepContext,
    url: &str,
    dest: &Path,
    expected: Option<&str>,
) -> Result<()> {
    download(ctx, url, dest)?;

    if let Some(expected) = expected {
        hash::verify_file(dest, expected)?;
    }

    Ok(())
}

/// Unpack `archive` into `dest_dir`, creating it first.
pub fn extract(archive: &Path, dest_dir: &Path) -> Result<()> {
    fs::ensure_dir(dest_dir)?;

    ProcessBuilder::new("tar")
        .arg("-xf")
        .arg(archive)
        .arg("-C")
        .arg(dest_dir)
        .run()
        .with_context(|| format!("failed to extract {}", archive.display()))
}
