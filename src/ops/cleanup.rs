//! Post-run cleanup.
//!
//! Returns the host to a lean state: the build working directory is
//! deleted, the package manager's cache is purged, scratch space is
//! emptied (the directory itself survives), and log files are truncated
//! in place so open log handles keep writing to the same inode.
//!
//! Every action tolerates already-clean state, so cleanup is safe after
//! a partial or failed run.

use anyhow::{Context, Result};

use crate::core::step::StepContext;
use crate::ops::apt;
use crate::util::fs;
use crate::util::shell::Status;

/// Knobs for a cleanup pass.
#[derive(Debug, Clone, Copy, Default)]
pub struct CleanupOptions {
    /// Leave the build working directory in place for inspection.
    pub keep_build_dir: bool,
}

/// What a cleanup pass actually did.
#[derive(Debug, Clone, Copy, Default)]
pub struct CleanupReport {
    pub build_dir_removed: bool,
    pub scratch_entries_removed: usize,
    pub logs_truncated: usize,
}

/// Run the full cleanup sequence.
pub fn run(ctx: &StepContext, options: CleanupOptions) -> Result<CleanupReport> {
    let mut report = CleanupReport::default();

    report.build_dir_removed = remove_build_dir(ctx, options.keep_build_dir)?;

    apt::clean().context("cleanup: cache purge failed")?;
    apt::autoremove().context("cleanup: autoremove failed")?;

    report.scratch_entries_removed = scrub_scratch(ctx)?;
    report.logs_truncated = truncate_logs(ctx)?;

    Ok(report)
}

fn remove_build_dir(ctx: &StepContext, keep: bool) -> Result<bool> {
    let build_dir = &ctx.config.paths.build_dir;

    if keep {
        ctx.shell
            .note(format!("keeping build directory {}", build_dir.display()));
        return Ok(false);
    }

    let existed = build_dir.exists();
    fs::remove_dir_all_if_exists(build_dir)?;
    if existed {
        ctx.shell
            .status(Status::Removed, build_dir.display().to_string());
    }
    Ok(existed)
}

fn scrub_scratch(ctx: &StepContext) -> Result<usize> {
    let scratch = &ctx.config.paths.scratch_dir;
    let removed = fs::empty_dir(scratch)?;
    if removed > 0 {
        ctx.shell.status(
            Status::Removed,
            format!("{} entries from {}", removed, scratch.display()),
        );
    }
    Ok(removed)
}

fn truncate_logs(ctx: &StepContext) -> Result<usize> {
    let logs = fs::find_log_files(&ctx.config.paths.log_dir)?;
    for log in &logs {
        fs::truncate_file(log)?;
    }
    if !logs.is_empty() {
        ctx.shell
            .status(Status::Truncated, format!("{} log files", logs.len()));
    }
    Ok(logs.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::Config;
    use crate::test_support::test_context_with;
    use tempfile::TempDir;

    fn sandboxed_context(tmp: &TempDir) -> StepContext {
        let mut config = Config::default();
        config.paths.build_dir = tmp.path().join("build");
        config.paths.scratch_dir = tmp.path().join("scratch");
        config.paths.log_dir = tmp.path().join("log");
        test_context_with(config)
    }

    #[test]
    fn test_remove_build_dir() {
        let tmp = TempDir::new().unwrap();
        let ctx = sandboxed_context(&tmp);
        let build_dir = ctx.config.paths.build_dir.clone();
        std::fs::create_dir_all(build_dir.join("musl-1.2.5")).unwrap();

        assert!(remove_build_dir(&ctx, false).unwrap());
        assert!(!build_dir.exists());

        // Second pass finds nothing and still succeeds.
        assert!(!remove_build_dir(&ctx, false).unwrap());
    }

    #[test]
    fn test_keep_build_dir() {
        let tmp = TempDir::new().unwrap();
        let ctx = sandboxed_context(&tmp);
        let build_dir = ctx.config.paths.build_dir.clone();
        std::fs::create_dir_all(&build_dir).unwrap();

        assert!(!remove_build_dir(&ctx, true).unwrap());
        assert!(build_dir.exists());
    }

    #[test]
    fn test_scrub_scratch_preserves_directory() {
        let tmp = TempDir::new().unwrap();
        let ctx = sandboxed_context(&tmp);
        let scratch = ctx.config.paths.scratch_dir.clone();
        std::fs::create_dir_all(scratch.join("subdir")).unwrap();
        std::fs::write(scratch.join("leftover.tmp"), "x").unwrap();
        std::fs::write(scratch.join("subdir/nested"), "y").unwrap();

        let removed = scrub_scratch(&ctx).unwrap();

        assert_eq!(removed, 2);
        assert!(scratch.exists());
        assert_eq!(std::fs::read_dir(&scratch).unwrap().count(), 0);
    }

    #[test]
    fn test_scrub_missing_scratch_is_noop() {
        let tmp = TempDir::new().unwrap();
        let ctx = sandboxed_context(&tmp);

        assert_eq!(scrub_scratch(&ctx).unwrap(), 0);
    }

    #[test]
    fn test_truncate_logs_zeroes_content() {
        let tmp = TempDir::new().unwrap();
        let ctx = sandboxed_context(&tmp);
        let log_dir = ctx.config.paths.log_dir.clone();
        std::fs::create_dir_all(log_dir.join("apt")).unwrap();
        std::fs::write(log_dir.join("syslog.log"), "lines").unwrap();
        std::fs::write(log_dir.join("apt/history.log"), "more lines").unwrap();
        std::fs::write(log_dir.join("not-a-log.txt"), "untouched").unwrap();

        let truncated = truncate_logs(&ctx).unwrap();

        assert_eq!(truncated, 2);
        assert_eq!(
            std::fs::metadata(log_dir.join("syslog.log")).unwrap().len(),
            0
        );
        assert_eq!(
            std::fs::metadata(log_dir.join("apt/history.log"))
                .unwrap()
                .len(),
            0
        );
        assert_eq!(
            std::fs::read_to_string(log_dir.join("not-a-log.txt")).unwrap(),
            "untouched"
        );
    }
}
