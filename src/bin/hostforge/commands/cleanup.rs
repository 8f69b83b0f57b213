//! `hostforge cleanup` command

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;

use crate::cli::CleanupArgs;
use hostforge::ops::cleanup::{self, CleanupOptions};
use hostforge::util::shell::Status;
use hostforge::{load_config, EuidGuard, PrivilegeGuard, ProvisionError, Shell, StepContext};

pub fn execute(shell: &Arc<Shell>, config_path: Option<&Path>, args: CleanupArgs) -> Result<()> {
    let guard = EuidGuard;
    if !guard.is_elevated() {
        return Err(ProvisionError::NotElevated { euid: guard.euid() }.into());
    }

    let config = load_config(config_path)?;
    let ctx = StepContext::new(config, Arc::clone(shell));

    let report = cleanup::run(
        &ctx,
        CleanupOptions {
            keep_build_dir: args.keep_build_dir,
        },
    )?;

    shell.status(
        Status::Finished,
        format!(
            "cleanup ({} scratch entries removed, {} log files truncated)",
            report.scratch_entries_removed, report.logs_truncated
        ),
    );

    Ok(())
}
