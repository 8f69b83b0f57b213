//! `hostforge provision` command

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;

use crate::cli::ProvisionArgs;
use hostforge::core::step::StepAction;
use hostforge::ops::provision::{self, ProvisionOptions};
use hostforge::util::shell::{format_duration, Status};
use hostforge::{load_config, EuidGuard, Overrides, Shell, StepContext};

pub fn execute(shell: &Arc<Shell>, config_path: Option<&Path>, args: ProvisionArgs) -> Result<()> {
    let mut config = load_config(config_path)?;

    // Passing a proxy URL is as good as asking for the proxy.
    let enable_proxy = args.proxy || args.proxy_http.is_some() || args.proxy_https.is_some();
    config.apply(&Overrides {
        proxy: enable_proxy.then_some(true),
        proxy_http: args.proxy_http,
        proxy_https: args.proxy_https,
        install_runtime: args.no_runtime.then_some(false),
        install_native_toolchain: args.no_native.then_some(false),
    });
    config.validate()?;

    let ctx = StepContext::new(config, Arc::clone(shell));

    // A dry run only probes, so it does not need root.
    if args.dry_run {
        let entries = provision::plan(&ctx)?;
        print!("{}", provision::format_plan(&entries));
        return Ok(());
    }

    let report = provision::provision(
        &ctx,
        &EuidGuard,
        ProvisionOptions {
            keep_build_dir: args.keep_build_dir,
        },
    )?;

    let installed = report
        .outcomes
        .iter()
        .filter(|o| o.action == StepAction::Installed)
        .count();
    let skipped = report.outcomes.len() - installed;
    shell.status(
        Status::Finished,
        format!(
            "{} steps ({installed} installed, {skipped} skipped) in {}",
            report.outcomes.len(),
            format_duration(report.total)
        ),
    );

    Ok(())
}
