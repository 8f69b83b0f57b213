//! The provisioning pipeline controller.
//!
//! Composes the privilege guard, the feature-gated step list, and the
//! cleanup engine into one run. Cleanup is guaranteed after the
//! pipeline ran at all: it runs after full success and after a step
//! failure alike. The only path that skips cleanup is the privilege
//! guard rejecting the run before anything happened.

use std::time::{Duration, Instant};

use anyhow::Result;

use crate::core::config::Config;
use crate::core::error::ProvisionError;
use crate::core::pipeline::{Pipeline, PlanEntry};
use crate::core::step::{Step, StepContext, StepOutcome};
use crate::ops::cleanup::{self, CleanupOptions, CleanupReport};
use crate::ops::packer::PackerStep;
use crate::ops::sdkman::{RuntimeStep, VersionManagerStep};
use crate::ops::sources::SourcesStep;
use crate::ops::toolchain::StaticToolchainStep;
use crate::ops::tools::{CommonToolsStep, NativePrereqsStep};
use crate::util::privilege::PrivilegeGuard;

/// Knobs for a provision run.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProvisionOptions {
    /// Leave the build working directory in place after cleanup.
    pub keep_build_dir: bool,
}

/// Record of a completed provision run.
#[derive(Debug)]
pub struct ProvisionReport {
    pub outcomes: Vec<StepOutcome>,
    pub cleanup: CleanupReport,
    pub total: Duration,
}

/// The fixed step order, after feature-flag gating.
///
/// Later steps assume earlier steps' side effects (`curl` from
/// common-tools is the download vehicle, the version manager must exist
/// before the runtime step), so the order never changes.
pub fn step_list(config: &Config) -> Vec<Box<dyn Step>> {
    let mut steps: Vec<Box<dyn Step>> = vec![
        Box::new(SourcesStep),
        Box::new(CommonToolsStep),
        Box::new(VersionManagerStep),
    ];

    if config.features.install_runtime {
        steps.push(Box::new(RuntimeStep));
    }

    if config.features.install_native_toolchain {
        steps.push(Box::new(NativePrereqsStep));
        steps.push(Box::new(StaticToolchainStep));
        steps.push(Box::new(PackerStep));
    }

    steps
}

/// Run the full provisioning pipeline.
pub fn provision(
    ctx: &StepContext,
    guard: &dyn PrivilegeGuard,
    options: ProvisionOptions,
) -> Result<ProvisionReport, ProvisionError> {
    let pipeline = Pipeline::new(step_list(&ctx.config));
    run_with(ctx, guard, &pipeline, options, cleanup::run)
}

/// Pipeline execution with an injectable cleanup engine.
fn run_with(
    ctx: &StepContext,
    guard: &dyn PrivilegeGuard,
    pipeline: &Pipeline,
    options: ProvisionOptions,
    cleanup_fn: impl FnOnce(&StepContext, CleanupOptions) -> Result<CleanupReport>,
) -> Result<ProvisionReport, ProvisionError> {
    if !guard.is_elevated() {
        return Err(ProvisionError::NotElevated { euid: guard.euid() });
    }

    let started = Instant::now();
    let cleanup_options = CleanupOptions {
        keep_build_dir: options.keep_build_dir,
    };

    match pipeline.run(ctx) {
        Ok(outcomes) => {
            let cleanup = cleanup_fn(ctx, cleanup_options)
                .map_err(|cause| ProvisionError::CleanupFailed { cause })?;
            Ok(ProvisionReport {
                outcomes,
                cleanup,
                total: started.elapsed(),
            })
        }
        Err(step_err) => {
            // Best effort; the step failure stays the primary error.
            if let Err(cleanup_err) = cleanup_fn(ctx, cleanup_options) {
                ctx.shell
                    .warn(format!("cleanup after failed run also failed: {cleanup_err:#}"));
            }
            Err(step_err)
        }
    }
}

/// Probe the gated step list without installing anything.
pub fn plan(ctx: &StepContext) -> Result<Vec<PlanEntry>> {
    Pipeline::new(step_list(&ctx.config)).plan(ctx)
}

/// Format a dry-run plan for display.
pub fn format_plan(entries: &[PlanEntry]) -> String {
    use std::fmt::Write;

    let mut output = String::from("Provisioning plan:\n");
    for (index, entry) in entries.iter().enumerate() {
        let action = if entry.installed {
            "skip (already installed)"
        } else {
            "install"
        };
        writeln!(output, "  {}. {:<18} {}", index + 1, entry.name, action).unwrap();
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::step::StepAction;
    use crate::test_support::{event_log, test_context, EventLog, FixedGuard, ScriptedStep};

    fn logging_cleanup(
        log: &EventLog,
    ) -> impl FnOnce(&StepContext, CleanupOptions) -> Result<CleanupReport> + '_ {
        move |_ctx, _options| {
            log.lock().unwrap().push("cleanup".to_string());
            Ok(CleanupReport::default())
        }
    }

    fn failing_cleanup(
        log: &EventLog,
    ) -> impl FnOnce(&StepContext, CleanupOptions) -> Result<CleanupReport> + '_ {
        move |_ctx, _options| {
            log.lock().unwrap().push("cleanup".to_string());
            anyhow::bail!("log dir vanished")
        }
    }

    #[test]
    fn test_not_elevated_runs_nothing() {
        let ctx = test_context();
        let log = event_log();
        let pipeline = Pipeline::new(vec![Box::new(ScriptedStep::new("only", &log))]);

        let err = run_with(
            &ctx,
            &FixedGuard::user(),
            &pipeline,
            ProvisionOptions::default(),
            logging_cleanup(&log),
        )
        .unwrap_err();

        assert!(matches!(err, ProvisionError::NotElevated { euid: 1000 }));
        // No probe, no install, no cleanup.
        assert!(log.lock().unwrap().is_empty());
    }

    #[test]
    fn test_cleanup_runs_after_success() {
        let ctx = test_context();
        let log = event_log();
        let pipeline = Pipeline::new(vec![Box::new(ScriptedStep::new("only", &log))]);

        let report = run_with(
            &ctx,
            &FixedGuard::root(),
            &pipeline,
            ProvisionOptions::default(),
            logging_cleanup(&log),
        )
        .unwrap();

        assert_eq!(report.outcomes.len(), 1);
        assert_eq!(report.outcomes[0].action, StepAction::Installed);
        assert_eq!(
            log.lock().unwrap().as_slice(),
            ["check only", "install only", "cleanup"]
        );
    }

    #[test]
    fn test_cleanup_runs_after_step_failure() {
        let ctx = test_context();
        let log = event_log();
        let pipeline = Pipeline::new(vec![
            Box::new(ScriptedStep::new("ok", &log)),
            Box::new(ScriptedStep::new("broken", &log).fails("mirror down")),
            Box::new(ScriptedStep::new("never", &log)),
        ]);

        let err = run_with(
            &ctx,
            &FixedGuard::root(),
            &pipeline,
            ProvisionOptions::default(),
            logging_cleanup(&log),
        )
        .unwrap_err();

        assert!(matches!(err, ProvisionError::StepFailed { ref step, .. } if step == "broken"));
        let events = log.lock().unwrap();
        assert_eq!(events.last().map(String::as_str), Some("cleanup"));
        assert!(!events.iter().any(|e| e == "check never"));
    }

    #[test]
    fn test_cleanup_failure_after_success_is_an_error() {
        let ctx = test_context();
        let log = event_log();
        let pipeline = Pipeline::new(vec![Box::new(ScriptedStep::new("only", &log))]);

        let err = run_with(
            &ctx,
            &FixedGuard::root(),
            &pipeline,
            ProvisionOptions::default(),
            failing_cleanup(&log),
        )
        .unwrap_err();

        assert!(matches!(err, ProvisionError::CleanupFailed { .. }));
    }

    #[test]
    fn test_step_failure_wins_over_cleanup_failure() {
        let ctx = test_context();
        let log = event_log();
        let pipeline = Pipeline::new(vec![Box::new(
            ScriptedStep::new("broken", &log).fails("mirror down"),
        )]);

        let err = run_with(
            &ctx,
            &FixedGuard::root(),
            &pipeline,
            ProvisionOptions::default(),
            failing_cleanup(&log),
        )
        .unwrap_err();

        // Cleanup was attempted, but the step failure is what surfaces.
        assert!(matches!(err, ProvisionError::StepFailed { ref step, .. } if step == "broken"));
        assert_eq!(log.lock().unwrap().last().map(String::as_str), Some("cleanup"));
    }

    // ========================================================================
    // Feature-flag gating
    // ========================================================================

    fn step_names(config: &Config) -> Vec<&'static str> {
        step_list(config).iter().map(|s| s.name()).collect()
    }

    #[test]
    fn test_step_list_full() {
        let config = Config::default();
        assert_eq!(
            step_names(&config),
            [
                "configure-sources",
                "common-tools",
                "version-manager",
                "runtime",
                "native-prereqs",
                "static-toolchain",
                "binary-packer",
            ]
        );
    }

    #[test]
    fn test_step_list_without_runtime() {
        let mut config = Config::default();
        config.features.install_runtime = false;

        let names = step_names(&config);
        assert!(!names.contains(&"runtime"));
        assert!(names.contains(&"static-toolchain"));
    }

    #[test]
    fn test_step_list_without_native_toolchain() {
        let mut config = Config::default();
        config.features.install_native_toolchain = false;

        let names = step_names(&config);
        assert_eq!(
            names,
            ["configure-sources", "common-tools", "version-manager", "runtime"]
        );
    }

    #[test]
    fn test_step_list_minimal() {
        let mut config = Config::default();
        config.features.install_runtime = false;
        config.features.install_native_toolchain = false;

        assert_eq!(
            step_names(&config),
            ["configure-sources", "common-tools", "version-manager"]
        );
    }

    #[test]
    fn test_format_plan() {
        let entries = vec![
            PlanEntry {
                name: "configure-sources",
                installed: false,
            },
            PlanEntry {
                name: "version-manager",
                installed: true,
            },
        ];

        let rendered = format_plan(&entries);
        assert!(rendered.contains("1. configure-sources  install"));
        assert!(rendered.contains("2. version-manager    skip (already installed)"));
    }
}
